#[cfg(test)]
mod tests {
    use booker::{
        booking::{Booking, Credentials},
        checks,
        injection::LoadProfile,
        preflight,
        runner::LoadRunner,
        scenario::Scenario,
        session::Session,
        step::Step,
        stub_booker_test,
        suite::FunctionalSuite,
        BookerConfiguration, FailureKind, HttpClient,
    };
    use std::time::Duration;
    use tokio::time::Instant;

    fn without_pauses(config: &mut BookerConfiguration) {
        config.set_step_pause(Duration::default());
        config.set_load_profile(LoadProfile::new(1, Duration::default(), Duration::default()));
    }

    fn ramp_three_users(config: &mut BookerConfiguration) {
        config.set_step_pause(Duration::from_millis(20));
        config.set_load_profile(LoadProfile::new(
            3,
            Duration::from_millis(90),
            Duration::from_millis(10),
        ));
    }

    fn wrong_password(config: &mut BookerConfiguration) {
        without_pauses(config);
        config.set_credentials(Credentials::new("admin", "wrongpassword"));
    }

    async fn run_steps(config: &BookerConfiguration, steps: &[Step]) -> Vec<booker::report::StepOutcome> {
        let client = config.http_client().unwrap();
        let mut session = Session::new();
        let origin = Instant::now();
        let mut outcomes = Vec::new();

        for step in steps {
            outcomes.push(
                step.execute(client.as_ref(), config.base_url(), &mut session, origin)
                    .await,
            );
        }

        outcomes
    }

    #[stub_booker_test]
    async fn ping_reports_the_stub_as_up(config: BookerConfiguration) {
        preflight::ping(&config).await.unwrap();
    }

    #[stub_booker_test(without_pauses)]
    async fn functional_suite_passes_against_the_stub(config: BookerConfiguration) {
        let suite = FunctionalSuite::restful_booker(&config).unwrap();

        let report = suite.run(&config).await.unwrap();

        for case in report.failed() {
            eprintln!("{}: {:?}", case.name, case.outcome.error);
        }
        assert!(report.is_ok());
        assert_eq!(report.passed(), 16);
        assert_eq!(
            report.case("create booking").unwrap().outcome.status_code,
            Some(200)
        );
    }

    #[stub_booker_test(wrong_password)]
    async fn suite_without_tokens_reports_unresolved_bindings(config: BookerConfiguration) {
        let report = FunctionalSuite::restful_booker(&config)
            .unwrap()
            .run(&config)
            .await
            .unwrap();

        let create = report.case("create booking").unwrap();
        assert_eq!(
            create.outcome.failure_kind(),
            Some(FailureKind::UnresolvedBinding)
        );
        assert_eq!(create.outcome.status_code, None);

        // cases that need neither token still run on their own
        assert!(report.case("get missing booking").unwrap().outcome.is_ok());
        assert!(report.case("authenticate with invalid credentials").unwrap().outcome.is_ok());
    }

    #[stub_booker_test(ramp_three_users)]
    async fn load_run_completes_every_chain(config: BookerConfiguration) {
        let runner = LoadRunner::new(config.clone());

        let report = runner.run(Scenario::restful_booker(&config)).await.unwrap();

        assert!(report.is_ok(), "{:?}", report);
        assert_eq!(report.users.len(), 3);
        assert_eq!(report.ok_count(), 15);

        for user in &report.users {
            let names: Vec<_> = user.steps.iter().map(|step| step.step.as_str()).collect();
            assert_eq!(
                names,
                vec!["Authenticate", "Create Booking", "Get Booking", "Update Booking", "Delete Booking"]
            );
            for pair in user.steps.windows(2) {
                assert!(pair[1].started_at - pair[0].started_at >= Duration::from_millis(20));
            }
        }

        let first_starts: Vec<_> = report.users.iter().map(|user| user.steps[0].started_at).collect();
        assert!(first_starts[0] >= Duration::from_millis(10));
        assert!(first_starts[1] >= Duration::from_millis(40));
        assert!(first_starts[2] >= Duration::from_millis(70));
    }

    #[stub_booker_test(wrong_password)]
    async fn failed_authentication_surfaces_at_the_first_dependent_step(config: BookerConfiguration) {
        let report = LoadRunner::new(config.clone())
            .run(Scenario::restful_booker(&config))
            .await
            .unwrap();

        let steps = &report.users[0].steps;
        assert_eq!(steps[0].failure_kind(), Some(FailureKind::Assertion));
        assert!(steps[1].is_ok());
        assert!(steps[2].is_ok());
        assert_eq!(steps[3].failure_kind(), Some(FailureKind::UnresolvedBinding));
        assert_eq!(steps[4].failure_kind(), Some(FailureKind::UnresolvedBinding));
    }

    #[stub_booker_test(without_pauses)]
    async fn strict_setup_steps_pass_against_the_stub(mut config: BookerConfiguration) {
        config.set_strict_setup_steps(true);

        let report = LoadRunner::new(config.clone())
            .run(Scenario::restful_booker(&config))
            .await
            .unwrap();

        assert!(report.is_ok(), "{:?}", report);
    }

    #[stub_booker_test]
    async fn deleted_booking_is_gone(config: BookerConfiguration) {
        let steps = vec![
            Step::post("authenticate", "/auth")
                .body(Credentials::default().to_json())
                .check(checks::json_path("$.token").save_as("authToken")),
            Step::post("create", "/booking")
                .body(Booking::jim_brown().to_json())
                .check(checks::status().is(200))
                .check(checks::json_path("$.bookingid").save_integer_as("bookingId")),
            Step::get("get", "/booking/${bookingId}")
                .check(checks::status().is(200))
                .check(checks::json_path("$.firstname").is("Jim")),
            Step::delete("delete", "/booking/${bookingId}")
                .token_cookie("authToken")
                .check(checks::status().is(201)),
            Step::get("get after delete", "/booking/${bookingId}").check(checks::status().is(404)),
        ];

        let outcomes = run_steps(&config, &steps).await;

        for outcome in &outcomes {
            assert!(outcome.is_ok(), "{}: {:?}", outcome.step, outcome.error);
        }
    }

    #[stub_booker_test]
    async fn updates_are_visible_on_read(config: BookerConfiguration) {
        let steps = vec![
            Step::post("authenticate", "/auth")
                .body(Credentials::default().to_json())
                .check(checks::json_path("$.token").save_as("authToken")),
            Step::post("create", "/booking")
                .body(Booking::jim_brown().to_json())
                .check(checks::json_path("$.bookingid").save_integer_as("bookingId")),
            Step::put("update", "/booking/${bookingId}")
                .token_cookie("authToken")
                .body(Booking::james_brown().to_json())
                .check(checks::status().is(200))
                .check(checks::json_path("$.firstname").is("James")),
            Step::get("get", "/booking/${bookingId}")
                .check(checks::status().is(200))
                .check(checks::json_path("$.firstname").is("James"))
                .check(checks::json_path("$.bookingdates.checkin").is("2018-01-01")),
        ];

        let outcomes = run_steps(&config, &steps).await;

        for outcome in &outcomes {
            assert!(outcome.is_ok(), "{}: {:?}", outcome.step, outcome.error);
        }
    }

    #[stub_booker_test]
    async fn malformed_bookings_are_never_accepted(config: BookerConfiguration) {
        let payloads = [
            r#"{"invalid": "data"}"#,
            r#"{"firstname": "Jim"}"#,
            r#"{"firstname": "Jim", "lastname": "Brown", "totalprice": "lots"}"#,
            "not json at all",
            "",
        ];

        let steps: Vec<Step> = payloads
            .iter()
            .map(|payload| {
                Step::post("create", "/booking")
                    .body(*payload)
                    .check(checks::status().not_success())
            })
            .collect();

        for outcome in run_steps(&config, &steps).await {
            assert!(outcome.is_ok(), "{:?}", outcome);
        }
    }

    #[stub_booker_test]
    async fn put_on_auth_never_succeeds(config: BookerConfiguration) {
        let client = config.http_client().unwrap();
        let request = booker::RequestData {
            method: "PUT".into(),
            uri: "/auth".into(),
            body: Credentials::default().to_json(),
            ..booker::RequestData::default()
        };

        let response = client.make_request(config.base_url(), &request).await.unwrap();

        assert_ne!(response.status_code, 200);
        assert_eq!(response.status_code, 404);
    }

    #[test]
    fn unreachable_api_is_a_transport_failure() {
        let closed_port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let mut config = BookerConfiguration::new(format!("http://127.0.0.1:{}", closed_port));
        config.set_request_timeout(Some(Duration::from_secs(5)));

        booker::stub_server::run_test(async move {
            let error = preflight::ping(&config).await.unwrap_err();

            assert_eq!(error.kind(), FailureKind::Transport);
        });
    }
}
