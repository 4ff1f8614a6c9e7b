use crate::{
    booking::Booking, checks, http_client::HttpClient, report::UserReport, session::Session,
    step::Step, BookerConfiguration,
};
use std::time::Duration;
use tokio::time::{self, Instant};
use tracing::{debug, warn};

pub const AUTH_TOKEN: &str = "authToken";
pub const BOOKING_ID: &str = "bookingId";

/// An ordered chain of steps replayed by every virtual user.
#[derive(Debug)]
pub struct Scenario {
    name: String,
    steps: Vec<Step>,
    pause: Duration,
}

impl Scenario {
    pub fn new<S: Into<String>>(name: S, pause: Duration) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
            pause,
        }
    }

    pub fn exec(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// authenticate, create, read, update, delete
    pub fn restful_booker(config: &BookerConfiguration) -> Self {
        let mut authenticate = Step::post("Authenticate", "/auth").body(config.credentials().to_json());
        let mut create = Step::post("Create Booking", "/booking").body(Booking::jim_brown().to_json());

        if config.strict_setup_steps() {
            authenticate = authenticate.check(checks::status().is(200));
            create = create.check(checks::status().is(200));
        }

        let booking_path = format!("/booking/${{{}}}", BOOKING_ID);

        Self::new("RestfulBookerSimulation", config.step_pause())
            .exec(authenticate.check(checks::json_path("$.token").save_as(AUTH_TOKEN)))
            .exec(create.check(checks::json_path("$.bookingid").save_integer_as(BOOKING_ID)))
            .exec(
                Step::get("Get Booking", booking_path.as_str())
                    .check(checks::status().is(200))
                    .check(checks::json_path("$.firstname").is("Jim"))
                    .check(checks::json_path("$.lastname").is("Brown")),
            )
            .exec(
                Step::put("Update Booking", booking_path.as_str())
                    .token_cookie(AUTH_TOKEN)
                    .body(Booking::james_brown().to_json())
                    .check(checks::status().is(200))
                    .check(checks::json_path("$.firstname").is("James")),
            )
            .exec(
                Step::delete("Delete Booking", booking_path.as_str())
                    .token_cookie(AUTH_TOKEN)
                    .check(checks::status().is(201)),
            )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Runs every step in order with a fresh session, pausing between consecutive steps.
    ///
    /// A failed step does not stop the chain; steps depending on its bindings fail on their own.
    pub async fn execute(
        &self,
        user: usize,
        client: &(dyn HttpClient + Send + Sync),
        base_url: &str,
        origin: Instant,
    ) -> UserReport {
        let mut session = Session::new();
        let mut report = UserReport {
            user,
            steps: Vec::with_capacity(self.steps.len()),
        };

        for (index, step) in self.steps.iter().enumerate() {
            if index > 0 && !self.pause.is_zero() {
                time::sleep(self.pause).await;
            }

            let outcome = step.execute(client, base_url, &mut session, origin).await;
            match &outcome.error {
                None => debug!("user {}: {} OK", user, step.name()),
                Some(error) => warn!("user {}: {} KO: {}", user, step.name(), error),
            }
            report.steps.push(outcome);
        }

        report
    }
}
