use crate::{
    booking::{Booking, Credentials},
    checks,
    error::Error,
    http_client::HttpClient,
    report::{CaseReport, StepOutcome, SuiteReport},
    scenario::{AUTH_TOKEN, BOOKING_ID},
    session::Session,
    step::Step,
    BookerConfiguration,
};
use std::{
    collections::{BTreeSet, HashMap, HashSet},
    sync::Arc,
};
use tokio::time::Instant;
use tracing::{info, warn};

pub const PUT_DELETE_TOKEN: &str = "authTokenForPutDelete";

const INVALID_BOOKING: &str = r#"{ "invalid": "data" }"#;

/// One independent assertion of the functional suite.
#[derive(Debug)]
pub struct Case {
    step: Step,
    after: Vec<String>,
}

impl Case {
    pub fn new(step: Step) -> Self {
        Self {
            step,
            after: Vec::new(),
        }
    }

    /// Declares that this case must run after the named case.
    pub fn after<S: Into<String>>(mut self, predecessor: S) -> Self {
        self.after.push(predecessor.into());
        self
    }

    pub fn name(&self) -> &str {
        self.step.name()
    }
}

/// State shared by the cases of one suite run.
#[derive(Debug)]
pub struct SuiteContext {
    pub session: Session,
    client: Arc<dyn HttpClient + Send + Sync>,
    base_url: String,
    origin: Instant,
}

impl SuiteContext {
    pub fn new(configuration: &BookerConfiguration) -> Result<Self, Error> {
        Ok(Self {
            session: Session::new(),
            client: configuration.http_client()?,
            base_url: configuration.base_url().to_string(),
            origin: Instant::now(),
        })
    }

    pub async fn run_step(&mut self, step: &Step) -> StepOutcome {
        step.execute(
            self.client.as_ref(),
            &self.base_url,
            &mut self.session,
            self.origin,
        )
        .await
    }
}

#[derive(Debug)]
pub struct FunctionalSuite {
    setup: Vec<Step>,
    cases: Vec<Case>,
}

impl FunctionalSuite {
    /// Orders `cases` so that every case runs after the cases providing its bindings and
    /// after its declared predecessors. Declaration order breaks ties.
    pub fn new(setup: Vec<Step>, cases: Vec<Case>) -> Result<Self, Error> {
        let cases = order_cases(&setup, cases)?;
        Ok(Self { setup, cases })
    }

    pub fn restful_booker(configuration: &BookerConfiguration) -> Result<Self, Error> {
        let credentials = configuration.credentials().to_json();
        let booking_path = format!("/booking/${{{}}}", BOOKING_ID);

        let setup = vec![
            Step::post("setup: authenticate", "/auth")
                .body(credentials.as_str())
                .check(checks::json_path("$.token").save_as(AUTH_TOKEN)),
            Step::post("setup: authenticate for put and delete", "/auth")
                .body(credentials.as_str())
                .check(checks::json_path("$.token").save_as(PUT_DELETE_TOKEN)),
        ];

        let cases = vec![
            Case::new(
                Step::put("authenticate with invalid credentials", "/auth")
                    .body(Credentials::new("wrongadmin", "wrongpassword").to_json())
                    .check(checks::status().is(404)),
            ),
            Case::new(
                Step::post("create booking", "/booking")
                    .token_cookie(AUTH_TOKEN)
                    .body(Booking::jim_brown().to_json())
                    .check(checks::status().is(200))
                    .check(checks::json_path("$.bookingid").save_integer_as(BOOKING_ID)),
            ),
            Case::new(
                Step::get("get booking", booking_path.as_str())
                    .check(checks::status().is(200))
                    .check(checks::json_path("$.firstname").is("Jim"))
                    .check(checks::json_path("$.lastname").is("Brown")),
            ),
            Case::new(Step::get("get missing booking", "/booking/99999").check(checks::status().is(404))),
            Case::new(
                Step::put("update booking", booking_path.as_str())
                    .token_cookie(PUT_DELETE_TOKEN)
                    .body(Booking::james_brown().to_json())
                    .check(checks::status().is(200))
                    .check(checks::json_path("$.firstname").is("James")),
            )
            .after("get booking"),
            Case::new(
                Step::delete("delete booking", booking_path.as_str())
                    .token_cookie(PUT_DELETE_TOKEN)
                    .check(checks::status().is(201)),
            )
            .after("update booking"),
            Case::new(
                Step::post("create booking with invalid data", "/booking")
                    .body(INVALID_BOOKING)
                    .check(checks::status().is(500)),
            ),
            Case::new(
                Step::delete("delete nonexistent booking", "/booking/9999")
                    .token_cookie(PUT_DELETE_TOKEN)
                    .check(checks::status().is(405)),
            ),
            Case::new(
                Step::post("authenticate", "/auth")
                    .body(credentials.as_str())
                    .check(checks::status().is(200))
                    .check(checks::json_path("$.token").not_empty()),
            ),
            Case::new(
                Step::put("update booking with invalid data", "/booking/1")
                    .token_cookie(PUT_DELETE_TOKEN)
                    .body(INVALID_BOOKING)
                    .check(checks::status().is(400)),
            ),
            Case::new(
                Step::post("create booking with missing fields", "/booking")
                    .token_cookie(AUTH_TOKEN)
                    .body(r#"{"firstname": "Jim"}"#)
                    .check(checks::status().is(500)),
            ),
            Case::new(
                Step::put("update booking with missing fields", "/booking/1")
                    .token_cookie(PUT_DELETE_TOKEN)
                    .body(r#"{"firstname": "James"}"#)
                    .check(checks::status().is(400)),
            ),
            Case::new(
                Step::delete("delete booking without auth", booking_path.as_str())
                    .check(checks::status().is(403)),
            ),
            Case::new(
                Step::get("get booking with invalid id format", "/booking/invalid")
                    .check(checks::status().is(404)),
            ),
            Case::new(
                Step::post("authenticate with missing fields", "/auth")
                    .body(r#"{"username": "admin"}"#)
                    .check(checks::status().is(200)),
            ),
            Case::new(
                Step::get("get deleted booking", booking_path.as_str())
                    .check(checks::status().is(404)),
            )
            .after("delete booking"),
        ];

        Self::new(setup, cases)
    }

    pub fn case_names(&self) -> Vec<&str> {
        self.cases.iter().map(Case::name).collect()
    }

    /// Runs setup, then every case in order. Case failures never stop the suite.
    pub async fn run(&self, configuration: &BookerConfiguration) -> Result<SuiteReport, Error> {
        configuration.validate()?;
        let mut context = SuiteContext::new(configuration)?;

        for step in &self.setup {
            let outcome = context.run_step(step).await;
            if let Some(error) = &outcome.error {
                warn!("{} failed: {}", step.name(), error);
            }
        }

        let mut report = SuiteReport::default();
        for case in &self.cases {
            let outcome = context.run_step(&case.step).await;
            match &outcome.error {
                None => info!("{} passed", case.name()),
                Some(error) => warn!("{} failed: {}", case.name(), error),
            }

            report.cases.push(CaseReport {
                name: case.name().to_string(),
                outcome,
            });
        }

        Ok(report)
    }
}

fn order_cases(setup: &[Step], cases: Vec<Case>) -> Result<Vec<Case>, Error> {
    let from_setup: HashSet<&str> = setup.iter().flat_map(|step| step.provides()).collect();
    let index_by_name: HashMap<&str, usize> = cases
        .iter()
        .enumerate()
        .map(|(index, case)| (case.name(), index))
        .collect();

    let mut predecessors: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); cases.len()];

    for (index, case) in cases.iter().enumerate() {
        for binding in case.step.requires() {
            if from_setup.contains(binding.as_str()) {
                continue;
            }

            let providers: Vec<usize> = cases
                .iter()
                .enumerate()
                .filter(|(other, provider)| {
                    *other != index && provider.step.provides().any(|name| name == binding)
                })
                .map(|(other, _)| other)
                .collect();

            if providers.is_empty() {
                return Err(Error::InvalidConfiguration(format!(
                    "case '{}' requires '{}' but nothing provides it",
                    case.name(),
                    binding
                )));
            }
            predecessors[index].extend(providers);
        }

        for predecessor in &case.after {
            let other = index_by_name.get(predecessor.as_str()).ok_or_else(|| {
                Error::InvalidConfiguration(format!(
                    "case '{}' runs after unknown case '{}'",
                    case.name(),
                    predecessor
                ))
            })?;
            predecessors[index].insert(*other);
        }
    }

    let mut order = Vec::with_capacity(cases.len());
    let mut done = vec![false; cases.len()];

    while order.len() < cases.len() {
        let next = (0..cases.len())
            .find(|&index| !done[index] && predecessors[index].iter().all(|&p| done[p]))
            .ok_or_else(|| {
                Error::InvalidConfiguration("case dependencies form a cycle".to_string())
            })?;

        done[next] = true;
        order.push(next);
    }

    let mut slots: Vec<Option<Case>> = cases.into_iter().map(Some).collect();
    Ok(order
        .into_iter()
        .filter_map(|index| slots[index].take())
        .collect())
}
