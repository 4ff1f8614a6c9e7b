use crate::{
    checks::Check,
    error::Error,
    http_client::HttpClient,
    report::StepOutcome,
    session::{self, Session},
    RequestData, ResponseData,
};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use tokio::time::Instant;
use tracing::debug;

/// One request of a chain: templates are resolved against the session right before sending.
#[derive(Debug)]
pub struct Step {
    name: String,
    method: String,
    path: String,
    body: Option<String>,
    headers: Vec<(String, String)>,
    checks: Vec<Check>,
}

impl Step {
    pub fn new<S1, S2, S3>(name: S1, method: S2, path: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self {
            name: name.into(),
            method: method.into(),
            path: path.into(),
            body: None,
            headers: Vec::new(),
            checks: Vec::new(),
        }
    }

    pub fn get<S1: Into<String>, S2: Into<String>>(name: S1, path: S2) -> Self {
        Self::new(name, "GET", path)
    }

    pub fn post<S1: Into<String>, S2: Into<String>>(name: S1, path: S2) -> Self {
        Self::new(name, "POST", path)
    }

    pub fn put<S1: Into<String>, S2: Into<String>>(name: S1, path: S2) -> Self {
        Self::new(name, "PUT", path)
    }

    pub fn delete<S1: Into<String>, S2: Into<String>>(name: S1, path: S2) -> Self {
        Self::new(name, "DELETE", path)
    }

    pub fn body<S: Into<String>>(mut self, body: S) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn header<S1: Into<String>, S2: Into<String>>(mut self, name: S1, value: S2) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sends the session token the way restful-booker expects it on PUT and DELETE.
    pub fn token_cookie(self, binding: &str) -> Self {
        self.header("Cookie", format!("token=${{{}}}", binding))
    }

    pub fn check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Bindings referenced by the path, body or header templates.
    pub fn requires(&self) -> BTreeSet<String> {
        session::collect_placeholders(
            std::iter::once(self.path.as_str())
                .chain(self.body.as_deref())
                .chain(self.headers.iter().map(|(_, value)| value.as_str())),
        )
    }

    /// Bindings saved by this step's extractions.
    pub fn provides(&self) -> impl Iterator<Item = &str> {
        self.checks.iter().filter_map(Check::saved_name)
    }

    fn prepare(&self, session: &Session) -> Result<RequestData, Error> {
        let mut headers = HashMap::new();
        for (name, value) in &self.headers {
            headers.insert(name.to_lowercase(), session.resolve(value)?);
        }

        Ok(RequestData {
            uri: session.resolve(&self.path)?,
            method: self.method.clone(),
            headers,
            body: match &self.body {
                Some(body) => session.resolve(body)?,
                None => String::new(),
            },
        })
    }

    fn verify(&self, response: &ResponseData, session: &mut Session) -> Result<(), Error> {
        let json = serde_json::from_str::<Value>(&response.body).ok();

        for check in &self.checks {
            check.apply(response, json.as_ref(), session)?;
        }

        Ok(())
    }

    /// Sends the step and runs its checks in order; the first failing check ends the step.
    ///
    /// A step whose templates cannot be resolved fails without sending anything.
    pub async fn execute(
        &self,
        client: &(dyn HttpClient + Send + Sync),
        base_url: &str,
        session: &mut Session,
        origin: Instant,
    ) -> StepOutcome {
        let started = Instant::now();
        let mut outcome = StepOutcome::new(self.name.as_str(), started.duration_since(origin));

        let request_data = match self.prepare(session) {
            Ok(request_data) => request_data,
            Err(error) => return outcome.failed(error),
        };

        debug!("{}: {} {}", self.name, request_data.method, request_data.uri);

        let response = client.make_request(base_url, &request_data).await;
        outcome.elapsed = started.elapsed();

        match response {
            Ok(response) => {
                outcome.status_code = Some(response.status_code);
                match self.verify(&response, session) {
                    Ok(()) => outcome,
                    Err(error) => outcome.failed(error),
                }
            }
            Err(error) => outcome.failed(error),
        }
    }
}
