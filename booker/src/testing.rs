use crate::{error::Error, http_client::HttpClient, RequestData, ResponseData};
use async_trait::async_trait;
use std::{collections::VecDeque, fmt, sync::Mutex};
use tokio::time::Instant;

type Route = fn(&RequestData) -> (u16, String);

/// Replies from a queue of canned responses, then from `route` when the queue is empty.
pub(crate) struct ScriptedHttpClient {
    script: Mutex<VecDeque<(u16, String)>>,
    route: Option<Route>,
    requests: Mutex<Vec<(Instant, RequestData)>>,
}

impl fmt::Debug for ScriptedHttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedHttpClient")
            .field("script", &self.script)
            .field("routed", &self.route.is_some())
            .finish()
    }
}

impl ScriptedHttpClient {
    pub fn new(script: Vec<(u16, &str)>) -> Self {
        Self {
            script: Mutex::new(
                script
                    .into_iter()
                    .map(|(status, body)| (status, body.to_string()))
                    .collect(),
            ),
            route: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn routed(route: Route) -> Self {
        Self {
            route: Some(route),
            ..Self::new(vec![])
        }
    }

    pub fn requests(&self) -> Vec<RequestData> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(_, request)| request.clone())
            .collect()
    }

    pub fn request_times(&self) -> Vec<Instant> {
        self.requests.lock().unwrap().iter().map(|(at, _)| *at).collect()
    }
}

#[async_trait]
impl HttpClient for ScriptedHttpClient {
    async fn make_request(
        &self,
        _: &str,
        request_data: &RequestData,
    ) -> Result<ResponseData, Error> {
        self.requests
            .lock()?
            .push((Instant::now(), request_data.clone()));

        let scripted = self.script.lock()?.pop_front();
        let (status_code, body) = match (scripted, self.route) {
            (Some(reply), _) => reply,
            (None, Some(route)) => route(request_data),
            (None, None) => (404, "Not Found".to_string()),
        };

        Ok(ResponseData {
            status_code,
            body,
            ..ResponseData::default()
        })
    }
}
