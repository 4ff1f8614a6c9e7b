use crate::{
    booking::Credentials, error::Error, http_client::HttpClient, injection::LoadProfile,
    ReqwestHttpClient,
};
use std::{sync::Arc, time::Duration};

pub const DEFAULT_BASE_URL: &str = "https://restful-booker.herokuapp.com";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";

#[derive(Debug, Clone)]
pub struct BookerConfiguration {
    base_url: String,
    user_agent: String,
    credentials: Credentials,
    load_profile: LoadProfile,
    step_pause: Duration,
    strict_setup_steps: bool,
    request_timeout: Option<Duration>,
    http_client: Option<Arc<dyn HttpClient + Send + Sync>>,
}

impl BookerConfiguration {
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        Self {
            base_url: base_url.into(),
            user_agent: DEFAULT_USER_AGENT.into(),
            credentials: Credentials::default(),
            load_profile: LoadProfile::default(),
            step_pause: Duration::from_secs(1),
            strict_setup_steps: false,
            request_timeout: None,
            http_client: None,
        }
    }

    pub fn set_base_url<S: Into<String>>(&mut self, base_url: S) {
        self.base_url = base_url.into();
    }

    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn set_user_agent<S: Into<String>>(&mut self, user_agent: S) {
        self.user_agent = user_agent.into();
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = credentials;
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn set_load_profile(&mut self, load_profile: LoadProfile) {
        self.load_profile = load_profile;
    }

    pub fn load_profile(&self) -> &LoadProfile {
        &self.load_profile
    }

    pub fn set_step_pause(&mut self, step_pause: Duration) {
        self.step_pause = step_pause;
    }

    pub fn step_pause(&self) -> Duration {
        self.step_pause
    }

    /// When set, authenticate and create steps also assert status 200.
    pub fn set_strict_setup_steps(&mut self, value: bool) {
        self.strict_setup_steps = value;
    }

    pub fn strict_setup_steps(&self) -> bool {
        self.strict_setup_steps
    }

    pub fn set_request_timeout(&mut self, timeout: Option<Duration>) {
        self.request_timeout = timeout;
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    pub fn set_http_client(&mut self, http_client: Arc<dyn HttpClient + Send + Sync>) {
        self.http_client = Some(http_client);
    }

    /// The configured client, or a fresh reqwest client with the fixed headers.
    pub fn http_client(&self) -> Result<Arc<dyn HttpClient + Send + Sync>, Error> {
        match &self.http_client {
            Some(http_client) => Ok(http_client.clone()),
            None => Ok(Arc::new(ReqwestHttpClient::new(
                &self.user_agent,
                self.request_timeout,
            )?)),
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(Error::InvalidConfiguration(format!(
                "base url '{}' must start with http:// or https://",
                self.base_url
            )));
        }

        Ok(())
    }
}

impl Default for BookerConfiguration {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
