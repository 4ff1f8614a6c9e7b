use crate::{error::Error, util, RequestData, ResponseData};
use async_trait::async_trait;
use hyper::HeaderMap;
use reqwest::{header, Client, Method};
use std::{fmt::Debug, time::Duration};
use tracing::debug;

/// Sends one prepared request to the API and returns the raw response.
#[async_trait]
pub trait HttpClient: Debug {
    async fn make_request(
        &self,
        base_url: &str,
        request_data: &RequestData,
    ) -> Result<ResponseData, Error>;
}

#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Builds a client that sends the fixed JSON headers and `user_agent` on every request.
    pub fn new<S: AsRef<str>>(user_agent: S, timeout: Option<Duration>) -> Result<Self, Error> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        default_headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let mut builder = Client::builder()
            .user_agent(user_agent.as_ref())
            .default_headers(default_headers);

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| {
            Error::InvalidConfiguration(format!("could not build the HTTP client: {}", e))
        })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn make_request(
        &self,
        base_url: &str,
        request_data: &RequestData,
    ) -> Result<ResponseData, Error> {
        let url = format!("{}{}", base_url, request_data.uri);
        let method = Method::from_bytes(request_data.method.as_bytes())
            .map_err(|_| Error::InvalidMethod(request_data.method.clone()))?;

        let mut headers = HeaderMap::new();
        util::put_headers(&mut headers, &request_data.headers)?;

        debug!("{} {}", method, url);

        let mut request_builder = self.client.request(method, url.as_str()).headers(headers);
        if !request_data.body.is_empty() {
            request_builder = request_builder.body(request_data.body.clone());
        }

        let response = request_builder.send().await?;

        let status_code = response.status().as_u16();
        let headers = util::extract_headers(response.headers());
        let body = response.bytes().await?;

        Ok(ResponseData {
            status_code,
            headers,
            body: String::from_utf8_lossy(&body).into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    #[test]
    fn unusable_user_agent_is_a_configuration_error() {
        let error = ReqwestHttpClient::new("agent\nwith a newline", None).unwrap_err();

        assert!(matches!(error, Error::InvalidConfiguration(_)));
        assert_eq!(error.kind(), FailureKind::Internal);
    }

    #[test]
    fn fixed_headers_build() {
        assert!(ReqwestHttpClient::new(crate::DEFAULT_USER_AGENT, Some(Duration::from_secs(5))).is_ok());
    }
}
