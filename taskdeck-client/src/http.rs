use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use taskdeck_core::{ClientError, ClientResult, ErrorBody};

use crate::config::ClientConfig;

/// Shared reqwest plumbing: URL building, auth header, status mapping.
#[derive(Debug, Clone)]
pub(crate) struct HttpTransport {
    http: reqwest::Client,
    base: Url,
    config: ClientConfig,
}

impl HttpTransport {
    pub(crate) fn new(config: ClientConfig) -> ClientResult<Self> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| ClientError::Config(format!("invalid base URL {}: {}", config.base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::Config(format!(
                "{} cannot be used as a base URL",
                config.base_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        Ok(Self { http, base, config })
    }

    pub(crate) fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Append percent-encoded path segments to the base URL.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.config.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and hand back the response regardless of status. Only transport
    /// failures become errors here.
    pub(crate) async fn send(&self, builder: RequestBuilder) -> ClientResult<Response> {
        builder.send().await.map_err(|e| {
            tracing::warn!(error = %e, "request did not complete");
            ClientError::Network(e.to_string())
        })
    }

    pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Turn a non-2xx response into `RequestFailed`, preferring the body's
    /// `detail` over the status reason.
    pub(crate) async fn failure(response: Response, fallback: &str) -> ClientError {
        let status = response.status();
        let detail = match response.bytes().await {
            Ok(bytes) => serde_json::from_slice::<ErrorBody>(&bytes)
                .ok()
                .and_then(|body| body.message()),
            Err(_) => None,
        };
        let message = detail.unwrap_or_else(|| reason(status, fallback));
        tracing::warn!(status = status.as_u16(), %message, "request failed");
        ClientError::RequestFailed {
            status: status.as_u16(),
            message,
        }
    }
}

fn reason(status: StatusCode, fallback: &str) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{}: {}", fallback, reason),
        None => fallback.to_string(),
    }
}
