//! A completion provider for OpenAI-compatible APIs.
//!
//! The provider issues exactly one non-streaming request per call and
//! reads the first completion choice. Retries, streaming, and function
//! calling are deliberately out of scope; callers that want to retry a
//! rate-limited request do so themselves.

#[macro_use]
extern crate tracing;

mod config;
mod proto;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use reqwest::{Client, StatusCode, header};
use threadbot_completion::{
    CompletionProvider, CompletionProviderError, ErrorKind, Turn,
};

pub use config::{
    DEFAULT_MAX_TOKENS, DEFAULT_MODEL, OpenAIConfig, OpenAIConfigBuilder,
};

/// The fixed sampling temperature carried by every request.
pub(crate) const TEMPERATURE: f32 = 0.7;

/// Error type for [`OpenAIProvider`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
    status: Option<StatusCode>,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
            status: None,
        }
    }

    fn with_status(
        message: impl Into<String>,
        kind: ErrorKind,
        status: StatusCode,
    ) -> Self {
        Self {
            message: message.into(),
            kind,
            status: Some(status),
        }
    }

    /// Returns the error detail.
    ///
    /// The detail is meant for logs; the user-facing text comes from
    /// [`ErrorKind::user_notice`].
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the HTTP status that produced this error, if any.
    #[inline]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(status) = self.status {
            write!(f, "{status}: ")?;
        }
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl CompletionProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// OpenAI-compatible completion provider.
#[derive(Clone, Debug)]
pub struct OpenAIProvider {
    client: Client,
    config: Arc<OpenAIConfig>,
}

impl OpenAIProvider {
    /// Creates a new `OpenAIProvider` with the given configuration.
    #[inline]
    pub fn new(config: OpenAIConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }
}

impl CompletionProvider for OpenAIProvider {
    type Error = Error;

    fn complete(
        &self,
        turns: &[Turn],
    ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'static
    {
        let config = Arc::clone(&self.config);
        let client = self.client.clone();
        let request = proto::create_request(turns, &config);

        async move {
            let Some(api_key) = config.api_key.as_deref() else {
                debug!("no API key configured, skipping the request");
                return Err(Error::new(
                    "no API key is configured",
                    ErrorKind::Unconfigured,
                ));
            };

            let resp = match client
                .post(format!("{}{}", config.base_url, "/chat/completions"))
                .header(header::AUTHORIZATION, format!("Bearer {api_key}"))
                .header(header::CONTENT_TYPE, "application/json")
                .json(&request)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(err) => {
                    error!("transport failure: {err}");
                    return Err(Error::new(
                        format!("{err}"),
                        ErrorKind::Transport,
                    ));
                }
            };

            let status = resp.status();
            if !status.is_success() {
                let detail = resp.text().await.unwrap_or_default();
                error!("completion request failed with {status}: {detail}");
                let kind = match status {
                    StatusCode::UNAUTHORIZED => ErrorKind::Unauthorized,
                    StatusCode::TOO_MANY_REQUESTS => ErrorKind::RateLimited,
                    _ => ErrorKind::Remote,
                };
                return Err(Error::with_status(detail, kind, status));
            }

            let completion: proto::ChatCompletion = match resp.json().await {
                Ok(completion) => completion,
                Err(err) => {
                    error!("malformed completion payload: {err}");
                    return Err(Error::new(
                        format!("{err}"),
                        ErrorKind::Remote,
                    ));
                }
            };
            let Some(choice) = completion.choices.into_iter().next() else {
                return Err(Error::new(
                    "response contains no choices",
                    ErrorKind::Remote,
                ));
            };
            Ok(choice.message.content)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_resolves_without_network() {
        // The base URL points nowhere routable; an attempted request
        // would fail with a transport error instead.
        let config = OpenAIConfigBuilder::new()
            .with_base_url("http://127.0.0.1:1")
            .build();
        let provider = OpenAIProvider::new(config);

        let turns = [Turn::directive("d"), Turn::user("u")];
        let err = provider.complete(&turns).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unconfigured);
        assert!(err.status().is_none());
    }

    #[tokio::test]
    async fn test_connection_failure_maps_to_transport() {
        let config = OpenAIConfigBuilder::new()
            .with_api_key("xxx")
            .with_base_url("http://127.0.0.1:1")
            .build();
        let provider = OpenAIProvider::new(config);

        let turns = [Turn::directive("d"), Turn::user("u")];
        let err = provider.complete(&turns).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }
}
