//! The HTTP seam between the client and Azure Communication Services.

use std::time::Duration;

use async_trait::async_trait;
use snafu::ResultExt;

use crate::{error, Error};

/// Error type returned by transports, surfaced to callers as text.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Sends fully prepared HTTP requests.
///
/// Implementations must be safe to share between concurrent sends.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request` and returns the response with its body read as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be sent or the response body
    /// could not be read. A non-success status is not an error here.
    async fn send(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> Result<http::Response<String>, TransportError>;
}

/// [`Transport`] backed by a [`reqwest::Client`].
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(timeout: Duration) -> Result<Self, Error> {
        let http =
            reqwest::Client::builder().timeout(timeout).build().context(error::BuildHttpClientSnafu)?;
        Ok(Self { http })
    }

    /// Creates a transport with the provided http client.
    #[must_use]
    pub const fn with_http_client(http: reqwest::Client) -> Self { Self { http } }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> Result<http::Response<String>, TransportError> {
        let request = reqwest::Request::try_from(request)?;
        tracing::debug!(method = %request.method(), url = %request.url(), "Sending request");

        let response = self.http.execute(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        let mut response = http::Response::new(body);
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}
