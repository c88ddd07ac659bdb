use std::{fmt, sync::Arc};

use http::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    Method, StatusCode, Uri,
};
use snafu::ResultExt;
use time::OffsetDateTime;

use crate::{
    auth::{self, CONTENT_HASH_HEADER, DATE_HEADER},
    error::{self, InvalidMessageSnafu, NotConfiguredSnafu},
    transport::{ReqwestTransport, Transport},
    Authentication, ChannelKind, Config, ConnectionDescriptor, EmailMessage, EmailRequest, Error,
    Result, SmsMessage, SmsRequest,
};

/// Path and query of the email send operation.
pub const EMAIL_SEND_PATH: &str = "/emails:send?api-version=2023-03-31";

/// Path and query of the SMS send operation.
pub const SMS_SEND_PATH: &str = "/sms/send?api-version=2021-03-07";

/// Acknowledgement of a send the provider accepted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendReceipt {
    pub channel: ChannelKind,
    pub status: StatusCode,
    /// Response body as returned by the provider.
    pub body: String,
}

/// Azure Communication Services client for the email and SMS send
/// operations.
///
/// The client is cheap to clone and may be shared between concurrent sends.
#[derive(Clone)]
pub struct Client {
    descriptor: Arc<ConnectionDescriptor>,
    authentication: Authentication,
    transport: Arc<dyn Transport>,
    default_delivery_report: bool,
}

impl Client {
    /// Creates a client with HMAC authentication and the default HTTP
    /// transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection string is blank or malformed, or
    /// the HTTP client cannot be created.
    pub fn new(connection_string: &str) -> Result<Self> {
        let descriptor = parse_connection_string(Some(connection_string))?;
        let transport = ReqwestTransport::new(Config::default_timeout())?;
        Ok(Self::with_transport(descriptor, Authentication::HmacSha256, Arc::new(transport)))
    }

    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The connection string is missing or malformed
    /// - The bearer token is not a valid header value
    /// - The HTTP client cannot be created
    pub fn from_config(config: &Config) -> Result<Self> {
        let descriptor = parse_connection_string(config.connection_string.as_deref())?;
        let authentication = config.authentication.to_authentication()?;
        let transport = ReqwestTransport::new(config.timeout)?;

        tracing::info!(timeout = ?config.timeout, "Created Azure Communication Service client");

        Ok(Self::with_transport(descriptor, authentication, Arc::new(transport))
            .with_default_delivery_report(config.enable_delivery_report))
    }

    /// Creates a client with the provided transport.
    #[must_use]
    pub fn with_transport(
        descriptor: ConnectionDescriptor,
        authentication: Authentication,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            descriptor: Arc::new(descriptor),
            authentication,
            transport,
            default_delivery_report: Config::default_enable_delivery_report(),
        }
    }

    /// Sets the delivery report setting for SMS messages that do not set one.
    #[must_use]
    pub const fn with_default_delivery_report(mut self, enable: bool) -> Self {
        self.default_delivery_report = enable;
        self
    }

    /// Endpoint of the resource, without trailing slash.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &str { self.descriptor.endpoint() }

    /// Sends `message` from `sender_address` to `recipient_address`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be built, or the provider does
    /// not accept it.
    pub async fn send_email(
        &self,
        sender_address: &str,
        recipient_address: &str,
        message: &EmailMessage,
    ) -> Result<SendReceipt> {
        if !message.has_body() {
            tracing::warn!(subject = %message.subject(), "Sending email without HTML or plain text body");
        }

        let body = EmailRequest::new(sender_address, recipient_address, message).to_json()?;
        let receipt = self.post(ChannelKind::Mail, EMAIL_SEND_PATH, body).await?;

        tracing::info!(to = %recipient_address, "Successfully sent email");
        Ok(receipt)
    }

    /// Sends `message` from `sender_number` to `recipient_number`.
    ///
    /// # Errors
    ///
    /// Returns an error if the message is empty, the request cannot be built,
    /// or the provider does not accept it. Empty messages never reach the
    /// network.
    pub async fn send_sms(
        &self,
        sender_number: &str,
        recipient_number: &str,
        message: &SmsMessage,
    ) -> Result<SendReceipt> {
        if message.content().is_empty() {
            return InvalidMessageSnafu { reason: "SMS message content is empty" }.fail();
        }

        let body =
            SmsRequest::new(sender_number, recipient_number, message, self.default_delivery_report)
                .to_json()?;
        let receipt = self.post(ChannelKind::Sms, SMS_SEND_PATH, body).await?;

        tracing::info!(to = %recipient_number, "Successfully sent SMS");
        Ok(receipt)
    }

    async fn post(
        &self,
        channel: ChannelKind,
        path_and_query: &str,
        body: Vec<u8>,
    ) -> Result<SendReceipt> {
        let uri = format!("{}{path_and_query}", self.descriptor.endpoint())
            .parse::<Uri>()
            .map_err(http::Error::from)
            .context(error::BuildHttpRequestSnafu)?;

        let mut builder = http::Request::builder()
            .method(Method::POST)
            .uri(uri.clone())
            .header(CONTENT_TYPE, mime::APPLICATION_JSON.as_ref());

        builder = match &self.authentication {
            Authentication::HmacSha256 => {
                let signed = auth::sign(
                    &Method::POST,
                    &uri,
                    &body,
                    self.descriptor.access_key(),
                    OffsetDateTime::now_utc(),
                )?;
                builder
                    .header(DATE_HEADER, signed.date)
                    .header(CONTENT_HASH_HEADER, signed.content_hash)
                    .header(AUTHORIZATION, signed.authorization)
            }
            Authentication::BearerToken(token) => builder.header(AUTHORIZATION, token.clone()),
        };

        let request = builder.body(body).context(error::BuildHttpRequestSnafu)?;

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(%channel, error = %err, "Request to Azure Communication Service failed");
                return Err(Error::Provider { channel, status: None, message: err.to_string() });
            }
        };

        let status = response.status();
        if status != StatusCode::ACCEPTED {
            let message = response.into_body();
            tracing::error!(%channel, %status, "Azure Communication Service rejected request: {message}");
            return Err(Error::Provider { channel, status: Some(status), message });
        }

        Ok(SendReceipt { channel, status, body: response.into_body() })
    }
}

fn parse_connection_string(connection_string: Option<&str>) -> Result<ConnectionDescriptor> {
    match connection_string.filter(|value| !value.trim().is_empty()) {
        Some(connection_string) => connection_string.parse(),
        None => NotConfiguredSnafu {
            reason: "Azure Communication Service connection string is not configured",
        }
        .fail(),
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("endpoint", &self.descriptor.endpoint())
            .field("authentication", &self.authentication)
            .field("default_delivery_report", &self.default_delivery_report)
            .finish_non_exhaustive()
    }
}
