use http::StatusCode;
use snafu::Snafu;

use crate::ChannelKind;

/// Result type alias for the notification crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur while configuring or dispatching notifications.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// A required setting is missing.
    #[snafu(display("Azure Communication Service is not configured: {reason}"))]
    NotConfigured {
        /// What is missing.
        reason: String,
    },

    /// The connection string lacks a segment or carries a malformed value.
    #[snafu(display("Invalid connection string: {reason}"))]
    InvalidConnectionString {
        /// What is wrong with the connection string.
        reason: String,
    },

    /// The notifiable has no address for the channel.
    #[snafu(display("Invalid {channel} recipient: no address found for notifiable"))]
    InvalidRecipient {
        /// The channel that could not be routed.
        channel: ChannelKind,
    },

    /// The message content cannot be sent.
    #[snafu(display("Invalid message: {reason}"))]
    InvalidMessage {
        /// Why the message was rejected.
        reason: String,
    },

    /// The provider did not accept the request, or the request never reached
    /// it.
    #[snafu(display(
        "Azure Communication Service {channel} sending failed{}: {message}",
        status.map(|status| format!(", status code: {status}")).unwrap_or_default()
    ))]
    Provider {
        /// The channel of the failed request.
        channel: ChannelKind,
        /// The response status, `None` when the transport failed.
        status: Option<StatusCode>,
        /// The response body, or the transport error text.
        message: String,
    },

    /// The notification exposes neither a combined, email nor SMS payload.
    #[snafu(display("Notification does not provide an Azure Communication Service payload"))]
    UnsupportedNotification,

    /// At least one channel of a multi-channel dispatch failed.
    #[snafu(display(
        "{} of {} channels failed: {}",
        errors.len(),
        errors.len() + delivered.len(),
        errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
    ))]
    Dispatch {
        /// Channels that were accepted by the provider.
        delivered: Vec<ChannelKind>,
        /// One error per failed channel.
        errors: Vec<Error>,
    },

    /// Failed to serialize a request payload.
    #[snafu(display("Failed to serialize {channel} payload, error: {source}"))]
    SerializePayload {
        /// The channel of the payload.
        channel: ChannelKind,
        /// The underlying serde error.
        source: serde_json::Error,
    },

    /// A header value contains characters HTTP does not allow.
    #[snafu(display("Invalid value for header {name}, error: {source}"))]
    InvalidHeaderValue {
        /// The header name.
        name: &'static str,
        /// The underlying http error.
        source: http::header::InvalidHeaderValue,
    },

    /// Failed to format the request timestamp.
    #[snafu(display("Failed to format request date, error: {source}"))]
    FormatDate {
        /// The underlying time error.
        source: time::error::Format,
    },

    /// Failed to compute the request signature.
    #[snafu(display("Failed to sign request: {reason}"))]
    SignRequest {
        /// Why signing failed.
        reason: String,
    },

    /// Failed to assemble the outbound HTTP request.
    #[snafu(display("Failed to build HTTP request, error: {source}"))]
    BuildHttpRequest {
        /// The underlying http error.
        source: http::Error,
    },

    /// Failed to create the HTTP client.
    #[snafu(display("Failed to build HTTP client, error: {source}"))]
    BuildHttpClient {
        /// The underlying reqwest error.
        source: reqwest::Error,
    },
}
