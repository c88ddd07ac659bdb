//! # Azure Communication Services notification channel
//!
//! This crate delivers notifications as email and SMS through the Azure
//! Communication Services REST API.
//!
//! ## Features
//!
//! - HMAC-SHA256 request signing, or a static bearer token
//! - HTML and plain text email with attachments
//! - SMS with delivery reports
//! - A dispatch channel that routes combined, email-only and SMS-only
//!   notifications to the addresses of a notifiable
//! - Configuration from YAML or environment variables
//!
//! ## Example
//!
//! ```no_run
//! use acs_notification::{
//!     Channel, ChannelKind, Client, Config, EmailMessage, Notifiable, Notification,
//!     Senders,
//! };
//!
//! struct User {
//!     email: String,
//! }
//!
//! impl Notifiable for User {
//!     fn route_notification_for(&self, channel: ChannelKind) -> Option<String> {
//!         match channel {
//!             ChannelKind::Mail => Some(self.email.clone()),
//!             ChannelKind::Sms => None,
//!         }
//!     }
//! }
//!
//! struct Welcome;
//!
//! impl Notification for Welcome {
//!     fn to_email(&self, _notifiable: &dyn Notifiable) -> Option<EmailMessage> {
//!         Some(EmailMessage::new("Welcome!").html("<h1>Welcome!</h1>"))
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env()?;
//! let channel = Channel::new(Client::from_config(&config)?, Senders::from(&config));
//!
//! let user = User { email: "john@example.com".to_string() };
//! let _receipts = channel.send(&user, &Welcome).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
mod channel;
mod client;
pub mod config;
mod connection_string;
mod error;
mod message;
mod payload;
pub mod transport;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use self::{
    auth::Authentication,
    channel::{Channel, Senders},
    client::{Client, SendReceipt, EMAIL_SEND_PATH, SMS_SEND_PATH},
    config::Config,
    connection_string::{AccessKey, ConnectionDescriptor},
    error::{Error, Result},
    message::{Attachment, EmailMessage, SmsMessage},
    payload::{EmailRequest, SmsRequest},
};

/// The delivery channels a notifiable can be routed on.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    /// Email, routed to an email address.
    Mail,
    /// SMS, routed to a phone number.
    Sms,
}

impl ChannelKind {
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mail => "mail",
            Self::Sms => "sms",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// An entity that can receive notifications.
pub trait Notifiable: Send + Sync {
    /// Returns the address (email address or phone number) this notifiable
    /// should be reached at on `channel`, if any.
    fn route_notification_for(&self, channel: ChannelKind) -> Option<String>;
}

/// The content a notification wants delivered, resolved once per dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NotificationPayload {
    /// Email and SMS in one payload; either part may be absent.
    Combined {
        /// The email part.
        email: Option<EmailMessage>,
        /// The SMS part.
        sms: Option<SmsMessage>,
    },
    /// Only an email.
    EmailOnly(EmailMessage),
    /// Only an SMS.
    SmsOnly(SmsMessage),
    /// The notification offers nothing this channel can deliver.
    Unsupported,
}

/// A notification that can be delivered through Azure Communication Services.
///
/// Implement whichever capabilities the notification has. The combined
/// payload takes precedence over the email-only one, which takes precedence
/// over the SMS-only one.
pub trait Notification: Send + Sync {
    /// Email and SMS content in one payload.
    fn to_combined(
        &self,
        _notifiable: &dyn Notifiable,
    ) -> Option<(Option<EmailMessage>, Option<SmsMessage>)> {
        None
    }

    /// Email-only content.
    fn to_email(&self, _notifiable: &dyn Notifiable) -> Option<EmailMessage> { None }

    /// SMS-only content.
    fn to_sms(&self, _notifiable: &dyn Notifiable) -> Option<SmsMessage> { None }

    /// Resolves the capabilities of this notification into a single payload.
    fn payload(&self, notifiable: &dyn Notifiable) -> NotificationPayload {
        if let Some((email, sms)) = self.to_combined(notifiable) {
            return NotificationPayload::Combined { email, sms };
        }
        if let Some(email) = self.to_email(notifiable) {
            return NotificationPayload::EmailOnly(email);
        }
        self.to_sms(notifiable).map_or(NotificationPayload::Unsupported, NotificationPayload::SmsOnly)
    }
}
