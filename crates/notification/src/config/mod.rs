//! Settings of the Azure Communication Services channel.
//!
//! Settings come from a YAML file or from `AZURE_COMMUNICATION_*`
//! environment variables and are read once, when the client is built.

mod error;

use std::{fmt, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use snafu::ResultExt;

pub use self::error::Error;
use crate::Authentication;

pub const CONNECTION_STRING_ENV: &str = "AZURE_COMMUNICATION_CONNECTION_STRING";
pub const EMAIL_SENDER_ENV: &str = "AZURE_COMMUNICATION_EMAIL_SENDER";
pub const SMS_SENDER_ENV: &str = "AZURE_COMMUNICATION_SMS_SENDER";
pub const ENABLE_DELIVERY_REPORT_ENV: &str = "AZURE_COMMUNICATION_ENABLE_DELIVERY_REPORT";
pub const TIMEOUT_ENV: &str = "AZURE_COMMUNICATION_TIMEOUT";
pub const BEARER_TOKEN_ENV: &str = "AZURE_COMMUNICATION_BEARER_TOKEN";

#[serde_as]
#[derive(Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Config {
    /// Connection string of the Azure Communication Services resource, for
    /// example `endpoint=https://<resource>.communication.azure.com/;accesskey=<key>`.
    #[serde(default)]
    pub connection_string: Option<String>,

    /// Verified sender address for email.
    #[serde(default)]
    pub email_sender: Option<String>,

    /// Verified sender phone number for SMS.
    #[serde(default)]
    pub sms_sender: Option<String>,

    /// Delivery report setting for SMS messages that do not set one.
    #[serde(default = "Config::default_enable_delivery_report")]
    pub enable_delivery_report: bool,

    /// Request timeout, in seconds.
    #[serde(default = "Config::default_timeout")]
    #[serde_as(as = "DurationSeconds<u64>")]
    pub timeout: Duration,

    #[serde(default)]
    pub authentication: AuthenticationMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            connection_string: None,
            email_sender: None,
            sms_sender: None,
            enable_delivery_report: Self::default_enable_delivery_report(),
            timeout: Self::default_timeout(),
            authentication: AuthenticationMode::default(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("connection_string", &self.connection_string.as_ref().map(|_| "***"))
            .field("email_sender", &self.email_sender)
            .field("sms_sender", &self.sms_sender)
            .field("enable_delivery_report", &self.enable_delivery_report)
            .field("timeout", &self.timeout)
            .field("authentication", &self.authentication)
            .finish()
    }
}

impl Config {
    #[inline]
    #[must_use]
    pub const fn default_enable_delivery_report() -> bool { true }

    #[inline]
    #[must_use]
    pub const fn default_timeout() -> Duration { Duration::from_secs(30) }

    /// Loads the configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[inline]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let data = std::fs::read_to_string(&path)
            .context(error::OpenConfigSnafu { filename: path.as_ref().to_path_buf() })?;

        serde_yaml::from_str(&data)
            .context(error::ParseConfigSnafu { filename: path.as_ref().to_path_buf() })
    }

    /// Loads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds a value of the wrong type.
    #[inline]
    pub fn from_env() -> Result<Self, Error> { Self::from_env_with(|name| std::env::var(name).ok()) }

    /// Loads the configuration from the variables `lookup` returns. Empty
    /// values count as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds a value of the wrong type.
    pub fn from_env_with<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).map(|value| value.trim().to_string()).filter(|value| !value.is_empty());

        let enable_delivery_report = match var(ENABLE_DELIVERY_REPORT_ENV) {
            Some(value) => parse_bool(&value).ok_or_else(|| {
                error::InvalidEnvValueSnafu {
                    name: ENABLE_DELIVERY_REPORT_ENV,
                    value: value.clone(),
                    expected: "a boolean",
                }
                .build()
            })?,
            None => Self::default_enable_delivery_report(),
        };

        let timeout = match var(TIMEOUT_ENV) {
            Some(value) => value.parse::<u64>().map(Duration::from_secs).map_err(|_| {
                error::InvalidEnvValueSnafu {
                    name: TIMEOUT_ENV,
                    value: value.clone(),
                    expected: "a number of seconds",
                }
                .build()
            })?,
            None => Self::default_timeout(),
        };

        let authentication = var(BEARER_TOKEN_ENV)
            .map_or(AuthenticationMode::Hmac, |token| AuthenticationMode::BearerToken { token });

        Ok(Self {
            connection_string: var(CONNECTION_STRING_ENV),
            email_sender: var(EMAIL_SENDER_ENV),
            sms_sender: var(SMS_SENDER_ENV),
            enable_delivery_report,
            timeout,
            authentication,
        })
    }
}

/// How requests are authenticated, as written in configuration.
#[derive(Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum AuthenticationMode {
    /// HMAC-SHA256 signing with the access key of the connection string.
    #[default]
    Hmac,

    /// A static bearer token.
    BearerToken { token: String },
}

impl fmt::Debug for AuthenticationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hmac => f.write_str("Hmac"),
            Self::BearerToken { .. } => {
                f.debug_struct("BearerToken").field("token", &"***").finish()
            }
        }
    }
}

impl AuthenticationMode {
    /// # Errors
    ///
    /// Returns an error if the bearer token is not a valid header value.
    pub fn to_authentication(&self) -> crate::Result<Authentication> {
        match self {
            Self::Hmac => Ok(Authentication::HmacSha256),
            Self::BearerToken { token } => Authentication::bearer_token(token),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
