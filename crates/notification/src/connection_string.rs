use std::{fmt, str::FromStr};

use base64::{prelude::BASE64_STANDARD, Engine as _};

use crate::{error::InvalidConnectionStringSnafu, Error};

const ENDPOINT_KEY: &str = "endpoint";
const ACCESS_KEY_KEY: &str = "accesskey";

/// Decoded HMAC key of an Azure Communication Services resource.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessKey(Vec<u8>);

impl AccessKey {
    /// Decodes a base64 access key as issued by the Azure portal.
    ///
    /// # Errors
    ///
    /// Returns an error if `encoded` is not valid standard base64.
    pub fn from_base64(encoded: &str) -> Result<Self, Error> {
        BASE64_STANDARD.decode(encoded.trim()).map(Self).map_err(|err| {
            InvalidConnectionStringSnafu { reason: format!("access key is not valid base64: {err}") }
                .build()
        })
    }

    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] { &self.0 }
}

impl fmt::Debug for AccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("AccessKey(***)") }
}

/// Endpoint and access key parsed from a connection string of the form
/// `endpoint=https://<resource>.communication.azure.com/;accesskey=<base64>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    endpoint: String,
    access_key: AccessKey,
}

impl ConnectionDescriptor {
    /// Endpoint without trailing slash.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &str { &self.endpoint }

    #[inline]
    #[must_use]
    pub const fn access_key(&self) -> &AccessKey { &self.access_key }
}

impl FromStr for ConnectionDescriptor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut endpoint = None;
        let mut access_key = None;

        for (key, value) in s.split(';').filter_map(|segment| segment.split_once('=')) {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.trim().to_ascii_lowercase().as_str() {
                ENDPOINT_KEY if endpoint.is_none() => endpoint = Some(value),
                ACCESS_KEY_KEY if access_key.is_none() => access_key = Some(value),
                _ => {}
            }
        }

        let Some(endpoint) = endpoint else {
            return InvalidConnectionStringSnafu { reason: "endpoint not found" }.fail();
        };
        let Some(access_key) = access_key else {
            return InvalidConnectionStringSnafu { reason: "access key not found" }.fail();
        };

        let endpoint = endpoint.trim_end_matches('/');
        let uri = endpoint.parse::<http::Uri>().map_err(|err| {
            InvalidConnectionStringSnafu { reason: format!("endpoint is not a valid URL: {err}") }
                .build()
        })?;
        if uri.scheme().is_none() || uri.host().is_none() {
            return InvalidConnectionStringSnafu {
                reason: format!("endpoint must be an absolute URL, got `{endpoint}`"),
            }
            .fail();
        }

        Ok(Self { endpoint: endpoint.to_string(), access_key: AccessKey::from_base64(access_key)? })
    }
}
