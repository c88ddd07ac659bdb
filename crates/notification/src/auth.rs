//! Request authentication for Azure Communication Services.
//!
//! Requests are either signed with HMAC-SHA256 using the access key of the
//! connection string, or carry a static bearer token.

use std::fmt;

use base64::{prelude::BASE64_STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use http::{HeaderValue, Method, Uri};
use sha2::{Digest, Sha256};
use snafu::ResultExt;
use time::{macros::format_description, OffsetDateTime, UtcOffset};

use crate::{error, AccessKey, Error};

/// Header carrying the request timestamp.
pub const DATE_HEADER: &str = "x-ms-date";

/// Header carrying the base64 SHA-256 digest of the request body.
pub const CONTENT_HASH_HEADER: &str = "x-ms-content-sha256";

const SIGNED_HEADERS: &str = "date;host;x-ms-content-sha256";

/// How outbound requests are authenticated.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Authentication {
    /// Sign every request with the access key of the connection string.
    #[default]
    HmacSha256,

    /// Send a static `Authorization: Bearer <token>` header.
    BearerToken(HeaderValue),
}

impl Authentication {
    /// Creates bearer token authentication, prefixing `Bearer ` when the
    /// token does not carry it already.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value.
    pub fn bearer_token(token: &str) -> Result<Self, Error> {
        let token = token.trim();
        let value = if token.starts_with("Bearer ") {
            HeaderValue::from_str(token)
        } else {
            HeaderValue::from_str(&format!("Bearer {token}"))
        }
        .context(error::InvalidHeaderValueSnafu { name: "authorization" })?;

        Ok(Self::BearerToken(value))
    }
}

impl fmt::Debug for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HmacSha256 => f.write_str("HmacSha256"),
            Self::BearerToken(_) => f.write_str("BearerToken(***)"),
        }
    }
}

/// The three headers that authenticate one signed request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedHeaders {
    /// Value of `x-ms-date`.
    pub date: String,
    /// Value of `x-ms-content-sha256`.
    pub content_hash: String,
    /// Value of `Authorization`.
    pub authorization: String,
}

/// Computes the HMAC-SHA256 authentication headers for a single request.
///
/// The result depends on every argument, so it must be computed for each
/// request and never reused.
///
/// # Errors
///
/// Returns an error if the timestamp cannot be formatted or the key is
/// rejected by the MAC.
pub fn sign(
    method: &Method,
    uri: &Uri,
    body: &[u8],
    access_key: &AccessKey,
    timestamp: OffsetDateTime,
) -> Result<SignedHeaders, Error> {
    let date = format_date(timestamp)?;
    let content_hash = BASE64_STANDARD.encode(Sha256::digest(body));

    let path_and_query = uri.path_and_query().map_or("/", |path_and_query| path_and_query.as_str());
    let host = uri.host().unwrap_or_default();
    let string_to_sign = format!("{method}\n{path_and_query}\n{date};{host};{content_hash}");

    let mut mac = Hmac::<Sha256>::new_from_slice(access_key.as_bytes())
        .map_err(|err| error::SignRequestSnafu { reason: err.to_string() }.build())?;
    mac.update(string_to_sign.as_bytes());
    let signature = BASE64_STANDARD.encode(mac.finalize().into_bytes());

    Ok(SignedHeaders {
        date,
        content_hash,
        authorization: format!("HMAC-SHA256 SignedHeaders={SIGNED_HEADERS}&Signature={signature}"),
    })
}

/// Formats `timestamp` in UTC as `Tue, 05 Mar 2024 09:07:03 GMT`.
///
/// # Errors
///
/// Returns an error if the year does not fit the four digit format.
pub fn format_date(timestamp: OffsetDateTime) -> Result<String, Error> {
    timestamp
        .to_offset(UtcOffset::UTC)
        .format(format_description!(
            "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
        ))
        .context(error::FormatDateSnafu)
}
