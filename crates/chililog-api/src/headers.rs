// Chililog protocol headers
//
// The authentication token travels in a custom request/response header.
// Login and session-fetch responses also carry the server's version and
// build timestamp; both are mandatory on those responses.

use reqwest::header::HeaderMap;

use crate::error::Error;

/// Request/response header carrying the authentication token.
pub const AUTHENTICATION_HEADER: &str = "X-Chililog-Authentication";

/// Response header carrying the server version.
pub const VERSION_HEADER: &str = "X-Chililog-Version";

/// Response header carrying the server build timestamp.
pub const BUILD_TIMESTAMP_HEADER: &str = "X-Chililog-Build-Timestamp";

/// Server identification returned alongside authentication responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub version: String,
    pub build_timestamp: String,
}

impl ServerInfo {
    /// Extract version and build timestamp from response headers.
    ///
    /// Header lookup is case-insensitive.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, Error> {
        Ok(Self {
            version: required_header(headers, VERSION_HEADER)?,
            build_timestamp: required_header(headers, BUILD_TIMESTAMP_HEADER)?,
        })
    }
}

/// Read a header as a string, failing with `MissingHeader` if it is absent,
/// empty, or not valid visible ASCII.
pub(crate) fn required_header(headers: &HeaderMap, name: &'static str) -> Result<String, Error> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
        .ok_or(Error::MissingHeader { name })
}
