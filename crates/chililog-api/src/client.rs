// Chililog REST API HTTP client
//
// Wraps `reqwest::Client` with Chililog URL construction, token header
// injection, and error-body interpretation. Endpoint groups (documents,
// authentication, repository runtime) are implemented as inherent methods
// in separate files to keep this module focused on transport mechanics.

use reqwest::{RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::headers::AUTHENTICATION_HEADER;
use crate::transport::TransportConfig;

/// Raw HTTP client for the Chililog server API.
///
/// Stateless with respect to authentication: every authenticated call takes
/// the token explicitly, so one client can serve any number of sessions.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

/// Error body returned by the server for 400/401/500 responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "Message", default)]
    message: Option<String>,
}

impl ApiClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the server root, e.g. `http://localhost:8989`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/api/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let full = format!(
            "{}/api/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path
        );
        Ok(Url::parse(&full)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Attach the authentication header, send, and reject non-2xx responses.
    pub(crate) async fn send(
        &self,
        request: RequestBuilder,
        token: Option<&SecretString>,
    ) -> Result<Response, Error> {
        let request = match token {
            Some(token) => request.header(AUTHENTICATION_HEADER, token.expose_secret()),
            None => request,
        };
        let resp = request.send().await.map_err(Error::Transport)?;
        check_status(resp).await
    }

    /// Send a POST request with JSON body and decode the JSON response.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        token: &SecretString,
        body: &impl serde::Serialize,
    ) -> Result<T, Error> {
        debug!("POST {}", url);
        let resp = self.send(self.http.post(url).json(body), Some(token)).await?;
        decode(resp).await
    }

    /// Send a PUT request with JSON body and decode the JSON response.
    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        url: Url,
        token: &SecretString,
        body: &impl serde::Serialize,
    ) -> Result<T, Error> {
        debug!("PUT {}", url);
        let resp = self.send(self.http.put(url).json(body), Some(token)).await?;
        decode(resp).await
    }

    /// Send a DELETE request, discarding any response body.
    pub(crate) async fn delete(&self, url: Url, token: &SecretString) -> Result<(), Error> {
        debug!("DELETE {}", url);
        self.send(self.http.delete(url), Some(token)).await?;
        Ok(())
    }
}

/// Pass 2xx responses through; turn anything else into `Error::Http`.
pub(crate) async fn check_status(resp: Response) -> Result<Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(Error::Http {
        status: status.as_u16(),
        message: error_message(status, &body),
    })
}

/// Decode a JSON body, failing with the raw body attached.
pub(crate) async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, Error> {
    let body = resp.text().await.map_err(Error::Transport)?;
    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body,
    })
}

/// Human-readable message for a failed response.
///
/// 400/401/500 carry a JSON `{ "Message": ... }` body when the server raised
/// the error itself; other statuses come from intermediaries.
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    let reason = status.canonical_reason().unwrap_or("");
    match status.as_u16() {
        400 | 401 | 500 => {
            let trimmed = body.trim_start();
            if trimmed.starts_with('{') {
                if let Ok(ErrorBody { message: Some(msg) }) = serde_json::from_str::<ErrorBody>(trimmed) {
                    return msg;
                }
            }
            format!("Error connecting to server. {} {}", status.as_u16(), reason)
        }
        code => format!("Unexpected HTTP error: {code} {reason}"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::with_client(reqwest::Client::new(), Url::parse(base).unwrap())
    }

    #[test]
    fn api_url_tolerates_trailing_slash() {
        let a = client("http://localhost:8989").api_url("users").unwrap();
        let b = client("http://localhost:8989/").api_url("users").unwrap();
        assert_eq!(a.as_str(), "http://localhost:8989/api/users");
        assert_eq!(a, b);
    }

    #[test]
    fn api_url_keeps_base_path() {
        let url = client("https://logs.example.com/chililog")
            .api_url("repository_info/")
            .unwrap();
        assert_eq!(url.as_str(), "https://logs.example.com/chililog/api/repository_info/");
    }

    #[test]
    fn server_message_is_used_for_json_bodies() {
        let msg = error_message(
            StatusCode::BAD_REQUEST,
            r#"{"Message":"Repository name 'x' already exists"}"#,
        );
        assert_eq!(msg, "Repository name 'x' already exists");
    }

    #[test]
    fn non_json_server_error_gets_generic_message() {
        let msg = error_message(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        assert_eq!(msg, "Error connecting to server. 500 Internal Server Error");
    }

    #[test]
    fn json_without_message_falls_back() {
        let msg = error_message(StatusCode::UNAUTHORIZED, r#"{"Other":1}"#);
        assert_eq!(msg, "Error connecting to server. 401 Unauthorized");
    }

    #[test]
    fn other_statuses_are_unexpected() {
        let msg = error_message(StatusCode::NOT_FOUND, r#"{"Message":"ignored"}"#);
        assert_eq!(msg, "Unexpected HTTP error: 404 Not Found");
    }
}
