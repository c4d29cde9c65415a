// Authentication endpoints
//
// Token-based sessions. Login returns the token in the
// `X-Chililog-Authentication` response header; every later request sends it
// back in the same header. Login and session fetch both require the server
// version headers.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::client::{ApiClient, decode};
use crate::error::Error;
use crate::headers::{AUTHENTICATION_HEADER, ServerInfo, required_header};
use crate::models::{AuthenticatedUserAo, ExpiryType};

/// Result of a successful authentication exchange.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub token: SecretString,
    pub server: ServerInfo,
    pub user: AuthenticatedUserAo,
}

impl ApiClient {
    /// Log in with username/password.
    ///
    /// `POST /api/Authentication` with
    /// `{Username, Password, ExpiryType, ExpirySeconds}`.
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
        expiry_type: ExpiryType,
        expiry_seconds: u64,
    ) -> Result<Authenticated, Error> {
        let url = self.api_url("Authentication")?;
        debug!("logging in at {}", url);

        let body = json!({
            "Username": username,
            "Password": password.expose_secret(),
            "ExpiryType": expiry_type,
            "ExpirySeconds": expiry_seconds,
        });

        let resp = self.send(self.http().post(url).json(&body), None).await?;

        let token = required_header(resp.headers(), AUTHENTICATION_HEADER)?;
        let server = ServerInfo::from_headers(resp.headers())?;
        let user: AuthenticatedUserAo = decode(resp).await?;

        debug!(username = %user.username, version = %server.version, "login successful");
        Ok(Authenticated {
            token: SecretString::from(token),
            server,
            user,
        })
    }

    /// Fetch the user that owns `token`.
    ///
    /// `GET /api/Authentication`. The returned `Authenticated` carries the
    /// same token that was passed in.
    pub async fn fetch_session(&self, token: &SecretString) -> Result<Authenticated, Error> {
        let url = self.api_url("Authentication")?;
        debug!("GET {}", url);

        let resp = self.send(self.http().get(url), Some(token)).await?;
        let server = ServerInfo::from_headers(resp.headers())?;
        let user: AuthenticatedUserAo = decode(resp).await?;

        Ok(Authenticated {
            token: token.clone(),
            server,
            user,
        })
    }

    /// Update the logged-in user's own profile.
    ///
    /// `PUT /api/Authentication?action=update_profile`
    pub async fn update_profile(
        &self,
        token: &SecretString,
        profile: &AuthenticatedUserAo,
    ) -> Result<AuthenticatedUserAo, Error> {
        let url = self.api_url("Authentication?action=update_profile")?;
        self.put(url, token, profile).await
    }

    /// Change the logged-in user's password.
    ///
    /// `PUT /api/Authentication?action=change_password`
    pub async fn change_password(
        &self,
        token: &SecretString,
        document_id: &str,
        old_password: &SecretString,
        new_password: &SecretString,
        confirm_new_password: &SecretString,
    ) -> Result<AuthenticatedUserAo, Error> {
        let url = self.api_url("Authentication?action=change_password")?;
        let body = json!({
            "DocumentID": document_id,
            "OldPassword": old_password.expose_secret(),
            "NewPassword": new_password.expose_secret(),
            "ConfirmNewPassword": confirm_new_password.expose_secret(),
        });
        self.put(url, token, &body).await
    }

    /// End the session server-side.
    ///
    /// `DELETE /api/Authentication`
    pub async fn end_session(&self, token: &SecretString) -> Result<(), Error> {
        let url = self.api_url("Authentication")?;
        self.delete(url, token).await?;
        debug!("logout complete");
        Ok(())
    }
}
