// Repository runtime endpoints
//
// Runtime status of each repository and the actions that change it.

use secrecy::SecretString;
use strum::{AsRefStr, Display};
use tracing::debug;

use crate::client::ApiClient;
use crate::documents::Resource;
use crate::error::Error;
use crate::models::RepositoryAo;

/// Runtime action accepted by `POST /api/repositories/{id}?action=...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum RepositoryAction {
    /// Bring online (read + write).
    Start,
    /// Take offline.
    Stop,
    /// Online for reads, writes rejected.
    #[strum(serialize = "readonly")]
    ReadOnly,
}

impl ApiClient {
    /// List runtime status for every repository.
    ///
    /// `GET /api/repositories`
    pub async fn list_repositories(&self, token: &SecretString) -> Result<Vec<RepositoryAo>, Error> {
        self.list_documents(Resource::Repositories, token).await
    }

    /// Apply a runtime action to one repository, returning its new state.
    ///
    /// `POST /api/repositories/{id}?action={action}`
    pub async fn repository_action(
        &self,
        token: &SecretString,
        document_id: &str,
        action: RepositoryAction,
    ) -> Result<RepositoryAo, Error> {
        let url = self.api_url(&format!("repositories/{document_id}?action={action}"))?;
        debug!(document_id, %action, "repository action");
        self.post(url, token, &serde_json::Value::Null).await
    }
}
