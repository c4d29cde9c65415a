// Document CRUD endpoints
//
// Repository configuration and users share one REST shape:
// list at `GET /api/{resource}`, create at `POST /api/{resource}/`,
// update/delete at `/api/{resource}/{id}`. Repository runtime records are
// list-only.

use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;
use strum::{AsRefStr, Display};
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;

/// A server collection of versioned documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
pub enum Resource {
    #[strum(serialize = "repository_info")]
    RepositoryInfo,
    #[strum(serialize = "repositories")]
    Repositories,
    #[strum(serialize = "users")]
    Users,
}

impl ApiClient {
    /// List every document in a collection.
    ///
    /// `GET /api/{resource}`. A `null` or empty body is an empty list.
    pub async fn list_documents<T: DeserializeOwned>(
        &self,
        resource: Resource,
        token: &SecretString,
    ) -> Result<Vec<T>, Error> {
        let url = self.api_url(resource.as_ref())?;
        debug!(%resource, "GET {}", url);

        let resp = self.send(self.http().get(url), Some(token)).await?;
        let body = resp.text().await.map_err(Error::Transport)?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        let items: Option<Vec<T>> =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body,
            })?;
        Ok(items.unwrap_or_default())
    }

    /// Create a document; the server assigns its identifier.
    ///
    /// `POST /api/{resource}/`
    pub async fn create_document<B: Serialize, T: DeserializeOwned>(
        &self,
        resource: Resource,
        token: &SecretString,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.api_url(&format!("{resource}/"))?;
        debug!(%resource, "creating document");
        self.post(url, token, body).await
    }

    /// Update an existing document.
    ///
    /// `PUT /api/{resource}/{id}`
    pub async fn update_document<B: Serialize, T: DeserializeOwned>(
        &self,
        resource: Resource,
        token: &SecretString,
        document_id: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.api_url(&format!("{resource}/{document_id}"))?;
        debug!(%resource, document_id, "updating document");
        self.put(url, token, body).await
    }

    /// Delete a document.
    ///
    /// `DELETE /api/{resource}/{id}`
    pub async fn delete_document(
        &self,
        resource: Resource,
        token: &SecretString,
        document_id: &str,
    ) -> Result<(), Error> {
        let url = self.api_url(&format!("{resource}/{document_id}"))?;
        debug!(%resource, document_id, "deleting document");
        self.delete(url, token).await
    }
}
