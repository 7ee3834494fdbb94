//! HTTP client for the room collection.

use serde_json::json;
use thiserror::Error;

use crate::model::{NewRoom, RoomPatch, RoomRecord};

/// Failures surfaced to the user: transport errors, or a non-success
/// response carried with its status and body text.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
}

pub struct RoomsClient {
    http: reqwest::Client,
    base_url: String,
}

impl RoomsClient {
    /// `base_url` is the server origin, e.g. `http://127.0.0.1:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        RoomsClient {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/api/users", self.base_url)
    }

    async fn ok_or_status(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        Err(ClientError::Status { status, body })
    }

    /// All saved rooms, in the collection's stable order.
    pub async fn list(&self) -> Result<Vec<RoomRecord>, ClientError> {
        let resp = self.http.get(self.collection_url()).send().await?;
        Ok(Self::ok_or_status(resp).await?.json().await?)
    }

    /// One room by its opaque identifier.
    pub async fn fetch_by_uid(&self, uid: &str) -> Result<RoomRecord, ClientError> {
        let resp = self
            .http
            .get(self.collection_url())
            .query(&[("uid", uid)])
            .send()
            .await?;
        Ok(Self::ok_or_status(resp).await?.json().await?)
    }

    pub async fn create(&self, room: &NewRoom) -> Result<RoomRecord, ClientError> {
        let resp = self
            .http
            .post(self.collection_url())
            .json(&json!({
                "name": room.name,
                "appliedImagesData": room.stages,
                "uniqueId": room.unique_id,
            }))
            .send()
            .await?;
        Ok(Self::ok_or_status(resp).await?.json().await?)
    }

    /// Partial update: only the fields set on the patch go on the wire.
    pub async fn update_by_uid(
        &self,
        uid: &str,
        patch: &RoomPatch,
    ) -> Result<RoomRecord, ClientError> {
        let mut body = serde_json::Map::new();
        if let Some(name) = &patch.name {
            body.insert("name".into(), json!(name));
        }
        if let Some(stages) = &patch.stages {
            body.insert("appliedImagesData".into(), json!(stages));
        }
        let resp = self
            .http
            .patch(self.collection_url())
            .query(&[("uid", uid)])
            .json(&body)
            .send()
            .await?;
        Ok(Self::ok_or_status(resp).await?.json().await?)
    }

    pub async fn delete_by_uid(&self, uid: &str) -> Result<(), ClientError> {
        let resp = self
            .http
            .delete(self.collection_url())
            .query(&[("uid", uid)])
            .send()
            .await?;
        Self::ok_or_status(resp).await?;
        Ok(())
    }
}
