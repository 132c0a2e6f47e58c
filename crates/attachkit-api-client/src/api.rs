//! Domain methods for the attachment services.

use uuid::Uuid;

use attachkit_core::{AttachmentRecord, FileMetadata, SignedUrl, TargetId};

use crate::{api_prefix, ApiClient, ApiResult};

/// List response envelope used by the attachment endpoints.
#[derive(Debug, serde::Deserialize)]
pub struct AttachmentListResponse {
    pub data: Vec<AttachmentRecord>,
}

impl ApiClient {
    /// Attachments currently stored for a target.
    pub async fn list_attachments(&self, target: &TargetId) -> ApiResult<Vec<AttachmentRecord>> {
        let path = format!(
            "{}/targets/{}/attachments",
            api_prefix(),
            urlencoding::encode(target.as_str())
        );
        let response: AttachmentListResponse = self.get(&path, &[]).await?;
        Ok(response.data)
    }

    /// Issue the remote deletion for a stored attachment. Client state
    /// cleanup (`commit_removals`) is the caller's follow-up.
    pub async fn delete_attachment(&self, id: Uuid) -> ApiResult<()> {
        self.delete(&format!("{}/attachments/{}", api_prefix(), id))
            .await
    }

    /// Metadata for an uploaded file, by the token the upload endpoint
    /// returned.
    pub async fn file_metadata(&self, token: &str) -> ApiResult<FileMetadata> {
        let path = format!(
            "{}/files/{}/metadata",
            api_prefix(),
            urlencoding::encode(token)
        );
        self.get(&path, &[]).await
    }

    /// Time-limited URL for direct retrieval of a stored attachment.
    pub async fn signed_url(&self, id: Uuid) -> ApiResult<SignedUrl> {
        self.get(&format!("{}/attachments/{}/signed-url", api_prefix(), id), &[])
            .await
    }
}
