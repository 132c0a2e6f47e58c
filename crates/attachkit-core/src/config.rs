//! Configuration module
//!
//! Environment-driven configuration for the attachment client: chunking and
//! size limits for the upload driver, allowlists for staging validation,
//! and the collaborator API location. Every field has a default so an empty
//! environment yields a working config.

use serde::Deserialize;

use crate::error::AppError;

const DEFAULT_CHUNK_SIZE_BYTES: usize = 256 * 1024;
const DEFAULT_MAX_FILE_SIZE_BYTES: usize = 50 * 1024 * 1024;
const DEFAULT_SIGNED_URL_TTL_SECS: u64 = 900;

#[derive(Clone, Debug, Deserialize)]
pub struct UploadConfig {
    /// Bytes per chunk streamed through a resumable upload session.
    #[serde(default = "default_chunk_size_bytes")]
    pub chunk_size_bytes: usize,
    #[serde(default = "default_max_file_size_bytes")]
    pub max_file_size_bytes: usize,
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
    #[serde(default = "default_allowed_content_types")]
    pub allowed_content_types: Vec<String>,
    #[serde(default = "default_signed_url_ttl_secs")]
    pub signed_url_ttl_secs: u64,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

fn default_chunk_size_bytes() -> usize {
    DEFAULT_CHUNK_SIZE_BYTES
}

fn default_max_file_size_bytes() -> usize {
    DEFAULT_MAX_FILE_SIZE_BYTES
}

fn default_allowed_extensions() -> Vec<String> {
    [
        "jpg", "jpeg", "png", "gif", "webp", "pdf", "doc", "docx", "xls", "xlsx", "txt", "csv",
        "mp4", "zip",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_allowed_content_types() -> Vec<String> {
    [
        "image/jpeg",
        "image/png",
        "image/gif",
        "image/webp",
        "application/pdf",
        "application/msword",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "application/vnd.ms-excel",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "text/plain",
        "text/csv",
        "video/mp4",
        "application/zip",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_signed_url_ttl_secs() -> u64 {
    DEFAULT_SIGNED_URL_TTL_SECS
}

fn default_api_base_url() -> String {
    "http://localhost:3000".to_string()
}

impl Default for UploadConfig {
    fn default() -> Self {
        UploadConfig {
            chunk_size_bytes: default_chunk_size_bytes(),
            max_file_size_bytes: default_max_file_size_bytes(),
            allowed_extensions: default_allowed_extensions(),
            allowed_content_types: default_allowed_content_types(),
            signed_url_ttl_secs: default_signed_url_ttl_secs(),
            api_base_url: default_api_base_url(),
        }
    }
}

impl UploadConfig {
    /// Load from `ATTACHKIT_*` environment variables. List-valued fields use
    /// comma separation (e.g. `ATTACHKIT_ALLOWED_EXTENSIONS=jpg,png,pdf`).
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        envy::prefixed("ATTACHKIT_")
            .from_env::<UploadConfig>()
            .map_err(|e| AppError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = UploadConfig::default();
        assert_eq!(config.chunk_size_bytes, 256 * 1024);
        assert_eq!(config.max_file_size_bytes, 50 * 1024 * 1024);
        assert!(config.allowed_extensions.iter().any(|e| e == "pdf"));
        assert!(config
            .allowed_content_types
            .iter()
            .any(|c| c == "image/jpeg"));
        assert_eq!(config.signed_url_ttl_secs, 900);
    }
}
