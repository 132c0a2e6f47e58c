//! File validation for staged uploads.

use crate::config::UploadConfig;
use crate::error::AppError;

const MAX_FILENAME_LEN: usize = 255;

/// Reduce a user-supplied filename to a safe form: basename only, traversal
/// sequences rejected outright, characters outside a small allowlist
/// replaced, length capped.
pub fn sanitize_filename(filename: &str) -> String {
    let base = std::path::Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);
    if base.contains("..") {
        return "invalid_filename".to_string();
    }
    let safe: String = base
        .chars()
        .take(MAX_FILENAME_LEN)
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if safe.trim().is_empty() || safe.len() < 3 {
        "file".to_string()
    } else {
        safe
    }
}

/// Validates a staged file against configured limits before it enters the
/// upload queue.
#[derive(Debug, Clone)]
pub struct FileValidator {
    max_file_size: usize,
    allowed_extensions: Vec<String>,
    allowed_content_types: Vec<String>,
}

impl FileValidator {
    pub fn new(
        max_file_size: usize,
        allowed_extensions: Vec<String>,
        allowed_content_types: Vec<String>,
    ) -> Self {
        FileValidator {
            max_file_size,
            allowed_extensions,
            allowed_content_types,
        }
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        FileValidator::new(
            config.max_file_size_bytes,
            config.allowed_extensions.clone(),
            config.allowed_content_types.clone(),
        )
    }

    pub fn validate(
        &self,
        filename: &str,
        content_type: &str,
        size_bytes: u64,
    ) -> Result<(), AppError> {
        if size_bytes == 0 {
            return Err(AppError::InvalidInput("File is empty".to_string()));
        }
        if size_bytes > self.max_file_size as u64 {
            return Err(AppError::PayloadTooLarge(format!(
                "{} bytes exceeds limit of {} bytes",
                size_bytes, self.max_file_size
            )));
        }
        let extension = filename.rsplit('.').next().unwrap_or("").to_lowercase();
        if !self.allowed_extensions.iter().any(|e| e == &extension) {
            return Err(AppError::InvalidInput(format!(
                "File extension '{}' is not allowed",
                extension
            )));
        }
        if !self.allowed_content_types.iter().any(|c| c == content_type) {
            return Err(AppError::InvalidInput(format!(
                "Content type '{}' is not allowed",
                content_type
            )));
        }
        Ok(())
    }
}
