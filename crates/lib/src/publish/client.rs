//! Upload transport.
//!
//! The destination exposes an S3-like interface: one PUT per file under the
//! item identifier, with the item metadata carried as `x-archive-meta…`
//! headers on the first PUT. [`Publisher`] is the seam the orchestrator works
//! against; [`ArchiveClient`] is the real implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::StorageCredentials;
use crate::metadata::PublishMetadata;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("file has no usable name: {0}")]
    BadFileName(PathBuf),
    #[error("metadata field '{field}' cannot be sent as a header")]
    InvalidMetadataHeader { field: String },
    #[error("upload request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("destination rejected {file}: {status}")]
    Rejected { file: String, status: StatusCode },
}

/// Policy flags for one upload.
#[derive(Debug, Clone, Copy)]
pub struct UploadOptions {
    /// Queue the destination-side job that generates alternate renditions.
    pub queue_derive: bool,
    /// Overwrite the metadata of an item that already exists. Off by
    /// default: a re-run must not silently clobber a published item.
    pub ignore_preexisting_bucket: bool,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            queue_derive: true,
            ignore_preexisting_bucket: false,
        }
    }
}

/// The upload seam. One call publishes all of an item's files plus its
/// metadata; implementations report plain success or failure and never retry.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn upload(
        &self,
        identifier: &str,
        files: &[PathBuf],
        metadata: &PublishMetadata,
        options: &UploadOptions,
    ) -> Result<(), PublishError>;
}

/// Publishes items over the destination's S3-like HTTP interface.
pub struct ArchiveClient {
    http: reqwest::Client,
    endpoint: String,
    credentials: StorageCredentials,
}

impl ArchiveClient {
    pub fn new(endpoint: impl Into<String>, credentials: StorageCredentials) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            credentials,
        }
    }

    fn authorization(&self) -> String {
        format!(
            "LOW {}:{}",
            self.credentials.access_key, self.credentials.secret_key
        )
    }

    /// Encodes the pruned metadata document as `x-archive-meta…` headers.
    /// Repeated fields use the indexed `x-archive-metaNN-<field>` form.
    fn metadata_headers(
        metadata: &PublishMetadata,
    ) -> Result<Vec<(HeaderName, HeaderValue)>, PublishError> {
        let mut headers = Vec::new();
        for (field, value) in metadata.to_document() {
            match value {
                Value::Array(values) => {
                    for (index, entry) in values.iter().enumerate() {
                        let name = format!("x-archive-meta{:02}-{field}", index + 1);
                        headers.push(header_pair(&name, &field, entry)?);
                    }
                }
                other => {
                    let name = format!("x-archive-meta-{field}");
                    headers.push(header_pair(&name, &field, &other)?);
                }
            }
        }
        Ok(headers)
    }
}

fn header_pair(
    name: &str,
    field: &str,
    value: &Value,
) -> Result<(HeaderName, HeaderValue), PublishError> {
    let text = match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    let name = HeaderName::try_from(name).map_err(|_| PublishError::InvalidMetadataHeader {
        field: field.to_string(),
    })?;
    let value = HeaderValue::from_str(&text).map_err(|_| PublishError::InvalidMetadataHeader {
        field: field.to_string(),
    })?;
    Ok((name, value))
}

#[async_trait]
impl Publisher for ArchiveClient {
    async fn upload(
        &self,
        identifier: &str,
        files: &[PathBuf],
        metadata: &PublishMetadata,
        options: &UploadOptions,
    ) -> Result<(), PublishError> {
        for (index, file) in files.iter().enumerate() {
            let file_name = file_name(file)?;
            let body = tokio::fs::read(file).await.map_err(|source| {
                PublishError::FileRead {
                    path: file.clone(),
                    source,
                }
            })?;

            let url = format!(
                "{}/{identifier}/{file_name}",
                self.endpoint.trim_end_matches('/')
            );
            let mut request = self
                .http
                .put(&url)
                .header(AUTHORIZATION, self.authorization())
                .header(
                    "x-archive-queue-derive",
                    if options.queue_derive { "1" } else { "0" },
                )
                .body(body);

            // Metadata travels with the first file, which also creates the
            // bucket when it does not exist yet.
            if index == 0 {
                request = request.header("x-archive-auto-make-bucket", "1");
                if options.ignore_preexisting_bucket {
                    request = request.header("x-archive-ignore-preexisting-bucket", "1");
                }
                for (name, value) in Self::metadata_headers(metadata)? {
                    request = request.header(name, value);
                }
            }

            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(PublishError::Rejected {
                    file: file_name.to_string(),
                    status,
                });
            }
            debug!(identifier, file = file_name, "file stored");
        }
        Ok(())
    }
}

fn file_name(path: &Path) -> Result<&str, PublishError> {
    path.file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| PublishError::BadFileName(path.to_path_buf()))
}
