//! Metadata reconciliation for already-published items.
//!
//! Instead of re-uploading, an item's metadata is moved to a desired state
//! with a differential patch: fetch the current remote metadata, overlay the
//! desired fields, diff, and apply the minimal set of operations in a single
//! write. The destination's patch endpoint speaks an older JSON-Patch draft
//! than the diff library produces, so the computed operations are translated
//! from `{"op": …, "path": …, "value": …}` to the flattened
//! `{"<op>": "<path>", "value": …}` wire shape before sending.

use reqwest::header::COOKIE;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::SessionCredentials;

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("metadata request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to encode patch: {0}")]
    Encode(#[from] serde_json::Error),
}

/// What a reconciliation pass did.
#[derive(Debug, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The remote state already reflects the overlay; nothing was written.
    NoChanges,
    /// The patch was applied; carries the raw response body.
    Applied(String),
}

pub struct Reconciler {
    http: reqwest::Client,
    base_url: String,
    credentials: SessionCredentials,
}

impl Reconciler {
    pub fn new(base_url: impl Into<String>, credentials: SessionCredentials) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            credentials,
        }
    }

    /// Overlays `overlay` onto the item's current `target` metadata and
    /// applies the minimal patch. One read request, at most one write.
    pub async fn reconcile(
        &self,
        identifier: &str,
        overlay: &Map<String, Value>,
        target: &str,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let url = format!(
            "{}/metadata/{identifier}",
            self.base_url.trim_end_matches('/')
        );

        let body: Value = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let current = body
            .get(target)
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        let mut desired = current.clone();
        for (field, value) in overlay {
            desired.insert(field.clone(), value.clone());
        }

        let patch = draft02_patch(&Value::Object(current), &Value::Object(desired))?;
        if patch.is_empty() {
            return Ok(ReconcileOutcome::NoChanges);
        }

        let response = self
            .http
            .patch(&url)
            .query(&[
                ("-patch", serde_json::to_string(&patch)?),
                ("-target", target.to_string()),
            ])
            .header(COOKIE, self.credentials.cookie_header())
            .send()
            .await?
            .error_for_status()?;
        Ok(ReconcileOutcome::Applied(response.text().await?))
    }
}

/// Diffs two metadata states and returns the operations in the destination's
/// draft-02 wire shape. Works on the serialized operations, so the shape of
/// the diff library's own types never leaks into the protocol.
pub fn draft02_patch(current: &Value, desired: &Value) -> Result<Vec<Value>, serde_json::Error> {
    let operations = serde_json::to_value(json_patch::diff(current, desired))?;
    let Value::Array(operations) = operations else {
        return Ok(Vec::new());
    };

    let mut flattened = Vec::new();
    for operation in operations {
        let (Some(op), Some(path)) = (
            operation.get("op").and_then(Value::as_str),
            operation.get("path").cloned(),
        ) else {
            continue;
        };
        let mut entry = Map::new();
        entry.insert(op.to_string(), path);
        if let Some(value) = operation.get("value") {
            entry.insert("value".to_string(), value.clone());
        }
        flattened.push(Value::Object(entry));
    }
    Ok(flattened)
}
