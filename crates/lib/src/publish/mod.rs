//! Publication: the upload transport and the concurrent orchestrator.

pub mod client;
pub mod orchestrator;

pub use client::{ArchiveClient, PublishError, Publisher, UploadOptions};
pub use orchestrator::{ArticleError, Orchestrator, RunReport, UploadOutcome};
