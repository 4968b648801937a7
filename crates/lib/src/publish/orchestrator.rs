//! Concurrent upload orchestration.
//!
//! Every discovered article is one independent unit of work: read the XML
//! record, synthesize metadata, upload PDF + XML. Units run on a bounded
//! `buffer_unordered` pool and report exactly one outcome each, in completion
//! order. A failure stays inside its unit's outcome and never aborts the run.
//!
//! Cancellation is cooperative: a cancelled token stops further submission,
//! while units already in flight run to completion and still report — the
//! stream is always drained to its end, so the caller never exits with
//! abandoned work.

use std::path::PathBuf;
use std::sync::Arc;

use futures::future;
use futures::stream::{self, StreamExt};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::bib::{self, BibParseError};
use crate::constants::DEFAULT_CONCURRENCY;
use crate::metadata::{synthesize, SynthesisError};
use crate::publish::client::{PublishError, Publisher, UploadOptions};
use crate::scan::SourceRecord;

/// Everything that can fail for one article.
#[derive(Error, Debug)]
pub enum ArticleError {
    #[error("failed to read bibliographic record {path}: {source}")]
    XmlRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Parse(#[from] BibParseError),
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// The result of one article's publish attempt.
#[derive(Debug)]
pub struct UploadOutcome {
    pub article_id: String,
    /// Known once synthesis has produced the destination identifier.
    pub identifier: Option<String>,
    pub result: Result<(), ArticleError>,
}

/// All outcomes of one pass over the input.
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<UploadOutcome>,
    /// Article ids skipped before submission for lack of an XML record.
    pub skipped: Vec<String>,
}

impl RunReport {
    pub fn uploaded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }
}

/// A record that passed the pre-submission check.
struct Submission {
    record: SourceRecord,
    xml_path: PathBuf,
}

pub struct Orchestrator {
    publisher: Arc<dyn Publisher>,
    concurrency: usize,
    cancel: CancellationToken,
}

impl Orchestrator {
    pub fn new(publisher: Arc<dyn Publisher>) -> Self {
        Self {
            publisher,
            concurrency: DEFAULT_CONCURRENCY,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Token observed before each submission; cancel it to stop feeding the
    /// pool while in-flight uploads finish.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Publishes every submittable article and reports one outcome per
    /// submitted article, in completion order.
    pub async fn run(&self, records: Vec<SourceRecord>) -> RunReport {
        let mut skipped = Vec::new();
        let mut queue = Vec::new();
        for record in records {
            match record.xml_path.clone() {
                None => {
                    info!("no bibliographic record: {}", record.article_id);
                    skipped.push(record.article_id);
                }
                Some(xml_path) => queue.push(Submission { record, xml_path }),
            }
        }

        let mut outcomes = Vec::with_capacity(queue.len());
        let mut units = stream::iter(queue)
            .take_while(|_| future::ready(!self.cancel.is_cancelled()))
            .map(|submission| self.process(submission))
            .buffer_unordered(self.concurrency);

        while let Some(outcome) = units.next().await {
            match &outcome.result {
                Ok(()) => info!(
                    "uploaded: {}",
                    outcome.identifier.as_deref().unwrap_or(&outcome.article_id)
                ),
                Err(err) => warn!("upload failed for {}: {err}", outcome.article_id),
            }
            outcomes.push(outcome);
        }

        if self.cancel.is_cancelled() {
            info!("run cancelled; in-flight uploads were drained");
        }
        RunReport { outcomes, skipped }
    }

    async fn process(&self, submission: Submission) -> UploadOutcome {
        let mut identifier = None;
        let result = self.publish_article(&submission, &mut identifier).await;
        UploadOutcome {
            article_id: submission.record.article_id,
            identifier,
            result,
        }
    }

    async fn publish_article(
        &self,
        submission: &Submission,
        identifier: &mut Option<String>,
    ) -> Result<(), ArticleError> {
        let xml = tokio::fs::read_to_string(&submission.xml_path)
            .await
            .map_err(|source| ArticleError::XmlRead {
                path: submission.xml_path.clone(),
                source,
            })?;
        let bib = bib::parse(&xml)?;
        let metadata = synthesize(&submission.record, &bib)?;
        *identifier = Some(metadata.identifier.clone());

        let files = [
            submission.record.pdf_path.clone(),
            submission.xml_path.clone(),
        ];
        self.publisher
            .upload(
                &metadata.identifier,
                &files,
                &metadata,
                &UploadOptions::default(),
            )
            .await?;
        Ok(())
    }
}
