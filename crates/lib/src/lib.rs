//! # `folio`: JSTOR Early Journal Content publisher
//!
//! This library publishes a local archive of digitized journal articles to the
//! Internet Archive. Each article is a PDF plus a companion bibliographic XML
//! record; `folio` parses the record, synthesizes a destination-ready metadata
//! document from it, and uploads files and metadata with bounded concurrency.
//! Items that were already published can have their metadata reconciled with a
//! differential patch instead of a re-upload.
//!
//! The pipeline, in order:
//!
//! 1. [`scan::ArticleScanner`] discovers PDFs and pairs them with XML records.
//! 2. [`bib::parse`] turns one XML record into a [`bib::BibRecord`] mapping.
//! 3. [`metadata::synthesize`] applies the derivation and fallback rules and
//!    produces a [`metadata::PublishMetadata`].
//! 4. [`publish::Orchestrator`] runs the upload units concurrently against a
//!    [`publish::Publisher`] implementation such as [`publish::ArchiveClient`].
//! 5. [`reconcile::Reconciler`] patches metadata on already-published items.

pub mod bib;
pub mod config;
pub mod constants;
pub mod describe;
pub mod metadata;
pub mod publish;
pub mod reconcile;
pub mod scan;

pub use bib::{BibItem, BibRecord, BibValue};
pub use metadata::{synthesize, PublishMetadata, SynthesisError};
pub use publish::{
    ArchiveClient, ArticleError, Orchestrator, PublishError, Publisher, RunReport, UploadOptions,
    UploadOutcome,
};
pub use reconcile::{ReconcileOutcome, Reconciler};
pub use scan::{ArticleScanner, SourceRecord};
