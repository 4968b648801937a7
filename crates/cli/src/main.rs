//! `folio` command line: publish the article archive or reconcile metadata on
//! one published item.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use folio::config::{SessionCredentials, StorageCredentials};
use folio::{constants, ArchiveClient, ArticleScanner, Orchestrator, ReconcileOutcome, Reconciler};

#[derive(Parser)]
#[command(name = "folio", about = "Publish digitized journal articles to the Internet Archive")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the archive roots and upload every article that has a
    /// bibliographic record.
    Upload {
        #[arg(long, env = "FOLIO_PDF_ROOT", default_value = constants::DEFAULT_PDF_ROOT)]
        pdf_root: PathBuf,
        #[arg(long, env = "FOLIO_XML_ROOT", default_value = constants::DEFAULT_XML_ROOT)]
        xml_root: PathBuf,
        #[arg(long, env = "FOLIO_S3_ENDPOINT", default_value = constants::DEFAULT_S3_ENDPOINT)]
        endpoint: String,
        /// Maximum number of uploads in flight at once.
        #[arg(long, default_value_t = constants::DEFAULT_CONCURRENCY)]
        concurrency: usize,
    },
    /// Overlay metadata onto an already-published item.
    Reconcile {
        /// The item identifier at the destination.
        identifier: String,
        /// JSON object of fields to set, e.g. '{"title": "Corrected title"}'.
        #[arg(long)]
        metadata: String,
        #[arg(long, default_value = "metadata")]
        target: String,
        #[arg(long, env = "FOLIO_METADATA_ENDPOINT", default_value = constants::DEFAULT_METADATA_ENDPOINT)]
        endpoint: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match Cli::parse().command {
        Command::Upload {
            pdf_root,
            xml_root,
            endpoint,
            concurrency,
        } => upload(pdf_root, xml_root, endpoint, concurrency).await,
        Command::Reconcile {
            identifier,
            metadata,
            target,
            endpoint,
        } => reconcile(identifier, metadata, target, endpoint).await,
    }
}

async fn upload(
    pdf_root: PathBuf,
    xml_root: PathBuf,
    endpoint: String,
    concurrency: usize,
) -> Result<()> {
    let credentials = StorageCredentials::from_env()?;
    let records = ArticleScanner::new(pdf_root, xml_root).scan()?;
    info!("discovered {} articles", records.len());

    let client = Arc::new(ArchiveClient::new(endpoint, credentials));
    let orchestrator = Orchestrator::new(client).with_concurrency(concurrency);

    let token = orchestrator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received; draining in-flight uploads");
            token.cancel();
        }
    });

    let report = orchestrator.run(records).await;
    println!();
    println!("Upload run complete");
    println!("  uploaded: {}", report.uploaded());
    println!("  failed:   {}", report.failed());
    println!("  skipped:  {}", report.skipped.len());
    Ok(())
}

async fn reconcile(
    identifier: String,
    metadata: String,
    target: String,
    endpoint: String,
) -> Result<()> {
    let credentials = SessionCredentials::from_env()?;
    let overlay: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&metadata)?;

    let reconciler = Reconciler::new(endpoint, credentials);
    match reconciler.reconcile(&identifier, &overlay, &target).await? {
        ReconcileOutcome::NoChanges => println!("No changes made to metadata."),
        ReconcileOutcome::Applied(body) => println!("{body}"),
    }
    Ok(())
}
