//! Metadata synthesis.
//!
//! Turns one parsed bibliographic record into the destination-ready metadata
//! document, applying every derivation and fallback rule. Two failure
//! policies coexist here and the distinction is deliberate: fields that would
//! misfile an item when wrong (identifier, per-journal collection, an author
//! entry that cannot be resolved) are hard errors that abort synthesis for
//! that single article, while fields with a defined "leave absent" fallback
//! (page-count estimate, language, date) are simply omitted.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::bib::{BibItem, BibRecord, BibValue};
use crate::constants::{
    ADDITIONAL_COLLECTIONS, CONTRIBUTOR, EJC_COLLECTION, IDENTIFIER_PREFIX,
    JOURNAL_COLLECTION_PREFIX, MEDIATYPE, STABLE_URL_PREFIX,
};
use crate::describe::render_description;
use crate::scan::SourceRecord;

#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("required bibliographic field '{0}' is missing")]
    MissingField(&'static str),
    #[error("author entry has no usable name subfield")]
    UnresolvableCreator,
    #[error("failed to render description: {0}")]
    Template(#[from] minijinja::Error),
}

/// The destination-ready metadata document for one article.
///
/// Serialization skips absent fields; [`PublishMetadata::to_document`]
/// additionally drops empty strings and empty lists, so the wire form never
/// carries an empty value.
#[derive(Debug, Clone, Serialize)]
pub struct PublishMetadata {
    pub identifier: String,
    pub mediatype: String,
    pub title: String,
    pub contributor: String,
    pub collection: Vec<String>,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journaltitle: Option<String>,
    pub journalabbrv: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagerange: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(rename = "external-identifier", skip_serializing_if = "Vec::is_empty")]
    pub external_identifier: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imagecount: Option<String>,
    pub description: String,
}

impl PublishMetadata {
    /// The pruned wire form: absent fields, empty strings, and empty lists
    /// are removed. Pruning is defined exactly this way rather than as a
    /// generic falsiness check, so a legitimately-zero numeric field added
    /// later would survive.
    pub fn to_document(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(fields)) => fields
                .into_iter()
                .filter(|(_, value)| !is_empty_value(value))
                .collect(),
            _ => Map::new(),
        }
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Builds the publish metadata for one article.
pub fn synthesize(
    record: &SourceRecord,
    bib: &BibRecord,
) -> Result<PublishMetadata, SynthesisError> {
    debug!(article = %record.article_id, "synthesizing publish metadata");

    // Load-bearing fields first: without an external id or an abbreviated
    // journal name the item cannot be filed, and there is no fallback.
    let id = bib.scalar("id").ok_or(SynthesisError::MissingField("id"))?;
    let identifier = format!(
        "{IDENTIFIER_PREFIX}{}",
        id.rsplit('/').next().unwrap_or(id)
    );

    let journalabbrv = bib
        .scalar("journalabbrv")
        .ok_or(SynthesisError::MissingField("journalabbrv"))?
        .to_string();
    let collection = vec![
        format!("{JOURNAL_COLLECTION_PREFIX}{journalabbrv}"),
        EJC_COLLECTION.to_string(),
        ADDITIONAL_COLLECTIONS.to_string(),
    ];

    let journaltitle = bib.scalar("journaltitle").map(str::to_string);
    let date = bib.scalar("pubdate").map(str::to_string);
    let pagerange = bib.scalar("pagerange").map(str::to_string);

    let title = match bib.scalar("title").filter(|t| !t.is_empty()) {
        Some(title) => title.to_string(),
        None => untitled_fallback(
            journaltitle.as_deref(),
            date.as_deref(),
            pagerange.as_deref(),
        )?,
    };

    let creator = resolve_creator(bib)?;
    let language = bib.items("languages").and_then(|items| {
        items.first().and_then(|item| match item {
            BibItem::Text(text) => Some(text.clone()),
            BibItem::Pair { .. } => None,
        })
    });

    let external_identifier = external_identifiers(bib, id);
    let imagecount = pagerange.as_deref().and_then(estimate_imagecount);

    let mut metadata = PublishMetadata {
        identifier,
        mediatype: MEDIATYPE.to_string(),
        title,
        contributor: CONTRIBUTOR.to_string(),
        collection,
        source: format!("{STABLE_URL_PREFIX}{id}"),
        creator,
        publisher: journaltitle.clone(),
        journaltitle,
        journalabbrv,
        article_type: bib.scalar("type").map(str::to_string),
        date,
        volume: bib.scalar("volume").map(str::to_string),
        pagerange,
        issn: bib.scalar("issn").map(str::to_string),
        language,
        external_identifier,
        imagecount,
        description: String::new(),
    };

    let context = serde_json::to_value(&metadata).unwrap_or(Value::Null);
    metadata.description = render_description(&context)?;
    Ok(metadata)
}

/// Placeholder title for records without one. The destination requires a
/// non-empty title, so a human-readable "[untitled]" line is synthesized from
/// the journal, date, and page range; those three fields become required the
/// moment the title is absent.
fn untitled_fallback(
    journaltitle: Option<&str>,
    date: Option<&str>,
    pagerange: Option<&str>,
) -> Result<String, SynthesisError> {
    let journal = journaltitle.ok_or(SynthesisError::MissingField("journaltitle"))?;
    let date = date.ok_or(SynthesisError::MissingField("pubdate"))?;
    let range = pagerange.ok_or(SynthesisError::MissingField("pagerange"))?;
    if range.contains('-') {
        Ok(format!("[untitled] {journal}, ({date}), pages {range}"))
    } else {
        Ok(format!("[untitled] {journal} ({date}), page {range}"))
    }
}

/// Resolves the creator from the structured author entries.
///
/// Priority: surname + given names, then a free-text string name, then the
/// surname alone. An `authors` field that yields none of these is a hard
/// error; a record with no `authors` field at all legitimately has no
/// creator.
fn resolve_creator(bib: &BibRecord) -> Result<Option<String>, SynthesisError> {
    let items = match bib.get("authors") {
        None => return Ok(None),
        Some(BibValue::Scalar(_)) => return Err(SynthesisError::UnresolvableCreator),
        Some(BibValue::Items(items)) => items,
    };

    let mut surname = None;
    let mut givennames = None;
    let mut stringname = None;
    for item in items {
        if let BibItem::Pair { name, value } = item {
            match name.as_str() {
                "surname" => surname = Some(value.as_str()),
                "givennames" => givennames = Some(value.as_str()),
                "stringname" => stringname = Some(value.as_str()),
                _ => {}
            }
        }
    }

    let trim = |name: &str| name.trim_matches(|c| c == ' ' || c == ',').to_string();
    if let Some(given) = givennames {
        let surname = surname.ok_or(SynthesisError::MissingField("surname"))?;
        return Ok(Some(format!("{}, {}", trim(surname), trim(given))));
    }
    if let Some(name) = stringname.filter(|n| !n.is_empty()) {
        return Ok(Some(trim(name)));
    }
    if let Some(name) = surname.filter(|n| !n.is_empty()) {
        return Ok(Some(trim(name)));
    }
    Err(SynthesisError::UnresolvableCreator)
}

/// One namespaced identifier per known non-empty source id, in fixed order.
fn external_identifiers(bib: &BibRecord, article_id: &str) -> Vec<String> {
    let fields = [
        ("headid", bib.scalar("headid")),
        ("journalid", bib.scalar("journalid")),
        ("issueid", bib.scalar("issueid")),
        ("articleid", Some(article_id)),
    ];
    fields
        .into_iter()
        .filter_map(|(name, value)| {
            value
                .filter(|v| !v.is_empty())
                .map(|v| format!("urn:jstor-{name}:{v}"))
        })
        .collect()
}

/// Page-image estimate from the page range.
///
/// A single page still scans to two images because the source inserts a cover
/// page; a range gains the cover page plus one for the inclusive numbering.
/// Unparseable page numbers leave the estimate absent.
fn estimate_imagecount(pagerange: &str) -> Option<String> {
    let mut segments = pagerange.rsplit('-');
    let last = segments.next()?;
    match segments.next() {
        None => Some("2".to_string()),
        Some(previous) => {
            let last: i64 = last.trim().parse().ok()?;
            let previous: i64 = previous.trim().parse().ok()?;
            Some((last - previous + 2).to_string())
        }
    }
}
