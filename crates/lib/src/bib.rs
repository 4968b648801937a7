//! Bibliographic record parser.
//!
//! A record is a flat XML document: leaf elements carry scalar fields, and
//! elements one level deep carry repeated entries (authors with named
//! subfields, language lists). No deeper nesting exists in the corpus, so the
//! parser supports exactly these two shapes and surfaces anything else as a
//! parse error rather than guessing.

use std::collections::BTreeMap;
use thiserror::Error;

/// Layout-only element that is always dropped from the record.
const RESERVED_TAG: &str = "pages";

#[derive(Error, Debug)]
pub enum BibParseError {
    #[error("malformed bibliographic XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("element '{tag}' has no text content")]
    MissingText { tag: String },
}

/// One entry inside a structured field such as `authors`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BibItem {
    /// Free text carried directly by a child element.
    Text(String),
    /// A named subfield carried by a grandchild element.
    Pair { name: String, value: String },
}

/// The value of one top-level field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BibValue {
    Scalar(String),
    Items(Vec<BibItem>),
}

/// A parsed bibliographic record: every top-level element tag maps to exactly
/// one value, in deterministic order.
#[derive(Debug, Clone, Default)]
pub struct BibRecord {
    fields: BTreeMap<String, BibValue>,
}

impl BibRecord {
    pub fn get(&self, tag: &str) -> Option<&BibValue> {
        self.fields.get(tag)
    }

    /// The field's text, when it is a scalar.
    pub fn scalar(&self, tag: &str) -> Option<&str> {
        match self.fields.get(tag) {
            Some(BibValue::Scalar(text)) => Some(text),
            _ => None,
        }
    }

    /// The field's entries, when it is structured.
    pub fn items(&self, tag: &str) -> Option<&[BibItem]> {
        match self.fields.get(tag) {
            Some(BibValue::Items(items)) => Some(items),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Parses one bibliographic XML document.
///
/// Leaf elements must carry text: a record where a scalar field is an empty
/// element is malformed, and turning it into an empty string here would hide
/// the problem from every downstream rule.
pub fn parse(xml: &str) -> Result<BibRecord, BibParseError> {
    let document = roxmltree::Document::parse(xml)?;
    let mut fields = BTreeMap::new();

    for element in document.root_element().children().filter(|n| n.is_element()) {
        let tag = element.tag_name().name();
        if tag == RESERVED_TAG {
            continue;
        }

        let children: Vec<_> = element.children().filter(|n| n.is_element()).collect();
        if children.is_empty() {
            let text = element.text().ok_or_else(|| BibParseError::MissingText {
                tag: tag.to_string(),
            })?;
            fields.insert(tag.to_string(), BibValue::Scalar(text.trim().to_string()));
            continue;
        }

        let mut items = Vec::new();
        for child in children {
            if let Some(text) = child.text() {
                let text = text.trim();
                if !text.is_empty() {
                    items.push(BibItem::Text(text.to_string()));
                }
            }
            for grandchild in child.children().filter(|n| n.is_element()) {
                let name = grandchild.tag_name().name();
                let text = grandchild.text().ok_or_else(|| BibParseError::MissingText {
                    tag: name.to_string(),
                })?;
                items.push(BibItem::Pair {
                    name: name.to_string(),
                    value: text.trim().to_string(),
                });
            }
        }
        fields.insert(tag.to_string(), BibValue::Items(items));
    }

    Ok(BibRecord { fields })
}
