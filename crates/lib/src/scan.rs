//! Article discovery.
//!
//! Walks the PDF tree and pairs every content file with its bibliographic XML
//! record. The corpus layout is `<root>/<journal>/<issue>/<item>/<file>.pdf`,
//! and the XML directory holds one `<article-id>.xml` per article.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;
use walkdir::WalkDir;

use crate::constants::ARTICLE_ID_PREFIX;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("archive root not found: {0}")]
    RootNotFound(PathBuf),
    #[error("archive root is not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// One discovered article, immutable once constructed.
#[derive(Debug, Clone)]
pub struct SourceRecord {
    pub pdf_path: PathBuf,
    /// Companion bibliographic record; absent when no XML file exists for the
    /// article id, in which case the article is skipped by the orchestrator.
    pub xml_path: Option<PathBuf>,
    pub journal: String,
    pub issue_dir: String,
    pub article_id: String,
}

impl SourceRecord {
    /// Derives a record from a PDF path, or `None` when the path is too
    /// shallow to carry the journal/issue layout.
    fn from_pdf_path(path: &Path, xml_root: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        let stem = file_name.split('.').next().unwrap_or(file_name);

        let components: Vec<&str> = path.iter().filter_map(|c| c.to_str()).collect();
        if components.len() < 4 {
            return None;
        }
        let journal = components[components.len() - 4].to_string();
        let issue_dir = components[components.len() - 3].to_string();

        let article_id = format!("{ARTICLE_ID_PREFIX}{stem}");
        let xml_path = xml_root.join(format!("{article_id}.xml"));
        Some(Self {
            pdf_path: path.to_path_buf(),
            xml_path: xml_path.exists().then_some(xml_path),
            journal,
            issue_dir,
            article_id,
        })
    }
}

/// Walks a PDF root and yields a [`SourceRecord`] per content file.
pub struct ArticleScanner {
    pdf_root: PathBuf,
    xml_root: PathBuf,
}

impl ArticleScanner {
    pub fn new(pdf_root: impl Into<PathBuf>, xml_root: impl Into<PathBuf>) -> Self {
        Self {
            pdf_root: pdf_root.into(),
            xml_root: xml_root.into(),
        }
    }

    pub fn scan(&self) -> Result<Vec<SourceRecord>, ScanError> {
        if !self.pdf_root.exists() {
            return Err(ScanError::RootNotFound(self.pdf_root.clone()));
        }
        if !self.pdf_root.is_dir() {
            return Err(ScanError::NotADirectory(self.pdf_root.clone()));
        }

        let mut records = Vec::new();
        for entry in WalkDir::new(&self.pdf_root) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("skipping unreadable entry: {err}");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let is_pdf = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
            if !is_pdf {
                continue;
            }
            match SourceRecord::from_pdf_path(path, &self.xml_root) {
                Some(record) => records.push(record),
                None => warn!("path does not match the corpus layout: {}", path.display()),
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn pairs_pdf_with_xml_record() {
        let tmp = tempfile::tempdir().unwrap();
        let pdf_root = tmp.path().join("pdfs");
        let xml_root = tmp.path().join("xml");
        touch(&pdf_root.join("quarterly/issue-03/item/4063065.pdf"));
        touch(&xml_root.join("10.2307_4063065.xml"));

        let records = ArticleScanner::new(&pdf_root, &xml_root).scan().unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.article_id, "10.2307_4063065");
        assert_eq!(record.journal, "quarterly");
        assert_eq!(record.issue_dir, "issue-03");
        assert_eq!(
            record.xml_path.as_deref(),
            Some(xml_root.join("10.2307_4063065.xml").as_path())
        );
    }

    #[test]
    fn missing_xml_record_leaves_path_absent() {
        let tmp = tempfile::tempdir().unwrap();
        let pdf_root = tmp.path().join("pdfs");
        touch(&pdf_root.join("quarterly/issue-03/item/99.pdf"));

        let records = ArticleScanner::new(&pdf_root, tmp.path().join("xml"))
            .scan()
            .unwrap();

        assert_eq!(records.len(), 1);
        assert!(records[0].xml_path.is_none());
    }

    #[test]
    fn non_pdf_files_are_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let pdf_root = tmp.path().join("pdfs");
        touch(&pdf_root.join("quarterly/issue-03/item/notes.txt"));

        let records = ArticleScanner::new(&pdf_root, tmp.path().join("xml"))
            .scan()
            .unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn article_id_uses_the_stem_up_to_the_first_dot() {
        let tmp = tempfile::tempdir().unwrap();
        let pdf_root = tmp.path().join("pdfs");
        touch(&pdf_root.join("quarterly/issue-03/item/40630.orig.pdf"));

        let records = ArticleScanner::new(&pdf_root, tmp.path().join("xml"))
            .scan()
            .unwrap();
        assert_eq!(records[0].article_id, "10.2307_40630");
    }

    #[test]
    fn missing_root_is_an_error() {
        let scanner = ArticleScanner::new("/nonexistent/folio-test", "/tmp");
        assert!(matches!(scanner.scan(), Err(ScanError::RootNotFound(_))));
    }
}
