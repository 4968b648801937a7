//! Fixed identifiers, collection names, and endpoints for the JSTOR Early
//! Journal Content corpus and its Internet Archive destination.

/// Worker cap for the upload orchestrator.
pub const DEFAULT_CONCURRENCY: usize = 15;

/// Every article is a text item at the destination.
pub const MEDIATYPE: &str = "texts";

/// Fixed contributor credited on every item.
pub const CONTRIBUTOR: &str = "JSTOR";

/// Destination item identifiers are the article id under this prefix.
pub const IDENTIFIER_PREFIX: &str = "jstor-";

/// Article ids are the PDF file stem under the JSTOR DOI prefix.
pub const ARTICLE_ID_PREFIX: &str = "10.2307_";

/// Collection holding the whole Early Journal Content corpus.
pub const EJC_COLLECTION: &str = "jstor_ejc";

/// Catch-all collection required by the destination.
pub const ADDITIONAL_COLLECTIONS: &str = "additional_collections";

/// Per-journal collections are the abbreviated journal name under this prefix.
pub const JOURNAL_COLLECTION_PREFIX: &str = "jstor_";

/// Source URL for an article is its id under the JSTOR stable-URL prefix.
pub const STABLE_URL_PREFIX: &str = "http://www.jstor.org/stable/";

/// S3-like upload endpoint.
pub const DEFAULT_S3_ENDPOINT: &str = "http://s3.us.archive.org";

/// Metadata read/write endpoint used by the reconciler.
pub const DEFAULT_METADATA_ENDPOINT: &str = "http://archive.org";

/// Default root of the PDF tree.
pub const DEFAULT_PDF_ROOT: &str = "/2/data/jstor/ejc/jstor-early-journal-content";

/// Default directory of bibliographic XML records, one file per article id.
pub const DEFAULT_XML_ROOT: &str = "/2/data/jstor/bundle/articles";
