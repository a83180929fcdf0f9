//! Domain types shared by the index builder, the query engine and the sources.

use serde::{Deserialize, Serialize};

/// A case-law entry as returned by the data-access layer.
///
/// `content` and `summary` are nullable upstream; a record without them is
/// still indexed by its remaining fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JurisprudenceRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// A case-file document joined with its parent dossier and that dossier's client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseDocumentRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub ocr_content: Option<String>,
    #[serde(default)]
    pub dossier_reference: String,
    #[serde(default)]
    pub dossier_title: String,
    #[serde(default)]
    pub client_name: String,
}

/// Which collection an index entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceType {
    Jurisprudence,
    Document,
}

impl SourceType {
    pub fn prefix(self) -> &'static str {
        match self {
            SourceType::Jurisprudence => "JUR",
            SourceType::Document => "DOC",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "JUR" => Some(SourceType::Jurisprudence),
            "DOC" => Some(SourceType::Document),
            _ => None,
        }
    }

    /// Composite key for a source record: `<PREFIX>-<id>`.
    pub fn make_ref(self, id: &str) -> String {
        format!("{}-{}", self.prefix(), id)
    }
}

/// Split a composite ref back into its source type and original id.
///
/// Only the first `-` separates the prefix, so ids may contain dashes.
pub fn parse_ref(doc_ref: &str) -> Option<(SourceType, &str)> {
    let (prefix, id) = doc_ref.split_once('-')?;
    Some((SourceType::from_prefix(prefix)?, id))
}

/// The unit added to the inverted index.
///
/// - `doc_ref`: `JUR-<id>` or `DOC-<id>`, unique within one built index
/// - `title`: boosted highest
/// - `content`: boosted below title
/// - `reference`/`summary`/`keywords`: unboosted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    #[serde(rename = "ref")]
    pub doc_ref: String,
    pub title: String,
    pub content: String,
    pub reference: String,
    pub summary: String,
    pub keywords: String,
    pub source_type: SourceType,
}

impl From<&JurisprudenceRecord> for IndexEntry {
    fn from(j: &JurisprudenceRecord) -> Self {
        Self {
            doc_ref: SourceType::Jurisprudence.make_ref(&j.id),
            title: j.title.clone(),
            content: j.content.clone().unwrap_or_default(),
            reference: j.reference.clone(),
            summary: j.summary.clone().unwrap_or_default(),
            keywords: j.keywords.join(" "),
            source_type: SourceType::Jurisprudence,
        }
    }
}

impl From<&CaseDocumentRecord> for IndexEntry {
    fn from(d: &CaseDocumentRecord) -> Self {
        Self {
            doc_ref: SourceType::Document.make_ref(&d.id),
            title: d.name.clone(),
            content: d.ocr_content.clone().unwrap_or_default(),
            reference: d.dossier_reference.clone(),
            summary: format!("Dossier {} - Client {}", d.dossier_title, d.client_name),
            keywords: String::new(),
            source_type: SourceType::Document,
        }
    }
}

/// Ranked source ids split by collection.
///
/// `total` always equals `jurisprudence_ids.len() + document_ids.len()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub jurisprudence_ids: Vec<String>,
    pub document_ids: Vec<String>,
    pub total: usize,
}

impl QueryResult {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Partition refs (already in rank order) by prefix, keeping relative order.
    /// Refs without a known prefix are skipped.
    pub fn from_ranked_refs<'a, I>(refs: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut out = Self::empty();
        for r in refs {
            match parse_ref(r) {
                Some((SourceType::Jurisprudence, id)) => out.jurisprudence_ids.push(id.to_string()),
                Some((SourceType::Document, id)) => out.document_ids.push(id.to_string()),
                None => tracing::warn!(doc_ref = r, "skipping hit with unknown ref prefix"),
            }
        }
        out.total = out.jurisprudence_ids.len() + out.document_ids.len();
        out
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
