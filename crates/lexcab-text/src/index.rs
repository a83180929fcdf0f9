//! Serializable inverted index over [`IndexEntry`] values.
//!
//! Postings are keyed by analyzed term in a `BTreeMap` so the artifact is
//! deterministic and prefix (wildcard) lookups are a range scan.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use lexcab_core::config::Language;
use lexcab_core::types::IndexEntry;
use lexcab_core::{LoadError, Result};

use crate::tantivy_utils::Analyzer;

pub const FIELD_COUNT: usize = 5;

/// Bumped whenever the serialized layout changes; older artifacts are rebuilt.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
	Title,
	Content,
	Reference,
	Summary,
	Keywords,
}

impl Field {
	pub const ALL: [Field; FIELD_COUNT] = [Field::Title, Field::Content, Field::Reference, Field::Summary, Field::Keywords];

	pub fn name(self) -> &'static str {
		match self {
			Field::Title => "title",
			Field::Content => "content",
			Field::Reference => "reference",
			Field::Summary => "summary",
			Field::Keywords => "keywords",
		}
	}

	pub fn from_name(name: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|f| f.name().eq_ignore_ascii_case(name))
	}

	pub fn boost(self) -> f32 {
		match self {
			Field::Title => 10.0,
			Field::Content => 5.0,
			Field::Reference | Field::Summary | Field::Keywords => 1.0,
		}
	}

	pub fn ordinal(self) -> usize { self as usize }

	fn text(self, entry: &IndexEntry) -> &str {
		match self {
			Field::Title => &entry.title,
			Field::Content => &entry.content,
			Field::Reference => &entry.reference,
			Field::Summary => &entry.summary,
			Field::Keywords => &entry.keywords,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
	pub name: String,
	pub boost: f32,
}

pub fn schema_fields() -> Vec<FieldSpec> {
	Field::ALL.iter().map(|f| FieldSpec { name: f.name().to_string(), boost: f.boost() }).collect()
}

/// One (document, field) occurrence of a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
	pub doc: u32,
	pub field: u8,
	pub tf: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchIndex {
	pub(crate) version: u32,
	pub(crate) language: Language,
	pub(crate) fields: Vec<FieldSpec>,
	pub(crate) refs: Vec<String>,
	pub(crate) field_lengths: Vec<Vec<u32>>,
	pub(crate) postings: BTreeMap<String, Vec<Posting>>,
	#[serde(skip)]
	pub(crate) avg_field_lengths: Vec<f32>,
}

#[derive(Deserialize)]
struct Header {
	version: u32,
}

impl SearchIndex {
	/// Build a complete index. Entries whose `doc_ref` was already seen are skipped.
	pub fn build<I>(entries: I, language: Language) -> Self
	where
		I: IntoIterator<Item = IndexEntry>,
	{
		let mut analyzer = Analyzer::new(language);
		let mut index = Self {
			version: FORMAT_VERSION,
			language,
			fields: schema_fields(),
			refs: Vec::new(),
			field_lengths: Vec::new(),
			postings: BTreeMap::new(),
			avg_field_lengths: Vec::new(),
		};
		let mut seen = HashSet::new();
		for entry in entries {
			if !seen.insert(entry.doc_ref.clone()) {
				warn!(doc_ref = %entry.doc_ref, "duplicate ref, keeping the first record");
				continue;
			}
			let doc = index.refs.len() as u32;
			let mut lengths = Vec::with_capacity(FIELD_COUNT);
			for field in Field::ALL {
				let tokens = analyzer.tokens(field.text(&entry));
				lengths.push(tokens.len() as u32);
				let mut counts: HashMap<String, u32> = HashMap::new();
				for t in tokens { *counts.entry(t).or_insert(0) += 1; }
				let mut counts: Vec<(String, u32)> = counts.into_iter().collect();
				counts.sort();
				for (term, tf) in counts {
					index.postings.entry(term).or_default().push(Posting { doc, field: field.ordinal() as u8, tf });
				}
			}
			index.refs.push(entry.doc_ref);
			index.field_lengths.push(lengths);
		}
		index.compute_averages();
		index
	}

	/// Parse and validate a serialized artifact.
	pub fn from_slice(bytes: &[u8]) -> std::result::Result<Self, LoadError> {
		let mut index: SearchIndex = match serde_json::from_slice(bytes) {
			Ok(index) => index,
			Err(e) => {
				// A readable header with another version means an older layout, not garbage.
				if let Ok(header) = serde_json::from_slice::<Header>(bytes) {
					if header.version != FORMAT_VERSION {
						return Err(LoadError::Incompatible(format!("format version {} (expected {})", header.version, FORMAT_VERSION)));
					}
				}
				return Err(LoadError::Corrupt(e.to_string()));
			}
		};
		index.validate()?;
		index.compute_averages();
		Ok(index)
	}

	pub fn to_vec(&self) -> Result<Vec<u8>> { Ok(serde_json::to_vec(self)?) }

	pub fn language(&self) -> Language { self.language }

	pub fn doc_count(&self) -> usize { self.refs.len() }

	pub fn term_count(&self) -> usize { self.postings.len() }

	pub fn refs(&self) -> &[String] { &self.refs }

	pub fn contains_ref(&self, doc_ref: &str) -> bool { self.refs.iter().any(|r| r == doc_ref) }

	/// An index analyzed for another language cannot answer queries for `language`.
	pub fn ensure_language(&self, language: Language) -> std::result::Result<(), LoadError> {
		if self.language == language { return Ok(()); }
		Err(LoadError::Incompatible(format!("built for {:?}, configured for {:?}", self.language, language)))
	}

	fn validate(&self) -> std::result::Result<(), LoadError> {
		if self.version != FORMAT_VERSION {
			return Err(LoadError::Incompatible(format!("format version {} (expected {})", self.version, FORMAT_VERSION)));
		}
		if self.fields != schema_fields() {
			return Err(LoadError::Incompatible("field schema differs from the current one".to_string()));
		}
		let n = self.refs.len();
		if self.field_lengths.len() != n {
			return Err(LoadError::Corrupt(format!("{} refs but {} field length rows", n, self.field_lengths.len())));
		}
		if self.field_lengths.iter().any(|row| row.len() != FIELD_COUNT) {
			return Err(LoadError::Corrupt("field length row of wrong width".to_string()));
		}
		let unique: HashSet<&String> = self.refs.iter().collect();
		if unique.len() != n {
			return Err(LoadError::Corrupt("duplicate refs".to_string()));
		}
		for (term, postings) in &self.postings {
			let bad = postings.iter().any(|p| p.doc as usize >= n || p.field as usize >= FIELD_COUNT || p.tf == 0);
			if bad {
				return Err(LoadError::Corrupt(format!("invalid posting for term '{}'", term)));
			}
		}
		Ok(())
	}

	fn compute_averages(&mut self) {
		let n = self.field_lengths.len();
		self.avg_field_lengths = (0..FIELD_COUNT)
			.map(|f| {
				if n == 0 { return 0.0; }
				let sum: u64 = self.field_lengths.iter().map(|row| u64::from(row[f])).sum();
				sum as f32 / n as f32
			})
			.collect();
	}
}
