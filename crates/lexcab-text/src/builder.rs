use tracing::info;

use lexcab_core::config::Language;
use lexcab_core::traits::RecordSource;
use lexcab_core::types::IndexEntry;
use lexcab_core::Result;

use crate::index::SearchIndex;

/// Builds a complete index from both source collections. Never incremental.
#[derive(Debug, Clone, Copy)]
pub struct IndexBuilder {
	language: Language,
}

impl IndexBuilder {
	pub fn new(language: Language) -> Self { Self { language } }

	pub fn language(&self) -> Language { self.language }

	/// Read every row of both collections; any read failure aborts the whole build.
	pub fn collect_entries<S: RecordSource + ?Sized>(source: &S) -> Result<Vec<IndexEntry>> {
		let jurisprudence = source.list_jurisprudence()?;
		let documents = source.list_documents_with_case()?;
		info!(jurisprudence = jurisprudence.len(), documents = documents.len(), "collected searchable records");
		Ok(jurisprudence.iter().map(IndexEntry::from).chain(documents.iter().map(IndexEntry::from)).collect())
	}

	pub fn build<S: RecordSource + ?Sized>(&self, source: &S) -> Result<SearchIndex> {
		let entries = Self::collect_entries(source)?;
		Ok(SearchIndex::build(entries, self.language))
	}
}
