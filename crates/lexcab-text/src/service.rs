//! Query entry point with rebuild-on-load-failure.

use tracing::{debug, info, warn};

use lexcab_core::config::{Language, SearchConfig};
use lexcab_core::traits::RecordSource;
use lexcab_core::types::QueryResult;
use lexcab_core::Result;

use crate::builder::IndexBuilder;
use crate::index::SearchIndex;
use crate::provider::IndexProvider;

/// How the index for a request was obtained.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
	/// The stored index loaded cleanly.
	Hit(SearchIndex),
	/// The stored index was missing or unusable and has just been rebuilt and stored.
	Rebuilt(SearchIndex),
}

impl LoadOutcome {
	pub fn index(&self) -> &SearchIndex {
		match self {
			LoadOutcome::Hit(index) | LoadOutcome::Rebuilt(index) => index,
		}
	}

	pub fn was_rebuilt(&self) -> bool { matches!(self, LoadOutcome::Rebuilt(_)) }
}

pub struct SearchService<S, P> {
	source: S,
	provider: P,
	builder: IndexBuilder,
	retry_after_rebuild: bool,
}

impl<S, P> SearchService<S, P>
where
	S: RecordSource,
	P: IndexProvider,
{
	pub fn new(source: S, provider: P, language: Language) -> Self {
		Self { source, provider, builder: IndexBuilder::new(language), retry_after_rebuild: false }
	}

	pub fn from_config(source: S, provider: P, config: &SearchConfig) -> Self {
		Self::new(source, provider, config.language).with_retry_after_rebuild(config.retry_after_rebuild)
	}

	/// When set, a query that triggered a rebuild runs once against the fresh
	/// index instead of returning the empty result.
	pub fn with_retry_after_rebuild(mut self, retry: bool) -> Self {
		self.retry_after_rebuild = retry;
		self
	}

	pub fn source(&self) -> &S { &self.source }

	pub fn provider(&self) -> &P { &self.provider }

	/// Build from the sources and replace the stored index.
	///
	/// Source or write failures propagate and leave the stored index untouched.
	pub fn rebuild(&self) -> Result<SearchIndex> {
		let index = self.builder.build(&self.source)?;
		self.provider.store(&index)?;
		info!(documents = index.doc_count(), terms = index.term_count(), "search index rebuilt");
		Ok(index)
	}

	/// Load the stored index, rebuilding it when it cannot be used.
	///
	/// An index built with another analysis language is treated as unusable.
	pub fn load(&self) -> Result<LoadOutcome> {
		let failure = match self.provider.load() {
			Ok(index) => match index.ensure_language(self.builder.language()) {
				Ok(()) => return Ok(LoadOutcome::Hit(index)),
				Err(e) => e,
			},
			Err(e) => e,
		};
		warn!(error = %failure, "search index unusable, rebuilding");
		Ok(LoadOutcome::Rebuilt(self.rebuild()?))
	}

	/// Run a free-text query. Ids come back in rank order, split by collection.
	///
	/// An unusable stored index never surfaces as an error: it is rebuilt and
	/// this call returns the empty result (unless retry is enabled). Errors
	/// only come from a failing rebuild.
	pub fn query(&self, text: &str) -> Result<QueryResult> {
		if text.trim().is_empty() {
			return Ok(QueryResult::empty());
		}
		let outcome = self.load()?;
		if outcome.was_rebuilt() && !self.retry_after_rebuild {
			debug!(query = text, "query dropped after index rebuild");
			return Ok(QueryResult::empty());
		}
		let hits = outcome.index().search(text);
		let result = QueryResult::from_ranked_refs(hits.iter().map(|h| h.doc_ref.as_str()));
		debug!(query = text, total = result.total, "search");
		Ok(result)
	}
}
