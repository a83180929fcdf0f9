//! Free-text query syntax.
//!
//! Clauses are whitespace separated: `term`, `+required`, `-prohibited`,
//! `field:term` and trailing-wildcard `prefix*`. A `name:` prefix that is not a
//! known field is treated as ordinary text, so arbitrary user input never fails
//! to parse.

use crate::index::Field;
use crate::tantivy_utils::Analyzer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
	Optional,
	Required,
	Prohibited,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
	pub term: String,
	pub field: Option<Field>,
	pub presence: Presence,
	pub wildcard: bool,
	/// Stemmed form of a wildcard prefix when it differs from `term`, so
	/// `rupture*` also reaches the indexed stem `ruptur`.
	pub stemmed: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuery {
	pub clauses: Vec<Clause>,
}

impl ParsedQuery {
	pub fn parse(text: &str, analyzer: &mut Analyzer) -> Self {
		let mut clauses = Vec::new();
		for raw in text.split_whitespace() {
			let (presence, rest) = match raw.as_bytes()[0] {
				b'+' => (Presence::Required, &raw[1..]),
				b'-' => (Presence::Prohibited, &raw[1..]),
				_ => (Presence::Optional, raw),
			};
			let (field, rest) = match rest.split_once(':') {
				Some((name, term)) => match Field::from_name(name) {
					Some(field) => (Some(field), term),
					None => (None, rest),
				},
				None => (None, rest),
			};
			let wildcard = rest.ends_with('*');
			let rest = rest.trim_end_matches('*');
			if wildcard {
				for term in analyzer.prefix_tokens(rest) {
					let stemmed = analyzer.tokens(&term).into_iter().next().filter(|s| *s != term);
					clauses.push(Clause { term, field, presence, wildcard, stemmed });
				}
			} else {
				clauses.extend(analyzer.tokens(rest).into_iter().map(|term| Clause { term, field, presence, wildcard, stemmed: None }));
			}
		}
		Self { clauses }
	}

	/// False when nothing could select a document (empty, only stop words, only prohibitions).
	pub fn has_positive(&self) -> bool {
		self.clauses.iter().any(|c| c.presence != Presence::Prohibited)
	}
}
