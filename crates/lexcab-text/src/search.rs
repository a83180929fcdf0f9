use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Bound;

use crate::index::{Field, Posting, SearchIndex, FIELD_COUNT};
use crate::query::{Clause, ParsedQuery, Presence};
use crate::tantivy_utils::Analyzer;

const K1: f32 = 1.2;
const B: f32 = 0.75;

#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
	pub doc_ref: String,
	pub score: f32,
}

impl SearchIndex {
	/// Parse `query` with the index's own analyzer and return every match,
	/// best first. Equal scores are ordered by ref.
	pub fn search(&self, query: &str) -> Vec<Hit> {
		let mut analyzer = Analyzer::new(self.language);
		let parsed = ParsedQuery::parse(query, &mut analyzer);
		self.execute(&parsed)
	}

	pub fn execute(&self, query: &ParsedQuery) -> Vec<Hit> {
		if !query.has_positive() { return Vec::new(); }
		let mut totals: HashMap<u32, f32> = HashMap::new();
		let mut required: Option<HashSet<u32>> = None;
		let mut prohibited: HashSet<u32> = HashSet::new();
		for clause in &query.clauses {
			let scores = self.clause_scores(clause);
			match clause.presence {
				Presence::Prohibited => { prohibited.extend(scores.keys().copied()); continue; }
				Presence::Required => {
					let docs: HashSet<u32> = scores.keys().copied().collect();
					required = Some(match required.take() { Some(r) => r.intersection(&docs).copied().collect(), None => docs });
				}
				Presence::Optional => {}
			}
			for (doc, s) in scores { *totals.entry(doc).or_insert(0.0) += s; }
		}
		let mut hits: Vec<Hit> = totals
			.into_iter()
			.filter(|(doc, _)| !prohibited.contains(doc))
			.filter(|(doc, _)| required.as_ref().map_or(true, |r| r.contains(doc)))
			.map(|(doc, score)| Hit { doc_ref: self.refs[doc as usize].clone(), score })
			.collect();
		hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal).then_with(|| a.doc_ref.cmp(&b.doc_ref)));
		hits
	}

	fn clause_scores(&self, clause: &Clause) -> HashMap<u32, f32> {
		let lists: Vec<&Vec<Posting>> = if clause.wildcard {
			let mut terms: BTreeMap<&str, &Vec<Posting>> = BTreeMap::new();
			for prefix in std::iter::once(&clause.term).chain(clause.stemmed.iter()) {
				terms.extend(self.prefix_range(prefix));
			}
			terms.into_values().collect()
		} else {
			self.postings.get(&clause.term).into_iter().collect()
		};
		let mut scores = HashMap::new();
		for postings in lists {
			let mut df = [0u32; FIELD_COUNT];
			for p in postings { df[p.field as usize] += 1; }
			for p in postings {
				let field = Field::ALL[p.field as usize];
				if clause.field.is_some_and(|f| f != field) { continue; }
				*scores.entry(p.doc).or_insert(0.0) += self.bm25(p, df[p.field as usize]) * field.boost();
			}
		}
		scores
	}

	fn prefix_range<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, &'a Vec<Posting>)> + 'a {
		self.postings
			.range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
			.take_while(move |(term, _)| term.starts_with(prefix))
			.map(|(term, postings)| (term.as_str(), postings))
	}

	fn bm25(&self, p: &Posting, df: u32) -> f32 {
		let n = self.refs.len() as f32;
		let df = df as f32;
		let idf = (1.0 + (n - df + 0.5) / (df + 0.5)).ln();
		let len = self.field_lengths[p.doc as usize][p.field as usize] as f32;
		let avg = self.avg_field_lengths[p.field as usize];
		let norm = if avg > 0.0 { len / avg } else { 0.0 };
		let tf = p.tf as f32;
		idf * tf * (K1 + 1.0) / (tf + K1 * (1.0 - B + B * norm))
	}
}
