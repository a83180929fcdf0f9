use tantivy::tokenizer::{
	AsciiFoldingFilter, Language as StemLanguage, LowerCaser, SimpleTokenizer, Stemmer, StopWordFilter, TextAnalyzer, TokenStream,
};

use lexcab_core::config::Language;

// Stop words are matched after lowercasing and ASCII folding, so accents are already stripped.
const FRENCH_STOP_WORDS: &[&str] = &[
	"a","au","aux","avec","ce","ces","cet","cette","dans","de","des","du","elle","en","et","est","il","ils","je","la","le","les","leur","leurs","lui","ma","mais","me","meme","mes","moi","mon","ne","nos","notre","nous","on","ou","par","pas","pour","qu","que","qui","sa","se","ses","son","sur","ta","te","tes","toi","ton","tu","un","une","vos","votre","vous","c","d","j","l","m","n","s","t","y","ete","etre","sont","ont",
];

const ENGLISH_STOP_WORDS: &[&str] = &[
	"a","an","and","are","as","at","be","by","for","from","has","he","in","is","it","its","of","on","that","the","to","was","will","with","or","but","not","this","these","they","them","their","there","then","than","so","if","when","where","why","how","what","which","who","whom","whose","can","could","should","would","may","might","must","shall","do","does","did","have","had","having",
];

fn stop_words(language: Language) -> &'static [&'static str] {
	match language {
		Language::French => FRENCH_STOP_WORDS,
		Language::English => ENGLISH_STOP_WORDS,
	}
}

fn stem_language(language: Language) -> StemLanguage {
	match language {
		Language::French => StemLanguage::French,
		Language::English => StemLanguage::English,
	}
}

pub fn build_analyzer(language: Language) -> TextAnalyzer {
	TextAnalyzer::builder(SimpleTokenizer::default())
		.filter(LowerCaser)
		.filter(AsciiFoldingFilter)
		.filter(StopWordFilter::remove(stop_words(language).iter().map(|s| s.to_string())))
		.filter(Stemmer::new(stem_language(language)))
		.build()
}

/// Lowercase and fold only. Wildcard prefixes go through this so that short
/// prefixes such as `de*` are not removed as stop words.
pub fn build_prefix_analyzer() -> TextAnalyzer {
	TextAnalyzer::builder(SimpleTokenizer::default()).filter(LowerCaser).filter(AsciiFoldingFilter).build()
}

/// Tokenizer pipeline shared by indexing and querying.
///
/// `tokens` is the full pipeline (stemmed). `prefix_tokens` neither stems nor
/// drops stop words, so a truncated word keeps the characters the user typed.
#[derive(Clone)]
pub struct Analyzer {
	language: Language,
	stemmed: TextAnalyzer,
	plain: TextAnalyzer,
}

impl Analyzer {
	pub fn new(language: Language) -> Self {
		Self { language, stemmed: build_analyzer(language), plain: build_prefix_analyzer() }
	}

	pub fn language(&self) -> Language { self.language }

	pub fn tokens(&mut self, text: &str) -> Vec<String> { collect_tokens(&mut self.stemmed, text) }

	pub fn prefix_tokens(&mut self, text: &str) -> Vec<String> { collect_tokens(&mut self.plain, text) }
}

fn collect_tokens(analyzer: &mut TextAnalyzer, text: &str) -> Vec<String> {
	let mut out = Vec::new();
	let mut stream = analyzer.token_stream(text);
	while stream.advance() { out.push(stream.token().text.clone()); }
	out
}
