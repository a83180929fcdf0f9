use std::env;
use std::path::PathBuf;

use tracing::info;
use tracing_subscriber::EnvFilter;

use lexcab_core::config::{Config, Settings};
use lexcab_core::LoadError;
use lexcab_store::{Fixtures, SqliteSource};
use lexcab_text::{FileIndexProvider, IndexProvider, SearchService};

const USAGE: &str = "Usage: lexcab <reindex|search|status|import> [args...]

Commands:
  reindex                         Rebuild the search index from the database
  search <query> [--limit N] [--json]
                                  Query the index (rebuilds it if unusable)
  status                          Show whether the stored index loads
  import <fixtures.json>          Load records into the database";

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() { eprintln!("{}", USAGE); std::process::exit(1); }
    let cmd = args.remove(0);
    (cmd, args)
}

fn open_service(config: &Config, settings: &Settings) -> anyhow::Result<SearchService<SqliteSource, FileIndexProvider>> {
    let base = config.base_dir();
    let source = SqliteSource::open(settings.database_path(base))?;
    let provider = FileIndexProvider::new(settings.index_path(base));
    Ok(SearchService::from_config(source, provider, &settings.search))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.settings()?;
    let (cmd, args) = parse_args();
    match cmd.as_str() {
        "reindex" => {
            let service = open_service(&config, &settings)?;
            let index = service.rebuild()?;
            println!("Indexed {} records ({} terms) into {}", index.doc_count(), index.term_count(), service.provider().path().display());
        }
        "search" => {
            let mut query: Option<String> = None;
            let mut limit = settings.search.default_limit;
            let mut as_json = false;
            let mut i = 0;
            while i < args.len() {
                match args[i].as_str() {
                    "--limit" => {
                        match args.get(i + 1).and_then(|v| v.parse::<usize>().ok()) {
                            Some(l) if l > 0 => limit = l,
                            _ => { eprintln!("Error: --limit requires a positive number"); std::process::exit(2); }
                        }
                        i += 2; continue;
                    }
                    "--json" => as_json = true,
                    s => { if query.is_none() { query = Some(s.to_string()); } }
                }
                i += 1;
            }
            let Some(query) = query else { eprintln!("Usage: lexcab search \"<query>\" [--limit N] [--json]"); std::process::exit(1) };

            let service = open_service(&config, &settings)?;
            let result = service.query(&query)?;
            if as_json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }
            println!("Query: {}  ({} hits)", query, result.total);
            println!("\nJurisprudence ({}):", result.jurisprudence_ids.len());
            for (n, id) in result.jurisprudence_ids.iter().take(limit).enumerate() { println!("  {:>2}. {}", n + 1, id); }
            println!("\nDocuments ({}):", result.document_ids.len());
            for (n, id) in result.document_ids.iter().take(limit).enumerate() { println!("  {:>2}. {}", n + 1, id); }
            if result.total == 0 { println!("\nNo results. If the index was just rebuilt, run the query again."); }
        }
        "status" => {
            let provider = FileIndexProvider::new(settings.index_path(config.base_dir()));
            println!("Index: {}", provider.path().display());
            match provider.load().and_then(|index| index.ensure_language(settings.search.language).map(|()| index)) {
                Ok(index) => println!("OK: {} records, {} terms, language {:?}", index.doc_count(), index.term_count(), index.language()),
                Err(LoadError::Missing) => println!("Missing: run `lexcab reindex` or any search to build it"),
                Err(e) => println!("Unusable ({}): the next search will rebuild it", e),
            }
        }
        "import" => {
            let Some(path) = args.first().map(PathBuf::from) else { eprintln!("Usage: lexcab import <fixtures.json>"); std::process::exit(1) };
            let fixtures = Fixtures::from_json_file(&path)?;
            let source = SqliteSource::open(settings.database_path(config.base_dir()))?;
            let counts = source.import(&fixtures)?;
            info!(path = %path.display(), "import finished");
            println!(
                "Imported {} jurisprudence, {} clients, {} dossiers, {} documents",
                counts.jurisprudence, counts.clients, counts.dossiers, counts.documents
            );
            println!("Run `lexcab reindex` to make them searchable.");
        }
        "help" | "--help" | "-h" => println!("{}", USAGE),
        _ => { eprintln!("Unknown command: {}\n\n{}", cmd, USAGE); std::process::exit(1); }
    }
    Ok(())
}
