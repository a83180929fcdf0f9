use std::fs;
use std::path::PathBuf;

use lexcab_core::config::Language;
use lexcab_core::source::MemorySource;
use lexcab_core::types::{CaseDocumentRecord, JurisprudenceRecord};
use lexcab_core::{Error, LoadError};
use lexcab_text::{FileIndexProvider, IndexProvider, LoadOutcome, MemoryIndexProvider, SearchService};
use tempfile::TempDir;

fn jurisprudence(id: &str, title: &str, content: Option<&str>) -> JurisprudenceRecord {
    JurisprudenceRecord {
        id: id.to_string(),
        title: title.to_string(),
        content: content.map(str::to_string),
        ..JurisprudenceRecord::default()
    }
}

fn document(id: &str, name: &str, ocr: Option<&str>) -> CaseDocumentRecord {
    CaseDocumentRecord {
        id: id.to_string(),
        name: name.to_string(),
        ocr_content: ocr.map(str::to_string),
        dossier_reference: "D-2024-017".to_string(),
        dossier_title: "Martin c/ Durand".to_string(),
        client_name: "Paul Martin".to_string(),
    }
}

fn scenario_source() -> MemorySource {
    MemorySource::new(
        vec![jurisprudence("1", "Rupture abusive de contrat", Some(""))],
        vec![document("5", "Courrier recommandé", Some("contrat rompu"))],
    )
}

fn artifact_path(tmp: &TempDir) -> PathBuf {
    tmp.path().join("public").join("search-index.json")
}

fn file_service(tmp: &TempDir) -> SearchService<MemorySource, FileIndexProvider> {
    SearchService::new(scenario_source(), FileIndexProvider::new(artifact_path(tmp)), Language::French)
}

#[test]
fn rupture_and_contrat_scenario() {
    let tmp = TempDir::new().unwrap();
    let service = file_service(&tmp);
    service.rebuild().expect("rebuild");

    let r = service.query("rupture").expect("query");
    assert_eq!(r.jurisprudence_ids, vec!["1".to_string()]);
    assert!(r.document_ids.is_empty());
    assert_eq!(r.total, 1);

    let r = service.query("contrat").expect("query");
    assert_eq!(r.jurisprudence_ids, vec!["1".to_string()]);
    assert_eq!(r.document_ids, vec!["5".to_string()]);
    assert_eq!(r.total, 2);
}

#[test]
fn empty_query_returns_empty_without_touching_the_index() {
    let tmp = TempDir::new().unwrap();
    let service = file_service(&tmp);
    for q in ["", "   ", "\t\n"] {
        let r = service.query(q).expect("query");
        assert!(r.jurisprudence_ids.is_empty() && r.document_ids.is_empty());
        assert_eq!(r.total, 0);
    }
    assert_eq!(service.source().read_count(), 0, "no rebuild for an empty query");
    assert!(!artifact_path(&tmp).exists());
}

#[test]
fn missing_artifact_heals_and_drops_the_first_query() {
    let tmp = TempDir::new().unwrap();
    let service = file_service(&tmp);
    assert!(!artifact_path(&tmp).exists());

    let first = service.query("contrat").expect("query");
    assert_eq!(first.total, 0, "query that triggered the rebuild is dropped");
    assert!(first.jurisprudence_ids.is_empty() && first.document_ids.is_empty());
    assert_eq!(service.source().read_count(), 1);
    assert!(service.provider().load().is_ok(), "a valid artifact was written");

    let second = service.query("contrat").expect("query");
    assert_eq!(second.total, 2);
    assert_eq!(service.source().read_count(), 1, "second query must not rebuild");
}

#[test]
fn corrupt_artifact_heals() {
    let tmp = TempDir::new().unwrap();
    let service = file_service(&tmp);
    service.rebuild().expect("rebuild");
    fs::write(artifact_path(&tmp), b"{\"version\": 1, \"refs\": [").unwrap();
    assert!(matches!(service.provider().load(), Err(LoadError::Corrupt(_))));

    let r = service.query("rupture").expect("query");
    assert_eq!(r.total, 0);
    assert_eq!(service.source().read_count(), 2);
    assert!(service.provider().load().is_ok());

    let r = service.query("rupture").expect("query");
    assert_eq!(r.jurisprudence_ids, vec!["1".to_string()]);
    assert_eq!(service.source().read_count(), 2);
}

#[test]
fn deleted_artifact_heals() {
    let tmp = TempDir::new().unwrap();
    let service = file_service(&tmp);
    service.rebuild().expect("rebuild");
    fs::remove_file(artifact_path(&tmp)).unwrap();

    let r = service.query("anything").expect("query");
    assert_eq!(r.total, 0);
    assert!(artifact_path(&tmp).exists());
    assert!(service.provider().load().is_ok());
}

#[test]
fn older_format_version_is_incompatible_and_rebuilt() {
    let tmp = TempDir::new().unwrap();
    let service = file_service(&tmp);
    service.rebuild().expect("rebuild");

    let mut artifact: serde_json::Value = serde_json::from_slice(&fs::read(artifact_path(&tmp)).unwrap()).unwrap();
    artifact["version"] = serde_json::json!(99);
    fs::write(artifact_path(&tmp), serde_json::to_vec(&artifact).unwrap()).unwrap();
    assert!(matches!(service.provider().load(), Err(LoadError::Incompatible(_))));

    fs::write(artifact_path(&tmp), br#"{"version": 0}"#).unwrap();
    assert!(matches!(service.provider().load(), Err(LoadError::Incompatible(_))));

    let outcome = service.load().expect("load");
    assert!(outcome.was_rebuilt());
    assert!(matches!(service.load().expect("load"), LoadOutcome::Hit(_)));
}

#[test]
fn changed_field_boosts_are_incompatible() {
    let tmp = TempDir::new().unwrap();
    let service = file_service(&tmp);
    service.rebuild().expect("rebuild");

    let mut artifact: serde_json::Value = serde_json::from_slice(&fs::read(artifact_path(&tmp)).unwrap()).unwrap();
    artifact["fields"][0]["boost"] = serde_json::json!(3.0);
    fs::write(artifact_path(&tmp), serde_json::to_vec(&artifact).unwrap()).unwrap();
    assert!(matches!(service.provider().load(), Err(LoadError::Incompatible(_))));
}

#[test]
fn posting_pointing_past_the_last_document_is_corrupt() {
    let tmp = TempDir::new().unwrap();
    let service = file_service(&tmp);
    service.rebuild().expect("rebuild");

    let mut artifact: serde_json::Value = serde_json::from_slice(&fs::read(artifact_path(&tmp)).unwrap()).unwrap();
    let term = artifact["postings"].as_object().unwrap().keys().next().unwrap().clone();
    artifact["postings"][term.as_str()][0]["doc"] = serde_json::json!(42);
    fs::write(artifact_path(&tmp), serde_json::to_vec(&artifact).unwrap()).unwrap();
    assert!(matches!(service.provider().load(), Err(LoadError::Corrupt(_))));
}

#[test]
fn source_failure_keeps_previous_artifact() {
    let tmp = TempDir::new().unwrap();
    let service = file_service(&tmp);
    service.rebuild().expect("rebuild");
    let before = fs::read(artifact_path(&tmp)).unwrap();

    service.source().push_jurisprudence(jurisprudence("2", "Bail commercial", None));
    service.source().set_failing(true);
    let err = service.rebuild().expect_err("source is down");
    assert!(matches!(err, Error::Source(_)));
    assert_eq!(fs::read(artifact_path(&tmp)).unwrap(), before);

    // The stored index is still healthy, so queries keep working without the source.
    let r = service.query("contrat").expect("query");
    assert_eq!(r.total, 2);
}

#[test]
fn heal_with_failing_source_propagates() {
    let tmp = TempDir::new().unwrap();
    let service = file_service(&tmp);
    service.source().set_failing(true);
    let err = service.query("contrat").expect_err("rebuild cannot read the source");
    assert!(matches!(err, Error::Source(_)));
    assert!(!artifact_path(&tmp).exists());
}

#[test]
fn write_failure_propagates() {
    let tmp = TempDir::new().unwrap();
    // The artifact's parent directory is a regular file, so it cannot be created.
    fs::write(tmp.path().join("public"), b"not a directory").unwrap();
    let service = file_service(&tmp);
    let err = service.rebuild().expect_err("cannot write");
    assert!(matches!(err, Error::ArtifactWrite { .. }));
}

#[test]
fn retry_after_rebuild_answers_the_first_query() {
    let tmp = TempDir::new().unwrap();
    let service = file_service(&tmp).with_retry_after_rebuild(true);
    let r = service.query("contrat").expect("query");
    assert_eq!(r.total, 2);
    assert_eq!(service.source().read_count(), 1);
}

#[test]
fn index_built_for_another_language_is_rebuilt() {
    let tmp = TempDir::new().unwrap();
    let english = SearchService::new(scenario_source(), FileIndexProvider::new(artifact_path(&tmp)), Language::English);
    english.rebuild().expect("rebuild");

    let stored = english.provider().load().expect("load");
    assert!(stored.ensure_language(Language::English).is_ok());
    assert!(matches!(stored.ensure_language(Language::French), Err(LoadError::Incompatible(_))));

    let french = file_service(&tmp);
    assert!(french.load().expect("load").was_rebuilt());
    assert_eq!(french.provider().load().expect("load").language(), Language::French);
    assert!(!french.load().expect("load").was_rebuilt());
}

#[test]
fn rebuild_returns_the_stored_index() {
    let service = SearchService::new(scenario_source(), MemoryIndexProvider::new(), Language::French);
    let built = service.rebuild().expect("rebuild");
    assert_eq!(service.provider().store_count(), 1);
    assert_eq!(built.doc_count(), 2);
    assert!(built.contains_ref("JUR-1"));
    assert!(built.contains_ref("DOC-5"));
    assert_eq!(service.provider().load().expect("load").refs(), built.refs());

    let outcome = service.load().expect("load");
    assert!(matches!(outcome, LoadOutcome::Hit(_)));
    assert_eq!(outcome.index().refs(), built.refs());

    service.provider().clear();
    assert!(service.query("contrat").expect("query").is_empty());
    assert_eq!(service.provider().store_count(), 2);
}

#[test]
fn colliding_raw_ids_get_distinct_refs() {
    let source = MemorySource::new(
        vec![jurisprudence("7", "Clause pénale", Some("indemnité forfaitaire"))],
        vec![document("7", "Clause pénale annotée", None)],
    );
    let service = SearchService::new(source, MemoryIndexProvider::new(), Language::French);
    let index = service.rebuild().expect("rebuild");
    assert_eq!(index.doc_count(), 2);
    assert!(index.contains_ref("JUR-7") && index.contains_ref("DOC-7"));

    let r = service.query("clause").expect("query");
    assert_eq!(r.jurisprudence_ids, vec!["7".to_string()]);
    assert_eq!(r.document_ids, vec!["7".to_string()]);
    assert_eq!(r.total, 2);
}

#[test]
fn duplicate_source_rows_are_indexed_once() {
    let source = MemorySource::new(
        vec![jurisprudence("3", "Vice caché", None), jurisprudence("3", "Vice caché (doublon)", None)],
        vec![],
    );
    let service = SearchService::new(source, MemoryIndexProvider::new(), Language::French);
    let index = service.rebuild().expect("rebuild");
    assert_eq!(index.doc_count(), 1);
    assert_eq!(service.query("vice").expect("query").jurisprudence_ids, vec!["3".to_string()]);
}

#[test]
fn documents_are_found_through_their_dossier_summary() {
    let service = SearchService::new(scenario_source(), MemoryIndexProvider::new(), Language::French);
    service.rebuild().expect("rebuild");
    let r = service.query("Durand").expect("query");
    assert_eq!(r.document_ids, vec!["5".to_string()]);
    assert!(r.jurisprudence_ids.is_empty());
}

#[test]
fn total_matches_partition_sizes() {
    let source = MemorySource::new(
        vec![
            jurisprudence("1", "Rupture abusive de contrat", None),
            jurisprudence("2", "Contrat de bail commercial", Some("résiliation du bail")),
            jurisprudence("3", "Responsabilité délictuelle", Some("faute, dommage et lien de causalité")),
        ],
        vec![
            document("10", "Bail signé", Some("contrat de bail entre les parties")),
            document("11", "Assignation", Some("rupture brutale des relations commerciales")),
        ],
    );
    let service = SearchService::new(source, MemoryIndexProvider::new(), Language::French);
    service.rebuild().expect("rebuild");
    for q in ["contrat", "bail", "rupture", "faute", "martin", "inexistant", "+bail -contrat", "contr*", "title:bail"] {
        let r = service.query(q).expect("query");
        assert_eq!(r.total, r.jurisprudence_ids.len() + r.document_ids.len(), "query {q:?}");
    }
}
