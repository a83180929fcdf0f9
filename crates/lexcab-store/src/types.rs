use std::path::Path;

use serde::{Deserialize, Serialize};

use lexcab_core::types::JurisprudenceRecord;
use lexcab_core::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRow {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DossierRow {
    pub id: String,
    pub reference: String,
    pub title: String,
    #[serde(default)]
    pub client_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub ocr_content: Option<String>,
    #[serde(default)]
    pub dossier_id: Option<String>,
}

/// Seed data accepted by `SqliteSource::import`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Fixtures {
    pub jurisprudence: Vec<JurisprudenceRecord>,
    pub clients: Vec<ClientRow>,
    pub dossiers: Vec<DossierRow>,
    pub documents: Vec<DocumentRow>,
}

impl Fixtures {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportCounts {
    pub jurisprudence: usize,
    pub clients: usize,
    pub dossiers: usize,
    pub documents: usize,
}
