//! SQLite implementation of the record read contracts.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection};
use tracing::info;

use lexcab_core::traits::RecordSource;
use lexcab_core::types::{CaseDocumentRecord, JurisprudenceRecord};
use lexcab_core::{Error, Result};

use crate::schema::SCHEMA_SQL;
use crate::types::{ClientRow, DocumentRow, DossierRow, Fixtures, ImportCounts};

fn db_err(e: rusqlite::Error) -> Error {
    Error::Source(e.to_string())
}

pub struct SqliteSource {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl SqliteSource {
    /// Open or create the database file, creating its parent directory if needed.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(dir) = db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let conn = Connection::open(db_path).map_err(db_err)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(db_err)?;
        let source = Self::init(conn, Some(db_path.to_path_buf()))?;
        info!(path = %db_path.display(), "SqliteSource opened");
        Ok(source)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;").map_err(db_err)?;
        Self::init(conn, None)
    }

    fn init(conn: Connection, db_path: Option<PathBuf>) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| Error::Source(format!("Schema init failed: {}", e)))?;
        Ok(Self { conn: Mutex::new(conn), db_path })
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::Source("connection mutex poisoned".to_string()))
    }

    pub fn insert_jurisprudence(&self, record: &JurisprudenceRecord) -> Result<()> {
        let conn = self.lock()?;
        insert_jurisprudence(&conn, record)
    }

    pub fn insert_client(&self, client: &ClientRow) -> Result<()> {
        let conn = self.lock()?;
        insert_client(&conn, client)
    }

    pub fn insert_dossier(&self, dossier: &DossierRow) -> Result<()> {
        let conn = self.lock()?;
        insert_dossier(&conn, dossier)
    }

    pub fn insert_document(&self, document: &DocumentRow) -> Result<()> {
        let conn = self.lock()?;
        insert_document(&conn, document)
    }

    /// Upsert all fixture rows in one transaction, parents before children.
    pub fn import(&self, fixtures: &Fixtures) -> Result<ImportCounts> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(db_err)?;
        for j in &fixtures.jurisprudence { insert_jurisprudence(&tx, j)?; }
        for c in &fixtures.clients { insert_client(&tx, c)?; }
        for d in &fixtures.dossiers { insert_dossier(&tx, d)?; }
        for d in &fixtures.documents { insert_document(&tx, d)?; }
        tx.commit().map_err(db_err)?;
        let counts = ImportCounts {
            jurisprudence: fixtures.jurisprudence.len(),
            clients: fixtures.clients.len(),
            dossiers: fixtures.dossiers.len(),
            documents: fixtures.documents.len(),
        };
        info!(?counts, "fixtures imported");
        Ok(counts)
    }
}

fn insert_jurisprudence(conn: &Connection, j: &JurisprudenceRecord) -> Result<()> {
    conn.prepare_cached(
        "INSERT OR REPLACE INTO jurisprudence (id, title, content, summary, reference, keywords)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .map_err(db_err)?
    .execute(params![j.id, j.title, j.content, j.summary, j.reference, serde_json::to_string(&j.keywords)?])
    .map_err(db_err)?;
    Ok(())
}

fn insert_client(conn: &Connection, c: &ClientRow) -> Result<()> {
    conn.prepare_cached("INSERT OR REPLACE INTO clients (id, name) VALUES (?1, ?2)")
        .map_err(db_err)?
        .execute(params![c.id, c.name])
        .map_err(db_err)?;
    Ok(())
}

fn insert_dossier(conn: &Connection, d: &DossierRow) -> Result<()> {
    conn.prepare_cached("INSERT OR REPLACE INTO dossiers (id, reference, title, client_id) VALUES (?1, ?2, ?3, ?4)")
        .map_err(db_err)?
        .execute(params![d.id, d.reference, d.title, d.client_id])
        .map_err(db_err)?;
    Ok(())
}

fn insert_document(conn: &Connection, d: &DocumentRow) -> Result<()> {
    conn.prepare_cached("INSERT OR REPLACE INTO documents (id, name, ocr_content, dossier_id) VALUES (?1, ?2, ?3, ?4)")
        .map_err(db_err)?
        .execute(params![d.id, d.name, d.ocr_content, d.dossier_id])
        .map_err(db_err)?;
    Ok(())
}

/// Keywords are stored as a JSON array. Plain comma-separated text, as typed
/// into the column by hand, is still accepted.
fn decode_keywords(raw: &str) -> Vec<String> {
    let keywords = serde_json::from_str::<Vec<String>>(raw)
        .unwrap_or_else(|_| raw.split(',').map(str::to_string).collect());
    keywords.into_iter().map(|k| k.trim().to_string()).filter(|k| !k.is_empty()).collect()
}

impl RecordSource for SqliteSource {
    fn list_jurisprudence(&self) -> Result<Vec<JurisprudenceRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare_cached("SELECT id, title, content, summary, reference, keywords FROM jurisprudence ORDER BY id")
            .map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| {
                let keywords: String = row.get(5)?;
                Ok(JurisprudenceRecord {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    content: row.get(2)?,
                    summary: row.get(3)?,
                    reference: row.get(4)?,
                    keywords: decode_keywords(&keywords),
                })
            })
            .map_err(db_err)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(db_err)
    }

    fn list_documents_with_case(&self) -> Result<Vec<CaseDocumentRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare_cached(
                "SELECT d.id, d.name, d.ocr_content,
                        COALESCE(ds.reference, ''), COALESCE(ds.title, ''), COALESCE(c.name, '')
                 FROM documents d
                 LEFT JOIN dossiers ds ON ds.id = d.dossier_id
                 LEFT JOIN clients c ON c.id = ds.client_id
                 ORDER BY d.id",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(CaseDocumentRecord {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    ocr_content: row.get(2)?,
                    dossier_reference: row.get(3)?,
                    dossier_title: row.get(4)?,
                    client_name: row.get(5)?,
                })
            })
            .map_err(db_err)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(db_err)
    }
}
