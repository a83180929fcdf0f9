//! Tables backing the two read contracts. Only the columns the search index needs.

pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS jurisprudence (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    content TEXT,
    summary TEXT,
    reference TEXT NOT NULL DEFAULT '',
    keywords TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS clients (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS dossiers (
    id TEXT PRIMARY KEY,
    reference TEXT NOT NULL,
    title TEXT NOT NULL,
    client_id TEXT REFERENCES clients(id)
);

CREATE TABLE IF NOT EXISTS documents (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    ocr_content TEXT,
    dossier_id TEXT REFERENCES dossiers(id)
);

CREATE INDEX IF NOT EXISTS idx_dossiers_client ON dossiers(client_id);
CREATE INDEX IF NOT EXISTS idx_documents_dossier ON documents(dossier_id);
"#;
