//! lexcab-store: SQLite-backed source of case-law records and case documents.

pub mod schema;
pub mod sqlite;
pub mod types;

pub use sqlite::SqliteSource;
pub use types::{ClientRow, DocumentRow, DossierRow, Fixtures, ImportCounts};
