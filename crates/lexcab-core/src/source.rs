//! In-memory `RecordSource`, used by tests and by hosts that already hold the rows.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::error::{Error, Result};
use crate::traits::RecordSource;
use crate::types::{CaseDocumentRecord, JurisprudenceRecord};

#[derive(Default)]
pub struct MemorySource {
    jurisprudence: Mutex<Vec<JurisprudenceRecord>>,
    documents: Mutex<Vec<CaseDocumentRecord>>,
    reads: AtomicUsize,
    failing: AtomicBool,
}

impl MemorySource {
    pub fn new(jurisprudence: Vec<JurisprudenceRecord>, documents: Vec<CaseDocumentRecord>) -> Self {
        Self {
            jurisprudence: Mutex::new(jurisprudence),
            documents: Mutex::new(documents),
            ..Self::default()
        }
    }

    pub fn push_jurisprudence(&self, record: JurisprudenceRecord) {
        self.jurisprudence.lock().unwrap_or_else(PoisonError::into_inner).push(record);
    }

    pub fn push_document(&self, record: CaseDocumentRecord) {
        self.documents.lock().unwrap_or_else(PoisonError::into_inner).push(record);
    }

    /// Make every subsequent read fail, simulating an unreachable database.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `list_jurisprudence` calls so far; one per full rebuild.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Source("memory source is unavailable".to_string()));
        }
        Ok(())
    }
}

impl RecordSource for MemorySource {
    fn list_jurisprudence(&self) -> Result<Vec<JurisprudenceRecord>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.jurisprudence.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn list_documents_with_case(&self) -> Result<Vec<CaseDocumentRecord>> {
        self.check()?;
        Ok(self.documents.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }
}
