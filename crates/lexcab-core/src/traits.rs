use crate::error::Result;
use crate::types::{CaseDocumentRecord, JurisprudenceRecord};

/// Read contracts of the data-access layer. The index never writes through them.
pub trait RecordSource: Send + Sync {
    fn list_jurisprudence(&self) -> Result<Vec<JurisprudenceRecord>>;
    /// Documents joined with their dossier reference/title and the dossier's client name.
    fn list_documents_with_case(&self) -> Result<Vec<CaseDocumentRecord>>;
}

impl<T: RecordSource + ?Sized> RecordSource for std::sync::Arc<T> {
    fn list_jurisprudence(&self) -> Result<Vec<JurisprudenceRecord>> {
        (**self).list_jurisprudence()
    }

    fn list_documents_with_case(&self) -> Result<Vec<CaseDocumentRecord>> {
        (**self).list_documents_with_case()
    }
}
