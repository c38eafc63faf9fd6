use crate::error::Result;
use crate::index::SearchServer;
use crate::ranking::DocumentFilter;
use crate::{DocId, Document, DocumentStatus, ExecutionMode};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Cloneable handle that serializes mutations against each other and against reads,
/// while letting any number of readers search at once.
#[derive(Clone, Default)]
pub struct SharedSearchServer {
    inner: Arc<RwLock<SearchServer>>,
}

impl SharedSearchServer {
    pub fn new(server: SearchServer) -> Self { Self { inner: Arc::new(RwLock::new(server)) } }

    pub fn read(&self) -> RwLockReadGuard<'_, SearchServer> { self.inner.read() }

    pub fn write(&self) -> RwLockWriteGuard<'_, SearchServer> { self.inner.write() }

    pub fn add_document(&self, document_id: DocId, document: &str, status: DocumentStatus, ratings: &[i32]) -> Result<()> {
        self.write().add_document(document_id, document, status, ratings)
    }

    pub fn remove_document_with(&self, mode: ExecutionMode, document_id: DocId) -> Result<()> {
        self.write().remove_document_with(mode, document_id)
    }

    pub fn find_top_documents_with<F: DocumentFilter>(
        &self,
        mode: ExecutionMode,
        raw_query: &str,
        filter: F,
    ) -> Result<Vec<Document>> {
        self.read().find_top_documents_with(mode, raw_query, filter)
    }

    pub fn document_count(&self) -> usize { self.read().document_count() }
}
