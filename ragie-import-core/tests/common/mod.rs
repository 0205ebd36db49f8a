#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use ragie_import_core::contract::{
    Document, DocumentService, ListOptions, ListResponse, Metadata, NewFileDocument,
    NewRawDocument, Pagination, ServiceError,
};

/// In-memory document store that behaves like the remote service for list/create/delete.
#[derive(Default)]
pub struct InMemoryService {
    docs: Mutex<Vec<Document>>,
    next_id: AtomicUsize,
    pub lists: AtomicUsize,
    pub creates: AtomicUsize,
    pub deletes: AtomicUsize,
}

impl InMemoryService {
    pub fn documents(&self) -> Vec<Document> {
        self.docs.lock().unwrap().clone()
    }

    pub fn with_external_id(&self, external_id: &str) -> Vec<Document> {
        self.documents()
            .into_iter()
            .filter(|d| d.metadata.get("external_id").and_then(|v| v.as_str()) == Some(external_id))
            .collect()
    }

    pub fn reset_counters(&self) {
        self.lists.store(0, Ordering::SeqCst);
        self.creates.store(0, Ordering::SeqCst);
        self.deletes.store(0, Ordering::SeqCst);
    }

    fn insert(&self, name: String, metadata: Metadata) -> Document {
        let id = format!("doc-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let doc = Document { id, name, metadata };
        self.docs.lock().unwrap().push(doc.clone());
        self.creates.fetch_add(1, Ordering::SeqCst);
        doc
    }
}

fn matches_filter(doc: &Document, filter: &Option<Metadata>) -> bool {
    match filter {
        None => true,
        Some(filter) => filter
            .iter()
            .all(|(key, value)| doc.metadata.get(key) == Some(value)),
    }
}

#[async_trait]
impl DocumentService for InMemoryService {
    async fn list_documents(&self, opts: ListOptions) -> Result<ListResponse, ServiceError> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        let limit = opts.page_size.unwrap_or(100) as usize;
        let documents = self
            .docs
            .lock()
            .unwrap()
            .iter()
            .filter(|d| matches_filter(d, &opts.filter))
            .take(limit)
            .cloned()
            .collect();
        Ok(ListResponse {
            documents,
            pagination: Pagination::default(),
        })
    }

    async fn create_document_raw(&self, req: NewRawDocument) -> Result<Document, ServiceError> {
        Ok(self.insert(req.name, req.metadata))
    }

    async fn create_document(&self, req: NewFileDocument) -> Result<Document, ServiceError> {
        Ok(self.insert(req.name, req.metadata))
    }

    async fn delete_document(&self, id: &str) -> Result<(), ServiceError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        let mut docs = self.docs.lock().unwrap();
        let before = docs.len();
        docs.retain(|d| d.id != id);
        if docs.len() == before {
            return Err(format!("API error: 404 Not Found - no document {id}").into());
        }
        Ok(())
    }
}

pub fn doc(id: &str, external_id: &str) -> Document {
    let mut metadata = Metadata::new();
    metadata.insert("external_id".into(), external_id.into());
    Document {
        id: id.to_string(),
        name: external_id.to_string(),
        metadata,
    }
}

pub fn page(docs: Vec<Document>, next_cursor: Option<&str>) -> ListResponse {
    ListResponse {
        documents: docs,
        pagination: Pagination {
            next_cursor: next_cursor.map(str::to_owned),
        },
    }
}
