//! # contract: interface to the remote document service
//!
//! This module defines the [`DocumentService`] trait and the plain data types that
//! flow across it. The core never speaks HTTP; the CLI crate provides the real
//! client and tests use the generated [`MockDocumentService`].
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall` behind the `test-export-mocks` feature so that
//!   downstream crates can script the service in their own tests.
//!
//! ## Errors
//! - Every method returns a boxed [`ServiceError`]. Implementors convert transport,
//!   status and decoding failures into it; the core only logs it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::mode::Mode;

/// Error type returned by every [`DocumentService`] call.
pub type ServiceError = Box<dyn std::error::Error + Send + Sync>;

/// Source-specific key/value pairs attached to a document.
pub type Metadata = Map<String, Value>;

/// Metadata key the importer uses as its idempotency key.
pub const EXTERNAL_ID_KEY: &str = "external_id";

/// A document as returned by the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Query parameters for listing documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListOptions {
    /// Metadata filter, sent as a JSON object. `None` lists everything.
    pub filter: Option<Metadata>,
    pub page_size: Option<u32>,
    /// Opaque cursor from a previous page's `next_cursor`.
    pub cursor: Option<String>,
    /// Logical namespace; `None` means the default partition.
    pub partition: Option<String>,
}

impl ListOptions {
    /// Options for an existence check: documents whose `external_id` equals `external_id`.
    pub fn external_id(external_id: &str, partition: Option<&str>, page_size: u32) -> Self {
        let mut filter = Metadata::new();
        filter.insert(EXTERNAL_ID_KEY.to_string(), Value::from(external_id));
        ListOptions {
            filter: Some(filter),
            page_size: Some(page_size),
            cursor: None,
            partition: partition.map(str::to_owned),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// One page of documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// Request for an inline text document.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRawDocument {
    pub name: String,
    pub data: String,
    pub metadata: Metadata,
    pub partition: Option<String>,
}

/// Request for a binary upload sent as a named attachment.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFileDocument {
    /// Display name of the document.
    pub name: String,
    /// File name used for the multipart attachment.
    pub file_name: String,
    pub data: Vec<u8>,
    pub metadata: Metadata,
    pub partition: Option<String>,
    /// Processing hint; `None` leaves the field out of the request.
    pub mode: Option<Mode>,
}

/// Operations the importer needs from the remote document service.
///
/// Implemented by the HTTP client and by test mocks. All calls are awaited one at a
/// time by the core; implementors do not need to be reentrant beyond `Send + Sync`.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait DocumentService: Send + Sync {
    /// List one page of documents matching `opts`.
    async fn list_documents(&self, opts: ListOptions) -> Result<ListResponse, ServiceError>;

    /// Create a document from inline UTF-8 text.
    async fn create_document_raw(&self, req: NewRawDocument) -> Result<Document, ServiceError>;

    /// Create a document from raw bytes.
    async fn create_document(&self, req: NewFileDocument) -> Result<Document, ServiceError>;

    /// Delete a document by its remote ID.
    async fn delete_document(&self, id: &str) -> Result<(), ServiceError>;
}
