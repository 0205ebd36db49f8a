//! Candidate items produced by source readers.

use serde_json::Value;

use crate::contract::Metadata;

/// Content of a candidate item.
///
/// Text-bearing sources always upload inline; byte-bearing sources always upload as a
/// named attachment.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemBody {
    Text(String),
    File { file_name: String, data: Vec<u8> },
}

/// One unit of work for the importer.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateItem {
    /// Source-derived idempotency key. Empty means the item is skipped.
    pub external_id: String,
    pub title: String,
    pub body: ItemBody,
    pub metadata: Metadata,
}

impl CandidateItem {
    pub fn text(external_id: impl Into<String>, title: impl Into<String>, data: impl Into<String>) -> Self {
        CandidateItem {
            external_id: external_id.into(),
            title: title.into(),
            body: ItemBody::Text(data.into()),
            metadata: Metadata::new(),
        }
    }

    pub fn file(
        external_id: impl Into<String>,
        title: impl Into<String>,
        file_name: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        CandidateItem {
            external_id: external_id.into(),
            title: title.into(),
            body: ItemBody::File {
                file_name: file_name.into(),
                data,
            },
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Whitespace-only text and zero-byte files count as empty.
    pub fn is_empty_body(&self) -> bool {
        match &self.body {
            ItemBody::Text(text) => text.trim().is_empty(),
            ItemBody::File { data, .. } => data.is_empty(),
        }
    }

    /// Name sent to the service; the external ID when the title is blank.
    pub fn display_name(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.external_id
        } else {
            &self.title
        }
    }
}
