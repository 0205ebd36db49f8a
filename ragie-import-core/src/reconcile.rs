//! Reconciliation and upload orchestration.
//!
//! For every candidate item this module decides whether to create, skip, duplicate or
//! replace the remote document sharing its external ID, then performs the upload and
//! paces the run. Items are handled strictly one after another, in the order the
//! reader produced them.
//!
//! # Major Types
//! - [`Importer`]: holds the service handle, the immutable [`ImportConfig`] and the
//!   resolved upload [`Mode`]
//! - [`ItemOutcome`] / [`ImportReport`]: per-item result and run totals
//! - [`clear_documents`]: deletes every document of a partition, page by page
//!
//! # Error Handling
//! Failures are contained at the item boundary: a failed lookup counts as "not found",
//! a failed create or delete is logged and the run moves on. Only [`clear_documents`]
//! returns an error, when a page cannot be listed.

use tracing::{debug, error, info, warn};

use crate::config::{ConflictPolicy, ImportConfig};
use crate::contract::{
    Document, DocumentService, ListOptions, Metadata, NewFileDocument, NewRawDocument,
    ServiceError, EXTERNAL_ID_KEY,
};
use crate::item::{CandidateItem, ItemBody};
use crate::mode::{construct_mode, Mode};
use crate::sources::SourceError;

/// Page size for the plain existence check.
const EXISTS_PAGE_SIZE: u32 = 1;
/// Page size when the lookup feeds a replace, and for clearing.
const REPLACE_PAGE_SIZE: u32 = 100;

/// Why an item was deliberately not uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingExternalId,
    AlreadyExists,
    EmptyContent,
}

/// Result of processing one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Created { id: String },
    /// Dry run: the upload was announced but not performed.
    DryRun,
    Skipped(SkipReason),
    Failed,
}

/// Totals for one import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub created: usize,
    pub dry_run: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Entries the reader could not read.
    pub unreadable: usize,
}

impl ImportReport {
    fn record(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Created { .. } => self.created += 1,
            ItemOutcome::DryRun => self.dry_run += 1,
            ItemOutcome::Skipped(_) => self.skipped += 1,
            ItemOutcome::Failed => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.created + self.dry_run + self.skipped + self.failed + self.unreadable
    }
}

pub struct Importer<'a, S: ?Sized> {
    service: &'a S,
    config: &'a ImportConfig,
    mode: Option<Mode>,
}

impl<'a, S> Importer<'a, S>
where
    S: DocumentService + ?Sized,
{
    pub fn new(service: &'a S, config: &'a ImportConfig) -> Self {
        let mode = construct_mode(&config.mode);
        debug!(?mode, "Resolved upload mode");
        Importer {
            service,
            config,
            mode,
        }
    }

    /// Mode sent with binary uploads.
    pub fn mode(&self) -> Option<&Mode> {
        self.mode.as_ref()
    }

    /// Process every entry of a reader's output in order.
    ///
    /// Entries the reader failed to read are logged and counted, then skipped.
    pub async fn import_all<I>(&self, entries: I) -> ImportReport
    where
        I: IntoIterator<Item = Result<CandidateItem, SourceError>>,
    {
        let mut report = ImportReport::default();
        for entry in entries {
            match entry {
                Ok(item) => {
                    let outcome = self.process_item(item).await;
                    report.record(&outcome);
                }
                Err(e) => {
                    error!(error = %e, "Failed to read source entry, skipping");
                    report.unreadable += 1;
                }
            }
        }
        info!(?report, "Import finished");
        report
    }

    /// Reconcile one item against the remote service and upload it if appropriate.
    ///
    /// An item without an external ID returns immediately, before any network call and
    /// without pacing. Every other outcome is followed by the configured delay.
    pub async fn process_item(&self, item: CandidateItem) -> ItemOutcome {
        if item.external_id.is_empty() {
            warn!(title = %item.title, "skipping item with no external id");
            return ItemOutcome::Skipped(SkipReason::MissingExternalId);
        }

        let outcome = self.reconcile(item).await;
        self.pace().await;
        outcome
    }

    async fn reconcile(&self, item: CandidateItem) -> ItemOutcome {
        let external_id = item.external_id.as_str();
        let page_size = match self.config.conflict {
            ConflictPolicy::Replace => REPLACE_PAGE_SIZE,
            _ => EXISTS_PAGE_SIZE,
        };

        // A failed lookup is treated as "not found" so the import keeps going.
        let existing = self
            .find_existing(external_id, page_size)
            .await
            .unwrap_or_else(|e| {
                warn!(external_id, error = %e, "existence check failed, treating document as new");
                Vec::new()
            });

        if !existing.is_empty() {
            match self.config.conflict {
                ConflictPolicy::Skip => {
                    warn!(external_id, "skipping item with existing document");
                    return ItemOutcome::Skipped(SkipReason::AlreadyExists);
                }
                ConflictPolicy::Force => {
                    info!(
                        external_id,
                        existing = existing.len(),
                        "force set, creating duplicate document"
                    );
                }
                ConflictPolicy::Replace => {
                    if let Err(e) = self.delete_existing(external_id, &existing).await {
                        error!(external_id, error = %e, "failed to delete existing document, skipping item");
                        return ItemOutcome::Failed;
                    }
                }
            }
        }

        if item.is_empty_body() {
            warn!(external_id, "refusing to upload empty content");
            return ItemOutcome::Skipped(SkipReason::EmptyContent);
        }

        self.upload(item).await
    }

    async fn find_existing(
        &self,
        external_id: &str,
        page_size: u32,
    ) -> Result<Vec<Document>, ServiceError> {
        let opts = ListOptions::external_id(external_id, self.config.partition.as_deref(), page_size);
        let page = self.service.list_documents(opts).await?;
        debug!(external_id, found = page.documents.len(), "Existence check complete");
        Ok(page.documents)
    }

    /// Delete every document in `existing`, stopping at the first failure.
    async fn delete_existing(
        &self,
        external_id: &str,
        existing: &[Document],
    ) -> Result<(), ServiceError> {
        for doc in existing {
            if self.config.dry_run {
                println!("would delete existing document {} for {external_id}", doc.id);
                continue;
            }
            self.service.delete_document(&doc.id).await?;
            info!(external_id, document_id = %doc.id, "Deleted existing document");
            println!("deleted existing document {} for {external_id}", doc.id);
        }
        Ok(())
    }

    async fn upload(&self, item: CandidateItem) -> ItemOutcome {
        let name = item.display_name().to_string();
        let external_id = item.external_id;
        let mut metadata: Metadata = item.metadata;
        metadata.insert(EXTERNAL_ID_KEY.to_string(), external_id.clone().into());

        if self.config.dry_run {
            println!("would save document: {name}");
            return ItemOutcome::DryRun;
        }

        let partition = self.config.partition.clone();
        let result = match item.body {
            ItemBody::Text(data) => {
                self.service
                    .create_document_raw(NewRawDocument {
                        name,
                        data,
                        metadata,
                        partition,
                    })
                    .await
            }
            ItemBody::File { file_name, data } => {
                self.service
                    .create_document(NewFileDocument {
                        name,
                        file_name,
                        data,
                        metadata,
                        partition,
                        mode: self.mode.clone(),
                    })
                    .await
            }
        };

        match result {
            Ok(doc) => {
                info!(external_id = %external_id, document_id = %doc.id, "Saved document");
                println!("saved: {}", doc.id);
                ItemOutcome::Created { id: doc.id }
            }
            Err(e) => {
                error!(external_id = %external_id, error = %e, "failed to import item");
                ItemOutcome::Failed
            }
        }
    }

    async fn pace(&self) {
        if !self.config.delay.is_zero() {
            tokio::time::sleep(self.config.delay).await;
        }
    }
}

/// Totals for a clear run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearReport {
    pub deleted: usize,
    /// Dry run: documents that would have been deleted.
    pub would_delete: usize,
    pub failed: usize,
}

/// Delete every document in `partition`, following pagination cursors.
///
/// A failed delete is logged and clearing continues; a failed list aborts.
pub async fn clear_documents<S>(
    service: &S,
    partition: Option<&str>,
    dry_run: bool,
) -> Result<ClearReport, ServiceError>
where
    S: DocumentService + ?Sized,
{
    info!(partition = partition.unwrap_or("<default>"), dry_run, "Clearing documents");
    let mut report = ClearReport::default();
    let mut opts = ListOptions {
        filter: Some(Metadata::new()),
        page_size: Some(REPLACE_PAGE_SIZE),
        cursor: None,
        partition: partition.map(str::to_owned),
    };

    loop {
        let page = service.list_documents(opts.clone()).await.map_err(|e| {
            error!(error = %e, "Failed to list documents");
            e
        })?;
        if page.documents.is_empty() {
            break;
        }

        for doc in &page.documents {
            if dry_run {
                println!("would delete {}", doc.id);
                report.would_delete += 1;
                continue;
            }
            match service.delete_document(&doc.id).await {
                Ok(()) => {
                    println!("deleted {}", doc.id);
                    report.deleted += 1;
                }
                Err(e) => {
                    error!(document_id = %doc.id, error = %e, "error deleting document");
                    report.failed += 1;
                }
            }
        }

        match page.pagination.next_cursor {
            Some(cursor) if !cursor.is_empty() => opts.cursor = Some(cursor),
            _ => break,
        }
    }

    info!(?report, "Clear finished");
    Ok(report)
}
