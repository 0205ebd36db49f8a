#![doc = "HTTP client for the Ragie document API, implementing the core `DocumentService` trait."]
//
//! # Ragie client (CLI <-> API)
//!
//! [`RagieClient`] is the only place the importer speaks HTTP. It turns the core's
//! request types into the four calls the importer needs:
//!
//! - `POST /documents/raw` with a JSON body, for text items
//! - `POST /documents` as multipart form data, for file items
//! - `GET /documents` with `filter`, `page_size` and `cursor` query parameters
//! - `DELETE /documents/{id}`
//!
//! Every request carries `Authorization: Bearer <key>`. The partition travels in the
//! body for creates and in a `Partition` header for listing.
//!
//! ## Configuration
//! - `RAGIE_API_KEY` (required) and `RAGIE_BASE_URL` (optional, defaults to
//!   [`DEFAULT_BASE_URL`]) are read by [`RagieClient::new_from_env`], after `.env` is loaded.
//!
//! ## Errors
//! Unexpected status codes become [`ClientError::Api`], rendered as
//! `API error: <status> - <body>`.

use std::env;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use thiserror::Error;

use ragie_import_core::contract::{
    Document, DocumentService, ListOptions, ListResponse, Metadata, NewFileDocument,
    NewRawDocument, ServiceError,
};

pub const DEFAULT_BASE_URL: &str = "https://api.ragie.ai";
pub const API_KEY_VAR: &str = "RAGIE_API_KEY";
pub const BASE_URL_VAR: &str = "RAGIE_BASE_URL";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("RAGIE_API_KEY environment variable must be set")]
    MissingApiKey,
    #[error("API error: {status} - {body}")]
    Api { status: StatusCode, body: String },
    #[error("failed to encode {field}: {source}")]
    Encode {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Serialize)]
struct RawPayload<'a> {
    name: &'a str,
    data: &'a str,
    metadata: &'a Metadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    partition: Option<&'a str>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn raw_payload(req: &NewRawDocument) -> RawPayload<'_> {
    RawPayload {
        name: &req.name,
        data: &req.data,
        metadata: &req.metadata,
        partition: non_empty(req.partition.as_deref()),
    }
}

/// Query parameters for `GET /documents`; unset options are left out.
fn list_query(opts: &ListOptions) -> Result<Vec<(&'static str, String)>, ClientError> {
    let mut query = Vec::new();
    if let Some(filter) = &opts.filter {
        let encoded = serde_json::to_string(filter).map_err(|source| ClientError::Encode {
            field: "filter",
            source,
        })?;
        query.push(("filter", encoded));
    }
    if let Some(page_size) = opts.page_size.filter(|n| *n > 0) {
        query.push(("page_size", page_size.to_string()));
    }
    if let Some(cursor) = non_empty(opts.cursor.as_deref()) {
        query.push(("cursor", cursor.to_string()));
    }
    Ok(query)
}

/// Text fields of the multipart upload, in the order they are written.
fn form_fields(req: &NewFileDocument) -> Result<Vec<(&'static str, String)>, ClientError> {
    let mut fields = vec![("name", req.name.clone())];
    if let Some(partition) = non_empty(req.partition.as_deref()) {
        fields.push(("partition", partition.to_string()));
    }
    if let Some(mode) = &req.mode {
        let value = mode.to_form_value().map_err(|source| ClientError::Encode {
            field: "mode",
            source,
        })?;
        fields.push(("mode", value));
    }
    let metadata = serde_json::to_string(&req.metadata).map_err(|source| ClientError::Encode {
        field: "metadata",
        source,
    })?;
    fields.push(("metadata", metadata));
    Ok(fields)
}

async fn expect_status(resp: Response, expected: StatusCode) -> Result<Response, ClientError> {
    let status = resp.status();
    if status == expected {
        return Ok(resp);
    }
    let body = resp
        .text()
        .await
        .unwrap_or_else(|_| String::from("<failed to read response body>"));
    Err(ClientError::Api { status, body })
}

pub struct RagieClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl RagieClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = Client::builder().build()?;
        let base_url: String = base_url.into();
        Ok(RagieClient {
            http,
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn new_from_env() -> Result<Self, ClientError> {
        dotenvy::dotenv().ok(); // loads environment variables from .env if present
        let api_key = env::var(API_KEY_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                tracing::error!("{API_KEY_VAR} missing in environment");
                ClientError::MissingApiKey
            })?;
        let base_url = env::var(BASE_URL_VAR)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        tracing::info!(base_url = %base_url, "Initialized RagieClient from environment");
        RagieClient::new(api_key, base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_raw(&self, req: &NewRawDocument) -> Result<Document, ClientError> {
        let resp = self
            .http
            .post(self.url("/documents/raw"))
            .bearer_auth(&self.api_key)
            .json(&raw_payload(req))
            .send()
            .await?;
        let resp = expect_status(resp, StatusCode::CREATED).await?;
        Ok(resp.json().await?)
    }

    async fn post_file(&self, req: NewFileDocument) -> Result<Document, ClientError> {
        let mut form = Form::new().part(
            "file",
            Part::bytes(req.data.clone()).file_name(req.file_name.clone()),
        );
        for (field, value) in form_fields(&req)? {
            form = form.text(field, value);
        }

        let resp = self
            .http
            .post(self.url("/documents"))
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await?;
        let resp = expect_status(resp, StatusCode::CREATED).await?;
        Ok(resp.json().await?)
    }

    async fn get_documents(&self, opts: &ListOptions) -> Result<ListResponse, ClientError> {
        let mut request = self
            .http
            .get(self.url("/documents"))
            .bearer_auth(&self.api_key)
            .query(&list_query(opts)?);
        if let Some(partition) = non_empty(opts.partition.as_deref()) {
            request = request.header("Partition", partition);
        }
        let resp = expect_status(request.send().await?, StatusCode::OK).await?;
        Ok(resp.json().await?)
    }

    async fn delete(&self, id: &str) -> Result<(), ClientError> {
        let resp = self
            .http
            .delete(self.url(&format!("/documents/{id}")))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        expect_status(resp, StatusCode::OK).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentService for RagieClient {
    async fn list_documents(&self, opts: ListOptions) -> Result<ListResponse, ServiceError> {
        tracing::debug!(
            page_size = ?opts.page_size,
            cursor = ?opts.cursor,
            partition = ?opts.partition,
            "Listing documents"
        );
        match self.get_documents(&opts).await {
            Ok(page) => {
                tracing::debug!(count = page.documents.len(), "Fetched document page");
                Ok(page)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to list documents");
                Err(e.into())
            }
        }
    }

    async fn create_document_raw(&self, req: NewRawDocument) -> Result<Document, ServiceError> {
        tracing::info!(name = %req.name, bytes = req.data.len(), "Uploading raw document");
        match self.post_raw(&req).await {
            Ok(doc) => {
                tracing::info!(document_id = %doc.id, "Successfully created raw document");
                Ok(doc)
            }
            Err(e) => {
                tracing::error!(error = %e, name = %req.name, "API error creating raw document");
                Err(e.into())
            }
        }
    }

    async fn create_document(&self, req: NewFileDocument) -> Result<Document, ServiceError> {
        let name = req.name.clone();
        tracing::info!(name = %name, file_name = %req.file_name, bytes = req.data.len(), "Uploading file document");
        match self.post_file(req).await {
            Ok(doc) => {
                tracing::info!(document_id = %doc.id, "Successfully created file document");
                Ok(doc)
            }
            Err(e) => {
                tracing::error!(error = %e, name = %name, "API error creating file document");
                Err(e.into())
            }
        }
    }

    async fn delete_document(&self, id: &str) -> Result<(), ServiceError> {
        tracing::info!(document_id = id, "Deleting document");
        self.delete(id).await.map_err(|e| {
            tracing::error!(error = %e, document_id = id, "Failed to delete document");
            e.into()
        })
    }
}
