#![doc = "ragie-import-core: reconciliation logic and source readers for ragie-import."]

//! This crate holds everything with policy in it: the candidate item model, the
//! processing-mode constructor, the per-item reconcile/upload orchestrator and the
//! four source readers. It never talks HTTP directly; the CLI crate supplies a
//! [`contract::DocumentService`] implementation.
//!
//! # Usage
//! Build an [`config::ImportConfig`], open a reader with [`sources::open_source`] and
//! hand its items to [`reconcile::Importer::import_all`].

pub mod config;
pub mod contract;
pub mod item;
pub mod mode;
pub mod reconcile;
pub mod sources;
