//! ragie-import: CLI glue and the HTTP transport for importing content into Ragie.
//!
//! The reconciliation policy and the source readers live in `ragie-import-core`.

pub mod cli;
pub mod client;
pub mod load_config;

pub use cli::{run, Cli, Commands};
