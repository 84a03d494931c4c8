//! media-diary
//!
//! Watch diary with TMDb enrichment and Letterboxd import. The matching
//! core lives in `media-diary-common`; this crate wires it to the catalog
//! client, the record store and the CLI.

pub mod backfill;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod import;
pub mod reconcile;
pub mod store;
