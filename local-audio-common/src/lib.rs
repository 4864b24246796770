//! # Local Audio Common Library
//!
//! Indexing and lookup core for the local pronunciation audio server:
//! - Mora segmentation and pitch accent display text
//! - Source adapters for each supported corpus format
//! - The SQLite-backed entry index and its lookup query builder
//! - Variant form backfill
//! - Index build lifecycle, staleness checks and configuration

pub mod backfill;
pub mod config;
pub mod db;
pub mod error;
pub mod index;
pub mod japanese;
pub mod media;
pub mod sources;
pub mod version;

pub use error::{Error, Result};
pub use index::{AudioIndex, SharedIndex};
