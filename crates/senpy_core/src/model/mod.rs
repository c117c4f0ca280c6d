//! Analysis data model shared by plugins.
//!
//! # Responsibility
//! - Define the entry/emotion-set/emotion records exchanged between pipeline
//!   stages.
//! - Preserve fields this crate does not interpret so downstream stages see
//!   the same document shape.
//!
//! # Invariants
//! - Field names follow the JSON-LD vocabulary (`onyx:*`, `prov:*`).
//! - Unknown fields survive a deserialize/serialize cycle untouched.

pub mod entry;
