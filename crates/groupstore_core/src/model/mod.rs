//! Typed records for groups and entity-to-group relations.
//!
//! # Responsibility
//! - Define the persisted shape of `Group` and `Relation`.
//! - Share timestamp, soft-delete and dirty-tracking behavior via `Record`.
//!
//! # Invariants
//! - Deletion defaults to a soft-delete stamp; the sentinel far-future
//!   timestamp means "not deleted".
//! - Records only change through setters, which record the touched column.

pub mod group;
pub mod metas;
pub mod record;
pub mod relation;
