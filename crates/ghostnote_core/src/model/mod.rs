//! Domain model for anonymous notes.
//!
//! # Responsibility
//! - Define the note record and the capability that guards it.
//!
//! # Invariants
//! - Identifiers and secrets are generated server-side only.
//! - Deletion is permanent; there is no tombstone state.

pub mod modification_code;
pub mod note;
