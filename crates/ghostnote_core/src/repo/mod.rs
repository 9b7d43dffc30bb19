//! Persistence boundary for notes.
//!
//! # Responsibility
//! - Define the store contract the manager is written against.
//! - Keep SQL inside this module.
//!
//! # Invariants
//! - Stores never decide authorization; they only honor the code predicate
//!   they are given.

pub mod note_store;
