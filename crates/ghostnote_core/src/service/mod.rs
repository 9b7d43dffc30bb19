//! Note use-cases.
//!
//! # Responsibility
//! - Expose the capability manager to request handlers.
//! - Keep handlers free of storage and pagination details.

pub mod note_manager;
pub mod pagination;
