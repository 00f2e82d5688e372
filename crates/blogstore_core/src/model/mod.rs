//! Blog domain model and client-input normalization.
//!
//! # Responsibility
//! - Define the tag and post shapes exchanged with repository callers.
//! - Normalize ambiguous client input (paging, tag lists, ids, slugs).
//!
//! # Invariants
//! - Persisted tag names are non-empty after trimming.
//! - Post slugs are derived from titles, never supplied by clients.

pub mod paging;
pub mod post;
pub mod slug;
pub mod tag;
pub mod validation;
