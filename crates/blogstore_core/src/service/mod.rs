//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the operations the boundary consumes.
//! - Keep routing/CLI layers decoupled from SQL and connection handling.

pub mod blog_service;
