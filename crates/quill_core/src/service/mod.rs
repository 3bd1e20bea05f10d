//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep host layers (HTTP/CLI) decoupled from storage details.
//!
//! # Invariants
//! - Store failures are recorded as `store_failure` events before they
//!   propagate; they are never retried or swallowed.
//! - "Not found" surfaces as `None`/`false`, never as an error.

pub mod post_service;
pub mod tag_service;
