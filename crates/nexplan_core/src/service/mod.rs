//! Core use-case services.
//!
//! # Responsibility
//! - Own the in-memory project and route every mutation through a commit.
//! - Keep host/UI layers decoupled from storage details.

pub mod project_store;
