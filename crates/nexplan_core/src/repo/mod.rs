//! Persisted state access.
//!
//! # Responsibility
//! - Define the key/value contract the project store persists through.
//! - Keep SQL details behind that contract.
//!
//! # Invariants
//! - One key holds one whole serialized document; writes replace it.
//! - Change polling only reports writes made through other handles.

pub mod document_repo;
