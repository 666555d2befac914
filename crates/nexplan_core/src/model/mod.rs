//! Project tracker domain model.
//!
//! # Responsibility
//! - Define the persisted shape of a project: columns, rows and cells.
//! - Provide identifier generation for rows, columns and projects.
//!
//! # Invariants
//! - Column ids are unique within a project and key every row's cell map.
//! - Row ids are unique within a project.
//! - A missing cell reads as an empty string.

pub mod ids;
pub mod project;
