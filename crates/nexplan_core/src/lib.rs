//! Core of the NexPlan project tracker.
//! This crate owns the project document, its persistence and CSV exchange.

pub mod clock;
pub mod config;
pub mod csv;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use clock::{Clock, SystemClock};
pub use config::{ConfigError, StoreConfig};
pub use csv::{export_file_name, from_csv, to_csv, ParsedTable};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::ids::IdGenerator;
pub use model::project::{
    CellData, Column, ColumnId, ColumnType, PriorityOption, Project, Row, RowId, StatusOption,
};
pub use repo::document_repo::{
    DocumentStorage, RepoError, RepoResult, SqliteDocumentStorage, StorageEvent,
};
pub use service::project_store::{ProjectStore, SubscriptionId, DEFAULT_STORAGE_KEY};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
