//! Project store: the single authoritative holder of the current project.
//!
//! # Responsibility
//! - Load the persisted project on startup, falling back to the seed.
//! - Apply mutations as whole-value replacements and persist each one.
//! - Publish every new project value to subscribed observers.
//! - Replace local state when storage reports an external write.
//!
//! # Invariants
//! - `updated_at` changes only on commit, never on read.
//! - References to missing rows or columns are ignored without a commit.
//! - External changes overwrite local state unconditionally (last writer
//!   wins) and are never written back.
//! - Storage write failures propagate to the caller; the in-memory project
//!   already holds the new value at that point.

use crate::clock::{Clock, SystemClock};
use crate::csv::{export_file_name, from_csv_with_token, to_csv};
use crate::model::ids::{IdGenerator, COLUMN_PREFIX, ROW_PREFIX};
use crate::model::project::{Column, ColumnId, Project, Row, RowId, DEFAULT_COLUMN_TITLE};
use crate::repo::document_repo::{DocumentStorage, RepoResult, StorageEvent};
use log::{debug, error, info, warn};

/// Persisted key used by the host when no other key is configured.
pub const DEFAULT_STORAGE_KEY: &str = "nexplan_active_project";

/// Handle returned by `subscribe`, used to detach the listener again.
pub type SubscriptionId = u64;

type Listener = Box<dyn FnMut(&Project)>;

pub struct ProjectStore<S: DocumentStorage> {
    storage: S,
    storage_key: String,
    clock: Box<dyn Clock>,
    ids: IdGenerator,
    project: Project,
    last_saved: i64,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: SubscriptionId,
}

impl<S: DocumentStorage> ProjectStore<S> {
    /// Opens the store over `storage` using the system clock.
    pub fn open(storage: S, storage_key: impl Into<String>) -> Self {
        Self::open_with_clock(storage, storage_key, Box::new(SystemClock))
    }

    /// Opens the store with a caller-provided clock.
    ///
    /// Missing, unreadable or unparsable persisted state falls back to the
    /// seed project; the failure is logged, never returned.
    pub fn open_with_clock(
        storage: S,
        storage_key: impl Into<String>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let storage_key = storage_key.into();
        let now = clock.now_epoch_ms();
        let project = load_initial_project(&storage, &storage_key, now);

        Self {
            storage,
            storage_key,
            clock,
            ids: IdGenerator::new(),
            project,
            last_saved: now,
            listeners: Vec::new(),
            next_subscription: 1,
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Epoch milliseconds of the last local commit or applied external change.
    pub fn last_saved(&self) -> i64 {
        self.last_saved
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn export_csv(&self) -> String {
        to_csv(&self.project)
    }

    pub fn export_file_name(&self) -> String {
        export_file_name(&self.project.name)
    }

    /// Registers an observer called with every newly published project.
    pub fn subscribe(&mut self, listener: impl FnMut(&Project) + 'static) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Detaches an observer. Returns `false` when `id` is unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Sets one cell value. Returns `false` when the row or column is missing.
    pub fn update_cell(
        &mut self,
        row_id: &str,
        column_id: &str,
        value: impl Into<String>,
    ) -> RepoResult<bool> {
        if !self.project.has_column(column_id) {
            debug!("event=update_cell module=store status=skipped reason=missing_column");
            return Ok(false);
        }

        let mut next = self.project.clone();
        let Some(row) = next.rows.iter_mut().find(|row| row.id == row_id) else {
            debug!("event=update_cell module=store status=skipped reason=missing_row");
            return Ok(false);
        };
        row.set_value(column_id, value);

        self.commit("update_cell", next)?;
        Ok(true)
    }

    /// Appends an empty row and returns its id.
    pub fn add_row(&mut self) -> RepoResult<RowId> {
        let now = self.clock.now_epoch_ms();
        let row_id = self
            .ids
            .next_id(ROW_PREFIX, now, |candidate| self.project.has_row(candidate));

        let mut next = self.project.clone();
        next.rows.push(Row::empty(row_id.clone()));
        self.commit("add_row", next)?;
        Ok(row_id)
    }

    /// Removes a row. Returns `false` when no row has `row_id`.
    pub fn delete_row(&mut self, row_id: &str) -> RepoResult<bool> {
        if !self.project.has_row(row_id) {
            debug!("event=delete_row module=store status=skipped reason=missing_row");
            return Ok(false);
        }

        let mut next = self.project.clone();
        next.rows.retain(|row| row.id != row_id);
        self.commit("delete_row", next)?;
        Ok(true)
    }

    /// Appends a text column and returns its id.
    pub fn add_column(&mut self, title: Option<&str>) -> RepoResult<ColumnId> {
        let now = self.clock.now_epoch_ms();
        let column_id = self
            .ids
            .next_id(COLUMN_PREFIX, now, |candidate| {
                self.project.has_column(candidate)
            });

        let mut next = self.project.clone();
        next.columns.push(Column::text(
            column_id.clone(),
            title.unwrap_or(DEFAULT_COLUMN_TITLE),
        ));
        self.commit("add_column", next)?;
        Ok(column_id)
    }

    /// Removes a column definition. Cell entries in rows are left in place.
    pub fn delete_column(&mut self, column_id: &str) -> RepoResult<bool> {
        if !self.project.has_column(column_id) {
            debug!("event=delete_column module=store status=skipped reason=missing_column");
            return Ok(false);
        }

        let mut next = self.project.clone();
        next.columns.retain(|column| column.id != column_id);
        self.commit("delete_column", next)?;
        Ok(true)
    }

    pub fn update_project_name(&mut self, name: impl Into<String>) -> RepoResult<()> {
        let mut next = self.project.clone();
        next.name = name.into();
        self.commit("update_project_name", next)
    }

    /// Replaces all columns and rows with the decoded CSV table.
    ///
    /// Returns `false` and leaves the project untouched when the text
    /// decodes to zero columns.
    pub fn import_data(&mut self, csv_text: &str) -> RepoResult<bool> {
        let token = self.ids.batch_token(self.clock.now_epoch_ms());
        let table = from_csv_with_token(csv_text, token);
        if table.is_empty() {
            info!("event=import_data module=store status=skipped reason=no_columns");
            return Ok(false);
        }

        let mut next = self.project.clone();
        next.columns = table.columns;
        next.rows = table.rows;
        self.commit("import_data", next)?;
        Ok(true)
    }

    /// Persists the current project again with a fresh timestamp.
    pub fn save_manual(&mut self) -> RepoResult<()> {
        let next = self.project.clone();
        self.commit("save_manual", next)
    }

    /// Applies a change notification for persisted state.
    ///
    /// Events for other keys, removals and unparsable payloads are ignored
    /// (the last one is logged). Returns `true` when local state was replaced.
    pub fn handle_storage_event(&mut self, event: &StorageEvent) -> bool {
        if event.key != self.storage_key {
            return false;
        }
        let Some(raw) = event.new_value.as_deref() else {
            debug!("event=external_change module=store status=skipped reason=removed");
            return false;
        };

        match serde_json::from_str::<Project>(raw) {
            Ok(project) => {
                self.project = project;
                self.last_saved = self.clock.now_epoch_ms();
                info!(
                    "event=external_change module=store status=ok columns={} rows={}",
                    self.project.columns.len(),
                    self.project.rows.len()
                );
                self.publish();
                true
            }
            Err(err) => {
                error!(
                    "event=external_change module=store status=error error_code=parse_failed error={err}"
                );
                false
            }
        }
    }

    /// Polls storage for external writes and applies them.
    ///
    /// Returns how many events replaced local state.
    pub fn sync_external(&mut self) -> RepoResult<usize> {
        let events = self.storage.poll_external_changes(&self.storage_key)?;
        Ok(events
            .iter()
            .filter(|event| self.handle_storage_event(event))
            .count())
    }

    fn commit(&mut self, op: &'static str, mut next: Project) -> RepoResult<()> {
        let now = self.clock.now_epoch_ms();
        next.updated_at = now;
        let payload = serde_json::to_string(&next)?;
        self.project = next;

        if let Err(err) = self.storage.save(&self.storage_key, &payload) {
            error!(
                "event=project_commit module=store status=error op={op} error_code=save_failed error={err}"
            );
            return Err(err);
        }
        self.last_saved = now;

        info!(
            "event=project_commit module=store status=ok op={op} columns={} rows={}",
            self.project.columns.len(),
            self.project.rows.len()
        );
        self.publish();
        Ok(())
    }

    fn publish(&mut self) {
        for (_, listener) in &mut self.listeners {
            listener(&self.project);
        }
    }
}

fn load_initial_project<S: DocumentStorage>(storage: &S, key: &str, now: i64) -> Project {
    match storage.load(key) {
        Ok(Some(raw)) => match serde_json::from_str::<Project>(&raw) {
            Ok(project) => {
                info!(
                    "event=project_load module=store status=ok columns={} rows={}",
                    project.columns.len(),
                    project.rows.len()
                );
                project
            }
            Err(err) => {
                warn!(
                    "event=project_load module=store status=fallback error_code=parse_failed error={err}"
                );
                Project::seed(now)
            }
        },
        Ok(None) => {
            info!("event=project_load module=store status=fallback reason=not_found");
            Project::seed(now)
        }
        Err(err) => {
            error!(
                "event=project_load module=store status=fallback error_code=load_failed error={err}"
            );
            Project::seed(now)
        }
    }
}
