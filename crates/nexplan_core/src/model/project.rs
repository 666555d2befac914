//! Project document model.
//!
//! # Responsibility
//! - Define the canonical `Project` record and its serialized layout.
//! - Provide the built-in seed project used when nothing is persisted.
//! - Expose display hints for status and priority columns.
//!
//! # Invariants
//! - Serialized field names match the persisted layout exactly
//!   (`updatedAt`, `type`, `cells.<columnId>.value`).
//! - Cell values are never validated against `StatusOption`/`PriorityOption`.
//! - Deleting a column leaves orphaned cell entries in place.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Width assigned to columns created by `add_column` and CSV import.
pub const DEFAULT_COLUMN_WIDTH: u32 = 200;

/// Title assigned by `add_column` when the caller has no better name.
pub const DEFAULT_COLUMN_TITLE: &str = "New Column";

pub type ColumnId = String;
pub type RowId = String;

/// Closed set of column kinds.
///
/// The kind only drives rendering; every kind stores plain strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Status,
    Person,
    Date,
    Priority,
}

impl ColumnType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Status => "status",
            Self::Person => "person",
            Self::Date => "date",
            Self::Priority => "priority",
        }
    }

    /// Text a renderer shows for an empty cell of this kind.
    pub fn placeholder(self) -> &'static str {
        match self {
            Self::Status => StatusOption::NotStarted.label(),
            Self::Priority => PriorityOption::Low.label(),
            Self::Text | Self::Person | Self::Date => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    /// Serialized as `type` to match the persisted layout.
    #[serde(rename = "type")]
    pub kind: ColumnType,
    /// Cosmetic only.
    pub width: u32,
}

impl Column {
    /// Creates a text column with the default width.
    pub fn text(id: impl Into<ColumnId>, title: impl Into<String>) -> Self {
        Self::new(id, title, ColumnType::Text, DEFAULT_COLUMN_WIDTH)
    }

    pub fn new(
        id: impl Into<ColumnId>,
        title: impl Into<String>,
        kind: ColumnType,
        width: u32,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind,
            width,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellData {
    pub value: String,
}

impl CellData {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// One grid row. The cell map may be sparse and may hold orphaned entries
/// for columns that no longer exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub id: RowId,
    pub cells: BTreeMap<ColumnId, CellData>,
}

impl Row {
    /// Creates a row with an empty cell map.
    pub fn empty(id: impl Into<RowId>) -> Self {
        Self {
            id: id.into(),
            cells: BTreeMap::new(),
        }
    }

    /// Returns the cell value for `column_id`, or `""` when absent.
    pub fn value(&self, column_id: &str) -> &str {
        self.cells
            .get(column_id)
            .map_or("", |cell| cell.value.as_str())
    }

    pub fn set_value(&mut self, column_id: impl Into<ColumnId>, value: impl Into<String>) {
        self.cells.insert(column_id.into(), CellData::new(value));
    }
}

/// The whole tracked project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Display and export order.
    pub columns: Vec<Column>,
    /// Append order is preserved.
    pub rows: Vec<Row>,
    /// Unix epoch milliseconds of the last persisted mutation.
    pub updated_at: i64,
}

impl Project {
    /// Built-in starting document: five columns, one per kind, two rows.
    pub fn seed(updated_at: i64) -> Self {
        let seed_row = |id: &str, values: [&str; 5]| {
            let mut row = Row::empty(id);
            for (index, value) in values.into_iter().enumerate() {
                row.set_value(format!("c{}", index + 1), value);
            }
            row
        };

        Self {
            id: "proj_001".to_string(),
            name: "Q4 Product Roadmap".to_string(),
            description: "Tracking main deliverables for the upcoming quarter".to_string(),
            columns: vec![
                Column::new("c1", "Task Name", ColumnType::Text, 300),
                Column::new("c2", "Status", ColumnType::Status, 140),
                Column::new("c3", "Owner", ColumnType::Person, 160),
                Column::new("c4", "Due Date", ColumnType::Date, 140),
                Column::new("c5", "Priority", ColumnType::Priority, 120),
            ],
            rows: vec![
                seed_row(
                    "r1",
                    [
                        "Revamp Homepage Design",
                        "In Progress",
                        "Alice Design",
                        "2023-11-01",
                        "High",
                    ],
                ),
                seed_row(
                    "r2",
                    [
                        "Backend API Migration",
                        "Not Started",
                        "Bob Dev",
                        "2023-12-15",
                        "Critical",
                    ],
                ),
            ],
            updated_at,
        }
    }

    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.id == column_id)
    }

    pub fn row(&self, row_id: &str) -> Option<&Row> {
        self.rows.iter().find(|row| row.id == row_id)
    }

    pub fn has_column(&self, column_id: &str) -> bool {
        self.column(column_id).is_some()
    }

    pub fn has_row(&self, row_id: &str) -> bool {
        self.row(row_id).is_some()
    }
}

/// Predefined status labels. Used for styling only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusOption {
    NotStarted,
    InProgress,
    Blocked,
    Done,
}

impl StatusOption {
    pub const ALL: [Self; 4] = [
        Self::NotStarted,
        Self::InProgress,
        Self::Blocked,
        Self::Done,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Blocked => "Blocked",
            Self::Done => "Done",
        }
    }

    /// Returns `None` for any text outside the predefined set; callers fall
    /// back to a neutral style instead of rejecting the value.
    pub fn from_label(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|option| option.label() == value)
    }
}

/// Predefined priority labels. Used for styling only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PriorityOption {
    Low,
    Medium,
    High,
    Critical,
}

impl PriorityOption {
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|option| option.label() == value)
    }
}

#[cfg(test)]
mod tests {
    use super::{ColumnType, PriorityOption, Project, Row, StatusOption};

    #[test]
    fn seed_covers_every_column_type() {
        let project = Project::seed(42);
        let kinds = project
            .columns
            .iter()
            .map(|column| column.kind)
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                ColumnType::Text,
                ColumnType::Status,
                ColumnType::Person,
                ColumnType::Date,
                ColumnType::Priority,
            ]
        );
        assert_eq!(project.rows.len(), 2);
        assert_eq!(project.updated_at, 42);
        assert_eq!(project.rows[1].value("c5"), "Critical");
    }

    #[test]
    fn missing_cell_reads_as_empty() {
        let row = Row::empty("r1");
        assert_eq!(row.value("anything"), "");
    }

    #[test]
    fn serialized_layout_uses_persisted_field_names() {
        let json = serde_json::to_value(Project::seed(7)).unwrap();
        assert_eq!(json["updatedAt"], 7);
        assert_eq!(json["columns"][1]["type"], "status");
        assert_eq!(json["rows"][0]["cells"]["c1"]["value"], "Revamp Homepage Design");
    }

    #[test]
    fn unknown_labels_are_not_rejected() {
        assert_eq!(StatusOption::from_label("Done"), Some(StatusOption::Done));
        assert_eq!(StatusOption::from_label("Waiting on legal"), None);
        assert_eq!(PriorityOption::from_label("urgent!!"), None);
        assert_eq!(ColumnType::Status.placeholder(), "Not Started");
        assert_eq!(ColumnType::Date.placeholder(), "");
    }
}
