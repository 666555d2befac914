//! Plain-text grid rendering.

use nexplan_core::{Column, ColumnType, PriorityOption, Project, StatusOption};
use std::fmt::Write;

const MIN_CELL_CHARS: usize = 6;
const PIXELS_PER_CHAR: u32 = 10;

/// Renders the project header and grid, one line per row.
pub fn render_project(project: &Project) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} [{}]", project.name, project.id);
    if !project.description.is_empty() {
        let _ = writeln!(out, "{}", project.description);
    }

    let header = project
        .columns
        .iter()
        .map(|column| fit(&format!("{} ({})", column.title, column.id), column))
        .collect::<Vec<_>>();
    let _ = writeln!(out, "{:<12}| {}", "row", header.join(" | "));

    for row in &project.rows {
        let cells = project
            .columns
            .iter()
            .map(|column| fit(&display_value(column, row.value(&column.id)), column))
            .collect::<Vec<_>>();
        let _ = writeln!(out, "{:<12}| {}", row.id, cells.join(" | "));
    }

    out
}

/// Cell text with kind hints: placeholders for empty option cells and a
/// `?` suffix for values outside the predefined options.
pub fn display_value(column: &Column, value: &str) -> String {
    if value.is_empty() {
        return column.kind.placeholder().to_string();
    }
    let known = match column.kind {
        ColumnType::Status => StatusOption::from_label(value).is_some(),
        ColumnType::Priority => PriorityOption::from_label(value).is_some(),
        ColumnType::Text | ColumnType::Person | ColumnType::Date => true,
    };
    if known {
        value.to_string()
    } else {
        format!("{value}?")
    }
}

fn fit(text: &str, column: &Column) -> String {
    let width = usize::try_from(column.width / PIXELS_PER_CHAR)
        .unwrap_or(MIN_CELL_CHARS)
        .max(MIN_CELL_CHARS);
    let mut clipped = text.chars().take(width).collect::<String>();
    let used = clipped.chars().count();
    clipped.extend(std::iter::repeat(' ').take(width - used));
    clipped
}
