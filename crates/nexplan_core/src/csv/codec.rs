//! Always-quoted CSV codec.
//!
//! The line splitter toggles an "inside quotes" flag on every `"` instead of
//! recognizing RFC 4180 escapes. Quote characters stay in the field buffer;
//! once a field ends it is trimmed, loses one leading and one trailing quote,
//! and has remaining `""` pairs collapsed to `"`. Files written by `to_csv`
//! decode field-for-field under these rules.

use crate::clock::now_epoch_ms;
use crate::model::ids::{batch_id, COLUMN_PREFIX, ROW_PREFIX};
use crate::model::project::{Column, Project, Row};
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io;
use std::path::Path;

static LINE_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r\n|\n").expect("valid line break regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Columns and rows produced by one decode call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTable {
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
}

impl ParsedTable {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Encodes the project's table as CSV.
///
/// First line holds column titles; each following line holds one row's
/// values in column order. Lines are joined by `\n` with no trailing newline.
pub fn to_csv(project: &Project) -> String {
    let header = project
        .columns
        .iter()
        .map(|column| quote_field(&column.title))
        .collect::<Vec<_>>()
        .join(",");

    let mut lines = Vec::with_capacity(project.rows.len() + 1);
    lines.push(header);
    for row in &project.rows {
        let line = project
            .columns
            .iter()
            .map(|column| quote_field(row.value(&column.id)))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(line);
    }

    lines.join("\n")
}

/// Decodes CSV text using the current time as the id token.
pub fn from_csv(text: &str) -> ParsedTable {
    from_csv_with_token(text, now_epoch_ms())
}

/// Decodes CSV text into text-typed columns and rows.
///
/// Column ids are `col-<token>-<index>` and row ids `row-<token>-<index>`,
/// so ids are unique within the call. Fields map to columns by position;
/// short lines are padded with empty values and extra fields are dropped.
pub fn from_csv_with_token(text: &str, token: i64) -> ParsedTable {
    let mut lines = LINE_BREAK_RE
        .split(text)
        .filter(|line| !line.trim().is_empty());

    let Some(header_line) = lines.next() else {
        debug!("event=csv_decode module=csv status=empty");
        return ParsedTable::default();
    };

    let columns = split_csv_line(header_line)
        .into_iter()
        .enumerate()
        .map(|(index, title)| {
            let title = if title.is_empty() {
                format!("Column {}", index + 1)
            } else {
                title
            };
            Column::text(batch_id(COLUMN_PREFIX, token, index), title)
        })
        .collect::<Vec<_>>();

    let rows = lines
        .enumerate()
        .map(|(index, line)| {
            let mut values = split_csv_line(line).into_iter();
            let mut row = Row::empty(batch_id(ROW_PREFIX, token, index));
            for column in &columns {
                row.set_value(column.id.clone(), values.next().unwrap_or_default());
            }
            row
        })
        .collect::<Vec<_>>();

    debug!(
        "event=csv_decode module=csv status=ok columns={} rows={}",
        columns.len(),
        rows.len()
    );
    ParsedTable { columns, rows }
}

/// Splits one CSV line into cleaned fields with the quote-toggle rules.
pub fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            ',' if !in_quotes => fields.push(clean_field(&std::mem::take(&mut current))),
            _ => current.push(ch),
        }
    }
    fields.push(clean_field(&current));

    fields
}

/// File name for an exported project: whitespace runs become `_`.
pub fn export_file_name(project_name: &str) -> String {
    format!("{}.csv", WHITESPACE_RE.replace_all(project_name, "_"))
}

/// Reads CSV text from a user-selected file.
pub fn read_csv_file(path: impl AsRef<Path>) -> io::Result<String> {
    std::fs::read_to_string(path)
}

/// Writes the project's CSV encoding to `path`.
pub fn write_csv_file(path: impl AsRef<Path>, project: &Project) -> io::Result<()> {
    let path = path.as_ref();
    std::fs::write(path, to_csv(project))?;
    info!(
        "event=csv_export module=csv status=ok columns={} rows={} path={}",
        project.columns.len(),
        project.rows.len(),
        path.display()
    );
    Ok(())
}

fn quote_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn clean_field(raw: &str) -> String {
    let trimmed = raw.trim();
    let unquoted = trimmed.strip_prefix('"').unwrap_or(trimmed);
    let unquoted = unquoted.strip_suffix('"').unwrap_or(unquoted);
    unquoted.replace("\"\"", "\"")
}

#[cfg(test)]
mod tests {
    use super::{clean_field, export_file_name, split_csv_line};

    #[test]
    fn splitter_keeps_commas_inside_quotes() {
        assert_eq!(
            split_csv_line(r#""a,b", c ,"d""#),
            vec!["a,b".to_string(), "c".to_string(), "d".to_string()]
        );
    }

    #[test]
    fn splitter_collapses_doubled_quotes() {
        assert_eq!(
            split_csv_line(r#""Say ""hi""","Done""#),
            vec![r#"Say "hi""#.to_string(), "Done".to_string()]
        );
    }

    #[test]
    fn clean_field_strips_one_quote_per_side() {
        assert_eq!(clean_field(r#"  "x"  "#), "x");
        assert_eq!(clean_field("\"\"\"\""), "\"");
        assert_eq!(clean_field("\""), "");
    }

    #[test]
    fn trailing_comma_yields_empty_last_field() {
        assert_eq!(split_csv_line("a,"), vec!["a".to_string(), String::new()]);
    }

    #[test]
    fn export_name_replaces_whitespace_runs() {
        assert_eq!(export_file_name("Q4 Product  Roadmap"), "Q4_Product_Roadmap.csv");
        assert_eq!(export_file_name("tabs\tand\nlines"), "tabs_and_lines.csv");
    }
}
