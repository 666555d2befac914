//! CSV import/export for project tables.
//!
//! # Responsibility
//! - Encode a project's columns and rows as always-quoted CSV text.
//! - Decode CSV text into fresh text-typed columns and rows.
//! - Derive export file names and move CSV text to and from disk.
//!
//! # Invariants
//! - Encoding quotes every field, so decode(encode(p)) keeps every value
//!   by position as long as no value contains a raw newline.
//! - Decoding never infers column types.

pub mod codec;

pub use codec::{
    export_file_name, from_csv, from_csv_with_token, read_csv_file, split_csv_line, to_csv,
    write_csv_file, ParsedTable,
};
