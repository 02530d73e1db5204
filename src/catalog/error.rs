// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

use super::Field;

/// Errors associated with catalog schemas and converting rows to and from
/// untyped values.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Defs file {file} line {line_num}: Expected '<column name>,<index>', got '{line}'")]
    IncompleteLine {
        file: PathBuf,
        line_num: u32,
        line: String,
    },

    #[error("Defs file {file} line {line_num}: Couldn't parse '{string}' as a column index")]
    ParseIndex {
        file: PathBuf,
        line_num: u32,
        string: String,
    },

    #[error("Column {field} appears more than once in the schema")]
    DuplicateField { field: Field },

    #[error("Columns {first} and {second} both claim column index {index}")]
    DuplicateIndex {
        index: usize,
        first: String,
        second: String,
    },

    #[error("The schema has no column for required field {0}")]
    MissingRequired(Field),

    #[error("Row {row}: expected {expected} values, but got {got}")]
    RowLength {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("Row {row}: column {field} should hold {expected}, but holds {got}")]
    WrongType {
        row: usize,
        field: Field,
        expected: &'static str,
        got: &'static str,
    },

    #[error("ID {id} doesn't fit in a signed 64-bit galtileid column")]
    IdTooLarge { id: u64 },

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
