// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

use super::CONFIG_FILE_TYPES_COMMA_SEPARATED;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file {0} doesn't have a recognised file extension! Valid extensions are: {}", *CONFIG_FILE_TYPES_COMMA_SEPARATED)]
    UnknownFileType(PathBuf),

    #[error("Couldn't decode {file_type} structure from {file}:\n{err}")]
    Decode {
        file: PathBuf,
        file_type: String,
        err: String,
    },

    #[error("{name} must be between 0 and 1, but is {density}")]
    Density { name: &'static str, density: f64 },

    #[error("Supernova SEDs are to be written, but sed_output_dir wasn't given")]
    NoSedOutputDir,

    #[error("{0} is empty")]
    EmptyPath(&'static str),

    #[error(transparent)]
    Schema(#[from] crate::catalog::SchemaError),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
