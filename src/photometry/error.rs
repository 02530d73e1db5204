// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PhotometryError {
    #[error("{file} line {line_num}: Expected two columns (wavelength and value)")]
    IncompleteLine { file: PathBuf, line_num: u32 },

    #[error("{file} line {line_num}: Error converting string {string} to a float")]
    ParseFloat {
        file: PathBuf,
        line_num: u32,
        string: String,
    },

    #[error("{what} has no samples")]
    Empty { what: &'static str },

    #[error("{what} has {num_wavelengths} wavelengths but {num_values} values")]
    LengthMismatch {
        what: &'static str,
        num_wavelengths: usize,
        num_values: usize,
    },

    #[error("{what} wavelengths must be strictly increasing (problem at {wavelength} nm)")]
    Unsorted { what: &'static str, wavelength: f64 },

    #[error("The SED's flux is not positive {context}, so no magnitude can be computed")]
    NonPositiveFlux { context: String },

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
