// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

use crate::photometry::PhotometryError;

#[derive(Error, Debug)]
pub enum SupernovaError {
    #[error("SALT2 file {file} line {line_num}: Expected 'phase wavelength value', got '{line}'")]
    IncompleteLine {
        file: PathBuf,
        line_num: u32,
        line: String,
    },

    #[error("SALT2 file {file} line {line_num}: Couldn't parse '{string}' as a float")]
    ParseFloat {
        file: PathBuf,
        line_num: u32,
        string: String,
    },

    #[error("SALT2 template {file} isn't a regular phase-wavelength grid: {reason}")]
    IrregularGrid { file: PathBuf, reason: String },

    #[error("SALT2 templates {first} and {second} aren't on the same grid")]
    MismatchedTemplates { first: PathBuf, second: PathBuf },

    #[error("SALT2 colour law {file}: {reason}")]
    ColourLaw { file: PathBuf, reason: String },

    #[error("Couldn't serialise the parameters of SN system {sysno} image {image}: {err}")]
    Params {
        sysno: u32,
        image: u32,
        err: serde_json::Error,
    },

    #[error(transparent)]
    Photometry(#[from] PhotometryError),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
