// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

use crate::{io::FitsError, photometry::PhotometryError};

/// Errors associated with loading the lens or lensed-supernova catalogs. Any
/// of these means the run is misconfigured.
#[derive(Error, Debug)]
pub enum CatalogLoadError {
    #[error("Lens catalog {file}: system {row} claims {num_images} images, but only 2-{max} are allowed")]
    InvalidImageCount {
        file: PathBuf,
        row: usize,
        num_images: i64,
        max: usize,
    },

    #[error("Lens catalog {file}: row {row} has a twinklesId ({id}) that isn't a valid system number")]
    InvalidTwinklesId { file: PathBuf, row: usize, id: i64 },

    #[error("System number {0} appears more than once")]
    DuplicateSystem(u32),

    #[error("Got {num_systems} lens systems but {num_mags} matched magnitudes")]
    MatchedMagCount { num_systems: usize, num_mags: usize },

    #[error("Couldn't compute the matched magnitude of lens system {twinkles_id}: {err}")]
    MatchedMag {
        twinkles_id: u32,
        err: PhotometryError,
    },

    #[error("SN catalog {file}: the header is missing column '{col}'")]
    MissingCsvColumn { file: PathBuf, col: &'static str },

    #[error("SN catalog {file} line {line_num}: expected {expected} values, but found {got}")]
    CsvRowLength {
        file: PathBuf,
        line_num: u32,
        expected: usize,
        got: usize,
    },

    #[error("SN catalog {file} line {line_num}: Couldn't parse '{string}' for column '{col}'")]
    CsvParse {
        file: PathBuf,
        line_num: u32,
        col: &'static str,
        string: String,
    },

    #[error("SN catalog {file}: system {sysno} has image {imno} more than once")]
    DuplicateImage { file: PathBuf, sysno: u32, imno: u32 },

    #[error("SN catalog {file} is empty")]
    EmptyCsv { file: PathBuf },

    #[error(transparent)]
    Fits(#[from] FitsError),

    #[error(transparent)]
    Photometry(#[from] PhotometryError),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
