// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Helper functions for reading FITS binary tables.

mod error;

pub use error::FitsError;

use std::{fmt::Display, path::Path};

use fitsio::{hdu::*, FitsFile};

/// Open a fits file.
#[track_caller]
pub(crate) fn fits_open<P: AsRef<Path>>(file: P) -> Result<FitsFile, FitsError> {
    FitsFile::open(file.as_ref()).map_err(|e| {
        let caller = std::panic::Location::caller();
        FitsError::Open {
            fits_error: Box::new(e),
            fits_filename: file.as_ref().to_path_buf().into_boxed_path(),
            source_file: caller.file(),
            source_line: caller.line(),
            source_column: caller.column(),
        }
    })
}

/// Open a fits file's HDU.
#[track_caller]
pub(crate) fn fits_open_hdu<T: DescribesHdu + Display + Copy>(
    fits_fptr: &mut FitsFile,
    hdu_description: T,
) -> Result<FitsHdu, FitsError> {
    fits_fptr.hdu(hdu_description).map_err(|e| {
        let caller = std::panic::Location::caller();
        FitsError::Fitsio {
            fits_error: Box::new(e),
            fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
            hdu_description: format!("{hdu_description}").into_boxed_str(),
            source_file: caller.file(),
            source_line: caller.line(),
            source_column: caller.column(),
        }
    })
}

/// A table column's name and the number of elements it holds per row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TableColumn {
    pub(crate) name: String,
    pub(crate) repeat: usize,
}

/// Get the columns and number of rows of a table HDU.
#[track_caller]
pub(crate) fn fits_get_table_info(
    fits_fptr: &FitsFile,
    hdu: &FitsHdu,
) -> Result<(Vec<TableColumn>, usize), FitsError> {
    match &hdu.info {
        HduInfo::TableInfo {
            column_descriptions,
            num_rows,
        } => Ok((
            column_descriptions
                .iter()
                .map(|cd| TableColumn {
                    name: cd.name.clone(),
                    repeat: cd.data_type.repeat,
                })
                .collect(),
            *num_rows,
        )),
        _ => {
            let caller = std::panic::Location::caller();
            Err(FitsError::NotTable {
                fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
                hdu_num: hdu.number + 1,
                source_file: caller.file(),
                source_line: caller.line(),
                source_column: caller.column(),
            })
        }
    }
}

/// Get a scalar column from a fits file's HDU.
#[track_caller]
pub(crate) fn fits_get_col<T: fitsio::tables::ReadsCol>(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
    col_name: &str,
) -> Result<Vec<T>, FitsError> {
    hdu.read_col(fits_fptr, col_name).map_err(|e| {
        let caller = std::panic::Location::caller();
        FitsError::Fitsio {
            fits_error: Box::new(e),
            fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
            hdu_description: format!("{}", hdu.number + 1).into_boxed_str(),
            source_file: caller.file(),
            source_line: caller.line(),
            source_column: caller.column(),
        }
    })
}

/// Get a vector-valued double column (e.g. a `4D` column) from a fits file's
/// HDU. The values of each row are contiguous in the returned buffer, so row
/// `i` occupies `[i * repeat, (i + 1) * repeat)`. The `fitsio` crate only
/// reads the first element of each row, so this calls cfitsio directly.
#[track_caller]
pub(crate) fn fits_get_vector_col_f64(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
    col_name: &str,
) -> Result<(Vec<f64>, usize), FitsError> {
    let caller = std::panic::Location::caller();
    let (columns, num_rows) = fits_get_table_info(fits_fptr, hdu)?;
    let (col_index, column) = columns
        .iter()
        .enumerate()
        .find(|(_, c)| c.name == col_name)
        .ok_or_else(|| FitsError::MissingColumn {
            col_name: col_name.to_string().into_boxed_str(),
            fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
            hdu_num: hdu.number + 1,
            source_file: caller.file(),
            source_line: caller.line(),
            source_column: caller.column(),
        })?;
    let repeat = column.repeat.max(1);

    // Make sure cfitsio is pointing at the right HDU.
    fits_open_hdu(fits_fptr, hdu.number)?;

    let mut buffer = vec![0.0; num_rows * repeat];
    if buffer.is_empty() {
        return Ok((buffer, repeat));
    }
    let mut status = 0;
    let mut any_null = 0;
    unsafe {
        // ffgcvd = fits_read_col_dbl
        fitsio_sys::ffgcvd(
            fits_fptr.as_raw(),
            (col_index + 1) as _,
            1,
            1,
            buffer.len() as _,
            f64::NAN,
            buffer.as_mut_ptr(),
            &mut any_null,
            &mut status,
        );
    }
    fitsio::errors::check_status(status).map_err(|e| FitsError::Fitsio {
        fits_error: Box::new(e),
        fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
        hdu_description: format!("{}", hdu.number + 1).into_boxed_str(),
        source_file: caller.file(),
        source_line: caller.line(),
        source_column: caller.column(),
    })?;

    Ok((buffer, repeat))
}
