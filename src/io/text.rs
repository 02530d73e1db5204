// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Reading and writing plain-text files, any of which may be gzipped.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use log::trace;

fn is_gzipped(path: &Path) -> bool {
    path.extension()
        .and_then(|os_str| os_str.to_str())
        .map(|s| s.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
}

/// Open a text file for line-by-line reading. Files ending in ".gz" are
/// decompressed on the fly.
pub(crate) fn open_text<P: AsRef<Path>>(path: P) -> std::io::Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let f = File::open(path)?;
    if is_gzipped(path) {
        trace!("Reading {} as gzip", path.display());
        Ok(Box::new(BufReader::new(GzDecoder::new(f))))
    } else {
        Ok(Box::new(BufReader::new(f)))
    }
}

/// Compress `path` into `path` + ".gz", then remove the uncompressed file.
/// The path of the compressed file is returned.
pub(crate) fn gzip_and_remove<P: AsRef<Path>>(path: P) -> std::io::Result<PathBuf> {
    let path = path.as_ref();
    let mut gz_path = path.as_os_str().to_owned();
    gz_path.push(".gz");
    let gz_path = PathBuf::from(gz_path);

    {
        let mut input = BufReader::new(File::open(path)?);
        let mut encoder = GzEncoder::new(BufWriter::new(File::create(&gz_path)?), Compression::default());
        std::io::copy(&mut input, &mut encoder)?;
        encoder.finish()?.flush()?;
    }
    std::fs::remove_file(path)?;

    Ok(gz_path)
}

/// Write two columns of numbers to a text file.
pub(crate) fn write_two_columns<P: AsRef<Path>>(
    path: P,
    header: &str,
    col1: &[f64],
    col2: &[f64],
) -> std::io::Result<()> {
    let mut f = BufWriter::new(File::create(path)?);
    writeln!(f, "# {header}")?;
    for (a, b) in col1.iter().zip(col2.iter()) {
        writeln!(f, "{a:.4} {b:e}")?;
    }
    f.flush()
}
