// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The catalog of pre-generated lensed supernovae.
//!
//! The catalog is a CSV file with a header line and one line per image.
//! Lines sharing a `twinkles_sysno` are the images of one system.

use std::{collections::HashMap, io::BufRead, path::Path};

use indexmap::IndexMap;
use log::{debug, trace};
use vec1::Vec1;

use super::{CatalogLoadError, LensProfile};
use crate::io::text::open_text;

/// One image of a lensed supernova.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnImage {
    /// The image number within its system; this is what gets packed into
    /// sprinkled IDs.
    pub index: u32,

    /// Offset from the lens galaxy towards increasing RA \[arcsec\]
    pub x: f64,

    /// Offset from the lens galaxy towards increasing Dec \[arcsec\]
    pub y: f64,

    pub magnification: f64,

    /// Time delay of this image \[days\]
    pub delay: f64,

    /// The MJD at which this image peaks, i.e. the system's t0 plus this
    /// image's delay.
    pub peak_mjd: f64,

    /// SALT2 amplitude.
    pub x0: f64,

    /// SALT2 stretch.
    pub x1: f64,

    /// SALT2 colour.
    pub c: f64,
}

/// A lensed-supernova system.
#[derive(Debug, Clone, PartialEq)]
pub struct SnSystem {
    pub sysno: u32,

    pub source_redshift: f64,

    /// Sorted by image number.
    pub images: Vec1<SnImage>,

    pub lens: LensProfile,
}

/// Every lensed-supernova system, indexed by `twinkles_sysno`.
#[derive(Debug, Clone, Default)]
pub struct SnCatalog {
    systems: Vec<SnSystem>,
    by_sysno: HashMap<u32, usize>,
}

impl SnCatalog {
    /// Read the supernova catalog CSV (which may be gzipped).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<SnCatalog, CatalogLoadError> {
        let systems = read_sne_csv(path.as_ref())?;
        SnCatalog::from_systems(systems)
    }

    pub fn from_systems(systems: Vec<SnSystem>) -> Result<SnCatalog, CatalogLoadError> {
        let mut by_sysno = HashMap::with_capacity(systems.len());
        for (i, s) in systems.iter().enumerate() {
            if by_sysno.insert(s.sysno, i).is_some() {
                return Err(CatalogLoadError::DuplicateSystem(s.sysno));
            }
        }
        debug!("SN catalog has {} systems", systems.len());
        Ok(SnCatalog { systems, by_sysno })
    }

    /// Look a system up by its `twinkles_sysno`.
    pub fn get(&self, sysno: u32) -> Option<&SnSystem> {
        self.by_sysno.get(&sysno).map(|&i| &self.systems[i])
    }

    pub fn iter(&self) -> std::slice::Iter<SnSystem> {
        self.systems.iter()
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}

/// The columns of the SN catalog. The last two are optional.
const COLUMNS: [&str; 19] = [
    "twinkles_sysno",
    "imno",
    "zs",
    "zl",
    "x",
    "y",
    "t0",
    "td",
    "mu",
    "x0",
    "x1",
    "c",
    "lens_reff",
    "lens_e",
    "lens_phie",
    "lens_sed",
    "lens_magnorm",
    "lens_av",
    "lens_rv",
];
const NUM_REQUIRED_COLUMNS: usize = 17;

/// Read the systems in an SN catalog CSV, in order of first appearance.
pub fn read_sne_csv(file: &Path) -> Result<Vec<SnSystem>, CatalogLoadError> {
    debug!("Reading SN catalog {}", file.display());
    let mut buf = open_text(file)?;
    let mut line = String::new();
    let mut line_num: u32 = 0;

    // Column positions, in the order of `COLUMNS`.
    let mut positions: Option<Vec<Option<usize>>> = None;
    let mut num_header_cols = 0;
    let mut grouped: IndexMap<u32, (Vec<SnImage>, f64, LensProfile)> = IndexMap::new();

    while buf.read_line(&mut line)? > 0 {
        line_num += 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            line.clear();
            continue;
        }
        let items: Vec<&str> = trimmed.split(',').map(|s| s.trim().trim_matches('"')).collect();

        let pos = match &positions {
            Some(p) => p,
            None => {
                let mut p = Vec::with_capacity(COLUMNS.len());
                for (i, &col) in COLUMNS.iter().enumerate() {
                    let found = items.iter().position(|&h| h == col);
                    if found.is_none() && i < NUM_REQUIRED_COLUMNS {
                        return Err(CatalogLoadError::MissingCsvColumn {
                            file: file.to_path_buf(),
                            col,
                        });
                    }
                    p.push(found);
                }
                num_header_cols = items.len();
                positions = Some(p);
                line.clear();
                continue;
            }
        };

        if items.len() != num_header_cols {
            return Err(CatalogLoadError::CsvRowLength {
                file: file.to_path_buf(),
                line_num,
                expected: num_header_cols,
                got: items.len(),
            });
        }

        let get = |col: usize| pos[col].map(|i| items[i]);
        let parse_f64 = |col: usize| -> Result<Option<f64>, CatalogLoadError> {
            get(col)
                .map(|s| {
                    s.parse::<f64>().map_err(|_| CatalogLoadError::CsvParse {
                        file: file.to_path_buf(),
                        line_num,
                        col: COLUMNS[col],
                        string: s.to_string(),
                    })
                })
                .transpose()
        };
        let parse_u32 = |col: usize| -> Result<u32, CatalogLoadError> {
            // Pandas likes to write integers as floats.
            let s = get(col).unwrap_or_default();
            s.parse::<u32>()
                .ok()
                .or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u32::MAX as f64)
                        .map(|f| f as u32)
                })
                .ok_or_else(|| CatalogLoadError::CsvParse {
                    file: file.to_path_buf(),
                    line_num,
                    col: COLUMNS[col],
                    string: s.to_string(),
                })
        };
        // Required columns are always present.
        let required = |col: usize| -> Result<f64, CatalogLoadError> { Ok(parse_f64(col)?.unwrap_or(f64::NAN)) };

        let sysno = parse_u32(0)?;
        let imno = parse_u32(1)?;
        let t0 = required(6)?;
        let td = required(7)?;
        let image = SnImage {
            index: imno,
            x: required(4)?,
            y: required(5)?,
            magnification: required(8)?,
            delay: td,
            peak_mjd: t0 + td,
            x0: required(9)?,
            x1: required(10)?,
            c: required(11)?,
        };

        let entry = grouped.entry(sysno).or_insert_with(|| {
            (
                vec![],
                f64::NAN,
                LensProfile {
                    redshift: f64::NAN,
                    reff_arcsec: f64::NAN,
                    ellipticity: f64::NAN,
                    position_angle_deg: f64::NAN,
                    sed_filename: String::new(),
                    mag_norm: f64::NAN,
                    av: 0.0,
                    rv: 3.1,
                },
            )
        });
        if entry.0.iter().any(|i| i.index == imno) {
            return Err(CatalogLoadError::DuplicateImage {
                file: file.to_path_buf(),
                sysno,
                imno,
            });
        }
        entry.0.push(image);
        // Lens and source properties are repeated on every image's line; the
        // last one wins.
        entry.1 = required(2)?;
        entry.2 = LensProfile {
            redshift: required(3)?,
            reff_arcsec: required(12)?,
            ellipticity: required(13)?,
            position_angle_deg: required(14)?,
            sed_filename: get(15).unwrap_or_default().to_string(),
            mag_norm: required(16)?,
            av: parse_f64(17)?.unwrap_or(0.0),
            rv: parse_f64(18)?.unwrap_or(3.1),
        };

        line.clear();
    }

    if grouped.is_empty() {
        return Err(CatalogLoadError::EmptyCsv {
            file: file.to_path_buf(),
        });
    }

    let systems = grouped
        .into_iter()
        .filter_map(|(sysno, (mut images, source_redshift, lens))| {
            images.sort_unstable_by_key(|i| i.index);
            trace!("SN system {sysno} has {} images", images.len());
            // Every group was created with at least one image.
            Vec1::try_from_vec(images).ok().map(|images| SnSystem {
                sysno,
                source_redshift,
                images,
                lens,
            })
        })
        .collect();
    Ok(systems)
}
