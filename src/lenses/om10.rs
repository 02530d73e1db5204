// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The OM10 catalog of lensed quasars, as prepared for Twinkles (i.e. with a
//! `twinklesId` column and a lens-galaxy SED).

use std::{collections::HashMap, path::Path};

use log::{debug, trace};
use vec1::Vec1;

use super::{CatalogLoadError, LensProfile};
use crate::{
    io::fits::{fits_get_col, fits_get_table_info, fits_get_vector_col_f64, fits_open, fits_open_hdu},
    photometry::{calc_mag_norm, Bandpass, Sed},
};

/// OM10 tabulates at most this many images per system.
pub const OM10_MAX_IMAGES: usize = 4;

/// One image of a lensed quasar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LensImage {
    /// Offset from the lens galaxy towards increasing RA \[arcsec\]
    pub x: f64,

    /// Offset from the lens galaxy towards increasing Dec \[arcsec\]
    pub y: f64,

    /// Signed magnification; negative for saddle-point images.
    pub magnification: f64,

    /// Time delay relative to the first image \[days\]
    pub delay: f64,
}

/// A lensed-quasar system.
#[derive(Debug, Clone, PartialEq)]
pub struct LensSystem {
    /// Identifies the system in the Twinkles lens catalog; this is what gets
    /// packed into sprinkled IDs.
    pub twinkles_id: u32,

    /// The original OM10 identifier.
    pub lens_id: i64,

    pub source_redshift: f64,

    /// The unlensed i-band magnitude of the quasar.
    pub source_mag_i: f64,

    pub images: Vec1<LensImage>,

    pub lens: LensProfile,
}

/// Every lens system, indexed by `twinklesId`, with the magnitude each
/// system's quasar is matched against.
#[derive(Debug, Clone)]
pub struct LensCatalog {
    systems: Vec<LensSystem>,

    /// The magNorm of an AGN template SED moved to each system's source
    /// redshift and normalised to the system's unlensed i-band magnitude.
    matched_mag_norms: Vec<f64>,

    by_twinkles_id: HashMap<u32, usize>,
}

impl LensCatalog {
    /// Read an OM10 FITS catalog and compute matched magnitudes with the
    /// given AGN template (rest frame) and reference band.
    pub fn load<P: AsRef<Path>>(
        path: P,
        agn_template: &Sed,
        band: &Bandpass,
    ) -> Result<LensCatalog, CatalogLoadError> {
        let systems = read_om10_fits(path.as_ref())?;
        LensCatalog::with_template(systems, agn_template, band)
    }

    /// Compute each system's matched magnitude from an AGN template.
    pub fn with_template(
        systems: Vec<LensSystem>,
        agn_template: &Sed,
        band: &Bandpass,
    ) -> Result<LensCatalog, CatalogLoadError> {
        let matched_mag_norms = systems
            .iter()
            .map(|s| {
                let sed = agn_template.redshifted(s.source_redshift);
                calc_mag_norm(&sed, band, s.source_mag_i).map_err(|err| CatalogLoadError::MatchedMag {
                    twinkles_id: s.twinkles_id,
                    err,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        LensCatalog::with_mag_norms(systems, matched_mag_norms)
    }

    /// Use matched magnitudes that have already been computed.
    pub fn with_mag_norms(
        systems: Vec<LensSystem>,
        matched_mag_norms: Vec<f64>,
    ) -> Result<LensCatalog, CatalogLoadError> {
        if systems.len() != matched_mag_norms.len() {
            return Err(CatalogLoadError::MatchedMagCount {
                num_systems: systems.len(),
                num_mags: matched_mag_norms.len(),
            });
        }
        let mut by_twinkles_id = HashMap::with_capacity(systems.len());
        for (i, s) in systems.iter().enumerate() {
            if by_twinkles_id.insert(s.twinkles_id, i).is_some() {
                return Err(CatalogLoadError::DuplicateSystem(s.twinkles_id));
            }
        }
        debug!("Lens catalog has {} systems", systems.len());

        Ok(LensCatalog {
            systems,
            matched_mag_norms,
            by_twinkles_id,
        })
    }

    /// Look a system up by its `twinklesId`.
    pub fn get(&self, twinkles_id: u32) -> Option<&LensSystem> {
        self.by_twinkles_id.get(&twinkles_id).map(|&i| &self.systems[i])
    }

    /// Iterate over systems and their matched magnitudes.
    pub fn iter(&self) -> impl Iterator<Item = (&LensSystem, f64)> {
        self.systems.iter().zip(self.matched_mag_norms.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}

/// Read the systems of an OM10 catalog. The table is expected in the first
/// extension.
pub fn read_om10_fits(file: &Path) -> Result<Vec<LensSystem>, CatalogLoadError> {
    debug!("Reading OM10 lens catalog {}", file.display());
    let mut fptr = fits_open(file)?;
    let hdu = fits_open_hdu(&mut fptr, 1)?;
    let (columns, num_rows) = fits_get_table_info(&fptr, &hdu)?;
    let has_col = |name: &str| columns.iter().any(|c| c.name == name);

    let twinkles_ids: Vec<i64> = fits_get_col(&mut fptr, &hdu, "twinklesId")?;
    let lens_ids: Vec<i64> = if has_col("LENSID") {
        fits_get_col(&mut fptr, &hdu, "LENSID")?
    } else {
        vec![-1; num_rows]
    };
    let num_images: Vec<i64> = fits_get_col(&mut fptr, &hdu, "NIMG")?;
    let z_lens: Vec<f64> = fits_get_col(&mut fptr, &hdu, "ZLENS")?;
    let z_src: Vec<f64> = fits_get_col(&mut fptr, &hdu, "ZSRC")?;
    let mag_i_in: Vec<f64> = fits_get_col(&mut fptr, &hdu, "MAGI_IN")?;
    let reffs: Vec<f64> = fits_get_col(&mut fptr, &hdu, "REFF")?;
    let ellips: Vec<f64> = fits_get_col(&mut fptr, &hdu, "ELLIP")?;
    let phies: Vec<f64> = fits_get_col(&mut fptr, &hdu, "PHIE")?;
    let lens_seds: Vec<String> = fits_get_col(&mut fptr, &hdu, "lens_sed")?;
    // Only the first element of this is the magNorm of the lens galaxy SED.
    let (lens_mag_norms, lens_mag_norm_stride) = fits_get_vector_col_f64(&mut fptr, &hdu, "sed_magNorm")?;
    let lens_avs: Vec<f64> = if has_col("lens_av") {
        fits_get_col(&mut fptr, &hdu, "lens_av")?
    } else {
        vec![0.0; num_rows]
    };
    let lens_rvs: Vec<f64> = if has_col("lens_rv") {
        fits_get_col(&mut fptr, &hdu, "lens_rv")?
    } else {
        vec![3.1; num_rows]
    };

    let (ximgs, x_stride) = fits_get_vector_col_f64(&mut fptr, &hdu, "XIMG")?;
    let (yimgs, y_stride) = fits_get_vector_col_f64(&mut fptr, &hdu, "YIMG")?;
    let (mags, mag_stride) = fits_get_vector_col_f64(&mut fptr, &hdu, "MAG")?;
    let (delays, delay_stride) = fits_get_vector_col_f64(&mut fptr, &hdu, "DELAY")?;
    let max_images = [x_stride, y_stride, mag_stride, delay_stride]
        .into_iter()
        .min()
        .unwrap_or(0)
        .min(OM10_MAX_IMAGES);

    let mut systems = Vec::with_capacity(num_rows);
    for row in 0..num_rows {
        let n = num_images[row];
        if n < 2 || n as usize > max_images {
            return Err(CatalogLoadError::InvalidImageCount {
                file: file.to_path_buf(),
                row,
                num_images: n,
                max: max_images,
            });
        }
        let twinkles_id = u32::try_from(twinkles_ids[row]).map_err(|_| CatalogLoadError::InvalidTwinklesId {
            file: file.to_path_buf(),
            row,
            id: twinkles_ids[row],
        })?;

        let images = (0..n as usize)
            .map(|i| LensImage {
                x: ximgs[row * x_stride + i],
                y: yimgs[row * y_stride + i],
                magnification: mags[row * mag_stride + i],
                delay: delays[row * delay_stride + i],
            })
            .collect::<Vec<_>>();
        let images = Vec1::try_from_vec(images).map_err(|_| CatalogLoadError::InvalidImageCount {
            file: file.to_path_buf(),
            row,
            num_images: n,
            max: max_images,
        })?;

        trace!("Lens system {twinkles_id} has {n} images");
        systems.push(LensSystem {
            twinkles_id,
            lens_id: lens_ids[row],
            source_redshift: z_src[row],
            source_mag_i: mag_i_in[row],
            images,
            lens: LensProfile {
                redshift: z_lens[row],
                reff_arcsec: reffs[row],
                ellipticity: ellips[row],
                position_angle_deg: phies[row],
                sed_filename: lens_seds[row].trim().to_string(),
                mag_norm: lens_mag_norms[row * lens_mag_norm_stride],
                av: lens_avs[row],
                rv: lens_rvs[row],
            },
        });
    }

    Ok(systems)
}
