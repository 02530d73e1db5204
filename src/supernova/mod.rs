// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Supernova spectra for sprinkled images.
//!
//! Each image of a lensed supernova gets its own SED, evaluated at the visit
//! epoch, because the images are seen at different phases of the same
//! explosion.

mod error;
mod salt2;

pub use error::SupernovaError;
pub use salt2::{Salt2ColourLaw, Salt2Model};

use std::path::{Path, PathBuf};

use log::trace;
use marlu::RADec;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{DEFAULT_SN_SED_MAX_NM, DEFAULT_SN_SED_MIN_NM, DEFAULT_SN_SED_STEP_NM, MAG_NORM_WAVELENGTH_NM},
    io::text::gzip_and_remove,
    lenses::{SnImage, SnSystem},
    photometry::Sed,
};

/// The parameters of one supernova light curve, as stored in the
/// `sn_truth_params` column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnParams {
    pub z: f64,

    /// The MJD of peak brightness.
    pub t0: f64,

    pub x0: f64,
    pub x1: f64,
    pub c: f64,

    /// \[degrees\]
    pub ra: f64,

    /// \[degrees\]
    pub dec: f64,
}

impl SnParams {
    /// The parameters of one image of a lensed supernova system.
    pub fn for_image(system: &SnSystem, image: &SnImage, radec: RADec) -> SnParams {
        SnParams {
            z: system.source_redshift,
            t0: image.peak_mjd,
            x0: image.x0,
            x1: image.x1,
            c: image.c,
            ra: radec.ra.to_degrees(),
            dec: radec.dec.to_degrees(),
        }
    }
}

/// Something that can produce supernova spectra.
pub trait SnSpectrumModel {
    /// Observer-frame f_λ \[erg/s/cm^2/Å\] at observer-frame wavelengths \[Å\]
    /// on the given MJD.
    fn flux(&self, params: &SnParams, mjd: f64, wavelen_angstrom: &[f64]) -> Vec<f64>;
}

/// What became of one supernova image at one epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct SnSedResult {
    /// Is the supernova bright enough (i.e. emitting at 500 nm) to go into the
    /// catalog?
    pub included: bool,

    /// The unlensed magNorm of the SED. `None` if not included.
    pub mag_norm: Option<f64>,

    /// The SED file name to put in the catalog. `None` if not included.
    pub sed_filename: Option<String>,

    pub params: SnParams,
}

impl SnSedResult {
    /// The parameters as JSON, for the `sn_truth_params` column.
    pub fn params_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.params)
    }
}

/// Turns supernova images into PhoSim SEDs at a given epoch.
#[derive(Debug, Clone)]
pub struct SnSedSynthesizer<M> {
    model: M,

    /// \[nm\]
    wavelen: Vec<f64>,

    /// If set, SED files are written here.
    output_dir: Option<PathBuf>,

    /// Prepended (as a directory) to SED file names in the catalog.
    name_prefix: String,
}

impl<M: SnSpectrumModel> SnSedSynthesizer<M> {
    /// A synthesizer evaluating SEDs every nm from 250 to 1200 nm, which
    /// writes no files.
    pub fn new(model: M) -> SnSedSynthesizer<M> {
        let n = ((DEFAULT_SN_SED_MAX_NM - DEFAULT_SN_SED_MIN_NM) / DEFAULT_SN_SED_STEP_NM).round() as usize;
        SnSedSynthesizer {
            model,
            wavelen: (0..=n)
                .map(|i| DEFAULT_SN_SED_MIN_NM + i as f64 * DEFAULT_SN_SED_STEP_NM)
                .collect(),
            output_dir: None,
            name_prefix: String::new(),
        }
    }

    /// Write gzipped SED files into `dir`.
    pub fn writing_seds_to<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.output_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn with_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.name_prefix = prefix.into();
        self
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// The SED \[nm, erg/cm^2/s/nm\] of a supernova on an MJD.
    pub fn sed(&self, params: &SnParams, mjd: f64) -> Result<Sed, SupernovaError> {
        let angstrom: Vec<f64> = self.wavelen.iter().map(|w| w * 10.0).collect();
        let flambda = self
            .model
            .flux(params, mjd, &angstrom)
            .into_iter()
            // per Å to per nm
            .map(|f| f * 10.0)
            .collect();
        Ok(Sed::new(self.wavelen.clone(), flambda)?)
    }

    /// Make the SED of a supernova image at `mjd`. Images that aren't
    /// emitting at 500 nm are not included. If an output directory is set,
    /// the SED is written there as `<system>_<image>_<mjd>.txt.gz`.
    pub fn synthesize(
        &self,
        system: &SnSystem,
        image: &SnImage,
        radec: RADec,
        mjd: f64,
    ) -> Result<SnSedResult, SupernovaError> {
        let params = SnParams::for_image(system, image, radec);
        let sed = self.sed(&params, mjd)?;

        let flux_500 = sed.flambda_at(MAG_NORM_WAVELENGTH_NM);
        if flux_500.is_nan() || flux_500 <= 0.0 {
            trace!(
                "SN system {} image {} isn't on at MJD {mjd}",
                system.sysno,
                image.index
            );
            return Ok(SnSedResult {
                included: false,
                mag_norm: None,
                sed_filename: None,
                params,
            });
        }
        let mag_norm = sed.mag_norm()?;

        let name = sed_file_name(system.sysno, image.index, mjd);
        if let Some(dir) = &self.output_dir {
            let path = dir.join(&name);
            sed.write(&path)?;
            gzip_and_remove(&path)?;
        }
        let catalog_name = if self.name_prefix.is_empty() {
            format!("{name}.gz")
        } else {
            format!("{}/{name}.gz", self.name_prefix.trim_end_matches('/'))
        };

        Ok(SnSedResult {
            included: true,
            mag_norm: Some(mag_norm),
            sed_filename: Some(catalog_name),
            params,
        })
    }
}

/// The (uncompressed) SED file name of a supernova image. System, image and
/// epoch together make it unique.
pub fn sed_file_name(sysno: u32, image: u32, mjd: f64) -> String {
    format!("{sysno}_{image}_{mjd:.4}.txt")
}
