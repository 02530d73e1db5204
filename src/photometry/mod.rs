// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Spectral energy distributions, bandpasses and the magnitudes derived from
//! them.
//!
//! Wavelengths are in nm and flux densities (f_λ) in erg/cm^2/s/nm, the
//! conventions of PhoSim SED files. "magNorm" is PhoSim's normalisation: the
//! AB magnitude of an SED at 500 nm.

mod error;

pub use error::PhotometryError;

use std::{io::BufRead, path::Path};

use log::trace;

use crate::{
    constants::{AB_ZERO_POINT_JY, MAG_NORM_WAVELENGTH_NM, SPEED_OF_LIGHT},
    io::text::{open_text, write_two_columns},
};

/// Read a two-column text file (wavelength, value). Lines starting with '#'
/// and blank lines are ignored, as are any columns after the second.
fn read_two_columns(path: &Path) -> Result<(Vec<f64>, Vec<f64>), PhotometryError> {
    let mut buf = open_text(path)?;
    let mut line = String::new();
    let mut line_num: u32 = 0;
    let mut wavelengths = vec![];
    let mut values = vec![];

    let parse_float = |string: &str, line_num: u32| -> Result<f64, PhotometryError> {
        string.parse().map_err(|_| PhotometryError::ParseFloat {
            file: path.to_path_buf(),
            line_num,
            string: string.to_string(),
        })
    };

    while buf.read_line(&mut line)? > 0 {
        line_num += 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            line.clear();
            continue;
        }

        let mut items = trimmed.split_ascii_whitespace();
        match (items.next(), items.next()) {
            (Some(w), Some(v)) => {
                wavelengths.push(parse_float(w, line_num)?);
                values.push(parse_float(v, line_num)?);
            }
            _ => {
                return Err(PhotometryError::IncompleteLine {
                    file: path.to_path_buf(),
                    line_num,
                })
            }
        }
        line.clear();
    }
    trace!("Read {} samples from {}", wavelengths.len(), path.display());

    Ok((wavelengths, values))
}

fn check_samples(what: &'static str, wavelengths: &[f64], values: &[f64]) -> Result<(), PhotometryError> {
    if wavelengths.len() != values.len() {
        return Err(PhotometryError::LengthMismatch {
            what,
            num_wavelengths: wavelengths.len(),
            num_values: values.len(),
        });
    }
    if wavelengths.is_empty() {
        return Err(PhotometryError::Empty { what });
    }
    if let Some(w) = wavelengths.windows(2).find(|w| w[1] <= w[0]) {
        return Err(PhotometryError::Unsorted {
            what,
            wavelength: w[1],
        });
    }
    Ok(())
}

/// Linearly interpolate `ys` (sampled at increasing `xs`) at `x`. Outside the
/// sampled range the result is 0.
pub(crate) fn interp_or_zero(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    if xs.is_empty() || x < xs[0] || x > xs[xs.len() - 1] {
        return 0.0;
    }
    let i = xs.partition_point(|v| *v <= x);
    if i == 0 {
        return ys[0];
    }
    if i == xs.len() {
        return ys[xs.len() - 1];
    }
    let (x0, x1) = (xs[i - 1], xs[i]);
    let (y0, y1) = (ys[i - 1], ys[i]);
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

/// Convert f_λ \[erg/cm^2/s/nm\] at a wavelength \[nm\] to f_ν \[Jy\].
fn flambda_to_fnu_jy(flambda: f64, wavelen_nm: f64) -> f64 {
    // f_ν = f_λ λ^2 / c, with λ^2 in nm^2 and c in nm/s, then 1 Jy =
    // 1e-23 erg/cm^2/s/Hz.
    flambda * wavelen_nm * wavelen_nm * 1e-9 / SPEED_OF_LIGHT * 1e23
}

/// A spectral energy distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct Sed {
    /// \[nm\]
    wavelen: Vec<f64>,

    /// \[erg/cm^2/s/nm\]
    flambda: Vec<f64>,
}

impl Sed {
    pub fn new(wavelen: Vec<f64>, flambda: Vec<f64>) -> Result<Sed, PhotometryError> {
        check_samples("SED", &wavelen, &flambda)?;
        Ok(Sed { wavelen, flambda })
    }

    /// Read an SED file (wavelength \[nm\], f_λ), which may be gzipped.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Sed, PhotometryError> {
        let (wavelen, flambda) = read_two_columns(path.as_ref())?;
        Sed::new(wavelen, flambda)
    }

    /// Write the SED as a PhoSim SED file.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), PhotometryError> {
        write_two_columns(path, "Wavelength(nm)  F_lamA(ergs/cm^2/s/nm)", &self.wavelen, &self.flambda)?;
        Ok(())
    }

    pub fn wavelen(&self) -> &[f64] {
        &self.wavelen
    }

    pub fn flambda(&self) -> &[f64] {
        &self.flambda
    }

    /// Move a rest-frame SED to redshift `z`. Flux is conserved, so f_λ drops
    /// by a factor of (1 + z) as the wavelengths stretch.
    pub fn redshifted(&self, z: f64) -> Sed {
        let factor = 1.0 + z;
        Sed {
            wavelen: self.wavelen.iter().map(|w| w * factor).collect(),
            flambda: self.flambda.iter().map(|f| f / factor).collect(),
        }
    }

    /// Multiply the SED by a constant.
    pub fn scaled(&self, factor: f64) -> Sed {
        Sed {
            wavelen: self.wavelen.clone(),
            flambda: self.flambda.iter().map(|f| f * factor).collect(),
        }
    }

    /// f_λ at a wavelength \[nm\]; 0 outside the SED.
    pub fn flambda_at(&self, wavelen_nm: f64) -> f64 {
        interp_or_zero(&self.wavelen, &self.flambda, wavelen_nm)
    }

    /// PhoSim's magNorm: the AB magnitude of the SED at 500 nm.
    pub fn mag_norm(&self) -> Result<f64, PhotometryError> {
        let fnu = flambda_to_fnu_jy(self.flambda_at(MAG_NORM_WAVELENGTH_NM), MAG_NORM_WAVELENGTH_NM);
        if fnu.is_nan() || fnu <= 0.0 {
            return Err(PhotometryError::NonPositiveFlux {
                context: format!("at {MAG_NORM_WAVELENGTH_NM} nm"),
            });
        }
        Ok(-2.5 * (fnu / AB_ZERO_POINT_JY).log10())
    }

    /// The AB magnitude of the SED through a bandpass.
    pub fn ab_mag(&self, band: &Bandpass) -> Result<f64, PhotometryError> {
        // AB magnitudes weight the photon-counting integral by 1/λ.
        let integrand: Vec<f64> = band
            .wavelen
            .iter()
            .zip(band.sb.iter())
            .map(|(&w, &sb)| flambda_to_fnu_jy(self.flambda_at(w), w) * sb / w)
            .collect();
        let norm: Vec<f64> = band
            .wavelen
            .iter()
            .zip(band.sb.iter())
            .map(|(&w, &sb)| AB_ZERO_POINT_JY * sb / w)
            .collect();
        let flux = trapezoid(&band.wavelen, &integrand);
        let zero_point = trapezoid(&band.wavelen, &norm);
        if flux.is_nan() || flux <= 0.0 || zero_point <= 0.0 {
            return Err(PhotometryError::NonPositiveFlux {
                context: "through the bandpass".to_string(),
            });
        }
        Ok(-2.5 * (flux / zero_point).log10())
    }
}

/// The transmission of a filter (and everything else in the light path) as a
/// function of wavelength.
#[derive(Debug, Clone, PartialEq)]
pub struct Bandpass {
    /// \[nm\]
    wavelen: Vec<f64>,

    /// Dimensionless throughput.
    sb: Vec<f64>,
}

impl Bandpass {
    pub fn new(wavelen: Vec<f64>, sb: Vec<f64>) -> Result<Bandpass, PhotometryError> {
        check_samples("Bandpass", &wavelen, &sb)?;
        Ok(Bandpass { wavelen, sb })
    }

    /// Read a throughput file (wavelength \[nm\], throughput), which may be
    /// gzipped.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Bandpass, PhotometryError> {
        let (wavelen, sb) = read_two_columns(path.as_ref())?;
        Bandpass::new(wavelen, sb)
    }
}

fn trapezoid(xs: &[f64], ys: &[f64]) -> f64 {
    xs.windows(2)
        .zip(ys.windows(2))
        .map(|(x, y)| 0.5 * (x[1] - x[0]) * (y[0] + y[1]))
        .sum()
}

/// The magNorm an SED must have for its AB magnitude through `band` to be
/// `mag`. Magnitudes of a scaled SED all shift by the same amount, so this is
/// `mag` plus the SED's (magNorm - band magnitude) colour.
pub fn calc_mag_norm(sed: &Sed, band: &Bandpass, mag: f64) -> Result<f64, PhotometryError> {
    Ok(mag + sed.mag_norm()? - sed.ab_mag(band)?)
}
