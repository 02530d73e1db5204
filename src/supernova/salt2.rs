// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The SALT2 spectral time-series model of type Ia supernovae.
//!
//! The rest-frame flux of a supernova is
//! `x0 * (M0(p, λ) + x1 * M1(p, λ)) * 10^(-0.4 * CL(λ) * c)`,
//! where M0 and M1 are the template surfaces and CL is the colour law.

use std::{
    io::{BufRead, Read},
    path::{Path, PathBuf},
};

use log::{debug, trace};

use super::{SnParams, SnSpectrumModel, SupernovaError};
use crate::{
    constants::{SALT2_B_WAVELENGTH, SALT2_SCALE_FACTOR, SALT2_V_WAVELENGTH},
    io::text::open_text,
};

/// The SALT2 colour law: a polynomial in reduced wavelength between
/// `min_wavelen` and `max_wavelen`, extrapolated linearly outside that range.
#[derive(Debug, Clone, PartialEq)]
pub struct Salt2ColourLaw {
    /// Polynomial coefficients of l, l^2, l^3, ... where l is the reduced
    /// wavelength. The first is chosen so that the law is -1 at the V
    /// wavelength.
    poly: Vec<f64>,

    /// \[Å\]
    min_wavelen: f64,

    /// \[Å\]
    max_wavelen: f64,
}

impl Salt2ColourLaw {
    /// Make a colour law from the coefficients in a SALT2 colour correction
    /// file.
    pub fn new(coeffs: &[f64], min_wavelen: f64, max_wavelen: f64) -> Salt2ColourLaw {
        let alpha = 1.0 - coeffs.iter().sum::<f64>();
        let mut poly = Vec::with_capacity(coeffs.len() + 1);
        poly.push(alpha);
        poly.extend_from_slice(coeffs);
        Salt2ColourLaw {
            poly,
            min_wavelen,
            max_wavelen,
        }
    }

    /// Read a `salt2_color_correction.dat` file: the number of coefficients,
    /// the coefficients, then `Salt2ExtinctionLaw.<key> <value>` pairs.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Salt2ColourLaw, SupernovaError> {
        let path = path.as_ref();
        let err = |reason: String| SupernovaError::ColourLaw {
            file: path.to_path_buf(),
            reason,
        };

        let mut contents = String::new();
        open_text(path)?.read_to_string(&mut contents)?;
        let mut words = contents.split_ascii_whitespace();

        let num_coeffs: usize = words
            .next()
            .ok_or_else(|| err("The file is empty".to_string()))?
            .parse()
            .map_err(|_| err("The first word isn't the number of coefficients".to_string()))?;
        let coeffs = (0..num_coeffs)
            .map(|i| {
                words
                    .next()
                    .and_then(|w| w.parse::<f64>().ok())
                    .ok_or_else(|| err(format!("Couldn't read coefficient {}", i + 1)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut min_wavelen = 2800.0;
        let mut max_wavelen = 7000.0;
        while let Some(key) = words.next() {
            let value = words
                .next()
                .ok_or_else(|| err(format!("'{key}' has no value")))?;
            let parse = |v: &str| {
                v.parse::<f64>()
                    .map_err(|_| err(format!("Couldn't parse '{v}' for '{key}'")))
            };
            match key {
                "Salt2ExtinctionLaw.version" => {
                    if parse(value)? != 1.0 {
                        return Err(err(format!("Unsupported version {value}")));
                    }
                }
                "Salt2ExtinctionLaw.min_lambda" => min_wavelen = parse(value)?,
                "Salt2ExtinctionLaw.max_lambda" => max_wavelen = parse(value)?,
                _ => return Err(err(format!("Unknown key '{key}'"))),
            }
        }

        Ok(Salt2ColourLaw::new(&coeffs, min_wavelen, max_wavelen))
    }

    fn reduced(wavelen: f64) -> f64 {
        (wavelen - SALT2_B_WAVELENGTH) / (SALT2_V_WAVELENGTH - SALT2_B_WAVELENGTH)
    }

    fn poly(&self, l: f64) -> f64 {
        self.poly
            .iter()
            .rev()
            .fold(0.0, |acc, &a| (acc + a) * l)
    }

    fn poly_derivative(&self, l: f64) -> f64 {
        self.poly
            .iter()
            .enumerate()
            .rev()
            .fold(0.0, |acc, (k, &a)| acc * l + (k + 1) as f64 * a)
    }

    /// The colour law at a rest-frame wavelength \[Å\].
    pub fn evaluate(&self, wavelen: f64) -> f64 {
        let l = Self::reduced(wavelen);
        let l_lo = Self::reduced(self.min_wavelen);
        let l_hi = Self::reduced(self.max_wavelen);
        let p = if l < l_lo {
            self.poly(l_lo) + self.poly_derivative(l_lo) * (l - l_lo)
        } else if l > l_hi {
            self.poly(l_hi) + self.poly_derivative(l_hi) * (l - l_hi)
        } else {
            self.poly(l)
        };
        -p
    }
}

/// A SALT2 template surface on a regular phase-wavelength grid.
#[derive(Debug, Clone, PartialEq)]
struct Surface {
    /// \[days\]
    phases: Vec<f64>,

    /// \[Å\]
    wavelen: Vec<f64>,

    /// Phase-major.
    values: Vec<f64>,
}

impl Surface {
    fn read(path: &Path) -> Result<Surface, SupernovaError> {
        trace!("Reading SALT2 surface {}", path.display());
        let mut buf = open_text(path)?;
        let mut line = String::new();
        let mut line_num: u32 = 0;
        let mut phases: Vec<f64> = vec![];
        let mut wavelen: Vec<f64> = vec![];
        let mut values = vec![];
        let irregular = |reason: String| SupernovaError::IrregularGrid {
            file: path.to_path_buf(),
            reason,
        };

        while buf.read_line(&mut line)? > 0 {
            line_num += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                line.clear();
                continue;
            }

            let mut items = trimmed.split_ascii_whitespace();
            let (p, w, v) = match (items.next(), items.next(), items.next()) {
                (Some(p), Some(w), Some(v)) => (p, w, v),
                _ => {
                    return Err(SupernovaError::IncompleteLine {
                        file: path.to_path_buf(),
                        line_num,
                        line: trimmed.to_string(),
                    })
                }
            };
            let parse = |s: &str| {
                s.parse::<f64>().map_err(|_| SupernovaError::ParseFloat {
                    file: path.to_path_buf(),
                    line_num,
                    string: s.to_string(),
                })
            };
            let (p, w, v) = (parse(p)?, parse(w)?, parse(v)?);

            match phases.last().copied() {
                Some(last) if last == p => (),
                Some(last) if p < last => {
                    return Err(irregular(format!("phase {p} on line {line_num} isn't increasing")))
                }
                _ => phases.push(p),
            }
            // The first phase block defines the wavelength grid.
            if phases.len() == 1 {
                if let Some(&last) = wavelen.last() {
                    if w <= last {
                        return Err(irregular(format!(
                            "wavelength {w} on line {line_num} isn't increasing"
                        )));
                    }
                }
                wavelen.push(w);
            } else {
                let i = values.len() % wavelen.len();
                if wavelen[i] != w {
                    return Err(irregular(format!(
                        "expected wavelength {} on line {line_num}, got {w}",
                        wavelen[i]
                    )));
                }
            }
            values.push(v * SALT2_SCALE_FACTOR);
            line.clear();
        }

        if values.is_empty() || values.len() != phases.len() * wavelen.len() {
            return Err(irregular(format!(
                "{} values for {} phases and {} wavelengths",
                values.len(),
                phases.len(),
                wavelen.len()
            )));
        }
        Ok(Surface {
            phases,
            wavelen,
            values,
        })
    }

    /// Bilinear interpolation; 0 outside the grid.
    fn evaluate(&self, phase: f64, wavelen: f64) -> f64 {
        let (Some(&p_min), Some(&p_max)) = (self.phases.first(), self.phases.last()) else {
            return 0.0;
        };
        let (Some(&w_min), Some(&w_max)) = (self.wavelen.first(), self.wavelen.last()) else {
            return 0.0;
        };
        if phase < p_min || phase > p_max || wavelen < w_min || wavelen > w_max {
            return 0.0;
        }

        let bracket = |xs: &[f64], x: f64| -> (usize, f64) {
            if xs.len() == 1 {
                return (0, 0.0);
            }
            let i = xs.partition_point(|v| *v <= x).clamp(1, xs.len() - 1);
            let frac = (x - xs[i - 1]) / (xs[i] - xs[i - 1]);
            (i - 1, frac)
        };
        let (ip, fp) = bracket(&self.phases, phase);
        let (iw, fw) = bracket(&self.wavelen, wavelen);
        let nw = self.wavelen.len();
        let at = |ip: usize, iw: usize| {
            let ip = ip.min(self.phases.len() - 1);
            let iw = iw.min(nw - 1);
            self.values[ip * nw + iw]
        };

        let low = at(ip, iw) * (1.0 - fw) + at(ip, iw + 1) * fw;
        let high = at(ip + 1, iw) * (1.0 - fw) + at(ip + 1, iw + 1) * fw;
        low * (1.0 - fp) + high * fp
    }
}

/// The SALT2 model: two template surfaces and a colour law.
#[derive(Debug, Clone, PartialEq)]
pub struct Salt2Model {
    m0: Surface,
    m1: Surface,
    colour_law: Salt2ColourLaw,
}

impl Salt2Model {
    /// Read `salt2_template_0.dat`, `salt2_template_1.dat` and
    /// `salt2_color_correction.dat` from a model directory.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Salt2Model, SupernovaError> {
        let dir = dir.as_ref();
        debug!("Reading the SALT2 model in {}", dir.display());
        let m0_path: PathBuf = dir.join("salt2_template_0.dat");
        let m1_path: PathBuf = dir.join("salt2_template_1.dat");
        let m0 = Surface::read(&m0_path)?;
        let m1 = Surface::read(&m1_path)?;
        if m0.phases != m1.phases || m0.wavelen != m1.wavelen {
            return Err(SupernovaError::MismatchedTemplates {
                first: m0_path,
                second: m1_path,
            });
        }
        let colour_law = Salt2ColourLaw::read(dir.join("salt2_color_correction.dat"))?;

        Ok(Salt2Model { m0, m1, colour_law })
    }

    pub fn colour_law(&self) -> &Salt2ColourLaw {
        &self.colour_law
    }

    /// Rest-frame f_λ \[erg/s/cm^2/Å\] at a rest-frame phase \[days\] and
    /// wavelength \[Å\].
    pub fn rest_flux(&self, phase: f64, wavelen: f64, x0: f64, x1: f64, c: f64) -> f64 {
        let m0 = self.m0.evaluate(phase, wavelen);
        let m1 = self.m1.evaluate(phase, wavelen);
        x0 * (m0 + x1 * m1) * 10_f64.powf(-0.4 * self.colour_law.evaluate(wavelen) * c)
    }
}

impl SnSpectrumModel for Salt2Model {
    fn flux(&self, params: &SnParams, mjd: f64, wavelen_angstrom: &[f64]) -> Vec<f64> {
        let a = 1.0 / (1.0 + params.z);
        let phase = (mjd - params.t0) * a;
        wavelen_angstrom
            .iter()
            .map(|w| a * self.rest_flux(phase, w * a, params.x0, params.x1, params.c))
            .collect()
    }
}
