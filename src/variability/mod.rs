// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! AGN variability: magnitude offsets per LSST band at an epoch.

mod engine;
mod error;
mod params;

pub use engine::VariabilityEngine;
pub use error::VariabilityError;
pub use params::{AgnVariabilityParams, VarMethod, VarParamBlob};

use std::ops::Index;

use crate::catalog::SourceRow;

pub const NUM_BANDS: usize = 6;

/// The LSST bands.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum_macros::Display,
    strum_macros::EnumIter,
    strum_macros::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum Band {
    U,
    G,
    R,
    I,
    Z,
    Y,
}

/// Magnitude offsets in u, g, r, i, z, y order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PerBandDelta(pub [f64; NUM_BANDS]);

impl Index<Band> for PerBandDelta {
    type Output = f64;

    fn index(&self, band: Band) -> &f64 {
        &self.0[band as usize]
    }
}

/// Something that can say how much brighter or fainter a source is at an
/// epoch.
pub trait VariabilityModel {
    fn delta_magnitudes(
        &self,
        engine: &mut VariabilityEngine,
        epoch: f64,
    ) -> Result<PerBandDelta, VariabilityError>;
}

/// An AGN varying from `t0_mjd` onwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Agn(pub AgnVariabilityParams);

/// A lensed image of an AGN, whose light curve is that of the source delayed
/// by `t0Delay` days.
#[derive(Debug, Clone, PartialEq)]
pub struct AgnTimeDelay(pub AgnVariabilityParams);

impl VariabilityModel for Agn {
    fn delta_magnitudes(
        &self,
        engine: &mut VariabilityEngine,
        epoch: f64,
    ) -> Result<PerBandDelta, VariabilityError> {
        engine.apply_agn(&self.0, epoch)
    }
}

impl VariabilityModel for AgnTimeDelay {
    fn delta_magnitudes(
        &self,
        engine: &mut VariabilityEngine,
        epoch: f64,
    ) -> Result<PerBandDelta, VariabilityError> {
        engine
            .apply_agn_time_delay(std::slice::from_ref(&self.0), epoch)
            .map(|mut v| v.pop().unwrap_or_default())
    }
}

impl VarParamBlob {
    /// The model this blob describes.
    pub fn model(&self) -> Box<dyn VariabilityModel> {
        match self.method {
            VarMethod::ApplyAgn => Box::new(Agn(self.pars.clone())),
            VarMethod::ApplyAgnTimeDelay => Box::new(AgnTimeDelay(self.pars.clone())),
        }
    }
}

impl SourceRow {
    /// The variability model of this row's AGN, if it has one.
    pub fn variability_model(&self) -> Result<Option<Box<dyn VariabilityModel>>, VariabilityError> {
        match &self.agn_var_params {
            Some(s) => Ok(Some(VarParamBlob::from_json(s)?.model())),
            None => Ok(None),
        }
    }
}
