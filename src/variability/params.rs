// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The JSON variability description of an AGN (its `varParamStr`).

use serde::{Deserialize, Serialize};

use super::{VariabilityError, NUM_BANDS};

/// Which variability method a `varParamStr` asks for.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
pub enum VarMethod {
    /// A damped random walk starting at `t0_mjd`.
    #[serde(rename = "applyAgn")]
    #[strum(serialize = "applyAgn")]
    ApplyAgn,

    /// A damped random walk starting at `t0_mjd + t0Delay`.
    #[serde(rename = "applyAgnTimeDelay")]
    #[strum(serialize = "applyAgnTimeDelay")]
    ApplyAgnTimeDelay,
}

/// The damped-random-walk parameters of an AGN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgnVariabilityParams {
    pub seed: u64,

    /// Damping timescale \[days\]
    pub agn_tau: f64,

    /// Structure function in each band \[mag\]
    pub agn_sfu: f64,
    pub agn_sfg: f64,
    pub agn_sfr: f64,
    pub agn_sfi: f64,
    pub agn_sfz: f64,
    pub agn_sfy: f64,

    /// When the light curve starts.
    pub t0_mjd: f64,

    /// Added to `t0_mjd` by lensed images \[days\]
    #[serde(rename = "t0Delay", default, skip_serializing_if = "Option::is_none")]
    pub t0_delay: Option<f64>,

    /// Anything else in the blob is kept as is.
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

impl AgnVariabilityParams {
    /// Structure functions in u, g, r, i, z, y order.
    pub fn structure_functions(&self) -> [f64; NUM_BANDS] {
        [
            self.agn_sfu,
            self.agn_sfg,
            self.agn_sfr,
            self.agn_sfi,
            self.agn_sfz,
            self.agn_sfy,
        ]
    }
}

/// A whole `varParamStr`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarParamBlob {
    #[serde(rename = "varMethodName", alias = "m")]
    pub method: VarMethod,

    #[serde(rename = "pars", alias = "p")]
    pub pars: AgnVariabilityParams,
}

impl VarParamBlob {
    pub fn from_json(s: &str) -> Result<VarParamBlob, VariabilityError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json(&self) -> Result<String, VariabilityError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Make the blob describe an image seen `delay` days later than the
    /// source.
    pub fn with_time_delay(mut self, delay: f64) -> VarParamBlob {
        self.method = VarMethod::ApplyAgnTimeDelay;
        self.pars.t0_delay = Some(delay);
        self
    }
}
