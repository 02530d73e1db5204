// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Damped-random-walk light curves with a resumable cache.
//!
//! A light curve is simulated on bins of `tau / 100` days from its start. The
//! walk in each band is driven by the same normal deviates, scaled by the
//! band's structure function:
//!
//! `dx[k] = dx[k - 1] * (1 - dt / tau) + sf * e[k] * sqrt(dt / tau)`
//!
//! The value at an epoch is interpolated between the last two bins. After
//! each evaluation the state of the second-last bin (including the random
//! number generator) is cached, so a later epoch continues the same walk
//! instead of starting again. A resumed walk is identical to a fresh one.

use std::collections::HashMap;

use log::{trace, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

use super::{AgnVariabilityParams, PerBandDelta, VarMethod, VarParamBlob, VariabilityError, NUM_BANDS};
use crate::constants::{DRW_STEPS_PER_TAU, MAX_VARIABILITY_CACHE_ENTRIES};

#[derive(Debug, Clone)]
struct DrwState {
    /// The epoch of the evaluation that left this state.
    epoch: f64,

    /// The bin this state describes.
    bin: u64,

    /// The generator after drawing the deviates of bins 1..=`bin`.
    rng: ChaCha8Rng,

    dx: [f64; NUM_BANDS],
}

/// Evaluates AGN variability, remembering where each light curve got to.
///
/// The cache is bounded: once it holds more than `max_entries` light curves,
/// it is cleared entirely (rather than evicting entries one by one) and light
/// curves start again from scratch.
/// Because a light curve doesn't depend on whether it was resumed, this only
/// costs time.
#[derive(Debug, Clone)]
pub struct VariabilityEngine {
    cache: HashMap<String, DrwState>,
    max_entries: usize,
}

impl Default for VariabilityEngine {
    fn default() -> Self {
        VariabilityEngine::new()
    }
}

impl VariabilityEngine {
    pub fn new() -> VariabilityEngine {
        VariabilityEngine::with_max_entries(MAX_VARIABILITY_CACHE_ENTRIES)
    }

    pub fn with_max_entries(max_entries: usize) -> VariabilityEngine {
        VariabilityEngine {
            cache: HashMap::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// The number of light curves in the cache.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Evaluate whichever method a `varParamStr` asks for.
    pub fn evaluate(&mut self, blob: &VarParamBlob, epoch: f64) -> Result<PerBandDelta, VariabilityError> {
        match blob.method {
            VarMethod::ApplyAgn => self.apply_agn(&blob.pars, epoch),
            VarMethod::ApplyAgnTimeDelay => {
                self.drw(&blob.pars, blob.pars.t0_delay.unwrap_or(0.0), epoch)
            }
        }
    }

    /// The magnitude offsets of an AGN whose light curve starts at `t0_mjd`.
    pub fn apply_agn(
        &mut self,
        params: &AgnVariabilityParams,
        epoch: f64,
    ) -> Result<PerBandDelta, VariabilityError> {
        self.drw(params, 0.0, epoch)
    }

    /// The magnitude offsets of many AGN images, each starting at
    /// `t0_mjd + t0Delay`. Any object whose light curve hasn't started at
    /// `epoch` is an error.
    pub fn apply_agn_time_delay(
        &mut self,
        params: &[AgnVariabilityParams],
        epoch: f64,
    ) -> Result<Vec<PerBandDelta>, VariabilityError> {
        params
            .iter()
            .map(|p| self.drw(p, p.t0_delay.unwrap_or(0.0), epoch))
            .collect()
    }

    fn drw(
        &mut self,
        params: &AgnVariabilityParams,
        delay: f64,
        epoch: f64,
    ) -> Result<PerBandDelta, VariabilityError> {
        let tau = params.agn_tau;
        if !tau.is_finite() || tau <= 0.0 {
            return Err(VariabilityError::InvalidTau { tau });
        }
        let start = params.t0_mjd + delay;
        let elapsed = epoch - start;
        if elapsed.is_nan() || elapsed < 0.0 {
            return Err(VariabilityError::EpochBeforeStart { epoch, start });
        }

        let dt = tau / DRW_STEPS_PER_TAU;
        let num_bins = (elapsed / dt).ceil() as u64;
        if num_bins == 0 {
            return Ok(PerBandDelta::default());
        }

        let key = cache_key(params, delay);
        let (mut bin, mut rng, mut dx) = match self.cache.get(&key) {
            Some(state) if state.epoch < epoch && state.bin < num_bins => {
                trace!("Resuming light curve {key} from bin {}", state.bin);
                (state.bin, state.rng.clone(), state.dx)
            }
            _ => (0, ChaCha8Rng::seed_from_u64(params.seed), [0.0; NUM_BANDS]),
        };

        let sf = params.structure_functions();
        let decay = 1.0 - dt / tau;
        let kick = (dt / tau).sqrt();
        let step = |rng: &mut ChaCha8Rng, dx: &mut [f64; NUM_BANDS]| {
            let e: f64 = rng.sample(StandardNormal);
            for (dx, sf) in dx.iter_mut().zip(sf) {
                *dx = *dx * decay + sf * e * kick;
            }
        };

        while bin < num_bins - 1 {
            step(&mut rng, &mut dx);
            bin += 1;
        }
        let before = dx;
        let state = DrwState {
            epoch,
            bin,
            rng: rng.clone(),
            dx,
        };
        step(&mut rng, &mut dx);

        if !self.cache.contains_key(&key) && self.cache.len() > self.max_entries {
            warn!(
                "AGN light curve cache has {} entries; clearing it",
                self.cache.len()
            );
            self.cache.clear();
        }
        self.cache.insert(key, state);

        let frac = (elapsed - (num_bins - 1) as f64 * dt) / dt;
        let mut out = [0.0; NUM_BANDS];
        for ((out, before), after) in out.iter_mut().zip(before).zip(dx) {
            *out = before + (after - before) * frac;
        }
        Ok(PerBandDelta(out))
    }
}

/// Light curves are identified by everything that shapes them.
fn cache_key(params: &AgnVariabilityParams, delay: f64) -> String {
    let [u, g, r, i, z, y] = params.structure_functions();
    format!(
        "{}_{u}_{g}_{r}_{i}_{z}_{y}_{}_{}_{delay}",
        params.seed, params.agn_tau, params.t0_mjd
    )
}
