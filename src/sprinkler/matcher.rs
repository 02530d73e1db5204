// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Finding lens systems compatible with a host galaxy.

use crate::{
    constants::{MAG_NORM_TOLERANCE, REDSHIFT_TOLERANCE_DEX},
    lenses::{LensCatalog, LensSystem, SnCatalog, SnSystem},
};

fn redshift_matches(system_z: f64, host_z: f64) -> bool {
    (system_z.log10() - host_z.log10()).abs() <= REDSHIFT_TOLERANCE_DEX
}

/// Lensed quasars whose source redshift is within 0.1 dex of `redshift` and
/// whose matched magNorm is within 0.25 mag of `mag_norm`. The result is
/// sorted by `twinklesId`.
pub fn find_lens_candidates(catalog: &LensCatalog, redshift: f64, mag_norm: f64) -> Vec<&LensSystem> {
    let mut candidates: Vec<&LensSystem> = catalog
        .iter()
        .filter(|(system, matched)| {
            redshift_matches(system.source_redshift, redshift)
                && (matched - mag_norm).abs() <= MAG_NORM_TOLERANCE
        })
        .map(|(system, _)| system)
        .collect();
    candidates.sort_unstable_by_key(|s| s.twinkles_id);
    candidates
}

/// Lensed supernovae whose source redshift is within 0.1 dex of `redshift`,
/// sorted by `twinkles_sysno`. Supernova brightness has nothing to do with
/// its host's, so there is no magnitude cut.
pub fn find_sne_candidates(catalog: &SnCatalog, redshift: f64) -> Vec<&SnSystem> {
    let mut candidates: Vec<&SnSystem> = catalog
        .iter()
        .filter(|system| redshift_matches(system.source_redshift, redshift))
        .collect();
    candidates.sort_unstable_by_key(|s| s.sysno);
    candidates
}
