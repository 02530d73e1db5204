// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision. Magnitudes, positions and times
are all carried as `f64` from reading to writing.
 */

/// The additive offset applied to a host galaxy's tile ID before packing a
/// sprinkled image's system and image numbers into it. This keeps sprinkled
/// IDs clear of ordinary catalog IDs.
pub const SPRINKLED_ID_OFFSET: u64 = 15_000_000_000;

/// The number of bits PhoSim unique IDs are shifted by to make room for the
/// object-type tag.
pub const PHOSIM_ID_SHIFT: u32 = 10;

/// The largest sprinkled image ID. Shifted by [`PHOSIM_ID_SHIFT`], it still
/// fits in a signed 64-bit catalog column.
pub const MAX_SPRINKLED_ID: u64 = (i64::MAX as u64) >> PHOSIM_ID_SHIFT;

/// The magNorm given to a component that must not emit anything, but cannot
/// be null because the instance-catalog writer doesn't handle nulls.
pub const SENTINEL_MAG_NORM: f64 = 999.0;

/// Candidates' source redshifts must be within this many dex of a host's
/// redshift.
pub const REDSHIFT_TOLERANCE_DEX: f64 = 0.1;

/// AGN candidates' matched magnitudes must be within this many magnitudes of
/// a host's AGN magNorm.
pub const MAG_NORM_TOLERANCE: f64 = 0.25;

/// The DRW step is the damping timescale divided by this.
pub const DRW_STEPS_PER_TAU: f64 = 100.0;

/// When the variability cache holds more than this many light curves, it is
/// emptied.
pub const MAX_VARIABILITY_CACHE_ENTRIES: usize = 1_000_000;

/// The wavelength at which PhoSim defines magNorm \[nm\].
pub const MAG_NORM_WAVELENGTH_NM: f64 = 500.0;

/// The AB magnitude system's zero point \[Jy\].
pub const AB_ZERO_POINT_JY: f64 = 3631.0;

/// Speed of light \[m/s\].
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Multiply SALT2 template surfaces by this to get erg/s/cm^2/Å.
pub const SALT2_SCALE_FACTOR: f64 = 1e-12;

/// SALT2 colour-law reference wavelengths \[Å\].
pub const SALT2_B_WAVELENGTH: f64 = 4302.57;
pub const SALT2_V_WAVELENGTH: f64 = 5428.55;

/// Default wavelengths over which supernova SEDs are written \[nm\].
pub const DEFAULT_SN_SED_MIN_NM: f64 = 250.0;
pub const DEFAULT_SN_SED_MAX_NM: f64 = 1200.0;
pub const DEFAULT_SN_SED_STEP_NM: f64 = 1.0;
