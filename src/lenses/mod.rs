// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Catalogs of lens systems: OM10 lensed quasars and pre-generated lensed
//! supernovae. Both are read once and never mutated.

mod error;
mod om10;
mod sne;
#[cfg(test)]
mod tests;

pub use error::CatalogLoadError;
pub use om10::{read_om10_fits, LensCatalog, LensImage, LensSystem, OM10_MAX_IMAGES};
pub use sne::{read_sne_csv, SnCatalog, SnImage, SnSystem};

/// The light profile of a lens galaxy.
#[derive(Debug, Clone, PartialEq)]
pub struct LensProfile {
    pub redshift: f64,

    /// Effective (half-light) radius \[arcsec\]
    pub reff_arcsec: f64,

    pub ellipticity: f64,

    /// \[degrees\], measured in the opposite sense to catalog position
    /// angles.
    pub position_angle_deg: f64,

    pub sed_filename: String,

    pub mag_norm: f64,

    pub av: f64,

    pub rv: f64,
}

impl LensProfile {
    /// Semi-major and semi-minor axes \[radians\] of the lens galaxy's light,
    /// from its effective radius and ellipticity.
    pub fn axes(&self) -> (f64, f64) {
        let q = (1.0 - self.ellipticity).sqrt();
        let major = (self.reff_arcsec / q / 3600.0).to_radians();
        let minor = (self.reff_arcsec * q / 3600.0).to_radians();
        (major, minor)
    }

    /// The position angle \[radians\] in the catalog's convention.
    pub fn catalog_position_angle(&self) -> f64 {
        (-self.position_angle_deg).to_radians()
    }
}
