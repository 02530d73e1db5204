// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Sprinkle strongly-lensed AGN and supernovae into PhoSim instance catalogs.

Given a catalog of ordinary galaxies for one visit, a subset of AGN- or
SN-hosting galaxies is replaced by a lens galaxy plus the multiple images of
a lensed source drawn from the OM10 lens catalog or a lensed-supernova
catalog. Sprinkled images carry identifiers that encode the host galaxy,
system and image, so that the output catalog can be validated against its
inputs.
 */

pub mod catalog;
pub mod config;
pub mod constants;
mod error;
pub(crate) mod io;
pub mod lenses;
pub mod photometry;
pub mod sprinkler;
pub mod supernova;
#[cfg(test)]
mod tests;
pub mod validate;
pub mod variability;

// Re-exports.
pub use catalog::{Catalog, Component, ComponentKind, HostKind, Schema, SourceRow, SprinkleRole};
pub use config::SprinklerConfig;
pub use error::TwinklesError;
pub use io::FitsError;
pub use lenses::{LensCatalog, LensSystem, SnCatalog, SnSystem};
pub use sprinkler::{IdScheme, SelectionCache, SelectionMode, SprinkleSummary, Sprinkler};
pub use validate::{ValidationIssue, Validator};
pub use variability::{VariabilityEngine, VariabilityModel};
