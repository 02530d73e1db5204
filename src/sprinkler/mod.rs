// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The sprinkler: replace some galaxies of a catalog with strongly-lensed AGN
//! and supernova systems.
//!
//! A galaxy whose AGN is usable may host a lensed quasar; any other galaxy
//! with a redshift may host a lensed supernova. A chosen host becomes the lens
//! galaxy of its system and one row per image is appended to the catalog.

mod error;
mod expand;
mod id;
mod matcher;
mod selection;

pub use error::SprinklerError;
pub use id::{IdEncodingError, IdScheme};
pub use matcher::{find_lens_candidates, find_sne_candidates};
pub use selection::{SelectionCache, SelectionCacheError, SelectionMode};

pub(crate) use expand::lensing_delta_mag;

use std::collections::HashSet;

use log::{debug, info, trace};

use crate::{
    catalog::{Catalog, HostKind, SourceRow, SprinkleRole},
    config::SprinklerConfig,
    lenses::{LensCatalog, LensSystem, SnCatalog, SnSystem},
    photometry::{Bandpass, Sed},
    supernova::{Salt2Model, SnSedSynthesizer, SnSpectrumModel},
    TwinklesError,
};
use expand::{agn_images, make_lens_galaxy, sn_images};
use selection::{host_rng, live_pick};

/// What a sprinkling pass did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SprinkleSummary {
    pub rows_in: usize,
    pub rows_out: usize,

    /// (tile ID, twinklesId) of every galaxy that now hosts a lensed AGN.
    pub agn_selections: Vec<(u64, u32)>,

    /// (tile ID, sysno) of every galaxy that now hosts a lensed supernova.
    pub sn_selections: Vec<(u64, u32)>,

    pub agn_images: usize,
    pub sn_images: usize,

    /// Supernova images left out because they weren't on at the epoch.
    pub sn_images_omitted: usize,
}

impl SprinkleSummary {
    /// The selections of this pass, for replaying later.
    pub fn selection_cache(&self) -> SelectionCache {
        SelectionCache::from_selections(&self.agn_selections, &self.sn_selections)
    }
}

/// Sprinkles lens systems into catalogs.
///
/// The lens catalogs and selection mode are fixed at construction; one
/// sprinkler can be used on many catalogs.
#[derive(Debug)]
pub struct Sprinkler<M = Salt2Model> {
    lenses: LensCatalog,
    sne: SnCatalog,
    mode: SelectionMode,

    /// If `None`, detected from each catalog's schema.
    id_scheme: Option<IdScheme>,

    synthesizer: SnSedSynthesizer<M>,
}

impl Sprinkler<Salt2Model> {
    /// Load everything a config file points at.
    pub fn from_config(config: &SprinklerConfig) -> Result<Sprinkler<Salt2Model>, TwinklesError> {
        config.validate()?;

        let template = Sed::read(&config.agn_template_sed)?;
        let band = Bandpass::read(&config.reference_bandpass)?;
        let lenses = LensCatalog::load(&config.lens_catalog, &template, &band)?;
        let sne = SnCatalog::load(&config.sne_catalog)?;

        let mode = match &config.cache {
            Some(files) => SelectionMode::Cached(SelectionCache::read(&files.agn_cache, &files.sne_cache)?),
            None => SelectionMode::Live {
                density: config.density_param,
                sne_density: config.sne_density_param,
            },
        };

        let mut synthesizer = SnSedSynthesizer::new(Salt2Model::load(&config.salt2_model_dir)?)
            .with_name_prefix(config.sed_name_prefix.clone());
        if config.write_sn_seds {
            if let Some(dir) = &config.sed_output_dir {
                synthesizer = synthesizer.writing_seds_to(dir);
            }
        }

        let mut sprinkler = Sprinkler::new(lenses, sne, mode, synthesizer);
        if let Some(scheme) = config.id_scheme {
            sprinkler = sprinkler.with_id_scheme(scheme);
        }
        Ok(sprinkler)
    }
}

impl<M: SnSpectrumModel> Sprinkler<M> {
    pub fn new(
        lenses: LensCatalog,
        sne: SnCatalog,
        mode: SelectionMode,
        synthesizer: SnSedSynthesizer<M>,
    ) -> Sprinkler<M> {
        Sprinkler {
            lenses,
            sne,
            mode,
            id_scheme: None,
            synthesizer,
        }
    }

    /// Use this ID scheme regardless of the catalog's schema.
    pub fn with_id_scheme(mut self, id_scheme: IdScheme) -> Self {
        self.id_scheme = Some(id_scheme);
        self
    }

    pub fn lenses(&self) -> &LensCatalog {
        &self.lenses
    }

    pub fn sne(&self) -> &SnCatalog {
        &self.sne
    }

    pub fn mode(&self) -> &SelectionMode {
        &self.mode
    }

    /// Sprinkle one visit's catalog, observed at `mjd`. Host rows are turned
    /// into lens galaxies in place and image rows are appended; no row is
    /// removed. Rows that have already been sprinkled are left alone.
    pub fn sprinkle(&self, catalog: &mut Catalog, mjd: f64) -> Result<SprinkleSummary, SprinklerError> {
        let id_scheme = self
            .id_scheme
            .unwrap_or_else(|| catalog.schema().detect_id_scheme());
        let flag_sprinkled = catalog.schema().has_sprinkled_flags();
        debug!(
            "Sprinkling {} rows at MJD {mjd} ({id_scheme} IDs, sprinkled flags: {flag_sprinkled})",
            catalog.len()
        );

        let mut summary = SprinkleSummary {
            rows_in: catalog.len(),
            ..Default::default()
        };
        let mut new_rows = vec![];
        // A supernova system can only be hosted once per pass.
        let mut used_sne: HashSet<u32> = HashSet::new();

        for i_row in 0..summary.rows_in {
            let row = &catalog[i_row];
            if row.role != SprinkleRole::Unsprinkled {
                continue;
            }

            match row.host_kind() {
                Some(HostKind::Agn) => {
                    let Some(system) = self.select_agn(row)? else {
                        continue;
                    };
                    let images = agn_images(row, system, id_scheme, flag_sprinkled)?;
                    trace!(
                        "Galaxy {} hosts lensed AGN {} ({} images)",
                        row.galtileid,
                        system.twinkles_id,
                        images.len()
                    );
                    summary.agn_selections.push((row.galtileid, system.twinkles_id));
                    summary.agn_images += images.len();
                    new_rows.extend(images);
                    make_lens_galaxy(
                        &mut catalog[i_row],
                        HostKind::Agn,
                        system.twinkles_id,
                        &system.lens,
                        flag_sprinkled,
                    );
                }

                Some(HostKind::Sn) => {
                    let Some(system) = self.select_sn(row, &used_sne)? else {
                        continue;
                    };
                    let (images, omitted) =
                        sn_images(row, system, &self.synthesizer, mjd, id_scheme, flag_sprinkled)?;
                    trace!(
                        "Galaxy {} hosts lensed SN {} ({} images on, {omitted} off)",
                        row.galtileid,
                        system.sysno,
                        images.len()
                    );
                    used_sne.insert(system.sysno);
                    summary.sn_selections.push((row.galtileid, system.sysno));
                    summary.sn_images += images.len();
                    summary.sn_images_omitted += omitted;
                    new_rows.extend(images);
                    make_lens_galaxy(
                        &mut catalog[i_row],
                        HostKind::Sn,
                        system.sysno,
                        &system.lens,
                        flag_sprinkled,
                    );
                }

                None => trace!("Galaxy {} has no usable redshift; not a host", row.galtileid),
            }
        }

        catalog.extend(new_rows);
        summary.rows_out = catalog.len();
        info!(
            "Sprinkled {} lensed AGN ({} images) and {} lensed SNe ({} images, {} not on); {} rows in, {} out",
            summary.agn_selections.len(),
            summary.agn_images,
            summary.sn_selections.len(),
            summary.sn_images,
            summary.sn_images_omitted,
            summary.rows_in,
            summary.rows_out
        );

        Ok(summary)
    }

    fn select_agn(&self, row: &SourceRow) -> Result<Option<&LensSystem>, SprinklerError> {
        match &self.mode {
            SelectionMode::Live { density, .. } => {
                // host_kind() has established that the AGN has a magNorm.
                let Some(mag_norm) = row.agn.mag_norm else {
                    return Ok(None);
                };
                let candidates = find_lens_candidates(&self.lenses, row.agn.redshift, mag_norm);
                if candidates.is_empty() {
                    trace!("No lens systems match AGN host {}", row.galtileid);
                }
                Ok(live_pick(&mut host_rng(row.galtileid), *density, &candidates))
            }

            SelectionMode::Cached(cache) => match cache.system(HostKind::Agn, row.galtileid) {
                Some(system_id) => self.lenses.get(system_id).map(Some).ok_or(SprinklerError::UnknownSystem {
                    host: HostKind::Agn,
                    tile_id: row.galtileid,
                    system_id,
                }),
                None => Ok(None),
            },
        }
    }

    fn select_sn(&self, row: &SourceRow, used: &HashSet<u32>) -> Result<Option<&SnSystem>, SprinklerError> {
        match &self.mode {
            SelectionMode::Live { sne_density, .. } => {
                let Some(z) = row.galaxy_redshift() else {
                    return Ok(None);
                };
                let candidates: Vec<&SnSystem> = find_sne_candidates(&self.sne, z)
                    .into_iter()
                    .filter(|s| !used.contains(&s.sysno))
                    .collect();
                Ok(live_pick(&mut host_rng(row.galtileid), *sne_density, &candidates))
            }

            // Replays are verbatim; the recorded run already used each system
            // once.
            SelectionMode::Cached(cache) => match cache.system(HostKind::Sn, row.galtileid) {
                Some(system_id) => self.sne.get(system_id).map(Some).ok_or(SprinklerError::UnknownSystem {
                    host: HostKind::Sn,
                    tile_id: row.galtileid,
                    system_id,
                }),
                None => Ok(None),
            },
        }
    }
}
