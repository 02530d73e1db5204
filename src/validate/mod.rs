// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Checking a sprinkled catalog against the lens catalogs it was made from.
//!
//! Everything is worked out from the output rows themselves: image IDs are
//! decoded to find their host galaxies and systems, so a catalog that has been
//! written out and read back in can be validated just the same. All problems
//! are collected rather than stopping at the first.

mod issue;

pub use issue::ValidationIssue;

use std::collections::{BTreeMap, HashMap};

use log::debug;

use crate::{
    catalog::{HostKind, SourceRow, SprinkleRole},
    constants::SENTINEL_MAG_NORM,
    lenses::{LensCatalog, LensProfile, SnCatalog},
    sprinkler::{lensing_delta_mag, IdScheme},
    variability::VarParamBlob,
};

/// Position differences \[radians\] allowed by default.
pub const DEFAULT_POSITION_TOLERANCE: f64 = 1e-9;

/// Magnitude differences allowed by default.
pub const DEFAULT_MAGNITUDE_TOLERANCE: f64 = 1e-6;

/// Time delay and redshift differences allowed.
const VALUE_TOLERANCE: f64 = 1e-9;

/// An image row, with what its ID says about it.
struct DecodedImage<'a> {
    row: &'a SourceRow,
    system_id: u32,
    image_index: u32,
    host: HostKind,
}

/// Validates sprinkled catalogs.
#[derive(Debug, Clone)]
pub struct Validator<'a> {
    lenses: &'a LensCatalog,
    sne: &'a SnCatalog,
    id_scheme: IdScheme,
    position_tolerance: f64,
    magnitude_tolerance: f64,
}

impl<'a> Validator<'a> {
    pub fn new(lenses: &'a LensCatalog, sne: &'a SnCatalog, id_scheme: IdScheme) -> Validator<'a> {
        Validator {
            lenses,
            sne,
            id_scheme,
            position_tolerance: DEFAULT_POSITION_TOLERANCE,
            magnitude_tolerance: DEFAULT_MAGNITUDE_TOLERANCE,
        }
    }

    pub fn with_tolerances(mut self, position: f64, magnitude: f64) -> Self {
        self.position_tolerance = position;
        self.magnitude_tolerance = magnitude;
        self
    }

    /// Check an output catalog. If the input catalog is given, lensed AGN
    /// magnitudes are checked against their hosts' and rows are counted;
    /// otherwise the images of each system are only checked for
    /// consistency with each other.
    pub fn validate(&self, output: &[SourceRow], input: Option<&[SourceRow]>) -> Vec<ValidationIssue> {
        let mut issues = vec![];

        let mut counts: HashMap<u64, usize> = HashMap::new();
        let mut rows_by_id: HashMap<u64, &SourceRow> = HashMap::with_capacity(output.len());
        for row in output {
            *counts.entry(row.galtileid).or_insert(0) += 1;
            rows_by_id.entry(row.galtileid).or_insert(row);
        }
        let mut duplicates: Vec<(u64, usize)> = counts.into_iter().filter(|(_, c)| *c > 1).collect();
        duplicates.sort_unstable();
        issues.extend(
            duplicates
                .into_iter()
                .map(|(id, count)| ValidationIssue::DuplicateId { id, count }),
        );

        // Images grouped by host galaxy.
        let mut hosted: BTreeMap<u64, Vec<DecodedImage>> = BTreeMap::new();
        for row in output {
            if let Some((tile_id, system_id, image_index)) = self.id_scheme.decode(row.galtileid) {
                hosted.entry(tile_id).or_default().push(DecodedImage {
                    row,
                    system_id,
                    image_index,
                    host: image_host_kind(row),
                });
            }
        }
        let num_images: usize = hosted.values().map(|v| v.len()).sum();
        debug!(
            "Validating {} rows; {num_images} images of {} systems",
            output.len(),
            hosted.len()
        );

        let input_by_id: Option<HashMap<u64, &SourceRow>> =
            input.map(|rows| rows.iter().map(|r| (r.galtileid, r)).collect());

        for (&tile_id, images) in &hosted {
            let first = &images[0];
            if images.iter().any(|i| i.host != first.host) {
                issues.push(ValidationIssue::BothHosts { tile_id });
                continue;
            }
            if let Some(other) = images.iter().find(|i| i.system_id != first.system_id) {
                issues.push(ValidationIssue::MultipleSystems {
                    tile_id,
                    host: first.host,
                    first: first.system_id,
                    second: other.system_id,
                });
                continue;
            }
            let Some(lens_row) = rows_by_id.get(&tile_id) else {
                issues.push(ValidationIssue::MissingLensGalaxy {
                    id: first.row.galtileid,
                    tile_id,
                });
                continue;
            };
            let input_host = input_by_id.as_ref().and_then(|m| m.get(&tile_id));

            match first.host {
                HostKind::Agn => self.check_agn_system(tile_id, images, lens_row, input_host, &mut issues),
                HostKind::Sn => self.check_sn_system(tile_id, images, lens_row, &mut issues),
            }
        }

        if let Some(input) = input {
            for row in input {
                if !rows_by_id.contains_key(&row.galtileid) {
                    issues.push(ValidationIssue::MissingInputRow { id: row.galtileid });
                }
            }
            let expected = input.len() + num_images;
            if output.len() != expected {
                issues.push(ValidationIssue::RowCount {
                    expected,
                    got: output.len(),
                });
            }
        }

        debug!("Found {} problems", issues.len());
        issues
    }

    fn check_agn_system(
        &self,
        tile_id: u64,
        images: &[DecodedImage],
        lens_row: &SourceRow,
        input_host: Option<&&SourceRow>,
        issues: &mut Vec<ValidationIssue>,
    ) {
        let system_id = images[0].system_id;
        let Some(system) = self.lenses.get(system_id) else {
            issues.push(ValidationIssue::UnknownSystem {
                id: images[0].row.galtileid,
                host: HostKind::Agn,
                system_id,
            });
            return;
        };
        check_lens_galaxy(tile_id, lens_row, &system.lens, issues);
        if images.len() != system.images.len() {
            issues.push(ValidationIssue::ImageCount {
                tile_id,
                host: HostKind::Agn,
                system_id,
                expected: system.images.len(),
                got: images.len(),
            });
        }

        // The unlensed magnitude every image should agree on.
        let mut reference: Option<f64> = input_host.and_then(|h| h.agn.mag_norm);
        for image in images {
            let id = image.row.galtileid;
            let Some(lensed) = system.images.get(image.image_index as usize) else {
                issues.push(ValidationIssue::UnknownImage {
                    id,
                    host: HostKind::Agn,
                    system_id,
                    image_index: image.image_index,
                });
                continue;
            };
            self.check_position(image.row, lens_row, lensed.x, lensed.y, issues);
            check_redshift(image.row, system.source_redshift, issues);

            let delay = image
                .row
                .agn_var_params
                .as_deref()
                .and_then(|s| VarParamBlob::from_json(s).ok())
                .and_then(|b| b.pars.t0_delay);
            if delay.map(|d| (d - lensed.delay).abs() > VALUE_TOLERANCE).unwrap_or(true) {
                issues.push(ValidationIssue::TimeDelay {
                    id,
                    expected: lensed.delay,
                    got: delay,
                });
            }

            let delta = lensing_delta_mag(lensed.magnification);
            let got = image.row.agn.mag_norm;
            match (reference, got) {
                (Some(unlensed), Some(mag)) if (mag - (unlensed - delta)).abs() <= self.magnitude_tolerance => (),
                (Some(unlensed), _) => issues.push(ValidationIssue::Magnitude {
                    id,
                    expected: unlensed - delta,
                    got,
                }),
                // Without the input catalog, the first image sets the
                // standard.
                (None, Some(mag)) => reference = Some(mag + delta),
                (None, None) => (),
            }
        }
    }

    fn check_sn_system(
        &self,
        tile_id: u64,
        images: &[DecodedImage],
        lens_row: &SourceRow,
        issues: &mut Vec<ValidationIssue>,
    ) {
        let system_id = images[0].system_id;
        let Some(system) = self.sne.get(system_id) else {
            issues.push(ValidationIssue::UnknownSystem {
                id: images[0].row.galtileid,
                host: HostKind::Sn,
                system_id,
            });
            return;
        };
        check_lens_galaxy(tile_id, lens_row, &system.lens, issues);
        // Supernova images that aren't on are left out.
        if images.len() > system.images.len() {
            issues.push(ValidationIssue::ImageCount {
                tile_id,
                host: HostKind::Sn,
                system_id,
                expected: system.images.len(),
                got: images.len(),
            });
        }

        for image in images {
            let Some(lensed) = system.images.iter().find(|i| i.index == image.image_index) else {
                issues.push(ValidationIssue::UnknownImage {
                    id: image.row.galtileid,
                    host: HostKind::Sn,
                    system_id,
                    image_index: image.image_index,
                });
                continue;
            };
            self.check_position(image.row, lens_row, lensed.x, lensed.y, issues);
            check_redshift(image.row, system.source_redshift, issues);
        }
    }

    /// An image's point source should sit at the lens galaxy's position plus
    /// the catalogued offset \[arcsec\].
    fn check_position(
        &self,
        image: &SourceRow,
        lens_row: &SourceRow,
        dx: f64,
        dy: f64,
        issues: &mut Vec<ValidationIssue>,
    ) {
        let lens_pos = lens_row.bulge.radec;
        let expected_ra = (dx / 3600.0).to_radians() / lens_pos.dec.cos();
        let expected_dec = (dy / 3600.0).to_radians();
        for (coord, expected, got) in [
            ("RA", expected_ra, image.agn.radec.ra - lens_pos.ra),
            ("Dec", expected_dec, image.agn.radec.dec - lens_pos.dec),
        ] {
            if (expected - got).abs() > self.position_tolerance {
                issues.push(ValidationIssue::Position {
                    id: image.galtileid,
                    coord,
                    expected,
                    got,
                });
            }
        }
    }
}

/// Which kind of system an image belongs to. Only lensed AGN images carry
/// variability; only supernova images carry supernova parameters.
fn image_host_kind(row: &SourceRow) -> HostKind {
    if let SprinkleRole::LensedImage { host, .. } = row.role {
        return host;
    }
    if row.sn_truth_params.is_some() {
        HostKind::Sn
    } else if row.agn_var_params.is_some() {
        HostKind::Agn
    } else {
        HostKind::Sn
    }
}

fn check_redshift(image: &SourceRow, expected: f64, issues: &mut Vec<ValidationIssue>) {
    if (image.agn.redshift - expected).abs() > VALUE_TOLERANCE {
        issues.push(ValidationIssue::Redshift {
            id: image.galtileid,
            what: "image",
            expected,
            got: image.agn.redshift,
        });
    }
}

fn check_lens_galaxy(
    tile_id: u64,
    lens_row: &SourceRow,
    lens: &LensProfile,
    issues: &mut Vec<ValidationIssue>,
) {
    let close = |a: Option<f64>, b: f64| a.map(|a| (a - b).abs() <= VALUE_TOLERANCE).unwrap_or(false);
    if !close(lens_row.bulge.mag_norm, lens.mag_norm) {
        issues.push(ValidationIssue::LensProfile {
            tile_id,
            field: "bulge magNorm",
            expected: lens.mag_norm,
            got: lens_row.bulge.mag_norm,
        });
    }
    if !close(lens_row.disk.mag_norm, SENTINEL_MAG_NORM) {
        issues.push(ValidationIssue::LensProfile {
            tile_id,
            field: "disk magNorm",
            expected: SENTINEL_MAG_NORM,
            got: lens_row.disk.mag_norm,
        });
    }
    if (lens_row.bulge.redshift - lens.redshift).abs() > VALUE_TOLERANCE {
        issues.push(ValidationIssue::Redshift {
            id: tile_id,
            what: "lens galaxy",
            expected: lens.redshift,
            got: lens_row.bulge.redshift,
        });
    }
}
