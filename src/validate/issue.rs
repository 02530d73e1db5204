// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::catalog::HostKind;

/// One thing wrong with a sprinkled catalog.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    #[error("ID {id} is used by {count} rows")]
    DuplicateId { id: u64, count: usize },

    #[error("Image {id} refers to {host} system {system_id}, which isn't in the {host} catalog")]
    UnknownSystem {
        id: u64,
        host: HostKind,
        system_id: u32,
    },

    #[error("Image {id} is image {image_index} of {host} system {system_id}, which has no such image")]
    UnknownImage {
        id: u64,
        host: HostKind,
        system_id: u32,
        image_index: u32,
    },

    #[error("Image {id} was hosted by galaxy {tile_id}, but that galaxy isn't in the catalog")]
    MissingLensGalaxy { id: u64, tile_id: u64 },

    #[error("Galaxy {tile_id} hosts both lensed AGN and lensed supernova images")]
    BothHosts { tile_id: u64 },

    #[error("Galaxy {tile_id} hosts images of {host} systems {first} and {second}")]
    MultipleSystems {
        tile_id: u64,
        host: HostKind,
        first: u32,
        second: u32,
    },

    #[error("Image {id}: {coord} offset from its lens galaxy should be {expected} rad, but is {got} rad")]
    Position {
        id: u64,
        coord: &'static str,
        expected: f64,
        got: f64,
    },

    #[error("Image {id}: magNorm should be {expected}, but is {got:?}")]
    Magnitude {
        id: u64,
        expected: f64,
        got: Option<f64>,
    },

    #[error("Image {id}: time delay should be {expected} days, but is {got:?}")]
    TimeDelay {
        id: u64,
        expected: f64,
        got: Option<f64>,
    },

    #[error("Row {id}: {what} redshift should be {expected}, but is {got}")]
    Redshift {
        id: u64,
        what: &'static str,
        expected: f64,
        got: f64,
    },

    #[error("Lens galaxy {tile_id}: {field} should be {expected}, but is {got:?}")]
    LensProfile {
        tile_id: u64,
        field: &'static str,
        expected: f64,
        got: Option<f64>,
    },

    #[error("Galaxy {tile_id} has {got} images of {host} system {system_id}, expected {expected}")]
    ImageCount {
        tile_id: u64,
        host: HostKind,
        system_id: u32,
        expected: usize,
        got: usize,
    },

    #[error("Input galaxy {id} is missing from the output catalog")]
    MissingInputRow { id: u64 },

    #[error("The output catalog has {got} rows, but the input catalog plus images should make {expected}")]
    RowCount { expected: usize, got: usize },
}
