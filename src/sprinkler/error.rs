// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::catalog::HostKind;

/// Errors from a sprinkling pass. Any of these leave the catalog partially
/// sprinkled; the pass must be redone from the unmodified input.
#[derive(Error, Debug)]
pub enum SprinklerError {
    #[error("The selection cache assigns {host} system {system_id} to galaxy {tile_id}, but there is no such system")]
    UnknownSystem {
        host: HostKind,
        tile_id: u64,
        system_id: u32,
    },

    #[error("Couldn't serialise supernova parameters: {0}")]
    SnParams(#[from] serde_json::Error),

    #[error(transparent)]
    Ids(#[from] super::IdEncodingError),

    #[error(transparent)]
    SelectionCache(#[from] super::SelectionCacheError),

    #[error(transparent)]
    Variability(#[from] crate::variability::VariabilityError),

    #[error(transparent)]
    Supernova(#[from] crate::supernova::SupernovaError),
}
