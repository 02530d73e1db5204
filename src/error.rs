// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all sprinkler-related errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TwinklesError {
    /// A bad config file.
    #[error("{0}")]
    Config(#[from] crate::config::ConfigError),

    /// A catalog doesn't fit its schema, or the schema itself is bad.
    #[error("{0}")]
    Schema(#[from] crate::catalog::SchemaError),

    /// An unreadable lens or supernova catalog.
    #[error("{0}")]
    CatalogLoad(#[from] crate::lenses::CatalogLoadError),

    #[error("{0}")]
    Photometry(#[from] crate::photometry::PhotometryError),

    #[error("{0}")]
    Supernova(#[from] crate::supernova::SupernovaError),

    #[error("{0}")]
    Variability(#[from] crate::variability::VariabilityError),

    #[error("{0}")]
    SelectionCache(#[from] crate::sprinkler::SelectionCacheError),

    #[error("{0}")]
    Ids(#[from] crate::sprinkler::IdEncodingError),

    #[error("{0}")]
    Sprinkler(#[from] crate::sprinkler::SprinklerError),

    #[error("{0}")]
    Fits(#[from] crate::io::FitsError),
}
