// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! File stuff: FITS tables for lens catalogs, and (possibly gzipped) text for
//! everything else.

pub(crate) mod fits;
pub(crate) mod text;

pub use fits::FitsError;
