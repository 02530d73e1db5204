// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VariabilityError {
    /// Light curves aren't defined before they start; a caller asking for one
    /// is a bug, so this is never clamped.
    #[error("Requested MJD {epoch} is before the start of the AGN light curve (MJD {start})")]
    EpochBeforeStart { epoch: f64, start: f64 },

    #[error("AGN damping timescale must be positive and finite, but got {tau}")]
    InvalidTau { tau: f64 },

    #[error("Couldn't handle AGN variability parameters: {0}")]
    Json(#[from] serde_json::Error),
}
