// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Identifiers of sprinkled images.
//!
//! An image's ID packs the host galaxy's tile ID, the system and the image
//! number:
//!
//! `(tile_id + 1.5e10) * M + system_id * K + image`
//!
//! where (M, K) is (10^4, 4) in the legacy scheme and (10^5, 8) in the
//! extended one. The offset keeps sprinkled IDs clear of ordinary catalog IDs.
//! PhoSim then makes its own unique ID by shifting left 10 bits and adding a
//! per-type tag.

use thiserror::Error;

use crate::constants::{MAX_SPRINKLED_ID, PHOSIM_ID_SHIFT, SPRINKLED_ID_OFFSET};

/// How many images per system an ID can describe, and hence how IDs are
/// packed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum IdScheme {
    /// Up to 4 images per system.
    Legacy,

    /// Up to 8 images per system (cosmoDC2-era catalogs).
    Extended,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdEncodingError {
    #[error("Image index {image} can't be encoded; the {scheme} ID scheme allows at most {max} images")]
    ImageIndex {
        image: u32,
        max: u32,
        scheme: IdScheme,
    },

    #[error("System ID {system_id} can't be encoded; the {scheme} ID scheme allows system IDs up to {max}")]
    SystemId {
        system_id: u32,
        max: u64,
        scheme: IdScheme,
    },

    #[error("Tile ID {tile_id} is too large to encode; sprinkled IDs can't exceed {}", MAX_SPRINKLED_ID)]
    Overflow { tile_id: u64 },
}

impl IdScheme {
    /// The most images a system may have.
    pub fn max_images(self) -> u32 {
        match self {
            IdScheme::Legacy => 4,
            IdScheme::Extended => 8,
        }
    }

    fn multiplier(self) -> u64 {
        match self {
            IdScheme::Legacy => 10_000,
            IdScheme::Extended => 100_000,
        }
    }

    /// The largest system ID that can be encoded.
    pub fn max_system_id(self) -> u64 {
        (self.multiplier() - 1) / u64::from(self.max_images())
    }

    /// Make the ID of image `image` of system `system_id`, hosted by the
    /// galaxy `tile_id`. The ID must leave room for PhoSim's shift.
    pub fn encode(self, tile_id: u64, system_id: u32, image: u32) -> Result<u64, IdEncodingError> {
        if image >= self.max_images() {
            return Err(IdEncodingError::ImageIndex {
                image,
                max: self.max_images(),
                scheme: self,
            });
        }
        if u64::from(system_id) > self.max_system_id() {
            return Err(IdEncodingError::SystemId {
                system_id,
                max: self.max_system_id(),
                scheme: self,
            });
        }
        tile_id
            .checked_add(SPRINKLED_ID_OFFSET)
            .and_then(|id| id.checked_mul(self.multiplier()))
            .and_then(|id| {
                id.checked_add(u64::from(system_id) * u64::from(self.max_images()) + u64::from(image))
            })
            .filter(|&id| id <= MAX_SPRINKLED_ID)
            .ok_or(IdEncodingError::Overflow { tile_id })
    }

    /// Recover (tile ID, system ID, image) from a sprinkled image's ID.
    /// Returns `None` if the ID isn't one of a sprinkled image.
    pub fn decode(self, id: u64) -> Option<(u64, u32, u32)> {
        let multiplier = self.multiplier();
        let tile_id = (id / multiplier).checked_sub(SPRINKLED_ID_OFFSET)?;
        let rest = id % multiplier;
        let k = u64::from(self.max_images());
        let system_id = u32::try_from(rest / k).ok()?;
        let image = (rest % k) as u32;
        Some((tile_id, system_id, image))
    }

    /// Is this the ID of a sprinkled image?
    pub fn is_sprinkled_id(self, id: u64) -> bool {
        self.decode(id).is_some()
    }

    /// PhoSim's unique ID for an object: the ID shifted left 10 bits, plus a
    /// per-type tag.
    pub fn phosim_unique_id(id: u64, type_tag: u32) -> Result<u64, IdEncodingError> {
        if u64::from(type_tag) >= 1 << PHOSIM_ID_SHIFT || id.leading_zeros() < PHOSIM_ID_SHIFT {
            return Err(IdEncodingError::Overflow { tile_id: id });
        }
        Ok((id << PHOSIM_ID_SHIFT) + u64::from(type_tag))
    }

    /// Undo [`IdScheme::phosim_unique_id`] and [`IdScheme::decode`].
    pub fn decode_phosim(self, unique_id: u64) -> Option<(u64, u32, u32)> {
        self.decode(unique_id >> PHOSIM_ID_SHIFT)
    }
}
