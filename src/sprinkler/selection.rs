// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Deciding which galaxies host which lens systems.
//!
//! In live mode, each galaxy's decision comes from a generator seeded with its
//! own ID, so it doesn't depend on the order of the catalog or on any other
//! galaxy. In cached mode, the decisions of an earlier run are replayed from
//! `tileId,systemId` files.

use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufWriter, Write},
    path::{Path, PathBuf},
};

use log::{debug, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::{catalog::HostKind, io::text::open_text};

/// Per-galaxy seeds are taken modulo this.
const SEED_MODULUS: u64 = (1 << 32) - 1;

#[derive(Error, Debug)]
pub enum SelectionCacheError {
    #[error("Cached sprinkling was requested, but the {host} cache file {file} doesn't exist")]
    Missing { host: HostKind, file: PathBuf },

    #[error("Cache file {file} line {line_num}: Expected '<tile ID>,<system ID>', got '{line}'")]
    BadLine {
        file: PathBuf,
        line_num: u32,
        line: String,
    },

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

/// The system each galaxy hosted in an earlier run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionCache {
    agn: HashMap<u64, u32>,
    sne: HashMap<u64, u32>,
}

impl SelectionCache {
    pub fn new(agn: HashMap<u64, u32>, sne: HashMap<u64, u32>) -> SelectionCache {
        SelectionCache { agn, sne }
    }

    /// Read the AGN and SN cache files. Both must exist.
    pub fn read<P: AsRef<Path>, P2: AsRef<Path>>(
        agn_file: P,
        sne_file: P2,
    ) -> Result<SelectionCache, SelectionCacheError> {
        Ok(SelectionCache {
            agn: read_cache_file(agn_file.as_ref(), HostKind::Agn)?,
            sne: read_cache_file(sne_file.as_ref(), HostKind::Sn)?,
        })
    }

    /// Build a cache from the selections of a live pass.
    pub fn from_selections(agn: &[(u64, u32)], sne: &[(u64, u32)]) -> SelectionCache {
        SelectionCache {
            agn: agn.iter().copied().collect(),
            sne: sne.iter().copied().collect(),
        }
    }

    /// Write the AGN and SN cache files.
    pub fn write<P: AsRef<Path>, P2: AsRef<Path>>(
        &self,
        agn_file: P,
        sne_file: P2,
    ) -> Result<(), SelectionCacheError> {
        write_cache_file(agn_file.as_ref(), &self.agn)?;
        write_cache_file(sne_file.as_ref(), &self.sne)?;
        Ok(())
    }

    /// The system a galaxy hosted, if any.
    pub fn system(&self, host: HostKind, tile_id: u64) -> Option<u32> {
        match host {
            HostKind::Agn => self.agn.get(&tile_id).copied(),
            HostKind::Sn => self.sne.get(&tile_id).copied(),
        }
    }

    pub fn len(&self, host: HostKind) -> usize {
        match host {
            HostKind::Agn => self.agn.len(),
            HostKind::Sn => self.sne.len(),
        }
    }
}

fn read_cache_file(file: &Path, host: HostKind) -> Result<HashMap<u64, u32>, SelectionCacheError> {
    if !file.exists() {
        return Err(SelectionCacheError::Missing {
            host,
            file: file.to_path_buf(),
        });
    }
    debug!("Reading {host} selection cache {}", file.display());

    let mut buf = open_text(file)?;
    let mut line = String::new();
    let mut line_num: u32 = 0;
    let mut map = HashMap::new();
    while buf.read_line(&mut line)? > 0 {
        line_num += 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            line.clear();
            continue;
        }

        let mut items = trimmed.split(',').map(|s| s.trim());
        let parsed = match (items.next(), items.next(), items.next()) {
            (Some(tile), Some(system), None) => tile.parse::<u64>().ok().zip(system.parse::<u32>().ok()),
            _ => None,
        };
        match parsed {
            Some((tile, system)) => {
                if let Some(old) = map.insert(tile, system) {
                    warn!("{host} cache {}: tile {tile} is listed twice (systems {old} and {system}); using the last", file.display());
                }
            }
            // A header is allowed on the first line.
            None if map.is_empty() && line_num == 1 => (),
            None => {
                return Err(SelectionCacheError::BadLine {
                    file: file.to_path_buf(),
                    line_num,
                    line: trimmed.to_string(),
                })
            }
        }
        line.clear();
    }
    debug!("{host} selection cache has {} entries", map.len());

    Ok(map)
}

fn write_cache_file(file: &Path, map: &HashMap<u64, u32>) -> Result<(), SelectionCacheError> {
    let mut entries: Vec<(u64, u32)> = map.iter().map(|(k, v)| (*k, *v)).collect();
    entries.sort_unstable();
    let mut f = BufWriter::new(File::create(file)?);
    writeln!(f, "tileId,systemId")?;
    for (tile, system) in entries {
        writeln!(f, "{tile},{system}")?;
    }
    f.flush()?;
    Ok(())
}

/// How a sprinkler decides which galaxies host lens systems.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionMode {
    /// Seeded pseudo-random selection. The densities are the fractions of
    /// eligible AGN and SN hosts that get sprinkled.
    Live { density: f64, sne_density: f64 },

    /// Replay an earlier run.
    Cached(SelectionCache),
}

/// The generator deciding a galaxy's fate.
pub(crate) fn host_rng(galtileid: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(galtileid % SEED_MODULUS)
}

/// Draw a uniform deviate; if it's within `density` and there are candidates,
/// pick one with a second draw. Candidates must already be sorted.
pub(crate) fn live_pick<'a, T>(rng: &mut ChaCha8Rng, density: f64, candidates: &[&'a T]) -> Option<&'a T> {
    let draw: f64 = rng.gen();
    if candidates.is_empty() || draw > density {
        return None;
    }
    Some(candidates[rng.gen_range(0..candidates.len())])
}
