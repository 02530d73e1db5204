// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The schema descriptor of a catalog: which named fields live in which
//! column.
//!
//! Catalog versions differ in which columns they have (and in what order), so
//! rather than hardcoding offsets, a "defs" file maps column names to indices.
//! Names are turned into [`Field`]s once, when the schema is built; after that
//! nothing looks columns up by string.

use std::{collections::HashMap, fmt, io::BufRead, path::Path, str::FromStr};

use indexmap::IndexMap;
use itertools::Itertools;
use log::debug;
use strum::IntoEnumIterator;

use super::SchemaError;
use crate::{io::text::open_text, sprinkler::IdScheme};

/// The three photometric components of a catalog galaxy.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum_macros::Display,
    strum_macros::EnumIter,
    strum_macros::EnumString,
)]
pub enum ComponentKind {
    #[strum(serialize = "galaxyBulge")]
    Bulge,

    #[strum(serialize = "galaxyDisk")]
    Disk,

    #[strum(serialize = "galaxyAgn")]
    Agn,
}

/// Per-component columns.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum_macros::Display,
    strum_macros::EnumIter,
    strum_macros::EnumString,
)]
pub enum ComponentField {
    #[strum(serialize = "raJ2000")]
    Ra,

    #[strum(serialize = "decJ2000")]
    Dec,

    #[strum(serialize = "magNorm")]
    MagNorm,

    #[strum(serialize = "sedFilename")]
    SedFilename,

    #[strum(serialize = "redshift")]
    Redshift,

    #[strum(serialize = "majorAxis")]
    MajorAxis,

    #[strum(serialize = "minorAxis")]
    MinorAxis,

    #[strum(serialize = "positionAngle")]
    PositionAngle,

    #[strum(serialize = "sindex")]
    Sindex,

    #[strum(serialize = "internalAv")]
    InternalAv,

    #[strum(serialize = "internalRv")]
    InternalRv,

    #[strum(serialize = "is_sprinkled")]
    IsSprinkled,
}

/// A named catalog column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// The galaxy (tile) identifier.
    GalTileId,

    /// A column belonging to one photometric component.
    Component(ComponentKind, ComponentField),

    /// The JSON blob describing the AGN's variability.
    AgnVarParamStr,

    /// The JSON blob of a sprinkled supernova's parameters. Only cosmoDC2-era
    /// catalogs have this.
    SnTruthParams,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::GalTileId => write!(f, "galtileid"),
            Field::Component(kind, field) => write!(f, "{kind}_{field}"),
            Field::AgnVarParamStr => write!(f, "galaxyAgn_varParamStr"),
            Field::SnTruthParams => write!(f, "sn_truth_params"),
        }
    }
}

impl FromStr for Field {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "galtileid" => Ok(Field::GalTileId),
            "galaxyAgn_varParamStr" => Ok(Field::AgnVarParamStr),
            "sn_truth_params" => Ok(Field::SnTruthParams),
            _ => {
                let (prefix, suffix) = s.split_once('_').ok_or(())?;
                let kind = ComponentKind::from_str(prefix).map_err(|_| ())?;
                let field = ComponentField::from_str(suffix).map_err(|_| ())?;
                Ok(Field::Component(kind, field))
            }
        }
    }
}

impl Field {
    /// Is a schema without this field unusable?
    fn is_required(self) -> bool {
        use ComponentField::*;
        match self {
            Field::GalTileId | Field::AgnVarParamStr => true,
            Field::SnTruthParams => false,
            Field::Component(_, Ra | Dec | MagNorm | SedFilename | Redshift) => true,
            Field::Component(
                ComponentKind::Bulge | ComponentKind::Disk,
                MajorAxis | MinorAxis | PositionAngle,
            ) => true,
            Field::Component(..) => false,
        }
    }

    /// Every field a schema can know about.
    pub fn all() -> impl Iterator<Item = Field> {
        [Field::GalTileId, Field::AgnVarParamStr, Field::SnTruthParams]
            .into_iter()
            .chain(
                ComponentKind::iter()
                    .cartesian_product(ComponentField::iter().collect_vec())
                    .map(|(kind, field)| Field::Component(kind, field)),
            )
    }
}

/// Which [`Field`] lives in which column of a catalog row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    columns: IndexMap<Field, usize>,

    /// Column indices that don't correspond to any [`Field`]. Their values are
    /// carried through sprinkling untouched.
    passthrough: Vec<usize>,

    num_columns: usize,
}

impl Schema {
    /// Build a schema from column names in column order.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Schema, SchemaError> {
        Self::from_pairs(
            names
                .iter()
                .enumerate()
                .map(|(i, name)| (name.as_ref().to_string(), i)),
        )
    }

    /// Read a defs file. Each non-comment line is `<column name>,<index>`
    /// (whitespace may be used instead of the comma).
    pub fn from_defs_file<P: AsRef<Path>>(path: P) -> Result<Schema, SchemaError> {
        let path = path.as_ref();
        debug!("Reading catalog defs from {}", path.display());
        let mut pairs = vec![];
        let mut line = String::new();
        let mut line_num: u32 = 0;
        let mut buf = open_text(path)?;
        while buf.read_line(&mut line)? > 0 {
            line_num += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                line.clear();
                continue;
            }

            let mut items = trimmed
                .split(|c: char| c == ',' || c.is_ascii_whitespace())
                .filter(|s| !s.is_empty());
            let (name, index) = match (items.next(), items.next()) {
                (Some(name), Some(index)) => (name, index),
                _ => {
                    return Err(SchemaError::IncompleteLine {
                        file: path.to_path_buf(),
                        line_num,
                        line: trimmed.to_string(),
                    })
                }
            };
            let index: usize = index.parse().map_err(|_| SchemaError::ParseIndex {
                file: path.to_path_buf(),
                line_num,
                string: index.to_string(),
            })?;
            pairs.push((name.to_string(), index));
            line.clear();
        }

        Self::from_pairs(pairs)
    }

    fn from_pairs<I: IntoIterator<Item = (String, usize)>>(pairs: I) -> Result<Schema, SchemaError> {
        let mut columns = IndexMap::new();
        let mut claimed: HashMap<usize, String> = HashMap::new();
        let mut num_columns = 0;
        for (name, index) in pairs {
            if let Some(first) = claimed.insert(index, name.clone()) {
                return Err(SchemaError::DuplicateIndex {
                    index,
                    first,
                    second: name,
                });
            }
            num_columns = num_columns.max(index + 1);

            match name.parse::<Field>() {
                Ok(field) => {
                    if columns.insert(field, index).is_some() {
                        return Err(SchemaError::DuplicateField { field });
                    }
                }
                Err(()) => debug!("Column '{name}' (index {index}) isn't used by the sprinkler"),
            }
        }

        if let Some(missing) = Field::all().find(|f| f.is_required() && !columns.contains_key(f)) {
            return Err(SchemaError::MissingRequired(missing));
        }

        let passthrough = (0..num_columns)
            .filter(|i| !columns.values().any(|v| v == i))
            .collect();

        Ok(Schema {
            columns,
            passthrough,
            num_columns,
        })
    }

    /// The column index of a field, if the schema has it.
    pub fn index(&self, field: Field) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    pub fn has(&self, field: Field) -> bool {
        self.columns.contains_key(&field)
    }

    /// Does this schema carry per-component "is_sprinkled" flags?
    pub fn has_sprinkled_flags(&self) -> bool {
        ComponentKind::iter()
            .all(|kind| self.has(Field::Component(kind, ComponentField::IsSprinkled)))
    }

    pub fn num_columns(&self) -> usize {
        self.num_columns
    }

    pub(super) fn passthrough(&self) -> &[usize] {
        &self.passthrough
    }

    pub(super) fn fields(&self) -> impl Iterator<Item = (Field, usize)> + '_ {
        self.columns.iter().map(|(f, i)| (*f, *i))
    }

    /// The ID scheme implied by the schema. Catalogs with supernova truth
    /// parameters come from the cosmoDC2 era, which allows up to 8 images per
    /// system; older catalogs allow 4.
    pub fn detect_id_scheme(&self) -> IdScheme {
        if self.has(Field::SnTruthParams) {
            IdScheme::Extended
        } else {
            IdScheme::Legacy
        }
    }
}
