// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Instance-catalog rows, as seen by the sprinkler.
//!
//! Writing the PhoSim instance-catalog text format is the caller's business;
//! a [`Catalog`] is just a schema and the typed rows of one visit.

mod error;
mod row;
mod schema;
mod value;

pub use error::SchemaError;
pub use row::{Component, HostKind, SourceRow, SprinkleRole};
pub use schema::{ComponentField, ComponentKind, Field, Schema};
pub use value::Value;

use std::ops::{Deref, DerefMut};

/// The rows of one catalog and the schema they were read with.
///
/// By making [`Catalog`] a new type around a [`Vec`], the rows can be used
/// like any slice while the schema goes wherever they go.
#[derive(Debug, Clone)]
pub struct Catalog {
    schema: Schema,
    rows: Vec<SourceRow>,
}

impl Catalog {
    /// Create an empty [`Catalog`].
    pub fn new(schema: Schema) -> Catalog {
        Catalog {
            schema,
            rows: vec![],
        }
    }

    /// Convert untyped rows, laid out per `schema`, into a [`Catalog`].
    pub fn from_value_rows<I>(schema: Schema, rows: I) -> Result<Catalog, SchemaError>
    where
        I: IntoIterator<Item = Vec<Value>>,
    {
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(i, values)| SourceRow::from_values(&schema, i, &values))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Catalog { schema, rows })
    }

    /// Lay every row out as untyped values, per the schema.
    pub fn to_value_rows(&self) -> Result<Vec<Vec<Value>>, SchemaError> {
        self.rows
            .iter()
            .map(|row| row.to_values(&self.schema))
            .collect()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn push(&mut self, row: SourceRow) {
        self.rows.push(row);
    }

    pub fn into_rows(self) -> Vec<SourceRow> {
        self.rows
    }

    /// Count the rows in each sprinkling role: (unsprinkled, lens galaxies,
    /// lensed images).
    pub fn role_counts(&self) -> (usize, usize, usize) {
        self.rows
            .iter()
            .fold((0, 0, 0), |(u, l, i), row| match row.role {
                SprinkleRole::Unsprinkled => (u + 1, l, i),
                SprinkleRole::LensGalaxy { .. } => (u, l + 1, i),
                SprinkleRole::LensedImage { .. } => (u, l, i + 1),
            })
    }
}

impl Deref for Catalog {
    type Target = Vec<SourceRow>;

    fn deref(&self) -> &Self::Target {
        &self.rows
    }
}

impl DerefMut for Catalog {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.rows
    }
}
