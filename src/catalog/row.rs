// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Typed catalog rows.

use marlu::RADec;

use super::{ComponentField, ComponentKind, Field, Schema, SchemaError, Value};

/// One photometric component (bulge, disk or AGN) of a catalog galaxy.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// \[radians\]
    pub radec: RADec,

    /// PhoSim's magnitude normalisation. `None` means the component doesn't
    /// emit (the catalog holds a NaN or null).
    pub mag_norm: Option<f64>,

    pub sed_filename: Option<String>,

    pub redshift: f64,

    /// \[radians\]
    pub major_axis: f64,

    /// \[radians\]
    pub minor_axis: f64,

    /// \[radians\]
    pub position_angle: f64,

    pub sindex: f64,

    pub internal_av: f64,

    pub internal_rv: f64,

    pub is_sprinkled: bool,
}

impl Default for Component {
    fn default() -> Self {
        Component {
            radec: RADec { ra: 0.0, dec: 0.0 },
            mag_norm: None,
            sed_filename: None,
            redshift: 0.0,
            major_axis: 0.0,
            minor_axis: 0.0,
            position_angle: 0.0,
            sindex: 0.0,
            internal_av: 0.0,
            internal_rv: 0.0,
            is_sprinkled: false,
        }
    }
}

impl Component {
    /// Does this component have a usable magNorm and SED?
    pub fn emits(&self) -> bool {
        self.sed_filename.is_some() && self.mag_norm.map(f64::is_finite).unwrap_or(false)
    }

    /// Move the component by an angular offset on the sky. `dx` (towards
    /// increasing RA) and `dy` are in arcseconds; the RA offset is divided by
    /// cos(dec) so the on-sky separation is `dx`.
    pub fn offset_arcsec(&mut self, dx: f64, dy: f64) {
        let delta_ra = (dx / 3600.0).to_radians() / self.radec.dec.cos();
        let delta_dec = (dy / 3600.0).to_radians();
        self.radec.ra += delta_ra;
        self.radec.dec += delta_dec;
    }

    /// Remove any resolved shape and emission.
    pub(crate) fn clear_shape(&mut self, mag_norm: Option<f64>) {
        self.major_axis = 0.0;
        self.minor_axis = 0.0;
        self.position_angle = 0.0;
        self.internal_av = 0.0;
        self.mag_norm = mag_norm;
        self.sed_filename = None;
    }
}

/// The two kinds of lensed source a host galaxy can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum HostKind {
    #[strum(serialize = "AGN")]
    Agn,

    #[strum(serialize = "SN")]
    Sn,
}

/// What sprinkling did to a row. Every output row is exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SprinkleRole {
    #[default]
    Unsprinkled,

    /// The row was a host galaxy and now describes the lens galaxy of a
    /// system.
    LensGalaxy { host: HostKind, system_id: u32 },

    /// The row is one image of a lensed AGN or supernova.
    LensedImage {
        host: HostKind,
        system_id: u32,
        image_index: u32,
        host_tile_id: u64,
    },
}

/// One catalog row, with all the columns the sprinkler cares about.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow {
    pub galtileid: u64,

    pub bulge: Component,
    pub disk: Component,
    pub agn: Component,

    /// The JSON variability description of the AGN.
    pub agn_var_params: Option<String>,

    /// The JSON parameters of a sprinkled supernova.
    pub sn_truth_params: Option<String>,

    /// What happened to this row during sprinkling. Not a catalog column.
    pub role: SprinkleRole,

    /// Values of columns the schema doesn't know about, in column order.
    pub(crate) passthrough: Vec<Value>,
}

impl SourceRow {
    /// A row with nothing but an ID. Components are filled in by the caller.
    pub fn new(galtileid: u64) -> SourceRow {
        SourceRow {
            galtileid,
            bulge: Component::default(),
            disk: Component::default(),
            agn: Component::default(),
            agn_var_params: None,
            sn_truth_params: None,
            role: SprinkleRole::Unsprinkled,
            passthrough: vec![],
        }
    }

    pub fn component(&self, kind: ComponentKind) -> &Component {
        match kind {
            ComponentKind::Bulge => &self.bulge,
            ComponentKind::Disk => &self.disk,
            ComponentKind::Agn => &self.agn,
        }
    }

    pub fn component_mut(&mut self, kind: ComponentKind) -> &mut Component {
        match kind {
            ComponentKind::Bulge => &mut self.bulge,
            ComponentKind::Disk => &mut self.disk,
            ComponentKind::Agn => &mut self.agn,
        }
    }

    pub fn components_mut(&mut self) -> [&mut Component; 3] {
        [&mut self.bulge, &mut self.disk, &mut self.agn]
    }

    /// Which lensed-source path this row is eligible for. A row with a usable
    /// AGN can only host a lensed AGN; only rows without one are considered
    /// for supernovae. Rows without a sensible redshift host nothing.
    pub fn host_kind(&self) -> Option<HostKind> {
        if self.agn.emits() && self.agn.redshift > 0.0 {
            Some(HostKind::Agn)
        } else if self.galaxy_redshift().is_some() {
            Some(HostKind::Sn)
        } else {
            None
        }
    }

    /// The redshift of the galaxy, taken from the first component with a
    /// positive, finite redshift.
    pub fn galaxy_redshift(&self) -> Option<f64> {
        [&self.disk, &self.bulge, &self.agn]
            .into_iter()
            .map(|c| c.redshift)
            .find(|z| z.is_finite() && *z > 0.0)
    }

    /// Set the redshift of every component.
    pub(crate) fn set_redshift(&mut self, z: f64) {
        for c in self.components_mut() {
            c.redshift = z;
        }
    }

    /// Set the "is_sprinkled" flag on every component.
    pub(crate) fn mark_sprinkled(&mut self) {
        for c in self.components_mut() {
            c.is_sprinkled = true;
        }
    }

    /// Build a row from untyped values laid out as described by `schema`.
    /// `row` is only used for error messages.
    pub fn from_values(schema: &Schema, row: usize, values: &[Value]) -> Result<SourceRow, SchemaError> {
        if values.len() != schema.num_columns() {
            return Err(SchemaError::RowLength {
                row,
                expected: schema.num_columns(),
                got: values.len(),
            });
        }

        let wrong_type = |field: Field, expected: &'static str, got: &Value| SchemaError::WrongType {
            row,
            field,
            expected,
            got: got.type_name(),
        };

        let mut out = SourceRow::new(0);
        for (field, index) in schema.fields() {
            let v = &values[index];
            match field {
                Field::GalTileId => {
                    out.galtileid = v
                        .as_u64()
                        .ok_or_else(|| wrong_type(field, "a non-negative int", v))?
                }

                Field::AgnVarParamStr => {
                    out.agn_var_params = v.as_text().ok_or_else(|| wrong_type(field, "a string", v))?
                }

                Field::SnTruthParams => {
                    out.sn_truth_params = v.as_text().ok_or_else(|| wrong_type(field, "a string", v))?
                }

                Field::Component(kind, comp_field) => {
                    let c = out.component_mut(kind);
                    match comp_field {
                        ComponentField::SedFilename => {
                            c.sed_filename =
                                v.as_text().ok_or_else(|| wrong_type(field, "a string", v))?
                        }

                        ComponentField::IsSprinkled => {
                            c.is_sprinkled =
                                v.as_bool().ok_or_else(|| wrong_type(field, "a bool", v))?
                        }

                        ComponentField::MagNorm => {
                            // Nulls and NaNs both mean "no emission".
                            c.mag_norm = match v {
                                Value::Text(None) => None,
                                _ => v
                                    .as_f64()
                                    .ok_or_else(|| wrong_type(field, "a float", v))
                                    .map(|f| if f.is_nan() { None } else { Some(f) })?,
                            }
                        }

                        _ => {
                            let f = v.as_f64().ok_or_else(|| wrong_type(field, "a float", v))?;
                            match comp_field {
                                ComponentField::Ra => c.radec.ra = f,
                                ComponentField::Dec => c.radec.dec = f,
                                ComponentField::Redshift => c.redshift = f,
                                ComponentField::MajorAxis => c.major_axis = f,
                                ComponentField::MinorAxis => c.minor_axis = f,
                                ComponentField::PositionAngle => c.position_angle = f,
                                ComponentField::Sindex => c.sindex = f,
                                ComponentField::InternalAv => c.internal_av = f,
                                ComponentField::InternalRv => c.internal_rv = f,
                                ComponentField::SedFilename
                                | ComponentField::IsSprinkled
                                | ComponentField::MagNorm => unreachable!("handled above"),
                            }
                        }
                    }
                }
            }
        }
        out.passthrough = schema.passthrough().iter().map(|&i| values[i].clone()).collect();

        Ok(out)
    }

    /// Lay this row out as untyped values, as described by `schema`.
    pub fn to_values(&self, schema: &Schema) -> Result<Vec<Value>, SchemaError> {
        let mut values = vec![Value::Text(None); schema.num_columns()];
        for (field, index) in schema.fields() {
            values[index] = match field {
                Field::GalTileId => Value::Int(
                    i64::try_from(self.galtileid).map_err(|_| SchemaError::IdTooLarge { id: self.galtileid })?,
                ),
                Field::AgnVarParamStr => Value::Text(self.agn_var_params.clone()),
                Field::SnTruthParams => Value::Text(self.sn_truth_params.clone()),
                Field::Component(kind, comp_field) => {
                    let c = self.component(kind);
                    match comp_field {
                        ComponentField::Ra => Value::Float(c.radec.ra),
                        ComponentField::Dec => Value::Float(c.radec.dec),
                        ComponentField::MagNorm => Value::Float(c.mag_norm.unwrap_or(f64::NAN)),
                        ComponentField::SedFilename => Value::Text(c.sed_filename.clone()),
                        ComponentField::Redshift => Value::Float(c.redshift),
                        ComponentField::MajorAxis => Value::Float(c.major_axis),
                        ComponentField::MinorAxis => Value::Float(c.minor_axis),
                        ComponentField::PositionAngle => Value::Float(c.position_angle),
                        ComponentField::Sindex => Value::Float(c.sindex),
                        ComponentField::InternalAv => Value::Float(c.internal_av),
                        ComponentField::InternalRv => Value::Float(c.internal_rv),
                        ComponentField::IsSprinkled => Value::Bool(c.is_sprinkled),
                    }
                }
            };
        }
        for (&index, value) in schema.passthrough().iter().zip(self.passthrough.iter()) {
            values[index] = value.clone();
        }
        Ok(values)
    }
}
