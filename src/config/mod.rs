// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Sprinkler configuration, read from a toml or json file.

mod error;

pub use error::ConfigError;

use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    str::FromStr,
};

use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::{catalog::Schema, sprinkler::IdScheme};

lazy_static::lazy_static! {
    pub(crate) static ref CONFIG_FILE_TYPES_COMMA_SEPARATED: String = ConfigFileType::iter().join(", ");
}

#[derive(Debug, Display, EnumIter, EnumString)]
pub(crate) enum ConfigFileType {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

/// Where the AGN and SN selections of an earlier run live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheFiles {
    pub agn_cache: PathBuf,
    pub sne_cache: PathBuf,
}

fn default_density() -> f64 {
    1.0
}

/// Everything needed to build a [`crate::Sprinkler`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SprinklerConfig {
    /// The OM10 lensed-quasar catalog (FITS).
    pub lens_catalog: PathBuf,

    /// The lensed-supernova catalog (CSV).
    pub sne_catalog: PathBuf,

    /// Maps catalog column names to column indices.
    pub defs_file: PathBuf,

    /// The rest-frame AGN SED used to work out each lens system's matched
    /// source magnitude.
    pub agn_template_sed: PathBuf,

    /// The band the OM10 source magnitudes are in (LSST i).
    pub reference_bandpass: PathBuf,

    /// The fraction of eligible AGN hosts to sprinkle.
    #[serde(default = "default_density")]
    pub density_param: f64,

    /// The fraction of eligible SN hosts to sprinkle.
    #[serde(default = "default_density")]
    pub sne_density_param: f64,

    /// If given, replay these selections rather than drawing new ones.
    #[serde(default)]
    pub cache: Option<CacheFiles>,

    /// The directory containing the SALT2 template surfaces and colour law.
    pub salt2_model_dir: PathBuf,

    /// Write supernova SEDs? Requires `sed_output_dir`.
    #[serde(default)]
    pub write_sn_seds: bool,

    #[serde(default)]
    pub sed_output_dir: Option<PathBuf>,

    /// Prepended to supernova SED file names in the catalog, e.g. "spectra".
    #[serde(default)]
    pub sed_name_prefix: String,

    /// Override the ID scheme detected from the catalog schema.
    #[serde(default)]
    pub id_scheme: Option<IdScheme>,
}

impl SprinklerConfig {
    /// Read a config file. The format is decided by the file's extension.
    pub fn read<P: AsRef<Path>>(file: P) -> Result<SprinklerConfig, ConfigError> {
        let file = file.as_ref();
        debug!("Attempting to parse config file {}", file.display());

        let file_type = file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| ConfigFileType::from_str(&e).ok());
        let file_type = match file_type {
            Some(t) => t,
            None => return Err(ConfigError::UnknownFileType(file.to_path_buf())),
        };

        let mut contents = String::new();
        File::open(file)?.read_to_string(&mut contents)?;
        let config: SprinklerConfig = match file_type {
            ConfigFileType::Toml => {
                debug!("Parsing toml file...");
                toml::from_str(&contents).map_err(|err| ConfigError::Decode {
                    file: file.to_path_buf(),
                    file_type: ConfigFileType::Toml.to_string(),
                    err: err.to_string(),
                })?
            }
            ConfigFileType::Json => {
                debug!("Parsing json file...");
                serde_json::from_str(&contents).map_err(|err| ConfigError::Decode {
                    file: file.to_path_buf(),
                    file_type: ConfigFileType::Json.to_string(),
                    err: err.to_string(),
                })?
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Check that the values make sense together. This doesn't check that
    /// input files exist; loading them will.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, density) in [
            ("density_param", self.density_param),
            ("sne_density_param", self.sne_density_param),
        ] {
            if !(0.0..=1.0).contains(&density) {
                return Err(ConfigError::Density { name, density });
            }
        }
        if self.write_sn_seds && self.sed_output_dir.is_none() {
            return Err(ConfigError::NoSedOutputDir);
        }
        for (name, path) in [
            ("lens_catalog", &self.lens_catalog),
            ("sne_catalog", &self.sne_catalog),
            ("defs_file", &self.defs_file),
            ("agn_template_sed", &self.agn_template_sed),
            ("reference_bandpass", &self.reference_bandpass),
            ("salt2_model_dir", &self.salt2_model_dir),
        ] {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::EmptyPath(name));
            }
        }
        Ok(())
    }

    /// Read the catalog schema from the defs file.
    pub fn read_schema(&self) -> Result<Schema, ConfigError> {
        Ok(Schema::from_defs_file(&self.defs_file)?)
    }
}
