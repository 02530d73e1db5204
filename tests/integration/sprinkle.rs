// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use tempfile::TempDir;

use twinkles_sprinkler::{
    catalog::Catalog, supernova::sed_file_name, validate::Validator, IdScheme, SelectionCache,
    SprinkleRole, Sprinkler, SprinklerConfig, TwinklesError,
};

use crate::{input_catalog, Inputs};

const MJD: f64 = 59585.0;

#[test]
fn test_sprinkle_from_config() {
    let dir = TempDir::new().unwrap();
    let inputs = Inputs::write(dir.path());
    let sed_dir = dir.path().join("spectra");
    std::fs::create_dir(&sed_dir).unwrap();
    let config_file = inputs.config(
        "sprinkler.toml",
        &format!(
            "write_sn_seds = true\nsed_output_dir = {:?}\nsed_name_prefix = \"spectra\"\n",
            sed_dir.display().to_string()
        ),
    );

    let config = SprinklerConfig::read(&config_file).unwrap();
    let schema = config.read_schema().unwrap();
    assert_eq!(schema.detect_id_scheme(), IdScheme::Extended);
    let sprinkler = Sprinkler::from_config(&config).unwrap();
    assert_eq!(sprinkler.lenses().len(), 1);
    assert_eq!(sprinkler.sne().len(), 1);

    let input = input_catalog(schema.clone());
    let mut output = input_catalog(schema);
    let summary = sprinkler.sprinkle(&mut output, MJD).unwrap();
    assert_eq!(summary.rows_in, 3);
    assert_eq!(summary.agn_selections, vec![(42, 7)]);
    assert_eq!(summary.sn_selections, vec![(43, 3)]);
    assert_eq!(summary.agn_images, 2);
    assert_eq!(summary.sn_images + summary.sn_images_omitted, 2);
    assert_eq!(summary.rows_out, 3 + summary.agn_images + summary.sn_images);
    assert_eq!(output.len(), summary.rows_out);

    // The supernova peaked five days ago; its first image is certainly on.
    let first_sn_image = output
        .iter()
        .find(|r| r.galtileid == IdScheme::Extended.encode(43, 3, 0).unwrap())
        .unwrap();
    let name = sed_file_name(3, 0, MJD);
    assert_eq!(
        first_sn_image.agn.sed_filename.as_deref(),
        Some(format!("spectra/{name}.gz").as_str())
    );
    assert!(sed_dir.join(format!("{name}.gz")).exists());
    assert!(first_sn_image.sn_truth_params.is_some());

    // The lens galaxy of the quasar.
    let lens = &output[0];
    assert_eq!(lens.galtileid, 42);
    assert_abs_diff_eq!(lens.bulge.redshift, 0.5);
    assert_eq!(lens.bulge.mag_norm, Some(19.5));
    assert!(lens.bulge.is_sprinkled);
    // The ordinary galaxy is untouched.
    assert_eq!(output[2], input[2]);

    let validator = Validator::new(sprinkler.lenses(), sprinkler.sne(), IdScheme::Extended);
    assert_eq!(validator.validate(&output, Some(&input[..])), vec![]);

    // The catalog as it would be handed back.
    let values = output.to_value_rows().unwrap();
    let reread = Catalog::from_value_rows(output.schema().clone(), values).unwrap();
    assert!(reread.iter().all(|r| r.role == SprinkleRole::Unsprinkled));
    assert_eq!(validator.validate(&reread, Some(&input[..])), vec![]);
}

#[test]
fn test_cached_selections_reproduce_a_pass() {
    let dir = TempDir::new().unwrap();
    let inputs = Inputs::write(dir.path());
    let config = SprinklerConfig::read(inputs.config("live.toml", "")).unwrap();
    let schema = config.read_schema().unwrap();
    let sprinkler = Sprinkler::from_config(&config).unwrap();
    let mut live = input_catalog(schema.clone());
    let summary = sprinkler.sprinkle(&mut live, MJD).unwrap();

    let agn_cache = dir.path().join("agn_cache.csv");
    let sne_cache = dir.path().join("sne_cache.csv");
    summary.selection_cache().write(&agn_cache, &sne_cache).unwrap();
    assert_eq!(
        SelectionCache::read(&agn_cache, &sne_cache).unwrap(),
        summary.selection_cache()
    );

    let config = SprinklerConfig::read(inputs.config(
        "cached.toml",
        &format!(
            "density_param = 0.0\nsne_density_param = 0.0\n[cache]\nagn_cache = {:?}\nsne_cache = {:?}\n",
            agn_cache.display().to_string(),
            sne_cache.display().to_string()
        ),
    ))
    .unwrap();
    let sprinkler = Sprinkler::from_config(&config).unwrap();
    let mut cached = input_catalog(schema);
    let cached_summary = sprinkler.sprinkle(&mut cached, MJD).unwrap();
    assert_eq!(cached_summary, summary);
    assert_eq!(cached.to_vec(), live.to_vec());
}

#[test]
fn test_zero_density_changes_nothing() {
    let dir = TempDir::new().unwrap();
    let inputs = Inputs::write(dir.path());
    let config = SprinklerConfig::read(inputs.config(
        "none.toml",
        "density_param = 0.0\nsne_density_param = 0.0\n",
    ))
    .unwrap();
    let schema = config.read_schema().unwrap();
    let sprinkler = Sprinkler::from_config(&config).unwrap();
    let input = input_catalog(schema.clone());
    let mut output = input_catalog(schema);
    let summary = sprinkler.sprinkle(&mut output, MJD).unwrap();
    assert_eq!(summary.rows_out, 3);
    assert_eq!(output.to_vec(), input.to_vec());
}

#[test]
fn test_missing_inputs_are_reported() {
    let dir = TempDir::new().unwrap();
    let inputs = Inputs::write(dir.path());
    std::fs::remove_file(&inputs.sne_catalog).unwrap();
    let config = SprinklerConfig::read(inputs.config("sprinkler.toml", "")).unwrap();
    let result = Sprinkler::from_config(&config);
    assert!(matches!(result, Err(TwinklesError::CatalogLoad(_))));
}
