// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod sprinkle;

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use fitsio::{
    tables::{ColumnDataType, ColumnDescription},
    FitsFile,
};
use indoc::indoc;

use twinkles_sprinkler::{
    catalog::{Catalog, Value},
    constants::{AB_ZERO_POINT_JY, SPEED_OF_LIGHT},
    photometry::Sed,
    Schema,
};

/// The catalog columns used here. Having `sn_truth_params` means IDs use the
/// extended scheme.
const COLUMNS: [&str; 40] = [
    "galtileid",
    "galaxyBulge_raJ2000",
    "galaxyBulge_decJ2000",
    "galaxyBulge_magNorm",
    "galaxyBulge_sedFilename",
    "galaxyBulge_redshift",
    "galaxyBulge_majorAxis",
    "galaxyBulge_minorAxis",
    "galaxyBulge_positionAngle",
    "galaxyBulge_sindex",
    "galaxyBulge_internalAv",
    "galaxyBulge_internalRv",
    "galaxyDisk_raJ2000",
    "galaxyDisk_decJ2000",
    "galaxyDisk_magNorm",
    "galaxyDisk_sedFilename",
    "galaxyDisk_redshift",
    "galaxyDisk_majorAxis",
    "galaxyDisk_minorAxis",
    "galaxyDisk_positionAngle",
    "galaxyDisk_sindex",
    "galaxyDisk_internalAv",
    "galaxyDisk_internalRv",
    "galaxyAgn_raJ2000",
    "galaxyAgn_decJ2000",
    "galaxyAgn_magNorm",
    "galaxyAgn_sedFilename",
    "galaxyAgn_redshift",
    "galaxyAgn_majorAxis",
    "galaxyAgn_minorAxis",
    "galaxyAgn_positionAngle",
    "galaxyAgn_sindex",
    "galaxyAgn_internalAv",
    "galaxyAgn_internalRv",
    "galaxyAgn_varParamStr",
    "galaxyBulge_objectId",
    "galaxyBulge_is_sprinkled",
    "galaxyDisk_is_sprinkled",
    "galaxyAgn_is_sprinkled",
    "sn_truth_params",
];

/// Paths of everything a config file refers to.
struct Inputs {
    dir: PathBuf,
    lens_catalog: PathBuf,
    sne_catalog: PathBuf,
    defs_file: PathBuf,
    agn_template_sed: PathBuf,
    reference_bandpass: PathBuf,
    salt2_model_dir: PathBuf,
}

impl Inputs {
    /// Write all inputs into `dir`: one two-image lensed quasar (twinklesId 7,
    /// z = 1.2, i = 22) and one two-image lensed supernova (sysno 3, z = 0.8,
    /// peaking on MJD 59580 and 59600).
    fn write(dir: &Path) -> Inputs {
        let inputs = Inputs {
            dir: dir.to_path_buf(),
            lens_catalog: dir.join("twinkles_lenses.fits"),
            sne_catalog: dir.join("dc2_sne_cat.csv"),
            defs_file: dir.join("catalog_defs.txt"),
            agn_template_sed: dir.join("agn.spec"),
            reference_bandpass: dir.join("total_i.dat"),
            salt2_model_dir: dir.join("salt2-4"),
        };

        write_om10_fits(&inputs.lens_catalog);
        std::fs::write(
            &inputs.sne_catalog,
            indoc! {"
                twinkles_sysno,imno,zs,zl,x,y,t0,td,mu,x0,x1,c,lens_reff,lens_e,lens_phie,lens_sed,lens_magnorm
                3,0,0.8,0.3,0.6,0.1,59580.0,0.0,2.5,1e-5,0.5,0.05,0.8,0.3,45.0,galaxySED/Burst.25E09.1Z.spec.gz,19.5
                3,1,0.8,0.3,-0.4,-0.7,59580.0,20.0,-1.8,1e-5,0.5,0.05,0.8,0.3,45.0,galaxySED/Burst.25E09.1Z.spec.gz,19.5
            "},
        )
        .unwrap();

        let mut defs = BufWriter::new(File::create(&inputs.defs_file).unwrap());
        for (i, name) in COLUMNS.iter().enumerate() {
            writeln!(defs, "{name},{i}").unwrap();
        }
        defs.flush().unwrap();

        // A flat f_ν template, so the i-band magnitude of a system is its
        // magNorm.
        let fnu_jy = AB_ZERO_POINT_JY * 10_f64.powf(-0.4 * 20.0);
        let wavelen: Vec<f64> = (50..=3000).map(|w| w as f64).collect();
        let flambda = wavelen
            .iter()
            .map(|w| fnu_jy / (w * w * 1e-9 / SPEED_OF_LIGHT * 1e23))
            .collect();
        Sed::new(wavelen, flambda)
            .unwrap()
            .write(&inputs.agn_template_sed)
            .unwrap();

        let mut band = BufWriter::new(File::create(&inputs.reference_bandpass).unwrap());
        writeln!(band, "# top-hat i band").unwrap();
        for w in 690..=820 {
            writeln!(band, "{w} 1.0").unwrap();
        }
        band.flush().unwrap();

        std::fs::create_dir(&inputs.salt2_model_dir).unwrap();
        write_salt2_model(&inputs.salt2_model_dir);

        inputs
    }

    /// A TOML config pointing at the inputs, with extra lines appended.
    fn config(&self, name: &str, extra: &str) -> PathBuf {
        let path = self.dir.join(name);
        let mut f = File::create(&path).unwrap();
        writeln!(f, "lens_catalog = {:?}", self.lens_catalog.display().to_string()).unwrap();
        writeln!(f, "sne_catalog = {:?}", self.sne_catalog.display().to_string()).unwrap();
        writeln!(f, "defs_file = {:?}", self.defs_file.display().to_string()).unwrap();
        writeln!(f, "agn_template_sed = {:?}", self.agn_template_sed.display().to_string()).unwrap();
        writeln!(
            f,
            "reference_bandpass = {:?}",
            self.reference_bandpass.display().to_string()
        )
        .unwrap();
        writeln!(f, "salt2_model_dir = {:?}", self.salt2_model_dir.display().to_string()).unwrap();
        f.write_all(extra.as_bytes()).unwrap();
        path
    }
}

fn write_om10_fits(path: &Path) {
    let mut fptr = FitsFile::create(path).open().unwrap();
    let col = |name: &str, data_type: ColumnDataType, repeat: usize| {
        ColumnDescription::new(name)
            .with_type(data_type)
            .that_repeats(repeat)
            .create()
            .unwrap()
    };
    let hdu = fptr
        .create_table(
            "OM10",
            &[
                col("LENSID", ColumnDataType::Int, 1),
                col("twinklesId", ColumnDataType::Int, 1),
                col("NIMG", ColumnDataType::Int, 1),
                col("ZLENS", ColumnDataType::Double, 1),
                col("ZSRC", ColumnDataType::Double, 1),
                col("MAGI_IN", ColumnDataType::Double, 1),
                col("XIMG", ColumnDataType::Double, 4),
                col("YIMG", ColumnDataType::Double, 4),
                col("MAG", ColumnDataType::Double, 4),
                col("DELAY", ColumnDataType::Double, 4),
                col("REFF", ColumnDataType::Double, 1),
                col("ELLIP", ColumnDataType::Double, 1),
                col("PHIE", ColumnDataType::Double, 1),
                col("lens_sed", ColumnDataType::String, 64),
                col("sed_magNorm", ColumnDataType::Double, 6),
            ],
        )
        .unwrap();
    hdu.write_col(&mut fptr, "LENSID", &[1007_i32]).unwrap();
    hdu.write_col(&mut fptr, "twinklesId", &[7_i32]).unwrap();
    hdu.write_col(&mut fptr, "NIMG", &[2_i32]).unwrap();
    hdu.write_col(&mut fptr, "ZLENS", &[0.5]).unwrap();
    hdu.write_col(&mut fptr, "ZSRC", &[1.2]).unwrap();
    hdu.write_col(&mut fptr, "MAGI_IN", &[22.0]).unwrap();
    hdu.write_col(&mut fptr, "XIMG", &[0.5, -0.2, 0.0, 0.0]).unwrap();
    hdu.write_col(&mut fptr, "YIMG", &[-0.3, 0.9, 0.0, 0.0]).unwrap();
    hdu.write_col(&mut fptr, "MAG", &[3.0, -1.5, 0.0, 0.0]).unwrap();
    hdu.write_col(&mut fptr, "DELAY", &[0.0, 12.4, 0.0, 0.0]).unwrap();
    hdu.write_col(&mut fptr, "REFF", &[0.8]).unwrap();
    hdu.write_col(&mut fptr, "ELLIP", &[0.3]).unwrap();
    hdu.write_col(&mut fptr, "PHIE", &[45.0]).unwrap();
    hdu.write_col(&mut fptr, "lens_sed", &["galaxySED/Burst.25E09.1Z.spec.gz".to_string()])
        .unwrap();
    hdu.write_col(&mut fptr, "sed_magNorm", &[19.5, 99.0, 99.0, 99.0, 99.0, 99.0])
        .unwrap();
}

/// A SALT2 model whose M0 surface is a Gaussian in phase (σ = 10 days), flat
/// in wavelength.
fn write_salt2_model(dir: &Path) {
    for (file, scale) in [("salt2_template_0.dat", 1.0), ("salt2_template_1.dat", 0.1)] {
        let mut f = BufWriter::new(File::create(dir.join(file)).unwrap());
        for p in -20..=50 {
            let value = scale * (-(p * p) as f64 / 200.0).exp();
            for i in 0..=360 {
                writeln!(f, "{p} {} {value}", 2000 + 20 * i).unwrap();
            }
        }
        f.flush().unwrap();
    }
    std::fs::write(
        dir.join("salt2_color_correction.dat"),
        indoc! {"
            1
            -0.5
            Salt2ExtinctionLaw.version 1
            Salt2ExtinctionLaw.min_lambda 2800
            Salt2ExtinctionLaw.max_lambda 7000
        "},
    )
    .unwrap();
}

/// The values of one input galaxy, in `COLUMNS` order. Without an AGN
/// magNorm, the galaxy has no AGN.
fn galaxy(galtileid: i64, z: f64, agn_mag_norm: Option<f64>) -> Vec<Value> {
    let ra = (53.0 + galtileid as f64 * 1e-4).to_radians();
    let dec = (-27.5_f64).to_radians();
    let text = |s: &str| Value::Text(Some(s.to_string()));
    let shape = |major: f64, minor: f64| {
        vec![
            Value::Float(major),
            Value::Float(minor),
            Value::Float(0.7),
            Value::Float(4.0),
            Value::Float(0.2),
            Value::Float(3.1),
        ]
    };

    let mut values = vec![Value::Int(galtileid)];
    for (mag, sed) in [(21.0, "galaxySED/bulge.spec.gz"), (20.5, "galaxySED/disk.spec.gz")] {
        values.extend([
            Value::Float(ra),
            Value::Float(dec),
            Value::Float(mag),
            text(sed),
            Value::Float(z),
        ]);
        values.extend(shape(2e-6, 1e-6));
    }
    values.extend([
        Value::Float(ra),
        Value::Float(dec),
        agn_mag_norm.map(Value::Float).unwrap_or(Value::Text(None)),
        if agn_mag_norm.is_some() {
            text("agnSED/agn.spec.gz")
        } else {
            Value::Text(None)
        },
        Value::Float(z),
    ]);
    values.extend(shape(0.0, 0.0));
    values.push(match agn_mag_norm {
        Some(_) => text(&format!(
            r#"{{"varMethodName": "applyAgn", "pars": {{"agn_sfu": 0.4, "agn_sfg": 0.35, "agn_sfr": 0.3, "agn_sfi": 0.25, "agn_sfz": 0.2, "agn_sfy": 0.18, "agn_tau": 200.0, "seed": {galtileid}, "t0_mjd": 59000.0}}}}"#
        )),
        None => Value::Text(None),
    });
    values.extend([
        Value::Int(galtileid * 1024),
        Value::Bool(false),
        Value::Bool(false),
        Value::Bool(false),
        Value::Text(None),
    ]);
    values
}

/// Galaxy 42 can host the lensed quasar, 43 the lensed supernova, and nothing
/// matches 44.
fn input_catalog(schema: Schema) -> Catalog {
    Catalog::from_value_rows(
        schema,
        vec![
            galaxy(42, 1.2, Some(22.0)),
            galaxy(43, 0.8, None),
            galaxy(44, 0.2, Some(18.0)),
        ],
    )
    .unwrap()
}
