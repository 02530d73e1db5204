// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Helpful functions for tests: synthetic catalogs, SEDs and models.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use fitsio::{
    tables::{ColumnDataType, ColumnDescription},
    FitsFile,
};
use marlu::RADec;
use vec1::vec1;

use crate::{
    catalog::{Catalog, Component, Schema, SourceRow},
    constants::{AB_ZERO_POINT_JY, SPEED_OF_LIGHT},
    lenses::{LensImage, LensProfile, LensSystem, SnImage, SnSystem},
    photometry::{Bandpass, Sed},
    supernova::{SnParams, SnSpectrumModel},
};

/// Every column the sprinkler knows about, in a legacy (4-image) order.
pub(crate) const LEGACY_COLUMNS: [&str; 40] = [
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
    // Not used by the sprinkler; must be carried through.
    "galaxyBulge_objectId",
    "galaxyBulge_is_sprinkled",
    "galaxyDisk_is_sprinkled",
    "galaxyAgn_is_sprinkled",
    "fieldRA",
];

pub(crate) fn legacy_schema() -> Schema {
    Schema::from_names(&LEGACY_COLUMNS).unwrap()
}

/// The legacy columns plus `sn_truth_params`, which makes the extended
/// (8-image) ID scheme apply.
pub(crate) fn extended_schema() -> Schema {
    let mut names = LEGACY_COLUMNS.to_vec();
    names.push("sn_truth_params");
    Schema::from_names(&names).unwrap()
}

/// An SED with a constant f_ν corresponding to AB magnitude `mag`, from
/// `min` to `max` nm.
pub(crate) fn flat_fnu_sed(mag: f64, min: f64, max: f64) -> Sed {
    let fnu_jy = AB_ZERO_POINT_JY * 10_f64.powf(-0.4 * mag);
    let n = (max - min).round() as usize;
    let wavelen: Vec<f64> = (0..=n).map(|i| min + i as f64).collect();
    let flambda = wavelen
        .iter()
        .map(|w| fnu_jy / (w * w * 1e-9 / SPEED_OF_LIGHT * 1e23))
        .collect();
    Sed::new(wavelen, flambda).unwrap()
}

/// A flat-f_ν AGN template. Redshifting it changes all magnitudes by the same
/// amount, so the matched magNorm of a system is its i-band magnitude.
pub(crate) fn agn_template() -> Sed {
    flat_fnu_sed(20.0, 50.0, 3000.0)
}

/// A top-hat stand-in for the LSST i band.
pub(crate) fn i_band() -> Bandpass {
    let wavelen: Vec<f64> = (0..=130).map(|i| 690.0 + i as f64).collect();
    let sb = vec![1.0; wavelen.len()];
    Bandpass::new(wavelen, sb).unwrap()
}

pub(crate) fn lens_profile() -> LensProfile {
    LensProfile {
        redshift: 0.5,
        reff_arcsec: 0.8,
        ellipticity: 0.3,
        position_angle_deg: 45.0,
        sed_filename: "galaxySED/Burst.25E09.1Z.spec.gz".to_string(),
        mag_norm: 19.5,
        av: 0.1,
        rv: 3.1,
    }
}

/// A two-image lensed quasar at z = 1.2 with an unlensed i-band magnitude of
/// 22.
pub(crate) fn lens_system(twinkles_id: u32) -> LensSystem {
    LensSystem {
        twinkles_id,
        lens_id: 1000 + twinkles_id as i64,
        source_redshift: 1.2,
        source_mag_i: 22.0,
        images: vec1![
            LensImage {
                x: 0.5,
                y: -0.3,
                magnification: 3.0,
                delay: 0.0,
            },
            LensImage {
                x: -0.2,
                y: 0.9,
                magnification: -1.5,
                delay: 12.4,
            }
        ],
        lens: lens_profile(),
    }
}

/// A lensed supernova at z = 0.8 with two images, peaking on MJD 59580 and
/// 59580 + 20.
pub(crate) fn sn_system(sysno: u32) -> SnSystem {
    let image = |index: u32, x: f64, y: f64, mu: f64, td: f64| SnImage {
        index,
        x,
        y,
        magnification: mu,
        delay: td,
        peak_mjd: 59580.0 + td,
        x0: 1e-5,
        x1: 0.5,
        c: 0.05,
    };
    SnSystem {
        sysno,
        source_redshift: 0.8,
        images: vec1![image(0, 0.6, 0.1, 2.5, 0.0), image(1, -0.4, -0.7, -1.8, 20.0)],
        lens: LensProfile {
            redshift: 0.3,
            ..lens_profile()
        },
    }
}

/// Write lens systems as an OM10 FITS table.
pub(crate) fn write_om10_fits(path: &Path, systems: &[LensSystem]) {
    const REPEAT: usize = 4;
    let mut fptr = FitsFile::create(path).open().unwrap();
    let int_col = |name: &str| {
        ColumnDescription::new(name)
            .with_type(ColumnDataType::Int)
            .create()
            .unwrap()
    };
    let double_col = |name: &str, repeat: usize| {
        ColumnDescription::new(name)
            .with_type(ColumnDataType::Double)
            .that_repeats(repeat)
            .create()
            .unwrap()
    };
    let sed_col = ColumnDescription::new("lens_sed")
        .with_type(ColumnDataType::String)
        .that_repeats(64)
        .create()
        .unwrap();
    let hdu = fptr
        .create_table(
            "OM10",
            &[
                int_col("LENSID"),
                int_col("twinklesId"),
                int_col("NIMG"),
                double_col("ZLENS", 1),
                double_col("ZSRC", 1),
                double_col("MAGI_IN", 1),
                double_col("XIMG", REPEAT),
                double_col("YIMG", REPEAT),
                double_col("MAG", REPEAT),
                double_col("DELAY", REPEAT),
                double_col("REFF", 1),
                double_col("ELLIP", 1),
                double_col("PHIE", 1),
                sed_col,
                double_col("sed_magNorm", 6),
                double_col("lens_av", 1),
                double_col("lens_rv", 1),
            ],
        )
        .unwrap();

    fn scalar(systems: &[LensSystem], f: impl Fn(&LensSystem) -> f64) -> Vec<f64> {
        systems.iter().map(f).collect()
    }
    fn ints(systems: &[LensSystem], f: impl Fn(&LensSystem) -> i32) -> Vec<i32> {
        systems.iter().map(f).collect()
    }
    fn per_image(systems: &[LensSystem], f: impl Fn(&LensImage) -> f64) -> Vec<f64> {
        let mut v = vec![0.0; systems.len() * REPEAT];
        for (i, s) in systems.iter().enumerate() {
            for (j, image) in s.images.iter().enumerate() {
                v[i * REPEAT + j] = f(image);
            }
        }
        v
    }

    hdu.write_col(&mut fptr, "LENSID", &ints(systems, |s| s.lens_id as i32)).unwrap();
    hdu.write_col(&mut fptr, "twinklesId", &ints(systems, |s| s.twinkles_id as i32)).unwrap();
    hdu.write_col(&mut fptr, "NIMG", &ints(systems, |s| s.images.len() as i32)).unwrap();
    hdu.write_col(&mut fptr, "ZLENS", &scalar(systems, |s| s.lens.redshift)).unwrap();
    hdu.write_col(&mut fptr, "ZSRC", &scalar(systems, |s| s.source_redshift)).unwrap();
    hdu.write_col(&mut fptr, "MAGI_IN", &scalar(systems, |s| s.source_mag_i)).unwrap();
    hdu.write_col(&mut fptr, "XIMG", &per_image(systems, |i| i.x)).unwrap();
    hdu.write_col(&mut fptr, "YIMG", &per_image(systems, |i| i.y)).unwrap();
    hdu.write_col(&mut fptr, "MAG", &per_image(systems, |i| i.magnification)).unwrap();
    hdu.write_col(&mut fptr, "DELAY", &per_image(systems, |i| i.delay)).unwrap();
    hdu.write_col(&mut fptr, "REFF", &scalar(systems, |s| s.lens.reff_arcsec)).unwrap();
    hdu.write_col(&mut fptr, "ELLIP", &scalar(systems, |s| s.lens.ellipticity)).unwrap();
    hdu.write_col(&mut fptr, "PHIE", &scalar(systems, |s| s.lens.position_angle_deg)).unwrap();
    let seds: Vec<String> = systems.iter().map(|s| s.lens.sed_filename.clone()).collect();
    hdu.write_col(&mut fptr, "lens_sed", &seds).unwrap();
    // Only the first of the 6 magNorms is used.
    let mag_norms: Vec<f64> = systems
        .iter()
        .flat_map(|s| [s.lens.mag_norm, 99.0, 99.0, 99.0, 99.0, 99.0])
        .collect();
    hdu.write_col(&mut fptr, "sed_magNorm", &mag_norms).unwrap();
    hdu.write_col(&mut fptr, "lens_av", &scalar(systems, |s| s.lens.av)).unwrap();
    hdu.write_col(&mut fptr, "lens_rv", &scalar(systems, |s| s.lens.rv)).unwrap();
}

/// Write SN systems as an SN catalog CSV. The lens extinction columns are
/// left out.
pub(crate) fn write_sne_csv(path: &Path, systems: &[SnSystem]) {
    let mut f = BufWriter::new(File::create(path).unwrap());
    writeln!(
        f,
        "twinkles_sysno,imno,zs,zl,x,y,t0,td,mu,x0,x1,c,lens_reff,lens_e,lens_phie,lens_sed,lens_magnorm"
    )
    .unwrap();
    for s in systems {
        for i in s.images.iter() {
            writeln!(
                f,
                "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
                s.sysno,
                i.index,
                s.source_redshift,
                s.lens.redshift,
                i.x,
                i.y,
                i.peak_mjd - i.delay,
                i.delay,
                i.magnification,
                i.x0,
                i.x1,
                i.c,
                s.lens.reff_arcsec,
                s.lens.ellipticity,
                s.lens.position_angle_deg,
                s.lens.sed_filename,
                s.lens.mag_norm,
            )
            .unwrap();
        }
    }
    f.flush().unwrap();
}

fn component(ra_deg: f64, dec_deg: f64, mag_norm: Option<f64>, sed: Option<&str>, z: f64) -> Component {
    Component {
        radec: RADec {
            ra: ra_deg.to_radians(),
            dec: dec_deg.to_radians(),
        },
        mag_norm,
        sed_filename: sed.map(|s| s.to_string()),
        redshift: z,
        major_axis: 2e-6,
        minor_axis: 1e-6,
        position_angle: 0.7,
        sindex: 4.0,
        internal_av: 0.2,
        internal_rv: 3.1,
        is_sprinkled: false,
    }
}

/// A galaxy with an AGN. `seed` goes into the AGN's variability parameters.
pub(crate) fn agn_host(galtileid: u64, z: f64, agn_mag_norm: f64) -> SourceRow {
    let (ra, dec) = (53.0 + galtileid as f64 * 1e-4, -27.5);
    let mut row = SourceRow::new(galtileid);
    row.bulge = component(ra, dec, Some(21.0), Some("galaxySED/bulge.spec.gz"), z);
    row.disk = component(ra, dec, Some(20.5), Some("galaxySED/disk.spec.gz"), z);
    row.agn = component(ra, dec, Some(agn_mag_norm), Some("agnSED/agn.spec.gz"), z);
    row.agn.major_axis = 0.0;
    row.agn.minor_axis = 0.0;
    row.agn_var_params = Some(format!(
        r#"{{"varMethodName": "applyAgn", "pars": {{"agn_sfu": 0.4, "agn_sfg": 0.35, "agn_sfr": 0.3, "agn_sfi": 0.25, "agn_sfz": 0.2, "agn_sfy": 0.18, "agn_tau": 200.0, "seed": {galtileid}, "t0_mjd": 59000.0}}}}"#
    ));
    row.passthrough = vec![
        crate::catalog::Value::Int(galtileid as i64 * 1024),
        crate::catalog::Value::Float(53.0),
    ];
    row
}

/// A galaxy without an AGN.
pub(crate) fn sn_host(galtileid: u64, z: f64) -> SourceRow {
    let mut row = agn_host(galtileid, z, 0.0);
    row.agn.mag_norm = None;
    row.agn.sed_filename = None;
    row.agn_var_params = None;
    row
}

/// Make a catalog out of rows.
pub(crate) fn catalog(schema: Schema, rows: Vec<SourceRow>) -> Catalog {
    let mut c = Catalog::new(schema);
    for row in rows {
        c.push(row);
    }
    c
}

/// Write a synthetic SALT2 model into `dir`. The M0 surface is a Gaussian in
/// phase (σ = 10 days) that is flat in wavelength; M1 is a tenth of M0. The
/// colour law has a single coefficient.
pub(crate) fn write_salt2_model(dir: &Path) {
    let phases: Vec<f64> = (-20..=50).map(|p| p as f64).collect();
    let wavelengths: Vec<f64> = (0..=360).map(|i| 2000.0 + 20.0 * i as f64).collect();
    for (file, scale) in [("salt2_template_0.dat", 1.0), ("salt2_template_1.dat", 0.1)] {
        let mut f = BufWriter::new(File::create(dir.join(file)).unwrap());
        for p in &phases {
            let value = scale * (-p * p / 200.0).exp();
            for w in &wavelengths {
                writeln!(f, "{p} {w} {value}").unwrap();
            }
        }
        f.flush().unwrap();
    }
    std::fs::write(
        dir.join("salt2_color_correction.dat"),
        "1\n-0.5\nSalt2ExtinctionLaw.version 1\nSalt2ExtinctionLaw.min_lambda 2800\nSalt2ExtinctionLaw.max_lambda 7000\n",
    )
    .unwrap();
}

/// A supernova that shines with a constant spectrum for 30 days either side of
/// its peak.
#[derive(Debug, Clone)]
pub(crate) struct TopHatSn;

impl SnSpectrumModel for TopHatSn {
    fn flux(&self, params: &SnParams, mjd: f64, wavelen_angstrom: &[f64]) -> Vec<f64> {
        let on = (mjd - params.t0).abs() < 30.0;
        wavelen_angstrom
            .iter()
            .map(|_| if on { params.x0 * 1e-10 } else { 0.0 })
            .collect()
    }
}
