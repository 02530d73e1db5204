// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::io::Write;

use approx::assert_abs_diff_eq;
use indoc::indoc;
use tempfile::{NamedTempFile, TempDir};

use super::*;
use crate::tests::{agn_template, i_band, lens_system, sn_system, write_om10_fits, write_sne_csv};

#[test]
fn test_read_om10_fits() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("om10.fits");
    let mut quad = lens_system(12);
    quad.images.push(LensImage {
        x: 0.1,
        y: 0.2,
        magnification: 0.5,
        delay: 30.0,
    });
    quad.images.push(LensImage {
        x: -0.1,
        y: -0.2,
        magnification: -0.25,
        delay: 31.0,
    });
    let systems = vec![lens_system(7), quad];
    write_om10_fits(&path, &systems);

    let read = read_om10_fits(&path).unwrap();
    assert_eq!(read.len(), 2);
    for (expected, got) in systems.iter().zip(read.iter()) {
        assert_eq!(got.twinkles_id, expected.twinkles_id);
        assert_eq!(got.lens_id, expected.lens_id);
        assert_eq!(got.images.len(), expected.images.len());
        assert_abs_diff_eq!(got.source_redshift, expected.source_redshift);
        assert_abs_diff_eq!(got.source_mag_i, expected.source_mag_i);
        for (e, g) in expected.images.iter().zip(got.images.iter()) {
            assert_abs_diff_eq!(g.x, e.x);
            assert_abs_diff_eq!(g.y, e.y);
            assert_abs_diff_eq!(g.magnification, e.magnification);
            assert_abs_diff_eq!(g.delay, e.delay);
        }
        assert_eq!(got.lens.sed_filename, expected.lens.sed_filename);
        assert_abs_diff_eq!(got.lens.mag_norm, expected.lens.mag_norm);
        assert_abs_diff_eq!(got.lens.reff_arcsec, expected.lens.reff_arcsec);
        assert_abs_diff_eq!(got.lens.av, expected.lens.av);
        assert_abs_diff_eq!(got.lens.rv, expected.lens.rv);
    }
}

#[test]
fn test_lens_catalog_matched_mags() {
    let catalog =
        LensCatalog::with_template(vec![lens_system(7), lens_system(3)], &agn_template(), &i_band())
            .unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.get(3).unwrap().twinkles_id, 3);
    assert!(catalog.get(4).is_none());
    // The template is flat in f_ν, so the matched magNorm is the i-band
    // magnitude.
    for (_, matched) in catalog.iter() {
        assert_abs_diff_eq!(matched, 22.0, epsilon = 1e-4);
    }
}

#[test]
fn test_lens_catalog_rejects_duplicates() {
    let result = LensCatalog::with_mag_norms(vec![lens_system(7), lens_system(7)], vec![22.0, 22.0]);
    assert!(matches!(result, Err(CatalogLoadError::DuplicateSystem(7))));

    let result = LensCatalog::with_mag_norms(vec![lens_system(7)], vec![]);
    assert!(matches!(
        result,
        Err(CatalogLoadError::MatchedMagCount {
            num_systems: 1,
            num_mags: 0
        })
    ));
}

#[test]
fn test_missing_lens_catalog_is_an_error() {
    let result = LensCatalog::load("/does/not/exist.fits", &agn_template(), &i_band());
    assert!(matches!(result, Err(CatalogLoadError::Fits(_))));
}

#[test]
fn test_lens_axes() {
    let lens = crate::tests::lens_profile();
    let (major, minor) = lens.axes();
    let q = (1.0_f64 - 0.3).sqrt();
    assert_abs_diff_eq!(major, (0.8 / q / 3600.0_f64).to_radians(), epsilon = 1e-15);
    assert_abs_diff_eq!(minor, (0.8 * q / 3600.0_f64).to_radians(), epsilon = 1e-15);
    assert!(major > minor);
    assert_abs_diff_eq!(lens.catalog_position_angle(), -std::f64::consts::FRAC_PI_4, epsilon = 1e-15);
}

#[test]
fn test_read_sne_csv() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sne.csv");
    let systems = vec![sn_system(5), sn_system(2)];
    write_sne_csv(&path, &systems);

    let catalog = SnCatalog::load(&path).unwrap();
    assert_eq!(catalog.len(), 2);
    // First-appearance order is kept.
    let sysnos: Vec<u32> = catalog.iter().map(|s| s.sysno).collect();
    assert_eq!(sysnos, [5, 2]);

    let s = catalog.get(2).unwrap();
    assert_eq!(s.images.len(), 2);
    assert_abs_diff_eq!(s.source_redshift, 0.8);
    assert_abs_diff_eq!(s.lens.redshift, 0.3);
    assert_abs_diff_eq!(s.images[1].peak_mjd, 59600.0);
    assert_abs_diff_eq!(s.images[1].magnification, -1.8);
    // Not in the file, so defaults.
    assert_abs_diff_eq!(s.lens.av, 0.0);
    assert_abs_diff_eq!(s.lens.rv, 3.1);
}

#[test]
fn test_sne_csv_details() {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(
        indoc! {r#"
            # Columns can be in any order, and extras are ignored.
            imno,twinkles_sysno,zs,zl,x,y,t0,td,mu,x0,x1,c,lens_reff,lens_e,lens_phie,lens_sed,lens_magnorm,lens_av,lens_rv,extra
            1.0,3.0,0.7,0.2,0.5,0.5,60000.0,15.0,-2.0,1e-5,0.1,0.0,1.0,0.2,10.0,"galaxySED/a.gz",18.0,0.3,2.9,x
            0.0,3.0,0.7,0.2,-0.5,-0.5,60000.0,0.0,4.0,1e-5,0.1,0.0,1.0,0.2,10.0,"galaxySED/a.gz",18.0,0.3,2.9,x
        "#}
        .as_bytes(),
    )
    .unwrap();
    f.flush().unwrap();

    let catalog = SnCatalog::load(f.path()).unwrap();
    let s = catalog.get(3).unwrap();
    // Images are sorted by number.
    assert_eq!(s.images[0].index, 0);
    assert_eq!(s.images[1].index, 1);
    assert_abs_diff_eq!(s.images[1].peak_mjd, 60015.0);
    assert_eq!(s.lens.sed_filename, "galaxySED/a.gz");
    assert_abs_diff_eq!(s.lens.av, 0.3);
    assert_abs_diff_eq!(s.lens.rv, 2.9);
}

#[test]
fn test_bad_sne_csvs() {
    let write = |contents: &str| {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    };

    let f = write("twinkles_sysno,imno\n1,0\n");
    assert!(matches!(
        SnCatalog::load(f.path()),
        Err(CatalogLoadError::MissingCsvColumn { col: "zs", .. })
    ));

    let header = "twinkles_sysno,imno,zs,zl,x,y,t0,td,mu,x0,x1,c,lens_reff,lens_e,lens_phie,lens_sed,lens_magnorm\n";
    let line = "1,0,0.7,0.2,0.5,0.5,60000.0,15.0,-2.0,1e-5,0.1,0.0,1.0,0.2,10.0,sed.gz,18.0\n";

    let f = write(header);
    assert!(matches!(SnCatalog::load(f.path()), Err(CatalogLoadError::EmptyCsv { .. })));

    let f = write(&format!("{header}{line}{line}"));
    assert!(matches!(
        SnCatalog::load(f.path()),
        Err(CatalogLoadError::DuplicateImage { sysno: 1, imno: 0, .. })
    ));

    let f = write(&format!("{header}1,0,0.7\n"));
    assert!(matches!(
        SnCatalog::load(f.path()),
        Err(CatalogLoadError::CsvRowLength {
            line_num: 2,
            expected: 17,
            got: 3,
            ..
        })
    ));

    let f = write(&format!("{header}{}", line.replace("0.7", "seven")));
    assert!(matches!(
        SnCatalog::load(f.path()),
        Err(CatalogLoadError::CsvParse { col: "zs", .. })
    ));
}
