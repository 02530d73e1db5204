// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Turning a host galaxy into a lens galaxy plus the images of its lensed
//! source.

use log::trace;

use super::{IdScheme, SprinklerError};
use crate::{
    catalog::{HostKind, SourceRow, SprinkleRole},
    constants::SENTINEL_MAG_NORM,
    lenses::{LensProfile, LensSystem, SnSystem},
    supernova::{SnSedSynthesizer, SnSpectrumModel},
    variability::VarParamBlob,
};

/// The magnitude change due to a magnification. Negative magnifications are
/// parity-flipped images; only the size matters.
pub(crate) fn lensing_delta_mag(magnification: f64) -> f64 {
    2.5 * magnification.abs().log10()
}

/// The skeleton of an image row: the host moved by the image offset, with no
/// resolved light, at the source redshift, with its new ID.
#[allow(clippy::too_many_arguments)]
fn image_base(
    host: &SourceRow,
    kind: HostKind,
    system_id: u32,
    image_index: u32,
    (dx, dy): (f64, f64),
    source_redshift: f64,
    id_scheme: IdScheme,
    flag_sprinkled: bool,
) -> Result<SourceRow, SprinklerError> {
    let mut image = host.clone();
    for c in image.components_mut() {
        c.offset_arcsec(dx, dy);
    }
    image.bulge.clear_shape(Some(SENTINEL_MAG_NORM));
    image.disk.clear_shape(Some(SENTINEL_MAG_NORM));
    image.set_redshift(source_redshift);
    image.galtileid = id_scheme.encode(host.galtileid, system_id, image_index)?;
    image.sn_truth_params = None;
    image.role = SprinkleRole::LensedImage {
        host: kind,
        system_id,
        image_index,
        host_tile_id: host.galtileid,
    };
    if flag_sprinkled {
        image.mark_sprinkled();
    }
    Ok(image)
}

/// The image rows of a lensed AGN. The host's AGN is dimmed or brightened by
/// each image's magnification, and its variability is delayed by the image's
/// time delay.
pub(crate) fn agn_images(
    host: &SourceRow,
    system: &LensSystem,
    id_scheme: IdScheme,
    flag_sprinkled: bool,
) -> Result<Vec<SourceRow>, SprinklerError> {
    let blob = host
        .agn_var_params
        .as_deref()
        .map(VarParamBlob::from_json)
        .transpose()?;

    let mut images = Vec::with_capacity(system.images.len());
    for (i, lensed) in system.images.iter().enumerate() {
        let mut image = image_base(
            host,
            HostKind::Agn,
            system.twinkles_id,
            i as u32,
            (lensed.x, lensed.y),
            system.source_redshift,
            id_scheme,
            flag_sprinkled,
        )?;
        image.agn.mag_norm = host
            .agn
            .mag_norm
            .map(|m| m - lensing_delta_mag(lensed.magnification));
        image.agn_var_params = match &blob {
            Some(b) => Some(b.clone().with_time_delay(lensed.delay).to_json()?),
            None => None,
        };
        trace!(
            "AGN image {i} of system {} at host {}: id {}, magNorm {:?}",
            system.twinkles_id,
            host.galtileid,
            image.galtileid,
            image.agn.mag_norm
        );
        images.push(image);
    }
    Ok(images)
}

/// The image rows of a lensed supernova that are on at `mjd`, and the number
/// of images that weren't.
pub(crate) fn sn_images<M: SnSpectrumModel>(
    host: &SourceRow,
    system: &SnSystem,
    synthesizer: &SnSedSynthesizer<M>,
    mjd: f64,
    id_scheme: IdScheme,
    flag_sprinkled: bool,
) -> Result<(Vec<SourceRow>, usize), SprinklerError> {
    let mut images = Vec::with_capacity(system.images.len());
    let mut omitted = 0;
    for lensed in system.images.iter() {
        let mut image = image_base(
            host,
            HostKind::Sn,
            system.sysno,
            lensed.index,
            (lensed.x, lensed.y),
            system.source_redshift,
            id_scheme,
            flag_sprinkled,
        )?;

        let sed = synthesizer.synthesize(system, lensed, image.agn.radec, mjd)?;
        let (Some(mag_norm), Some(sed_filename)) = (sed.mag_norm, sed.sed_filename.clone()) else {
            omitted += 1;
            continue;
        };
        image.agn.mag_norm = Some(mag_norm - lensing_delta_mag(lensed.magnification));
        image.agn.sed_filename = Some(sed_filename);
        image.agn.major_axis = 0.0;
        image.agn.minor_axis = 0.0;
        image.agn.position_angle = 0.0;
        image.agn_var_params = None;
        image.sn_truth_params = Some(sed.params_json()?);
        trace!(
            "SN image {} of system {} at host {}: id {}, magNorm {:?}",
            lensed.index,
            system.sysno,
            host.galtileid,
            image.galtileid,
            image.agn.mag_norm
        );
        images.push(image);
    }
    Ok((images, omitted))
}

/// Turn a host row into the lens galaxy of a system. The lens's light goes in
/// the bulge; the AGN is removed and the disk gets the sentinel magNorm.
pub(crate) fn make_lens_galaxy(
    row: &mut SourceRow,
    kind: HostKind,
    system_id: u32,
    lens: &LensProfile,
    flag_sprinkled: bool,
) {
    row.agn.clear_shape(None);
    row.agn_var_params = None;
    row.sn_truth_params = None;
    row.disk.clear_shape(Some(SENTINEL_MAG_NORM));

    let (major, minor) = lens.axes();
    let bulge = &mut row.bulge;
    bulge.sed_filename = Some(lens.sed_filename.clone());
    bulge.mag_norm = Some(lens.mag_norm);
    bulge.major_axis = major;
    bulge.minor_axis = minor;
    bulge.position_angle = lens.catalog_position_angle();
    bulge.internal_av = lens.av;
    bulge.internal_rv = lens.rv;

    row.set_redshift(lens.redshift);
    row.role = SprinkleRole::LensGalaxy {
        host: kind,
        system_id,
    };
    if flag_sprinkled {
        row.mark_sprinkled();
    }
}
