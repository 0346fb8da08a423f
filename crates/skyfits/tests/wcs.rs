//! World coordinates of decoded images.

use approx::assert_abs_diff_eq;

use skyfits::image::{encode_image, primary_records};
use skyfits::wcs::tan::{deproject, project};
use skyfits::wcs::{angular_separation, normalize_ra, validate_declination};
use skyfits::{Error, FitsImage, HeaderRecord, LinearTransform, Samples, ValidationLimits};

fn image_with_wcs(extra: Vec<HeaderRecord>) -> FitsImage {
    let samples = Samples::F32(vec![0.0; 16 * 16]);
    let mut records = primary_records(&samples, &[16, 16]);
    records.extend(extra);
    FitsImage::decode(&encode_image(&records, &samples)).unwrap()
}

fn scenario_keywords() -> Vec<HeaderRecord> {
    vec![
        HeaderRecord::string("CTYPE1", "RA---TAN"),
        HeaderRecord::string("CTYPE2", "DEC--TAN"),
        HeaderRecord::new("CRPIX1", "512.5"),
        HeaderRecord::new("CRPIX2", "512.5"),
        HeaderRecord::new("CRVAL1", "185.0"),
        HeaderRecord::new("CRVAL2", "12.0"),
        HeaderRecord::new("CDELT1", "-0.0002777"),
        HeaderRecord::new("CDELT2", "0.0002777"),
        HeaderRecord::string("RADESYS", "ICRS"),
        HeaderRecord::new("EQUINOX", "2000.0"),
    ]
}

#[test]
fn reference_pixel_lookup() {
    let image = image_with_wcs(scenario_keywords());
    let (ra, dec) = image.world_at(511.5, 511.5).unwrap();
    assert_abs_diff_eq!(ra, 185.0, epsilon = 0.001);
    assert_abs_diff_eq!(dec, 12.0, epsilon = 0.001);

    let wcs = image.wcs().unwrap();
    assert_eq!(wcs.radesys.as_deref(), Some("ICRS"));
    assert_eq!(wcs.equinox, Some(2000.0));
    assert!(wcs.validate().is_empty());
}

#[test]
fn header_cd_matrix_round_trips_pixels() {
    let image = image_with_wcs(vec![
        HeaderRecord::string("CTYPE1", "RA---TAN"),
        HeaderRecord::string("CTYPE2", "DEC--TAN"),
        HeaderRecord::new("CRPIX1", "8.5"),
        HeaderRecord::new("CRPIX2", "8.5"),
        HeaderRecord::new("CRVAL1", "359.9"),
        HeaderRecord::new("CRVAL2", "-60.0"),
        HeaderRecord::new("CD1_1", "-1.9E-4"),
        HeaderRecord::new("CD1_2", "4.1E-5"),
        HeaderRecord::new("CD2_1", "3.8E-5"),
        HeaderRecord::new("CD2_2", "1.95E-4"),
    ]);
    let wcs = image.wcs().unwrap();
    assert!(matches!(wcs.transform, LinearTransform::Cd(_)));

    for (x, y) in [(0.0, 0.0), (15.0, 0.0), (15.0, 15.0), (3.25, 11.5)] {
        let (ra, dec) = wcs.pixel_to_world(x, y);
        assert!((0.0..360.0).contains(&ra));
        let (x2, y2) = wcs.world_to_pixel(ra, dec).unwrap();
        assert_abs_diff_eq!(x2, x, epsilon = 1e-6);
        assert_abs_diff_eq!(y2, y, epsilon = 1e-6);
    }
}

#[test]
fn field_geometry() {
    let image = image_with_wcs(scenario_keywords());
    let wcs = image.wcs().unwrap();
    let fov = wcs.field_of_view(3008, 3008);
    assert_abs_diff_eq!(fov.width_deg, 0.8353216, epsilon = 1e-6);
    assert_abs_diff_eq!(fov.diagonal_deg, fov.width_deg * 2f64.sqrt(), epsilon = 1e-9);

    let (ra, dec) = wcs.center(1024, 1024);
    assert_abs_diff_eq!(ra, 185.0, epsilon = 1e-12);
    assert_abs_diff_eq!(dec, 12.0, epsilon = 1e-12);
}

#[test]
fn partial_wcs_is_ignored() {
    let mut keywords = scenario_keywords();
    keywords.retain(|r| r.keyword != "CRPIX2");
    assert!(image_with_wcs(keywords).wcs().is_none());
}

#[test]
fn strict_limits_produce_warnings() {
    let image = image_with_wcs(scenario_keywords());
    let limits = ValidationLimits {
        min_arcsec_per_pixel: 1.5,
        max_arcsec_per_pixel: 10.0,
    };
    assert_eq!(image.wcs().unwrap().validate_with(&limits).len(), 2);
}

#[test]
fn tan_round_trip_property() {
    let mut worst: f64 = 0.0;
    for i in 0..50 {
        let ra0 = normalize_ra(i as f64 * 37.3);
        let dec0 = validate_declination(-85.0 + i as f64 * 3.4);
        let ra = normalize_ra(ra0 + (i % 7) as f64 - 3.0);
        let dec = validate_declination(dec0 + (i % 5) as f64 - 2.0);

        let (xi, eta) = project(ra, dec, ra0, dec0).unwrap();
        let (ra2, dec2) = deproject(xi, eta, ra0, dec0);
        worst = worst.max(angular_separation(ra, dec, ra2, dec2));
    }
    assert!(worst < 1e-8, "worst round-trip error {worst} deg");
}

#[test]
fn behind_tangent_plane_is_singular() {
    let image = image_with_wcs(scenario_keywords());
    assert!(matches!(
        image.wcs().unwrap().world_to_pixel(5.0, -12.0),
        Err(Error::ProjectionSingularity(_))
    ));
}

#[test]
fn normalization_properties() {
    for i in -100..100 {
        let v = i as f64 * 17.77;
        let ra = normalize_ra(v);
        assert!((0.0..360.0).contains(&ra));
        let dec = validate_declination(v);
        assert!((-90.0..=90.0).contains(&dec));
    }
}

#[test]
fn separation_properties() {
    let points = [(0.0, 0.0), (359.9, 45.0), (180.0, -89.5), (12.3, 4.5)];
    for &(ra1, dec1) in &points {
        assert_eq!(angular_separation(ra1, dec1, ra1, dec1), 0.0);
        for &(ra2, dec2) in &points {
            assert_eq!(
                angular_separation(ra1, dec1, ra2, dec2),
                angular_separation(ra2, dec2, ra1, dec1)
            );
        }
    }
}
