use std::f64::consts::{FRAC_PI_2, PI};

use crate::{
    constants::wgs72,
    coordinate::{CoordRole, Precision},
    point::{BlhPoint, Point, PointKind},
    utility::arcsec_to_radians,
    Error,
};

use super::{kind_mismatch, CoordinateSystem, SystemId};

const ROLES: [CoordRole; 3] = [CoordRole::Latitude, CoordRole::Longitude, CoordRole::Height];
const PRECISIONS: [Precision; 3] = [Precision::Dms(4), Precision::Dms(4), Precision::Fixed(3)];

// Royal Observatory, Greenwich
const SAMPLE_LAT: f64 = 51.477_8;
const SAMPLE_LON: f64 = -0.001_5;
const SAMPLE_HEIGHT: f64 = 45.0;

/// Latitude and longitude validity shared by all geodetic systems: `n` is the
/// latitude and `e` the longitude, both in radians.
///
/// ```
/// use geodatum::systems::geodetic::geodetic_coordinates_valid;
///
/// assert!(geodetic_coordinates_valid(1.0, -3.0));
/// assert!(!geodetic_coordinates_valid(1.6, 0.0));
/// assert!(!geodetic_coordinates_valid(0.0, 3.2));
/// ```
pub fn geodetic_coordinates_valid(n: f64, e: f64) -> bool {
    n.abs() <= FRAC_PI_2 && e.abs() <= PI
}

pub(crate) fn sample_blh() -> BlhPoint {
    BlhPoint::from_degrees("sample", SAMPLE_LAT, SAMPLE_LON, SAMPLE_HEIGHT)
}

/// WGS-84 geodetic coordinates. Both conversions are the identity.
pub struct Wgs84System {
    name: String,
}

impl Wgs84System {
    pub(crate) fn new() -> Wgs84System {
        Self { name: "WGS 84".to_string() }
    }
}

impl CoordinateSystem for Wgs84System {
    fn id(&self) -> SystemId {
        SystemId::Wgs84
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> PointKind {
        PointKind::Geodetic
    }

    fn roles(&self) -> [CoordRole; 3] {
        ROLES
    }

    fn precisions(&self) -> [Precision; 3] {
        PRECISIONS
    }

    fn to_wgs84(&self, point: &Point) -> Result<BlhPoint, Error> {
        match point {
            Point::Geodetic(p) => Ok(p.clone()),
            other => Err(kind_mismatch(self, other)),
        }
    }

    fn from_wgs84(&self, point: &BlhPoint) -> Result<Point, Error> {
        Ok(Point::Geodetic(point.clone()))
    }

    fn sample_point(&self) -> Point {
        Point::Geodetic(sample_blh())
    }

    fn coordinates_valid(&self, n: f64, e: f64) -> bool {
        geodetic_coordinates_valid(n, e)
    }
}

/// WGS-72 geodetic coordinates, related to WGS-84 by the DoD empirical
/// datum shift.
pub struct Wgs72System {
    name: String,
}

impl Wgs72System {
    pub(crate) fn new() -> Wgs72System {
        Self { name: "WGS 72".to_string() }
    }
}

impl CoordinateSystem for Wgs72System {
    fn id(&self) -> SystemId {
        SystemId::Wgs72
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> PointKind {
        PointKind::Geodetic
    }

    fn roles(&self) -> [CoordRole; 3] {
        ROLES
    }

    fn precisions(&self) -> [Precision; 3] {
        PRECISIONS
    }

    fn to_wgs84(&self, point: &Point) -> Result<BlhPoint, Error> {
        match point {
            Point::Geodetic(p) => Ok(wgs72_to_wgs84(p)),
            other => Err(kind_mismatch(self, other)),
        }
    }

    fn from_wgs84(&self, point: &BlhPoint) -> Result<Point, Error> {
        Ok(Point::Geodetic(wgs84_to_wgs72(point)))
    }

    fn sample_point(&self) -> Point {
        Point::Geodetic(sample_blh())
    }

    fn coordinates_valid(&self, n: f64, e: f64) -> bool {
        geodetic_coordinates_valid(n, e)
    }
}

/// Corrections to add to WGS-72 coordinates to obtain WGS-84 ones.
#[derive(Clone, Copy, Debug)]
struct DatumShift {
    b: f64,
    l: f64,
    h: f64,
}

// Shift as a function of latitude (radians)
fn wgs72_shift(phi: f64) -> DatumShift {
    let (sin_phi, cos_phi) = phi.sin_cos();

    DatumShift {
        b: wgs72::DELTA_Z * cos_phi / wgs72::A + wgs72::DELTA_F * (2.0 * phi).sin(),
        l: arcsec_to_radians(wgs72::DELTA_LAMBDA_SEC),
        h: wgs72::DELTA_Z * sin_phi + wgs72::A * wgs72::DELTA_F * sin_phi.powi(2) - wgs72::DELTA_A
            + wgs72::DELTA_R,
    }
}

/// Shifts a WGS-72 point to WGS-84, evaluating the corrections at the WGS-72
/// latitude.
///
/// # Usage
///
/// ```
/// use geodatum::{systems::wgs72_to_wgs84, BlhPoint};
///
/// let p = wgs72_to_wgs84(&BlhPoint::new("p", 0.0, 0.0, 0.0));
///
/// // At the equator only the longitude shift and height terms remain
/// assert!((p.b - 4.5 / 6_378_135.0).abs() < 1e-15);
/// assert!((p.h - (1.4 - 2.0)).abs() < 1e-12);
/// ```
pub fn wgs72_to_wgs84(point: &BlhPoint) -> BlhPoint {
    let shift = wgs72_shift(point.b);

    BlhPoint {
        id: point.id.clone(),
        b: point.b + shift.b,
        l: point.l + shift.l,
        h: point.h + shift.h,
        tags: point.tags.clone(),
    }
}

/// Shifts a WGS-84 point to WGS-72. The corrections are evaluated at the
/// WGS-84 latitude, so this is only an approximate inverse of
/// [`wgs72_to_wgs84`].
pub fn wgs84_to_wgs72(point: &BlhPoint) -> BlhPoint {
    let shift = wgs72_shift(point.b);

    BlhPoint {
        id: point.id.clone(),
        b: point.b - shift.b,
        l: point.l - shift.l,
        h: point.h - shift.h,
        tags: point.tags.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::{Tags, XyzPoint};
    use approx::assert_relative_eq;

    #[test]
    fn wgs84_is_identity_both_ways() {
        let mut tags = Tags::new();
        tags.insert("code".to_string(), "BM-4".to_string());
        let p = BlhPoint::new("bm", 0.77, -1.9, 312.25).with_tags(tags);
        let system = Wgs84System::new();

        assert_eq!(system.to_wgs84(&Point::Geodetic(p.clone())).unwrap(), p);
        assert_eq!(system.from_wgs84(&p).unwrap(), Point::Geodetic(p));
    }

    #[test]
    fn shift_round_trip_is_sub_millimeter() {
        for (b, l, h) in [(0.0, 0.0, 0.0), (0.9, 0.3, 100.0), (-1.3, 2.8, -40.0), (1.5, -3.1, 9000.0)] {
            let p = BlhPoint::new("p", b, l, h);
            let back = wgs84_to_wgs72(&wgs72_to_wgs84(&p));
            assert_relative_eq!(back.b, b, epsilon = 1e-9);
            assert_relative_eq!(back.l, l, epsilon = 1e-9);
            assert_relative_eq!(back.h, h, epsilon = 1e-3);
        }
    }

    #[test]
    fn shift_magnitudes_match_published_values() {
        let shift = wgs72_shift(45_f64.to_radians());
        // 0.554" east
        assert_relative_eq!(shift.l.to_degrees() * 3600.0, 0.554, epsilon = 1e-12);
        // dH = 4.5 sin + a df sin^2 - 2.0 + 1.4 at 45 degrees
        let expected_h = 4.5 * 0.5_f64.sqrt() + 6_378_135.0 * 0.312_105_7e-7 * 0.5 - 0.6;
        assert_relative_eq!(shift.h, expected_h, epsilon = 1e-12);
    }

    #[test]
    fn cartesian_points_are_refused() {
        let system = Wgs72System::new();
        let xyz = Point::Cartesian(XyzPoint::new("c", 1.0, 2.0, 3.0));
        match system.to_wgs84(&xyz) {
            Err(Error::PointKind { expected, found, .. }) => {
                assert_eq!(expected, PointKind::Geodetic);
                assert_eq!(found, PointKind::Cartesian);
            }
            other => panic!("expected kind mismatch, got {other:?}"),
        }
    }
}
