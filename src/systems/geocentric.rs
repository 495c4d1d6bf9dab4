use crate::{
    coordinate::{CoordRole, Precision},
    ellipsoid::WGS84,
    point::{BlhPoint, Point, PointKind},
    Error,
};

use super::{geodetic::sample_blh, kind_mismatch, CoordinateSystem, SystemId};

/// Earth-centred, earth-fixed Cartesian coordinates on the WGS-84 ellipsoid.
pub struct GeocentricSystem {
    name: String,
}

impl GeocentricSystem {
    pub(crate) fn new() -> GeocentricSystem {
        Self { name: "WGS 84 / ECEF".to_string() }
    }
}

impl CoordinateSystem for GeocentricSystem {
    fn id(&self) -> SystemId {
        SystemId::Geocentric
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> PointKind {
        PointKind::Cartesian
    }

    fn roles(&self) -> [CoordRole; 3] {
        [CoordRole::X, CoordRole::Y, CoordRole::Z]
    }

    fn precisions(&self) -> [Precision; 3] {
        [Precision::Fixed(3); 3]
    }

    fn to_wgs84(&self, point: &Point) -> Result<BlhPoint, Error> {
        match point {
            Point::Cartesian(p) => WGS84.get_blh(p),
            other => Err(kind_mismatch(self, other)),
        }
    }

    fn from_wgs84(&self, point: &BlhPoint) -> Result<Point, Error> {
        Ok(Point::Cartesian(WGS84.get_xyz(point)))
    }

    fn sample_point(&self) -> Point {
        Point::Cartesian(WGS84.get_xyz(&sample_blh()))
    }

    /// Here `n` is X and `e` is Y. Points on the polar axis have no
    /// longitude and are not valid.
    fn coordinates_valid(&self, n: f64, e: f64) -> bool {
        n.is_finite() && e.is_finite() && n.hypot(e) > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::XyzPoint;
    use approx::assert_relative_eq;

    #[test]
    fn round_trip_through_wgs84() {
        let system = GeocentricSystem::new();
        let p = BlhPoint::new("p", -0.4, 2.2, 250.0);

        let xyz = system.from_wgs84(&p).unwrap();
        let back = system.to_wgs84(&xyz).unwrap();

        assert_relative_eq!(back.b, p.b, epsilon = 1e-6);
        assert_relative_eq!(back.l, p.l, epsilon = 1e-9);
        assert_relative_eq!(back.h, p.h, epsilon = 1e-3);
    }

    #[test]
    fn polar_axis_fails_and_is_invalid() {
        let system = GeocentricSystem::new();
        let pole = Point::Cartesian(XyzPoint::new("np", 0.0, 0.0, 6_356_752.3));

        assert!(matches!(system.to_wgs84(&pole), Err(Error::Domain { .. })));
        assert!(!system.coordinates_valid(0.0, 0.0));
        assert!(system.coordinates_valid(6_378_137.0, 0.0));
    }
}
