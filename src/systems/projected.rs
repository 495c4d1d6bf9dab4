use log::warn;

use crate::{
    constants::{GK_FALSE_EASTING, GK_K0, GK_ZONE_BAND, UTM_FALSE_EASTING, UTM_K0, UTM_SOUTH_FALSE_NORTHING},
    coordinate::{CoordRole, Precision},
    ellipsoid::WGS84,
    point::{BlhPoint, Point, PointKind, ProjectedPoint},
    projections::{transverse_mercator::TransverseMercator, web_mercator::{WebMercator, MAX_LATITUDE}},
    utility::{dms, GeoMath},
    Error, ThisOrThat,
};

use super::{kind_mismatch, require_finite, CoordinateSystem, SystemId};

const ROLES: [CoordRole; 3] = [CoordRole::Easting, CoordRole::Northing, CoordRole::Height];
const PRECISIONS: [Precision; 3] = [Precision::Fixed(3); 3];

// UTM limits in 100 km tiles, indexed by northp
const TILE: f64 = 100_000.;
const MIN_EASTING: f64 = 1.;
const MAX_EASTING: f64 = 9.;
const MIN_NORTHING: [f64; 2] = [10., -90.];
const MAX_NORTHING: [f64; 2] = [195., 95.];

// Latitude of the sample point, mirrored for southern zones
const SAMPLE_LAT: f64 = 45.;
// Offset of the sample point from the central meridian
const SAMPLE_DLON: f64 = 1.;

/// A transverse Mercator zone: central meridian plus false origin.
struct TmZone {
    lon0: f64,
    false_easting: f64,
    false_northing: f64,
    tm: TransverseMercator,
}

impl TmZone {
    fn new(lon0: f64, k0: f64, false_easting: f64, false_northing: f64) -> TmZone {
        Self {
            lon0,
            false_easting,
            false_northing,
            tm: TransverseMercator::new(&WGS84, k0),
        }
    }

    fn project(&self, point: &BlhPoint) -> ProjectedPoint {
        let (x, y) = self.tm.from_latlon(self.lon0, point.b.to_degrees(), point.l.to_degrees());

        ProjectedPoint {
            id: point.id.clone(),
            easting: x + self.false_easting,
            northing: y + self.false_northing,
            height: point.h,
            tags: point.tags.clone(),
        }
    }

    fn unproject(&self, point: &ProjectedPoint) -> Result<BlhPoint, Error> {
        require_finite(&point.id, &[point.easting, point.northing, point.height])?;

        let (lat, lon) = self.tm.to_latlon(
            self.lon0,
            point.easting - self.false_easting,
            point.northing - self.false_northing,
        );
        require_finite(&point.id, &[lat, lon])?;

        Ok(BlhPoint {
            id: point.id.clone(),
            b: lat.to_radians(),
            l: lon.to_radians(),
            h: point.height,
            tags: point.tags.clone(),
        })
    }

    fn sample(&self, north: bool) -> Point {
        let lat = north.ternary(SAMPLE_LAT, -SAMPLE_LAT);
        let blh = BlhPoint::from_degrees("sample", lat, self.lon0 + SAMPLE_DLON, 0.0);
        Point::Projected(self.project(&blh))
    }

    // Only the hemisphere facing the central meridian is projected; this
    // also rejects the singular points on the equator and NaN input
    fn checked_project(&self, point: &BlhPoint) -> Result<Point, Error> {
        let dlon = self.lon0.ang_diff(point.l.to_degrees());
        let projected = (dlon.abs() < f64::from(dms::QD)).then(|| self.project(point));

        match projected {
            Some(p) if p.easting.is_finite() && p.northing.is_finite() => Ok(Point::Projected(p)),
            _ => {
                warn!("Point {} cannot be projected about central meridian {}", point.id, self.lon0);
                Err(Error::Domain {
                    id: point.id.clone(),
                    msg: format!("no projection about central meridian {}", self.lon0),
                })
            }
        }
    }
}

/// UTM zone on WGS-84. Coordinates are easting, northing, height in meters.
pub struct UtmSystem {
    name: String,
    zone: u8,
    north: bool,
    inner: TmZone,
}

impl UtmSystem {
    pub(crate) fn new(zone: u8, north: bool) -> UtmSystem {
        Self {
            name: format!("WGS 84 / UTM zone {zone}{}", north.ternary('N', 'S')),
            zone,
            north,
            inner: TmZone::new(
                central_meridian(zone),
                UTM_K0,
                UTM_FALSE_EASTING,
                north.ternary(0., UTM_SOUTH_FALSE_NORTHING),
            ),
        }
    }

    pub fn zone(&self) -> u8 {
        self.zone
    }

    pub fn is_north(&self) -> bool {
        self.north
    }

    /// Central meridian in degrees
    pub fn central_meridian(&self) -> f64 {
        self.inner.lon0
    }

    pub fn false_easting(&self) -> f64 {
        self.inner.false_easting
    }

    pub fn false_northing(&self) -> f64 {
        self.inner.false_northing
    }
}

pub(crate) fn central_meridian(zone: u8) -> f64 {
    6.0 * f64::from(zone) - 183.
}

impl CoordinateSystem for UtmSystem {
    fn id(&self) -> SystemId {
        SystemId::Utm { zone: self.zone, north: self.north }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> PointKind {
        PointKind::Projected
    }

    fn roles(&self) -> [CoordRole; 3] {
        ROLES
    }

    fn precisions(&self) -> [Precision; 3] {
        PRECISIONS
    }

    fn to_wgs84(&self, point: &Point) -> Result<BlhPoint, Error> {
        match point {
            Point::Projected(p) => self.inner.unproject(p),
            other => Err(kind_mismatch(self, other)),
        }
    }

    fn from_wgs84(&self, point: &BlhPoint) -> Result<Point, Error> {
        self.inner.checked_project(point)
    }

    fn sample_point(&self) -> Point {
        self.inner.sample(self.north)
    }

    fn coordinates_valid(&self, n: f64, e: f64) -> bool {
        let ind = usize::from(self.north);
        let slop = 1.;

        (MIN_EASTING - slop) * TILE <= e
            && e <= (MAX_EASTING + slop) * TILE
            && (MIN_NORTHING[ind] - slop) * TILE <= n
            && n <= (MAX_NORTHING[ind] + slop) * TILE
    }
}

/// Width of a Gauss-Kruger zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ZoneWidth {
    /// Zones 1..=60, central meridian 6z - 3
    Six,
    /// Zones 1..=120, central meridian 3z
    Three,
}

/// Gauss-Kruger national grid zone on WGS-84: transverse Mercator with unit
/// scale, the zone number prefixed to the easting.
///
/// ```
/// use geodatum::{system, BlhPoint, Point, SystemId};
///
/// let gk = system(SystemId::GaussKruger6 { zone: 7 }).unwrap();
/// let p = gk.from_wgs84(&BlhPoint::from_degrees("cm", 50.0, 39.0, 0.0)).unwrap();
///
/// match p {
///     Point::Projected(p) => assert!((p.easting - 7_500_000.0).abs() < 1e-6),
///     _ => unreachable!(),
/// }
/// ```
pub struct GaussKrugerSystem {
    name: String,
    zone: u8,
    width: ZoneWidth,
    inner: TmZone,
}

impl GaussKrugerSystem {
    pub(crate) fn new(zone: u8, width: ZoneWidth) -> GaussKrugerSystem {
        let (lon0, label) = match width {
            ZoneWidth::Six => (6.0 * f64::from(zone) - 3.0, 6),
            ZoneWidth::Three => (3.0 * f64::from(zone), 3),
        };

        Self {
            name: format!("Gauss-Kruger {label}° zone {zone}"),
            zone,
            width,
            inner: TmZone::new(
                lon0,
                GK_K0,
                f64::from(zone) * GK_ZONE_BAND + GK_FALSE_EASTING,
                0.,
            ),
        }
    }

    pub fn zone(&self) -> u8 {
        self.zone
    }

    pub fn width(&self) -> ZoneWidth {
        self.width
    }

    /// Central meridian in degrees
    pub fn central_meridian(&self) -> f64 {
        self.inner.lon0
    }

    pub fn false_easting(&self) -> f64 {
        self.inner.false_easting
    }
}

impl CoordinateSystem for GaussKrugerSystem {
    fn id(&self) -> SystemId {
        match self.width {
            ZoneWidth::Six => SystemId::GaussKruger6 { zone: self.zone },
            ZoneWidth::Three => SystemId::GaussKruger3 { zone: self.zone },
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> PointKind {
        PointKind::Projected
    }

    fn roles(&self) -> [CoordRole; 3] {
        ROLES
    }

    fn precisions(&self) -> [Precision; 3] {
        PRECISIONS
    }

    fn to_wgs84(&self, point: &Point) -> Result<BlhPoint, Error> {
        match point {
            Point::Projected(p) => self.inner.unproject(p),
            other => Err(kind_mismatch(self, other)),
        }
    }

    fn from_wgs84(&self, point: &BlhPoint) -> Result<Point, Error> {
        self.inner.checked_project(point)
    }

    fn sample_point(&self) -> Point {
        self.inner.sample(true)
    }

    /// The easting must fall in this zone's million-metre band and the
    /// northing within a quarter meridian of the equator.
    fn coordinates_valid(&self, n: f64, e: f64) -> bool {
        let band = f64::from(self.zone) * GK_ZONE_BAND;

        (band..=band + GK_ZONE_BAND).contains(&e) && n.abs() <= self.inner.tm.quarter_meridian()
    }
}

/// Web Mercator (EPSG:3857).
pub struct WebMercatorSystem {
    name: String,
    proj: WebMercator,
}

impl WebMercatorSystem {
    pub(crate) fn new() -> WebMercatorSystem {
        Self {
            name: "WGS 84 / Pseudo-Mercator".to_string(),
            proj: WebMercator::new(),
        }
    }
}

impl CoordinateSystem for WebMercatorSystem {
    fn id(&self) -> SystemId {
        SystemId::WebMercator
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> PointKind {
        PointKind::Projected
    }

    fn roles(&self) -> [CoordRole; 3] {
        ROLES
    }

    fn precisions(&self) -> [Precision; 3] {
        [Precision::Fixed(2); 3]
    }

    fn to_wgs84(&self, point: &Point) -> Result<BlhPoint, Error> {
        match point {
            Point::Projected(p) => {
                // An infinite northing would otherwise land exactly on a pole
                require_finite(&p.id, &[p.easting, p.northing, p.height])?;
                let (lon, lat) = self.proj.inverse(p.easting, p.northing);
                Ok(BlhPoint {
                    id: p.id.clone(),
                    b: lat,
                    l: lon,
                    h: p.height,
                    tags: p.tags.clone(),
                })
            }
            other => Err(kind_mismatch(self, other)),
        }
    }

    fn from_wgs84(&self, point: &BlhPoint) -> Result<Point, Error> {
        if point.b.is_nan() || point.b.abs() > MAX_LATITUDE {
            warn!("Point {} is beyond the Web Mercator latitude limit", point.id);
            return Err(Error::Domain {
                id: point.id.clone(),
                msg: format!(
                    "latitude {:.6} is beyond the Web Mercator limit of {:.6}",
                    point.b.to_degrees(),
                    MAX_LATITUDE.to_degrees(),
                ),
            });
        }

        let (x, y) = self.proj.forward(point.l, point.b);
        Ok(Point::Projected(ProjectedPoint {
            id: point.id.clone(),
            easting: x,
            northing: y,
            height: point.h,
            tags: point.tags.clone(),
        }))
    }

    fn sample_point(&self) -> Point {
        let (x, y) = self.proj.forward(SAMPLE_DLON.to_radians(), SAMPLE_LAT.to_radians());
        Point::Projected(ProjectedPoint::new("sample", x, y, 0.0))
    }

    fn coordinates_valid(&self, n: f64, e: f64) -> bool {
        let extent = self.proj.extent();
        n.abs() <= extent && e.abs() <= extent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn projected(point: Point) -> ProjectedPoint {
        match point {
            Point::Projected(p) => p,
            other => panic!("expected a projected point, got {other:?}"),
        }
    }

    #[test]
    fn utm_reference_point() {
        let utm = UtmSystem::new(18, true);
        let p = BlhPoint::from_degrees("esb", 40.748_333, -73.985_278, 0.0);

        let out = projected(utm.from_wgs84(&p).unwrap());

        assert_relative_eq!(out.easting, 585_664.121, epsilon = 1e-3);
        assert_relative_eq!(out.northing, 4_511_315.422, epsilon = 1e-3);
        assert!(utm.coordinates_valid(out.northing, out.easting));
    }

    #[test]
    fn utm_south_round_trip() {
        let utm = UtmSystem::new(34, false);
        let p = BlhPoint::from_degrees("cpt", -33.925, 18.424, 12.0);

        let out = projected(utm.from_wgs84(&p).unwrap());
        assert!(out.northing > 6_000_000.0 && out.northing < 7_000_000.0);

        let back = utm.to_wgs84(&Point::Projected(out)).unwrap();
        assert_relative_eq!(back.b, p.b, epsilon = 1e-10);
        assert_relative_eq!(back.l, p.l, epsilon = 1e-10);
        assert_eq!(back.h, 12.0);
    }

    #[test]
    fn utm_validity_window() {
        let north = UtmSystem::new(33, true);
        let south = UtmSystem::new(33, false);

        assert!(north.coordinates_valid(5_000_000.0, 500_000.0));
        assert!(!north.coordinates_valid(9_700_000.0, 500_000.0));
        assert!(!north.coordinates_valid(5_000_000.0, 1_200_000.0));
        assert!(south.coordinates_valid(19_000_000.0, 500_000.0));
        assert!(!south.coordinates_valid(500_000.0, 500_000.0));
    }

    #[test]
    fn utm_zone_parameters() {
        let utm = UtmSystem::new(31, false);
        assert_eq!(utm.central_meridian(), 3.0);
        assert_eq!(utm.false_easting(), 500_000.0);
        assert_eq!(utm.false_northing(), 10_000_000.0);
    }

    #[test]
    fn singular_point_is_a_domain_error() {
        let utm = UtmSystem::new(31, true);
        // 90 degrees east of the central meridian on the equator
        let p = BlhPoint::from_degrees("edge", 0.0, 93.0, 0.0);
        assert!(matches!(utm.from_wgs84(&p), Err(Error::Domain { .. })));
    }

    #[test]
    fn non_finite_grid_coordinates_are_refused() {
        let utm: &dyn CoordinateSystem = &UtmSystem::new(33, true);
        let gk: &dyn CoordinateSystem = &GaussKrugerSystem::new(5, ZoneWidth::Six);
        let merc: &dyn CoordinateSystem = &WebMercatorSystem::new();

        for (system, p) in [
            (utm, ProjectedPoint::new("nan", f64::NAN, 5e6, 0.0)),
            (utm, ProjectedPoint::new("h", 500_000.0, 5e6, f64::INFINITY)),
            (gk, ProjectedPoint::new("inf", 5_500_000.0, f64::NEG_INFINITY, 0.0)),
            (merc, ProjectedPoint::new("pole", 0.0, f64::INFINITY, 0.0)),
            (merc, ProjectedPoint::new("nan", f64::NAN, 0.0, 0.0)),
        ] {
            match system.to_wgs84(&Point::Projected(p)) {
                Err(Error::Domain { .. }) => {}
                other => panic!("{}: expected a domain error, got {other:?}", system.name()),
            }
        }
    }

    #[test]
    fn gauss_kruger_three_degree_zones() {
        let gk = GaussKrugerSystem::new(120, ZoneWidth::Three);
        assert_eq!(gk.central_meridian(), 360.0);
        assert_eq!(gk.false_easting(), 120_500_000.0);

        let p = BlhPoint::from_degrees("w", 10.0, -1.0, 5.0);
        let out = projected(gk.from_wgs84(&p).unwrap());
        assert!(out.easting < 120_500_000.0);
        assert!(gk.coordinates_valid(out.northing, out.easting));

        let back = gk.to_wgs84(&Point::Projected(out)).unwrap();
        assert_relative_eq!(back.b, p.b, epsilon = 1e-10);
        assert_relative_eq!(back.l, p.l, epsilon = 1e-10);
    }

    #[test]
    fn gauss_kruger_rejects_other_zones() {
        let gk = GaussKrugerSystem::new(7, ZoneWidth::Six);
        assert!(gk.coordinates_valid(5_500_000.0, 7_400_000.0));
        assert!(!gk.coordinates_valid(5_500_000.0, 8_400_000.0));
        assert!(!gk.coordinates_valid(10_100_000.0, 7_400_000.0));
    }

    #[test]
    fn web_mercator_limits_latitude() {
        let merc = WebMercatorSystem::new();
        let p = BlhPoint::from_degrees("np", 89.0, 0.0, 0.0);
        assert!(matches!(merc.from_wgs84(&p), Err(Error::Domain { .. })));

        let p = BlhPoint::from_degrees("ok", 60.0, -120.0, 3.0);
        let out = merc.from_wgs84(&p).unwrap();
        let back = merc.to_wgs84(&out).unwrap();
        assert_relative_eq!(back.b, p.b, epsilon = 1e-12);
        assert_relative_eq!(back.l, p.l, epsilon = 1e-12);
    }
}
