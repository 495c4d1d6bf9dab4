//! Coordinate systems and the process-wide registry that holds one instance
//! of each.
//!
//! Every system converts its native points to and from WGS-84 geodetic
//! coordinates, which is the common intermediate used by
//! [`convert_to`](crate::convert_to).

use std::{
    collections::HashMap,
    fmt::Display,
    str::FromStr,
    sync::atomic::{AtomicUsize, Ordering},
};

use lazy_static::lazy_static;
use log::{debug, warn};

use crate::{
    coordinate::{CoordRole, Coordinate, PointBase, Precision},
    point::{BlhPoint, Point, PointKind},
    Error, ParseCoord,
};

pub mod geocentric;
pub mod geodetic;
pub mod projected;

pub use geocentric::GeocentricSystem;
pub use geodetic::{wgs72_to_wgs84, wgs84_to_wgs72, Wgs72System, Wgs84System};
pub use projected::{GaussKrugerSystem, UtmSystem, WebMercatorSystem, ZoneWidth};

pub(crate) const MAX_UTM_ZONE: u8 = 60;
pub(crate) const MAX_GK6_ZONE: u8 = 60;
pub(crate) const MAX_GK3_ZONE: u8 = 120;

/// Behaviour shared by every coordinate system.
///
/// Implementations are immutable and shared between threads; all methods
/// take `&self` and have no side effects.
pub trait CoordinateSystem: Send + Sync {
    fn id(&self) -> SystemId;

    /// Human readable name
    fn name(&self) -> &str;

    /// The point representation this system reads and produces.
    fn kind(&self) -> PointKind;

    /// Meaning of `coord1`, `coord2` and `coord3` of a [`PointBase`] in this
    /// system.
    fn roles(&self) -> [CoordRole; 3];

    /// Default display precision of each slot.
    fn precisions(&self) -> [Precision; 3];

    /// Converts a native point to WGS-84 geodetic coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PointKind`] if `point` is not of this system's
    /// [`kind`](CoordinateSystem::kind), or whatever the underlying math
    /// reports.
    fn to_wgs84(&self, point: &Point) -> Result<BlhPoint, Error>;

    /// Converts a WGS-84 geodetic point into this system.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Domain`] if the point cannot be represented here.
    fn from_wgs84(&self, point: &BlhPoint) -> Result<Point, Error>;

    /// A fixed representative point, used to preview formatting.
    fn sample_point(&self) -> Point;

    /// Whether a northing-like `n` and easting-like `e` value, in this
    /// system's native units, lie inside its valid range. Advisory only.
    fn coordinates_valid(&self, n: f64, e: f64) -> bool;

    /// The sample point rendered with this system's precisions.
    fn sample_text(&self) -> String {
        self.describe(&self.sample_point()).texts().join(" ")
    }

    /// Builds a typed point from a cell record, interpreting the slots by
    /// [`roles`](CoordinateSystem::roles).
    fn read(&self, record: &PointBase) -> Point {
        Point::from_coords(self.kind(), record.id.as_str(), record.values(), record.tags.clone())
    }

    /// Renders a point as a cell record using this system's precisions.
    fn describe(&self, point: &Point) -> PointBase {
        let [v1, v2, v3] = point.coords();
        let [p1, p2, p3] = self.precisions();

        PointBase {
            id: point.id().to_string(),
            coord1: Coordinate::new(v1, p1),
            coord2: Coordinate::new(v2, p2),
            coord3: Coordinate::new(v3, p3),
            tags: point.tags().clone(),
        }
    }
}

pub(crate) fn kind_mismatch(system: &dyn CoordinateSystem, point: &Point) -> Error {
    Error::PointKind {
        system: system.name().to_string(),
        expected: system.kind(),
        found: point.kind(),
    }
}

// Refuses NaN and infinite coordinates before they reach the math
pub(crate) fn require_finite(id: &str, values: &[f64]) -> Result<(), Error> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        warn!("Point {id} has non-finite coordinates {values:?}");
        Err(Error::Domain {
            id: id.to_string(),
            msg: format!("coordinates {values:?} are not finite"),
        })
    }
}

/// Identifies one of the registered coordinate systems.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SystemId {
    Wgs84,
    Wgs72,
    /// WGS-84 geocentric Cartesian
    Geocentric,
    /// UTM zone 1..=60 on WGS-84
    Utm { zone: u8, north: bool },
    /// Gauss-Kruger 6° zone 1..=60
    GaussKruger6 { zone: u8 },
    /// Gauss-Kruger 3° zone 1..=120
    GaussKruger3 { zone: u8 },
    /// Web Mercator, EPSG:3857
    WebMercator,
}

impl SystemId {
    /// Checks that the zone number, if any, exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidZone`] for a zone outside its range.
    pub fn validate(&self) -> Result<(), Error> {
        let (zone, max) = match *self {
            SystemId::Utm { zone, .. } => (zone, MAX_UTM_ZONE),
            SystemId::GaussKruger6 { zone } => (zone, MAX_GK6_ZONE),
            SystemId::GaussKruger3 { zone } => (zone, MAX_GK3_ZONE),
            _ => return Ok(()),
        };

        if (1..=max).contains(&zone) {
            Ok(())
        } else {
            Err(Error::InvalidZone(i32::from(zone)))
        }
    }
}

impl Display for SystemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            SystemId::Wgs84 => f.write_str("WGS84"),
            SystemId::Wgs72 => f.write_str("WGS72"),
            SystemId::Geocentric => f.write_str("ECEF"),
            SystemId::Utm { zone, north } => write!(f, "UTM{zone}{}", if north { 'N' } else { 'S' }),
            SystemId::GaussKruger6 { zone } => write!(f, "GK6-{zone}"),
            SystemId::GaussKruger3 { zone } => write!(f, "GK3-{zone}"),
            SystemId::WebMercator => f.write_str("WEBMERC"),
        }
    }
}

impl ParseCoord for SystemId {
    fn parse_coord(value: &str) -> Result<Self, Error> {
        let upper = value.trim().to_ascii_uppercase();
        let unknown = || Error::UnknownSystem(value.to_string());
        let zone = |digits: &str| {
            let zone = digits.parse::<i32>().map_err(|_| unknown())?;
            u8::try_from(zone).map_err(|_| Error::InvalidZone(zone))
        };

        let id = match upper.as_str() {
            "WGS84" => SystemId::Wgs84,
            "WGS72" => SystemId::Wgs72,
            "ECEF" => SystemId::Geocentric,
            "WEBMERC" => SystemId::WebMercator,
            other => {
                if let Some(rest) = other.strip_prefix("UTM") {
                    let north = match rest.chars().last() {
                        Some('N') => true,
                        Some('S') => false,
                        _ => return Err(unknown()),
                    };
                    SystemId::Utm { zone: zone(&rest[..rest.len() - 1])?, north }
                } else if let Some(digits) = other.strip_prefix("GK6-") {
                    SystemId::GaussKruger6 { zone: zone(digits)? }
                } else if let Some(digits) = other.strip_prefix("GK3-") {
                    SystemId::GaussKruger3 { zone: zone(digits)? }
                } else {
                    return Err(unknown());
                }
            }
        };

        id.validate()?;
        Ok(id)
    }
}

impl FromStr for SystemId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SystemId::parse_coord(s)
    }
}

fn build_registry() -> Vec<Box<dyn CoordinateSystem>> {
    let mut registry: Vec<Box<dyn CoordinateSystem>> = vec![
        Box::new(Wgs84System::new()),
        Box::new(Wgs72System::new()),
        Box::new(GeocentricSystem::new()),
    ];

    for north in [true, false] {
        for zone in 1..=MAX_UTM_ZONE {
            registry.push(Box::new(UtmSystem::new(zone, north)));
        }
    }
    for zone in 1..=MAX_GK6_ZONE {
        registry.push(Box::new(GaussKrugerSystem::new(zone, ZoneWidth::Six)));
    }
    for zone in 1..=MAX_GK3_ZONE {
        registry.push(Box::new(GaussKrugerSystem::new(zone, ZoneWidth::Three)));
    }
    registry.push(Box::new(WebMercatorSystem::new()));

    debug!("Registered {} coordinate systems", registry.len());
    registry
}

lazy_static! {
    static ref REGISTRY: Vec<Box<dyn CoordinateSystem>> = build_registry();
    static ref INDEX: HashMap<SystemId, usize> = REGISTRY
        .iter()
        .enumerate()
        .map(|(i, system)| (system.id(), i))
        .collect();
}

// Registry index of the default system, WGS-84 until changed
static DEFAULT_SYSTEM: AtomicUsize = AtomicUsize::new(0);

fn index_of(id: SystemId) -> Result<usize, Error> {
    id.validate()?;
    INDEX
        .get(&id)
        .copied()
        .ok_or_else(|| Error::UnknownSystem(id.to_string()))
}

/// Returns the shared instance of a coordinate system.
///
/// # Errors
///
/// Returns [`Error::InvalidZone`] if the id names a zone that doesn't exist.
///
/// # Usage
///
/// ```
/// use geodatum::{system, SystemId};
///
/// let utm = system(SystemId::Utm { zone: 33, north: true }).unwrap();
/// assert_eq!(utm.name(), "WGS 84 / UTM zone 33N");
///
/// assert!(system(SystemId::Utm { zone: 61, north: true }).is_err());
/// ```
pub fn system(id: SystemId) -> Result<&'static dyn CoordinateSystem, Error> {
    let registry: &'static Vec<Box<dyn CoordinateSystem>> = &REGISTRY;
    Ok(&*registry[index_of(id)?])
}

/// Looks a system up by its [`SystemId`] notation, e.g. `UTM33N` or `GK3-12`.
///
/// # Errors
///
/// Returns [`Error::UnknownSystem`] or [`Error::InvalidZone`] for names that
/// don't resolve.
pub fn system_by_name(name: &str) -> Result<&'static dyn CoordinateSystem, Error> {
    system(SystemId::parse_coord(name)?)
}

/// Iterates over every registered system in registration order.
pub fn systems() -> impl Iterator<Item = &'static dyn CoordinateSystem> {
    let registry: &'static Vec<Box<dyn CoordinateSystem>> = &REGISTRY;
    registry.iter().map(|entry| &**entry)
}

/// The system picked as default by the application. Has no effect on any
/// conversion.
pub fn default_system() -> &'static dyn CoordinateSystem {
    let registry: &'static Vec<Box<dyn CoordinateSystem>> = &REGISTRY;
    &*registry[DEFAULT_SYSTEM.load(Ordering::Acquire)]
}

/// Changes the default system.
///
/// # Errors
///
/// Returns [`Error::InvalidZone`] for a zone that doesn't exist; the
/// default is left unchanged.
pub fn set_default_system(id: SystemId) -> Result<(), Error> {
    let index = index_of(id)?;
    DEFAULT_SYSTEM.store(index, Ordering::Release);
    debug!("Default coordinate system set to {id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_system_is_registered_once() {
        assert_eq!(systems().count(), 3 + 120 + 60 + 120 + 1);
        assert_eq!(INDEX.len(), systems().count());
        for entry in systems() {
            assert_eq!(system(entry.id()).unwrap().id(), entry.id());
        }
    }

    #[test]
    fn ids_read_back_from_their_notation() {
        for system in systems() {
            let id = system.id();
            assert_eq!(id.to_string().parse::<SystemId>().unwrap(), id);
        }
        assert_eq!("utm7s".parse::<SystemId>().unwrap(), SystemId::Utm { zone: 7, north: false });
    }

    #[test]
    fn bad_names_are_rejected() {
        assert!(matches!("NAD27".parse::<SystemId>(), Err(Error::UnknownSystem(_))));
        assert!(matches!("UTM33X".parse::<SystemId>(), Err(Error::UnknownSystem(_))));
        assert!(matches!("UTMN".parse::<SystemId>(), Err(Error::UnknownSystem(_))));
        assert!(matches!("GK3-121".parse::<SystemId>(), Err(Error::InvalidZone(121))));
        assert!(matches!("UTM0N".parse::<SystemId>(), Err(Error::InvalidZone(0))));
        assert!(matches!("UTM61N".parse::<SystemId>(), Err(Error::InvalidZone(61))));
        assert!(matches!("UTM300N".parse::<SystemId>(), Err(Error::InvalidZone(300))));
        assert!(matches!("GK6--4".parse::<SystemId>(), Err(Error::InvalidZone(-4))));
    }

    #[test]
    fn sample_points_are_valid_in_their_system() {
        for system in systems() {
            let sample = system.sample_point();
            assert_eq!(sample.kind(), system.kind(), "{}", system.name());
            let [c1, c2, _] = sample.coords();
            let (n, e) = match system.kind() {
                PointKind::Geodetic => (c1, c2),
                PointKind::Cartesian => (c1, c2),
                PointKind::Projected => (c2, c1),
            };
            assert!(system.coordinates_valid(n, e), "{}: {}", system.name(), system.sample_text());
        }
    }
}
