use std::{collections::BTreeMap, fmt::Display};

/// Free-form key/value pairs carried alongside a point. Conversions never
/// read or alter them.
pub type Tags = BTreeMap<String, String>;

/// The representation a point is expressed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PointKind {
    /// Latitude, longitude and height above an ellipsoid.
    Geodetic,
    /// Geocentric X, Y, Z.
    Cartesian,
    /// Planar easting, northing and height.
    Projected,
}

impl Display for PointKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PointKind::Geodetic => "geodetic",
            PointKind::Cartesian => "cartesian",
            PointKind::Projected => "projected",
        };
        f.write_str(name)
    }
}

/// Geodetic point. `b` (latitude) and `l` (longitude) are in radians, `h`
/// is the height above the ellipsoid in meters.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlhPoint {
    pub id: String,
    #[cfg_attr(feature = "serde", serde(alias = "lat"))]
    pub b: f64,
    #[cfg_attr(feature = "serde", serde(alias = "lon"))]
    pub l: f64,
    pub h: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: Tags,
}

impl BlhPoint {
    pub fn new<S: Into<String>>(id: S, b: f64, l: f64, h: f64) -> BlhPoint {
        Self {
            id: id.into(),
            b,
            l,
            h,
            tags: Tags::new(),
        }
    }

    /// Creates a point from latitude and longitude given in degrees.
    ///
    /// # Usage
    ///
    /// ```
    /// use geodatum::BlhPoint;
    ///
    /// let p = BlhPoint::from_degrees("tower", 45.0, -90.0, 12.5);
    ///
    /// assert!((p.b - std::f64::consts::FRAC_PI_4).abs() < 1e-15);
    /// assert!((p.l + std::f64::consts::FRAC_PI_2).abs() < 1e-15);
    /// assert_eq!(p.h, 12.5);
    /// ```
    pub fn from_degrees<S: Into<String>>(id: S, lat: f64, lon: f64, h: f64) -> BlhPoint {
        Self::new(id, lat.to_radians(), lon.to_radians(), h)
    }

    pub fn with_tags(mut self, tags: Tags) -> BlhPoint {
        self.tags = tags;
        self
    }

    pub fn latitude_deg(&self) -> f64 {
        self.b.to_degrees()
    }

    pub fn longitude_deg(&self) -> f64 {
        self.l.to_degrees()
    }
}

/// Geocentric Cartesian point in meters.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct XyzPoint {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: Tags,
}

impl XyzPoint {
    pub fn new<S: Into<String>>(id: S, x: f64, y: f64, z: f64) -> XyzPoint {
        Self {
            id: id.into(),
            x,
            y,
            z,
            tags: Tags::new(),
        }
    }

    pub fn with_tags(mut self, tags: Tags) -> XyzPoint {
        self.tags = tags;
        self
    }
}

/// Planar point of a projected system, in meters.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProjectedPoint {
    pub id: String,
    pub easting: f64,
    pub northing: f64,
    pub height: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: Tags,
}

impl ProjectedPoint {
    pub fn new<S: Into<String>>(id: S, easting: f64, northing: f64, height: f64) -> ProjectedPoint {
        Self {
            id: id.into(),
            easting,
            northing,
            height,
            tags: Tags::new(),
        }
    }

    pub fn with_tags(mut self, tags: Tags) -> ProjectedPoint {
        self.tags = tags;
        self
    }
}

/// A point in one of the supported representations. Coordinate systems
/// match on the variant, so a system only ever sees the representation it
/// declares.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Point {
    Geodetic(BlhPoint),
    Cartesian(XyzPoint),
    Projected(ProjectedPoint),
}

impl Point {
    pub fn kind(&self) -> PointKind {
        match self {
            Point::Geodetic(_) => PointKind::Geodetic,
            Point::Cartesian(_) => PointKind::Cartesian,
            Point::Projected(_) => PointKind::Projected,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Point::Geodetic(p) => &p.id,
            Point::Cartesian(p) => &p.id,
            Point::Projected(p) => &p.id,
        }
    }

    pub fn tags(&self) -> &Tags {
        match self {
            Point::Geodetic(p) => &p.tags,
            Point::Cartesian(p) => &p.tags,
            Point::Projected(p) => &p.tags,
        }
    }

    /// The three coordinate values in slot order: B/L/H, X/Y/Z or
    /// Easting/Northing/Height.
    pub fn coords(&self) -> [f64; 3] {
        match self {
            Point::Geodetic(p) => [p.b, p.l, p.h],
            Point::Cartesian(p) => [p.x, p.y, p.z],
            Point::Projected(p) => [p.easting, p.northing, p.height],
        }
    }

    /// Builds a point of the given kind from slot-ordered values.
    pub fn from_coords<S: Into<String>>(kind: PointKind, id: S, coords: [f64; 3], tags: Tags) -> Point {
        let [c1, c2, c3] = coords;
        match kind {
            PointKind::Geodetic => Point::Geodetic(BlhPoint::new(id, c1, c2, c3).with_tags(tags)),
            PointKind::Cartesian => Point::Cartesian(XyzPoint::new(id, c1, c2, c3).with_tags(tags)),
            PointKind::Projected => Point::Projected(ProjectedPoint::new(id, c1, c2, c3).with_tags(tags)),
        }
    }

    /// Replaces the identifier and tags, leaving the coordinates alone.
    pub(crate) fn set_meta(&mut self, id: &str, tags: &Tags) {
        let (dst_id, dst_tags) = match self {
            Point::Geodetic(p) => (&mut p.id, &mut p.tags),
            Point::Cartesian(p) => (&mut p.id, &mut p.tags),
            Point::Projected(p) => (&mut p.id, &mut p.tags),
        };
        id.clone_into(dst_id);
        dst_tags.clone_from(tags);
    }
}

impl From<BlhPoint> for Point {
    fn from(value: BlhPoint) -> Self {
        Point::Geodetic(value)
    }
}

impl From<XyzPoint> for Point {
    fn from(value: XyzPoint) -> Self {
        Point::Cartesian(value)
    }
}

impl From<ProjectedPoint> for Point {
    fn from(value: ProjectedPoint) -> Self {
        Point::Projected(value)
    }
}
