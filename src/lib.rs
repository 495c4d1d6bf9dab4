#![warn(clippy::pedantic)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::module_name_repetitions
)]

use thiserror::Error;

pub mod coordinate;
pub mod ellipsoid;
pub mod pipeline;
pub mod point;
pub mod systems;
pub mod utility;

pub use coordinate::{CoordRole, Coordinate, PointBase, Precision};
pub use ellipsoid::{Ellipsoid, SolverSettings};
pub use pipeline::{convert_records, convert_to};
pub use point::{BlhPoint, Point, PointKind, ProjectedPoint, Tags, XyzPoint};
pub use systems::{
    default_system, set_default_system, system, system_by_name, systems, CoordinateSystem,
    SystemId,
};

pub(crate) mod projections {
    pub mod transverse_mercator;
    pub mod web_mercator;
}

pub(crate) mod constants;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Point {id} is outside the valid domain: {msg}")]
    Domain { id: String, msg: String },
    #[error("Latitude of point {id} did not converge within {iterations} iterations")]
    Convergence { id: String, iterations: usize },
    #[error("Ellipsoid parameters are not valid: {0}")]
    InvalidEllipsoid(String),
    #[error("Coordinate system {system} expects a {expected} point, got a {found} point")]
    PointKind {
        system: String,
        expected: PointKind,
        found: PointKind,
    },
    #[error("Unknown coordinate system: {0}")]
    UnknownSystem(String),
    #[error("Zone {0} is not valid for this coordinate system")]
    InvalidZone(i32),
    #[error("Precision format is invalid: {0}")]
    InvalidPrecision(String),
}

pub trait ParseCoord {
    /// Parses a value from its textual notation.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] describing why `value` could not be parsed.
    fn parse_coord(value: &str) -> Result<Self, Error>
    where Self: Sized;
}

/// Parses any [`ParseCoord`] type from a string.
///
/// # Errors
///
/// Propagates the error of the target type's parser.
///
/// # Usage
///
/// ```
/// use geodatum::{Precision, SystemId};
///
/// let precision: Precision = geodatum::from_str("dms2").unwrap();
/// assert_eq!(precision, Precision::Dms(2));
///
/// let id: SystemId = geodatum::from_str("UTM33N").unwrap();
/// assert_eq!(id, SystemId::Utm { zone: 33, north: true });
/// ```
pub fn from_str<S, T>(value: S) -> Result<T, Error>
where
    S: AsRef<str>,
    T: ParseCoord
{
    T::parse_coord(value.as_ref())
}

trait ThisOrThat {
    fn ternary<T>(&self, r#true: T, r#false: T) -> T;
    fn ternary_lazy<F, E, T>(&self, r#true: F, r#false: E) -> T
    where
        F: Fn() -> T,
        E: Fn() -> T;
}

impl ThisOrThat for bool {
    fn ternary<T>(&self, r#true: T, r#false: T) -> T {
        if *self { r#true } else { r#false }
    }

    fn ternary_lazy<F, E, T>(&self, r#true: F, r#false: E) -> T
    where
        F: Fn() -> T,
        E: Fn() -> T,
    {
        if *self { r#true() } else { r#false() }
    }
}
