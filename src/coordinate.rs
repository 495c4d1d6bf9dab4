use std::{fmt::Display, str::FromStr};

use crate::{point::Tags, utility::split_dms, Error, ParseCoord, ThisOrThat};

/// What a coordinate slot means in a given coordinate system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CoordRole {
    /// Latitude in radians
    Latitude,
    /// Longitude in radians
    Longitude,
    /// Height above the ellipsoid in meters
    Height,
    X,
    Y,
    Z,
    Easting,
    Northing,
}

/// How a coordinate value is rendered as text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Precision {
    /// Shortest text that reads back to the same value.
    Shortest,
    /// Fixed number of decimal places.
    Fixed(u8),
    /// Radians rendered as decimal degrees with the given number of places.
    Degrees(u8),
    /// Radians rendered as degrees, minutes and seconds, with the given
    /// number of places on the seconds.
    Dms(u8),
}

impl Precision {
    /// Renders `value` according to this precision.
    ///
    /// # Usage
    ///
    /// ```
    /// use geodatum::Precision;
    ///
    /// assert_eq!(Precision::Fixed(2).format(1234.5678), "1234.57");
    /// assert_eq!(Precision::Degrees(4).format(std::f64::consts::FRAC_PI_4), "45.0000");
    /// assert_eq!(Precision::Dms(1).format((-30.5_f64).to_radians()), "-30°30'00.0\"");
    /// assert_eq!(Precision::Shortest.format(0.1), "0.1");
    /// ```
    pub fn format(&self, value: f64) -> String {
        match *self {
            Precision::Shortest => {
                let mut buf = ryu::Buffer::new();
                buf.format(value).to_string()
            }
            Precision::Fixed(places) => format!("{value:.*}", usize::from(places)),
            Precision::Degrees(places) => format!("{:.*}", usize::from(places), value.to_degrees()),
            Precision::Dms(places) => {
                if !value.is_finite() {
                    return value.to_string();
                }
                let (negative, deg, min, sec) = split_dms(value.to_degrees(), places);
                let width = (places > 0).ternary(3 + usize::from(places), 2);
                format!(
                    "{}{deg}°{min:02}'{sec:0width$.prec$}\"",
                    negative.ternary("-", ""),
                    prec = usize::from(places),
                )
            }
        }
    }
}

impl ParseCoord for Precision {
    /// Parses the notation written by [`Display`]: `auto`, a decimal
    /// template such as `0.000`, `deg6` or `dms2`.
    fn parse_coord(value: &str) -> Result<Self, Error> {
        let value = value.trim();
        let invalid = || Error::InvalidPrecision(value.to_string());
        let places = |digits: &str| -> Result<u8, Error> {
            if digits.is_empty() {
                Ok(0)
            } else {
                digits.parse::<u8>().map_err(|_| invalid())
            }
        };

        if value.eq_ignore_ascii_case("auto") {
            Ok(Precision::Shortest)
        } else if let Some(digits) = value.strip_prefix("dms") {
            Ok(Precision::Dms(places(digits)?))
        } else if let Some(digits) = value.strip_prefix("deg") {
            Ok(Precision::Degrees(places(digits)?))
        } else if let Some(zeros) = value.strip_prefix('0') {
            let decimals = match zeros.strip_prefix('.') {
                Some(decimals) => decimals,
                None if zeros.is_empty() => "",
                None => return Err(invalid()),
            };
            if decimals.chars().all(|c| c == '0') {
                u8::try_from(decimals.len())
                    .map(Precision::Fixed)
                    .map_err(|_| invalid())
            } else {
                Err(invalid())
            }
        } else {
            Err(invalid())
        }
    }
}

impl FromStr for Precision {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Precision::parse_coord(s)
    }
}

impl Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Precision::Shortest => f.write_str("auto"),
            Precision::Fixed(0) => f.write_str("0"),
            Precision::Fixed(places) => write!(f, "0.{}", "0".repeat(usize::from(places))),
            Precision::Degrees(places) => write!(f, "deg{places}"),
            Precision::Dms(places) => write!(f, "dms{places}"),
        }
    }
}

/// A single coordinate value together with its display precision.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinate {
    pub value: f64,
    pub precision: Precision,
}

impl Coordinate {
    pub fn new(value: f64, precision: Precision) -> Coordinate {
        Self { value, precision }
    }

    /// The value rendered with this cell's precision.
    pub fn text(&self) -> String {
        self.precision.format(self.value)
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text())
    }
}

/// Cell-based point record exchanged with readers, writers and views. The
/// meaning of each slot is given by the owning system's
/// [`roles`](crate::CoordinateSystem::roles).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointBase {
    pub id: String,
    pub coord1: Coordinate,
    pub coord2: Coordinate,
    pub coord3: Coordinate,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: Tags,
}

impl PointBase {
    pub fn values(&self) -> [f64; 3] {
        [self.coord1.value, self.coord2.value, self.coord3.value]
    }

    pub fn texts(&self) -> [String; 3] {
        [self.coord1.text(), self.coord2.text(), self.coord3.text()]
    }
}

impl Display for PointBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.id,
            self.coord1,
            self.coord2,
            self.coord3,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precision_notation_reads_back() {
        for precision in [
            Precision::Shortest,
            Precision::Fixed(0),
            Precision::Fixed(3),
            Precision::Degrees(6),
            Precision::Dms(2),
        ] {
            assert_eq!(precision.to_string().parse::<Precision>().unwrap(), precision);
        }
    }

    #[test]
    fn precision_rejects_garbage() {
        for text in ["", "0.0x", "dmsx", "deg-1", "1.00", "00"] {
            assert!(text.parse::<Precision>().is_err(), "{text} should not parse");
        }
    }

    #[test]
    fn dms_rounding_carries_into_degrees() {
        let value = 59.999_999_9_f64.to_radians();
        assert_eq!(Precision::Dms(2).format(value), "60°00'00.00\"");
        assert_eq!(Precision::Dms(0).format(0.0), "0°00'00\"");
        assert_eq!(Precision::Dms(2).format(-1e-12), "0°00'00.00\"");
    }

    #[test]
    fn point_base_displays_cells() {
        let point = PointBase {
            id: "A1".to_string(),
            coord1: Coordinate::new(500_000.0, Precision::Fixed(1)),
            coord2: Coordinate::new(4_649_776.224, Precision::Fixed(2)),
            coord3: Coordinate::new(12.0, Precision::Fixed(0)),
            tags: Tags::new(),
        };
        assert_eq!(point.to_string(), "A1 500000.0 4649776.22 12");
        assert_eq!(point.values(), [500_000.0, 4_649_776.224, 12.0]);
    }
}
