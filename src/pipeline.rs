//! Batch conversion between any two registered coordinate systems, pivoting
//! through WGS-84 geodetic coordinates.

use log::debug;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{coordinate::PointBase, point::Point, systems::CoordinateSystem, Error};

fn convert_one(
    source: &dyn CoordinateSystem,
    destination: &dyn CoordinateSystem,
    point: &Point,
) -> Result<Point, Error> {
    let wgs84 = source.to_wgs84(point)?;
    let mut converted = destination.from_wgs84(&wgs84)?;
    converted.set_meta(point.id(), point.tags());
    Ok(converted)
}

/// Converts `points` from `source` to `destination`.
///
/// The output has the same length and order as the input, and every point
/// keeps its id and tags. The inputs are not modified.
///
/// # Errors
///
/// The first point that fails either half of the conversion fails the whole
/// batch; no partial result is returned.
///
/// # Usage
///
/// ```
/// use geodatum::{convert_to, system, BlhPoint, Point, SystemId};
///
/// let wgs84 = system(SystemId::Wgs84).unwrap();
/// let ecef = system(SystemId::Geocentric).unwrap();
///
/// let points = vec![Point::from(BlhPoint::new("origin", 0.0, 0.0, 0.0))];
/// let out = convert_to(wgs84, ecef, &points).unwrap();
///
/// match &out[0] {
///     Point::Cartesian(p) => {
///         assert_eq!(p.id, "origin");
///         assert!((p.x - 6_378_137.0).abs() < 1e-6);
///     }
///     _ => unreachable!(),
/// }
/// ```
pub fn convert_to(
    source: &dyn CoordinateSystem,
    destination: &dyn CoordinateSystem,
    points: &[Point],
) -> Result<Vec<Point>, Error> {
    debug!(
        "Converting {} points from {} to {}",
        points.len(),
        source.name(),
        destination.name()
    );

    #[cfg(feature = "parallel")]
    let iter = points.par_iter();
    #[cfg(not(feature = "parallel"))]
    let iter = points.iter();

    iter.map(|p| convert_one(source, destination, p)).collect()
}

/// Converts cell records. Input cells are read by the source's roles and the
/// output is described with the destination's precisions.
///
/// # Errors
///
/// Same as [`convert_to`].
pub fn convert_records(
    source: &dyn CoordinateSystem,
    destination: &dyn CoordinateSystem,
    records: &[PointBase],
) -> Result<Vec<PointBase>, Error> {
    let points: Vec<Point> = records.iter().map(|r| source.read(r)).collect();

    Ok(convert_to(source, destination, &points)?
        .iter()
        .map(|p| destination.describe(p))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        coordinate::{Coordinate, Precision},
        point::{BlhPoint, ProjectedPoint, Tags, XyzPoint},
        systems::{system, SystemId},
    };
    use approx::assert_relative_eq;

    #[test]
    fn ids_and_tags_survive_conversion() {
        let mut tags = Tags::new();
        tags.insert("layer".to_string(), "control".to_string());
        let points = vec![
            Point::from(BlhPoint::from_degrees("a", 52.0, 13.0, 40.0).with_tags(tags.clone())),
            Point::from(BlhPoint::from_degrees("b", 48.1, 11.6, 520.0)),
        ];

        let src = system(SystemId::Wgs72).unwrap();
        let dst = system(SystemId::Utm { zone: 33, north: true }).unwrap();
        let out = convert_to(src, dst, &points).unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].id(), "a");
        assert_eq!(out[0].tags(), &tags);
        assert_eq!(out[1].id(), "b");
        assert!(out[1].tags().is_empty());
        assert!(out.iter().all(|p| matches!(p, Point::Projected(_))));
    }

    #[test]
    fn one_bad_point_fails_the_batch() {
        let points = vec![
            Point::from(XyzPoint::new("ok", 6_378_137.0, 0.0, 0.0)),
            Point::from(XyzPoint::new("pole", 0.0, 0.0, 6_356_752.3)),
        ];

        let src = system(SystemId::Geocentric).unwrap();
        let dst = system(SystemId::Wgs84).unwrap();

        match convert_to(src, dst, &points) {
            Err(Error::Domain { id, .. }) => assert_eq!(id, "pole"),
            other => panic!("expected a domain error, got {other:?}"),
        }
    }

    #[test]
    fn wrong_point_kind_is_refused() {
        let points = vec![Point::from(ProjectedPoint::new("p", 1.0, 2.0, 3.0))];
        let src = system(SystemId::Wgs84).unwrap();

        assert!(matches!(
            convert_to(src, src, &points),
            Err(Error::PointKind { .. })
        ));
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let src = system(SystemId::Wgs84).unwrap();
        let dst = system(SystemId::WebMercator).unwrap();
        assert!(convert_to(src, dst, &[]).unwrap().is_empty());
    }

    #[test]
    fn records_use_destination_precisions() {
        let record = PointBase {
            id: "r1".to_string(),
            coord1: Coordinate::new(0.0, Precision::Shortest),
            coord2: Coordinate::new(0.0, Precision::Shortest),
            coord3: Coordinate::new(0.0, Precision::Shortest),
            tags: Tags::new(),
        };

        let src = system(SystemId::Wgs84).unwrap();
        let dst = system(SystemId::Geocentric).unwrap();
        let out = convert_records(src, dst, &[record]).unwrap();

        assert_eq!(out[0].id, "r1");
        assert_eq!(out[0].coord1.precision, Precision::Fixed(3));
        assert_relative_eq!(out[0].coord1.value, 6_378_137.0, epsilon = 1e-6);
        assert_eq!(out[0].to_string(), "r1 6378137.000 0.000 0.000");
    }
}
