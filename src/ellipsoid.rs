use lazy_static::lazy_static;
use log::{trace, warn};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    constants::{
        GRS80_A, GRS80_INV_F, LATITUDE_MAX_ITERATIONS, LATITUDE_TOLERANCE, WGS72_A, WGS72_INV_F,
        WGS84_A, WGS84_INV_F,
    },
    point::{BlhPoint, XyzPoint},
    Error,
};

lazy_static! {
    /// WGS-84 reference ellipsoid.
    pub static ref WGS84: Ellipsoid = Ellipsoid::new("WGS84", WGS84_A, WGS84_INV_F);
    /// WGS-72 reference ellipsoid.
    pub static ref WGS72: Ellipsoid = Ellipsoid::new("WGS72", WGS72_A, WGS72_INV_F);
    /// GRS-80 reference ellipsoid.
    pub static ref GRS80: Ellipsoid = Ellipsoid::new("GRS80", GRS80_A, GRS80_INV_F);
}

/// Tuning for the iterative latitude recovery in [`Ellipsoid::get_blh_with`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverSettings {
    /// Stop once two successive latitudes differ by less than this (radians).
    pub tolerance: f64,
    /// Hard cap on fixed-point iterations.
    pub max_iterations: usize,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            tolerance: LATITUDE_TOLERANCE,
            max_iterations: LATITUDE_MAX_ITERATIONS,
        }
    }
}

/// Reference ellipsoid defined by its semi-major axis and inverse
/// flattening. All derived parameters are computed once at construction and
/// never change afterwards.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Ellipsoid {
    name: String,
    a: f64,
    inv_flattening: f64,
    f: f64,
    b: f64,
    e2: f64,
    e: f64,
    ep2: f64,
    n: f64,
    r0: f64,
}

impl Ellipsoid {
    /// Internal-only constructor that doesn't check the parameters
    pub(crate) fn new(name: &str, a: f64, inv_flattening: f64) -> Ellipsoid {
        let f = 1.0 / inv_flattening;
        let b = a - f * a;
        let e2 = f * (2.0 - f);
        let n = f / (2.0 - f);
        let n2 = n.powi(2);
        // Mean meridian radius, series truncated after n^4
        let r0 = a / (1.0 + n) * (1.0 + n2 / 4.0 + n2.powi(2) / 64.0);

        Self {
            name: name.to_string(),
            a,
            inv_flattening,
            f,
            b,
            e2,
            e: e2.sqrt(),
            ep2: e2 / (1.0 - e2),
            n,
            r0,
        }
    }

    /// Tries to create an ellipsoid from its semi-major axis (meters) and
    /// inverse flattening.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEllipsoid`] unless `a` is finite and positive
    /// and `inv_flattening` is finite and greater than 1, which is what keeps
    /// `0 < b < a` and `0 <= e2 < 1`.
    ///
    /// # Usage
    ///
    /// ```
    /// use geodatum::Ellipsoid;
    ///
    /// let krassowsky = Ellipsoid::create("Krassowsky", 6_378_245.0, 298.3).unwrap();
    /// assert!(krassowsky.b() < krassowsky.a());
    ///
    /// assert!(Ellipsoid::create("flat", 6_378_245.0, 0.5).is_err());
    /// assert!(Ellipsoid::create("sphere", 6_378_245.0, f64::INFINITY).is_err());
    /// assert!(Ellipsoid::create("negative", -1.0, 298.3).is_err());
    /// ```
    pub fn create(name: &str, a: f64, inv_flattening: f64) -> Result<Ellipsoid, Error> {
        if !(a.is_finite() && a > 0.0) {
            return Err(Error::InvalidEllipsoid(format!("Semi-major axis {a} must be finite and positive.")));
        }
        if !(inv_flattening.is_finite() && inv_flattening > 1.0) {
            return Err(Error::InvalidEllipsoid(format!("Inverse flattening {inv_flattening} must be finite and greater than 1.")));
        }

        Ok(Ellipsoid::new(name, a, inv_flattening))
    }

    /// Looks up one of the predefined ellipsoids by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEllipsoid`] for an unknown name.
    pub fn named(name: &str) -> Result<&'static Ellipsoid, Error> {
        [&*WGS84, &*WGS72, &*GRS80]
            .into_iter()
            .find(|ellipsoid| ellipsoid.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::InvalidEllipsoid(format!("No predefined ellipsoid named {name}.")))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Semi-major axis in meters
    #[inline]
    pub fn a(&self) -> f64 {
        self.a
    }

    /// Semi-minor axis in meters
    #[inline]
    pub fn b(&self) -> f64 {
        self.b
    }

    pub fn inv_flattening(&self) -> f64 {
        self.inv_flattening
    }

    pub fn flattening(&self) -> f64 {
        self.f
    }

    /// First eccentricity squared
    pub fn e2(&self) -> f64 {
        self.e2
    }

    /// First eccentricity
    pub fn e(&self) -> f64 {
        self.e
    }

    /// Second eccentricity squared
    pub fn ep2(&self) -> f64 {
        self.ep2
    }

    /// Third flattening
    pub fn n(&self) -> f64 {
        self.n
    }

    /// Mean meridian radius
    pub fn r0(&self) -> f64 {
        self.r0
    }

    /// Radius of curvature in the prime vertical at latitude `b` (radians).
    ///
    /// ```
    /// use geodatum::ellipsoid::WGS84;
    ///
    /// assert_eq!(WGS84.rn(0.0), WGS84.a());
    /// assert!(WGS84.rn(1.0) > WGS84.a());
    /// ```
    pub fn rn(&self, b: f64) -> f64 {
        self.a / (1.0 - self.e2 * b.sin().powi(2)).sqrt()
    }

    // Offset of the normal's axis intercept from the center, a*e^2*sin(B)/W
    fn normal_offset(&self, b: f64) -> f64 {
        let esin = self.e * b.sin();
        self.a * self.e * esin / (1.0 - esin.powi(2)).sqrt()
    }

    /// Converts a geodetic point to geocentric Cartesian coordinates. The id
    /// and tags are carried over unchanged.
    ///
    /// # Usage
    ///
    /// ```
    /// use geodatum::{ellipsoid::WGS84, BlhPoint};
    ///
    /// let xyz = WGS84.get_xyz(&BlhPoint::new("origin", 0.0, 0.0, 0.0));
    ///
    /// assert_eq!(xyz.id, "origin");
    /// assert_eq!(xyz.x, 6_378_137.0);
    /// assert_eq!(xyz.y, 0.0);
    /// assert_eq!(xyz.z, 0.0);
    /// ```
    pub fn get_xyz(&self, point: &BlhPoint) -> XyzPoint {
        let rn = self.rn(point.b);
        let rp = (rn + point.h) * point.b.cos();

        XyzPoint {
            id: point.id.clone(),
            x: rp * point.l.cos(),
            y: rp * point.l.sin(),
            z: (rn * (1.0 - self.e2) + point.h) * point.b.sin(),
            tags: point.tags.clone(),
        }
    }

    /// Converts a geocentric point back to geodetic coordinates using the
    /// default [`SolverSettings`].
    ///
    /// # Errors
    ///
    /// See [`Ellipsoid::get_blh_with`].
    ///
    /// # Usage
    ///
    /// ```
    /// use geodatum::{ellipsoid::WGS84, BlhPoint, Error, XyzPoint};
    ///
    /// let p = BlhPoint::new("p", 0.9, 0.3, 100.0);
    /// let back = WGS84.get_blh(&WGS84.get_xyz(&p)).unwrap();
    ///
    /// assert!((back.b - 0.9).abs() < 1e-6);
    /// assert!((back.l - 0.3).abs() < 1e-6);
    /// assert!((back.h - 100.0).abs() < 1e-3);
    ///
    /// let pole = XyzPoint::new("pole", 0.0, 0.0, 6_356_752.3);
    /// assert!(matches!(WGS84.get_blh(&pole), Err(Error::Domain { .. })));
    /// ```
    pub fn get_blh(&self, point: &XyzPoint) -> Result<BlhPoint, Error> {
        self.get_blh_with(point, &SolverSettings::default())
    }

    /// Converts a geocentric point back to geodetic coordinates.
    ///
    /// The longitude takes its quadrant from the sign of `y`. The latitude is
    /// found by fixed-point iteration, stopping once successive values differ
    /// by less than `settings.tolerance`. The height is the distance to the
    /// foot point, negated when the point lies inside the ellipsoid.
    ///
    /// Heights are accurate to better than a millimetre only for |h| of a
    /// metre or more. Within a few centimetres of the surface the residual
    /// latitude error dominates the distance: with the default tolerance a
    /// point 1 cm above the ellipsoid at 73.5° S comes back about 2 cm off,
    /// and near the equator the error reaches about 4 cm. Heights there may
    /// also flip sign.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Domain`] for non-finite coordinates and for points on
    /// the polar axis, where the longitude is undefined, and
    /// [`Error::Convergence`] if the latitude has not settled after
    /// `settings.max_iterations` steps.
    pub fn get_blh_with(&self, point: &XyzPoint, settings: &SolverSettings) -> Result<BlhPoint, Error> {
        if !(point.x.is_finite() && point.y.is_finite() && point.z.is_finite()) {
            warn!("Point {} has non-finite coordinates", point.id);
            return Err(Error::Domain {
                id: point.id.clone(),
                msg: format!("coordinates ({}, {}, {}) are not finite", point.x, point.y, point.z),
            });
        }

        let rp = point.x.hypot(point.y);
        if rp == 0.0 {
            warn!("Point {} lies on the polar axis", point.id);
            return Err(Error::Domain {
                id: point.id.clone(),
                msg: "point lies on the polar axis, longitude is undefined".to_string(),
            });
        }

        let l = (point.x / rp).acos().copysign(point.y);
        let b = self.solve_latitude(point, rp, settings)?;

        let rn = self.rn(b);
        let delta_r = rp - rn * b.cos();
        let delta_z = point.z - rn * b.sin() + self.normal_offset(b);
        let h = delta_r.hypot(delta_z);
        // Southern points are mirrored so the outward direction is +z
        let below = delta_r < 0.0 || delta_z * b.signum() < 0.0;

        Ok(BlhPoint {
            id: point.id.clone(),
            b,
            l,
            h: if below { -h } else { h },
            tags: point.tags.clone(),
        })
    }

    fn solve_latitude(&self, point: &XyzPoint, rp: f64, settings: &SolverSettings) -> Result<f64, Error> {
        let mut b = (point.z / rp).atan();

        for iteration in 1..=settings.max_iterations {
            let next = ((point.z + self.normal_offset(b)) / rp).atan();
            if (next - b).abs() < settings.tolerance {
                trace!("Latitude of {} converged after {iteration} iterations", point.id);
                return Ok(next);
            }
            b = next;
        }

        warn!(
            "Latitude of {} did not converge after {} iterations",
            point.id,
            settings.max_iterations,
        );
        Err(Error::Convergence {
            id: point.id.clone(),
            iterations: settings.max_iterations,
        })
    }

    /// Batch form of [`Ellipsoid::get_xyz`]. Output order follows input order.
    pub fn get_xyz_all(&self, points: &[BlhPoint]) -> Vec<XyzPoint> {
        #[cfg(feature = "parallel")]
        let iter = points.par_iter();
        #[cfg(not(feature = "parallel"))]
        let iter = points.iter();

        iter.map(|p| self.get_xyz(p)).collect()
    }

    /// Batch form of [`Ellipsoid::get_blh`]. Output order follows input order.
    ///
    /// # Errors
    ///
    /// Fails with the first error any point produces.
    pub fn get_blh_all(&self, points: &[XyzPoint]) -> Result<Vec<BlhPoint>, Error> {
        #[cfg(feature = "parallel")]
        let iter = points.par_iter();
        #[cfg(not(feature = "parallel"))]
        let iter = points.iter();

        iter.map(|p| self.get_blh(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn wgs84_derived_parameters() {
        assert_relative_eq!(WGS84.b(), 6_356_752.314_245_179, epsilon = 1e-3);
        assert_relative_eq!(WGS84.e(), 0.081_819_190_842_622, epsilon = 1e-12);
        assert_relative_eq!(WGS84.n(), 0.001_679_220_386_383_705, epsilon = 1e-12);
        assert_relative_eq!(WGS84.ep2(), WGS84.e2() / (1.0 - WGS84.e2()));
        // Rectifying radius of WGS-84
        assert_relative_eq!(WGS84.r0(), 6_367_449.145_8, epsilon = 1e-3);
    }

    #[test]
    fn predefined_ellipsoids_hold_invariants() {
        for ellipsoid in [&*WGS84, &*WGS72, &*GRS80] {
            assert!(0.0 < ellipsoid.b() && ellipsoid.b() < ellipsoid.a());
            assert!((0.0..1.0).contains(&ellipsoid.e()));
            assert!((0.0..1.0).contains(&ellipsoid.e2()));
            assert_eq!(ellipsoid.rn(0.0), ellipsoid.a());
        }
    }

    #[test]
    fn named_lookup_is_case_insensitive() {
        assert_eq!(Ellipsoid::named("wgs72").unwrap().a(), 6_378_135.0);
        assert!(Ellipsoid::named("Bessel").is_err());
    }

    #[test]
    fn forward_matches_closed_form() {
        let a = 6_378_137.0_f64;
        let e2 = WGS84.e2();
        let (b, l, h) = (0.9_f64, 0.3_f64, 100.0);
        let rn = a / (1.0 - e2 * b.sin().powi(2)).sqrt();

        let xyz = WGS84.get_xyz(&BlhPoint::new("p", b, l, h));

        assert_relative_eq!(xyz.x, (rn + h) * b.cos() * l.cos(), epsilon = 1e-6);
        assert_relative_eq!(xyz.y, (rn + h) * b.cos() * l.sin(), epsilon = 1e-6);
        assert_relative_eq!(xyz.z, (rn * (1.0 - e2) + h) * b.sin(), epsilon = 1e-6);
    }

    #[test]
    fn inverse_restores_all_quadrants() {
        for (b, l, h) in [
            (0.9, 0.3, 100.0),
            (-0.7, 2.5, 1500.0),
            (0.2, -1.2, -30.0),
            (-1.2, -2.9, 8000.0),
            (0.0, 3.0, 0.5),
        ] {
            let p = BlhPoint::new("q", b, l, h);
            let back = WGS84.get_blh(&WGS84.get_xyz(&p)).unwrap();
            assert_relative_eq!(back.b, b, epsilon = 1e-6);
            assert_relative_eq!(back.l, l, epsilon = 1e-9);
            assert_relative_eq!(back.h, h, epsilon = 1e-3);
        }
    }

    #[test]
    fn polar_axis_is_a_domain_error() {
        let pole = XyzPoint::new("pole", 0.0, 0.0, 6_356_752.3);
        match WGS84.get_blh(&pole) {
            Err(Error::Domain { id, .. }) => assert_eq!(id, "pole"),
            other => panic!("expected domain error, got {other:?}"),
        }
    }

    #[test]
    fn non_finite_input_is_a_domain_error() {
        for (x, y, z) in [
            (4_000_000.0, 1_000_000.0, f64::NAN),
            (f64::INFINITY, 0.0, 0.0),
            (4_000_000.0, f64::NEG_INFINITY, 1_000.0),
        ] {
            match WGS84.get_blh(&XyzPoint::new("broken", x, y, z)) {
                Err(Error::Domain { id, .. }) => assert_eq!(id, "broken"),
                other => panic!("expected domain error, got {other:?}"),
            }
        }
    }

    #[test]
    fn height_error_bounds_near_the_surface() {
        let worst = |h: f64| {
            (-890..=890_i32)
                .map(|tenth| {
                    let p = BlhPoint::from_degrees("s", f64::from(tenth) / 10.0, 17.0, h);
                    (WGS84.get_blh(&WGS84.get_xyz(&p)).unwrap().h - h).abs()
                })
                .fold(0_f64, f64::max)
        };

        assert!(worst(1.0) < 1e-3);
        assert!(worst(-1.0) < 1e-3);
        // Centimetre-level close to the surface
        assert!(worst(0.01) < 5e-2);

        let p = BlhPoint::from_degrees("s", -73.5, 17.0, 0.01);
        let back = WGS84.get_blh(&WGS84.get_xyz(&p)).unwrap();
        assert!((back.h - 0.01).abs() > 1e-3);
    }

    #[test]
    fn iteration_cap_is_configurable() {
        let xyz = WGS84.get_xyz(&BlhPoint::new("p", 0.9, 0.3, 100.0));
        let settings = SolverSettings { tolerance: 1e-15, max_iterations: 1 };
        assert!(matches!(
            WGS84.get_blh_with(&xyz, &settings),
            Err(Error::Convergence { iterations: 1, .. })
        ));
    }

    #[test]
    fn batches_keep_order() {
        let points: Vec<_> = (0..20_i32)
            .map(|i| BlhPoint::new(format!("p{i}"), 0.05 * f64::from(i) - 0.5, 0.1 * f64::from(i), 10.0 + f64::from(i)))
            .collect();

        let xyz = WGS84.get_xyz_all(&points);
        let back = WGS84.get_blh_all(&xyz).unwrap();

        assert_eq!(back.len(), points.len());
        for (original, restored) in points.iter().zip(&back) {
            assert_eq!(original.id, restored.id);
            assert_relative_eq!(original.b, restored.b, epsilon = 1e-6);
            assert_relative_eq!(original.h, restored.h, epsilon = 1e-3);
        }
    }
}
