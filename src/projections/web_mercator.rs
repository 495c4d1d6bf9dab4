//! Web Mercator (EPSG:3857): spherical Mercator on the WGS-84 semi-major axis.
//!
//!   forward: x = a·λ, y = a·ln(tan(π/4 + φ/2))
//!   inverse: λ = x/a, φ = 2·atan(exp(y/a)) - π/2

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use crate::constants::WGS84_A;

/// Latitude where the projection becomes a square, atan(sinh(π)) in radians.
pub(crate) const MAX_LATITUDE: f64 = 1.484_422_229_745_332_4;

pub(crate) struct WebMercator {
    a: f64,
}

impl WebMercator {
    pub fn new() -> WebMercator {
        Self { a: WGS84_A }
    }

    /// Half the width of the square map, π·a.
    pub fn extent(&self) -> f64 {
        PI * self.a
    }

    /// `(lon, lat)` in radians to `(x, y)` in meters. Callers keep `lat`
    /// within ±[`MAX_LATITUDE`].
    pub fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        let x = self.a * lon;
        let y = self.a * (FRAC_PI_4 + lat / 2.0).tan().ln();
        (x, y)
    }

    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let lon = x / self.a;
        let lat = 2.0 * (y / self.a).exp().atan() - FRAC_PI_2;
        (lon, lat)
    }
}
