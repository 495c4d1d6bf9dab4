// Semi-major axis a
pub(crate) const WGS84_A: f64 = 6_378_137.;
// Inverse flattening
#[allow(clippy::unreadable_literal)]
pub(crate) const WGS84_INV_F: f64 = 298.257223563;

pub(crate) const WGS72_A: f64 = 6_378_135.;
pub(crate) const WGS72_INV_F: f64 = 298.26;

pub(crate) const GRS80_A: f64 = 6_378_137.;
#[allow(clippy::unreadable_literal)]
pub(crate) const GRS80_INV_F: f64 = 298.257222101;

// UTM central scale factor
pub(crate) const UTM_K0: f64 = 9996.0 / 10_000.;
// Gauss-Kruger central scale factor
pub(crate) const GK_K0: f64 = 1.0;

pub(crate) const UTM_FALSE_EASTING: f64 = 500_000.;
pub(crate) const UTM_SOUTH_FALSE_NORTHING: f64 = 10_000_000.;
// Gauss-Kruger false easting is zone * GK_ZONE_BAND + GK_FALSE_EASTING
pub(crate) const GK_ZONE_BAND: f64 = 1_000_000.;
pub(crate) const GK_FALSE_EASTING: f64 = 500_000.;

/// DoD WGS-72 to WGS-84 relationship parameters
pub(crate) mod wgs72 {
    /// Flattening difference
    #[allow(clippy::unreadable_literal)]
    pub const DELTA_F: f64 = 0.3121057e-7;
    /// WGS-72 semi-major axis
    pub const A: f64 = 6_378_135.0;
    /// Semi-major axis difference
    pub const DELTA_A: f64 = 2.0;
    /// Radial shift
    pub const DELTA_R: f64 = 1.4;
    /// Longitude shift in arc seconds
    pub const DELTA_LAMBDA_SEC: f64 = 0.554;
    /// Origin shift along the Z axis
    pub const DELTA_Z: f64 = 4.5;
}

// Latitude solver defaults
pub(crate) const LATITUDE_TOLERANCE: f64 = 1e-6;
pub(crate) const LATITUDE_MAX_ITERATIONS: usize = 50;
