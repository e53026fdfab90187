//! Reference ellipsoids and geodetic ⇄ geocentric conversion.

use std::f64::consts::FRAC_PI_2;

use crate::error::ProjectionError;

/// Convergence threshold of the geocentric → geodetic solver.
const GEOCENTRIC_TOLERANCE: f64 = 1e-12;

/// Iteration cap of the geocentric → geodetic solver.
const GEOCENTRIC_MAX_ITERATIONS: usize = 30;

/// A reference ellipsoid given by semi-major axis and flattening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis in meters
    pub a: f64,

    /// Flattening
    pub f: f64,
}

/// World Geodetic System 1984.
pub const WGS84: Ellipsoid = Ellipsoid {
    a: 6_378_137.0,
    f: 1.0 / 298.257_223_563,
};

/// Geodetic Reference System 1980.
pub const GRS80: Ellipsoid = Ellipsoid {
    a: 6_378_137.0,
    f: 1.0 / 298.257_222_101,
};

impl Ellipsoid {
    /// Semi-minor axis.
    pub fn b(&self) -> f64 {
        self.a * (1.0 - self.f)
    }

    /// First eccentricity squared.
    pub fn es(&self) -> f64 {
        self.f * (2.0 - self.f)
    }

    /// First eccentricity.
    pub fn e(&self) -> f64 {
        self.es().sqrt()
    }

    /// Geodetic (radians, meters) to geocentric cartesian `[x, y, z]` in meters.
    pub fn geodetic_to_geocentric(&self, lat: f64, lng: f64, height: f64) -> [f64; 3] {
        let es = self.es();
        let (sin_lat, cos_lat) = lat.sin_cos();
        let rn = self.a / (1.0 - es * sin_lat * sin_lat).sqrt();

        [
            (rn + height) * cos_lat * lng.cos(),
            (rn + height) * cos_lat * lng.sin(),
            (rn * (1.0 - es) + height) * sin_lat,
        ]
    }

    /// Geocentric cartesian to geodetic `(lat, lng, height)` (radians, meters).
    ///
    /// Fixed-point iteration on latitude. Points on the polar axis are
    /// resolved directly: longitude is undefined there and reported as zero,
    /// and the center of the earth maps to the north pole at height `-b`.
    pub fn geocentric_to_geodetic(
        &self,
        xyz: [f64; 3],
    ) -> Result<(f64, f64, f64), ProjectionError> {
        let [x, y, z] = xyz;
        let es = self.es();
        let b = self.b();

        let p = (x * x + y * y).sqrt();
        let rr = (x * x + y * y + z * z).sqrt();

        if p / self.a < GEOCENTRIC_TOLERANCE {
            if rr / self.a < GEOCENTRIC_TOLERANCE {
                return Ok((FRAC_PI_2, 0.0, -b));
            }
            let lat = if z < 0.0 { -FRAC_PI_2 } else { FRAC_PI_2 };
            return Ok((lat, 0.0, z.abs() - b));
        }

        let lng = y.atan2(x);

        let ct = z / rr;
        let st = p / rr;
        let mut rx = 1.0 / (1.0 - es * (2.0 - es) * st * st).sqrt();
        let mut cphi0 = st * (1.0 - es) * rx;
        let mut sphi0 = ct * rx;

        for _ in 0..GEOCENTRIC_MAX_ITERATIONS {
            let rn = self.a / (1.0 - es * sphi0 * sphi0).sqrt();
            let height = p * cphi0 + z * sphi0 - rn * (1.0 - es * sphi0 * sphi0);

            let rk = es * rn / (rn + height);
            rx = 1.0 / (1.0 - rk * (2.0 - rk) * st * st).sqrt();
            let cphi = st * (1.0 - rk) * rx;
            let sphi = ct * rx;
            let sdphi = sphi * cphi0 - cphi * sphi0;

            cphi0 = cphi;
            sphi0 = sphi;

            if sdphi * sdphi <= GEOCENTRIC_TOLERANCE * GEOCENTRIC_TOLERANCE {
                let lat = (sphi / cphi.abs()).atan();
                return Ok((lat, lng, height));
            }
        }

        Err(ProjectionError::NoConvergence {
            stage: "geocentric to geodetic",
            iterations: GEOCENTRIC_MAX_ITERATIONS,
        })
    }

    /// Re-express a geodetic position on `target`, going through geocentric
    /// coordinates. Both ellipsoids share the same center and orientation.
    pub fn transform_to(
        &self,
        target: &Ellipsoid,
        lat: f64,
        lng: f64,
    ) -> Result<(f64, f64), ProjectionError> {
        let xyz = self.geodetic_to_geocentric(lat, lng, 0.0);
        let (lat, lng, _) = target.geocentric_to_geodetic(xyz)?;
        Ok((lat, lng))
    }
}
