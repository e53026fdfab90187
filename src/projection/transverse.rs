//! Ellipsoidal transverse Mercator and the grid pipeline built on it.
//!
//! National grids such as LKS-94 and SWEREF 99 TM project GRS80 geodetic
//! coordinates with a transverse Mercator and then lay a tile grid over the
//! resulting easting/northing plane:
//!
//! ```text
//! WGS84 lat/lng ──▶ geocentric XYZ ──▶ GRS80 lat/lng ──▶ TM easting/northing ──▶ pixel
//! ```
//!
//! The series expansions follow the classic Snyder/PROJ formulation, accurate
//! to well below a millimeter within a few degrees of the central meridian.

use std::f64::consts::FRAC_PI_2;

use tracing::warn;

use crate::error::ProjectionError;
use crate::geo::{GeoPoint, PixelPoint};

use super::ellipsoid::{Ellipsoid, WGS84};

/// Convergence threshold of the footpoint latitude solver (radians).
const FOOTPOINT_TOLERANCE: f64 = 1e-11;

/// Iteration cap of the footpoint latitude solver.
const FOOTPOINT_MAX_ITERATIONS: usize = 10;

const FC1: f64 = 1.0;
const FC2: f64 = 0.5;
const FC3: f64 = 0.166_666_666_666_666_666_67;
const FC4: f64 = 0.083_333_333_333_333_333_33;
const FC5: f64 = 0.05;
const FC6: f64 = 0.033_333_333_333_333_333_33;
const FC7: f64 = 0.023_809_523_809_523_809_52;
const FC8: f64 = 0.017_857_142_857_142_857_14;

// =============================================================================
// Transverse Mercator
// =============================================================================

/// Transverse Mercator on an ellipsoid.
#[derive(Debug, Clone)]
pub struct TransverseMercator {
    ellipsoid: Ellipsoid,
    /// Central meridian (radians)
    lng0: f64,
    /// Scale factor on the central meridian
    k0: f64,
    false_easting: f64,
    false_northing: f64,
    es: f64,
    esp: f64,
    /// Meridional arc coefficients
    en: [f64; 5],
}

impl TransverseMercator {
    /// Create a projection with the central meridian given in degrees.
    pub fn new(
        ellipsoid: Ellipsoid,
        central_meridian: f64,
        k0: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let es = ellipsoid.es();
        Self {
            ellipsoid,
            lng0: central_meridian.to_radians(),
            k0,
            false_easting,
            false_northing,
            es,
            esp: es / (1.0 - es),
            en: meridional_coefficients(es),
        }
    }

    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    /// Geodetic (radians) to `(easting, northing)` in meters.
    pub fn forward(&self, lat: f64, lng: f64) -> (f64, f64) {
        let lam = lng - self.lng0;
        let (sin_phi, cos_phi) = lat.sin_cos();

        let mut t = if cos_phi.abs() > 1e-10 {
            sin_phi / cos_phi
        } else {
            0.0
        };
        t *= t;

        let mut al = cos_phi * lam;
        let als = al * al;
        al /= (1.0 - self.es * sin_phi * sin_phi).sqrt();
        let n = self.esp * cos_phi * cos_phi;

        let x = self.k0
            * al
            * (FC1
                + FC3
                    * als
                    * (1.0 - t
                        + n
                        + FC5
                            * als
                            * (5.0 + t * (t - 18.0) + n * (14.0 - 58.0 * t)
                                + FC7 * als * (61.0 + t * (t * (179.0 - t) - 479.0)))));

        let y = self.k0
            * (meridional_arc(lat, sin_phi, cos_phi, &self.en)
                + sin_phi
                    * al
                    * lam
                    * FC2
                    * (1.0
                        + FC4
                            * als
                            * (5.0 - t
                                + n * (9.0 + 4.0 * n)
                                + FC6
                                    * als
                                    * (61.0 + t * (t - 58.0) + n * (270.0 - 330.0 * t)
                                        + FC8 * als * (1385.0 + t * (t * (543.0 - t) - 3111.0))))));

        (
            self.ellipsoid.a * x + self.false_easting,
            self.ellipsoid.a * y + self.false_northing,
        )
    }

    /// `(easting, northing)` in meters to geodetic `(lat, lng)` in radians.
    pub fn inverse(&self, easting: f64, northing: f64) -> Result<(f64, f64), ProjectionError> {
        let x = (easting - self.false_easting) / self.ellipsoid.a;
        let y = (northing - self.false_northing) / self.ellipsoid.a;

        let phi = self.footpoint_latitude(y / self.k0)?;

        if phi.abs() >= FRAC_PI_2 {
            let lat = if y < 0.0 { -FRAC_PI_2 } else { FRAC_PI_2 };
            return Ok((lat, self.lng0));
        }

        let (sin_phi, cos_phi) = phi.sin_cos();
        let mut t = if cos_phi.abs() > 1e-10 {
            sin_phi / cos_phi
        } else {
            0.0
        };
        let n = self.esp * cos_phi * cos_phi;
        let mut con = 1.0 - self.es * sin_phi * sin_phi;
        let d = x * con.sqrt() / self.k0;
        con *= t;
        t *= t;
        let ds = d * d;

        let lat = phi
            - (con * ds / (1.0 - self.es))
                * FC2
                * (1.0
                    - ds * FC4
                        * (5.0 + t * (3.0 - 9.0 * n) + n * (1.0 - 4.0 * n)
                            - ds * FC6
                                * (61.0 + t * (90.0 - 252.0 * n + 45.0 * t) + 46.0 * n
                                    - ds * FC8
                                        * (1385.0
                                            + t * (3633.0 + t * (4095.0 + 1575.0 * t))))));

        let lam = d
            * (FC1
                - ds * FC3
                    * (1.0 + 2.0 * t + n
                        - ds * FC5
                            * (5.0 + t * (28.0 + 24.0 * t + 8.0 * n) + 6.0 * n
                                - ds * FC7 * (61.0 + t * (662.0 + t * (1320.0 + 720.0 * t))))))
            / cos_phi;

        Ok((lat, lam + self.lng0))
    }

    /// Latitude whose meridional arc equals `arc` (Newton iteration).
    fn footpoint_latitude(&self, arc: f64) -> Result<f64, ProjectionError> {
        let k = 1.0 / (1.0 - self.es);
        let mut phi = arc;

        for _ in 0..FOOTPOINT_MAX_ITERATIONS {
            let (s, c) = phi.sin_cos();
            let t = 1.0 - self.es * s * s;
            let step = (meridional_arc(phi, s, c, &self.en) - arc) * (t * t.sqrt()) * k;
            phi -= step;

            if step.abs() < FOOTPOINT_TOLERANCE {
                return Ok(phi);
            }
        }

        Err(ProjectionError::NoConvergence {
            stage: "transverse mercator footpoint latitude",
            iterations: FOOTPOINT_MAX_ITERATIONS,
        })
    }
}

fn meridional_coefficients(es: f64) -> [f64; 5] {
    const C00: f64 = 1.0;
    const C02: f64 = 0.25;
    const C04: f64 = 0.046875;
    const C06: f64 = 0.01953125;
    const C08: f64 = 0.01068115234375;
    const C22: f64 = 0.75;
    const C44: f64 = 0.46875;
    const C46: f64 = 0.013_020_833_333_333_333_33;
    const C48: f64 = 0.007_120_768_229_166_666_66;
    const C66: f64 = 0.364_583_333_333_333_333_33;
    const C68: f64 = 0.005_696_614_583_333_333_33;
    const C88: f64 = 0.3076171875;

    let mut en = [0.0; 5];
    en[0] = C00 - es * (C02 + es * (C04 + es * (C06 + es * C08)));
    en[1] = es * (C22 - es * (C04 + es * (C06 + es * C08)));
    let mut t = es * es;
    en[2] = t * (C44 - es * (C46 + es * C48));
    t *= es;
    en[3] = t * (C66 - es * C68);
    en[4] = t * es * C88;
    en
}

/// Meridional arc length from the equator, in units of the semi-major axis.
fn meridional_arc(phi: f64, sin_phi: f64, cos_phi: f64, en: &[f64; 5]) -> f64 {
    let cs = cos_phi * sin_phi;
    let s2 = sin_phi * sin_phi;
    en[0] * phi - cs * (en[1] + s2 * (en[2] + s2 * (en[3] + s2 * en[4])))
}

// =============================================================================
// Grid
// =============================================================================

/// A tile grid laid over a transverse Mercator plane.
///
/// Pixel `(0, 0)` sits at `(origin_x, origin_y)` in projected meters; x grows
/// east and y grows south. Each zoom level has a fixed resolution in meters
/// per pixel.
#[derive(Debug, Clone)]
pub(crate) struct TransverseGrid {
    pub(crate) tm: TransverseMercator,
    pub(crate) origin_x: f64,
    pub(crate) origin_y: f64,
    pub(crate) resolutions: &'static [f64],
}

impl TransverseGrid {
    pub(crate) fn max_zoom(&self) -> u8 {
        (self.resolutions.len() - 1) as u8
    }

    pub(crate) fn resolution(&self, zoom: u8) -> f64 {
        self.resolutions[usize::from(zoom.min(self.max_zoom()))]
    }

    /// WGS84 lat/lng (degrees) to pixel. The caller has clamped the input.
    ///
    /// The inverse geocentric step cannot fail for points on the ellipsoid
    /// surface; should it ever, the WGS84 coordinates are used unchanged, which
    /// differ from GRS80 by well under a millimeter.
    pub(crate) fn to_pixel(&self, lat: f64, lng: f64, zoom: u8) -> PixelPoint {
        let (lat, lng) = (lat.to_radians(), lng.to_radians());
        let (lat, lng) = match WGS84.transform_to(self.tm.ellipsoid(), lat, lng) {
            Ok(shifted) => shifted,
            Err(e) => {
                warn!(
                    lat = lat.to_degrees(),
                    lng = lng.to_degrees(),
                    error = %e,
                    "Datum shift failed, projecting WGS84 coordinates unchanged"
                );
                (lat, lng)
            }
        };

        let (easting, northing) = self.tm.forward(lat, lng);
        let res = self.resolution(zoom);

        PixelPoint::new(
            ((easting - self.origin_x) / res).floor() as i64,
            ((self.origin_y - northing) / res).floor() as i64,
        )
    }

    /// Pixel to WGS84 lat/lng (degrees).
    pub(crate) fn to_lat_lng(
        &self,
        x: i64,
        y: i64,
        zoom: u8,
    ) -> Result<GeoPoint, ProjectionError> {
        let res = self.resolution(zoom);
        let easting = x as f64 * res + self.origin_x;
        let northing = self.origin_y - y as f64 * res;

        let (lat, lng) = self.tm.inverse(easting, northing)?;
        let (lat, lng) = self.tm.ellipsoid().transform_to(&WGS84, lat, lng)?;

        Ok(GeoPoint::new(lat.to_degrees(), lng.to_degrees()))
    }
}
