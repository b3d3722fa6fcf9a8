//! Core units, constants, and shared primitives for the orbits workspace.
//!
//! Distances are kilometres, masses kilograms, times seconds and angles radians unless a name
//! says otherwise.

use serde::{Deserialize, Serialize};

/// Physical constants expressed in kilometre/kilogram/second units.
pub mod constants {
    /// Newtonian constant of gravitation (km³ kg⁻¹ s⁻²).
    pub const G_KM3_KG_S2: f64 = 6.674_30e-20;
    /// Seconds per hour.
    pub const SECONDS_PER_HOUR: f64 = 3_600.0;
    /// Seconds per day.
    pub const SECONDS_PER_DAY: f64 = 86_400.0;
    /// Length of the sidereal Earth year in days.
    pub const EARTH_YEAR_DAYS: f64 = 365.256_363_004;
    /// Kilometres per astronomical unit, as used by the body tables.
    pub const AU_KM: f64 = 149_598_073.0;
}

/// Basic unit conversion helpers.
pub mod units {
    use super::constants::{AU_KM, EARTH_YEAR_DAYS, G_KM3_KG_S2, SECONDS_PER_DAY, SECONDS_PER_HOUR};

    /// Convert degrees to radians.
    #[inline]
    pub fn deg_to_rad(v: f64) -> f64 {
        v.to_radians()
    }

    /// Convert radians to degrees.
    #[inline]
    pub fn rad_to_deg(v: f64) -> f64 {
        v.to_degrees()
    }

    /// Convert hours to seconds.
    #[inline]
    pub fn hours_to_seconds(hours: f64) -> f64 {
        hours * SECONDS_PER_HOUR
    }

    /// Convert days to seconds.
    #[inline]
    pub fn days_to_seconds(days: f64) -> f64 {
        days * SECONDS_PER_DAY
    }

    /// Convert sidereal Earth years to seconds.
    #[inline]
    pub fn years_to_seconds(years: f64) -> f64 {
        days_to_seconds(years * EARTH_YEAR_DAYS)
    }

    /// Convert astronomical units to kilometres.
    #[inline]
    pub fn au_to_km(au: f64) -> f64 {
        au * AU_KM
    }

    /// Unit system for the gravitational constant.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum GravityUnits {
        /// km³ kg⁻¹ s⁻²
        Kilometres,
        /// m³ kg⁻¹ s⁻²
        Metres,
        /// G = 1
        Natural,
    }

    /// The gravitational constant in the requested unit system.
    pub fn gravity(units: GravityUnits) -> f64 {
        match units {
            GravityUnits::Kilometres => G_KM3_KG_S2,
            GravityUnits::Metres => G_KM3_KG_S2 * 1.0e9,
            GravityUnits::Natural => 1.0,
        }
    }
}

/// Minimal vector helpers to avoid ad-hoc `[f64; 3]` math everywhere.
pub mod vector {
    /// Alias for a 3D vector in kilometres or km/s depending on context.
    pub type Vector3 = [f64; 3];

    /// Unit vector along +z.
    pub const K_HAT: Vector3 = [0.0, 0.0, 1.0];

    /// Euclidean norm of a vector.
    #[inline]
    pub fn norm(v: &Vector3) -> f64 {
        dot(v, v).sqrt()
    }

    /// Dot product of two vectors.
    #[inline]
    pub fn dot(a: &Vector3, b: &Vector3) -> f64 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    /// Right-handed cross product `a × b`.
    #[inline]
    pub fn cross(a: &Vector3, b: &Vector3) -> Vector3 {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    /// Vector addition.
    #[inline]
    pub fn add(a: &Vector3, b: &Vector3) -> Vector3 {
        [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
    }

    /// Vector subtraction.
    #[inline]
    pub fn sub(a: &Vector3, b: &Vector3) -> Vector3 {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    /// Scale a vector by a scalar.
    #[inline]
    pub fn scale(v: &Vector3, s: f64) -> Vector3 {
        [v[0] * s, v[1] * s, v[2] * s]
    }

    /// Unit vector in the direction of `v`, or `None` for the zero vector.
    #[inline]
    pub fn unit(v: &Vector3) -> Option<Vector3> {
        let n = norm(v);
        (n > 0.0).then(|| scale(v, 1.0 / n))
    }
}

/// Row-major 3×3 matrices acting on [`vector::Vector3`].
pub mod matrix {
    use super::vector::{Vector3, dot};

    pub type Matrix3 = [[f64; 3]; 3];

    pub const IDENTITY: Matrix3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

    /// Matrix-vector product `m · v`.
    #[inline]
    pub fn mul_vec(m: &Matrix3, v: &Vector3) -> Vector3 {
        [dot(&m[0], v), dot(&m[1], v), dot(&m[2], v)]
    }

    /// Matrix product `a · b`.
    pub fn mul(a: &Matrix3, b: &Matrix3) -> Matrix3 {
        let mut out = [[0.0; 3]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| a[i][k] * b[k][j]).sum();
            }
        }
        out
    }

    /// Transpose; the inverse of a rotation matrix.
    pub fn transpose(m: &Matrix3) -> Matrix3 {
        [
            [m[0][0], m[1][0], m[2][0]],
            [m[0][1], m[1][1], m[2][1]],
            [m[0][2], m[1][2], m[2][2]],
        ]
    }
}

use vector::Vector3;

/// Position and velocity of a body relative to an attracting centre, in one inertial frame
/// (geocentric-equatorial by convention).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateVector {
    pub position_km: Vector3,
    pub velocity_km_s: Vector3,
}

impl StateVector {
    pub fn new(position_km: Vector3, velocity_km_s: Vector3) -> Self {
        Self {
            position_km,
            velocity_km_s,
        }
    }

    /// Distance from the attracting centre (km).
    pub fn radius_km(&self) -> f64 {
        vector::norm(&self.position_km)
    }

    /// Speed relative to the attracting centre (km/s).
    pub fn speed_km_s(&self) -> f64 {
        vector::norm(&self.velocity_km_s)
    }

    /// Re-express a state given relative to `primary` in the frame `primary` itself is given in.
    pub fn offset_by(&self, primary: &StateVector) -> StateVector {
        StateVector {
            position_km: vector::add(&self.position_km, &primary.position_km),
            velocity_km_s: vector::add(&self.velocity_km_s, &primary.velocity_km_s),
        }
    }
}
