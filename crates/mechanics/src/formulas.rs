//! Closed-form two-body relations.
//!
//! Distances in km, speeds in km/s, `mu` in km³/s², angles in radians.

use orbits_core::vector::{self, K_HAT, Vector3};

use crate::conic::{Conic, DEFAULT_CONIC_TOLERANCE};
use crate::{MechanicsError, Result};

/// Radius on a conic at true anomaly `nu`: `p / (1 + e cos ν)`.
///
/// Unbounded at the hyperbolic asymptote; callers must keep `nu` inside the reachable range.
#[inline]
pub fn orbital_radius(p: f64, e: f64, nu: f64) -> f64 {
    p / (1.0 + e * nu.cos())
}

/// Speed at radius `r` on an orbit with semi-major axis `a` (negative for hyperbolas).
pub fn vis_viva(r: f64, a: f64, mu: f64) -> Result<f64> {
    if a == 0.0 || r <= 0.0 {
        return Err(MechanicsError::Domain(format!(
            "vis-viva needs a non-zero semi-major axis and positive radius (r={r}, a={a})"
        )));
    }
    let radicand = mu * (2.0 / r - 1.0 / a);
    if radicand < 0.0 {
        return Err(MechanicsError::Domain(format!(
            "radius {r} km is unreachable on an orbit with a={a} km"
        )));
    }
    Ok(radicand.sqrt())
}

#[inline]
pub fn circular_speed(r: f64, mu: f64) -> f64 {
    (mu / r).sqrt()
}

#[inline]
pub fn escape_speed(r: f64, mu: f64) -> f64 {
    (2.0 * mu / r).sqrt()
}

/// Speed left over at infinity for an object moving at `speed` at radius `r`.
pub fn hyperbolic_excess_speed(r: f64, speed: f64, mu: f64) -> Result<f64> {
    let escape = escape_speed(r, mu);
    if speed < escape {
        return Err(MechanicsError::Domain(format!(
            "speed {speed} km/s is below the escape speed {escape} km/s"
        )));
    }
    Ok((speed * speed - escape * escape).sqrt())
}

/// Angle through which a hyperbolic trajectory bends its velocity; `None` for closed orbits.
pub fn turning_angle(e: f64) -> Option<f64> {
    (e > 1.0).then(|| 2.0 * (1.0 / e).asin())
}

#[inline]
pub fn periapsis_from_semi_major_axis(a: f64, e: f64) -> f64 {
    a * (1.0 - e)
}

#[inline]
pub fn periapsis_from_semi_latus_rectum(p: f64, e: f64) -> f64 {
    p / (1.0 + e)
}

/// Apoapsis radius; `None` for open trajectories.
pub fn apoapsis_from_semi_major_axis(a: f64, e: f64) -> Option<f64> {
    (e < 1.0).then(|| a * (1.0 + e))
}

/// Apoapsis radius; `None` for open trajectories.
pub fn apoapsis_from_semi_latus_rectum(p: f64, e: f64) -> Option<f64> {
    (e < 1.0).then(|| p / (1.0 - e))
}

/// Periapsis and (when it exists) apoapsis radii from the semi-latus rectum.
pub fn apsides(p: f64, e: f64) -> (f64, Option<f64>) {
    (
        periapsis_from_semi_latus_rectum(p, e),
        apoapsis_from_semi_latus_rectum(p, e),
    )
}

/// `h² / μ`
#[inline]
pub fn semi_latus_rectum(angular_momentum: f64, mu: f64) -> f64 {
    angular_momentum * angular_momentum / mu
}

/// `p / (1 − e²)`; `None` for a parabola, whose semi-major axis is unbounded.
pub fn semi_major_axis_from_conic(p: f64, e: f64) -> Option<f64> {
    match Conic::classify(e, DEFAULT_CONIC_TOLERANCE) {
        Ok(Conic::Parabola) => None,
        _ => Some(p / (1.0 - e * e)),
    }
}

/// Semi-major axis of the ellipse whose apsides are `r1` and `r2`.
#[inline]
pub fn semi_major_axis_from_radii(r1: f64, r2: f64) -> f64 {
    0.5 * (r1 + r2)
}

/// Specific mechanical energy `v²/2 − μ/r`.
#[inline]
pub fn mechanical_energy(r: f64, speed: f64, mu: f64) -> f64 {
    speed * speed / 2.0 - mu / r
}

#[inline]
pub fn period(a: f64, mu: f64) -> f64 {
    std::f64::consts::TAU * (a.powi(3) / mu).sqrt()
}

/// Inclination reached by a direct launch from `latitude` on `azimuth` (from north, eastward).
pub fn inclination_from_launch(latitude: f64, azimuth: f64) -> f64 {
    (azimuth.sin() * latitude.cos()).clamp(-1.0, 1.0).acos()
}

/// Specific angular momentum `r × v`.
#[inline]
pub fn angular_momentum(r: &Vector3, v: &Vector3) -> Vector3 {
    vector::cross(r, v)
}

/// Ascending-node vector `k̂ × h`.
#[inline]
pub fn node_vector(h: &Vector3) -> Vector3 {
    vector::cross(&K_HAT, h)
}

/// Eccentricity vector, pointing from the focus toward periapsis.
pub fn eccentricity_vector(r: &Vector3, v: &Vector3, mu: f64) -> Vector3 {
    let r_mag = vector::norm(r);
    let v_mag = vector::norm(v);
    let radial = vector::scale(r, v_mag * v_mag - mu / r_mag);
    let along = vector::scale(v, vector::dot(r, v));
    vector::scale(&vector::sub(&radial, &along), 1.0 / mu)
}
