//! Rotation matrices between the reference frames used by the orbit models.
//!
//! - Perifocal (p-q-w): orbit plane, x toward periapsis (or toward the node / reference
//!   direction when periapsis is undefined).
//! - Geocentric equatorial (i-j-k): x toward the vernal equinox, z toward the north pole.
//! - Topocentric (S-E-Z): south, east and zenith at a ground station.
//!
//! All matrices are orthonormal, so the inverse of each is its transpose.

use orbits_core::matrix::{self, IDENTITY, Matrix3};
use orbits_core::vector::Vector3;

/// Right-handed rotation by `angle` about the x-axis.
pub fn rotate_x(angle: f64) -> Matrix3 {
    let (s, c) = angle.sin_cos();
    [[1.0, 0.0, 0.0], [0.0, c, -s], [0.0, s, c]]
}

/// Right-handed rotation by `angle` about the y-axis.
pub fn rotate_y(angle: f64) -> Matrix3 {
    let (s, c) = angle.sin_cos();
    [[c, 0.0, s], [0.0, 1.0, 0.0], [-s, 0.0, c]]
}

/// Right-handed rotation by `angle` about the z-axis.
pub fn rotate_z(angle: f64) -> Matrix3 {
    let (s, c) = angle.sin_cos();
    [[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]]
}

/// Perifocal to equatorial for an inclined, eccentric orbit given inclination, longitude of the
/// ascending node and argument of periapsis.
pub fn perifocal_to_equatorial(inclination: f64, raan: f64, arg_periapsis: f64) -> Matrix3 {
    let (si, ci) = inclination.sin_cos();
    let (so, co) = raan.sin_cos();
    let (sw, cw) = arg_periapsis.sin_cos();
    [
        [co * cw - so * sw * ci, -co * sw - so * cw * ci, so * si],
        [so * cw + co * sw * ci, -so * sw + co * cw * ci, -co * si],
        [sw * si, cw * si, ci],
    ]
}

/// Perifocal to equatorial for an inclined circular orbit. The perifocal x-axis points at the
/// ascending node, so the epoch angle is the argument of latitude.
pub fn perifocal_to_equatorial_circular(inclination: f64, raan: f64) -> Matrix3 {
    perifocal_to_equatorial(inclination, raan, 0.0)
}

/// Perifocal to equatorial for an orbit lying in the equatorial plane (inclination 0 or π).
///
/// `longitude_of_periapsis` is the angle of the periapsis direction measured from the x-axis.
/// A retrograde orbit keeps that direction and flips the orbit normal.
pub fn perifocal_to_equatorial_flat(inclination: f64, longitude_of_periapsis: f64) -> Matrix3 {
    matrix::mul(&rotate_z(longitude_of_periapsis), &rotate_x(inclination))
}

/// Geocentric equatorial to topocentric (S-E-Z) at a station of geodetic `latitude` and local
/// sidereal time `lst`, both in radians.
pub fn equatorial_to_topocentric(latitude: f64, lst: f64) -> Matrix3 {
    matrix::mul(
        &rotate_y(latitude - std::f64::consts::FRAC_PI_2),
        &rotate_z(-lst),
    )
}

/// Topocentric (S-E-Z) to geocentric equatorial.
pub fn topocentric_to_equatorial(latitude: f64, lst: f64) -> Matrix3 {
    matrix::transpose(&equatorial_to_topocentric(latitude, lst))
}

/// Rotation by `angle` about the unit vector `axis` (Rodrigues' formula).
pub fn rodrigues(axis: &Vector3, angle: f64) -> Matrix3 {
    let w = [
        [0.0, -axis[2], axis[1]],
        [axis[2], 0.0, -axis[0]],
        [-axis[1], axis[0], 0.0],
    ];
    let w2 = matrix::mul(&w, &w);
    let s = angle.sin();
    let k = 2.0 * (angle / 2.0).sin().powi(2);
    let mut out = IDENTITY;
    for i in 0..3 {
        for j in 0..3 {
            out[i][j] += s * w[i][j] + k * w2[i][j];
        }
    }
    out
}

/// Axis permutation expected by the rendering side: x out of the screen, y right, z up.
pub fn renderer_axes() -> Matrix3 {
    [[0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]]
}
