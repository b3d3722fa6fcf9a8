//! Analytic estimators for impulsive transfers between circular, coplanar orbits.
//!
//! Every tangential Δv is signed: positive along the instantaneous velocity when the transfer
//! heads outward, negative (retrograde) when it heads inward.

use std::f64::consts::PI;

use orbits_mechanics::{
    Conic, DEFAULT_CONIC_TOLERANCE, apoapsis_from_semi_latus_rectum, circular_speed, flight_time,
    period, periapsis_from_semi_latus_rectum, semi_major_axis_from_radii, vis_viva,
};

use crate::{ManeuverError, Result};

/// Apply the outward-positive sign rule to a Δv magnitude for a leg from `from_km` to `to_km`.
#[inline]
pub fn directed(magnitude: f64, from_km: f64, to_km: f64) -> f64 {
    if to_km < from_km { -magnitude } else { magnitude }
}

fn check_radius(name: &'static str, value: f64) -> Result<()> {
    if value.is_nan() || value <= 0.0 {
        return Err(ManeuverError::InvalidRadius { name, value });
    }
    Ok(())
}

/// |vis-viva speed on the transfer orbit − circular speed| at `r`.
fn tangential_delta_v(r: f64, a_transfer: f64, mu: f64) -> Result<f64> {
    Ok((vis_viva(r, a_transfer, mu)? - circular_speed(r, mu)).abs())
}

/// Time to travel from `r_from` to `r_to` on a transfer orbit with semi-major axis
/// `(r_from + r_to) / 2` and eccentricity `e`. A circular `e` gives the half-period.
pub fn transfer_time(r_from: f64, r_to: f64, e: f64, mu: f64) -> Result<f64> {
    let a = semi_major_axis_from_radii(r_from, r_to);
    if Conic::classify(e, DEFAULT_CONIC_TOLERANCE)? == Conic::Circle {
        return Ok(period(a, mu) / 2.0);
    }
    let p = a * (1.0 - e * e);
    let anomaly = |r: f64| (((p / r) - 1.0) / e).clamp(-1.0, 1.0).acos();
    Ok(flight_time(e, p, anomaly(r_from), anomaly(r_to), 0, mu)?.abs())
}

/// Result for a Hohmann transfer between circular, coplanar orbits of radii r1 and r2.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HohmannResult {
    pub dv1_km_s: f64,
    pub dv2_km_s: f64,
    /// |dv1| + |dv2|
    pub dv_total_km_s: f64,
    pub tof_seconds: f64,
}

/// Classical two-impulse Hohmann transfer.
pub fn hohmann(r1_km: f64, r2_km: f64, mu_km3_s2: f64) -> Result<HohmannResult> {
    check_radius("initial radius", r1_km)?;
    check_radius("final radius", r2_km)?;
    let a_t = semi_major_axis_from_radii(r1_km, r2_km);
    let dv1 = directed(tangential_delta_v(r1_km, a_t, mu_km3_s2)?, r1_km, r2_km);
    let dv2 = directed(tangential_delta_v(r2_km, a_t, mu_km3_s2)?, r1_km, r2_km);

    Ok(HohmannResult {
        dv1_km_s: dv1,
        dv2_km_s: dv2,
        dv_total_km_s: dv1.abs() + dv2.abs(),
        tof_seconds: transfer_time(r1_km, r2_km, 0.0, mu_km3_s2)?,
    })
}

/// Result for a bi-elliptic transfer parameterized by the intermediate apoapsis radius r_b.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiEllipticResult {
    pub rb_km: f64,
    pub dv1_km_s: f64,
    pub dv2_km_s: f64,
    pub dv3_km_s: f64,
    pub dv_total_km_s: f64,
    pub tof1_seconds: f64,
    pub tof2_seconds: f64,
}

impl BiEllipticResult {
    pub fn tof_seconds(&self) -> f64 {
        self.tof1_seconds + self.tof2_seconds
    }
}

/// Three-impulse transfer out to `rb_km` on a first ellipse (r1 → rb), then down a second
/// (rb → r2).
///
/// `rb_km` is not optimized; for very large r2/r1 ratios a distant `rb` beats Hohmann.
pub fn bi_elliptic(r1_km: f64, r2_km: f64, rb_km: f64, mu_km3_s2: f64) -> Result<BiEllipticResult> {
    check_radius("initial radius", r1_km)?;
    check_radius("final radius", r2_km)?;
    check_radius("transfer apoapsis", rb_km)?;

    let a1 = semi_major_axis_from_radii(r1_km, rb_km);
    let a2 = semi_major_axis_from_radii(rb_km, r2_km);

    let dv1 = directed(tangential_delta_v(r1_km, a1, mu_km3_s2)?, r1_km, rb_km);
    let match_speeds =
        (vis_viva(rb_km, a2, mu_km3_s2)? - vis_viva(rb_km, a1, mu_km3_s2)?).abs();
    let dv2 = directed(match_speeds, r1_km, r2_km);
    let dv3 = directed(tangential_delta_v(r2_km, a2, mu_km3_s2)?, rb_km, r2_km);

    Ok(BiEllipticResult {
        rb_km,
        dv1_km_s: dv1,
        dv2_km_s: dv2,
        dv3_km_s: dv3,
        dv_total_km_s: dv1.abs() + dv2.abs() + dv3.abs(),
        tof1_seconds: transfer_time(r1_km, rb_km, 0.0, mu_km3_s2)?,
        tof2_seconds: transfer_time(rb_km, r2_km, 0.0, mu_km3_s2)?,
    })
}

/// Two-impulse transfer on an orbit of eccentricity `e` with semi-major axis `(r1 + r2) / 2`.
///
/// The Δv are magnitudes; the direction is carried by the burn angles, measured from the
/// current velocity about the orbit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneralTransferResult {
    pub transfer_eccentricity: f64,
    pub dv1_km_s: f64,
    pub dv2_km_s: f64,
    pub burn_angle1_rad: f64,
    pub burn_angle2_rad: f64,
    pub tof_seconds: f64,
}

pub fn general_transfer(r1_km: f64, r2_km: f64, e: f64, mu_km3_s2: f64) -> Result<GeneralTransferResult> {
    check_radius("initial radius", r1_km)?;
    check_radius("final radius", r2_km)?;
    let a = semi_major_axis_from_radii(r1_km, r2_km);
    let p = a * (1.0 - e * e);
    let periapsis = periapsis_from_semi_latus_rectum(p, e);
    let apoapsis = apoapsis_from_semi_latus_rectum(p, e);
    // Relative slack so a tangent (Hohmann) ellipse is accepted despite rounding.
    let slack = 1.0 + 1e-9;
    let reaches = apoapsis.is_some_and(|ra| ra * slack >= r1_km.max(r2_km));
    if e.is_nan() || e < 0.0 || periapsis > r1_km.min(r2_km) * slack || !reaches {
        return Err(ManeuverError::InvalidTransferOrbit(format!(
            "e={e} with a={a} km does not span {r1_km} km to {r2_km} km"
        )));
    }

    let h = (mu_km3_s2 * p).sqrt();
    let vc1 = circular_speed(r1_km, mu_km3_s2);
    let vc2 = circular_speed(r2_km, mu_km3_s2);
    let vt1 = vis_viva(r1_km, a, mu_km3_s2)?;
    let vt2 = vis_viva(r2_km, a, mu_km3_s2)?;

    let dv = |vc: f64, vt: f64, r: f64| {
        let cos_fpa = h / (r * vt);
        (vc * vc + vt * vt - 2.0 * vc * vt * cos_fpa).max(0.0).sqrt()
    };
    // Angle between the pre-burn velocity (side `from`) and the Δv vector.
    let burn_angle = |from: f64, to: f64, dv: f64| {
        if dv == 0.0 {
            return 0.0;
        }
        let cos = (dv * dv + from * from - to * to) / (2.0 * dv * from);
        PI - cos.clamp(-1.0, 1.0).acos()
    };

    let dv1 = dv(vc1, vt1, r1_km);
    let dv2 = dv(vc2, vt2, r2_km);
    let mut burn1 = burn_angle(vc1, vt1, dv1);
    let mut burn2 = burn_angle(vt2, vc2, dv2);
    if r1_km < r2_km {
        burn1 = -burn1;
    }
    if r1_km > r2_km {
        burn2 = -burn2;
    }

    Ok(GeneralTransferResult {
        transfer_eccentricity: e,
        dv1_km_s: dv1,
        dv2_km_s: dv2,
        burn_angle1_rad: burn1,
        burn_angle2_rad: burn2,
        tof_seconds: transfer_time(r1_km, r2_km, e, mu_km3_s2)?,
    })
}

/// Rotation of a circular orbit's plane by `inclination_change_rad` without changing speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneChangeResult {
    pub dv_km_s: f64,
    /// Measured about the radial direction.
    pub burn_angle_rad: f64,
}

pub fn plane_change(r_km: f64, inclination_change_rad: f64, mu_km3_s2: f64) -> Result<PlaneChangeResult> {
    check_radius("radius", r_km)?;
    let v = circular_speed(r_km, mu_km3_s2);
    let dv = 2.0 * v * (inclination_change_rad / 2.0).sin();
    Ok(PlaneChangeResult {
        dv_km_s: dv,
        burn_angle_rad: PI - (dv / (2.0 * v)).clamp(-1.0, 1.0).acos(),
    })
}
