//! Universal-variable solvers for the Kepler (initial-value) and Gauss (two-point
//! boundary-value) problems.

use std::f64::consts::PI;

use log::{debug, trace, warn};
use orbits_core::vector::{self, Vector3};

use crate::{MechanicsError, Result, SolverSettings};

/// Below this |z| the Stumpff functions and their slopes use series expansions.
const SERIES_THRESHOLD: f64 = 1e-8;

/// Stumpff functions `(C(z), S(z))`, trigonometric for z > 0, hyperbolic for z < 0.
pub fn stumpff(z: f64) -> (f64, f64) {
    if z.abs() < SERIES_THRESHOLD {
        (
            0.5 - z / 24.0 + z * z / 720.0,
            1.0 / 6.0 - z / 120.0 + z * z / 5040.0,
        )
    } else if z > 0.0 {
        let s = z.sqrt();
        ((1.0 - s.cos()) / z, (s - s.sin()) / s.powi(3))
    } else {
        let s = (-z).sqrt();
        ((1.0 - s.cosh()) / z, (s.sinh() - s) / s.powi(3))
    }
}

/// Slopes `(dC/dz, dS/dz)` as the Gauss iteration takes them. The exact start `z = 0` uses
/// `(+1/24, +1/120)`, paired with the `3·S·dC/2·C` term of the time slope.
fn stumpff_slopes(z: f64, c: f64, s: f64) -> (f64, f64) {
    if z == 0.0 {
        (1.0 / 24.0, 1.0 / 120.0)
    } else if z.abs() < SERIES_THRESHOLD {
        (-1.0 / 24.0 + z / 360.0, -1.0 / 120.0 + z / 2520.0)
    } else {
        ((1.0 - z * s - 2.0 * c) / (2.0 * z), (c - 3.0 * s) / (2.0 * z))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeplerSolution {
    pub position_km: Vector3,
    pub velocity_km_s: Vector3,
    pub universal_variable: f64,
    /// `f·ġ − ḟ·g`; equals 1 when the Lagrange coefficients are consistent.
    pub lagrange_check: f64,
    pub iterations: usize,
}

/// Propagate `(r, v)` forward by `dt` seconds.
///
/// Newton iteration on the universal variable `x`, starting at `settings.initial_guess`, until
/// the computed time of flight is within `settings.tolerance` of `dt`.
pub fn kepler_problem(
    r: &Vector3,
    v: &Vector3,
    dt: f64,
    settings: &SolverSettings,
    mu: f64,
) -> Result<KeplerSolution> {
    let r_mag = vector::norm(r);
    if r_mag == 0.0 {
        return Err(MechanicsError::DegenerateGeometry(
            "cannot propagate from the attracting centre".into(),
        ));
    }
    let v_mag = vector::norm(v);
    let sqrt_mu = mu.sqrt();
    let rv = vector::dot(r, v);
    // Reciprocal of the semi-major axis.
    let alpha = -(v_mag * v_mag - 2.0 * mu / r_mag) / mu;

    let mut x = settings.initial_guess;
    for iteration in 0..settings.max_iterations {
        let z = alpha * x * x;
        let (c, s) = stumpff(z);
        let t = rv * x * x * c / mu + (1.0 - r_mag * alpha) * x.powi(3) * s / sqrt_mu
            + r_mag * x / sqrt_mu;
        trace!("kepler iteration {iteration}: x={x} z={z} t={t}");

        if (t - dt).abs() < settings.tolerance {
            let f = 1.0 - c * x * x / r_mag;
            let g = t - s * x.powi(3) / sqrt_mu;
            let position = vector::add(&vector::scale(r, f), &vector::scale(v, g));
            let rf_mag = vector::norm(&position);
            let f_dot = sqrt_mu * x * (z * s - 1.0) / (r_mag * rf_mag);
            let g_dot = 1.0 - c * x * x / rf_mag;
            let velocity = vector::add(&vector::scale(r, f_dot), &vector::scale(v, g_dot));
            let lagrange_check = f * g_dot - f_dot * g;
            debug!(
                "kepler converged after {} iterations: x={x} check={lagrange_check}",
                iteration + 1
            );
            return Ok(KeplerSolution {
                position_km: position,
                velocity_km_s: velocity,
                universal_variable: x,
                lagrange_check,
                iterations: iteration + 1,
            });
        }

        let dtdx = x * x * c / sqrt_mu + rv * x * (1.0 - z * s) / mu + r_mag * (1.0 - z * c) / sqrt_mu;
        x += (dt - t) / dtdx;
        if !x.is_finite() {
            break;
        }
    }

    warn!(
        "kepler problem did not converge within {} iterations (dt={dt})",
        settings.max_iterations
    );
    Err(MechanicsError::NonConvergence {
        solver: "kepler problem",
        iterations: settings.max_iterations,
    })
}

/// Which way around the orbit the transfer between two positions goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferPath {
    /// Transfer angle below π.
    Short,
    /// Transfer angle above π.
    Long,
}

impl TransferPath {
    /// Sign applied to the `A` constant for a transfer angle `theta` in [0, π].
    fn direction_of_motion(self, theta: f64) -> f64 {
        match self {
            TransferPath::Short => (PI - theta).signum(),
            TransferPath::Long => (theta - PI).signum(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussSolution {
    pub initial_velocity_km_s: Vector3,
    pub final_velocity_km_s: Vector3,
    pub universal_variable: f64,
    pub iterations: usize,
}

/// Velocities connecting `r1` to `r2` in `dt` seconds along the chosen path.
///
/// Newton iteration on `z` starting at `settings.initial_guess`. The short path steps `z` up
/// by the time error over the slope and the long path steps it down. An intermediate `y < 0`
/// means no conic of this family joins the two positions in `dt`.
pub fn gauss_problem(
    r1: &Vector3,
    r2: &Vector3,
    dt: f64,
    path: TransferPath,
    settings: &SolverSettings,
    mu: f64,
) -> Result<GaussSolution> {
    let r1_mag = vector::norm(r1);
    let r2_mag = vector::norm(r2);
    if r1_mag == 0.0 || r2_mag == 0.0 {
        return Err(MechanicsError::DegenerateGeometry(
            "boundary positions must be away from the attracting centre".into(),
        ));
    }
    let theta = (vector::dot(r1, r2) / (r1_mag * r2_mag)).clamp(-1.0, 1.0).acos();
    if (PI - theta).abs() < 1e-12 {
        return Err(MechanicsError::DegenerateGeometry(
            "positions are opposite each other; the transfer plane is undefined".into(),
        ));
    }
    let a = path.direction_of_motion(theta) * (r1_mag * r2_mag * (1.0 + theta.cos())).sqrt();
    debug!("gauss problem: {path:?} path, theta={theta} A={a}");
    let sqrt_mu = mu.sqrt();

    let mut z = settings.initial_guess;
    for iteration in 0..settings.max_iterations {
        let (c, s) = stumpff(z);
        let y = r1_mag + r2_mag - a * (1.0 - z * s) / c.sqrt();
        if y < 0.0 {
            warn!("gauss problem: y={y} at z={z}; transfer time and geometry are incompatible");
            return Err(MechanicsError::InfeasibleGeometry(format!(
                "negative y ({y}) at z={z} for a {dt} s {path:?} transfer"
            )));
        }
        let x = (y / c).sqrt();
        let t = (x.powi(3) * s + a * y.sqrt()) / sqrt_mu;
        trace!("gauss iteration {iteration}: z={z} y={y} t={t}");

        if (t - dt).abs() < settings.tolerance {
            let f = 1.0 - y / r1_mag;
            let g = a * (y / mu).sqrt();
            let g_dot = 1.0 - y / r2_mag;
            let initial = vector::scale(&vector::sub(r2, &vector::scale(r1, f)), 1.0 / g);
            let fin = vector::scale(&vector::sub(&vector::scale(r2, g_dot), r1), 1.0 / g);
            debug!("gauss converged after {} iterations: z={z}", iteration + 1);
            return Ok(GaussSolution {
                initial_velocity_km_s: initial,
                final_velocity_km_s: fin,
                universal_variable: z,
                iterations: iteration + 1,
            });
        }

        let (dc, ds) = stumpff_slopes(z, c, s);
        let dtdz = (x.powi(3) * (ds - 3.0 * s * dc / 2.0 * c)
            + a / 8.0 * (3.0 * s * y.sqrt() / c + a / x))
            / sqrt_mu;
        let step = (dt - t) / dtdz;
        match path {
            TransferPath::Short => z += step,
            TransferPath::Long => z -= step,
        }
        if !z.is_finite() {
            break;
        }
    }

    warn!(
        "gauss problem did not converge within {} iterations (dt={dt}, {path:?} path)",
        settings.max_iterations
    );
    Err(MechanicsError::NonConvergence {
        solver: "gauss problem",
        iterations: settings.max_iterations,
    })
}
