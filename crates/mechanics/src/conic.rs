//! Conic classification and time of flight along a known orbit.

use std::f64::consts::{PI, TAU};

use log::{debug, trace, warn};

use crate::{MechanicsError, Result, SolverSettings};

/// Band around 0 and 1 inside which an eccentricity counts as circular or parabolic.
pub const DEFAULT_CONIC_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conic {
    Circle,
    Ellipse,
    Parabola,
    Hyperbola,
}

impl Conic {
    /// Classify an eccentricity, treating values within `tolerance` of 0 or 1 as exact.
    pub fn classify(e: f64, tolerance: f64) -> Result<Self> {
        if e.is_nan() || e < -tolerance {
            return Err(MechanicsError::Domain(format!(
                "eccentricity must be non-negative, got {e}"
            )));
        }
        Ok(if e < tolerance {
            Conic::Circle
        } else if (e - 1.0).abs() < tolerance {
            Conic::Parabola
        } else if e < 1.0 {
            Conic::Ellipse
        } else {
            Conic::Hyperbola
        })
    }

    pub fn is_closed(self) -> bool {
        matches!(self, Conic::Circle | Conic::Ellipse)
    }
}

/// Time of flight from true anomaly `nu1` to `nu2` on an orbit of eccentricity `e` and
/// semi-latus rectum `p`, with `k` extra passages through periapsis on closed orbits.
///
/// Elliptic anomalies take the half-plane of their true anomaly, so any `nu` in [0, 2π) is
/// accepted. On hyperbolas the anomaly is wrapped into [0, 2π) and the hyperbolic anomaly is
/// negated for `nu` in (π, 2π); a `nu` beyond the asymptote is a domain error.
pub fn flight_time(e: f64, p: f64, nu1: f64, nu2: f64, k: u32, mu: f64) -> Result<f64> {
    let conic = Conic::classify(e, DEFAULT_CONIC_TOLERANCE)?;
    if p <= 0.0 {
        return Err(MechanicsError::Domain(format!(
            "semi-latus rectum must be positive, got {p}"
        )));
    }
    debug!("flight_time: {conic:?} e={e} p={p} nu1={nu1} nu2={nu2} k={k}");
    match conic {
        Conic::Circle | Conic::Ellipse => {
            let a = p / (1.0 - e * e);
            let mean = |nu: f64| {
                let ecc = eccentric_anomaly(e, nu);
                ecc - e * ecc.sin()
            };
            Ok((a.powi(3) / mu).sqrt() * (TAU * f64::from(k) + mean(nu2) - mean(nu1)))
        }
        Conic::Parabola => {
            let barker = |nu: f64| {
                let d = p.sqrt() * (nu / 2.0).tan();
                p * d + d.powi(3) / 3.0
            };
            Ok((barker(nu2) - barker(nu1)) / (2.0 * mu.sqrt()))
        }
        Conic::Hyperbola => {
            let a = p / (1.0 - e * e);
            let f1 = hyperbolic_anomaly(e, nu1)?;
            let f2 = hyperbolic_anomaly(e, nu2)?;
            let mean = |f: f64| e * f.sinh() - f;
            Ok(((-a).powi(3) / mu).sqrt() * (mean(f2) - mean(f1)))
        }
    }
}

fn eccentric_anomaly(e: f64, nu: f64) -> f64 {
    let (s, c) = nu.sin_cos();
    let ecc = ((e + c) / (1.0 + e * c)).clamp(-1.0, 1.0).acos();
    if s < 0.0 { TAU - ecc } else { ecc }
}

fn hyperbolic_anomaly(e: f64, nu: f64) -> Result<f64> {
    let nu = nu.rem_euclid(TAU);
    let c = nu.cos();
    let denom = 1.0 + e * c;
    if denom <= 0.0 {
        return Err(MechanicsError::Domain(format!(
            "true anomaly {nu} rad lies beyond the asymptote of a hyperbola with e={e}"
        )));
    }
    let arg = (e + c) / denom;
    if arg < 1.0 {
        return Err(MechanicsError::Domain(format!(
            "true anomaly {nu} rad has no hyperbolic anomaly for e={e}"
        )));
    }
    let f = arg.acosh();
    Ok(if nu > PI && nu < TAU { -f } else { f })
}

/// True anomaly in [0, 2π) for mean anomaly `mean_anomaly` on an ellipse, by Newton iteration
/// on Kepler's equation.
pub fn true_anomaly_from_mean(mean_anomaly: f64, e: f64, settings: &SolverSettings) -> Result<f64> {
    if !(0.0..1.0).contains(&e) {
        return Err(MechanicsError::Domain(format!(
            "mean anomaly is only defined for closed orbits, got e={e}"
        )));
    }
    let m = mean_anomaly.rem_euclid(TAU);
    let mut ecc = if e < 0.8 { m } else { PI };
    for iteration in 0..settings.max_iterations {
        let residual = ecc - e * ecc.sin() - m;
        trace!("kepler equation iteration {iteration}: E={ecc} residual={residual}");
        if residual.abs() < 1e-12 {
            let nu = 2.0 * ((1.0 + e).sqrt() * (ecc / 2.0).sin())
                .atan2((1.0 - e).sqrt() * (ecc / 2.0).cos());
            return Ok(nu.rem_euclid(TAU));
        }
        ecc -= residual / (1.0 - e * ecc.cos());
    }
    warn!(
        "kepler equation did not converge for M={mean_anomaly} e={e} after {} iterations",
        settings.max_iterations
    );
    Err(MechanicsError::NonConvergence {
        solver: "kepler equation",
        iterations: settings.max_iterations,
    })
}
