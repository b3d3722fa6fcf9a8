//! Impulsive maneuver planning between circular orbits.
//!
//! A plan is an ordered list of [`Impulse`]s, each an epoch, a signed Δv and a burn angle.
//! The propagation side applies each impulse when simulated time crosses its epoch.

pub mod transfers;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, info};
use orbits_core::StateVector;
use orbits_core::matrix;
use orbits_core::vector::{self, Vector3};
use orbits_frames::rodrigues;
use orbits_mechanics::MechanicsError;
use serde::Serialize;
use thiserror::Error;

pub use transfers::{
    BiEllipticResult, GeneralTransferResult, HohmannResult, PlaneChangeResult, bi_elliptic,
    directed, general_transfer, hohmann, plane_change, transfer_time,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ManeuverError {
    #[error("{name} must be positive, got {value} km")]
    InvalidRadius { name: &'static str, value: f64 },
    #[error("invalid transfer orbit: {0}")]
    InvalidTransferOrbit(String),
    #[error("unknown maneuver type '{0}' (expected hohmann, bi_elliptic, general or plane_change)")]
    UnknownManeuver(String),
    #[error("missing parameter for {maneuver} maneuver: {parameter}")]
    MissingParameter {
        maneuver: ManeuverType,
        parameter: &'static str,
    },
    #[error(transparent)]
    Mechanics(#[from] MechanicsError),
}

pub type Result<T> = std::result::Result<T, ManeuverError>;

/// Axis about which the burn angle rotates the current velocity direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BurnAxis {
    /// In-plane burns; rotation about the angular momentum.
    OrbitNormal,
    /// Plane changes; rotation about the position direction.
    Radial,
}

/// One velocity kick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Impulse {
    pub epoch_s: f64,
    /// Negative values fire against the rotated direction.
    pub delta_v_km_s: f64,
    pub burn_angle_rad: f64,
    pub axis: BurnAxis,
}

impl Impulse {
    /// Apply the kick: rotate the velocity direction by the burn angle about the burn axis and
    /// add `delta_v_km_s` along the result.
    pub fn apply(&self, state: &StateVector) -> Result<StateVector> {
        let v_hat = unit_or_degenerate(&state.velocity_km_s, "velocity")?;
        let axis = match self.axis {
            BurnAxis::OrbitNormal => unit_or_degenerate(
                &vector::cross(&state.position_km, &state.velocity_km_s),
                "angular momentum",
            )?,
            BurnAxis::Radial => unit_or_degenerate(&state.position_km, "position")?,
        };
        let direction = matrix::mul_vec(&rodrigues(&axis, self.burn_angle_rad), &v_hat);
        let kick = vector::scale(&direction, self.delta_v_km_s);
        Ok(StateVector::new(
            state.position_km,
            vector::add(&state.velocity_km_s, &kick),
        ))
    }
}

fn unit_or_degenerate(v: &Vector3, what: &str) -> Result<Vector3> {
    vector::unit(v).ok_or_else(|| {
        MechanicsError::DegenerateGeometry(format!("{what} is zero; burn direction undefined"))
            .into()
    })
}

/// Maneuver family, without its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ManeuverType {
    Hohmann,
    BiElliptic,
    General,
    PlaneChange,
}

impl fmt::Display for ManeuverType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ManeuverType::Hohmann => "hohmann",
            ManeuverType::BiElliptic => "bi_elliptic",
            ManeuverType::General => "general",
            ManeuverType::PlaneChange => "plane_change",
        })
    }
}

impl FromStr for ManeuverType {
    type Err = ManeuverError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "hohmann" => Ok(ManeuverType::Hohmann),
            "bi_elliptic" | "bielliptic" => Ok(ManeuverType::BiElliptic),
            "general" => Ok(ManeuverType::General),
            "plane_change" => Ok(ManeuverType::PlaneChange),
            _ => Err(ManeuverError::UnknownManeuver(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ManeuverKind {
    Hohmann,
    BiElliptic { transfer_apoapsis_km: f64 },
    General { transfer_eccentricity: f64 },
    PlaneChange { inclination_change_rad: f64 },
}

impl ManeuverKind {
    pub fn maneuver_type(&self) -> ManeuverType {
        match self {
            ManeuverKind::Hohmann => ManeuverType::Hohmann,
            ManeuverKind::BiElliptic { .. } => ManeuverType::BiElliptic,
            ManeuverKind::General { .. } => ManeuverType::General,
            ManeuverKind::PlaneChange { .. } => ManeuverType::PlaneChange,
        }
    }

    /// Attach the parameter a maneuver type needs; `Hohmann` ignores `parameter`.
    pub fn from_type(kind: ManeuverType, parameter: Option<f64>) -> Result<Self> {
        let need = |name: &'static str| {
            parameter.ok_or(ManeuverError::MissingParameter {
                maneuver: kind,
                parameter: name,
            })
        };
        Ok(match kind {
            ManeuverType::Hohmann => ManeuverKind::Hohmann,
            ManeuverType::BiElliptic => ManeuverKind::BiElliptic {
                transfer_apoapsis_km: need("transfer apoapsis")?,
            },
            ManeuverType::General => ManeuverKind::General {
                transfer_eccentricity: need("transfer eccentricity")?,
            },
            ManeuverType::PlaneChange => ManeuverKind::PlaneChange {
                inclination_change_rad: need("inclination change")?,
            },
        })
    }
}

/// A maneuver between circular orbits. Plane changes act at `initial_radius_km` and ignore
/// `final_radius_km`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManeuverRequest {
    pub kind: ManeuverKind,
    pub initial_radius_km: f64,
    pub final_radius_km: f64,
    pub mu: f64,
    pub start_epoch_s: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManeuverPlan {
    pub maneuver: ManeuverType,
    pub impulses: Vec<Impulse>,
    /// Sum of |Δv|.
    pub total_delta_v_km_s: f64,
    /// Time from the first impulse to the last.
    pub duration_s: f64,
}

/// An impulse pinned to a calendar time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledImpulse {
    pub at: DateTime<Utc>,
    pub impulse: Impulse,
}

impl ManeuverPlan {
    /// Calendar times for each impulse, with `start` standing for the plan's first epoch.
    pub fn schedule_from(&self, start: DateTime<Utc>) -> Vec<ScheduledImpulse> {
        let origin = self.impulses.first().map_or(0.0, |i| i.epoch_s);
        self.impulses
            .iter()
            .map(|impulse| {
                let offset_ms = ((impulse.epoch_s - origin) * 1_000.0).round() as i64;
                ScheduledImpulse {
                    at: start + TimeDelta::milliseconds(offset_ms),
                    impulse: *impulse,
                }
            })
            .collect()
    }
}

fn in_plane(epoch_s: f64, delta_v_km_s: f64, burn_angle_rad: f64) -> Impulse {
    Impulse {
        epoch_s,
        delta_v_km_s,
        burn_angle_rad,
        axis: BurnAxis::OrbitNormal,
    }
}

/// Build the impulse sequence for `request`.
pub fn plan(request: &ManeuverRequest) -> Result<ManeuverPlan> {
    let r1 = request.initial_radius_km;
    let r2 = request.final_radius_km;
    let mu = request.mu;
    let t0 = request.start_epoch_s;

    let impulses = match request.kind {
        ManeuverKind::Hohmann => {
            let h = hohmann(r1, r2, mu)?;
            vec![
                in_plane(t0, h.dv1_km_s, 0.0),
                in_plane(t0 + h.tof_seconds, h.dv2_km_s, 0.0),
            ]
        }
        ManeuverKind::BiElliptic {
            transfer_apoapsis_km,
        } => {
            let b = bi_elliptic(r1, r2, transfer_apoapsis_km, mu)?;
            let t1 = t0 + b.tof1_seconds;
            vec![
                in_plane(t0, b.dv1_km_s, 0.0),
                in_plane(t1, b.dv2_km_s, 0.0),
                in_plane(t1 + b.tof2_seconds, b.dv3_km_s, 0.0),
            ]
        }
        ManeuverKind::General {
            transfer_eccentricity,
        } => {
            let g = general_transfer(r1, r2, transfer_eccentricity, mu)?;
            vec![
                in_plane(t0, g.dv1_km_s, g.burn_angle1_rad),
                in_plane(t0 + g.tof_seconds, g.dv2_km_s, g.burn_angle2_rad),
            ]
        }
        ManeuverKind::PlaneChange {
            inclination_change_rad,
        } => {
            let pc = plane_change(r1, inclination_change_rad, mu)?;
            vec![Impulse {
                epoch_s: t0,
                delta_v_km_s: pc.dv_km_s,
                burn_angle_rad: pc.burn_angle_rad,
                axis: BurnAxis::Radial,
            }]
        }
    };

    let total: f64 = impulses.iter().map(|i| i.delta_v_km_s.abs()).sum();
    let duration = impulses.last().map_or(0.0, |i| i.epoch_s - t0);
    debug!("{} impulses: {impulses:?}", request.kind.maneuver_type());
    info!(
        "planned {} maneuver: total Δv {total:.4} km/s over {duration:.1} s",
        request.kind.maneuver_type()
    );
    Ok(ManeuverPlan {
        maneuver: request.kind.maneuver_type(),
        impulses,
        total_delta_v_km_s: total,
        duration_s: duration,
    })
}
