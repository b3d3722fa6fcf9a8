use log::{debug, warn};
use orbits_bodies::Body;
use orbits_core::StateVector;
use orbits_core::vector::{self, Vector3};

use crate::radar::{GroundStation, RangeAzEl, RangeAzElRates, doppler_state};
use crate::{ObservationError, Result};

/// Which of three sequential positions the solved state belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Measurement {
    #[default]
    First,
    Second,
    Third,
}

impl Measurement {
    fn index(self) -> usize {
        match self {
            Measurement::First => 0,
            Measurement::Second => 1,
            Measurement::Third => 2,
        }
    }
}

/// Gibbs' method: velocity at one of three coplanar positions on the same orbit.
///
/// `tolerance` bounds the triple product `r1·(r2×r3)` relative to `|r1||r2||r3|`.
pub fn gibbs(
    positions: &[Vector3; 3],
    measurement: Measurement,
    mu: f64,
    tolerance: f64,
) -> Result<StateVector> {
    let [r1, r2, r3] = positions;
    let m = [vector::norm(r1), vector::norm(r2), vector::norm(r3)];
    if m.iter().any(|&r| r == 0.0) {
        return Err(ObservationError::Degenerate(
            "a position coincides with the attracting centre".into(),
        ));
    }

    let c12 = vector::cross(r1, r2);
    let c23 = vector::cross(r2, r3);
    let c31 = vector::cross(r3, r1);
    let residual = vector::dot(r1, &c23).abs() / (m[0] * m[1] * m[2]);
    if residual >= tolerance {
        warn!("gibbs: rejected non-coplanar positions (residual {residual:e})");
        return Err(ObservationError::NotCoplanar { residual });
    }

    let d = vector::add(&vector::add(&c12, &c23), &c31);
    let n = vector::add(
        &vector::add(&vector::scale(&c12, m[2]), &vector::scale(&c23, m[0])),
        &vector::scale(&c31, m[1]),
    );
    let s = vector::add(
        &vector::add(
            &vector::scale(r1, m[1] - m[2]),
            &vector::scale(r2, m[2] - m[0]),
        ),
        &vector::scale(r3, m[0] - m[1]),
    );
    let d_mag = vector::norm(&d);
    let n_mag = vector::norm(&n);
    if d_mag == 0.0 || n_mag == 0.0 {
        return Err(ObservationError::Degenerate(
            "positions are collinear".into(),
        ));
    }

    let k = measurement.index();
    let r = positions[k];
    let along = vector::scale(&vector::cross(&d, &r), 1.0 / m[k]);
    let velocity = vector::scale(&vector::add(&along, &s), (mu / (d_mag * n_mag)).sqrt());
    debug!("gibbs: {measurement:?} measurement, v={velocity:?}");
    Ok(StateVector::new(r, velocity))
}

/// State from three range/azimuth/altitude measurements taken at one station.
pub fn three_point_radar(
    observations: &[RangeAzEl; 3],
    station: &GroundStation,
    measurement: Measurement,
    body: &Body,
    mu: f64,
    tolerance: f64,
) -> Result<StateVector> {
    let position = |obs: &RangeAzEl| {
        doppler_state(obs, &RangeAzElRates::default(), station, body)
            .state
            .position_km
    };
    let positions = [
        position(&observations[0]),
        position(&observations[1]),
        position(&observations[2]),
    ];
    gibbs(&positions, measurement, mu, tolerance)
}
