//! Ground-based radar observations turned into geocentric-equatorial state vectors.
//!
//! Azimuth is measured clockwise from north, altitude above the local horizon. The station's
//! body rotates about the equatorial z-axis at [`Body::angular_rotation`].

mod gibbs;
mod radar;

pub use gibbs::{Measurement, gibbs, three_point_radar};
pub use radar::{
    DopplerSolution, GroundStation, RangeAzEl, RangeAzElRates, doppler_state, observe,
    station_position, to_observation,
};

pub use orbits_bodies::Body;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ObservationError {
    #[error("positions are not coplanar (relative triple product {residual:e})")]
    NotCoplanar { residual: f64 },
    #[error("degenerate observation geometry: {0}")]
    Degenerate(String),
}

pub type Result<T> = std::result::Result<T, ObservationError>;
