//! Classical orbital elements and their conversion to and from Cartesian state vectors.
//!
//! The meaning of the periapsis and epoch angles depends on whether the orbit is circular and
//! whether it lies in the equatorial plane. [`OrbitGeometry`] carries that distinction in the
//! type so each conversion picks its frame rotation from an explicit match.

mod classical;
mod determine;

pub use classical::{ClassicalElements, OrbitGeometry, states_from_elements, to_state};
pub use determine::{DeterminedElements, determine};

use orbits_mechanics::MechanicsError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ElementsError {
    #[error("eccentricity must be non-negative, got {0}")]
    InvalidEccentricity(f64),
    #[error("semi-latus rectum must be positive, got {0} km")]
    InvalidSemiLatusRectum(f64),
    #[error("inclination must lie in [0, π], got {0} rad")]
    InvalidInclination(f64),
    #[error("{found} angles given for an orbit whose shape is {expected}")]
    GeometryMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error(transparent)]
    Mechanics(#[from] MechanicsError),
}

pub type Result<T> = std::result::Result<T, ElementsError>;

/// Thresholds for treating computed quantities as exactly zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    /// Absolute eccentricity below which an orbit is circular.
    pub eccentricity: f64,
    /// Relative node magnitude (|n|/|h|, i.e. sin i) below which an orbit is equatorial.
    pub inclination: f64,
    /// Relative triple product below which three positions are coplanar.
    pub coplanarity: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            eccentricity: 1e-9,
            inclination: 1e-9,
            coplanarity: 1e-9,
        }
    }
}

impl Tolerances {
    pub fn is_circular(&self, e: f64) -> bool {
        e < self.eccentricity
    }

    pub fn is_equatorial(&self, inclination: f64) -> bool {
        inclination.sin().abs() < self.inclination
    }
}

/// Unit in which angles cross the API boundary. Everything inside is radians.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AngleUnit {
    #[default]
    Radians,
    Degrees,
}

impl AngleUnit {
    pub fn to_radians(self, value: f64) -> f64 {
        match self {
            AngleUnit::Radians => value,
            AngleUnit::Degrees => value.to_radians(),
        }
    }

    pub fn from_radians(self, value: f64) -> f64 {
        match self {
            AngleUnit::Radians => value,
            AngleUnit::Degrees => value.to_degrees(),
        }
    }
}
