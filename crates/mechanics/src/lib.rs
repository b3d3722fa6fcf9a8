//! Two-body orbital mechanics: closed-form relations, time of flight and the universal-variable
//! solvers for the initial-value (Kepler) and two-point boundary-value (Gauss) problems.

pub mod conic;
pub mod formulas;
pub mod universal;

pub use conic::{Conic, DEFAULT_CONIC_TOLERANCE, flight_time, true_anomaly_from_mean};
pub use formulas::*;
pub use universal::{
    GaussSolution, KeplerSolution, TransferPath, gauss_problem, kepler_problem, stumpff,
};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MechanicsError {
    #[error("domain error: {0}")]
    Domain(String),
    #[error("{solver} did not converge within {iterations} iterations")]
    NonConvergence {
        solver: &'static str,
        iterations: usize,
    },
    #[error("infeasible geometry: {0}")]
    InfeasibleGeometry(String),
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),
}

pub type Result<T> = std::result::Result<T, MechanicsError>;

/// Newton iteration controls shared by the iterative solvers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverSettings {
    /// Starting value of the iteration variable.
    pub initial_guess: f64,
    /// Accepted absolute error in the computed time of flight (seconds).
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            initial_guess: 0.0,
            tolerance: 1e-4,
            max_iterations: 500,
        }
    }
}

impl SolverSettings {
    pub fn with_initial_guess(mut self, initial_guess: f64) -> Self {
        self.initial_guess = initial_guess;
        self
    }
}
