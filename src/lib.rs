//! Two-body astrodynamics.
//!
//! The member crates are re-exported as modules so front-ends and tests depend on one crate.
//! The [`scenario`] module composes them into populated systems of orbiting bodies.

pub use orbits_bodies as bodies;
pub use orbits_config as config;
pub use orbits_elements as elements;
pub use orbits_export as export;
pub use orbits_frames as frames;
pub use orbits_maneuvers as maneuvers;
pub use orbits_mechanics as mechanics;
pub use orbits_observation as observation;
/// Units, constants and vector math (`orbits_core`).
pub use orbits_core as primitives;

pub mod scenario;

/// Returns the version of the library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
