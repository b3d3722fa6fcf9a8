use std::f64::consts::PI;

use log::debug;
use orbits_core::StateVector;
use orbits_core::matrix::{self, Matrix3};
use orbits_core::vector::Vector3;
use orbits_frames::{
    perifocal_to_equatorial, perifocal_to_equatorial_circular, perifocal_to_equatorial_flat,
};
use orbits_mechanics::orbital_radius;

use crate::{ElementsError, Result, Tolerances};

/// Orientation and epoch angles, tagged by the orbit shape that gives them meaning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrbitGeometry {
    /// Eccentric and inclined.
    Inclined {
        raan: f64,
        arg_periapsis: f64,
        true_anomaly: f64,
    },
    /// Eccentric, in the equatorial plane (i = 0 or π).
    Equatorial {
        longitude_of_periapsis: f64,
        true_anomaly: f64,
    },
    /// Circular and inclined.
    Circular { raan: f64, arg_latitude: f64 },
    /// Circular, in the equatorial plane.
    CircularEquatorial { true_longitude: f64 },
}

impl OrbitGeometry {
    pub fn name(&self) -> &'static str {
        match self {
            OrbitGeometry::Inclined { .. } => "inclined",
            OrbitGeometry::Equatorial { .. } => "equatorial",
            OrbitGeometry::Circular { .. } => "circular",
            OrbitGeometry::CircularEquatorial { .. } => "circular-equatorial",
        }
    }

    fn expected_name(circular: bool, equatorial: bool) -> &'static str {
        match (circular, equatorial) {
            (false, false) => "inclined",
            (false, true) => "equatorial",
            (true, false) => "circular",
            (true, true) => "circular-equatorial",
        }
    }
}

/// A validated set of classical elements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassicalElements {
    p: f64,
    e: f64,
    i: f64,
    geometry: OrbitGeometry,
}

impl ClassicalElements {
    /// Validate ranges and check that `geometry` matches the shape implied by `e` and `i`.
    pub fn new(
        semi_latus_rectum_km: f64,
        eccentricity: f64,
        inclination: f64,
        geometry: OrbitGeometry,
        tolerances: &Tolerances,
    ) -> Result<Self> {
        validate(semi_latus_rectum_km, eccentricity, inclination)?;
        let expected = OrbitGeometry::expected_name(
            tolerances.is_circular(eccentricity),
            tolerances.is_equatorial(inclination),
        );
        if expected != geometry.name() {
            return Err(ElementsError::GeometryMismatch {
                expected,
                found: geometry.name(),
            });
        }
        Ok(Self {
            p: semi_latus_rectum_km,
            e: eccentricity,
            i: inclination,
            geometry,
        })
    }

    /// Build elements from untagged angles, reading them by the orbit's shape:
    ///
    /// | shape               | `periapsis_angle`       | `epoch_angle`          |
    /// |---------------------|-------------------------|------------------------|
    /// | inclined            | argument of periapsis   | true anomaly           |
    /// | equatorial          | longitude of periapsis  | true anomaly           |
    /// | circular            | ignored                 | argument of latitude   |
    /// | circular-equatorial | ignored                 | true longitude         |
    ///
    /// `raan` is ignored for equatorial orbits.
    pub fn from_angles(
        semi_latus_rectum_km: f64,
        eccentricity: f64,
        inclination: f64,
        raan: f64,
        periapsis_angle: f64,
        epoch_angle: f64,
        tolerances: &Tolerances,
    ) -> Result<Self> {
        validate(semi_latus_rectum_km, eccentricity, inclination)?;
        let circular = tolerances.is_circular(eccentricity);
        let equatorial = tolerances.is_equatorial(inclination);
        let geometry = match (circular, equatorial) {
            (false, false) => OrbitGeometry::Inclined {
                raan,
                arg_periapsis: periapsis_angle,
                true_anomaly: epoch_angle,
            },
            (false, true) => OrbitGeometry::Equatorial {
                longitude_of_periapsis: periapsis_angle,
                true_anomaly: epoch_angle,
            },
            (true, false) => OrbitGeometry::Circular {
                raan,
                arg_latitude: epoch_angle,
            },
            (true, true) => OrbitGeometry::CircularEquatorial {
                true_longitude: epoch_angle,
            },
        };
        debug!("elements resolved to {} geometry", geometry.name());
        Ok(Self {
            p: semi_latus_rectum_km,
            e: eccentricity,
            i: inclination,
            geometry,
        })
    }

    pub fn semi_latus_rectum_km(&self) -> f64 {
        self.p
    }

    pub fn eccentricity(&self) -> f64 {
        self.e
    }

    pub fn inclination(&self) -> f64 {
        self.i
    }

    pub fn geometry(&self) -> OrbitGeometry {
        self.geometry
    }
}

fn validate(p: f64, e: f64, i: f64) -> Result<()> {
    if e.is_nan() || e < 0.0 {
        return Err(ElementsError::InvalidEccentricity(e));
    }
    if p.is_nan() || p <= 0.0 {
        return Err(ElementsError::InvalidSemiLatusRectum(p));
    }
    if !(0.0..=PI).contains(&i) {
        return Err(ElementsError::InvalidInclination(i));
    }
    Ok(())
}

/// Position and velocity in the perifocal frame at true anomaly `nu`.
fn perifocal_state(p: f64, e: f64, nu: f64, mu: f64) -> (Vector3, Vector3) {
    let r = orbital_radius(p, e, nu);
    let (s, c) = nu.sin_cos();
    let speed = (mu / p).sqrt();
    ([r * c, r * s, 0.0], [-speed * s, speed * (e + c), 0.0])
}

/// Cartesian state in the geocentric-equatorial frame.
pub fn to_state(elements: &ClassicalElements, mu: f64) -> StateVector {
    let ClassicalElements { p, e, i, geometry } = *elements;
    let (rotation, nu): (Matrix3, f64) = match geometry {
        OrbitGeometry::Inclined {
            raan,
            arg_periapsis,
            true_anomaly,
        } => (perifocal_to_equatorial(i, raan, arg_periapsis), true_anomaly),
        OrbitGeometry::Equatorial {
            longitude_of_periapsis,
            true_anomaly,
        } => (
            perifocal_to_equatorial_flat(i, longitude_of_periapsis),
            true_anomaly,
        ),
        OrbitGeometry::Circular { raan, arg_latitude } => {
            (perifocal_to_equatorial_circular(i, raan), arg_latitude)
        }
        // The reference direction is the x-axis, so the longitude rotates the frame itself.
        OrbitGeometry::CircularEquatorial { true_longitude } => {
            (perifocal_to_equatorial_flat(i, true_longitude), 0.0)
        }
    };
    let (r_pqw, v_pqw) = perifocal_state(p, e, nu, mu);
    StateVector::new(
        matrix::mul_vec(&rotation, &r_pqw),
        matrix::mul_vec(&rotation, &v_pqw),
    )
}

/// Convert a batch of element sets, in order.
pub fn states_from_elements(elements: &[ClassicalElements], mu: f64) -> Vec<StateVector> {
    elements.iter().map(|el| to_state(el, mu)).collect()
}
