use std::f64::consts::TAU;

use log::debug;
use orbits_core::StateVector;
use orbits_core::vector::{self, Vector3};
use orbits_mechanics::{
    Conic, MechanicsError, angular_momentum, eccentricity_vector, mechanical_energy, node_vector,
    semi_latus_rectum,
};

use crate::{ClassicalElements, ElementsError, OrbitGeometry, Result, Tolerances};

/// Elements recovered from a state vector. Angles that the orbit's shape leaves undefined are
/// `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeterminedElements {
    pub angular_momentum: Vector3,
    pub node: Vector3,
    pub eccentricity_vector: Vector3,
    pub semi_latus_rectum_km: f64,
    pub eccentricity: f64,
    /// `None` for a parabola.
    pub semi_major_axis_km: Option<f64>,
    pub energy_km2_s2: f64,
    pub inclination: f64,
    pub conic: Conic,
    pub raan: Option<f64>,
    pub arg_periapsis: Option<f64>,
    pub true_anomaly: Option<f64>,
    pub longitude_of_periapsis: Option<f64>,
    pub arg_latitude: Option<f64>,
    pub true_longitude: Option<f64>,
}

/// Angle between two vectors, reflected into (π, 2π) when `flip` holds.
fn resolved_angle(a: &Vector3, b: &Vector3, flip: bool) -> f64 {
    let cos = vector::dot(a, b) / (vector::norm(a) * vector::norm(b));
    let angle = cos.clamp(-1.0, 1.0).acos();
    if flip { TAU - angle } else { angle }
}

/// Classical elements of the orbit through `state` around a body with parameter `mu`.
pub fn determine(state: &StateVector, mu: f64, tolerances: &Tolerances) -> Result<DeterminedElements> {
    let r = &state.position_km;
    let v = &state.velocity_km_s;
    let r_mag = vector::norm(r);
    let h = angular_momentum(r, v);
    let h_mag = vector::norm(&h);
    if r_mag == 0.0 || h_mag == 0.0 {
        return Err(MechanicsError::DegenerateGeometry(
            "rectilinear motion has no orbital plane".into(),
        )
        .into());
    }
    let n = node_vector(&h);
    let n_mag = vector::norm(&n);
    // |n| = |h| sin i, so this stays consistent with the equatorial test below.
    let inclination = n_mag.atan2(h[2]);
    let e_vec = eccentricity_vector(r, v, mu);
    let e = vector::norm(&e_vec);
    let conic = Conic::classify(e, tolerances.eccentricity)?;
    let p = semi_latus_rectum(h_mag, mu);

    let circular = conic == Conic::Circle;
    let equatorial = n_mag / h_mag < tolerances.inclination;
    debug!("determine: conic={conic:?} e={e} i={inclination} equatorial={equatorial}");

    let rv = vector::dot(r, v);
    let x_hat = [1.0, 0.0, 0.0];
    let raan = (!equatorial).then(|| resolved_angle(&x_hat, &n, n[1] < 0.0));
    let arg_periapsis =
        (!equatorial && !circular).then(|| resolved_angle(&n, &e_vec, e_vec[2] < 0.0));
    let true_anomaly = (!circular).then(|| resolved_angle(&e_vec, r, rv < 0.0));
    let longitude_of_periapsis =
        (equatorial && !circular).then(|| resolved_angle(&x_hat, &e_vec, e_vec[1] < 0.0));
    let arg_latitude = (!equatorial).then(|| resolved_angle(&n, r, r[2] < 0.0));
    let true_longitude = equatorial.then(|| resolved_angle(&x_hat, r, r[1] < 0.0));

    Ok(DeterminedElements {
        angular_momentum: h,
        node: n,
        eccentricity_vector: e_vec,
        semi_latus_rectum_km: p,
        eccentricity: e,
        semi_major_axis_km: (conic != Conic::Parabola).then(|| p / (1.0 - e * e)),
        energy_km2_s2: mechanical_energy(r_mag, vector::norm(v), mu),
        inclination,
        conic,
        raan,
        arg_periapsis,
        true_anomaly,
        longitude_of_periapsis,
        arg_latitude,
        true_longitude,
    })
}

impl DeterminedElements {
    /// The tagged geometry these angles describe.
    pub fn geometry(&self) -> Result<OrbitGeometry> {
        match *self {
            DeterminedElements {
                raan: Some(raan),
                arg_periapsis: Some(arg_periapsis),
                true_anomaly: Some(true_anomaly),
                ..
            } => Ok(OrbitGeometry::Inclined {
                raan,
                arg_periapsis,
                true_anomaly,
            }),
            DeterminedElements {
                longitude_of_periapsis: Some(longitude_of_periapsis),
                true_anomaly: Some(true_anomaly),
                ..
            } => Ok(OrbitGeometry::Equatorial {
                longitude_of_periapsis,
                true_anomaly,
            }),
            DeterminedElements {
                raan: Some(raan),
                arg_latitude: Some(arg_latitude),
                ..
            } => Ok(OrbitGeometry::Circular { raan, arg_latitude }),
            DeterminedElements {
                true_longitude: Some(true_longitude),
                ..
            } => Ok(OrbitGeometry::CircularEquatorial { true_longitude }),
            _ => Err(MechanicsError::DegenerateGeometry(
                "no angle set describes this orbit".into(),
            )
            .into()),
        }
    }

    /// Validated elements for round-tripping back through [`crate::to_state`].
    pub fn elements(&self, tolerances: &Tolerances) -> Result<ClassicalElements> {
        ClassicalElements::new(
            self.semi_latus_rectum_km,
            self.eccentricity,
            self.inclination,
            self.geometry()?,
            tolerances,
        )
        .map_err(|err| match err {
            // The node test and the sine test can land on opposite sides of the threshold.
            ElementsError::GeometryMismatch { .. } => ElementsError::Mechanics(
                MechanicsError::DegenerateGeometry(format!(
                    "inclination {} sits on the equatorial threshold",
                    self.inclination
                )),
            ),
            other => other,
        })
    }
}
