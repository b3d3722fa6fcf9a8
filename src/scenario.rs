//! Populated systems of orbiting bodies around one primary.
//!
//! A [`Scenario`] owns a primary at the scene origin, the satellites orbiting it and an optional
//! maneuver plan flown by one of them. Satellites are test particles of the two-body problem:
//! each is propagated independently with the universal-variable Kepler solver, and impulses are
//! applied when simulated time crosses their epochs.

use std::f64::consts::TAU;
use std::path::Path;

use log::{debug, info};
use orbits_bodies::{Body, ReferenceOrbit};
use orbits_config::{ConfigError, SatelliteRecord, ScenarioConfig};
use orbits_core::StateVector;
use orbits_elements::{ClassicalElements, ElementsError, Tolerances, to_state};
use orbits_maneuvers::{Impulse, ManeuverError, ManeuverPlan, ManeuverRequest};
use orbits_mechanics::{MechanicsError, SolverSettings, kepler_problem, true_anomaly_from_mean};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

/// Grid spacing, in radians, of the random element angles given to generated satellites.
pub const ANGLE_STEP_RAD: f64 = 0.05;

/// Radius given to generated satellites (km).
pub const SATELLITE_RADIUS_KM: f64 = 0.065;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Elements(#[from] ElementsError),
    #[error(transparent)]
    Mechanics(#[from] MechanicsError),
    #[error(transparent)]
    Maneuver(#[from] ManeuverError),
    #[error("{0} has no reference orbit")]
    MissingOrbit(String),
    #[error("angle grid step must be positive, got {0}")]
    InvalidAngleStep(f64),
    #[error("cannot step a scenario backwards ({0} s)")]
    NegativeStep(f64),
}

pub type Result<T> = std::result::Result<T, ScenarioError>;

/// A body taking part in a scenario. The state is relative to the scenario's primary.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitingBody {
    pub name: String,
    pub mass_kg: f64,
    pub radius_km: f64,
    pub rotation_rate_rad_s: f64,
    /// Whether the body would attract others in an n-body setting.
    pub massive: bool,
    pub state: StateVector,
}

impl OrbitingBody {
    /// A tabulated body at `state`.
    pub fn from_body(body: &Body, state: StateVector) -> Self {
        Self {
            name: body.name.to_string(),
            mass_kg: body.mass_kg,
            radius_km: body.radius_km,
            rotation_rate_rad_s: body.angular_rotation(),
            massive: true,
            state,
        }
    }

    /// A massless satellite at `state`.
    pub fn satellite(name: impl Into<String>, mass_kg: f64, state: StateVector) -> Self {
        Self {
            name: name.into(),
            mass_kg,
            radius_km: SATELLITE_RADIUS_KM,
            rotation_rate_rad_s: 0.0,
            massive: false,
            state,
        }
    }

    /// State in the frame `primary` itself is expressed in.
    pub fn with_primary(&self, primary: &OrbitingBody) -> StateVector {
        self.state.offset_by(&primary.state)
    }

    /// State `dt` seconds on around a primary with parameter `mu`. `self` is left unchanged.
    pub fn propagated(&self, dt: f64, settings: &SolverSettings, mu: f64) -> Result<StateVector> {
        let solution = kepler_problem(
            &self.state.position_km,
            &self.state.velocity_km_s,
            dt,
            settings,
            mu,
        )?;
        Ok(StateVector::new(solution.position_km, solution.velocity_km_s))
    }

    /// Advance the state by `dt` seconds around a primary with parameter `mu`.
    pub fn propagate(&mut self, dt: f64, settings: &SolverSettings, mu: f64) -> Result<()> {
        self.state = self.propagated(dt, settings, mu)?;
        Ok(())
    }

    pub fn apply(&mut self, impulse: &Impulse) -> Result<()> {
        self.state = impulse.apply(&self.state)?;
        debug!(
            "{}: applied {:+.4} km/s at t={:.1} s",
            self.name, impulse.delta_v_km_s, impulse.epoch_s
        );
        Ok(())
    }
}

/// `n` triples of (ascending node, periapsis angle, epoch angle), each drawn from the grid
/// `0, step, 2·step, ...` below 2π.
pub fn random_element_angles<R: Rng + ?Sized>(
    n: usize,
    step: f64,
    rng: &mut R,
) -> Result<Vec<[f64; 3]>> {
    if step.is_nan() || step <= 0.0 {
        return Err(ScenarioError::InvalidAngleStep(step));
    }
    let slots = ((TAU / step).ceil() as usize).max(1);
    let mut draw = || rng.random_range(0..slots) as f64 * step;
    Ok((0..n).map(|_| [draw(), draw(), draw()]).collect())
}

/// Satellites of `primary` from catalog rows, with randomly drawn element angles.
///
/// Perigee heights are measured from the primary's surface, so each orbit has
/// p = (perigee + R)(1 + e).
pub fn satellites_from_catalog<R: Rng + ?Sized>(
    primary: &Body,
    records: &[SatelliteRecord],
    tolerances: &Tolerances,
    rng: &mut R,
) -> Result<Vec<OrbitingBody>> {
    let angles = random_element_angles(records.len(), ANGLE_STEP_RAD, rng)?;
    records
        .iter()
        .zip(angles)
        .enumerate()
        .map(|(index, (record, [raan, periapsis, epoch]))| {
            let p = (record.perigee_km + primary.radius_km) * (1.0 + record.eccentricity);
            let elements = ClassicalElements::from_angles(
                p,
                record.eccentricity,
                record.inclination_deg.to_radians(),
                raan,
                periapsis,
                epoch,
                tolerances,
            )?;
            let name = if record.name.is_empty() {
                format!("Satellite_{}", index + 1)
            } else {
                record.name.clone()
            };
            Ok(OrbitingBody::satellite(
                name,
                record.mass_kg,
                to_state(&elements, primary.mu_km3_s2),
            ))
        })
        .collect()
}

/// A primary with its satellites and an optional maneuver flown by one of them.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub primary: OrbitingBody,
    pub mu_km3_s2: f64,
    pub satellites: Vec<OrbitingBody>,
    pub settings: SolverSettings,
    /// Simulated time since the scenario was assembled (s).
    pub elapsed_s: f64,
    maneuver: Option<ActiveManeuver>,
}

#[derive(Debug, Clone)]
struct ActiveManeuver {
    satellite: usize,
    plan: ManeuverPlan,
    next: usize,
}

impl Scenario {
    /// A primary at the scene origin with no satellites.
    pub fn around(primary: &Body) -> Self {
        Self {
            primary: OrbitingBody::from_body(primary, StateVector::new([0.0; 3], [0.0; 3])),
            mu_km3_s2: primary.mu_km3_s2,
            satellites: Vec::new(),
            settings: SolverSettings::default(),
            elapsed_s: 0.0,
            maneuver: None,
        }
    }

    pub fn plan(&self) -> Option<&ManeuverPlan> {
        self.maneuver.as_ref().map(|m| &m.plan)
    }

    /// Index into `satellites` of the body flying the plan.
    pub fn maneuvering_satellite(&self) -> Option<usize> {
        self.maneuver.as_ref().map(|m| m.satellite)
    }

    /// Impulses not yet applied.
    pub fn pending_impulses(&self) -> &[Impulse] {
        match &self.maneuver {
            Some(m) => &m.plan.impulses[m.next..],
            None => &[],
        }
    }

    /// Add a satellite in a circular equatorial orbit at the plan's initial radius, and fly the
    /// plan with it.
    pub fn with_maneuver(mut self, request: &ManeuverRequest, mass_kg: f64) -> Result<Self> {
        let plan = orbits_maneuvers::plan(request)?;
        let elements = ClassicalElements::from_angles(
            request.initial_radius_km,
            0.0,
            0.0,
            0.0,
            0.0,
            0.0,
            &Tolerances::default(),
        )?;
        self.satellites.push(OrbitingBody::satellite(
            "Satellite",
            mass_kg,
            to_state(&elements, self.mu_km3_s2),
        ));
        self.maneuver = Some(ActiveManeuver {
            satellite: self.satellites.len() - 1,
            plan,
            next: 0,
        });
        Ok(self)
    }

    /// Assemble a scenario from a parsed manifest and its catalog rows.
    pub fn from_config<R: Rng + ?Sized>(
        config: &ScenarioConfig,
        catalog: &[SatelliteRecord],
        rng: &mut R,
    ) -> Result<Self> {
        let body = config.primary_body()?;
        let tolerances = Tolerances::from(config.tolerances);
        let mut scenario = Scenario::around(&body);
        scenario.settings = config.solver.into();
        scenario.satellites = satellites_from_catalog(&body, catalog, &tolerances, rng)?;
        if let Some(maneuver) = &config.maneuver {
            let request = maneuver.to_request(body.mu_km3_s2)?;
            scenario = scenario.with_maneuver(&request, 10.0)?;
        }
        info!(
            "assembled scenario around {} with {} satellites{}",
            scenario.primary.name,
            scenario.satellites.len(),
            if scenario.maneuver.is_some() { " and a maneuver" } else { "" }
        );
        Ok(scenario)
    }

    /// Load a manifest, its catalog (resolved next to the manifest) and assemble the scenario.
    /// A manifest without a seed draws element angles from OS entropy.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config = orbits_config::load_scenario(path)?;
        let catalog = match config.catalog_path(path) {
            Some(catalog) => {
                orbits_config::load_catalog(catalog, config.rows.map(Into::into))?
            }
            None => Vec::new(),
        };
        let mut rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Scenario::from_config(&config, &catalog, &mut rng)
    }

    /// Advance every satellite by `dt` seconds, applying each impulse whose epoch falls inside
    /// the step at that epoch. A failed step leaves the scenario as it was.
    pub fn advance(&mut self, dt: f64) -> Result<()> {
        if dt < 0.0 {
            return Err(ScenarioError::NegativeStep(dt));
        }
        let satellites = self.satellites.clone();
        let (elapsed_s, next) = (self.elapsed_s, self.maneuver.as_ref().map(|m| m.next));
        let result = self.advance_to(self.elapsed_s + dt);
        if result.is_err() {
            self.satellites = satellites;
            self.elapsed_s = elapsed_s;
            if let (Some(m), Some(next)) = (self.maneuver.as_mut(), next) {
                m.next = next;
            }
        }
        result
    }

    fn advance_to(&mut self, end: f64) -> Result<()> {
        while let Some((satellite, impulse)) = self.next_impulse_before(end) {
            self.step_all(impulse.epoch_s - self.elapsed_s)?;
            self.elapsed_s = impulse.epoch_s.max(self.elapsed_s);
            self.satellites[satellite].apply(&impulse)?;
            if let Some(m) = self.maneuver.as_mut() {
                m.next += 1;
            }
        }
        self.step_all(end - self.elapsed_s)?;
        self.elapsed_s = end;
        Ok(())
    }

    fn next_impulse_before(&self, end: f64) -> Option<(usize, Impulse)> {
        let m = self.maneuver.as_ref()?;
        let impulse = m.plan.impulses.get(m.next)?;
        (impulse.epoch_s <= end).then_some((m.satellite, *impulse))
    }

    fn step_all(&mut self, dt: f64) -> Result<()> {
        if dt <= 0.0 {
            return Ok(());
        }
        let states = self
            .satellites
            .iter()
            .map(|satellite| satellite.propagated(dt, &self.settings, self.mu_km3_s2))
            .collect::<Result<Vec<_>>>()?;
        for (satellite, state) in self.satellites.iter_mut().zip(states) {
            satellite.state = state;
        }
        Ok(())
    }
}

/// Elements of a tabulated orbit at the table's epoch, or `None` when any of its orientation
/// angles is missing. The mean anomaly is converted through Kepler's equation.
pub fn tabulated_elements(
    orbit: &ReferenceOrbit,
    tolerances: &Tolerances,
) -> Result<Option<ClassicalElements>> {
    let Some([raan, arg_periapsis, mean_anomaly]) = orbit.tabulated_angles() else {
        return Ok(None);
    };
    let e = orbit.eccentricity;
    let nu = true_anomaly_from_mean(mean_anomaly, e, &SolverSettings::default())?;
    let (periapsis_angle, epoch_angle) = match (
        tolerances.is_circular(e),
        tolerances.is_equatorial(orbit.inclination_rad),
    ) {
        (false, false) => (arg_periapsis, nu),
        (false, true) => (raan + arg_periapsis, nu),
        (true, false) => (arg_periapsis, arg_periapsis + nu),
        (true, true) => (arg_periapsis, raan + arg_periapsis + nu),
    };
    let elements = ClassicalElements::from_angles(
        orbit.semi_latus_rectum(),
        e,
        orbit.inclination_rad,
        raan.rem_euclid(TAU),
        periapsis_angle.rem_euclid(TAU),
        epoch_angle.rem_euclid(TAU),
        tolerances,
    )?;
    Ok(Some(elements))
}

/// `members` orbiting `primary`. Members with fully tabulated orbits sit where their tables put
/// them; the others get orientation angles drawn from `rng`.
pub fn system<R: Rng + ?Sized>(primary: &Body, members: &[&Body], rng: &mut R) -> Result<Scenario> {
    let tolerances = Tolerances::default();
    let angles = random_element_angles(members.len(), ANGLE_STEP_RAD, rng)?;
    let mut scenario = Scenario::around(primary);
    for (member, [raan, periapsis, epoch]) in members.iter().zip(angles) {
        let orbit = member
            .orbit
            .ok_or_else(|| ScenarioError::MissingOrbit(member.name.to_string()))?;
        let elements = match tabulated_elements(&orbit, &tolerances)? {
            Some(elements) => elements,
            None => ClassicalElements::from_angles(
                orbit.semi_latus_rectum(),
                orbit.eccentricity,
                orbit.inclination_rad,
                raan,
                periapsis,
                epoch,
                &tolerances,
            )?,
        };
        let state = to_state(&elements, primary.mu_km3_s2);
        scenario.satellites.push(OrbitingBody::from_body(member, state));
    }
    info!(
        "assembled {} with {} orbiting bodies",
        scenario.primary.name,
        scenario.satellites.len()
    );
    Ok(scenario)
}

/// Earth and the Moon, with the Moon's orientation angles drawn at random.
pub fn earth_moon<R: Rng + ?Sized>(rng: &mut R) -> Result<Scenario> {
    system(&orbits_bodies::EARTH, &[&orbits_bodies::MOON], rng)
}

/// Jupiter and its four Galilean moons.
pub fn galilean_moons<R: Rng + ?Sized>(rng: &mut R) -> Result<Scenario> {
    system(
        &orbits_bodies::JUPITER,
        &[
            &orbits_bodies::IO,
            &orbits_bodies::EUROPA,
            &orbits_bodies::GANYMEDE,
            &orbits_bodies::CALLISTO,
        ],
        rng,
    )
}

/// The Sun and its planets, placed from their tabulated elements.
pub fn planets<R: Rng + ?Sized>(rng: &mut R) -> Result<Scenario> {
    let planets: Vec<&Body> = orbits_bodies::satellites_of("Sun").collect();
    system(&orbits_bodies::SUN, &planets, rng)
}

/// A single satellite around `primary` flying the maneuver in `request`.
pub fn transfer_demo(primary: &Body, request: &ManeuverRequest) -> Result<Scenario> {
    Scenario::around(primary).with_maneuver(request, 10.0)
}
