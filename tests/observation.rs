use std::error::Error;

use orbits::bodies::EARTH;
use orbits::elements::{ClassicalElements, Tolerances, to_state};
use orbits::mechanics::{SolverSettings, kepler_problem};
use orbits::observation::{
    GroundStation, Measurement, ObservationError, RangeAzEl, RangeAzElRates, doppler_state,
    gibbs, observe, station_position, three_point_radar, to_observation,
};
use orbits::primitives::StateVector;
use orbits::primitives::vector::{self, Vector3};

fn distance(a: &Vector3, b: &Vector3) -> f64 {
    vector::norm(&vector::sub(a, b))
}

/// Three states 10 minutes apart on an inclined ellipse around Earth.
fn sampled_orbit() -> Result<[StateVector; 3], Box<dyn Error>> {
    let elements =
        ClassicalElements::from_angles(9000.0, 0.1, 0.5, 0.3, 0.7, 0.2, &Tolerances::default())?;
    let start = to_state(&elements, EARTH.mu_km3_s2);
    let settings = SolverSettings {
        tolerance: 1e-8,
        ..SolverSettings::default()
    };
    let at = |dt: f64| -> Result<StateVector, Box<dyn Error>> {
        let s = kepler_problem(
            &start.position_km,
            &start.velocity_km_s,
            dt,
            &settings,
            EARTH.mu_km3_s2,
        )?;
        Ok(StateVector::new(s.position_km, s.velocity_km_s))
    };
    Ok([start, at(600.0)?, at(1200.0)?])
}

#[test]
fn equator_station_sits_on_equatorial_radius() {
    let station = GroundStation::from_degrees(0.0, 0.0, 0.0);
    let r = station_position(&station, &EARTH);
    assert!(distance(&r, &[6378.1, 0.0, 0.0]) < 1e-9, "r = {r:?}");
}

#[test]
fn polar_station_sits_on_polar_radius() {
    let station = GroundStation::from_degrees(0.0, 90.0, 0.0);
    let r = station_position(&station, &EARTH);
    // Earth's tabulated ellipsoid eccentricity gives b = a·sqrt(1 - e²).
    let e = EARTH.meridian_eccentricity();
    let b = 6378.1 * (1.0 - e * e).sqrt();
    assert!(r[0].abs() < 1e-9);
    assert!((r[2] - b).abs() < 1e-6, "z = {}", r[2]);
}

#[test]
fn zenith_measurement_points_straight_up() {
    let station = GroundStation::from_degrees(0.0, 0.0, 0.0);
    let obs = RangeAzEl::from_degrees(1000.0, 0.0, 90.0);
    let solution = doppler_state(&obs, &RangeAzElRates::default(), &station, &EARTH);
    assert!(distance(&solution.state.position_km, &[7378.1, 0.0, 0.0]) < 1e-9);
    // A target at rest relative to the station co-rotates with the body.
    let expected_vy = EARTH.angular_rotation() * 7378.1;
    assert!((solution.state.velocity_km_s[1] - expected_vy).abs() < 1e-12);
}

#[test]
fn azimuth_is_clockwise_from_north() -> Result<(), Box<dyn Error>> {
    let station = GroundStation::from_degrees(0.0, 0.0, 0.0);
    let due_east = vector::add(&station_position(&station, &EARTH), &[0.0, 500.0, 0.0]);
    let obs = to_observation(&due_east, &station, &EARTH)?;
    assert!((obs.azimuth_rad.to_degrees() - 90.0).abs() < 1e-9);
    assert!(obs.altitude_rad.abs() < 1e-12);
    assert!((obs.range_km - 500.0).abs() < 1e-9);
    Ok(())
}

#[test]
fn observation_round_trips_through_doppler_state() -> Result<(), Box<dyn Error>> {
    let station = GroundStation::from_degrees(0.3, 38.0, 120.0);
    let state = StateVector::new([-2500.0, 5200.0, 4900.0], [-5.1, -3.2, 3.9]);
    let (obs, rates) = observe(&state, &station, &EARTH)?;
    let solved = doppler_state(&obs, &rates, &station, &EARTH).state;
    assert!(distance(&solved.position_km, &state.position_km) < 1e-8);
    assert!(distance(&solved.velocity_km_s, &state.velocity_km_s) < 1e-11);
    Ok(())
}

#[test]
fn zenith_rates_are_degenerate() {
    let station = GroundStation::from_degrees(0.0, 0.0, 0.0);
    let state = StateVector::new([7378.1, 0.0, 0.0], [0.0, 7.0, 0.0]);
    assert!(matches!(
        observe(&state, &station, &EARTH),
        Err(ObservationError::Degenerate(_))
    ));
}

#[test]
fn gibbs_recovers_velocity_at_each_measurement() -> Result<(), Box<dyn Error>> {
    let states = sampled_orbit()?;
    let positions = states.map(|s| s.position_km);
    let tol = Tolerances::default().coplanarity;
    for (measurement, truth) in [
        (Measurement::First, &states[0]),
        (Measurement::Second, &states[1]),
        (Measurement::Third, &states[2]),
    ] {
        let solved = gibbs(&positions, measurement, EARTH.mu_km3_s2, tol)?;
        assert_eq!(solved.position_km, truth.position_km);
        assert!(
            distance(&solved.velocity_km_s, &truth.velocity_km_s) < 1e-6,
            "{measurement:?}: {:?} vs {:?}",
            solved.velocity_km_s,
            truth.velocity_km_s
        );
    }
    Ok(())
}

#[test]
fn gibbs_rejects_non_coplanar_positions() -> Result<(), Box<dyn Error>> {
    let states = sampled_orbit()?;
    let mut positions = states.map(|s| s.position_km);
    positions[2][2] += 800.0;
    let result = gibbs(&positions, Measurement::Second, EARTH.mu_km3_s2, 1e-9);
    assert!(matches!(result, Err(ObservationError::NotCoplanar { .. })));
    Ok(())
}

#[test]
fn three_point_radar_matches_gibbs() -> Result<(), Box<dyn Error>> {
    let states = sampled_orbit()?;
    let station = GroundStation::from_degrees(0.0, 20.0, 30.0);
    let observations = [
        to_observation(&states[0].position_km, &station, &EARTH)?,
        to_observation(&states[1].position_km, &station, &EARTH)?,
        to_observation(&states[2].position_km, &station, &EARTH)?,
    ];
    let solved = three_point_radar(
        &observations,
        &station,
        Measurement::Second,
        &EARTH,
        EARTH.mu_km3_s2,
        1e-9,
    )?;
    assert!(distance(&solved.position_km, &states[1].position_km) < 1e-7);
    assert!(distance(&solved.velocity_km_s, &states[1].velocity_km_s) < 1e-6);
    Ok(())
}
