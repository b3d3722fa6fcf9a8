use std::error::Error;
use std::f64::consts::PI;

use orbits::mechanics::{
    self, Conic, MechanicsError, SolverSettings, TransferPath, apoapsis_from_semi_latus_rectum,
    circular_speed, flight_time, gauss_problem, kepler_problem, orbital_radius, period, stumpff,
    true_anomaly_from_mean, turning_angle, vis_viva,
};
use orbits::primitives::vector::{self, Vector3};
use rstest::rstest;

const MU_EARTH: f64 = 398_600.441_8; // km^3 / s^2

/// Position and velocity on a conic in its own perifocal frame.
fn perifocal(e: f64, p: f64, nu: f64) -> (Vector3, Vector3) {
    let r = orbital_radius(p, e, nu);
    let speed = (MU_EARTH / p).sqrt();
    (
        [r * nu.cos(), r * nu.sin(), 0.0],
        [-speed * nu.sin(), speed * (e + nu.cos()), 0.0],
    )
}

/// Fixed-step RK4 integration of the two-body equations of motion.
fn rk4(mut r: Vector3, mut v: Vector3, duration: f64, steps: usize) -> Vector3 {
    let accel = |r: &Vector3| {
        let m = vector::norm(r);
        vector::scale(r, -MU_EARTH / (m * m * m))
    };
    let h = duration / steps as f64;
    for _ in 0..steps {
        let k1r = v;
        let k1v = accel(&r);
        let k2r = vector::add(&v, &vector::scale(&k1v, h / 2.0));
        let k2v = accel(&vector::add(&r, &vector::scale(&k1r, h / 2.0)));
        let k3r = vector::add(&v, &vector::scale(&k2v, h / 2.0));
        let k3v = accel(&vector::add(&r, &vector::scale(&k2r, h / 2.0)));
        let k4r = vector::add(&v, &vector::scale(&k3v, h));
        let k4v = accel(&vector::add(&r, &vector::scale(&k3r, h)));
        for i in 0..3 {
            r[i] += h / 6.0 * (k1r[i] + 2.0 * k2r[i] + 2.0 * k3r[i] + k4r[i]);
            v[i] += h / 6.0 * (k1v[i] + 2.0 * k2v[i] + 2.0 * k3v[i] + k4v[i]);
        }
    }
    r
}

fn distance(a: &Vector3, b: &Vector3) -> f64 {
    vector::norm(&vector::sub(a, b))
}

#[test]
fn circular_orbit_scalars() {
    let v = circular_speed(7000.0, MU_EARTH);
    assert!((v - 7.546_053).abs() < 1e-6, "v = {v}");
    let t = period(7000.0, MU_EARTH);
    assert!((t - 5_828.516_6).abs() < 1e-3, "period = {t}");
    assert!((orbital_radius(7000.0, 0.0, 1.234) - 7000.0).abs() < 1e-9);
}

#[test]
fn vis_viva_rejects_unreachable_radius() {
    assert!(matches!(
        vis_viva(30_000.0, 10_000.0, MU_EARTH),
        Err(MechanicsError::Domain(_))
    ));
    let at_periapsis = vis_viva(7000.0, 7000.0, MU_EARTH).expect("reachable radius");
    assert!((at_periapsis - circular_speed(7000.0, MU_EARTH)).abs() < 1e-12);
}

#[test]
fn open_orbits_have_no_apoapsis() {
    assert_eq!(apoapsis_from_semi_latus_rectum(10_000.0, 1.0), None);
    assert_eq!(apoapsis_from_semi_latus_rectum(10_000.0, 1.5), None);
    assert_eq!(mechanics::semi_major_axis_from_conic(10_000.0, 1.0), None);
    assert_eq!(turning_angle(0.5), None);
    let delta = turning_angle(2.0).expect("hyperbola turns");
    assert!((delta - PI / 3.0).abs() < 1e-12);
}

#[rstest]
#[case(0.0, Conic::Circle)]
#[case(5e-10, Conic::Circle)]
#[case(0.3, Conic::Ellipse)]
#[case(1.0 + 1e-12, Conic::Parabola)]
#[case(2.0, Conic::Hyperbola)]
fn classify_bands_eccentricity(#[case] e: f64, #[case] expected: Conic) {
    assert_eq!(Conic::classify(e, 1e-9), Ok(expected));
}

#[test]
fn classify_rejects_negative_eccentricity() {
    assert!(matches!(
        Conic::classify(-0.1, 1e-9),
        Err(MechanicsError::Domain(_))
    ));
}

#[test]
fn elliptic_flight_time_matches_integration() -> Result<(), Box<dyn Error>> {
    let (e, p) = (0.3, 9000.0);
    let (nu1, nu2) = (200f64.to_radians(), 350f64.to_radians());
    let t = flight_time(e, p, nu1, nu2, 0, MU_EARTH)?;
    assert!((t - 3_807.108).abs() < 1e-2, "t = {t}");

    let (r0, v0) = perifocal(e, p, nu1);
    let integrated = rk4(r0, v0, t, 2000);
    let (expected, _) = perifocal(e, p, nu2);
    assert!(
        distance(&integrated, &expected) < 1e-3,
        "integrated {integrated:?} vs {expected:?}"
    );
    Ok(())
}

#[test]
fn elliptic_flight_time_adds_whole_periods() -> Result<(), Box<dyn Error>> {
    let (e, p) = (0.3, 9000.0);
    let a = p / (1.0 - e * e);
    let once = flight_time(e, p, 0.2, 1.4, 0, MU_EARTH)?;
    let twice = flight_time(e, p, 0.2, 1.4, 2, MU_EARTH)?;
    assert!((twice - once - 2.0 * period(a, MU_EARTH)).abs() < 1e-6);
    Ok(())
}

#[test]
fn hyperbolic_flight_time_matches_integration() -> Result<(), Box<dyn Error>> {
    let (e, p) = (2.0, 20_000.0);
    let (nu1, nu2) = (300f64.to_radians(), 330f64.to_radians());
    let t = flight_time(e, p, nu1, nu2, 0, MU_EARTH)?;
    assert!((t - 417.967).abs() < 1e-2, "t = {t}");

    let (r0, v0) = perifocal(e, p, nu1);
    let integrated = rk4(r0, v0, t, 2000);
    let (expected, _) = perifocal(e, p, nu2);
    assert!(distance(&integrated, &expected) < 1e-3);
    Ok(())
}

#[test]
fn hyperbolic_flight_time_increases_toward_periapsis() -> Result<(), Box<dyn Error>> {
    let times = [4.3, 4.4, 4.5, 4.6, 4.7]
        .iter()
        .map(|&nu| flight_time(2.0, 20_000.0, 0.0, nu, 0, MU_EARTH))
        .collect::<Result<Vec<_>, _>>()?;
    assert!(times.windows(2).all(|w| w[0] < w[1]), "times = {times:?}");
    assert!(times.iter().all(|&t| t < 0.0));
    Ok(())
}

#[test]
fn hyperbolic_flight_time_rejects_anomaly_beyond_asymptote() {
    // For e = 2 the asymptotes sit at ±120°.
    let result = flight_time(2.0, 20_000.0, 0.0, PI, 0, MU_EARTH);
    assert!(matches!(result, Err(MechanicsError::Domain(_))));
}

#[test]
fn parabolic_flight_time_is_antisymmetric() -> Result<(), Box<dyn Error>> {
    let forward = flight_time(1.0, 12_000.0, -1.0, 1.0, 0, MU_EARTH)?;
    let half = flight_time(1.0, 12_000.0, 0.0, 1.0, 0, MU_EARTH)?;
    assert!(forward > 0.0);
    assert!((forward - 2.0 * half).abs() < 1e-9);
    Ok(())
}

#[test]
fn mean_anomaly_inverts_to_true_anomaly() -> Result<(), Box<dyn Error>> {
    let settings = SolverSettings::default();
    let nu = true_anomaly_from_mean(0.0, 0.5, &settings)?;
    assert!(nu.abs() < 1e-12);
    let nu = true_anomaly_from_mean(PI, 0.5, &settings)?;
    assert!((nu - PI).abs() < 1e-9);
    assert!(true_anomaly_from_mean(1.0, 1.2, &settings).is_err());
    Ok(())
}

#[test]
fn stumpff_series_meets_closed_form() {
    let (c0, s0) = stumpff(0.0);
    assert!((c0 - 0.5).abs() < 1e-15);
    assert!((s0 - 1.0 / 6.0).abs() < 1e-15);
    for z in [1e-6, -1e-6] {
        let (c, s) = stumpff(z);
        assert!((c - 0.5).abs() < 1e-7);
        assert!((s - 1.0 / 6.0).abs() < 1e-7);
    }
    let (c, s) = stumpff(PI * PI);
    assert!((c - 2.0 / (PI * PI)).abs() < 1e-12);
    assert!((s - 1.0 / (PI * PI)).abs() < 1e-12);
}

#[test]
fn kepler_half_period_reaches_opposite_point() -> Result<(), Box<dyn Error>> {
    let v = circular_speed(7000.0, MU_EARTH);
    let half = period(7000.0, MU_EARTH) / 2.0;
    let solution = kepler_problem(
        &[7000.0, 0.0, 0.0],
        &[0.0, v, 0.0],
        half,
        &SolverSettings::default(),
        MU_EARTH,
    )?;
    assert!(distance(&solution.position_km, &[-7000.0, 0.0, 0.0]) < 1e-3);
    assert!(distance(&solution.velocity_km_s, &[0.0, -v, 0.0]) < 1e-6);
    assert!((solution.lagrange_check - 1.0).abs() < 1e-9);
    Ok(())
}

#[rstest]
#[case(1.2)]
#[case(1.5)]
fn kepler_matches_integration(#[case] speed_factor: f64) -> Result<(), Box<dyn Error>> {
    let r0 = [7000.0, 0.0, 0.0];
    let v0 = [0.0, circular_speed(7000.0, MU_EARTH) * speed_factor, 0.0];
    let solution = kepler_problem(&r0, &v0, 5000.0, &SolverSettings::default(), MU_EARTH)?;
    let integrated = rk4(r0, v0, 5000.0, 5000);
    assert!(
        distance(&solution.position_km, &integrated) < 1e-2,
        "{:?} vs {integrated:?}",
        solution.position_km
    );
    assert!((solution.lagrange_check - 1.0).abs() < 1e-9);
    Ok(())
}

#[test]
fn kepler_reports_non_convergence() {
    let v = circular_speed(7000.0, MU_EARTH) * 1.5;
    let settings = SolverSettings {
        max_iterations: 2,
        ..SolverSettings::default()
    };
    let result = kepler_problem(&[7000.0, 0.0, 0.0], &[0.0, v, 0.0], 5000.0, &settings, MU_EARTH);
    assert_eq!(
        result.unwrap_err(),
        MechanicsError::NonConvergence {
            solver: "kepler problem",
            iterations: 2
        }
    );
}

#[test]
fn gauss_short_path_velocity() -> Result<(), Box<dyn Error>> {
    let r1 = [7000.0, 0.0, 0.0];
    let r2 = [-2000.0, 9000.0, 500.0];
    let solution = gauss_problem(
        &r1,
        &r2,
        1800.0,
        TransferPath::Short,
        &SolverSettings::default(),
        MU_EARTH,
    )?;
    let expected = [-0.137_317, 8.486_361, 0.471_464];
    assert!(
        distance(&solution.initial_velocity_km_s, &expected) < 1e-4,
        "v1 = {:?}",
        solution.initial_velocity_km_s
    );
    assert!((solution.universal_variable - 2.2362).abs() < 1e-3);

    // Flying the solved velocity for the same time lands on r2.
    let check = kepler_problem(
        &r1,
        &solution.initial_velocity_km_s,
        1800.0,
        &SolverSettings::default(),
        MU_EARTH,
    )?;
    assert!(distance(&check.position_km, &r2) < 1e-2);
    assert!(distance(&check.velocity_km_s, &solution.final_velocity_km_s) < 1e-5);
    Ok(())
}

#[test]
fn gauss_long_path_velocity() -> Result<(), Box<dyn Error>> {
    let r1 = [7000.0, 0.0, 0.0];
    let r2 = [-2000.0, 9000.0, 500.0];
    let solution = gauss_problem(
        &r1,
        &r2,
        1800.0,
        TransferPath::Long,
        &SolverSettings::default(),
        MU_EARTH,
    )?;
    let expected = [-6.619_926, -5.734_861, -0.318_603];
    assert!(
        distance(&solution.initial_velocity_km_s, &expected) < 1e-4,
        "v1 = {:?}",
        solution.initial_velocity_km_s
    );
    let check = kepler_problem(
        &r1,
        &solution.initial_velocity_km_s,
        1800.0,
        &SolverSettings::default(),
        MU_EARTH,
    )?;
    assert!(distance(&check.position_km, &r2) < 1e-2);
    Ok(())
}

#[test]
fn gauss_quarter_orbit_is_circular() -> Result<(), Box<dyn Error>> {
    let r: f64 = 8000.0;
    let tof = PI / 2.0 * (r.powi(3) / MU_EARTH).sqrt();
    let solution = gauss_problem(
        &[r, 0.0, 0.0],
        &[0.0, r, 0.0],
        tof,
        TransferPath::Short,
        &SolverSettings::default(),
        MU_EARTH,
    )?;
    let v = circular_speed(r, MU_EARTH);
    assert!(distance(&solution.initial_velocity_km_s, &[0.0, v, 0.0]) < 1e-5);
    assert!((solution.universal_variable - PI * PI / 4.0).abs() < 1e-4);
    Ok(())
}

#[test]
fn gauss_reports_infeasible_geometry() {
    let result = gauss_problem(
        &[7000.0, 0.0, 0.0],
        &[-2000.0, 9000.0, 500.0],
        3600.0,
        TransferPath::Short,
        &SolverSettings::default(),
        MU_EARTH,
    );
    assert!(matches!(result, Err(MechanicsError::InfeasibleGeometry(_))));
}

#[test]
fn gauss_short_path_stops_at_the_first_negative_y() {
    // A feasible transfer whose Newton walk from z = 0 leaves the y >= 0 region.
    let result = gauss_problem(
        &[7000.0, 0.0, 0.0],
        &[0.0, 8000.0, 0.0],
        5000.0,
        TransferPath::Short,
        &SolverSettings::default(),
        MU_EARTH,
    );
    assert!(matches!(result, Err(MechanicsError::InfeasibleGeometry(_))));
}

#[test]
fn gauss_rejects_opposite_positions() {
    let result = gauss_problem(
        &[7000.0, 0.0, 0.0],
        &[-8000.0, 0.0, 0.0],
        3600.0,
        TransferPath::Short,
        &SolverSettings::default(),
        MU_EARTH,
    );
    assert!(matches!(result, Err(MechanicsError::DegenerateGeometry(_))));
}
