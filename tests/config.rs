use std::error::Error;
use std::fs;
use std::path::Path;

use orbits::config::{
    BodyConfig, ConfigError, ManeuverConfig, load_bodies, load_catalog, load_scenario,
    resolve_body,
};
use orbits::maneuvers::{ManeuverError, ManeuverKind};
use orbits::mechanics::SolverSettings;
use orbits::scenario::Scenario;
use tempfile::tempdir;

const CATALOG_CSV: &str = "\
name,perigee_km,eccentricity,inclination_deg,mass_kg
ISS, 408, 0.0005, 51.64, 420000
Hubble,535,0.0003,28.47,
,700,,98.2,250
";

fn write(dir: &Path, name: &str, contents: &str) -> Result<(), Box<dyn Error>> {
    fs::write(dir.join(name), contents)?;
    Ok(())
}

#[test]
fn yaml_manifest_with_defaults() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    write(
        dir.path(),
        "leo.yaml",
        "primary: earth\nmaneuver:\n  type: hohmann\n  initial_radius_km: 6578\n  final_radius_km: 42164\n",
    )?;
    let config = load_scenario(dir.path().join("leo.yaml"))?;
    assert_eq!(config.primary, "earth");
    assert_eq!(SolverSettings::from(config.solver), SolverSettings::default());
    assert_eq!(config.catalog, None);
    assert_eq!(config.seed, None);

    let request = config
        .maneuver
        .as_ref()
        .ok_or("maneuver")?
        .to_request(config.primary_body()?.mu_km3_s2)?;
    assert_eq!(request.kind, ManeuverKind::Hohmann);
    assert_eq!(request.start_epoch_s, 0.0);
    assert_eq!(request.mu, 398_600.441_8);
    Ok(())
}

#[test]
fn toml_manifest_overrides_solver() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    write(
        dir.path(),
        "jovian.toml",
        r#"
primary = "Jupiter"
seed = 9

[solver]
tolerance = 1e-8
max_iterations = 50

[maneuver]
type = "plane_change"
radius_km = 500000
inclination_change_deg = 30
"#,
    )?;
    let config = load_scenario(dir.path().join("jovian.toml"))?;
    assert_eq!(config.seed, Some(9));
    let settings = SolverSettings::from(config.solver);
    assert_eq!(settings.tolerance, 1e-8);
    assert_eq!(settings.max_iterations, 50);
    assert_eq!(settings.initial_guess, 0.0);

    let request = config.maneuver.as_ref().ok_or("maneuver")?.to_request(1.0)?;
    assert_eq!(
        request.kind,
        ManeuverKind::PlaneChange {
            inclination_change_rad: 30f64.to_radians()
        }
    );
    assert_eq!(request.final_radius_km, 500_000.0);
    Ok(())
}

#[test]
fn unknown_maneuver_types_are_reported() -> Result<(), Box<dyn Error>> {
    let maneuver: ManeuverConfig = serde_yaml::from_str("type: aerobrake\nradius_km: 7000\n")?;
    assert_eq!(
        maneuver,
        ManeuverConfig::Unsupported {
            kind: "aerobrake".into()
        }
    );
    assert!(matches!(
        maneuver.to_request(1.0),
        Err(ConfigError::Maneuver(ManeuverError::UnknownManeuver(kind))) if kind == "aerobrake"
    ));

    let from_toml: ManeuverConfig = toml::from_str("type = \"lunar_flyby\"\n")?;
    assert!(matches!(
        from_toml,
        ManeuverConfig::Unsupported { kind } if kind == "lunar_flyby"
    ));
    Ok(())
}

#[test]
fn known_maneuver_types_still_need_their_fields() {
    let missing: Result<ManeuverConfig, _> =
        serde_yaml::from_str("type: hohmann\ninitial_radius_km: 7000\n");
    let err = missing.err().map(|e| e.to_string()).unwrap_or_default();
    assert!(err.contains("final_radius_km"), "error: {err}");
}

#[test]
fn csv_catalog_fills_blank_cells_with_one() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    write(dir.path(), "sats.csv", CATALOG_CSV)?;
    let records = load_catalog(dir.path().join("sats.csv"), None)?;
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].name, "ISS");
    assert_eq!(records[0].perigee_km, 408.0);
    assert_eq!(records[1].mass_kg, 1.0);
    assert_eq!(records[2].name, "");
    assert_eq!(records[2].eccentricity, 1.0);
    assert_eq!(records[2].inclination_deg, 98.2);
    Ok(())
}

#[test]
fn catalog_rows_are_sliced_and_checked() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("sats.csv");
    fs::write(&path, CATALOG_CSV)?;

    let tail = load_catalog(&path, Some(1..3))?;
    assert_eq!(tail.len(), 2);
    assert_eq!(tail[0].name, "Hubble");

    let err = load_catalog(&path, Some(2..5)).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::RowsOutOfRange {
            start: 2,
            end: 5,
            len: 3
        }
    ));
    Ok(())
}

#[test]
fn yaml_catalogs_are_lists() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    write(
        dir.path(),
        "sats.yaml",
        "- name: GPS IIF-1\n  perigee_km: 20180\n  eccentricity: 0.01\n  inclination_deg: 55\n  mass_kg: 1630\n",
    )?;
    let records = load_catalog(dir.path().join("sats.yaml"), None)?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].inclination_deg, 55.0);
    Ok(())
}

#[test]
fn custom_bodies_take_precedence() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let bodies = dir.path().join("bodies");
    fs::create_dir(&bodies)?;
    write(
        &bodies,
        "earth.toml",
        "name = \"Earth\"\nradius_km = 6000.0\nmass_kg = 5.0e24\nmu_km3_s2 = 333000.0\nrotation_period_s = 86400.0\n",
    )?;
    write(
        &bodies,
        "vulcan.toml",
        "name = \"Vulcan\"\nparent = \"Sun\"\nradius_km = 4000.0\nmass_kg = 1.0e24\nrotation_period_s = 90000.0\n\n[orbit]\nsemi_major_axis_km = 3.0e7\neccentricity = 0.1\ninclination_deg = 2.0\n",
    )?;
    write(&bodies, "notes.txt", "ignored")?;

    let custom: Vec<BodyConfig> = load_bodies(&bodies)?;
    assert_eq!(custom.len(), 2);

    let earth = resolve_body("earth", &custom)?;
    assert_eq!(earth.mu_km3_s2, 333_000.0);
    assert_eq!(earth.radius_km, 6000.0);

    let vulcan = resolve_body("VULCAN", &custom)?;
    assert!((vulcan.mu_km3_s2 - vulcan.mass_parameter()).abs() < 1e-9);
    let orbit = vulcan.orbit.ok_or("orbit")?;
    assert!((orbit.inclination_rad - 2f64.to_radians()).abs() < 1e-15);

    let mars = resolve_body("Mars", &custom)?;
    assert_eq!(mars.name, "Mars");
    assert!(matches!(
        resolve_body("Krypton", &custom),
        Err(ConfigError::UnknownBody(name)) if name == "Krypton"
    ));
    Ok(())
}

#[test]
fn malformed_files_surface_parse_errors() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    write(dir.path(), "broken.yaml", "primary: [earth\n")?;
    write(dir.path(), "broken.toml", "primary = \n")?;
    assert!(matches!(
        load_scenario(dir.path().join("broken.yaml")),
        Err(ConfigError::Parse(_))
    ));
    assert!(matches!(
        load_scenario(dir.path().join("broken.toml")),
        Err(ConfigError::Toml(_))
    ));
    assert!(matches!(
        load_scenario(dir.path().join("missing.yaml")),
        Err(ConfigError::Io(_))
    ));
    Ok(())
}

#[test]
fn scenario_loads_its_catalog_next_to_the_manifest() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    write(dir.path(), "sats.csv", CATALOG_CSV)?;
    write(
        dir.path(),
        "fleet.yaml",
        "primary: Earth\ncatalog: sats.csv\nrows: { start: 0, end: 2 }\nseed: 42\nmaneuver:\n  type: general\n  initial_radius_km: 7000\n  final_radius_km: 14000\n  transfer_eccentricity: 0.6\n",
    )?;
    let manifest = dir.path().join("fleet.yaml");
    let config = load_scenario(&manifest)?;
    assert_eq!(config.catalog_path(&manifest), Some(dir.path().join("sats.csv")));

    let first = Scenario::load(&manifest)?;
    let second = Scenario::load(&manifest)?;
    // Two catalog rows plus the maneuvering satellite.
    assert_eq!(first.satellites.len(), 3);
    assert_eq!(first.maneuvering_satellite(), Some(2));
    assert_eq!(first.pending_impulses().len(), 2);
    for (a, b) in first.satellites.iter().zip(&second.satellites) {
        assert_eq!(a.state, b.state, "seeded loads must agree for {}", a.name);
    }
    Ok(())
}
