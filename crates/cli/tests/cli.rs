use std::error::Error;
use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn orbit_state_prints_circular_equatorial_state() -> Result<(), Box<dyn Error>> {
    Command::cargo_bin("orbit")?
        .args(["state", "--p", "7000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("geometry: circular-equatorial"))
        .stdout(predicate::str::contains("r [km]: 7000.000000, 0.000000, 0.000000"));
    Ok(())
}

#[test]
fn orbit_elements_reports_undefined_angles() -> Result<(), Box<dyn Error>> {
    Command::cargo_bin("orbit")?
        .args(["--degrees", "elements", "--r=7000,0,0", "--v=0,7.546053,0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ascending node: undefined"))
        .stdout(predicate::str::contains("inclination: 0.000000"));
    Ok(())
}

#[test]
fn orbit_propagate_writes_csv() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let out = dir.path().join("states.csv");
    Command::cargo_bin("orbit")?
        .args(["propagate", "--r=7000,0,0", "--v=0,7.546053,0", "--dt", "600", "--steps", "4"])
        .arg("--output")
        .arg(&out)
        .assert()
        .success();
    let csv = fs::read_to_string(&out)?;
    assert!(csv.starts_with("body,time_s,x_km"));
    assert_eq!(csv.lines().count(), 6, "header plus five samples");
    Ok(())
}

#[test]
fn orbit_lambert_rejects_opposite_positions() -> Result<(), Box<dyn Error>> {
    Command::cargo_bin("orbit")?
        .args(["lambert", "--r1=7000,0,0", "--r2=-9000,0,0", "--dt", "3600"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("degenerate geometry"));
    Ok(())
}

#[test]
fn maneuver_hohmann_csv_to_stdout() -> Result<(), Box<dyn Error>> {
    Command::cargo_bin("maneuver")?
        .args([
            "--kind",
            "hohmann",
            "--initial-radius",
            "6578",
            "--final-radius",
            "42164",
        ])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "index,epoch_s,delta_v_km_s,burn_angle_deg,axis",
        ))
        .stdout(predicate::str::contains("orbit_normal"))
        .stderr(predicate::str::contains("hohmann around Earth"));
    Ok(())
}

#[test]
fn maneuver_plane_change_json_file() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let out = dir.path().join("plans/plane.json");
    Command::cargo_bin("maneuver")?
        .args([
            "--kind",
            "plane-change",
            "--initial-radius",
            "9378",
            "--inclination-change",
            "10",
            "--degrees",
            "--format",
            "json",
        ])
        .arg("--output")
        .arg(&out)
        .assert()
        .success();
    let json = fs::read_to_string(&out)?;
    assert!(json.contains("\"maneuver\": \"plane_change\""));
    assert!(json.contains("\"axis\": \"radial\""));
    Ok(())
}

#[test]
fn maneuver_requires_kind_parameter() -> Result<(), Box<dyn Error>> {
    Command::cargo_bin("maneuver")?
        .args([
            "--kind",
            "bi_elliptic",
            "--initial-radius",
            "7000",
            "--final-radius",
            "105000",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("transfer apoapsis"));
    Ok(())
}

#[test]
fn maneuver_rejects_unknown_kind() -> Result<(), Box<dyn Error>> {
    Command::cargo_bin("maneuver")?
        .args(["--kind", "aerobrake", "--initial-radius", "7000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown maneuver type"));
    Ok(())
}
