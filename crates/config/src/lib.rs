//! Configuration models and loaders for orbit scenarios.

use std::borrow::Cow;
use std::fs::File;
use std::ops::Range;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use orbits_bodies::{Body, ReferenceOrbit};
use orbits_elements::Tolerances;
use orbits_maneuvers::{ManeuverError, ManeuverKind, ManeuverRequest};
use orbits_mechanics::SolverSettings;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Newton iteration controls for the Kepler and Gauss solvers.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct SolverConfig {
    pub initial_guess: f64,
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        let settings = SolverSettings::default();
        Self {
            initial_guess: settings.initial_guess,
            tolerance: settings.tolerance,
            max_iterations: settings.max_iterations,
        }
    }
}

impl From<SolverConfig> for SolverSettings {
    fn from(cfg: SolverConfig) -> Self {
        SolverSettings {
            initial_guess: cfg.initial_guess,
            tolerance: cfg.tolerance,
            max_iterations: cfg.max_iterations,
        }
    }
}

/// Zero thresholds for shape detection and coplanarity checks.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct ToleranceConfig {
    pub eccentricity: f64,
    pub inclination: f64,
    pub coplanarity: f64,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        let t = Tolerances::default();
        Self {
            eccentricity: t.eccentricity,
            inclination: t.inclination,
            coplanarity: t.coplanarity,
        }
    }
}

impl From<ToleranceConfig> for Tolerances {
    fn from(cfg: ToleranceConfig) -> Self {
        Tolerances {
            eccentricity: cfg.eccentricity,
            inclination: cfg.inclination,
            coplanarity: cfg.coplanarity,
        }
    }
}

/// A body defined in configuration, extending or overriding the built-in table.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BodyConfig {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    pub radius_km: f64,
    #[serde(default)]
    pub equatorial_radius_km: Option<f64>,
    #[serde(default)]
    pub polar_radius_km: Option<f64>,
    pub mass_kg: f64,
    /// Defaults to G·mass.
    #[serde(default)]
    pub mu_km3_s2: Option<f64>,
    pub rotation_period_s: f64,
    #[serde(default)]
    pub obliquity_deg: f64,
    #[serde(default)]
    pub orbit: Option<ReferenceOrbitConfig>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct ReferenceOrbitConfig {
    pub semi_major_axis_km: f64,
    pub eccentricity: f64,
    pub inclination_deg: f64,
}

impl BodyConfig {
    pub fn to_body(&self) -> Body {
        let mut body = Body {
            name: Cow::Owned(self.name.clone()),
            parent: self.parent.clone().map(Cow::Owned),
            radius_km: self.radius_km,
            equatorial_radius_km: self.equatorial_radius_km.unwrap_or(self.radius_km),
            polar_radius_km: self.polar_radius_km.unwrap_or(self.radius_km),
            mass_kg: self.mass_kg,
            sidereal_rotation_period_s: self.rotation_period_s,
            mu_km3_s2: 0.0,
            obliquity_rad: self.obliquity_deg.to_radians(),
            ellipsoid_eccentricity: None,
            orbit: self.orbit.map(|o| ReferenceOrbit {
                semi_major_axis_km: o.semi_major_axis_km,
                eccentricity: o.eccentricity,
                inclination_rad: o.inclination_deg.to_radians(),
                longitude_of_ascending_node_rad: None,
                argument_of_periapsis_rad: None,
                mean_anomaly_rad: None,
            }),
        };
        body.mu_km3_s2 = self.mu_km3_s2.unwrap_or_else(|| body.mass_parameter());
        body
    }
}

/// Resolve `name` against configured bodies first, then the built-in table.
pub fn resolve_body(name: &str, custom: &[BodyConfig]) -> Result<Body, ConfigError> {
    if let Some(cfg) = custom.iter().find(|b| b.name.eq_ignore_ascii_case(name)) {
        return Ok(cfg.to_body());
    }
    orbits_bodies::find(name)
        .cloned()
        .ok_or_else(|| ConfigError::UnknownBody(name.to_string()))
}

/// One row of a satellite catalog. Empty or missing numeric cells read as 1.0.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SatelliteRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default = "one", deserialize_with = "one_if_empty")]
    pub perigee_km: f64,
    #[serde(default = "one", deserialize_with = "one_if_empty")]
    pub eccentricity: f64,
    #[serde(default = "one", deserialize_with = "one_if_empty")]
    pub inclination_deg: f64,
    #[serde(default = "one", deserialize_with = "one_if_empty")]
    pub mass_kg: f64,
}

fn one() -> f64 {
    1.0
}

fn one_if_empty<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(1.0))
}

/// Maneuver section of a scenario manifest.
///
/// A `type` this build does not plan is kept as [`ManeuverConfig::Unsupported`] and reported
/// by [`ManeuverConfig::to_request`].
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(remote = "Self", tag = "type")]
pub enum ManeuverConfig {
    #[serde(rename = "hohmann")]
    Hohmann {
        initial_radius_km: f64,
        final_radius_km: f64,
        #[serde(default)]
        start_epoch_s: f64,
    },
    #[serde(rename = "bi_elliptic")]
    BiElliptic {
        initial_radius_km: f64,
        final_radius_km: f64,
        transfer_apoapsis_km: f64,
        #[serde(default)]
        start_epoch_s: f64,
    },
    #[serde(rename = "general")]
    General {
        initial_radius_km: f64,
        final_radius_km: f64,
        transfer_eccentricity: f64,
        #[serde(default)]
        start_epoch_s: f64,
    },
    #[serde(rename = "plane_change")]
    PlaneChange {
        radius_km: f64,
        inclination_change_deg: f64,
        #[serde(default)]
        start_epoch_s: f64,
    },
    #[serde(skip)]
    Unsupported { kind: String },
}

const MANEUVER_TYPES: [&str; 4] = ["hohmann", "bi_elliptic", "general", "plane_change"];

impl<'de> Deserialize<'de> for ManeuverConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_yaml::Value::deserialize(deserializer)?;
        match value.get("type").and_then(serde_yaml::Value::as_str) {
            Some(kind) if !MANEUVER_TYPES.contains(&kind) => Ok(ManeuverConfig::Unsupported {
                kind: kind.to_owned(),
            }),
            _ => ManeuverConfig::deserialize(value).map_err(serde::de::Error::custom),
        }
    }
}

impl ManeuverConfig {
    /// Maneuver request around a primary with gravitational parameter `mu`.
    pub fn to_request(&self, mu: f64) -> Result<ManeuverRequest, ConfigError> {
        let request = match *self {
            ManeuverConfig::Hohmann {
                initial_radius_km,
                final_radius_km,
                start_epoch_s,
            } => ManeuverRequest {
                kind: ManeuverKind::Hohmann,
                initial_radius_km,
                final_radius_km,
                mu,
                start_epoch_s,
            },
            ManeuverConfig::BiElliptic {
                initial_radius_km,
                final_radius_km,
                transfer_apoapsis_km,
                start_epoch_s,
            } => ManeuverRequest {
                kind: ManeuverKind::BiElliptic {
                    transfer_apoapsis_km,
                },
                initial_radius_km,
                final_radius_km,
                mu,
                start_epoch_s,
            },
            ManeuverConfig::General {
                initial_radius_km,
                final_radius_km,
                transfer_eccentricity,
                start_epoch_s,
            } => ManeuverRequest {
                kind: ManeuverKind::General {
                    transfer_eccentricity,
                },
                initial_radius_km,
                final_radius_km,
                mu,
                start_epoch_s,
            },
            ManeuverConfig::PlaneChange {
                radius_km,
                inclination_change_deg,
                start_epoch_s,
            } => ManeuverRequest {
                kind: ManeuverKind::PlaneChange {
                    inclination_change_rad: inclination_change_deg.to_radians(),
                },
                initial_radius_km: radius_km,
                final_radius_km: radius_km,
                mu,
                start_epoch_s,
            },
            ManeuverConfig::Unsupported { ref kind } => {
                warn!("scenario names maneuver type {kind:?}, which this build does not plan");
                return Err(ManeuverError::UnknownManeuver(kind.clone()).into());
            }
        };
        Ok(request)
    }
}

/// Half-open range of catalog rows.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub start: usize,
    pub end: usize,
}

impl From<RowRange> for Range<usize> {
    fn from(rows: RowRange) -> Self {
        rows.start..rows.end
    }
}

/// Scenario manifest: a primary body, solver settings and optional satellites and maneuver.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ScenarioConfig {
    pub primary: String,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub tolerances: ToleranceConfig,
    /// Satellite catalog, relative to the manifest's directory.
    #[serde(default)]
    pub catalog: Option<PathBuf>,
    #[serde(default)]
    pub rows: Option<RowRange>,
    #[serde(default)]
    pub maneuver: Option<ManeuverConfig>,
    #[serde(default)]
    pub bodies: Vec<BodyConfig>,
    /// Seed for the random element angles given to catalog satellites.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl ScenarioConfig {
    pub fn primary_body(&self) -> Result<Body, ConfigError> {
        resolve_body(&self.primary, &self.bodies)
    }

    /// Catalog path resolved against the directory of `manifest`.
    pub fn catalog_path(&self, manifest: &Path) -> Option<PathBuf> {
        let catalog = self.catalog.as_ref()?;
        if catalog.is_absolute() {
            return Some(catalog.clone());
        }
        Some(
            manifest
                .parent()
                .map_or_else(|| catalog.clone(), |dir| dir.join(catalog)),
        )
    }
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("unknown body '{0}'")]
    UnknownBody(String),
    #[error("catalog rows {start}..{end} fall outside {len} records")]
    RowsOutOfRange { start: usize, end: usize, len: usize },
    #[error(transparent)]
    Maneuver(#[from] ManeuverError),
}

/// Load a scenario manifest from a YAML or TOML file.
pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<ScenarioConfig, ConfigError> {
    let path = path.as_ref();
    debug!("loading scenario from {}", path.display());
    if has_extension(path, "toml") {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

/// Load custom body definitions from a YAML list, a TOML file or a directory of TOML files.
pub fn load_bodies<P: AsRef<Path>>(path: P) -> Result<Vec<BodyConfig>, ConfigError> {
    load_records(path)
}

/// Load satellite catalog rows, optionally restricted to `rows`.
pub fn load_catalog<P: AsRef<Path>>(
    path: P,
    rows: Option<Range<usize>>,
) -> Result<Vec<SatelliteRecord>, ConfigError> {
    let records: Vec<SatelliteRecord> = load_records(path)?;
    let Some(range) = rows else {
        return Ok(records);
    };
    if range.start > range.end || range.end > records.len() {
        return Err(ConfigError::RowsOutOfRange {
            start: range.start,
            end: range.end,
            len: records.len(),
        });
    }
    Ok(records[range].to_vec())
}

fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case(wanted))
        .unwrap_or(false)
}

fn load_records<T, P>(path: P) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.is_dir() {
        read_dir_records(path)
    } else if has_extension(path, "toml") {
        let contents = std::fs::read_to_string(path)?;
        let record: T = toml::from_str(&contents)?;
        Ok(vec![record])
    } else if has_extension(path, "csv") {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;
        let records = reader.deserialize().collect::<Result<Vec<T>, _>>()?;
        debug!("read {} rows from {}", records.len(), path.display());
        Ok(records)
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn read_dir_records<T>(dir: &Path) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut records = Vec::new();
    let mut entries: Vec<PathBuf> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if has_extension(&path, "toml") {
            entries.push(path);
        }
    }
    entries.sort();
    for path in entries {
        let contents = std::fs::read_to_string(&path)?;
        let record: T = toml::from_str(&contents)?;
        records.push(record);
    }
    Ok(records)
}
