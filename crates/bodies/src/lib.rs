//! Immutable physical and orbital reference data for solar-system bodies.
//!
//! Values are kilometres, kilograms and seconds. Reference orbits are heliocentric for planets
//! and planet-centred for moons, expressed relative to the parent's orbital plane.

use std::borrow::Cow;
use std::f64::consts::{PI, TAU};

use orbits_core::constants::{AU_KM, EARTH_YEAR_DAYS, G_KM3_KG_S2, SECONDS_PER_DAY, SECONDS_PER_HOUR};

/// Elements of a body's own orbit around its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceOrbit {
    pub semi_major_axis_km: f64,
    pub eccentricity: f64,
    pub inclination_rad: f64,
    pub longitude_of_ascending_node_rad: Option<f64>,
    pub argument_of_periapsis_rad: Option<f64>,
    pub mean_anomaly_rad: Option<f64>,
}

impl ReferenceOrbit {
    pub fn semi_latus_rectum(&self) -> f64 {
        self.semi_major_axis_km * (1.0 - self.eccentricity * self.eccentricity)
    }

    /// Ascending node, argument of periapsis and mean anomaly at the table's epoch, when all
    /// three are tabulated.
    pub fn tabulated_angles(&self) -> Option<[f64; 3]> {
        Some([
            self.longitude_of_ascending_node_rad?,
            self.argument_of_periapsis_rad?,
            self.mean_anomaly_rad?,
        ])
    }

    /// Orbital period around a parent with gravitational parameter `mu_parent` (km³/s²).
    pub fn period(&self, mu_parent: f64) -> f64 {
        TAU * (self.semi_major_axis_km.powi(3) / mu_parent).sqrt()
    }
}

/// Reference record for one body. Bodies without a measured oblateness repeat the mean radius
/// as their equatorial and polar radii.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub name: Cow<'static, str>,
    pub parent: Option<Cow<'static, str>>,
    pub radius_km: f64,
    pub equatorial_radius_km: f64,
    pub polar_radius_km: f64,
    pub mass_kg: f64,
    /// Negative for retrograde rotation.
    pub sidereal_rotation_period_s: f64,
    /// Tabulated gravitational parameter (km³/s²).
    pub mu_km3_s2: f64,
    pub obliquity_rad: f64,
    pub ellipsoid_eccentricity: Option<f64>,
    pub orbit: Option<ReferenceOrbit>,
}

impl Body {
    /// Angular rotation rate about the spin axis (rad/s).
    pub fn angular_rotation(&self) -> f64 {
        TAU / self.sidereal_rotation_period_s
    }

    /// Gravitational parameter computed from the mass rather than the tabulated value.
    pub fn mass_parameter(&self) -> f64 {
        G_KM3_KG_S2 * self.mass_kg
    }

    const fn with_ellipsoid_eccentricity(mut self, e: f64) -> Self {
        self.ellipsoid_eccentricity = Some(e);
        self
    }

    /// Eccentricity of the body's meridian ellipse, from the table when present or the radii.
    pub fn meridian_eccentricity(&self) -> f64 {
        self.ellipsoid_eccentricity.unwrap_or_else(|| {
            let a = self.equatorial_radius_km;
            let b = self.polar_radius_km;
            if a > 0.0 && a > b {
                (1.0 - (b * b) / (a * a)).sqrt()
            } else {
                0.0
            }
        })
    }
}

const fn deg(v: f64) -> f64 {
    v * PI / 180.0
}

const fn days(v: f64) -> f64 {
    v * SECONDS_PER_DAY
}

const fn spherical(
    name: &'static str,
    parent: Option<&'static str>,
    radius_km: f64,
    mass_kg: f64,
    period_s: f64,
    mu_km3_s2: f64,
    obliquity_rad: f64,
    orbit: Option<ReferenceOrbit>,
) -> Body {
    oblate(
        name,
        parent,
        [radius_km, radius_km, radius_km],
        mass_kg,
        period_s,
        mu_km3_s2,
        obliquity_rad,
        orbit,
    )
}

// Radii are given as [mean, polar, equatorial].
const fn oblate(
    name: &'static str,
    parent: Option<&'static str>,
    radii_km: [f64; 3],
    mass_kg: f64,
    period_s: f64,
    mu_km3_s2: f64,
    obliquity_rad: f64,
    orbit: Option<ReferenceOrbit>,
) -> Body {
    let parent = match parent {
        Some(p) => Some(Cow::Borrowed(p)),
        None => None,
    };
    Body {
        name: Cow::Borrowed(name),
        parent,
        radius_km: radii_km[0],
        polar_radius_km: radii_km[1],
        equatorial_radius_km: radii_km[2],
        mass_kg,
        sidereal_rotation_period_s: period_s,
        mu_km3_s2,
        obliquity_rad,
        ellipsoid_eccentricity: None,
        orbit,
    }
}

const fn planet_orbit(
    a_km: f64,
    e: f64,
    i_deg: f64,
    raan_deg: f64,
    argp_deg: f64,
    m_deg: f64,
) -> Option<ReferenceOrbit> {
    Some(ReferenceOrbit {
        semi_major_axis_km: a_km,
        eccentricity: e,
        inclination_rad: deg(i_deg),
        longitude_of_ascending_node_rad: Some(deg(raan_deg)),
        argument_of_periapsis_rad: Some(deg(argp_deg)),
        mean_anomaly_rad: Some(deg(m_deg)),
    })
}

const fn moon_orbit(a_km: f64, e: f64, i_deg: f64) -> Option<ReferenceOrbit> {
    Some(ReferenceOrbit {
        semi_major_axis_km: a_km,
        eccentricity: e,
        inclination_rad: deg(i_deg),
        longitude_of_ascending_node_rad: None,
        argument_of_periapsis_rad: None,
        mean_anomaly_rad: None,
    })
}

pub const SUN: Body = spherical(
    "Sun",
    None,
    695_700.0,
    1.9891e30,
    days(27.47),
    1.327_124_400_18e11,
    deg(7.25),
    None,
);

pub const MERCURY: Body = spherical(
    "Mercury",
    Some("Sun"),
    2_439.7,
    3.3011e23,
    days(58.646),
    2.2032e4,
    deg(0.034),
    planet_orbit(57_909_050.0, 0.205_630, 7.005, 48.331, 29.124, 174.796),
);

pub const VENUS: Body = spherical(
    "Venus",
    Some("Sun"),
    6_051.8,
    4.8675e24,
    days(-243.025),
    3.248_59e5,
    deg(177.36),
    planet_orbit(108_208_000.0, 0.006_772, 3.394_58, 76.680, 54.884, 50.115),
);

pub const EARTH: Body = oblate(
    "Earth",
    Some("Sun"),
    [6_371.0, 6_356.8, 6_378.1],
    5.97237e24,
    days(0.997_269_68),
    3.986_004_418e5,
    deg(23.439_281_1),
    planet_orbit(149_598_023.0, 0.016_708_6, 5.0e-5, -11.260_64, 114.207_83, 358.617),
)
.with_ellipsoid_eccentricity(0.08182);

pub const MOON: Body = oblate(
    "Moon",
    Some("Earth"),
    [1_737.4, 1_736.0, 1_738.1],
    7.342e22,
    days(27.321_661),
    4.904_869_5e3,
    deg(6.687),
    moon_orbit(384_399.0, 0.0549, 5.145),
);

pub const MARS: Body = oblate(
    "Mars",
    Some("Sun"),
    [3_389.5, 3_376.2, 3_396.2],
    6.4171e23,
    days(1.025_957),
    4.282_837e4,
    deg(25.19),
    planet_orbit(227_939_200.0, 0.0934, 1.85, 49.558, 286.502, 19.412),
);

pub const JUPITER: Body = oblate(
    "Jupiter",
    Some("Sun"),
    [66_911.0, 66_854.0, 71_492.0],
    1.8982e27,
    9.925 * SECONDS_PER_HOUR,
    1.266_865_34e8,
    deg(3.13),
    planet_orbit(778.57e6, 0.0489, 1.303, 100.464, 273.867, 20.020),
);

pub const SATURN: Body = oblate(
    "Saturn",
    Some("Sun"),
    [58_232.0, 54_364.0, 60_268.0],
    5.6834e26,
    10.0 * SECONDS_PER_HOUR + 33.0 * 60.0 + 38.0,
    3.793_118_7e7,
    deg(26.73),
    planet_orbit(1_433.53e6, 0.0565, 2.485, 113.665, 339.392, 317.020),
);

pub const URANUS: Body = oblate(
    "Uranus",
    Some("Sun"),
    [25_362.0, 24_973.0, 25_559.0],
    8.6810e25,
    days(-0.718_33),
    5.793_939e6,
    deg(97.77),
    planet_orbit(19.2184 * AU_KM, 0.046_381, 0.773, 74.006, 96.998_857, 142.238_6),
);

pub const NEPTUNE: Body = oblate(
    "Neptune",
    Some("Sun"),
    [24_622.0, 24_341.0, 24_764.0],
    1.02413e26,
    days(0.6713),
    6.836_529e6,
    deg(28.32),
    planet_orbit(30.07 * AU_KM, 0.008_678, 1.767_975, 131.784, 276.336, 256.228),
);

// Galilean moons rotate synchronously with their orbits.
pub const IO: Body = spherical(
    "Io",
    Some("Jupiter"),
    1_821.6,
    8.931_938e22,
    days(1.769_137_786),
    5_959.916,
    0.0,
    moon_orbit(421_700.0, 0.0041, 0.05),
);

pub const EUROPA: Body = spherical(
    "Europa",
    Some("Jupiter"),
    1_560.8,
    4.799_844e22,
    days(3.551_181),
    3_202.739,
    0.0,
    moon_orbit(670_900.0, 0.009, 0.47),
);

pub const GANYMEDE: Body = spherical(
    "Ganymede",
    Some("Jupiter"),
    2_634.1,
    1.4819e23,
    days(7.154_552_96),
    9_887.834,
    0.0,
    moon_orbit(1_070_400.0, 0.0013, 0.2),
);

pub const CALLISTO: Body = spherical(
    "Callisto",
    Some("Jupiter"),
    2_410.3,
    1.075_938e23,
    days(16.689_018_4),
    7_179.289,
    0.0,
    moon_orbit(1_882_700.0, 0.0074, 0.192),
);

static BODIES: [Body; 14] = [
    SUN, MERCURY, VENUS, EARTH, MOON, MARS, JUPITER, SATURN, URANUS, NEPTUNE, IO, EUROPA, GANYMEDE,
    CALLISTO,
];

/// Every built-in body, parents before their satellites.
pub fn all() -> &'static [Body] {
    &BODIES
}

/// Case-insensitive lookup in the built-in table.
pub fn find(name: &str) -> Option<&'static Body> {
    BODIES.iter().find(|b| b.name.eq_ignore_ascii_case(name))
}

/// Built-in satellites orbiting `parent`.
pub fn satellites_of(parent: &str) -> impl Iterator<Item = &'static Body> + '_ {
    BODIES.iter().filter(move |b| {
        b.parent
            .as_deref()
            .is_some_and(|p| p.eq_ignore_ascii_case(parent))
    })
}

/// Length of the sidereal Earth year in seconds.
pub const EARTH_YEAR_S: f64 = EARTH_YEAR_DAYS * SECONDS_PER_DAY;
