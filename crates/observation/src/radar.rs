use std::f64::consts::TAU;

use log::debug;
use orbits_bodies::Body;
use orbits_core::StateVector;
use orbits_core::matrix;
use orbits_core::vector::{self, Vector3};
use orbits_frames::{equatorial_to_topocentric, topocentric_to_equatorial};

use crate::{ObservationError, Result};

/// Observer location on the surface of a rotating body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundStation {
    /// Height above the reference ellipsoid.
    pub elevation_km: f64,
    /// Geodetic latitude.
    pub latitude_rad: f64,
    /// Greenwich sidereal time plus east longitude.
    pub local_sidereal_time_rad: f64,
}

impl GroundStation {
    pub fn from_degrees(elevation_km: f64, latitude_deg: f64, lst_deg: f64) -> Self {
        Self {
            elevation_km,
            latitude_rad: latitude_deg.to_radians(),
            local_sidereal_time_rad: lst_deg.to_radians(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeAzEl {
    pub range_km: f64,
    pub azimuth_rad: f64,
    pub altitude_rad: f64,
}

impl RangeAzEl {
    pub fn from_degrees(range_km: f64, azimuth_deg: f64, altitude_deg: f64) -> Self {
        Self {
            range_km,
            azimuth_rad: azimuth_deg.to_radians(),
            altitude_rad: altitude_deg.to_radians(),
        }
    }

    /// Target position in the station's S-E-Z frame.
    pub fn topocentric(&self) -> Vector3 {
        let (sa, ca) = self.azimuth_rad.sin_cos();
        let (sh, ch) = self.altitude_rad.sin_cos();
        let rho = self.range_km;
        [-rho * ch * ca, rho * ch * sa, rho * sh]
    }
}

/// Time derivatives of a [`RangeAzEl`] measurement.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RangeAzElRates {
    pub range_rate_km_s: f64,
    pub azimuth_rate_rad_s: f64,
    pub altitude_rate_rad_s: f64,
}

impl RangeAzElRates {
    pub fn from_degrees(range_rate_km_s: f64, azimuth_rate_deg_s: f64, altitude_rate_deg_s: f64) -> Self {
        Self {
            range_rate_km_s,
            azimuth_rate_rad_s: azimuth_rate_deg_s.to_radians(),
            altitude_rate_rad_s: altitude_rate_deg_s.to_radians(),
        }
    }
}

/// Station position in the geocentric-equatorial frame on an oblate ellipsoid.
pub fn station_position(station: &GroundStation, body: &Body) -> Vector3 {
    let e = body.meridian_eccentricity();
    let a = body.equatorial_radius_km;
    let (s_lat, c_lat) = station.latitude_rad.sin_cos();
    let denom = (1.0 - e * e * s_lat * s_lat).sqrt();
    let x = c_lat * (a / denom + station.elevation_km);
    let z = s_lat * (a * (1.0 - e * e) / denom + station.elevation_km);
    let (s_lst, c_lst) = station.local_sidereal_time_rad.sin_cos();
    [x * c_lst, x * s_lst, z]
}

fn rotation_vector(body: &Body) -> Vector3 {
    [0.0, 0.0, body.angular_rotation()]
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DopplerSolution {
    pub topocentric_position: Vector3,
    /// Velocity relative to the rotating station, in S-E-Z.
    pub topocentric_velocity: Vector3,
    /// Inertial state in the geocentric-equatorial frame.
    pub state: StateVector,
}

/// Inertial state from one range/azimuth/altitude measurement and its rates.
pub fn doppler_state(
    obs: &RangeAzEl,
    rates: &RangeAzElRates,
    station: &GroundStation,
    body: &Body,
) -> DopplerSolution {
    let (sa, ca) = obs.azimuth_rad.sin_cos();
    let (sh, ch) = obs.altitude_rad.sin_cos();
    let rho = obs.range_km;
    let rho_dot = rates.range_rate_km_s;
    let az_dot = rates.azimuth_rate_rad_s;
    let alt_dot = rates.altitude_rate_rad_s;

    let topo_position = obs.topocentric();
    let topo_velocity = [
        -rho_dot * ch * ca + rho * sh * alt_dot * ca + rho * ch * sa * az_dot,
        rho_dot * ch * sa - rho * sh * alt_dot * sa + rho * ch * ca * az_dot,
        rho_dot * sh + rho * ch * alt_dot,
    ];

    let to_equatorial = topocentric_to_equatorial(station.latitude_rad, station.local_sidereal_time_rad);
    let position = vector::add(
        &matrix::mul_vec(&to_equatorial, &topo_position),
        &station_position(station, body),
    );
    let velocity = vector::add(
        &matrix::mul_vec(&to_equatorial, &topo_velocity),
        &vector::cross(&rotation_vector(body), &position),
    );
    debug!("doppler state: r={position:?} v={velocity:?}");
    DopplerSolution {
        topocentric_position: topo_position,
        topocentric_velocity: topo_velocity,
        state: StateVector::new(position, velocity),
    }
}

/// Range, azimuth and altitude of a geocentric position as seen from `station`.
pub fn to_observation(position: &Vector3, station: &GroundStation, body: &Body) -> Result<RangeAzEl> {
    let topo = topocentric_offset(position, station, body);
    let range = vector::norm(&topo);
    if range == 0.0 {
        return Err(ObservationError::Degenerate(
            "target coincides with the station".into(),
        ));
    }
    Ok(RangeAzEl {
        range_km: range,
        azimuth_rad: topo[1].atan2(-topo[0]).rem_euclid(TAU),
        altitude_rad: (topo[2] / range).clamp(-1.0, 1.0).asin(),
    })
}

/// Measurement and rates a station would record for an inertial `state`.
pub fn observe(
    state: &StateVector,
    station: &GroundStation,
    body: &Body,
) -> Result<(RangeAzEl, RangeAzElRates)> {
    let obs = to_observation(&state.position_km, station, body)?;
    let relative = vector::sub(
        &state.velocity_km_s,
        &vector::cross(&rotation_vector(body), &state.position_km),
    );
    let to_topo = equatorial_to_topocentric(station.latitude_rad, station.local_sidereal_time_rad);
    let p = topocentric_offset(&state.position_km, station, body);
    let pd = matrix::mul_vec(&to_topo, &relative);

    let horizontal = p[0] * p[0] + p[1] * p[1];
    if horizontal.sqrt() <= obs.range_km * 1e-12 {
        return Err(ObservationError::Degenerate(
            "azimuth rate is undefined at the zenith".into(),
        ));
    }
    let range_rate = vector::dot(&p, &pd) / obs.range_km;
    let altitude_rate = (pd[2] - range_rate * obs.altitude_rad.sin())
        / (obs.range_km * obs.altitude_rad.cos());
    let azimuth_rate = (p[1] * pd[0] - p[0] * pd[1]) / horizontal;
    Ok((
        obs,
        RangeAzElRates {
            range_rate_km_s: range_rate,
            azimuth_rate_rad_s: azimuth_rate,
            altitude_rate_rad_s: altitude_rate,
        },
    ))
}

fn topocentric_offset(position: &Vector3, station: &GroundStation, body: &Body) -> Vector3 {
    let to_topo = equatorial_to_topocentric(station.latitude_rad, station.local_sidereal_time_rad);
    matrix::mul_vec(&to_topo, &vector::sub(position, &station_position(station, body)))
}
