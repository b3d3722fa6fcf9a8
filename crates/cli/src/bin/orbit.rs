use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use log::info;
use orbits::bodies::Body;
use orbits::config::resolve_body;
use orbits::elements::{AngleUnit, ClassicalElements, Tolerances, determine, to_state};
use orbits::export::{states, writer_for_path};
use orbits::mechanics::{SolverSettings, TransferPath, gauss_problem, kepler_problem};
use orbits::primitives::StateVector;
use orbits::primitives::vector::Vector3;

/// Two-body state, element and propagation calculator.
#[derive(Parser, Debug)]
#[command(author, version, about = "Two-body orbit calculator")]
struct Cli {
    /// Attracting body (case-insensitive name from the built-in table)
    #[arg(long, global = true, default_value = "earth")]
    body: String,

    /// Gravitational parameter override in km^3/s^2
    #[arg(long, global = true)]
    mu: Option<f64>,

    /// Read and print angles in degrees instead of radians
    #[arg(long, global = true, default_value_t = false)]
    degrees: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// State vector from classical elements
    State {
        /// Semi-latus rectum in km
        #[arg(long)]
        p: f64,
        #[arg(long, default_value_t = 0.0)]
        e: f64,
        #[arg(long, default_value_t = 0.0)]
        i: f64,
        /// Longitude of the ascending node
        #[arg(long, default_value_t = 0.0)]
        raan: f64,
        /// Argument or longitude of periapsis, by orbit shape
        #[arg(long, default_value_t = 0.0)]
        periapsis: f64,
        /// True anomaly, argument of latitude or true longitude, by orbit shape
        #[arg(long, default_value_t = 0.0)]
        epoch: f64,
    },
    /// Classical elements from a state vector
    Elements {
        /// Position x,y,z in km
        #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
        r: Vector3,
        /// Velocity x,y,z in km/s
        #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
        v: Vector3,
    },
    /// Propagate a state vector with the universal-variable Kepler solver
    Propagate {
        #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
        r: Vector3,
        #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
        v: Vector3,
        /// Time of flight in seconds
        #[arg(long)]
        dt: f64,
        /// Number of equal steps to sample
        #[arg(long, default_value_t = 1)]
        steps: usize,
        /// Write sampled states as CSV to this path (`-` for stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Velocities joining two positions in a given time (Gauss problem)
    Lambert {
        #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
        r1: Vector3,
        #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
        r2: Vector3,
        /// Time of flight in seconds
        #[arg(long)]
        dt: f64,
        /// Take the long way around
        #[arg(long, default_value_t = false)]
        long: bool,
        /// Starting value of z
        #[arg(long, default_value_t = 0.0)]
        initial_guess: f64,
    },
}

fn parse_vector(s: &str) -> Result<Vector3, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("expected x,y,z but got '{s}'"));
    }
    let mut out = [0.0; 3];
    for (slot, part) in out.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|err| format!("invalid component '{part}': {err}"))?;
    }
    Ok(out)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let body: Body = resolve_body(&cli.body, &[])?;
    let mu = cli.mu.unwrap_or(body.mu_km3_s2);
    let unit = if cli.degrees {
        AngleUnit::Degrees
    } else {
        AngleUnit::Radians
    };
    let tolerances = Tolerances::default();
    let settings = SolverSettings::default();

    match cli.command {
        Command::State {
            p,
            e,
            i,
            raan,
            periapsis,
            epoch,
        } => {
            let elements = ClassicalElements::from_angles(
                p,
                e,
                unit.to_radians(i),
                unit.to_radians(raan),
                unit.to_radians(periapsis),
                unit.to_radians(epoch),
                &tolerances,
            )?;
            let state = to_state(&elements, mu);
            println!("geometry: {}", elements.geometry().name());
            print_state(&state);
        }
        Command::Elements { r, v } => {
            let el = determine(&StateVector::new(r, v), mu, &tolerances)?;
            let angle = |value: Option<f64>| match value {
                Some(value) => format!("{:.6}", unit.from_radians(value)),
                None => "undefined".to_string(),
            };
            println!("conic: {:?}", el.conic);
            println!("semi-latus rectum [km]: {:.6}", el.semi_latus_rectum_km);
            println!("eccentricity: {:.9}", el.eccentricity);
            match el.semi_major_axis_km {
                Some(a) => println!("semi-major axis [km]: {a:.6}"),
                None => println!("semi-major axis [km]: undefined"),
            }
            println!("specific energy [km^2/s^2]: {:.9}", el.energy_km2_s2);
            println!("inclination: {}", angle(Some(el.inclination)));
            println!("ascending node: {}", angle(el.raan));
            println!("argument of periapsis: {}", angle(el.arg_periapsis));
            println!("true anomaly: {}", angle(el.true_anomaly));
            println!("longitude of periapsis: {}", angle(el.longitude_of_periapsis));
            println!("argument of latitude: {}", angle(el.arg_latitude));
            println!("true longitude: {}", angle(el.true_longitude));
        }
        Command::Propagate {
            r,
            v,
            dt,
            steps,
            output,
        } => {
            if steps == 0 {
                bail!("--steps must be at least 1");
            }
            let start = StateVector::new(r, v);
            let mut samples = vec![(0.0, start)];
            for k in 1..=steps {
                let t = dt * k as f64 / steps as f64;
                let solution = kepler_problem(&r, &v, t, &settings, mu)
                    .with_context(|| format!("propagating to t={t} s"))?;
                samples.push((
                    t,
                    StateVector::new(solution.position_km, solution.velocity_km_s),
                ));
            }
            match output {
                Some(path) => {
                    let mut writer = writer_for_path(&path)?;
                    let records: Vec<states::Record<'_>> = samples
                        .iter()
                        .map(|(time_s, state)| states::Record {
                            body: "satellite",
                            time_s: *time_s,
                            state,
                        })
                        .collect();
                    states::write_csv(writer.as_mut(), &records)?;
                    writer.flush()?;
                    info!("wrote {} samples to {}", records.len(), path.display());
                }
                None => {
                    if let Some((_, last)) = samples.last() {
                        print_state(last);
                    }
                }
            }
        }
        Command::Lambert {
            r1,
            r2,
            dt,
            long,
            initial_guess,
        } => {
            let path = if long {
                TransferPath::Long
            } else {
                TransferPath::Short
            };
            let solution = gauss_problem(
                &r1,
                &r2,
                dt,
                path,
                &settings.with_initial_guess(initial_guess),
                mu,
            )?;
            println!("v1 [km/s]: {}", format_vector(&solution.initial_velocity_km_s));
            println!("v2 [km/s]: {}", format_vector(&solution.final_velocity_km_s));
            println!(
                "z: {:.6} after {} iterations",
                solution.universal_variable, solution.iterations
            );
        }
    }
    Ok(())
}

fn format_vector(v: &Vector3) -> String {
    format!("{:.6}, {:.6}, {:.6}", v[0], v[1], v[2])
}

fn print_state(state: &StateVector) {
    println!("r [km]: {}", format_vector(&state.position_km));
    println!("v [km/s]: {}", format_vector(&state.velocity_km_s));
}
