use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use log::info;
use orbits::config::resolve_body;
use orbits::export::{plans, writer_for_path};
use orbits::maneuvers::{ManeuverKind, ManeuverRequest, ManeuverType, plan};

/// Plan an impulsive maneuver between circular orbits and export its impulses.
#[derive(Parser, Debug)]
#[command(author, version, about = "Impulsive maneuver planner")]
struct Cli {
    /// hohmann, bi_elliptic, general or plane_change
    #[arg(long)]
    kind: ManeuverType,

    /// Radius of the initial circular orbit in km
    #[arg(long)]
    initial_radius: f64,

    /// Radius of the final circular orbit in km (defaults to the initial radius)
    #[arg(long)]
    final_radius: Option<f64>,

    /// Apoapsis of the bi-elliptic intermediate ellipse in km
    #[arg(long)]
    transfer_apoapsis: Option<f64>,

    /// Eccentricity of the general transfer orbit
    #[arg(long)]
    transfer_eccentricity: Option<f64>,

    /// Inclination change for a plane change
    #[arg(long)]
    inclination_change: Option<f64>,

    /// Inclination change is given in degrees
    #[arg(long, default_value_t = false)]
    degrees: bool,

    /// Attracting body (case-insensitive name from the built-in table)
    #[arg(long, default_value = "earth")]
    body: String,

    /// Simulation time of the first impulse in seconds
    #[arg(long, default_value_t = 0.0)]
    start_epoch: f64,

    /// Calendar time of the first impulse (RFC 3339); prints a dated schedule
    #[arg(long)]
    start: Option<DateTime<Utc>>,

    /// Output path for the plan (`-` for stdout)
    #[arg(long, default_value = "-")]
    output: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Csv)]
    format: Format,
}

#[derive(Copy, Clone, ValueEnum, Debug)]
enum Format {
    Csv,
    Json,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let body = resolve_body(&cli.body, &[])?;
    let parameter = match cli.kind {
        ManeuverType::Hohmann => None,
        ManeuverType::BiElliptic => cli.transfer_apoapsis,
        ManeuverType::General => cli.transfer_eccentricity,
        ManeuverType::PlaneChange => cli.inclination_change.map(|angle| {
            if cli.degrees {
                angle.to_radians()
            } else {
                angle
            }
        }),
    };
    let request = ManeuverRequest {
        kind: ManeuverKind::from_type(cli.kind, parameter)?,
        initial_radius_km: cli.initial_radius,
        final_radius_km: cli.final_radius.unwrap_or(cli.initial_radius),
        mu: body.mu_km3_s2,
        start_epoch_s: cli.start_epoch,
    };
    let plan = plan(&request)?;

    let mut writer = writer_for_path(&cli.output)
        .with_context(|| format!("opening {}", cli.output.display()))?;
    match cli.format {
        Format::Csv => plans::write_impulses_csv(writer.as_mut(), &plan)?,
        Format::Json => plans::write_plan_json(writer.as_mut(), &plan)?,
    }
    writer.flush()?;
    info!(
        "wrote {} impulses as {:?} to {}",
        plan.impulses.len(),
        cli.format,
        cli.output.display()
    );

    eprintln!(
        "{} around {}: total Δv {:.4} km/s over {:.1} s",
        plan.maneuver, body.name, plan.total_delta_v_km_s, plan.duration_s
    );
    if let Some(start) = cli.start {
        for (index, scheduled) in plan.schedule_from(start).iter().enumerate() {
            eprintln!(
                "  impulse {index}: {} Δv {:+.4} km/s",
                scheduled.at.to_rfc3339(),
                scheduled.impulse.delta_v_km_s
            );
        }
    }
    Ok(())
}
