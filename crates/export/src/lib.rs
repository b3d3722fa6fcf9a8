//! Export helpers for CSV and JSON artifacts.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

/// State-vector time series, one row per sample.
pub mod states {
    use std::io::{self, Write};

    use orbits_core::StateVector;

    const HEADER: &str = "body,time_s,x_km,y_km,z_km,vx_km_s,vy_km_s,vz_km_s";

    pub fn write_header(writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "{}", HEADER)
    }

    /// CSV row emitted by the state exporter.
    #[derive(Debug, Clone, Copy)]
    pub struct Record<'a> {
        pub body: &'a str,
        pub time_s: f64,
        pub state: &'a StateVector,
    }

    impl Record<'_> {
        /// Serialize the record to CSV, matching the header ordering.
        pub fn write_to(&self, writer: &mut dyn Write) -> io::Result<()> {
            let [x, y, z] = self.state.position_km;
            let [vx, vy, vz] = self.state.velocity_km_s;
            writeln!(
                writer,
                "{},{:.3},{:.6},{:.6},{:.6},{:.9},{:.9},{:.9}",
                self.body, self.time_s, x, y, z, vx, vy, vz
            )
        }
    }

    /// Header followed by every record, in order.
    pub fn write_csv(writer: &mut dyn Write, records: &[Record<'_>]) -> io::Result<()> {
        write_header(writer)?;
        for record in records {
            record.write_to(writer)?;
        }
        Ok(())
    }
}

/// Maneuver plans: impulse tables and JSON summaries.
pub mod plans {
    use std::io::{self, Write};

    use orbits_maneuvers::{BurnAxis, ManeuverPlan};
    use serde_json::to_writer_pretty;

    const HEADER: &str = "index,epoch_s,delta_v_km_s,burn_angle_deg,axis";

    pub fn write_header(writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "{}", HEADER)
    }

    /// One CSV row per impulse, preceded by the header.
    pub fn write_impulses_csv(writer: &mut dyn Write, plan: &ManeuverPlan) -> io::Result<()> {
        write_header(writer)?;
        for (index, impulse) in plan.impulses.iter().enumerate() {
            let axis = match impulse.axis {
                BurnAxis::OrbitNormal => "orbit_normal",
                BurnAxis::Radial => "radial",
            };
            writeln!(
                writer,
                "{},{:.3},{:.6},{:.6},{}",
                index,
                impulse.epoch_s,
                impulse.delta_v_km_s,
                impulse.burn_angle_rad.to_degrees(),
                axis
            )?;
        }
        Ok(())
    }

    /// Pretty-printed JSON of the whole plan.
    pub fn write_plan_json(writer: &mut dyn Write, plan: &ManeuverPlan) -> io::Result<()> {
        to_writer_pretty(&mut *writer, plan)?;
        writeln!(writer)
    }
}
