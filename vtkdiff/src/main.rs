//! This utility compares the VTK output of two runs of the same model: a
//! computed one and a reference one, each given by its `.pvd` file. It tells
//! you whether they match within a tolerance, optionally only at some points
//! in time.
//!
//! The main purpose of this program is regression testing: run the model,
//! then check its output against output that's known to be good.

#![allow(clippy::needless_return)] // i'll never forgive rust for this

use std::path::PathBuf;

use clap::Parser;
use log::{LevelFilter, info, error};
use vtkcmp::prelude::*;

const INDENT: &str = "  ";

#[derive(Parser)]
#[command(author, version)]
struct Cli {
  /// Output extra/debug info while comparing.
  #[arg(short, long)]
  verbose: bool,
  /// Print the report as JSON instead of a success message.
  #[arg(long)]
  json: bool,
  /// Only print SUCCESS or FAILURE, logging the reason as a warning.
  #[arg(long)]
  no_raise: bool,
  /// The settings for the comparison.
  #[command(flatten)]
  settings: CompareSettings,
  /// Path to the computed .pvd file.
  computed: PathBuf,
  /// Path to the reference .pvd file.
  reference: PathBuf,
  /// Absolute tolerance for the data comparison.
  #[arg(allow_negative_numbers = true)]
  tolerance: String,
  /// Number of points in time to compare (0 or nothing for all).
  count: Option<usize>,
  /// The points in time to compare, as many as the count says.
  #[arg(allow_negative_numbers = true)]
  timesteps: Vec<f64>
}

/// Parses the tolerance and the timestep filter out of the arguments.
fn numeric_args(args: &mut Cli) -> Result<TimestepFilter, CompareError> {
  args.settings.tolerance = parse_tolerance(&args.tolerance)?;
  let filter = TimestepFilter::from_cli(args.count, &args.timesteps)?;
  if filter.is_all() {
    info!("Comparing all timesteps...");
  } else {
    info!("Comparing {} timestep(s)...", filter.len());
  }
  return Ok(filter);
}

fn main() {
  // init cli stuff
  let mut args = Cli::parse();
  let log_level = if args.verbose {
    LevelFilter::Debug
  } else {
    LevelFilter::Info
  };
  env_logger::builder().filter_level(log_level).init();
  let filter = match numeric_args(&mut args) {
    Ok(f) => f,
    Err(e) => {
      error!("{}", e);
      std::process::exit(1);
    }
  };
  // boolean mode: the reason was already logged
  if args.no_raise {
    if runs_match(&args.computed, &args.reference, &filter, &args.settings) {
      println!("SUCCESS");
    } else {
      println!("FAILURE");
      std::process::exit(1);
    }
    return;
  }
  let (comp, refr) = (&args.computed, &args.reference);
  let report = match compare_runs(comp, refr, &filter, &args.settings) {
    Ok(r) => r,
    Err(e) => {
      error!("{}", e);
      std::process::exit(1);
    }
  };
  if args.json {
    match serde_json::to_string_pretty(&report) {
      Ok(s) => println!("{}", s),
      Err(e) => {
        error!("could not serialize report: {}", e);
        std::process::exit(1);
      }
    }
    return;
  }
  for ts in report.timesteps.iter() {
    info!(
      "{}- {}: {} points, {} cells ({} vs. {} pieces);",
      INDENT,
      ts.computed.display(),
      ts.points,
      ts.cells,
      ts.pieces_computed,
      ts.pieces_reference
    );
  }
  println!(
    "SUCCESS: VTK results match for given .pvd files, points in time and \
    tolerance"
  );
}
