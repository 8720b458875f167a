//! This program runs a batch of VTK output comparisons described by a
//! "script", which is just a TOML file listing pairs of computed and reference
//! `.pvd` files with their tolerances, and reports which ones passed.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![allow(clippy::needless_return)]

pub(crate) mod script;

use std::path::PathBuf;

use clap::Parser;
use log::{LevelFilter, error, info};

use crate::script::Script;
use crate::script::errors::ScriptError;

/// Command-line arguments.
#[derive(Parser)]
#[command(author, version)]
struct Cli {
  /// Output extra/debug info while comparing.
  #[arg(short, long)]
  verbose: bool,
  /// Only run the comparison with this name (can be repeated).
  #[arg(short = 'n', long = "name")]
  names: Vec<String>,
  /// Path to the script.
  script: PathBuf
}

/// Runs a script and outputs results. Returns the number of failures.
fn run_script(args: &Cli) -> Result<usize, ScriptError> {
  let script = Script::load(&args.script)?.only(&args.names)?;
  let mut failures = 0;
  for comp in script.comparisons.iter() {
    info!("Running {}...", comp.name);
    match comp.run() {
      Ok(report) => {
        println!("==> {}: PASSED", comp.name);
        println!("  => timesteps: {}", report.timesteps.len());
      },
      Err(e) => {
        failures += 1;
        println!("==> {}: FAILED", comp.name);
        error!("{}", e);
      }
    }
  }
  if script.comparisons.is_empty() {
    println!("no comparisons in script");
  }
  return Ok(failures);
}

fn main() {
  let args = Cli::parse();
  let log_level = if args.verbose {
    LevelFilter::Debug
  } else {
    LevelFilter::Info
  };
  env_logger::builder().filter_level(log_level).init();
  match run_script(&args) {
    Ok(0) => {},
    Ok(n) => {
      error!("{} comparison(s) failed.", n);
      std::process::exit(1);
    },
    Err(e) => {
      error!("{}", e);
      std::process::exit(1);
    }
  }
}
