//! This module ties everything together: it compares a computed run against a
//! reference run, from the collection indices down to the merged data.

use std::path::{Path, PathBuf};

use clap::Args;
use log::{debug, info, warn};
use serde::{Serialize, Deserialize};

use crate::prelude::*;

/// Default for the max number of flagged values kept per timestep.
pub const DEFAULT_MAX_FLAGS: usize = 10;

/// Returns the default for `max_flags` (for serde).
fn default_max_flags() -> usize {
  return DEFAULT_MAX_FLAGS;
}

/// This contains the settings for when you need to compare two runs.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, Args)]
pub struct CompareSettings {
  /// Absolute tolerance for data values.
  #[arg(skip)]
  pub tolerance: f64,
  /// Max number of flagged values to report per timestep (0 for no limit).
  #[arg(short = 'F', long, default_value_t = DEFAULT_MAX_FLAGS)]
  #[serde(default = "default_max_flags")]
  pub max_flags: usize
}

impl CompareSettings {
  /// Settings with the given tolerance and the default flag limit.
  pub fn with_tolerance(tolerance: f64) -> Self {
    return Self { tolerance, max_flags: DEFAULT_MAX_FLAGS };
  }
}

/// What was compared for a single timestep.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TimestepReport {
  /// The computed partition index.
  pub computed: PathBuf,
  /// The reference partition index.
  pub reference: PathBuf,
  /// Number of points in the merged grids.
  pub points: usize,
  /// Number of cells in the merged grids.
  pub cells: usize,
  /// Number of pieces merged in the computed run.
  pub pieces_computed: usize,
  /// Number of pieces merged in the reference run.
  pub pieces_reference: usize
}

/// What was compared for a pair of runs that matched.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ComparisonReport {
  /// The computed collection index.
  pub computed: PathBuf,
  /// The reference collection index.
  pub reference: PathBuf,
  /// The tolerance used.
  pub tolerance: f64,
  /// The requested points in time (empty for all).
  pub filter: TimestepFilter,
  /// One entry per compared timestep, in document order.
  pub timesteps: Vec<TimestepReport>
}

/// Compares a computed run with a reference run. Stops at the first problem.
///
/// The collection indices are compared first, then the timesteps are selected
/// from each, then every pair of partition indices is compared. Only after
/// all of that is data read: every computed timestep is merged, then every
/// reference one, and only then are the pairs compared within the tolerance.
pub fn compare_runs(
  computed: &Path,
  reference: &Path,
  filter: &TimestepFilter,
  settings: &CompareSettings
) -> Result<ComparisonReport, CompareError> {
  check_tolerance(settings.tolerance)?;
  if !(computed.is_file() && reference.is_file()) {
    return Err(CompareError::InvalidArgument(
      "the .pvd paths given are not OK!".to_string()
    ));
  }
  let comp = CollectionIndex::open(computed)?;
  let refr = CollectionIndex::open(reference)?;
  compare_collections(&comp, &refr)?;
  // select the partition indices
  let resolve = |idx: &CollectionIndex| -> Result<Vec<PathBuf>, CompareError> {
    return Ok(
      select_timesteps(idx, filter)?
        .iter()
        .map(|f| idx.resolve(f))
        .collect()
    );
  };
  let steps_comp = resolve(&comp)?;
  let steps_ref = resolve(&refr)?;
  if steps_comp.len() != steps_ref.len() {
    return Err(StructuralMismatch::TimestepCount {
      computed: steps_comp.len(),
      reference: steps_ref.len()
    }.into());
  }
  for (c, r) in steps_comp.iter().zip(steps_ref.iter()) {
    compare_partition_indices(c, r)?;
  }
  // all the reading happens before any numbers are looked at
  let grids_comp = steps_comp.iter()
    .map(|s| merge_partitions(s))
    .collect::<Result<Vec<MergedGrid>, CompareError>>()?;
  let grids_ref = steps_ref.iter()
    .map(|s| merge_partitions(s))
    .collect::<Result<Vec<MergedGrid>, CompareError>>()?;
  info!("Comparing data for {} timestep(s)...", steps_comp.len());
  let mut timesteps = Vec::new();
  let pairs = steps_comp.into_iter()
    .zip(steps_ref)
    .zip(grids_comp.iter().zip(grids_ref.iter()));
  for ((c, r), (grid_comp, grid_ref)) in pairs {
    debug!("Comparing {} against {}...", c.display(), r.display());
    let res = compare_grids(
      grid_comp,
      grid_ref,
      settings.tolerance,
      settings.max_flags
    );
    if let Err(mismatch) = res {
      return Err(CompareError::NumericMismatch {
        computed: c,
        reference: r,
        mismatch
      });
    }
    timesteps.push(TimestepReport {
      points: grid_comp.num_points(),
      cells: grid_comp.num_cells(),
      pieces_computed: grid_comp.pieces,
      pieces_reference: grid_ref.pieces,
      computed: c,
      reference: r
    });
  }
  return Ok(ComparisonReport {
    computed: computed.to_path_buf(),
    reference: reference.to_path_buf(),
    tolerance: settings.tolerance,
    filter: filter.clone(),
    timesteps
  });
}

/// Same as `compare_runs`, but the first error is logged and turned into a
/// `false`.
pub fn runs_match(
  computed: &Path,
  reference: &Path,
  filter: &TimestepFilter,
  settings: &CompareSettings
) -> bool {
  return match compare_runs(computed, reference, filter, settings) {
    Ok(_) => true,
    Err(e) => {
      warn!("{}", e);
      false
    }
  };
}
