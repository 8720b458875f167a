//! This simple submodule implements a comparison between two runs.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use vtkcmp::prelude::*;

/// A comparison takes a computed run and a reference run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct Comparison {
  /// The name of this comparison.
  pub(crate) name: String,
  /// The computed .pvd file.
  pub(crate) computed: PathBuf,
  /// The reference .pvd file.
  pub(crate) reference: PathBuf,
  /// The settings (tolerance, flag limit).
  #[serde(flatten)]
  pub(crate) settings: CompareSettings,
  /// Points in time to compare. Empty compares them all.
  #[serde(default, alias = "timestep")]
  pub(crate) timesteps: TimestepFilter
}

impl Comparison {
  /// Makes relative paths relative to a base directory.
  pub(crate) fn rebase(mut self, base: &Path) -> Self {
    if self.computed.is_relative() {
      self.computed = base.join(&self.computed);
    }
    if self.reference.is_relative() {
      self.reference = base.join(&self.reference);
    }
    return self;
  }

  /// Runs this comparison.
  pub(crate) fn run(&self) -> Result<ComparisonReport, CompareError> {
    return compare_runs(
      &self.computed,
      &self.reference,
      &self.timesteps,
      &self.settings
    );
  }
}
