//! This module implements the timestep filter, which restricts a comparison to
//! some points in time, and parsing of the other numeric CLI inputs.

use serde::{Deserialize, Serialize};

use crate::error::CompareError;

/// Absolute tolerance for matching a timestep in a collection index to a
/// requested point in time. There is no relative part.
pub const TIMESTEP_ATOL: f64 = 1e-10;

/// Checks whether a timestep is close enough to a requested point in time.
pub fn timestep_matches(timestep: f64, requested: f64) -> bool {
  // the equality catches equal infinities
  return timestep == requested || (timestep - requested).abs() <= TIMESTEP_ATOL;
}

/// A set of requested points in time. Empty means "all timesteps".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimestepFilter {
  /// The requested points in time.
  times: Vec<f64>
}

impl TimestepFilter {
  /// A filter that lets every timestep through.
  pub fn all() -> Self {
    return Self::default();
  }

  /// A filter for the given points in time.
  pub fn new(times: Vec<f64>) -> Self {
    return Self { times };
  }

  /// Builds a filter from the command-line form: an optional count, followed
  /// by exactly that many values. A count of zero means all timesteps.
  pub fn from_cli(
    count: Option<usize>,
    values: &[f64]
  ) -> Result<Self, CompareError> {
    let expected = count.unwrap_or(0);
    if expected != values.len() {
      return Err(CompareError::InvalidArgument(format!(
        "you said {} time step(s) but listed {}! Check your arguments!",
        expected,
        values.len()
      )));
    }
    return Ok(Self::new(values.to_vec()));
  }

  /// Does this filter let everything through?
  pub fn is_all(&self) -> bool {
    return self.times.is_empty();
  }

  /// Number of requested points in time.
  pub fn len(&self) -> usize {
    return self.times.len();
  }

  /// Same as `is_all`.
  pub fn is_empty(&self) -> bool {
    return self.is_all();
  }

  /// The requested points in time.
  pub fn times(&self) -> &[f64] {
    return &self.times;
  }

  /// Does a timestep pass this filter?
  pub fn accepts(&self, timestep: f64) -> bool {
    return self.is_all()
      || self.times.iter().any(|&r| timestep_matches(timestep, r));
  }
}

/// Parses a comparison tolerance. Must be a non-negative float.
pub fn parse_tolerance(s: &str) -> Result<f64, CompareError> {
  let tol: f64 = s.trim().parse().map_err(|_| {
    CompareError::InvalidArgument(format!(
      "given tolerance \"{}\" is no float! Check your arguments!",
      s
    ))
  })?;
  return check_tolerance(tol);
}

/// Rejects negative and NaN tolerances.
pub fn check_tolerance(tol: f64) -> Result<f64, CompareError> {
  if tol.is_nan() || tol < 0.0 {
    return Err(CompareError::InvalidArgument(format!(
      "tolerance must be a non-negative number, got {}",
      tol
    )));
  }
  return Ok(tol);
}
