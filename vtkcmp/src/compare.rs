//! This module implements numerical comparison of merged grids. First the two
//! grids are checked for compatibility (same topology, same arrays), then
//! every coordinate and array value is checked against the criteria.

use std::fmt::Display;

use itertools::Itertools;
use serde::{Serialize, Deserialize};

use crate::grid::{MergedGrid, NamedArray};

/// Value testing criteria. Only absolute differences are considered.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Criteria {
  /// Max absolute difference between two values.
  pub max_difference: f64,
  /// Flag NaNs? A NaN is never close to anything, not even another NaN.
  pub flag_nan: bool
}

impl Criteria {
  /// Criteria for an absolute tolerance, flagging NaNs.
  pub fn absolute(tolerance: f64) -> Self {
    return Self { max_difference: tolerance, flag_nan: true };
  }

  /// Checks a pair of values against this set of criteria.
  pub fn check(&self, a: f64, b: f64) -> Option<FlagReason> {
    // covers equal infinities
    if a == b {
      return None;
    }
    if a.is_nan() || b.is_nan() {
      return if self.flag_nan { Some(FlagReason::NaN) } else { None };
    }
    let diff = (a - b).abs();
    if diff > self.max_difference {
      return Some(FlagReason::Difference {
        abs_difference: diff,
        max_epsilon: self.max_difference
      });
    }
    return None;
  }
}

/// The reason a value was flagged.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum FlagReason {
  /// Flagged due to an absolute difference.
  Difference {
    /// The absolute-value difference between the numbers.
    abs_difference: f64,
    /// The exceeded epsilon value.
    max_epsilon: f64
  },
  /// Flagged due to being a NaN.
  NaN
}

impl Display for FlagReason {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return match self {
      Self::Difference { abs_difference, max_epsilon } => write!(
        f,
        "difference {:e} exceeds {:e}",
        abs_difference,
        max_epsilon
      ),
      Self::NaN => write!(f, "NaN")
    };
  }
}

/// Where in a grid a value lives.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum DataLocation {
  /// The point coordinates.
  Points,
  /// A point data array.
  PointData(String),
  /// A cell data array.
  CellData(String)
}

impl Display for DataLocation {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return match self {
      Self::Points => write!(f, "point coordinates"),
      Self::PointData(n) => write!(f, "point data \"{}\"", n),
      Self::CellData(n) => write!(f, "cell data \"{}\"", n)
    };
  }
}

/// This structure holds a flagged difference in data.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FlaggedValue {
  /// Where the value is.
  pub location: DataLocation,
  /// The flat index within the location (component-wise).
  pub index: usize,
  /// The value in grid A.
  pub val_a: f64,
  /// The value in grid B.
  pub val_b: f64,
  /// The reason for flagging.
  pub reason: FlagReason
}

impl Display for FlaggedValue {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return write!(
      f,
      "{}[{}]: {} vs. {} ({})",
      self.location,
      self.index,
      self.val_a,
      self.val_b,
      self.reason
    );
  }
}

/// This enumeration is a "shallow" comparison of grids -- the values aren't
/// compared, it's just to see whether they can be compared at all.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum GridCompatibility {
  /// The grids don't have the same number of points.
  DifferentPointCount(usize, usize),
  /// The grids don't have the same number of cells.
  DifferentCellCount(usize, usize),
  /// Some cell has a different type.
  DifferentCellTypes,
  /// Some cell has different points.
  DifferentConnectivity,
  /// The grids don't carry the same named arrays.
  DifferentArrays {
    /// Which kind of array ("point" or "cell").
    location: String,
    /// Sorted array names in grid A.
    names_a: Vec<String>,
    /// Sorted array names in grid B.
    names_b: Vec<String>
  },
  /// Same-named arrays of different lengths.
  DifferentArrayLength {
    /// The arrays.
    location: DataLocation,
    /// Length in grid A.
    len_a: usize,
    /// Length in grid B.
    len_b: usize
  },
  /// The grids are compatible for value comparison.
  Compatible
}

impl Display for GridCompatibility {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return match self {
      Self::DifferentPointCount(a, b) => {
        write!(f, "number of points differ, {} != {}", a, b)
      },
      Self::DifferentCellCount(a, b) => {
        write!(f, "number of cells differ, {} != {}", a, b)
      },
      Self::DifferentCellTypes => write!(f, "cell types differ"),
      Self::DifferentConnectivity => write!(f, "cell connectivity differs"),
      Self::DifferentArrays { location, names_a, names_b } => write!(
        f,
        "{} arrays differ, [{}] vs. [{}]",
        location,
        names_a.join(", "),
        names_b.join(", ")
      ),
      Self::DifferentArrayLength { location, len_a, len_b } => write!(
        f,
        "lengths of {} differ, {} != {}",
        location,
        len_a,
        len_b
      ),
      Self::Compatible => write!(f, "compatible")
    };
  }
}

/// Sorted names of some arrays.
fn sorted_names(arrays: &[NamedArray]) -> Vec<String> {
  return arrays.iter().map(|a| a.name.clone()).sorted().collect();
}

/// Finds an array by name.
fn find<'a>(arrays: &'a [NamedArray], name: &str) -> Option<&'a NamedArray> {
  return arrays.iter().find(|a| a.name == name);
}

impl From<(&MergedGrid, &MergedGrid)> for GridCompatibility {
  fn from((a, b): (&MergedGrid, &MergedGrid)) -> Self {
    if a.points.len() != b.points.len() {
      return Self::DifferentPointCount(a.num_points(), b.num_points());
    }
    if a.num_cells() != b.num_cells() {
      return Self::DifferentCellCount(a.num_cells(), b.num_cells());
    }
    if a.cell_types != b.cell_types {
      return Self::DifferentCellTypes;
    }
    if a.offsets != b.offsets || a.connectivity != b.connectivity {
      return Self::DifferentConnectivity;
    }
    let sets = [
      ("point", &a.point_data, &b.point_data),
      ("cell", &a.cell_data, &b.cell_data)
    ];
    for (location, arrs_a, arrs_b) in sets {
      let names_a = sorted_names(arrs_a);
      let names_b = sorted_names(arrs_b);
      if names_a != names_b {
        return Self::DifferentArrays {
          location: location.to_string(),
          names_a,
          names_b
        };
      }
      for arr in arrs_a.iter() {
        let len_b = find(arrs_b, &arr.name).map_or(0, |o| o.values.len());
        if arr.values.len() != len_b {
          let location = if location == "point" {
            DataLocation::PointData(arr.name.clone())
          } else {
            DataLocation::CellData(arr.name.clone())
          };
          return Self::DifferentArrayLength {
            location,
            len_a: arr.values.len(),
            len_b
          };
        }
      }
    }
    return Self::Compatible;
  }
}

/// This structure holds the necessary data to diff merged grids.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct GridDiffer {
  /// The value-flagging criteria.
  criteria: Criteria
}

impl GridDiffer {
  /// Instantiate a new GridDiffer with the given criteria.
  pub fn new(criteria: Criteria) -> Self {
    return Self { criteria };
  }

  /// Diff two grids and return flagged values, coordinates first, then point
  /// data, then cell data.
  pub fn compare<'a>(
    &'a self,
    a: &'a MergedGrid,
    b: &'a MergedGrid
  ) -> Result<impl Iterator<Item = FlaggedValue> + 'a, GridCompatibility> {
    let comp = GridCompatibility::from((a, b));
    if comp != GridCompatibility::Compatible {
      return Err(comp);
    }
    let mut pairs: Vec<(DataLocation, &'a [f64], &'a [f64])> = Vec::new();
    pairs.push((
      DataLocation::Points,
      a.points.as_slice(),
      b.points.as_slice()
    ));
    for arr in a.point_data.iter() {
      if let Some(other) = find(&b.point_data, &arr.name) {
        let loc = DataLocation::PointData(arr.name.clone());
        pairs.push((loc, arr.values.as_slice(), other.values.as_slice()));
      }
    }
    for arr in a.cell_data.iter() {
      if let Some(other) = find(&b.cell_data, &arr.name) {
        let loc = DataLocation::CellData(arr.name.clone());
        pairs.push((loc, arr.values.as_slice(), other.values.as_slice()));
      }
    }
    let criteria = self.criteria;
    return Ok(
      pairs.into_iter().flat_map(move |(loc, va, vb)| {
        va.iter()
          .zip(vb.iter())
          .enumerate()
          .filter_map(move |(index, (&x, &y))| {
            return criteria.check(x, y).map(|reason| FlaggedValue {
              location: loc.clone(),
              index,
              val_a: x,
              val_b: y,
              reason
            });
          })
      })
    );
  }
}

/// Why two grids didn't match.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum GridMismatch {
  /// They couldn't even be compared.
  Incompatible(GridCompatibility),
  /// Some values were flagged.
  Flagged {
    /// Total number of flagged values.
    total: usize,
    /// The first few flagged values.
    shown: Vec<FlaggedValue>
  }
}

impl Display for GridMismatch {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return match self {
      Self::Incompatible(c) => write!(f, "incompatible grids, {}", c),
      Self::Flagged { total, shown } => {
        write!(f, "{} value(s) flagged", total)?;
        for fv in shown {
          write!(f, "\n  - {}", fv)?;
        }
        if *total > shown.len() {
          write!(f, "\n  - ...and {} more", total - shown.len())?;
        }
        Ok(())
      }
    };
  }
}

/// Compares two merged grids within an absolute tolerance. At most `max_flags`
/// flagged values are kept in the error (zero keeps them all).
pub fn compare_grids(
  a: &MergedGrid,
  b: &MergedGrid,
  tolerance: f64,
  max_flags: usize
) -> Result<(), GridMismatch> {
  let differ = GridDiffer::new(Criteria::absolute(tolerance));
  let mut total = 0;
  let mut shown = Vec::new();
  for flag in differ.compare(a, b).map_err(GridMismatch::Incompatible)? {
    total += 1;
    if max_flags == 0 || shown.len() < max_flags {
      shown.push(flag);
    }
  }
  if total > 0 {
    return Err(GridMismatch::Flagged { total, shown });
  }
  return Ok(());
}
