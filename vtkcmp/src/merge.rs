//! This module implements reading the partitions of a timestep and merging
//! them into a single grid. Parsing the raw VTK files is left to `vtkio`.
//!
//! Pieces are merged in the order the partition index lists them. If two runs
//! were done with a different number of processors, the merged grids won't
//! line up point-by-point, and the numerical comparison will flag that.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};
use vtkio::model::{DataSet, Piece};
use vtkio::Vtk;

use crate::error::CompareError;
use crate::grid::MergedGrid;
use crate::partition::PartitionIndex;

/// The kinds of data object a VTK file can contain.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataObjectKind {
  /// Regular grid given by origin and spacing.
  ImageData,
  /// Curvilinear grid with explicit points.
  StructuredGrid,
  /// Axis-aligned grid with explicit coordinates.
  RectilinearGrid,
  /// Arbitrary points and cells.
  UnstructuredGrid,
  /// Polygonal data.
  PolyData,
  /// Bare field data.
  Field
}

impl Display for DataObjectKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return write!(f, "{:?}", self);
  }
}

impl From<&DataSet> for DataObjectKind {
  fn from(value: &DataSet) -> Self {
    return match value {
      DataSet::ImageData { .. } => Self::ImageData,
      DataSet::StructuredGrid { .. } => Self::StructuredGrid,
      DataSet::RectilinearGrid { .. } => Self::RectilinearGrid,
      DataSet::UnstructuredGrid { .. } => Self::UnstructuredGrid,
      DataSet::PolyData { .. } => Self::PolyData,
      DataSet::Field { .. } => Self::Field
    };
  }
}

/// Reads any VTK file through `vtkio`.
fn import(path: &Path) -> Result<Vtk, CompareError> {
  return Vtk::import(path)
    .map_err(|e| CompareError::Reader(path.to_path_buf(), format!("{:?}", e)));
}

/// Reads a file with the generic importer and tells what kind of data object
/// is inside.
pub fn probe_kind(path: &Path) -> Result<DataObjectKind, CompareError> {
  let vtk = import(path)?;
  return Ok(DataObjectKind::from(&vtk.data));
}

/// A reader that merges the partitions of a distributed dataset.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DistributedReader {
  /// Reads and merges unstructured grid pieces.
  UnstructuredGrid
}

impl DistributedReader {
  /// Picks the reader for a kind of data object.
  pub fn for_kind(kind: DataObjectKind) -> Result<Self, CompareError> {
    return match kind {
      DataObjectKind::UnstructuredGrid => Ok(Self::UnstructuredGrid),
      other => Err(CompareError::UnsupportedType(other))
    };
  }

  /// Reads every piece file, in order, and merges them.
  pub fn read(&self, pieces: &[PathBuf]) -> Result<MergedGrid, CompareError> {
    let mut grid = MergedGrid::default();
    match self {
      Self::UnstructuredGrid => {
        for p in pieces {
          let vtk = import(p)?;
          append_unstructured(p, vtk.data, &mut grid)?;
        }
      }
    }
    return Ok(grid);
  }
}

/// Appends every unstructured piece in a dataset to a grid.
fn append_unstructured(
  path: &Path,
  data: DataSet,
  grid: &mut MergedGrid
) -> Result<(), CompareError> {
  let reader_err = |msg: String| CompareError::Reader(path.to_path_buf(), msg);
  let pieces = match data {
    DataSet::UnstructuredGrid { pieces, .. } => pieces,
    other => return Err(CompareError::UnsupportedType((&other).into()))
  };
  for piece in pieces {
    match piece {
      Piece::Inline(p) => grid.append_piece(*p).map_err(reader_err)?,
      Piece::Loaded(ds) => append_unstructured(path, *ds, grid)?,
      Piece::Source(src, ..) => {
        return Err(reader_err(format!("unexpected piece reference {}", src)));
      }
    }
  }
  return Ok(());
}

/// Merges all partitions listed in a partition index into one grid. Every
/// piece must exist; the first one decides which reader is used.
pub fn merge_partitions(path: &Path) -> Result<MergedGrid, CompareError> {
  let index = PartitionIndex::open(path)?;
  let pieces = index.piece_sources()?;
  let first = pieces.first().ok_or_else(|| {
    CompareError::MalformedIndex(path.to_path_buf(), "no pieces".to_string())
  })?;
  let reader = DistributedReader::for_kind(probe_kind(first)?)?;
  let grid = reader.read(&pieces)?;
  debug!(
    "Merged {} piece(s) from {}: {} points, {} cells.",
    grid.pieces,
    path.display(),
    grid.num_points(),
    grid.num_cells()
  );
  return Ok(grid);
}
