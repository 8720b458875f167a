//! This module implements the merged dataset: all the partitions of a single
//! timestep glued together into one unstructured grid, with every value
//! flattened to `f64` so it can be compared.

use serde::{Deserialize, Serialize};
use vtkio::model::{
  Attribute,
  DataArray,
  FieldArray,
  IOBuffer,
  UnstructuredGridPiece,
  VertexNumbers
};

/// A named data array, flattened (components are laid out contiguously).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NamedArray {
  /// The array name.
  pub name: String,
  /// The values, all components of a tuple next to each other.
  pub values: Vec<f64>
}

impl NamedArray {
  /// Makes a new named array.
  pub fn new<S: Into<String>>(name: S, values: Vec<f64>) -> Self {
    return Self { name: name.into(), values };
  }
}

/// An unstructured grid merged from one or more partitions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MergedGrid {
  /// Point coordinates, three per point.
  pub points: Vec<f64>,
  /// Cell connectivity (point indices).
  pub connectivity: Vec<u64>,
  /// End offset of each cell within the connectivity.
  pub offsets: Vec<u64>,
  /// VTK cell type of each cell.
  pub cell_types: Vec<u8>,
  /// Point data arrays.
  pub point_data: Vec<NamedArray>,
  /// Cell data arrays.
  pub cell_data: Vec<NamedArray>,
  /// Number of partitions merged into this grid.
  pub pieces: usize
}

impl MergedGrid {
  /// Number of points.
  pub fn num_points(&self) -> usize {
    return self.points.len() / 3;
  }

  /// Number of cells.
  pub fn num_cells(&self) -> usize {
    return self.cell_types.len();
  }

  /// Appends a partition to this grid. Points are not de-duplicated; the
  /// cells of the new piece are rebased to point past what's already here.
  /// Fails if the piece's arrays differ by name from the first piece's.
  pub fn append_piece(
    &mut self,
    piece: UnstructuredGridPiece
  ) -> Result<(), String> {
    let point_base = self.num_points() as u64;
    let conn_base = self.connectivity.len() as u64;
    let (connectivity, offsets) = match piece.cells.cell_verts {
      VertexNumbers::XML { connectivity, offsets } => (connectivity, offsets),
      VertexNumbers::Legacy { vertices, .. } => legacy_cells(&vertices)?
    };
    if offsets.len() != piece.cells.types.len() {
      return Err(format!(
        "piece {} has {} offsets for {} cells",
        self.pieces,
        offsets.len(),
        piece.cells.types.len()
      ));
    }
    let points = flatten(piece.points);
    if points.len() % 3 != 0 {
      return Err(format!(
        "piece {} has {} coordinates, not a multiple of 3",
        self.pieces,
        points.len()
      ));
    }
    let point_data = flatten_attributes(piece.data.point);
    let cell_data = flatten_attributes(piece.data.cell);
    if self.pieces == 0 {
      self.point_data = point_data;
      self.cell_data = cell_data;
    } else {
      append_arrays(&mut self.point_data, point_data, "point", self.pieces)?;
      append_arrays(&mut self.cell_data, cell_data, "cell", self.pieces)?;
    }
    self.points.extend(points);
    self.connectivity.extend(connectivity.into_iter().map(|i| i + point_base));
    self.offsets.extend(offsets.into_iter().map(|o| o + conn_base));
    self.cell_types.extend(piece.cells.types.into_iter().map(|t| t as u8));
    self.pieces += 1;
    return Ok(());
  }
}

/// Converts legacy cell lists (`n, v1, ..., vn, n, ...`) to connectivity and
/// offsets.
fn legacy_cells(vertices: &[u32]) -> Result<(Vec<u64>, Vec<u64>), String> {
  let mut connectivity = Vec::new();
  let mut offsets = Vec::new();
  let mut rest = vertices;
  while let Some((&n, tail)) = rest.split_first() {
    let n = n as usize;
    if tail.len() < n {
      return Err("truncated legacy cell list".to_string());
    }
    connectivity.extend(tail[..n].iter().map(|&v| v as u64));
    offsets.push(connectivity.len() as u64);
    rest = &tail[n..];
  }
  return Ok((connectivity, offsets));
}

/// Flattens any kind of buffer into floats.
fn flatten(buf: IOBuffer) -> Vec<f64> {
  return match buf {
    IOBuffer::Bit(v) => v.into_iter().map(f64::from).collect(),
    IOBuffer::U8(v) => v.into_iter().map(f64::from).collect(),
    IOBuffer::I8(v) => v.into_iter().map(f64::from).collect(),
    IOBuffer::U16(v) => v.into_iter().map(f64::from).collect(),
    IOBuffer::I16(v) => v.into_iter().map(f64::from).collect(),
    IOBuffer::U32(v) => v.into_iter().map(f64::from).collect(),
    IOBuffer::I32(v) => v.into_iter().map(f64::from).collect(),
    IOBuffer::U64(v) => v.into_iter().map(|x| x as f64).collect(),
    IOBuffer::I64(v) => v.into_iter().map(|x| x as f64).collect(),
    IOBuffer::F32(v) => v.into_iter().map(f64::from).collect(),
    IOBuffer::F64(v) => v
  };
}

/// Flattens point or cell attributes into named arrays. Field attributes
/// contribute one array per field array.
fn flatten_attributes(attrs: Vec<Attribute>) -> Vec<NamedArray> {
  let mut out = Vec::new();
  for attr in attrs {
    match attr {
      Attribute::DataArray(DataArray { name, data, .. }) => {
        out.push(NamedArray::new(name, flatten(data)));
      },
      Attribute::Field { data_array, .. } => {
        for FieldArray { name, data, .. } in data_array {
          out.push(NamedArray::new(name, flatten(data)));
        }
      }
    }
  }
  return out;
}

/// Appends the arrays of a later piece to the ones from earlier pieces. Both
/// must carry the same array names.
fn append_arrays(
  merged: &mut [NamedArray],
  mut new: Vec<NamedArray>,
  location: &str,
  piece: usize
) -> Result<(), String> {
  for arr in merged.iter_mut() {
    let pos = new.iter().position(|n| n.name == arr.name).ok_or_else(|| {
      format!("piece {} lacks {} array \"{}\"", piece, location, arr.name)
    })?;
    arr.values.extend(new.swap_remove(pos).values);
  }
  if let Some(extra) = new.first() {
    return Err(format!(
      "piece {} has {} array \"{}\" the first piece lacks",
      piece, location, extra.name
    ));
  }
  return Ok(());
}
