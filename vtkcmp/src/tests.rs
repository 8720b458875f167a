use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::Document;
use tempfile::TempDir;
use vtkio::model::*;

use crate::prelude::*;

/// Writes a run to disk: one collection index, one partition index per
/// timestep, and `pieces` quads per timestep, one per piece file.
struct RunBuilder<'a> {
  /// Where to write.
  root: &'a Path,
  /// Name of the run, also used as a file prefix.
  name: &'a str,
  /// The timesteps.
  times: Vec<f64>,
  /// Pieces per timestep.
  pieces: usize,
  /// Added to every data value.
  shift: f64
}

impl<'a> RunBuilder<'a> {
  fn new(root: &'a Path, name: &'a str) -> Self {
    return Self {
      root,
      name,
      times: vec![10.0, 35.0, 100.0],
      pieces: 1,
      shift: 0.0
    };
  }

  fn pvd(&self) -> String {
    let datasets: String = self.times.iter().enumerate()
      .map(|(i, t)| format!(
        "    <DataSet timestep=\"{}\" group=\"\" part=\"0\" \
        file=\"{}-files/step-{}.pvtu\"/>\n",
        t,
        self.name,
        i
      ))
      .collect();
    return format!(
      "<?xml version=\"1.0\"?>\n\
      <VTKFile type=\"Collection\" version=\"0.1\" \
      byte_order=\"LittleEndian\">\n  <Collection>\n{}  </Collection>\n\
      </VTKFile>\n",
      datasets
    );
  }

  fn pvtu(&self, step: usize) -> String {
    let pieces: String = (0..self.pieces)
      .map(|p| format!("    <Piece Source=\"{}/piece-{}.vtu\"/>\n", step, p))
      .collect();
    return format!(
      "<?xml version=\"1.0\"?>\n\
      <VTKFile type=\"PUnstructuredGrid\" version=\"0.1\" \
      byte_order=\"LittleEndian\">\n\
      \x20 <PUnstructuredGrid GhostLevel=\"0\">\n\
      \x20   <PPointData>\n\
      \x20     <PDataArray type=\"Float64\" Name=\"displacement\" \
      NumberOfComponents=\"1\"/>\n\
      \x20   </PPointData>\n\
      \x20   <PCellData>\n\
      \x20     <PDataArray type=\"Float64\" Name=\"stress\" \
      NumberOfComponents=\"1\"/>\n\
      \x20   </PCellData>\n\
      \x20   <PPoints>\n\
      \x20     <PDataArray type=\"Float64\" NumberOfComponents=\"3\"/>\n\
      \x20   </PPoints>\n\
      {}  </PUnstructuredGrid>\n\
      </VTKFile>\n",
      pieces
    );
  }

  fn vtu(&self, step: usize, piece: usize) -> String {
    let x = piece as f64;
    let points = format!(
      "{} 0 0 {} 0 0 {} 1 0 {} 1 0",
      x,
      x + 1.0,
      x + 1.0,
      x
    );
    let base = (step * 10 + piece) as f64 + self.shift;
    let disp = format!("{} {} {} {}", base, base + 0.5, base + 1.0, base + 1.5);
    return format!(
      "<?xml version=\"1.0\"?>\n\
      <VTKFile type=\"UnstructuredGrid\" version=\"0.1\" \
      byte_order=\"LittleEndian\">\n\
      <UnstructuredGrid>\n\
      <Piece NumberOfPoints=\"4\" NumberOfCells=\"1\">\n\
      <PointData>\n\
      <DataArray type=\"Float64\" Name=\"displacement\" \
      NumberOfComponents=\"1\" format=\"ascii\">{}</DataArray>\n\
      </PointData>\n\
      <CellData>\n\
      <DataArray type=\"Float64\" Name=\"stress\" \
      NumberOfComponents=\"1\" format=\"ascii\">{}</DataArray>\n\
      </CellData>\n\
      <Points>\n\
      <DataArray type=\"Float64\" NumberOfComponents=\"3\" \
      format=\"ascii\">{}</DataArray>\n\
      </Points>\n\
      <Cells>\n\
      <DataArray type=\"Int64\" Name=\"connectivity\" \
      format=\"ascii\">0 1 2 3</DataArray>\n\
      <DataArray type=\"Int64\" Name=\"offsets\" \
      format=\"ascii\">4</DataArray>\n\
      <DataArray type=\"UInt8\" Name=\"types\" \
      format=\"ascii\">9</DataArray>\n\
      </Cells>\n\
      </Piece>\n\
      </UnstructuredGrid>\n\
      </VTKFile>\n",
      disp,
      base * 2.0,
      points
    );
  }

  /// Writes everything, returns the path to the collection index.
  fn write(&self) -> PathBuf {
    let dir = self.root.join(self.name);
    let files = dir.join(format!("{}-files", self.name));
    for step in 0..self.times.len() {
      fs::create_dir_all(files.join(step.to_string())).unwrap();
      let pvtu = files.join(format!("step-{}.pvtu", step));
      fs::write(pvtu, self.pvtu(step)).unwrap();
      for piece in 0..self.pieces {
        let vtu = files.join(format!("{}/piece-{}.vtu", step, piece));
        fs::write(vtu, self.vtu(step, piece)).unwrap();
      }
    }
    let pvd = dir.join(format!("{}-structure.pvd", self.name));
    fs::write(&pvd, self.pvd()).unwrap();
    return pvd;
  }
}

fn settings(tol: f64) -> CompareSettings {
  return CompareSettings::with_tolerance(tol);
}

#[test]
fn test_stripping() {
  let a = "<a x=\"1\"><b file=\"one\" t=\"2\"/>\n  <c>text &amp; more</c></a>";
  let b =
    "<a x=\"1\"><b t=\"2\" file=\"two/three\"/>\n  <c>text &amp; more</c></a>";
  let doc_a = Document::parse(a).unwrap();
  let doc_b = Document::parse(b).unwrap();
  /// Drops every `file` attribute.
  struct NoFiles;
  impl StripRule for NoFiles {
    fn drop_element(&self, _: roxmltree::Node) -> bool { false }
    fn drop_attribute(&self, _: roxmltree::Node, a: &str) -> bool {
      a == "file"
    }
  }
  let sa = serialize_stripped(doc_a.root_element(), &NoFiles);
  let sb = serialize_stripped(doc_b.root_element(), &NoFiles);
  assert_eq!(sa, sb);
  assert_eq!(sa, "<a x=\"1\"><b t=\"2\" />\n  <c>text &amp; more</c></a>");
  // stripping again changes nothing
  let again = Document::parse(&sa).unwrap();
  assert_eq!(serialize_stripped(again.root_element(), &NoFiles), sa);
  assert_eq!(serialize_stripped(again.root_element(), &KeepAll), sa);
  // the unstripped documents do differ
  assert_ne!(
    serialize_stripped(doc_a.root_element(), &KeepAll),
    serialize_stripped(doc_b.root_element(), &KeepAll)
  );
}

#[test]
fn test_piece_tails_are_dropped() {
  let one = "<V>\n  <G>\n    <P/>\n    <Piece Source=\"a\"/>\n  </G>\n</V>";
  let three = "<V>\n  <G>\n    <P/>\n    <Piece Source=\"a\"/>\n    \
    <Piece Source=\"b\"/>\n    <Piece Source=\"c\"/>\n  </G>\n</V>";
  let s1 = serialize_stripped(
    Document::parse(one).unwrap().root_element(),
    &PieceLinks
  );
  let s3 = serialize_stripped(
    Document::parse(three).unwrap().root_element(),
    &PieceLinks
  );
  assert_eq!(s1, s3);
  assert!(!s1.contains("Piece"));
  // pieces deeper down are not links and stay
  let deep = "<V><G><H><Piece/></H></G></V>";
  let sd = serialize_stripped(
    Document::parse(deep).unwrap().root_element(),
    &PieceLinks
  );
  assert!(sd.contains("Piece"));
}

#[test]
fn test_timestep_matching() {
  assert!(timestep_matches(35.0, 35.0));
  assert!(timestep_matches(35.0, 35.0 + 5e-11));
  assert!(!timestep_matches(35.0, 35.0 + 1e-9));
  // absolute, not relative
  assert!(!timestep_matches(1e12, 1e12 + 1e-3));
  assert!(!timestep_matches(f64::NAN, f64::NAN));
  assert!(timestep_matches(f64::INFINITY, f64::INFINITY));
  let filter = TimestepFilter::new(vec![35.0, 100.0]);
  assert!(filter.accepts(100.0));
  assert!(!filter.accepts(10.0));
  assert!(TimestepFilter::all().accepts(10.0));
}

#[test]
fn test_cli_numbers() {
  assert!(TimestepFilter::from_cli(None, &[]).unwrap().is_all());
  assert!(TimestepFilter::from_cli(Some(0), &[]).unwrap().is_all());
  assert_eq!(TimestepFilter::from_cli(Some(2), &[1.0, 2.0]).unwrap().len(), 2);
  assert!(matches!(
    TimestepFilter::from_cli(Some(3), &[1.0, 2.0]),
    Err(CompareError::InvalidArgument(_))
  ));
  assert!(matches!(
    TimestepFilter::from_cli(None, &[1.0]),
    Err(CompareError::InvalidArgument(_))
  ));
  assert_eq!(parse_tolerance("1e-8").unwrap(), 1e-8);
  assert_eq!(parse_tolerance(" 0 ").unwrap(), 0.0);
  for bad in ["abc", "", "-1e-8", "NaN"] {
    assert!(matches!(
      parse_tolerance(bad),
      Err(CompareError::InvalidArgument(_))
    ));
  }
  assert_eq!(check_tolerance(0.0).unwrap(), 0.0);
  assert!(check_tolerance(f64::NAN).is_err());
  assert!(check_tolerance(-0.5).is_err());
}

#[test]
fn test_timestep_selection() {
  let tmp = TempDir::new().unwrap();
  let pvd = RunBuilder::new(tmp.path(), "a").write();
  let idx = CollectionIndex::open(&pvd).unwrap();
  let all = select_timesteps(&idx, &TimestepFilter::all()).unwrap();
  assert_eq!(all.len(), 3);
  let two = TimestepFilter::new(vec![100.0, 35.0]);
  let sel = select_timesteps(&idx, &two).unwrap();
  assert_eq!(sel, vec!["a-files/step-1.pvtu", "a-files/step-2.pvtu"]);
  assert!(idx.resolve(&sel[0]).is_file());
  let three = TimestepFilter::new(vec![35.0, 100.0, 50.0]);
  assert!(matches!(
    select_timesteps(&idx, &three),
    Err(CompareError::CountMismatch { requested: 3, found: 2, .. })
  ));
}

#[test]
fn test_malformed_collection() {
  let bad_ts = "<VTKFile><Collection>\
    <DataSet timestep=\"ten\" file=\"x.pvtu\"/></Collection></VTKFile>";
  let idx = CollectionIndex::from_source("x.pvd", bad_ts.to_string()).unwrap();
  assert!(matches!(idx.entries(), Err(CompareError::MalformedIndex(..))));
  let no_file = "<VTKFile><Collection>\n\
    <DataSet timestep=\"1\"/></Collection></VTKFile>";
  let idx = CollectionIndex::from_source("x.pvd", no_file.to_string()).unwrap();
  assert!(matches!(
    idx.entries(),
    Err(CompareError::MalformedIndex(_, msg)) if msg.contains("line 2")
  ));
  assert!(matches!(
    CollectionIndex::from_source("x.pvd", "<a>".to_string()),
    Err(CompareError::Xml(..))
  ));
  assert!(matches!(
    CollectionIndex::open("/definitely/not/here.pvd"),
    Err(CompareError::InvalidArgument(_))
  ));
}

#[test]
fn test_collection_structure() {
  let tmp = TempDir::new().unwrap();
  let a = RunBuilder::new(tmp.path(), "a").write();
  let b = RunBuilder::new(tmp.path(), "b").write();
  let idx_a = CollectionIndex::open(&a).unwrap();
  let idx_b = CollectionIndex::open(&b).unwrap();
  compare_collections(&idx_a, &idx_b).unwrap();
  assert_eq!(idx_a.stripped().unwrap(), idx_b.stripped().unwrap());
  // different number of datasets
  let mut short = RunBuilder::new(tmp.path(), "c");
  short.times = vec![10.0, 35.0];
  let idx_c = CollectionIndex::open(short.write()).unwrap();
  assert!(matches!(
    compare_collections(&idx_a, &idx_c),
    Err(CompareError::StructuralMismatch(StructuralMismatch::DataSetCount {
      collection: 0,
      computed: 3,
      reference: 2
    }))
  ));
  // same count, different timesteps
  let mut shifted = RunBuilder::new(tmp.path(), "d");
  shifted.times = vec![10.0, 35.0, 101.0];
  let idx_d = CollectionIndex::open(shifted.write()).unwrap();
  assert!(matches!(
    compare_collections(&idx_a, &idx_d),
    Err(CompareError::StructuralMismatch(
      StructuralMismatch::CollectionXml { .. }
    ))
  ));
  // different number of collections
  let two = "<VTKFile type=\"Collection\"><Collection/><Collection/></VTKFile>";
  let idx_two = CollectionIndex::from_source("e.pvd", two.to_string()).unwrap();
  assert!(matches!(
    compare_collections(&idx_a, &idx_two),
    Err(CompareError::StructuralMismatch(
      StructuralMismatch::CollectionCount { computed: 1, reference: 2 }
    ))
  ));
}

#[test]
fn test_partition_indices() {
  let tmp = TempDir::new().unwrap();
  let mut one = RunBuilder::new(tmp.path(), "a");
  one.times = vec![1.0];
  one.write();
  let mut two = RunBuilder::new(tmp.path(), "b");
  two.times = vec![1.0];
  two.pieces = 2;
  two.write();
  let pa = tmp.path().join("a/a-files/step-0.pvtu");
  let pb = tmp.path().join("b/b-files/step-0.pvtu");
  // piece counts may differ
  compare_partition_indices(&pa, &pb).unwrap();
  let idx = PartitionIndex::open(&pb).unwrap();
  assert_eq!(
    idx.piece_links().unwrap(),
    vec!["0/piece-0.vtu", "0/piece-1.vtu"]
  );
  assert_eq!(idx.piece_sources().unwrap().len(), 2);
  // but declared arrays may not
  let pc = tmp.path().join("c.pvtu");
  fs::write(&pc, fs::read_to_string(&pa).unwrap().replace("stress", "strain"))
    .unwrap();
  assert!(matches!(
    compare_partition_indices(&pa, &pc),
    Err(CompareError::StructuralMismatch(
      StructuralMismatch::PartitionXml { .. }
    ))
  ));
  // missing partition index or piece
  assert!(matches!(
    compare_partition_indices(&pa, &tmp.path().join("nope.pvtu")),
    Err(CompareError::MissingFile(_))
  ));
  fs::remove_file(tmp.path().join("b/b-files/0/piece-1.vtu")).unwrap();
  assert!(matches!(
    PartitionIndex::open(&pb).unwrap().piece_sources(),
    Err(CompareError::MissingFile(p)) if p.ends_with("piece-1.vtu")
  ));
}

fn quad(x: f64, disp: f64) -> UnstructuredGridPiece {
  return UnstructuredGridPiece {
    points: IOBuffer::F64(vec![
      x, 0.0, 0.0,
      x + 1.0, 0.0, 0.0,
      x + 1.0, 1.0, 0.0,
      x, 1.0, 0.0
    ]),
    cells: Cells {
      cell_verts: VertexNumbers::XML {
        connectivity: vec![0, 1, 2, 3],
        offsets: vec![4]
      },
      types: vec![CellType::Quad]
    },
    data: Attributes {
      point: vec![Attribute::DataArray(DataArray {
        name: "displacement".to_string(),
        elem: ElementType::Generic(1),
        data: IOBuffer::F32(vec![disp as f32; 4])
      })],
      cell: Vec::new()
    }
  };
}

#[test]
fn test_append_pieces() {
  let mut grid = MergedGrid::default();
  grid.append_piece(quad(0.0, 1.0)).unwrap();
  grid.append_piece(quad(1.0, 2.0)).unwrap();
  assert_eq!(grid.pieces, 2);
  assert_eq!(grid.num_points(), 8);
  assert_eq!(grid.num_cells(), 2);
  assert_eq!(grid.connectivity, vec![0, 1, 2, 3, 4, 5, 6, 7]);
  assert_eq!(grid.offsets, vec![4, 8]);
  assert_eq!(grid.cell_types, vec![9, 9]);
  assert_eq!(grid.point_data.len(), 1);
  assert_eq!(
    grid.point_data[0].values,
    vec![1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 2.0]
  );
  // a later piece must carry the same arrays
  let mut bare = quad(2.0, 0.0);
  bare.data.point.clear();
  assert!(grid.append_piece(bare).is_err());
  // and no more of them
  let mut extra = quad(2.0, 0.0);
  extra.data.point.push(Attribute::DataArray(DataArray {
    name: "temperature".to_string(),
    elem: ElementType::Generic(1),
    data: IOBuffer::F64(vec![0.0; 4])
  }));
  let err = grid.append_piece(extra).unwrap_err();
  assert!(err.contains("temperature"));
  assert_eq!(grid.pieces, 2);
}

#[test]
fn test_legacy_cells() {
  let mut piece = quad(0.0, 0.0);
  piece.cells.cell_verts = VertexNumbers::Legacy {
    num_cells: 1,
    vertices: vec![4, 0, 1, 2, 3]
  };
  let mut grid = MergedGrid::default();
  grid.append_piece(piece).unwrap();
  assert_eq!(grid.connectivity, vec![0, 1, 2, 3]);
  assert_eq!(grid.offsets, vec![4]);
}

fn small_grid(values: Vec<f64>) -> MergedGrid {
  return MergedGrid {
    points: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0],
    connectivity: vec![0, 1],
    offsets: vec![2],
    cell_types: vec![3],
    point_data: vec![NamedArray::new("u", values)],
    cell_data: vec![NamedArray::new("s", vec![1.0])],
    pieces: 1
  };
}

#[test]
fn test_criteria() {
  let c = Criteria::absolute(1e-8);
  assert_eq!(c.check(1.0, 1.0 + 1e-9), None);
  assert!(matches!(
    c.check(1.0, 1.0 + 1e-6),
    Some(FlagReason::Difference { .. })
  ));
  assert_eq!(c.check(f64::NAN, 1.0), Some(FlagReason::NaN));
  assert_eq!(c.check(f64::NAN, f64::NAN), Some(FlagReason::NaN));
  assert_eq!(c.check(f64::INFINITY, f64::INFINITY), None);
  assert!(Criteria::absolute(0.0).check(1.0, 1.0).is_none());
}

#[test]
fn test_grid_comparison() {
  let a = small_grid(vec![1.0, 2.0]);
  compare_grids(&a, &a.clone(), 0.0, 0).unwrap();
  let b = small_grid(vec![1.0, 2.5]);
  compare_grids(&a, &b, 1.0, 0).unwrap();
  match compare_grids(&a, &b, 0.1, 0) {
    Err(GridMismatch::Flagged { total, shown }) => {
      assert_eq!(total, 1);
      assert_eq!(shown[0].location, DataLocation::PointData("u".to_string()));
      assert_eq!(shown[0].index, 1);
    },
    other => panic!("unexpected {:?}", other)
  }
  // flag limit
  let c = small_grid(vec![5.0, 5.0]);
  assert!(matches!(
    compare_grids(&a, &c, 0.1, 1),
    Err(GridMismatch::Flagged { total: 2, shown }) if shown.len() == 1
  ));
  // incompatibilities
  let mut d = a.clone();
  d.point_data[0].name = "v".to_string();
  assert!(matches!(
    compare_grids(&a, &d, 1.0, 0),
    Err(GridMismatch::Incompatible(GridCompatibility::DifferentArrays { .. }))
  ));
  let mut e = a.clone();
  e.connectivity = vec![1, 0];
  assert_eq!(
    GridCompatibility::from((&a, &e)),
    GridCompatibility::DifferentConnectivity
  );
  let mut f = a.clone();
  f.points.truncate(3);
  assert_eq!(
    GridCompatibility::from((&a, &f)),
    GridCompatibility::DifferentPointCount(2, 1)
  );
}

#[test]
fn test_identical_runs_match() {
  let tmp = TempDir::new().unwrap();
  let a = RunBuilder::new(tmp.path(), "computed").write();
  let b = RunBuilder::new(tmp.path(), "reference").write();
  let report = compare_runs(&a, &b, &TimestepFilter::all(), &settings(0.0))
    .unwrap();
  assert_eq!(report.timesteps.len(), 3);
  assert_eq!(report.timesteps[0].points, 4);
  assert_eq!(report.timesteps[0].cells, 1);
  let filter = TimestepFilter::new(vec![35.0, 100.0]);
  let report = compare_runs(&a, &b, &filter, &settings(1e-8)).unwrap();
  assert_eq!(report.timesteps.len(), 2);
  assert!(report.timesteps[0].computed.ends_with("step-1.pvtu"));
  let every = TimestepFilter::new(vec![10.0, 35.0, 100.0]);
  let report = compare_runs(&a, &b, &every, &settings(0.0)).unwrap();
  assert_eq!(report.timesteps.len(), 3);
  assert!(report.timesteps[2].reference.ends_with("step-2.pvtu"));
  assert!(runs_match(&a, &b, &every, &settings(1e-8)));
  assert!(runs_match(&a, &b, &TimestepFilter::all(), &settings(1.0)));
}

#[test]
fn test_multi_piece_runs_match() {
  let tmp = TempDir::new().unwrap();
  let mut a = RunBuilder::new(tmp.path(), "a");
  a.pieces = 3;
  let mut b = RunBuilder::new(tmp.path(), "b");
  b.pieces = 3;
  let report = compare_runs(
    &a.write(),
    &b.write(),
    &TimestepFilter::new(vec![10.0]),
    &settings(0.0)
  ).unwrap();
  assert_eq!(report.timesteps[0].pieces_computed, 3);
  assert_eq!(report.timesteps[0].points, 12);
}

#[test]
fn test_numeric_mismatch() {
  let tmp = TempDir::new().unwrap();
  let a = RunBuilder::new(tmp.path(), "a").write();
  let mut b = RunBuilder::new(tmp.path(), "b");
  b.shift = 1e-6;
  let b = b.write();
  let all = TimestepFilter::all();
  compare_runs(&a, &b, &all, &settings(1e-5)).unwrap();
  let err = compare_runs(&a, &b, &all, &settings(1e-8)).unwrap_err();
  match err {
    CompareError::NumericMismatch { computed, mismatch, .. } => {
      assert!(computed.ends_with("step-0.pvtu"));
      assert!(matches!(mismatch, GridMismatch::Flagged { total: 5, .. }));
    },
    other => panic!("unexpected {}", other)
  }
  assert!(!runs_match(&a, &b, &all, &settings(1e-8)));
}

#[test]
fn test_missing_piece_reported_before_numbers() {
  let tmp = TempDir::new().unwrap();
  let a = RunBuilder::new(tmp.path(), "a").write();
  let mut b = RunBuilder::new(tmp.path(), "b");
  b.shift = 1.0;
  let b = b.write();
  let all = TimestepFilter::all();
  assert!(matches!(
    compare_runs(&a, &b, &all, &settings(1e-8)),
    Err(CompareError::NumericMismatch { .. })
  ));
  // the first timestep differs, but the last one can't even be read
  fs::remove_file(tmp.path().join("b/b-files/2/piece-0.vtu")).unwrap();
  assert!(matches!(
    compare_runs(&a, &b, &all, &settings(1e-8)),
    Err(CompareError::MissingFile(p)) if p.ends_with("2/piece-0.vtu")
  ));
}

#[test]
fn test_bad_tolerance_rejected() {
  let tmp = TempDir::new().unwrap();
  let a = RunBuilder::new(tmp.path(), "a").write();
  let mut b = RunBuilder::new(tmp.path(), "b");
  b.shift = 1000.0;
  let b = b.write();
  let all = TimestepFilter::all();
  for tol in [f64::NAN, -1.0] {
    assert!(matches!(
      compare_runs(&a, &b, &all, &settings(tol)),
      Err(CompareError::InvalidArgument(_))
    ));
    assert!(!runs_match(&a, &b, &all, &settings(tol)));
  }
}

#[test]
fn test_structure_checked_before_data() {
  let tmp = TempDir::new().unwrap();
  let a = RunBuilder::new(tmp.path(), "a").write();
  let mut short = RunBuilder::new(tmp.path(), "b");
  short.times = vec![10.0, 35.0];
  let b = short.write();
  // no data files at all: only the indices can be looked at
  fs::remove_dir_all(tmp.path().join("b/b-files")).unwrap();
  let all = TimestepFilter::all();
  assert!(matches!(
    compare_runs(&a, &b, &all, &settings(1.0)),
    Err(CompareError::StructuralMismatch(_))
  ));
}

#[test]
fn test_unmatched_timestep() {
  let tmp = TempDir::new().unwrap();
  let a = RunBuilder::new(tmp.path(), "a").write();
  let b = RunBuilder::new(tmp.path(), "b").write();
  fs::remove_dir_all(tmp.path().join("a/a-files")).unwrap();
  fs::remove_dir_all(tmp.path().join("b/b-files")).unwrap();
  let filter = TimestepFilter::new(vec![35.0, 100.0, 50.0]);
  assert!(matches!(
    compare_runs(&a, &b, &filter, &settings(1.0)),
    Err(CompareError::CountMismatch { requested: 3, found: 2, .. })
  ));
}

#[test]
fn test_missing_files() {
  let tmp = TempDir::new().unwrap();
  let a = RunBuilder::new(tmp.path(), "a").write();
  let b = RunBuilder::new(tmp.path(), "b").write();
  let all = TimestepFilter::all();
  assert!(matches!(
    compare_runs(&a, &tmp.path().join("nope.pvd"), &all, &settings(1.0)),
    Err(CompareError::InvalidArgument(_))
  ));
  fs::remove_file(tmp.path().join("b/b-files/1/piece-0.vtu")).unwrap();
  assert!(matches!(
    compare_runs(&a, &b, &all, &settings(1.0)),
    Err(CompareError::MissingFile(p)) if p.ends_with("1/piece-0.vtu")
  ));
  fs::remove_file(tmp.path().join("b/b-files/step-2.pvtu")).unwrap();
  assert!(matches!(
    compare_runs(&a, &b, &all, &settings(1.0)),
    Err(CompareError::MissingFile(p)) if p.ends_with("step-2.pvtu")
  ));
}

#[test]
fn test_unsupported_type() {
  assert_eq!(
    DistributedReader::for_kind(DataObjectKind::UnstructuredGrid).unwrap(),
    DistributedReader::UnstructuredGrid
  );
  assert!(matches!(
    DistributedReader::for_kind(DataObjectKind::PolyData),
    Err(CompareError::UnsupportedType(DataObjectKind::PolyData))
  ));
  let tmp = TempDir::new().unwrap();
  let vtp = tmp.path().join("piece.vtp");
  fs::write(&vtp, "<?xml version=\"1.0\"?>\n\
    <VTKFile type=\"PolyData\" version=\"0.1\" byte_order=\"LittleEndian\">\n\
    <PolyData>\n\
    <Piece NumberOfPoints=\"1\" NumberOfVerts=\"0\" NumberOfLines=\"0\" \
    NumberOfStrips=\"0\" NumberOfPolys=\"0\">\n\
    <Points>\n\
    <DataArray type=\"Float64\" NumberOfComponents=\"3\" \
    format=\"ascii\">0 0 0</DataArray>\n\
    </Points>\n\
    </Piece>\n\
    </PolyData>\n\
    </VTKFile>\n").unwrap();
  let pvtu = tmp.path().join("step.pvtu");
  fs::write(&pvtu, "<VTKFile type=\"PPolyData\"><PPolyData>\
    <Piece Source=\"piece.vtp\"/></PPolyData></VTKFile>").unwrap();
  assert_eq!(probe_kind(&vtp).unwrap(), DataObjectKind::PolyData);
  assert!(matches!(
    merge_partitions(&pvtu),
    Err(CompareError::UnsupportedType(DataObjectKind::PolyData))
  ));
}
