//! Contains the error types for comparisons. Every check raises on the first
//! violation it finds, so a single error always describes a single problem.

use std::error::Error;
use std::fmt::Display;
use std::io;
use std::path::PathBuf;

use crate::compare::GridMismatch;
use crate::merge::DataObjectKind;

/// The ways two index files can disagree structurally.
#[derive(Clone, Debug, PartialEq)]
pub enum StructuralMismatch {
  /// The collection indices don't have the same number of `Collection`s.
  CollectionCount {
    /// Number of collections in the computed index.
    computed: usize,
    /// Number of collections in the reference index.
    reference: usize
  },
  /// A pair of collections doesn't have the same number of `DataSet`s.
  DataSetCount {
    /// Zero-based position of the collection in the files.
    collection: usize,
    /// Number of datasets in the computed collection.
    computed: usize,
    /// Number of datasets in the reference collection.
    reference: usize
  },
  /// The collection indices differ after stripping the file links. Holds
  /// both stripped serializations.
  CollectionXml {
    /// Stripped serialization of the computed index.
    computed: String,
    /// Stripped serialization of the reference index.
    reference: String
  },
  /// Two partition indices differ after stripping their pieces.
  PartitionXml {
    /// Path to the computed partition index.
    computed: PathBuf,
    /// Path to the reference partition index.
    reference: PathBuf
  },
  /// The runs yielded different numbers of timestep files.
  TimestepCount {
    /// Number of timestep files selected in the computed run.
    computed: usize,
    /// Number of timestep files selected in the reference run.
    reference: usize
  }
}

impl Display for StructuralMismatch {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return match self {
      Self::CollectionCount { computed, reference } => write!(
        f,
        "number of Collections in PVD file differ! {} != {}",
        computed,
        reference
      ),
      Self::DataSetCount { collection, computed, reference } => write!(
        f,
        "number of DataSets in Collection {} of PVD file differ! {} != {}",
        collection,
        computed,
        reference
      ),
      Self::CollectionXml { computed, reference } => write!(
        f,
        "XML structures in PVD files differ!\n\n{}\n\nvs.\n\n{}",
        computed,
        reference
      ),
      Self::PartitionXml { computed, reference } => write!(
        f,
        "XML structures in PVTU files {} and {} differ!",
        computed.display(),
        reference.display()
      ),
      Self::TimestepCount { computed, reference } => write!(
        f,
        "runs yielded different numbers of timestep files! {} != {}",
        computed,
        reference
      )
    };
  }
}

/// Everything that can stop a comparison.
#[derive(Debug)]
pub enum CompareError {
  /// Bad input from the caller: missing top-level files, bad tolerance,
  /// timestep count not matching the number of listed timesteps.
  InvalidArgument(String),
  /// The index files disagree structurally.
  StructuralMismatch(StructuralMismatch),
  /// A partition index or partition file referenced by an index is missing.
  MissingFile(PathBuf),
  /// The partitions contain a kind of data object we can't merge.
  UnsupportedType(DataObjectKind),
  /// The timestep filter didn't match exactly one entry per requested value.
  CountMismatch {
    /// The collection index the timesteps were selected from.
    index: PathBuf,
    /// Number of requested timesteps.
    requested: usize,
    /// Number of entries that matched.
    found: usize
  },
  /// The merged datasets for a timestep don't match numerically.
  NumericMismatch {
    /// The computed partition index.
    computed: PathBuf,
    /// The reference partition index.
    reference: PathBuf,
    /// What was wrong with the data.
    mismatch: GridMismatch
  },
  /// A file could not be read.
  Io(PathBuf, io::Error),
  /// A file was not well-formed XML.
  Xml(PathBuf, roxmltree::Error),
  /// An index file is well-formed but lacks something we need.
  MalformedIndex(PathBuf, String),
  /// The mesh reader rejected a partition file.
  Reader(PathBuf, String)
}

impl Display for CompareError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return match self {
      Self::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
      Self::StructuralMismatch(sm) => write!(f, "structural mismatch: {}", sm),
      Self::MissingFile(p) => write!(f, "missing file at {}", p.display()),
      Self::UnsupportedType(kind) => write!(
        f,
        "unknown VTK result type {}, known types: UnstructuredGrid",
        kind
      ),
      Self::CountMismatch { index, requested, found } => write!(
        f,
        "{} time step(s) given but {} file(s) found in {}! Check input or \
        adjust tolerance.",
        requested,
        found,
        index.display()
      ),
      Self::NumericMismatch { computed, reference, mismatch } => write!(
        f,
        "data in {} and {} differ: {}",
        computed.display(),
        reference.display(),
        mismatch
      ),
      Self::Io(p, e) => write!(f, "could not read {}: {}", p.display(), e),
      Self::Xml(p, e) => write!(f, "bad XML in {}: {}", p.display(), e),
      Self::MalformedIndex(p, msg) => write!(
        f,
        "malformed index file {}: {}",
        p.display(),
        msg
      ),
      Self::Reader(p, msg) => write!(
        f,
        "could not read VTK data from {}: {}",
        p.display(),
        msg
      )
    };
  }
}

impl Error for CompareError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    return match self {
      Self::Io(_, e) => Some(e),
      Self::Xml(_, e) => Some(e),
      _ => None
    };
  }
}

impl From<StructuralMismatch> for CompareError {
  fn from(value: StructuralMismatch) -> Self {
    return Self::StructuralMismatch(value);
  }
}
