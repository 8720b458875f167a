//! This module handles collection indices (`.pvd` files): the top-level XML
//! manifest that maps each timestep to a partition index file.

use std::path::{Path, PathBuf};

use log::debug;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use crate::error::{CompareError, StructuralMismatch};
use crate::filter::TimestepFilter;
use crate::xml::*;

/// Strips the `file` links off `Collection/DataSet` elements.
#[derive(Copy, Clone, Debug, Default)]
pub struct CollectionLinks;

impl StripRule for CollectionLinks {
  fn drop_element(&self, _node: Node) -> bool {
    return false;
  }

  fn drop_attribute(&self, node: Node, attribute: &str) -> bool {
    return attribute == "file" && is_dataset(node);
  }
}

/// Is this a `DataSet` in a `Collection` right under the root element?
fn is_dataset(node: Node) -> bool {
  let collection = match node.parent_element() {
    Some(p) if node.has_tag_name("DataSet") => p,
    _ => return false
  };
  return collection.has_tag_name("Collection")
    && collection.parent_element()
      .is_some_and(|r| r.parent().is_some_and(|d| d.is_root()));
}

/// A single `DataSet` entry in a collection index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimestepEntry {
  /// The timestep attribute.
  pub timestep: f64,
  /// The partition index path, relative to the collection index.
  pub file: String
}

/// A collection index that has been read and checked for well-formedness.
#[derive(Clone, Debug)]
pub struct CollectionIndex {
  /// Where it was read from.
  path: PathBuf,
  /// The XML text.
  source: String
}

impl CollectionIndex {
  /// Opens a collection index. The path must point to an existing file.
  pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CompareError> {
    let path = path.as_ref();
    if !path.is_file() {
      return Err(CompareError::InvalidArgument(format!(
        "the .pvd path {} is not OK!",
        path.display()
      )));
    }
    debug!("Reading collection index {}...", path.display());
    let source = read_xml(path)?;
    return Ok(Self { path: path.to_path_buf(), source });
  }

  /// Builds a collection index from text, as if it had been read from a path.
  pub fn from_source<P: AsRef<Path>>(
    path: P,
    source: String
  ) -> Result<Self, CompareError> {
    let path = path.as_ref().to_path_buf();
    parse_xml(&path, &source)?;
    return Ok(Self { path, source });
  }

  /// The path this index was read from.
  pub fn path(&self) -> &Path {
    return &self.path;
  }

  /// The directory relative paths in this index are resolved against.
  pub fn dir(&self) -> &Path {
    return self.path.parent().unwrap_or(Path::new(""));
  }

  /// Resolves a path relative to this index.
  pub fn resolve(&self, relative: &str) -> PathBuf {
    return self.dir().join(relative);
  }

  /// Parses the XML again.
  fn document(&self) -> Result<Document<'_>, CompareError> {
    return parse_xml(&self.path, &self.source);
  }

  /// Number of `DataSet`s in each top-level `Collection`, in order.
  pub fn dataset_counts(&self) -> Result<Vec<usize>, CompareError> {
    let doc = self.document()?;
    return Ok(
      children_named(doc.root_element(), "Collection")
        .map(|c| children_named(c, "DataSet").count())
        .collect()
    );
  }

  /// All timestep entries in document order.
  pub fn entries(&self) -> Result<Vec<TimestepEntry>, CompareError> {
    let doc = self.document()?;
    let mut entries = Vec::new();
    for collection in children_named(doc.root_element(), "Collection") {
      for dataset in children_named(collection, "DataSet") {
        entries.push(self.entry(dataset)?);
      }
    }
    return Ok(entries);
  }

  /// Decodes a single `DataSet` element.
  fn entry(&self, dataset: Node) -> Result<TimestepEntry, CompareError> {
    let malformed = |msg: String| {
      CompareError::MalformedIndex(self.path.clone(), msg)
    };
    let pos = self.source[..dataset.range().start].matches('\n').count() + 1;
    let file = dataset.attribute("file").ok_or_else(|| {
      malformed(format!("DataSet on line {} has no file", pos))
    })?;
    let ts = dataset.attribute("timestep")
      .ok_or_else(|| {
        malformed(format!("DataSet on line {} has no timestep", pos))
      })?;
    let timestep = ts.trim().parse::<f64>().map_err(|_| {
      malformed(format!("bad timestep \"{}\" on line {}", ts, pos))
    })?;
    return Ok(TimestepEntry { timestep, file: file.to_string() });
  }

  /// Serializes this index without the file links.
  pub fn stripped(&self) -> Result<String, CompareError> {
    let doc = self.document()?;
    return Ok(serialize_stripped(doc.root_element(), &CollectionLinks));
  }
}

/// Checks that two collection indices have the same structure: same number of
/// collections, same number of datasets in each, and identical XML once the
/// file links are gone.
pub fn compare_collections(
  computed: &CollectionIndex,
  reference: &CollectionIndex
) -> Result<(), CompareError> {
  let counts_comp = computed.dataset_counts()?;
  let counts_ref = reference.dataset_counts()?;
  if counts_comp.len() != counts_ref.len() {
    return Err(StructuralMismatch::CollectionCount {
      computed: counts_comp.len(),
      reference: counts_ref.len()
    }.into());
  }
  let pairs = counts_comp.iter().zip(counts_ref.iter()).enumerate();
  for (collection, (&comp, &refr)) in pairs {
    if comp != refr {
      return Err(StructuralMismatch::DataSetCount {
        collection,
        computed: comp,
        reference: refr
      }.into());
    }
  }
  // every dataset must carry a file link before we can strip it
  computed.entries()?;
  reference.entries()?;
  let stripped_comp = computed.stripped()?;
  let stripped_ref = reference.stripped()?;
  if stripped_comp != stripped_ref {
    return Err(StructuralMismatch::CollectionXml {
      computed: stripped_comp,
      reference: stripped_ref
    }.into());
  }
  return Ok(());
}

/// Selects the partition index files, relative to the collection index, whose
/// timesteps pass the filter. Document order is kept. A non-empty filter must
/// match exactly as many entries as it has values.
pub fn select_timesteps(
  index: &CollectionIndex,
  filter: &TimestepFilter
) -> Result<Vec<String>, CompareError> {
  let selected: Vec<String> = index.entries()?
    .into_iter()
    .filter(|e| filter.accepts(e.timestep))
    .map(|e| e.file)
    .collect();
  if !filter.is_all() && selected.len() != filter.len() {
    return Err(CompareError::CountMismatch {
      index: index.path.clone(),
      requested: filter.len(),
      found: selected.len()
    });
  }
  debug!(
    "Selected {} timestep(s) from {}.",
    selected.len(),
    index.path.display()
  );
  return Ok(selected);
}
