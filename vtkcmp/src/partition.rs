//! This module handles partition indices (`.pvtu` files): the per-timestep XML
//! manifest listing one `Piece` per compute partition, each pointing to a raw
//! data file, alongside the declarations of the arrays in those files.

use std::path::{Path, PathBuf};

use log::debug;
use roxmltree::{Document, Node};

use crate::error::{CompareError, StructuralMismatch};
use crate::xml::*;

/// Strips the `Piece` elements found under the children of the root element.
#[derive(Copy, Clone, Debug, Default)]
pub struct PieceLinks;

impl StripRule for PieceLinks {
  fn drop_element(&self, node: Node) -> bool {
    return is_piece(node);
  }

  fn drop_attribute(&self, _node: Node, _attribute: &str) -> bool {
    return false;
  }
}

/// Is this a `Piece` right under a child of the root element?
fn is_piece(node: Node) -> bool {
  return node.has_tag_name("Piece")
    && node.parent_element()
      .and_then(|p| p.parent_element())
      .is_some_and(|r| r.parent().is_some_and(|d| d.is_root()));
}

/// A partition index that has been read and checked for well-formedness.
#[derive(Clone, Debug)]
pub struct PartitionIndex {
  /// Where it was read from.
  path: PathBuf,
  /// The XML text.
  source: String
}

impl PartitionIndex {
  /// Opens a partition index. A path to nowhere is a missing file.
  pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CompareError> {
    let path = path.as_ref();
    if !path.is_file() {
      return Err(CompareError::MissingFile(path.to_path_buf()));
    }
    debug!("Reading partition index {}...", path.display());
    let source = read_xml(path)?;
    return Ok(Self { path: path.to_path_buf(), source });
  }

  /// The path this index was read from.
  pub fn path(&self) -> &Path {
    return &self.path;
  }

  /// The directory the piece sources are resolved against.
  pub fn dir(&self) -> &Path {
    return self.path.parent().unwrap_or(Path::new(""));
  }

  /// Parses the XML again.
  fn document(&self) -> Result<Document<'_>, CompareError> {
    return parse_xml(&self.path, &self.source);
  }

  /// The `Source` of every piece, relative to this index, in document order.
  pub fn piece_links(&self) -> Result<Vec<String>, CompareError> {
    let doc = self.document()?;
    let mut links = Vec::new();
    for child in doc.root_element().children().filter(|c| c.is_element()) {
      for piece in children_named(child, "Piece") {
        let src = piece.attribute("Source").ok_or_else(|| {
          CompareError::MalformedIndex(
            self.path.clone(),
            format!("Piece {} has no Source", links.len())
          )
        })?;
        links.push(src.to_string());
      }
    }
    return Ok(links);
  }

  /// Every piece file, resolved, after making sure each exists.
  pub fn piece_sources(&self) -> Result<Vec<PathBuf>, CompareError> {
    let mut sources = Vec::new();
    for link in self.piece_links()? {
      let p = self.dir().join(link);
      if !p.is_file() {
        return Err(CompareError::MissingFile(p));
      }
      sources.push(p);
    }
    return Ok(sources);
  }

  /// Serializes this index without its pieces.
  pub fn stripped(&self) -> Result<String, CompareError> {
    let doc = self.document()?;
    return Ok(serialize_stripped(doc.root_element(), &PieceLinks));
  }
}

/// Checks that two partition indices exist and are identical once their
/// pieces are gone. The number of pieces is allowed to differ.
pub fn compare_partition_indices(
  computed: &Path,
  reference: &Path
) -> Result<(), CompareError> {
  let comp = PartitionIndex::open(computed)?;
  let refr = PartitionIndex::open(reference)?;
  if comp.stripped()? != refr.stripped()? {
    return Err(StructuralMismatch::PartitionXml {
      computed: computed.to_path_buf(),
      reference: reference.to_path_buf()
    }.into());
  }
  return Ok(());
}
