//! This module implements the "strip-then-serialize" step used to diff index
//! files: the parts of the tree that are allowed to differ between runs (file
//! links, mostly) are left out, and whatever's left is written out in a
//! deterministic way so that two trees can be compared as plain strings.

use std::fs;
use std::path::Path;

use roxmltree::{Document, Node};

use crate::error::CompareError;

/// Decides which parts of a tree get left out of a serialization.
pub trait StripRule {
  /// Should this element (and everything under it) be left out?
  fn drop_element(&self, node: Node) -> bool;

  /// Should this attribute of this element be left out?
  fn drop_attribute(&self, node: Node, attribute: &str) -> bool;
}

/// A rule that keeps everything.
#[derive(Copy, Clone, Debug, Default)]
pub struct KeepAll;

impl StripRule for KeepAll {
  fn drop_element(&self, _node: Node) -> bool {
    return false;
  }

  fn drop_attribute(&self, _node: Node, _attribute: &str) -> bool {
    return false;
  }
}

/// Reads an XML file to a string, making sure it's well-formed.
pub(crate) fn read_xml(path: &Path) -> Result<String, CompareError> {
  let source = fs::read_to_string(path)
    .map_err(|e| CompareError::Io(path.to_path_buf(), e))?;
  parse_xml(path, &source)?;
  return Ok(source);
}

/// Parses XML text that came from a file, blaming that file for errors.
pub(crate) fn parse_xml<'a>(
  path: &Path,
  source: &'a str
) -> Result<Document<'a>, CompareError> {
  return Document::parse(source)
    .map_err(|e| CompareError::Xml(path.to_path_buf(), e));
}

/// Returns the element children of a node with a given tag name.
pub(crate) fn children_named<'a, 'input: 'a>(
  node: Node<'a, 'input>,
  name: &'a str
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
  return node.children()
    .filter(move |c| c.is_element() && c.tag_name().name() == name);
}

/// Serializes an element and its subtree, leaving out whatever the rule says.
///
/// Attributes come out in document order, text is re-escaped, and comments
/// and processing instructions are skipped. The text right after a dropped
/// element (its "tail") is dropped with it, so that trees with different
/// numbers of dropped siblings don't end up with different whitespace.
pub fn serialize_stripped(root: Node, rule: &impl StripRule) -> String {
  let mut out = String::new();
  if root.is_element() && !rule.drop_element(root) {
    write_element(&mut out, root, rule);
  }
  return out;
}

/// Writes one element into the output buffer.
fn write_element(out: &mut String, node: Node, rule: &impl StripRule) {
  let name = node.tag_name().name();
  out.push('<');
  out.push_str(name);
  for attr in node.attributes() {
    if rule.drop_attribute(node, attr.name()) {
      continue;
    }
    out.push(' ');
    out.push_str(attr.name());
    out.push_str("=\"");
    escape_into(out, attr.value(), true);
    out.push('"');
  }
  let mut body = String::new();
  let mut skip_tail = false;
  for child in node.children() {
    if child.is_element() {
      if rule.drop_element(child) {
        skip_tail = true;
        continue;
      }
      write_element(&mut body, child, rule);
      skip_tail = false;
    } else if child.is_text() && !skip_tail {
      escape_into(&mut body, child.text().unwrap_or_default(), false);
    }
  }
  if body.is_empty() {
    out.push_str(" />");
  } else {
    out.push('>');
    out.push_str(&body);
    out.push_str("</");
    out.push_str(name);
    out.push('>');
  }
}

/// Escapes text or attribute values.
fn escape_into(out: &mut String, text: &str, attribute: bool) {
  for c in text.chars() {
    match (c, attribute) {
      ('&', _) => out.push_str("&amp;"),
      ('<', _) => out.push_str("&lt;"),
      ('>', _) => out.push_str("&gt;"),
      ('"', true) => out.push_str("&quot;"),
      ('\n', true) => out.push_str("&#10;"),
      ('\t', true) => out.push_str("&#09;"),
      _ => out.push(c)
    }
  }
}
