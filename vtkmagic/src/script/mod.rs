//! This module implements the data structures included in scripts.

pub(crate) mod comparison;
pub(crate) mod errors;

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use vtkcmp::filter::check_tolerance;

use crate::script::comparison::Comparison;
use crate::script::errors::ScriptError;

/// A vtkmagic script. Contains comparisons.
#[derive(Default, Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Script {
  /// The comparisons within this script.
  #[serde(alias = "comparison")]
  pub(crate) comparisons: Vec<Comparison>
}

impl Script {
  /// Parses a script from TOML text and checks it. Relative paths are made
  /// relative to `base`.
  pub(crate) fn parse(text: &str, base: &Path) -> Result<Self, ScriptError> {
    let script: Script = toml::from_str(text)?;
    let mut names: BTreeSet<&str> = BTreeSet::new();
    for c in script.comparisons.iter() {
      if !names.insert(c.name.as_str()) {
        return Err(ScriptError::DuplicateName(c.name.clone()));
      }
      let tol = c.settings.tolerance;
      if check_tolerance(tol).is_err() {
        return Err(ScriptError::BadTolerance(c.name.clone(), tol));
      }
    }
    return Ok(Self {
      comparisons: script.comparisons
        .into_iter()
        .map(|c| c.rebase(base))
        .collect()
    });
  }

  /// Reads a script from a file.
  pub(crate) fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScriptError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
      .map_err(|e| ScriptError::Unreadable(path.to_path_buf(), e))?;
    let base = path.parent().unwrap_or(Path::new(""));
    return Self::parse(&text, base);
  }

  /// Keeps only the named comparisons, in script order. An empty list keeps
  /// them all.
  pub(crate) fn only(self, names: &[String]) -> Result<Self, ScriptError> {
    if let Some(n) = names.iter()
      .find(|n| !self.comparisons.iter().any(|c| &c.name == *n)) {
      return Err(ScriptError::ComparisonNotFound(n.clone()));
    }
    if names.is_empty() {
      return Ok(self);
    }
    return Ok(Self {
      comparisons: self.comparisons
        .into_iter()
        .filter(|c| names.contains(&c.name))
        .collect()
    });
  }
}
