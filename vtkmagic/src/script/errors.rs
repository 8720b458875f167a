//! Contains error types for scripts and their runnings.

use std::error::Error;
use std::fmt::Display;
use std::io;
use std::path::PathBuf;

/// Errors when loading a script.
#[derive(Debug)]
pub(crate) enum ScriptError {
  /// The script file could not be read.
  Unreadable(PathBuf, io::Error),
  /// The script is not valid TOML, or doesn't fit the script format.
  BadToml(toml::de::Error),
  /// Two comparisons share a name.
  DuplicateName(String),
  /// A comparison has a tolerance that's negative or NaN.
  BadTolerance(String, f64),
  /// A comparison was requested but isn't in the script.
  ComparisonNotFound(String)
}

impl Display for ScriptError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return match self {
      Self::Unreadable(p, e) => {
        write!(f, "could not read script at {}: {}", p.display(), e)
      },
      Self::BadToml(e) => write!(f, "bad script: {}", e),
      Self::DuplicateName(n) => write!(f, "comparison \"{}\" defined twice", n),
      Self::BadTolerance(n, t) => {
        write!(f, "comparison \"{}\" has a bad tolerance: {}", n, t)
      },
      Self::ComparisonNotFound(n) => {
        write!(f, "no comparison named \"{}\" in script", n)
      }
    };
  }
}

impl Error for ScriptError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    return match self {
      Self::Unreadable(_, e) => Some(e),
      Self::BadToml(e) => Some(e),
      _ => None
    };
  }
}

impl From<toml::de::Error> for ScriptError {
  fn from(value: toml::de::Error) -> Self {
    return Self::BadToml(value);
  }
}
