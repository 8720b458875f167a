//! This library implements the checks needed to tell whether two runs of a
//! simulation produced the same VTK output: a `.pvd` collection index listing
//! timesteps, one `.pvtu` partition index per timestep, and one `.vtu` file
//! per compute partition.
//!
//! The index files are diffed structurally (with the file links stripped),
//! the partitions of each selected timestep are merged into a single grid,
//! and the merged grids are compared value-by-value within an absolute
//! tolerance. The `vtkdiff` and `vtkmagic` tools are built on top of it.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![allow(clippy::needless_return)]

pub mod collection;
pub mod compare;
pub mod driver;
pub mod error;
pub mod filter;
pub mod grid;
pub mod merge;
pub mod partition;
pub mod xml;

/// Re-exports everything a user of this library will usually need.
pub mod prelude {
  pub use crate::collection::*;
  pub use crate::compare::*;
  pub use crate::driver::*;
  pub use crate::error::*;
  pub use crate::filter::*;
  pub use crate::grid::*;
  pub use crate::merge::*;
  pub use crate::partition::*;
  pub use crate::xml::*;
}

#[cfg(test)]
mod tests;
