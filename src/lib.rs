//! NuGet packager
//!
//! This crate drives external scripts that produce a NuGet manifest
//! (`.nuspec`) and package (`.nupkg`) for the selected project, streams
//! their output to a persistent output pane, and builds a read-only tree
//! of the project's declared properties.

pub mod error;
pub mod config;
pub mod host;
pub mod console;
pub mod process;
pub mod packaging;
pub mod tree;
pub mod cli;

// Re-export core types for convenience
pub use error::*;
pub use packaging::{PackagingAction, PackagingInvoker, ProjectContext, ProjectContextResolver};
