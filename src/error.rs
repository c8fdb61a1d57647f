//! Error types for the packager
//!
//! Defines the error taxonomy shared by context resolution, subprocess
//! launching, the console channel and the host collaborators.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for all packager errors
#[derive(Debug, Error)]
pub enum PackagerError {
    #[error("Packaging error: {0}")]
    Packaging(#[from] PackagingError),

    #[error("Context error: {0}")]
    Context(#[from] ContextError),

    #[error("Console error: {0}")]
    Console(#[from] ConsoleError),

    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("CLI error: {0}")]
    Cli(String),
}

/// Why the active selection could not be used as a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionIssue {
    /// Nothing is selected
    Empty,
    /// The first selected item is not a project
    NotAProject { label: String },
}

impl fmt::Display for SelectionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionIssue::Empty => write!(f, "nothing is selected"),
            SelectionIssue::NotAProject { label } => {
                write!(f, "selected item '{}' is not a project", label)
            }
        }
    }
}

/// Failures while resolving the script and project directories
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("No project selected: {0}")]
    NoSelection(SelectionIssue),

    #[error("Project file path has no containing directory: {0}")]
    InvalidProjectPath(PathBuf),

    #[error("Script directory unavailable: {0}")]
    ScriptDirectory(String),
}

impl ContextError {
    pub fn is_no_selection(&self) -> bool {
        matches!(self, ContextError::NoSelection(_))
    }
}

/// The external script could not be started
#[derive(Debug, Error)]
#[error("Failed to launch {}: {source}", program.display())]
pub struct LaunchError {
    pub program: PathBuf,
    #[source]
    pub source: io::Error,
}

impl LaunchError {
    pub fn new(program: impl Into<PathBuf>, source: io::Error) -> Self {
        Self {
            program: program.into(),
            source,
        }
    }

    /// True when the executable does not exist
    pub fn is_not_found(&self) -> bool {
        self.source.kind() == io::ErrorKind::NotFound
    }
}

/// Console channel failures
#[derive(Debug, Clone, Error)]
pub enum ConsoleError {
    #[error("Cannot create output pane '{name}': {reason}")]
    ChannelCreation { name: String, reason: String },

    #[error("Cannot write to output pane: {reason}")]
    Write { reason: String },
}

/// Failures reported by host collaborators
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Cannot read project file {path}: {reason}")]
    ProjectUnreadable { path: PathBuf, reason: String },

    #[error("Host service unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by a packaging action
#[derive(Debug, Error)]
pub enum PackagingError {
    #[error("Project context unavailable: {0}")]
    ContextUnavailable(#[from] ContextError),

    #[error(transparent)]
    Launch(#[from] LaunchError),
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration not found: {0}")]
    NotFound(PathBuf),

    #[error("Cannot read configuration {path}: {reason}")]
    Io { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type alias for packager operations
pub type PackagerResult<T> = Result<T, PackagerError>;
