//! Host collaborators
//!
//! The packager never reaches for global state: the current selection,
//! the open projects, the install location and the user notification
//! surface are all capabilities handed in by whatever hosts it. The CLI
//! uses the filesystem-backed implementations in [`workspace`].

pub mod workspace;

pub use workspace::{ExecutableLocation, WorkspaceHost};

use crate::error::HostError;
use std::path::{Path, PathBuf};

/// A project known to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRef {
    pub name: String,
    /// Path of the project definition file
    pub file_name: PathBuf,
}

impl ProjectRef {
    pub fn new(name: impl Into<String>, file_name: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            file_name: file_name.into(),
        }
    }

    /// Build a reference from a definition file, naming the project after the file stem
    pub fn from_file<P: AsRef<Path>>(file_name: P) -> Self {
        let file_name = file_name.as_ref();
        let name = file_name
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(name, file_name)
    }
}

/// An entry of the host's current selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectedItem {
    Project(ProjectRef),
    /// Anything that does not resolve to a project (a file, a folder, ...)
    Other { label: String },
}

impl SelectedItem {
    pub fn as_project(&self) -> Option<&ProjectRef> {
        match self {
            SelectedItem::Project(project) => Some(project),
            SelectedItem::Other { .. } => None,
        }
    }
}

/// A declared project property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
}

impl Property {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Read-only view of what the user has selected
pub trait SelectionProvider {
    fn selected_items(&self) -> Vec<SelectedItem>;
}

/// Read-only view of the open projects and their properties
pub trait ProjectModel {
    fn projects(&self) -> Vec<ProjectRef>;

    /// Properties in the order the host yields them
    fn properties(&self, project: &ProjectRef) -> Result<Vec<Property>, HostError>;
}

/// Where the packager itself (and therefore its scripts) is installed
pub trait InstallLocation {
    fn install_dir(&self) -> Result<PathBuf, HostError>;
}

/// Blocking acknowledgment shown to the user
pub trait Notifier {
    fn notify(&self, title: &str, message: &str);
}

impl<T: SelectionProvider + ?Sized> SelectionProvider for &T {
    fn selected_items(&self) -> Vec<SelectedItem> {
        (**self).selected_items()
    }
}

impl<T: ProjectModel + ?Sized> ProjectModel for &T {
    fn projects(&self) -> Vec<ProjectRef> {
        (**self).projects()
    }

    fn properties(&self, project: &ProjectRef) -> Result<Vec<Property>, HostError> {
        (**self).properties(project)
    }
}

impl<T: InstallLocation + ?Sized> InstallLocation for &T {
    fn install_dir(&self) -> Result<PathBuf, HostError> {
        (**self).install_dir()
    }
}

/// Install location pinned to a known directory
#[derive(Debug, Clone)]
pub struct FixedLocation(pub PathBuf);

impl InstallLocation for FixedLocation {
    fn install_dir(&self) -> Result<PathBuf, HostError> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_ref_from_file_uses_stem() {
        let project = ProjectRef::from_file("/repo/MyLib/MyLib.csproj");
        assert_eq!(project.name, "MyLib");
        assert_eq!(project.file_name, PathBuf::from("/repo/MyLib/MyLib.csproj"));
    }

    #[test]
    fn test_selected_item_as_project() {
        let item = SelectedItem::Other { label: "README.md".to_string() };
        assert!(item.as_project().is_none());

        let item = SelectedItem::Project(ProjectRef::from_file("/repo/A/A.csproj"));
        assert_eq!(item.as_project().map(|p| p.name.as_str()), Some("A"));
    }
}
