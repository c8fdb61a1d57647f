//! Resolving where the scripts live and which project they act on

use crate::error::{ContextError, SelectionIssue};
use crate::host::{InstallLocation, SelectedItem, SelectionProvider};
use std::path::{Path, PathBuf};

/// Directories a packaging script runs against
///
/// Always built fresh from the host for each invocation and never
/// partially populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectContext {
    script_directory: PathBuf,
    project_directory: PathBuf,
}

impl ProjectContext {
    pub fn script_directory(&self) -> &Path {
        &self.script_directory
    }

    pub fn project_directory(&self) -> &Path {
        &self.project_directory
    }
}

/// Turns the host's selection and install location into a [`ProjectContext`]
pub struct ProjectContextResolver<S, L> {
    selection: S,
    location: L,
}

impl<S: SelectionProvider, L: InstallLocation> ProjectContextResolver<S, L> {
    pub fn new(selection: S, location: L) -> Self {
        Self { selection, location }
    }

    /// Directory holding the packager binary and its scripts
    pub fn resolve_script_directory(&self) -> Result<PathBuf, ContextError> {
        self.location
            .install_dir()
            .map_err(|e| ContextError::ScriptDirectory(e.to_string()))
    }

    /// Directory containing the definition file of the first selected project
    pub fn resolve_active_project_directory(&self) -> Result<PathBuf, ContextError> {
        let items = self.selection.selected_items();
        let first = items
            .first()
            .ok_or(ContextError::NoSelection(SelectionIssue::Empty))?;

        let project = match first {
            SelectedItem::Project(project) => project,
            SelectedItem::Other { label } => {
                return Err(ContextError::NoSelection(SelectionIssue::NotAProject {
                    label: label.clone(),
                }));
            }
        };

        if !project.file_name.is_absolute() {
            return Err(ContextError::InvalidProjectPath(project.file_name.clone()));
        }

        project
            .file_name
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .ok_or_else(|| ContextError::InvalidProjectPath(project.file_name.clone()))
    }

    /// Both directories, or the first failure
    pub fn resolve(&self) -> Result<ProjectContext, ContextError> {
        let script_directory = self.resolve_script_directory()?;
        let project_directory = self.resolve_active_project_directory()?;

        Ok(ProjectContext {
            script_directory,
            project_directory,
        })
    }
}
