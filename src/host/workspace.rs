//! Filesystem-backed host used by the command-line front end

use super::{InstallLocation, ProjectModel, ProjectRef, Property, SelectedItem, SelectionProvider};
use crate::config::ProjectConfig;
use crate::error::HostError;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Host view over a directory tree
///
/// The selection is either an explicit path (a project file, or a
/// directory holding one) or the nearest project found by walking up
/// from the working directory.
#[derive(Debug, Clone)]
pub struct WorkspaceHost {
    project: ProjectConfig,
    working_dir: PathBuf,
    selection: Option<PathBuf>,
}

impl WorkspaceHost {
    pub fn new(project: ProjectConfig, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            project,
            working_dir: working_dir.into(),
            selection: None,
        }
    }

    /// Select an explicit path instead of discovering one
    pub fn with_selection(mut self, path: Option<PathBuf>) -> Self {
        self.selection = path;
        self
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }

    /// First project file directly inside a directory, by file name
    pub fn project_file_in(&self, dir: &Path) -> Option<PathBuf> {
        let entries = fs::read_dir(dir).ok()?;
        let mut candidates: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && self.project.is_project_file(path))
            .collect();
        candidates.sort();
        candidates.into_iter().next()
    }

    /// Find the nearest project file by walking up the directory tree
    pub fn find_project_file<P: AsRef<Path>>(&self, start_path: P) -> Option<PathBuf> {
        let mut current = self.absolute(start_path.as_ref());

        loop {
            if let Some(found) = self.project_file_in(&current) {
                return Some(found);
            }

            if let Some(parent) = current.parent() {
                current = parent.to_path_buf();
            } else {
                break;
            }
        }

        None
    }

    fn item_for(&self, path: &Path) -> SelectedItem {
        let path = self.absolute(path);

        if path.is_file() && self.project.is_project_file(&path) {
            return SelectedItem::Project(ProjectRef::from_file(path));
        }

        if path.is_dir() {
            if let Some(file) = self.project_file_in(&path) {
                return SelectedItem::Project(ProjectRef::from_file(file));
            }
        }

        SelectedItem::Other {
            label: path.display().to_string(),
        }
    }
}

impl SelectionProvider for WorkspaceHost {
    fn selected_items(&self) -> Vec<SelectedItem> {
        match &self.selection {
            Some(path) => vec![self.item_for(path)],
            None => self
                .find_project_file(&self.working_dir)
                .map(|file| vec![SelectedItem::Project(ProjectRef::from_file(file))])
                .unwrap_or_default(),
        }
    }
}

impl ProjectModel for WorkspaceHost {
    fn projects(&self) -> Vec<ProjectRef> {
        self.selected_items()
            .into_iter()
            .filter_map(|item| match item {
                SelectedItem::Project(project) => Some(project),
                SelectedItem::Other { .. } => None,
            })
            .collect()
    }

    fn properties(&self, project: &ProjectRef) -> Result<Vec<Property>, HostError> {
        let content = fs::read_to_string(&project.file_name).map_err(|e| HostError::ProjectUnreadable {
            path: project.file_name.clone(),
            reason: e.to_string(),
        })?;
        Ok(declared_properties(&content))
    }
}

fn comment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment pattern"))
}

fn group_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)<PropertyGroup\b[^>]*?(?:/>|>(.*?)</PropertyGroup\s*>)")
            .expect("valid property group pattern")
    })
}

fn element_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<([A-Za-z_][A-Za-z0-9_.\-]*)").expect("valid element pattern"))
}

/// Names of the elements declared inside every `<PropertyGroup>`, in document order
pub fn declared_properties(content: &str) -> Vec<Property> {
    let content = comment_pattern().replace_all(content, "");

    group_pattern()
        .captures_iter(&content)
        .filter_map(|group| group.get(1))
        .flat_map(|body| {
            element_pattern()
                .captures_iter(body.as_str())
                .map(|element| Property::new(&element[1]))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Install location of the running binary
#[derive(Debug, Clone, Default)]
pub struct ExecutableLocation;

impl InstallLocation for ExecutableLocation {
    fn install_dir(&self) -> Result<PathBuf, HostError> {
        let exe = std::env::current_exe().map_err(|e| HostError::Unavailable(e.to_string()))?;
        exe.parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| HostError::Unavailable(format!("{} has no parent directory", exe.display())))
    }
}
