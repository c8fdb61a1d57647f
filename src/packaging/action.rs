//! The packaging operations a user can trigger

use std::fmt;

/// One of the two artifact-producing operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackagingAction {
    /// Produce the `.nuspec` manifest
    BuildManifest,
    /// Produce the `.nupkg` archive
    BuildArchive,
}

impl PackagingAction {
    pub const ALL: [PackagingAction; 2] = [PackagingAction::BuildManifest, PackagingAction::BuildArchive];

    /// Script file name used when the configuration does not override it
    pub fn default_script(self) -> &'static str {
        match self {
            PackagingAction::BuildManifest => "CNuspec.bat",
            PackagingAction::BuildArchive => "CNupkg.bat",
        }
    }

    /// Written to the console once the context is resolved
    pub fn started_message(self) -> &'static str {
        match self {
            PackagingAction::BuildManifest => ".....CREATING NUSPEC FILE STARTED.....",
            PackagingAction::BuildArchive => ".....CREATING NUPKG FILE STARTED.....",
        }
    }

    /// Shown to the user when the script returns
    pub fn success_message(self) -> &'static str {
        match self {
            PackagingAction::BuildManifest => "Nuspec File Created Successfully.",
            PackagingAction::BuildArchive => "Nupkg File Created Successfully.",
        }
    }
}

impl fmt::Display for PackagingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackagingAction::BuildManifest => write!(f, "build manifest"),
            PackagingAction::BuildArchive => write!(f, "build archive"),
        }
    }
}
