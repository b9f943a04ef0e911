//! Project references accepted by the crew service.
//!
//! Callers may hand over a full [`Project`], a bare path, or a bare string.
//! The path decides where crew files live; the key decides which cache entry
//! is used (path, else name, else the raw string).

use std::path::{Path, PathBuf};

/// Subdirectory (under the project root) holding materialized crew members.
pub const CREW_MEMBERS_DIR: [&str; 2] = ["agent", "crew_members"];

/// Legacy subdirectory still read for backward compatibility.
pub const LEGACY_SUB_AGENTS_DIR: [&str; 2] = ["agent", "sub_agents"];

/// Anything the crew service can resolve to a project.
pub trait ProjectLocator {
    /// Filesystem root of the project, if known.
    fn project_path(&self) -> Option<PathBuf>;

    /// Logical project name, if known.
    fn project_name(&self) -> Option<String> {
        None
    }

    /// Workspace handle passed through to loaded members.
    fn workspace(&self) -> Option<PathBuf> {
        None
    }

    /// Cache key: path, else name.
    fn project_key(&self) -> Option<String> {
        self.project_path()
            .map(|p| p.to_string_lossy().into_owned())
            .or_else(|| self.project_name())
    }
}

/// A project as seen by the application shell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Project {
    pub name: Option<String>,
    pub path: Option<PathBuf>,
    pub workspace: Option<PathBuf>,
}

impl Project {
    /// Project rooted at `path`.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Project known only by name (cannot be materialized).
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Builder: set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder: set the workspace.
    pub fn with_workspace(mut self, workspace: impl Into<PathBuf>) -> Self {
        self.workspace = Some(workspace.into());
        self
    }
}

impl ProjectLocator for Project {
    fn project_path(&self) -> Option<PathBuf> {
        self.path.clone()
    }

    fn project_name(&self) -> Option<String> {
        self.name.clone()
    }

    fn workspace(&self) -> Option<PathBuf> {
        self.workspace.clone()
    }
}

impl ProjectLocator for Path {
    fn project_path(&self) -> Option<PathBuf> {
        Some(self.to_path_buf())
    }
}

impl ProjectLocator for PathBuf {
    fn project_path(&self) -> Option<PathBuf> {
        Some(self.clone())
    }
}

impl ProjectLocator for str {
    fn project_path(&self) -> Option<PathBuf> {
        (!self.is_empty()).then(|| PathBuf::from(self))
    }

    fn project_key(&self) -> Option<String> {
        (!self.is_empty()).then(|| self.to_string())
    }
}

impl ProjectLocator for String {
    fn project_path(&self) -> Option<PathBuf> {
        self.as_str().project_path()
    }

    fn project_key(&self) -> Option<String> {
        self.as_str().project_key()
    }
}

impl<T: ProjectLocator + ?Sized> ProjectLocator for &T {
    fn project_path(&self) -> Option<PathBuf> {
        (**self).project_path()
    }

    fn project_name(&self) -> Option<String> {
        (**self).project_name()
    }

    fn workspace(&self) -> Option<PathBuf> {
        (**self).workspace()
    }

    fn project_key(&self) -> Option<String> {
        (**self).project_key()
    }
}

/// `<project>/agent/crew_members`
pub fn crew_members_dir(project_path: &Path) -> PathBuf {
    CREW_MEMBERS_DIR
        .iter()
        .fold(project_path.to_path_buf(), |acc, part| acc.join(part))
}

/// `<project>/agent/sub_agents`
pub fn legacy_sub_agents_dir(project_path: &Path) -> PathBuf {
    LEGACY_SUB_AGENTS_DIR
        .iter()
        .fold(project_path.to_path_buf(), |acc, part| acc.join(part))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_prefers_path() {
        let project = Project::at("/work/film").with_name("Film");
        assert_eq!(project.project_key().as_deref(), Some("/work/film"));
    }

    #[test]
    fn test_key_falls_back_to_name() {
        let project = Project::named("Film");
        assert!(project.project_path().is_none());
        assert_eq!(project.project_key().as_deref(), Some("Film"));
    }

    #[test]
    fn test_unresolvable() {
        let project = Project::default();
        assert!(project.project_key().is_none());
        assert!("".project_path().is_none());
    }

    #[test]
    fn test_raw_string() {
        assert_eq!("/a/b".project_key().as_deref(), Some("/a/b"));
        assert_eq!("/a/b".project_path(), Some(PathBuf::from("/a/b")));
    }

    #[test]
    fn test_dirs() {
        let root = Path::new("/p");
        assert_eq!(crew_members_dir(root), PathBuf::from("/p/agent/crew_members"));
        assert_eq!(legacy_sub_agents_dir(root), PathBuf::from("/p/agent/sub_agents"));
    }
}
