//! Materialized, project-local crew members.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_yaml::Mapping;

use crate::error::Result;
use crate::frontmatter::{self, Frontmatter};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f64 = 0.4;
pub const DEFAULT_MAX_STEPS: u32 = 5;
pub const DEFAULT_COLOR: &str = "#4a90e2";
pub const DEFAULT_ICON: &str = "🤖";

/// A crew member loaded from a project's configuration file.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectCrewMember {
    pub name: String,
    pub description: String,
    pub soul: Option<String>,
    pub crew_title: Option<String>,
    pub skills: Vec<String>,
    pub prompt: String,
    pub model: String,
    pub temperature: f64,
    pub max_steps: u32,
    pub color: String,
    pub icon: String,
    pub config_path: PathBuf,

    /// Full frontmatter, a superset of the typed fields above.
    pub metadata: Mapping,

    /// Opaque workspace handle from the owning project.
    pub workspace: Option<PathBuf>,
}

impl ProjectCrewMember {
    /// Read a member file.
    pub fn from_markdown(path: &Path) -> Result<Self> {
        let doc = frontmatter::read(path)?;
        Ok(Self::from_document(path, doc))
    }

    /// Build a member from a parsed document. Missing fields fall back to
    /// the filename stem and the application defaults.
    pub fn from_document(path: &Path, doc: Frontmatter) -> Self {
        let meta = &doc.metadata;
        let name = frontmatter::get_string(meta, "name")
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| file_stem(path));

        Self {
            name,
            description: frontmatter::get_string(meta, "description").unwrap_or_default(),
            soul: frontmatter::get_string(meta, "soul"),
            crew_title: frontmatter::get_string(meta, "crew_title"),
            skills: frontmatter::get_list(meta, "skills"),
            prompt: doc.prompt().to_string(),
            model: frontmatter::get_string(meta, "model").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: frontmatter::get_f64(meta, "temperature").unwrap_or(DEFAULT_TEMPERATURE),
            max_steps: frontmatter::get_u32(meta, "max_steps").unwrap_or(DEFAULT_MAX_STEPS),
            color: frontmatter::get_string(meta, "color").unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            icon: frontmatter::get_string(meta, "icon").unwrap_or_else(|| DEFAULT_ICON.to_string()),
            config_path: path.to_path_buf(),
            metadata: doc.metadata,
            workspace: None,
        }
    }

    /// Builder: attach the project's workspace.
    pub fn with_workspace(mut self, workspace: Option<PathBuf>) -> Self {
        self.workspace = workspace;
        self
    }

    /// Role used for importance ranking: declared crew title, else the
    /// config file's stem.
    pub fn role_id(&self) -> String {
        self.crew_title
            .clone()
            .unwrap_or_else(|| file_stem(&self.config_path))
    }

    /// Flat, serializable view for UI consumers.
    pub fn summary(&self) -> CrewMemberSummary {
        CrewMemberSummary {
            name: self.name.clone(),
            description: self.description.clone(),
            crew_title: self.role_id(),
            color: self.color.clone(),
            icon: self.icon.clone(),
            soul: self.soul.clone(),
            skills: self.skills.clone(),
            model: self.model.clone(),
            temperature: self.temperature,
            max_steps: self.max_steps,
            config_path: self.config_path.clone(),
        }
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Avatar/metadata view of a crew member.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrewMemberSummary {
    pub name: String,
    pub description: String,
    pub crew_title: String,
    pub color: String,
    pub icon: String,
    pub soul: Option<String>,
    pub skills: Vec<String>,
    pub model: String,
    pub temperature: f64,
    pub max_steps: u32,
    pub config_path: PathBuf,
}

/// Crew members of one project, keyed by name, in load order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrewRoster {
    members: Vec<ProjectCrewMember>,
}

impl CrewRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a member. An existing member with the same name is replaced
    /// in place, keeping its position.
    pub fn insert(&mut self, member: ProjectCrewMember) {
        match self.members.iter_mut().find(|m| m.name == member.name) {
            Some(slot) => *slot = member,
            None => self.members.push(member),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ProjectCrewMember> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProjectCrewMember> {
        self.members.iter()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn to_vec(&self) -> Vec<ProjectCrewMember> {
        self.members.clone()
    }
}

impl<'a> IntoIterator for &'a CrewRoster {
    type Item = &'a ProjectCrewMember;
    type IntoIter = std::slice::Iter<'a, ProjectCrewMember>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}
