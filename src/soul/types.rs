//! Soul profile type.

use std::path::{Path, PathBuf};

use serde_yaml::Mapping;

use crate::frontmatter;

/// A reusable personality/voice profile, independent of any role.
#[derive(Debug, Clone, PartialEq)]
pub struct SoulProfile {
    /// Opaque display name, may contain spaces, hyphens or underscores.
    pub name: String,

    /// Skills the soul is proficient in.
    pub skills: Vec<String>,

    /// Frontmatter of the soul's description file, if it had one.
    pub metadata: Option<Mapping>,

    /// Markdown body of the description file.
    pub knowledge: String,

    /// File the soul was loaded from. `None` for in-memory souls.
    pub description_file: Option<PathBuf>,
}

impl SoulProfile {
    /// In-memory soul with no metadata.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            skills: Vec::new(),
            metadata: None,
            knowledge: String::new(),
            description_file: None,
        }
    }

    /// In-memory soul tagged with a crew title.
    pub fn tagged(name: impl Into<String>, crew_title: &str) -> Self {
        let mut metadata = Mapping::new();
        frontmatter::set_string(&mut metadata, "crew_title", crew_title);
        Self::new(name).with_metadata(metadata)
    }

    /// Builder: attach metadata.
    pub fn with_metadata(mut self, metadata: Mapping) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Builder: attach skills.
    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = skills.into_iter().map(Into::into).collect();
        self
    }

    /// Build a soul from a parsed description file. The name comes from the
    /// metadata `name` key, falling back to the filename stem.
    pub fn from_document(path: &Path, doc: frontmatter::Frontmatter) -> Self {
        let fallback = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = frontmatter::get_string(&doc.metadata, "name").unwrap_or(fallback);
        let skills = frontmatter::get_list(&doc.metadata, "skills");
        let knowledge = doc.prompt().to_string();
        let metadata = doc.has_frontmatter.then_some(doc.metadata);

        Self {
            name,
            skills,
            metadata,
            knowledge,
            description_file: Some(path.to_path_buf()),
        }
    }

    /// Metadata string value.
    pub fn meta(&self, key: &str) -> Option<String> {
        self.metadata
            .as_ref()
            .and_then(|m| frontmatter::get_string(m, key))
    }

    /// Role id this soul declares itself suited for.
    pub fn crew_title(&self) -> Option<String> {
        self.meta("crew_title")
    }

    /// Display name declared in metadata.
    pub fn declared_name(&self) -> Option<String> {
        self.meta("name")
    }
}
