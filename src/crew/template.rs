//! Role templates: one Markdown file per crew role.
//!
//! The role id is the filename stem (`director.md` → `director`). Templates
//! are read-only; the crew service copies them into projects.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Mapping;
use tracing::warn;

use crate::error::{Error, Result};
use crate::frontmatter::{self, Frontmatter};

use super::member::{DEFAULT_COLOR, DEFAULT_ICON, DEFAULT_MAX_STEPS, DEFAULT_MODEL, DEFAULT_TEMPERATURE};

/// An immutable crew role definition.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleTemplate {
    role_id: String,
    source_path: PathBuf,
    raw: String,
    document: Frontmatter,
}

impl RoleTemplate {
    /// Read a template file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| Error::io_read(path, e))?;
        Ok(Self::from_content(path, raw))
    }

    /// Build a template from already-read content.
    pub fn from_content(path: &Path, raw: String) -> Self {
        let role_id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let document = frontmatter::parse(&raw);
        Self {
            role_id,
            source_path: path.to_path_buf(),
            raw,
            document,
        }
    }

    /// Role id (filename stem).
    pub fn role_id(&self) -> &str {
        &self.role_id
    }

    /// File the template was read from.
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// File content exactly as read.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Parsed metadata; empty when absent or malformed.
    pub fn metadata(&self) -> &Mapping {
        &self.document.metadata
    }

    /// Body to follow a rewritten frontmatter block. Guarantees the closing
    /// delimiter stays on its own line.
    pub fn body_for_rewrite(&self) -> String {
        if self.document.has_frontmatter {
            self.document.body.clone()
        } else {
            format!("\n{}", self.document.body)
        }
    }

    /// System prompt.
    pub fn prompt(&self) -> &str {
        self.document.prompt()
    }

    /// Soul pinned by the template.
    pub fn default_soul(&self) -> Option<String> {
        frontmatter::get_string(self.metadata(), "soul").filter(|s| !s.trim().is_empty())
    }

    pub fn name(&self) -> String {
        frontmatter::get_string(self.metadata(), "name").unwrap_or_else(|| self.role_id.clone())
    }

    pub fn description(&self) -> String {
        frontmatter::get_string(self.metadata(), "description").unwrap_or_default()
    }

    pub fn skills(&self) -> Vec<String> {
        frontmatter::get_list(self.metadata(), "skills")
    }

    pub fn model(&self) -> String {
        frontmatter::get_string(self.metadata(), "model").unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }

    pub fn temperature(&self) -> f64 {
        frontmatter::get_f64(self.metadata(), "temperature").unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub fn max_steps(&self) -> u32 {
        frontmatter::get_u32(self.metadata(), "max_steps").unwrap_or(DEFAULT_MAX_STEPS)
    }

    pub fn color(&self) -> String {
        frontmatter::get_string(self.metadata(), "color").unwrap_or_else(|| DEFAULT_COLOR.to_string())
    }

    pub fn icon(&self) -> String {
        frontmatter::get_string(self.metadata(), "icon").unwrap_or_else(|| DEFAULT_ICON.to_string())
    }

    /// Per-language display names, in file order.
    pub fn display_names(&self) -> Vec<(String, String)> {
        frontmatter::get_string_map(self.metadata(), "display_names")
    }

    /// Declared crew title, defaulting to the role id.
    pub fn crew_title(&self) -> String {
        frontmatter::get_string(self.metadata(), "crew_title").unwrap_or_else(|| self.role_id.clone())
    }
}

/// Load every template in `dir`, skipping unreadable files.
pub fn load_all(dir: &Path) -> Vec<RoleTemplate> {
    frontmatter::list_markdown(dir)
        .into_iter()
        .filter_map(|path| match RoleTemplate::load(&path) {
            Ok(template) => Some(template),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable role template");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_frontmatter() {
        let template = RoleTemplate::from_content(Path::new("/sys/editor.md"), "Edit things.".into());
        assert_eq!(template.role_id(), "editor");
        assert_eq!(template.name(), "editor");
        assert_eq!(template.model(), DEFAULT_MODEL);
        assert_eq!(template.temperature(), DEFAULT_TEMPERATURE);
        assert_eq!(template.max_steps(), DEFAULT_MAX_STEPS);
        assert_eq!(template.crew_title(), "editor");
        assert!(template.default_soul().is_none());
        assert_eq!(template.body_for_rewrite(), "\nEdit things.");
    }

    #[test]
    fn test_properties_from_metadata() {
        let content = "---\nname: Director\nsoul: Alex Rivera\nskills: storyboard, shot_list\n\
                       temperature: 0.2\nmax_steps: 9\ndisplay_names:\n  en: Director\n  zh: 导演\n---\nLead.";
        let template = RoleTemplate::from_content(Path::new("/sys/director.md"), content.into());
        assert_eq!(template.name(), "Director");
        assert_eq!(template.default_soul().as_deref(), Some("Alex Rivera"));
        assert_eq!(template.skills(), vec!["storyboard", "shot_list"]);
        assert_eq!(template.temperature(), 0.2);
        assert_eq!(template.max_steps(), 9);
        assert_eq!(template.display_names().len(), 2);
        assert_eq!(template.prompt(), "Lead.");
        assert_eq!(template.body_for_rewrite(), "\nLead.");
    }

    #[test]
    fn test_blank_soul_is_not_a_pin() {
        let template = RoleTemplate::from_content(Path::new("/sys/x.md"), "---\nsoul: ''\n---\n".into());
        assert!(template.default_soul().is_none());
    }

    #[test]
    fn test_load_all_filters_markdown() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.md"), "a").unwrap();
        fs::write(tmp.path().join("b.txt"), "b").unwrap();
        fs::create_dir(tmp.path().join("zh_CN")).unwrap();

        assert_eq!(load_all(tmp.path()).len(), 1);
        assert!(load_all(&tmp.path().join("missing")).is_empty());
    }
}
