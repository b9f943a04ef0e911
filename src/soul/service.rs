//! File-backed soul service.
//!
//! Souls are Markdown files with optional YAML frontmatter, read from a
//! system directory (shipped with the application) and a user directory.
//! Missing directories are skipped; unreadable files are warned and skipped.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::frontmatter;

use super::types::SoulProfile;

/// Source of souls for crew resolution.
pub trait SoulProvider: Send + Sync {
    /// Flat list of every known soul.
    fn get_all_souls(&self) -> Vec<SoulProfile>;
}

impl SoulProvider for Vec<SoulProfile> {
    fn get_all_souls(&self) -> Vec<SoulProfile> {
        self.clone()
    }
}

/// In-memory soul catalog with CRUD operations.
#[derive(Debug, Default)]
pub struct SoulService {
    system_dir: Option<PathBuf>,
    user_dir: Option<PathBuf>,
    souls: Vec<SoulProfile>,
}

impl SoulService {
    /// Empty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load souls from the system directory, then the user directory.
    pub fn load(system_dir: impl Into<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        let mut service = Self {
            system_dir: Some(system_dir.into()),
            user_dir,
            souls: Vec::new(),
        };
        service.reload();
        service
    }

    /// System soul directory, if configured.
    pub fn system_dir(&self) -> Option<&Path> {
        self.system_dir.as_deref()
    }

    /// User soul directory, if configured.
    pub fn user_dir(&self) -> Option<&Path> {
        self.user_dir.as_deref()
    }

    /// Drop in-memory souls and re-read both directories.
    pub fn reload(&mut self) {
        self.souls.clear();
        let dirs: Vec<PathBuf> = self
            .system_dir
            .iter()
            .chain(self.user_dir.iter())
            .cloned()
            .collect();
        for dir in dirs {
            let loaded = load_dir(&dir);
            self.souls.extend(loaded);
        }
        info!(count = self.souls.len(), "Souls loaded");
    }

    /// Find a soul by exact name.
    pub fn get_soul_by_name(&self, name: &str) -> Option<&SoulProfile> {
        self.souls.iter().find(|s| s.name == name)
    }

    /// Add a soul. Returns `false` if one with the same name exists.
    pub fn add_soul(&mut self, soul: SoulProfile) -> bool {
        if self.get_soul_by_name(&soul.name).is_some() {
            return false;
        }
        self.souls.push(soul);
        true
    }

    /// Replace the soul called `name`. Returns `false` if absent.
    pub fn update_soul(&mut self, name: &str, soul: SoulProfile) -> bool {
        match self.souls.iter_mut().find(|s| s.name == name) {
            Some(slot) => {
                *slot = soul;
                true
            }
            None => false,
        }
    }

    /// Remove the soul called `name`. Returns `false` if absent.
    pub fn delete_soul(&mut self, name: &str) -> bool {
        match self.souls.iter().position(|s| s.name == name) {
            Some(idx) => {
                self.souls.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Souls that list `skill` among their skills.
    pub fn search_souls_by_skill(&self, skill: &str) -> Vec<&SoulProfile> {
        self.souls
            .iter()
            .filter(|s| s.skills.iter().any(|k| k == skill))
            .collect()
    }

    /// Loaded souls, system directory first.
    pub fn iter(&self) -> impl Iterator<Item = &SoulProfile> {
        self.souls.iter()
    }

    /// Number of loaded souls.
    pub fn len(&self) -> usize {
        self.souls.len()
    }

    /// Whether no souls are loaded.
    pub fn is_empty(&self) -> bool {
        self.souls.is_empty()
    }
}

impl SoulProvider for SoulService {
    fn get_all_souls(&self) -> Vec<SoulProfile> {
        self.souls.clone()
    }
}

fn load_dir(dir: &Path) -> Vec<SoulProfile> {
    frontmatter::list_markdown(dir)
        .into_iter()
        .filter_map(|path| match frontmatter::read(&path) {
            Ok(doc) => Some(SoulProfile::from_document(&path, doc)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable soul file");
                None
            }
        })
        .collect()
}
