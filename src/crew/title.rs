//! Crew titles: display names and importance ranking.
//!
//! Two ranking modes exist. Static mode uses the nine canonical roles in
//! [`KnownRole`] order. Dynamic mode ranks by discovery order of the role
//! templates for the active language. Anything unknown ranks after every
//! listed id.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::debug;

use crate::error::Error;
use crate::frontmatter;

use super::member::ProjectCrewMember;
use super::template::RoleTemplate;

/// Title metadata is read straight from the role template.
pub type CrewTitleMetadata = RoleTemplate;

/// The canonical crew roles, most important first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownRole {
    Producer,
    Director,
    Screenwriter,
    Cinematographer,
    Editor,
    SoundDesigner,
    VfxSupervisor,
    StoryboardArtist,
    Other,
}

impl KnownRole {
    const ALL: [KnownRole; 9] = [
        KnownRole::Producer,
        KnownRole::Director,
        KnownRole::Screenwriter,
        KnownRole::Cinematographer,
        KnownRole::Editor,
        KnownRole::SoundDesigner,
        KnownRole::VfxSupervisor,
        KnownRole::StoryboardArtist,
        KnownRole::Other,
    ];

    /// Every role in importance order.
    pub fn all() -> &'static [KnownRole] {
        &Self::ALL
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KnownRole::Producer => "producer",
            KnownRole::Director => "director",
            KnownRole::Screenwriter => "screenwriter",
            KnownRole::Cinematographer => "cinematographer",
            KnownRole::Editor => "editor",
            KnownRole::SoundDesigner => "sound_designer",
            KnownRole::VfxSupervisor => "vfx_supervisor",
            KnownRole::StoryboardArtist => "storyboard_artist",
            KnownRole::Other => "other",
        }
    }

    /// Position in the static order.
    pub fn rank(&self) -> usize {
        *self as usize
    }

    /// Built-in name for English and Chinese UIs. `None` for other languages.
    pub fn display_name(&self, language: &str) -> Option<&'static str> {
        let lang = language.to_lowercase();
        if lang.starts_with("zh") {
            Some(match self {
                KnownRole::Producer => "制片人",
                KnownRole::Director => "导演",
                KnownRole::Screenwriter => "编剧",
                KnownRole::Cinematographer => "摄影师",
                KnownRole::Editor => "剪辑师",
                KnownRole::SoundDesigner => "音效设计师",
                KnownRole::VfxSupervisor => "视效总监",
                KnownRole::StoryboardArtist => "分镜师",
                KnownRole::Other => "其他",
            })
        } else if lang.starts_with("en") {
            Some(match self {
                KnownRole::Producer => "Producer",
                KnownRole::Director => "Director",
                KnownRole::Screenwriter => "Screenwriter",
                KnownRole::Cinematographer => "Cinematographer",
                KnownRole::Editor => "Editor",
                KnownRole::SoundDesigner => "Sound Designer",
                KnownRole::VfxSupervisor => "VFX Supervisor",
                KnownRole::StoryboardArtist => "Storyboard Artist",
                KnownRole::Other => "Other",
            })
        } else {
            None
        }
    }
}

impl FromStr for KnownRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| Error::UnknownCrewTitle { title: s.to_string() })
    }
}

impl fmt::Display for KnownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ranking used to order crew members for display.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImportanceOrder {
    #[default]
    Static,
    Dynamic(Vec<String>),
}

impl ImportanceOrder {
    /// Ranked ids, most important first.
    pub fn ids(&self) -> Vec<String> {
        match self {
            ImportanceOrder::Static => KnownRole::all().iter().map(|r| r.as_str().to_string()).collect(),
            ImportanceOrder::Dynamic(ids) => ids.clone(),
        }
    }

    /// Rank of `role_id`; unknown ids get the list length.
    pub fn rank(&self, role_id: &str) -> usize {
        match self {
            ImportanceOrder::Static => role_id
                .parse::<KnownRole>()
                .map(|r| r.rank())
                .unwrap_or(KnownRole::ALL.len()),
            ImportanceOrder::Dynamic(ids) => ids.iter().position(|id| id == role_id).unwrap_or(ids.len()),
        }
    }
}

/// Stable sort by importance; equal ranks keep their current order.
pub fn sort_by_importance(members: &mut [ProjectCrewMember], order: &ImportanceOrder) {
    members.sort_by_cached_key(|m| order.rank(&m.role_id()));
}

/// Role-template lookups for one UI language.
#[derive(Debug, Clone)]
pub struct TitleCatalog {
    system_dir: PathBuf,
    language: String,
}

impl TitleCatalog {
    pub fn new(system_dir: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            system_dir: system_dir.into(),
            language: language.into(),
        }
    }

    pub fn system_dir(&self) -> &Path {
        &self.system_dir
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// `<system>/<language>` when present, else `<system>`.
    pub fn language_dir(&self) -> PathBuf {
        let localized = self.system_dir.join(&self.language);
        if !self.language.is_empty() && localized.is_dir() {
            localized
        } else {
            self.system_dir.clone()
        }
    }

    /// Role ids available for the language, in discovery order.
    pub fn dynamic_titles(&self) -> Vec<String> {
        frontmatter::list_markdown(&self.language_dir())
            .iter()
            .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect()
    }

    /// Metadata of one role, read fresh on every call.
    pub fn metadata(&self, role_id: &str) -> Option<CrewTitleMetadata> {
        let path = self.language_dir().join(format!("{role_id}.md"));
        if !path.is_file() {
            return None;
        }
        match RoleTemplate::load(&path) {
            Ok(template) => Some(template),
            Err(e) => {
                debug!(role = role_id, error = %e, "Role metadata unreadable");
                None
            }
        }
    }

    /// Display name of `role_id` in `language`.
    pub fn display_name(&self, role_id: &str, language: &str) -> String {
        if let Some(name) = self
            .metadata(role_id)
            .and_then(|m| pick_localized(&m.display_names(), language))
        {
            return name;
        }
        role_id
            .parse::<KnownRole>()
            .ok()
            .and_then(|r| r.display_name(language))
            .map(str::to_string)
            .unwrap_or_else(|| role_id.to_string())
    }

    pub fn importance_order(&self, dynamic: bool) -> ImportanceOrder {
        if dynamic {
            ImportanceOrder::Dynamic(self.dynamic_titles())
        } else {
            ImportanceOrder::Static
        }
    }

    pub fn rank(&self, role_id: &str, dynamic: bool) -> usize {
        self.importance_order(dynamic).rank(role_id)
    }

    /// Canonical role or a template present for the language.
    pub fn is_valid_title(&self, role_id: &str) -> bool {
        Self::from_string(role_id).is_some() || self.dynamic_titles().iter().any(|t| t == role_id)
    }

    pub fn from_string(role_id: &str) -> Option<KnownRole> {
        role_id.parse().ok()
    }
}

fn language_prefix(language: &str) -> &str {
    language.split(['_', '-']).next().unwrap_or(language)
}

fn pick_localized(names: &[(String, String)], language: &str) -> Option<String> {
    let prefix = language_prefix(language);
    names
        .iter()
        .find(|(k, _)| k == language)
        .or_else(|| names.iter().find(|(k, _)| k == prefix))
        .or_else(|| names.iter().find(|(k, _)| language_prefix(k) == prefix))
        .map(|(_, v)| v.clone())
        .filter(|v| !v.is_empty())
}
