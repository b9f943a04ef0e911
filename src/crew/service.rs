//! Crew resolution service.
//!
//! Materializes role templates into a project's `agent/crew_members/`
//! directory, assigning a soul to each, then loads and caches the project's
//! crew. Existing member files are never overwritten; their presence is the
//! only idempotence signal.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::config::{CrewConfig, ImportanceMode};
use crate::error::{Error, Result};
use crate::frontmatter;
use crate::soul::{SoulProfile, SoulProvider, SoulService};

use super::matcher;
use super::member::{CrewMemberSummary, CrewRoster, ProjectCrewMember};
use super::project::{crew_members_dir, legacy_sub_agents_dir, ProjectLocator};
use super::template::{self, RoleTemplate};
use super::title::{sort_by_importance, ImportanceOrder, TitleCatalog};

/// Resolves, materializes and caches project crews.
pub struct CrewService {
    system_dir: PathBuf,
    souls: Arc<dyn SoulProvider>,
    titles: TitleCatalog,
    importance: ImportanceMode,

    /// project key → loaded crew, never evicted
    registry: RwLock<HashMap<String, Arc<CrewRoster>>>,

    rng: Mutex<StdRng>,
}

impl CrewService {
    /// Service reading role templates from `system_dir`. Soul picks use an
    /// entropy-seeded RNG.
    pub fn new(system_dir: impl Into<PathBuf>, souls: Arc<dyn SoulProvider>) -> Self {
        let system_dir = system_dir.into();
        Self {
            titles: TitleCatalog::new(system_dir.clone(), "en_US"),
            system_dir,
            souls,
            importance: ImportanceMode::Static,
            registry: RwLock::new(HashMap::new()),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Service wired from configuration, with a file-backed soul service.
    pub fn from_config(config: &CrewConfig) -> Self {
        let souls = SoulService::load(config.soul_system_dir(), config.soul_user_dir());
        Self::new(config.crew_system_dir(), Arc::new(souls))
            .with_language(config.crew.language.clone())
            .with_importance(config.crew.importance)
    }

    /// Builder: deterministic soul picks.
    pub fn with_seed(self, seed: u64) -> Self {
        *self.rng.lock() = StdRng::seed_from_u64(seed);
        self
    }

    /// Builder: UI language for title lookups.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.titles = TitleCatalog::new(self.system_dir.clone(), language);
        self
    }

    /// Builder: ranking used by [`CrewService::list_display_order`].
    pub fn with_importance(mut self, importance: ImportanceMode) -> Self {
        self.importance = importance;
        self
    }

    pub fn system_dir(&self) -> &Path {
        &self.system_dir
    }

    pub fn titles(&self) -> &TitleCatalog {
        &self.titles
    }

    pub fn importance(&self) -> ImportanceMode {
        self.importance
    }

    // ─────────────────────────────────────────────────────────────
    // Materialization
    // ─────────────────────────────────────────────────────────────

    /// Write a member file for every role template the project lacks.
    ///
    /// Returns the newly written paths. A project without a path, or a
    /// missing template directory, yields an empty list.
    pub fn initialize<P: ProjectLocator + ?Sized>(&self, project: &P) -> Result<Vec<PathBuf>> {
        let Some(project_path) = project.project_path() else {
            debug!("Project has no path, nothing to initialize");
            return Ok(Vec::new());
        };

        let target_dir = crew_members_dir(&project_path);
        fs::create_dir_all(&target_dir).map_err(|e| Error::io_write(&target_dir, e))?;

        if !self.system_dir.is_dir() {
            debug!(path = %self.system_dir.display(), "Role template directory missing");
            return Ok(Vec::new());
        }

        let souls = self.souls.get_all_souls();
        let mut written = Vec::new();

        for template in template::load_all(&self.system_dir) {
            let content = self.materialize(&template, &souls)?;

            let Some(file_name) = template.source_path().file_name() else {
                continue;
            };
            let target = target_dir.join(file_name);

            // create_new: a concurrent initializer that got there first keeps its file
            let mut file = match OpenOptions::new().write(true).create_new(true).open(&target) {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    debug!(path = %target.display(), "Crew member exists, keeping it");
                    continue;
                }
                Err(e) => return Err(Error::io_write(&target, e)),
            };
            file.write_all(content.as_bytes())
                .map_err(|e| Error::io_write(&target, e))?;
            info!(role = template.role_id(), path = %target.display(), "Crew member created");
            written.push(target);
        }

        Ok(written)
    }

    /// File content for one template: the soul baked into its frontmatter,
    /// or the template verbatim when no soul applies.
    fn materialize(&self, template: &RoleTemplate, souls: &[SoulProfile]) -> Result<String> {
        let soul = {
            let mut rng = self.rng.lock();
            matcher::resolve_soul(template, souls, &mut *rng)
        };

        let Some(soul) = soul else {
            debug!(role = template.role_id(), "No soul available");
            return Ok(template.raw().to_string());
        };

        debug!(role = template.role_id(), soul = %soul.name, "Soul assigned");
        let metadata = matcher::apply_soul(template, soul);
        frontmatter::render(&metadata, &template.body_for_rewrite()).map_err(|source| {
            Error::MetadataSerialize {
                path: template.source_path().to_path_buf(),
                source,
            }
        })
    }

    // ─────────────────────────────────────────────────────────────
    // Loading
    // ─────────────────────────────────────────────────────────────

    /// Load the project's crew, from cache unless `refresh` is set.
    ///
    /// Members come from `crew_members/`, then `sub_agents/` for anything
    /// not already present. Unreadable files are skipped.
    pub fn load<P: ProjectLocator + ?Sized>(&self, project: &P, refresh: bool) -> Result<Arc<CrewRoster>> {
        let Some(key) = project.project_key() else {
            return Ok(Arc::new(CrewRoster::new()));
        };

        if !refresh {
            if let Some(cached) = self.registry.read().get(&key) {
                return Ok(Arc::clone(cached));
            }
        }

        let Some(project_path) = project.project_path() else {
            debug!(project = %key, "Project has no path, returning empty crew");
            return Ok(Arc::new(CrewRoster::new()));
        };

        self.initialize(project)?;

        let workspace = project.workspace();
        let mut roster = CrewRoster::new();

        for path in frontmatter::list_markdown(&crew_members_dir(&project_path)) {
            if let Some(member) = read_member(&path, &workspace) {
                roster.insert(member);
            }
        }

        for path in frontmatter::list_markdown(&legacy_sub_agents_dir(&project_path)) {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            if roster.contains(&stem) {
                debug!(path = %path.display(), "Legacy member superseded");
                continue;
            }
            if let Some(member) = read_member(&path, &workspace) {
                if roster.contains(&member.name) {
                    debug!(path = %path.display(), name = %member.name, "Legacy member superseded");
                    continue;
                }
                roster.insert(member);
            }
        }

        let roster = Arc::new(roster);
        self.registry.write().insert(key.clone(), Arc::clone(&roster));
        info!(project = %key, members = roster.len(), "Crew loaded");
        Ok(roster)
    }

    /// Re-scan the project, creating any missing member files.
    pub fn refresh<P: ProjectLocator + ?Sized>(&self, project: &P) -> Result<Arc<CrewRoster>> {
        self.load(project, true)
    }

    /// Crew in static importance order.
    pub fn list_sorted<P: ProjectLocator + ?Sized>(&self, project: &P) -> Result<Vec<ProjectCrewMember>> {
        self.list_sorted_with(project, &ImportanceOrder::Static)
    }

    /// Crew sorted by `order`; equal ranks keep load order.
    pub fn list_sorted_with<P: ProjectLocator + ?Sized>(
        &self,
        project: &P,
        order: &ImportanceOrder,
    ) -> Result<Vec<ProjectCrewMember>> {
        let mut members = self.load(project, false)?.to_vec();
        sort_by_importance(&mut members, order);
        Ok(members)
    }

    /// Crew sorted by the configured importance mode.
    pub fn list_display_order<P: ProjectLocator + ?Sized>(&self, project: &P) -> Result<Vec<ProjectCrewMember>> {
        let order = self
            .titles
            .importance_order(self.importance == ImportanceMode::Dynamic);
        self.list_sorted_with(project, &order)
    }

    pub fn get_crew_member<P: ProjectLocator + ?Sized>(
        &self,
        project: &P,
        name: &str,
    ) -> Result<Option<ProjectCrewMember>> {
        Ok(self.load(project, false)?.get(name).cloned())
    }

    /// Crew in load order.
    pub fn list_crew_members<P: ProjectLocator + ?Sized>(&self, project: &P) -> Result<Vec<ProjectCrewMember>> {
        Ok(self.load(project, false)?.to_vec())
    }

    /// Avatar metadata for every member, in load order.
    pub fn member_summaries<P: ProjectLocator + ?Sized>(&self, project: &P) -> Result<Vec<CrewMemberSummary>> {
        Ok(self
            .load(project, false)?
            .iter()
            .map(ProjectCrewMember::summary)
            .collect())
    }

    /// Role ids available for the configured language.
    pub fn crew_titles(&self) -> Vec<String> {
        self.titles.dynamic_titles()
    }

    /// Keys of every cached project.
    pub fn cached_projects(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.registry.read().keys().cloned().collect();
        keys.sort();
        keys
    }
}

fn read_member(path: &Path, workspace: &Option<PathBuf>) -> Option<ProjectCrewMember> {
    match ProjectCrewMember::from_markdown(path) {
        Ok(member) => Some(member.with_workspace(workspace.clone())),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Skipping unreadable crew member");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crew::project::Project;
    use tempfile::TempDir;

    fn service(system: &Path, souls: Vec<SoulProfile>) -> CrewService {
        CrewService::new(system, Arc::new(souls)).with_seed(42)
    }

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_unresolvable_project() {
        let tmp = TempDir::new().unwrap();
        let svc = service(tmp.path(), vec![]);
        assert!(svc.initialize(&Project::default()).unwrap().is_empty());
        assert!(svc.load(&Project::named("ghost"), false).unwrap().is_empty());
        assert!(svc.cached_projects().is_empty());
    }

    #[test]
    fn test_missing_template_dir() {
        let tmp = TempDir::new().unwrap();
        let svc = service(&tmp.path().join("nope"), vec![]);
        let project = tmp.path().join("project");
        assert!(svc.initialize(&project).unwrap().is_empty());
        assert!(crew_members_dir(&project).is_dir());
    }

    #[test]
    fn test_template_copied_verbatim_without_souls() {
        let tmp = TempDir::new().unwrap();
        let system = tmp.path().join("system");
        let raw = "---\nname: Editor\n---\nCut it.\n";
        write(&system.join("editor.md"), raw);

        let svc = service(&system, vec![]);
        let project = tmp.path().join("project");
        let written = svc.initialize(&project).unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(fs::read_to_string(&written[0]).unwrap(), raw);
    }

    #[test]
    fn test_soul_rewrite_keeps_body() {
        let tmp = TempDir::new().unwrap();
        let system = tmp.path().join("system");
        write(&system.join("director.md"), "---\ndescription: Leads\n---\nDirect.\n");

        let svc = service(&system, vec![SoulProfile::tagged("Alex Rivera", "director")]);
        let project = tmp.path().join("project");
        svc.initialize(&project).unwrap();

        let content = fs::read_to_string(crew_members_dir(&project).join("director.md")).unwrap();
        assert!(content.starts_with("---\n"));
        assert!(content.ends_with("---\nDirect.\n"));

        let member = svc.get_crew_member(&project, "alex_rivera").unwrap().unwrap();
        assert_eq!(member.soul.as_deref(), Some("Alex Rivera"));
        assert_eq!(member.role_id(), "director");
        assert_eq!(member.description, "Leads");
        assert_eq!(member.prompt, "Direct.");
    }

    #[test]
    fn test_workspace_passed_through() {
        let tmp = TempDir::new().unwrap();
        let system = tmp.path().join("system");
        write(&system.join("editor.md"), "Cut.");

        let svc = service(&system, vec![]);
        let project = Project::at(tmp.path().join("p")).with_workspace("/ws");
        let members = svc.list_crew_members(&project).unwrap();
        assert_eq!(members[0].workspace, Some(PathBuf::from("/ws")));
        assert_eq!(svc.member_summaries(&project).unwrap()[0].name, "editor");
    }
}
