//! Crew resolution: role templates, soul assignment, per-project crews and
//! importance ordering.
//!
//! On-disk layout:
//!
//! ```text
//! <system_dir>/*.md                   role templates, one per role
//! <system_dir>/<language>/*.md        per-language titles (display only)
//! <project>/agent/crew_members/*.md   materialized members
//! <project>/agent/sub_agents/*.md     legacy members, read only
//! ```

pub mod matcher;
pub mod member;
pub mod project;
pub mod service;
pub mod template;
pub mod title;

pub use member::{CrewMemberSummary, CrewRoster, ProjectCrewMember};
pub use project::{Project, ProjectLocator};
pub use service::CrewService;
pub use template::RoleTemplate;
pub use title::{CrewTitleMetadata, ImportanceOrder, KnownRole, TitleCatalog};
