//! Filmeto crew resolution.
//!
//! Materializes role templates into per-project crew member files, assigns
//! each a soul, and loads the resulting crew for display.

pub mod cli;
pub mod config;
pub mod crew;
pub mod error;
pub mod frontmatter;
pub mod logging;
pub mod soul;
pub mod version;

pub use config::CrewConfig;
pub use crew::{CrewService, Project, ProjectCrewMember};
pub use error::{Error, Result};
pub use soul::{SoulProfile, SoulProvider, SoulService};
