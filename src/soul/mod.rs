//! Souls: reusable personality/voice profiles assignable to crew members.
//!
//! A soul is independent of any role. Crew resolution only needs the flat
//! list exposed by [`SoulProvider`]; [`SoulService`] is the file-backed
//! implementation used by the CLI.

pub mod service;
pub mod types;

pub use service::{SoulProvider, SoulService};
pub use types::SoulProfile;
