//! Version and build information embedded by `build.rs`.

use std::fmt;

/// Working-tree state of the checkout the binary was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeState {
    Clean,
    Dirty,
    Unknown,
}

impl TreeState {
    const fn from_flag(flag: &str) -> Self {
        match flag.as_bytes() {
            b"true" => TreeState::Dirty,
            b"false" => TreeState::Clean,
            _ => TreeState::Unknown,
        }
    }
}

/// Compile-time facts about this binary.
#[derive(Debug, Clone)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    /// Short commit hash, or `unknown` outside a git checkout
    pub git_hash: &'static str,
    pub git_branch: &'static str,
    pub tree: TreeState,
    pub build_timestamp: &'static str,
    pub target: &'static str,
    pub profile: &'static str,
    pub rustc_version: &'static str,
}

/// Build information for the running binary.
pub const BUILD: BuildInfo = BuildInfo {
    name: env!("CARGO_PKG_NAME"),
    version: env!("CARGO_PKG_VERSION"),
    git_hash: env!("FILMETO_GIT_HASH"),
    git_branch: env!("FILMETO_GIT_BRANCH"),
    tree: TreeState::from_flag(env!("FILMETO_GIT_DIRTY")),
    build_timestamp: env!("FILMETO_BUILD_TIMESTAMP"),
    target: env!("FILMETO_TARGET"),
    profile: env!("FILMETO_PROFILE"),
    rustc_version: env!("FILMETO_RUSTC_VERSION"),
};

impl BuildInfo {
    /// `0.1.0+abc12345`, with `.dirty` appended for uncommitted builds.
    pub fn full_version(&self) -> String {
        let mut out = format!("{}+{}", self.version, self.git_hash);
        if self.tree == TreeState::Dirty {
            out.push_str(".dirty");
        }
        out
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = match self.tree {
            TreeState::Clean => "",
            TreeState::Dirty => " (uncommitted changes)",
            TreeState::Unknown => " (tree state unknown)",
        };

        writeln!(f, "{} {}", self.name, self.full_version())?;
        writeln!(f)?;
        writeln!(f, "Build Information:")?;
        let rows = [
            ("Git Hash", format!("{}{tree}", self.git_hash)),
            ("Branch", self.git_branch.to_string()),
            ("Built At", self.build_timestamp.to_string()),
            ("Target", self.target.to_string()),
            ("Profile", self.profile.to_string()),
            ("Rustc", self.rustc_version.to_string()),
        ];
        for (label, value) in rows {
            writeln!(f, "  {:<10} {value}", format!("{label}:"))?;
        }
        Ok(())
    }
}

/// Build information for the running binary.
pub fn build_info() -> &'static BuildInfo {
    &BUILD
}

/// `filmeto-crew version`
pub fn print_version() {
    print!("{BUILD}");
}
