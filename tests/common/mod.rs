//! Common test utilities and fixtures
//!
//! This module provides shared test infrastructure

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use filmeto_crew::crew::CrewService;
use filmeto_crew::soul::SoulProfile;
use tempfile::TempDir;

/// Get the path to the test fixtures directory
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Get a path to a specific fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

/// Get the valid config fixture path
pub fn valid_config_fixture() -> PathBuf {
    fixture_path("valid_config.toml")
}

/// Get the invalid config fixture path
pub fn invalid_config_fixture() -> PathBuf {
    fixture_path("invalid_config.toml")
}

/// Role templates shipped with the tests
pub fn templates_fixture() -> PathBuf {
    fixture_path("templates")
}

/// Souls shipped with the tests
pub fn souls_fixture() -> PathBuf {
    fixture_path("souls")
}

/// Scratch layout: `system/` for templates, `project/` for the project root
pub struct CrewFixture {
    pub temp_dir: TempDir,
}

impl CrewFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("system")).unwrap();
        Self { temp_dir }
    }

    pub fn system_dir(&self) -> PathBuf {
        self.temp_dir.path().join("system")
    }

    pub fn project(&self) -> PathBuf {
        self.temp_dir.path().join("project")
    }

    /// A second, independent project root
    pub fn other_project(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    pub fn write_template(&self, file: &str, content: &str) -> PathBuf {
        write_file(&self.system_dir().join(file), content)
    }

    pub fn member_path(&self, file: &str) -> PathBuf {
        self.project().join("agent").join("crew_members").join(file)
    }

    pub fn legacy_path(&self, file: &str) -> PathBuf {
        self.project().join("agent").join("sub_agents").join(file)
    }

    pub fn service(&self, souls: Vec<SoulProfile>) -> CrewService {
        CrewService::new(self.system_dir(), Arc::new(souls))
    }

    /// Service whose template directory does not exist
    pub fn bare_service(&self) -> CrewService {
        CrewService::new(
            self.temp_dir.path().join("no-templates"),
            Arc::new(Vec::<SoulProfile>::new()),
        )
    }

    pub fn seeded_service(&self, souls: Vec<SoulProfile>, seed: u64) -> CrewService {
        self.service(souls).with_seed(seed)
    }
}

/// Write a file, creating parent directories
pub fn write_file(path: &Path, content: &str) -> PathBuf {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_dir_exists() {
        assert!(fixtures_dir().exists(), "Fixtures directory should exist");
    }

    #[test]
    fn test_valid_config_exists() {
        assert!(
            valid_config_fixture().exists(),
            "Valid config fixture should exist"
        );
    }

    #[test]
    fn test_invalid_config_exists() {
        assert!(
            invalid_config_fixture().exists(),
            "Invalid config fixture should exist"
        );
    }
}
