//! `crew.toml` loading through the binary: validation, `config show`,
//! `config init`, `FILMETO_*` overrides and `~` expansion.

mod common;

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::assert::Assert;
use assert_cmd::Command;
use filmeto_crew::config::{CrewConfig, ImportanceMode};
use predicates::str::contains;
use tempfile::TempDir;

/// A scratch `crew.toml` in its own temp dir
struct ConfigFixture {
    _dir: TempDir,
    file: PathBuf,
}

impl ConfigFixture {
    fn with(content: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("crew.toml");
        fs::write(&file, content).unwrap();
        Self { _dir: dir, file }
    }

    fn path(&self) -> &Path {
        &self.file
    }
}

fn config_cmd(action: &str) -> Command {
    let mut cmd = Command::cargo_bin("filmeto-crew").unwrap();
    cmd.args(["config", action]);
    cmd
}

fn validate(path: &Path) -> Assert {
    config_cmd("validate").arg("--config").arg(path).assert()
}

fn show(path: &Path) -> Assert {
    config_cmd("show").arg("--config").arg(path).assert()
}

// ─────────────────────────────────────────────────────────────────
// Validation
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_minimal_config() {
    let fixture = ConfigFixture::with("[crew]\n");
    validate(fixture.path())
        .success()
        .stdout(contains("Configuration is valid"));
}

#[test]
fn test_valid_fixture() {
    validate(&common::valid_config_fixture()).success();
}

#[test]
fn test_fixture_parses() {
    let config = CrewConfig::from_file(&common::valid_config_fixture()).unwrap();
    assert_eq!(config.crew.system_dir, "/opt/filmeto/agent/crew/system");
    assert_eq!(config.crew.language, "zh_CN");
    assert_eq!(config.crew.importance, ImportanceMode::Dynamic);
    assert_eq!(config.souls.system_dir, "/opt/filmeto/agent/soul/system");
    assert_eq!(config.logging.level, "debug");
    assert!(!config.logging.json_format);
}

#[test]
fn test_invalid_fixture_names_bad_level() {
    validate(&common::invalid_config_fixture())
        .failure()
        .stderr(contains("loud"));
}

#[test]
fn test_rejected_configs() {
    let cases = [
        "[crew]\nlanguage = \"\"\n",
        "[crew]\nimportance = \"alphabetical\"\n",
        "[crew\nsystem_dir = \"/x\"\n",
    ];
    for content in cases {
        let fixture = ConfigFixture::with(content);
        validate(fixture.path()).failure();
    }
}

// ─────────────────────────────────────────────────────────────────
// config show
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_config_show_custom() {
    let fixture = ConfigFixture::with(
        r#"
[crew]
system_dir = "/srv/crew/templates"
language = "zh_CN"

[souls]
system_dir = "/srv/crew/souls"
"#,
    );

    show(fixture.path())
        .success()
        .stdout(contains("/srv/crew/templates"))
        .stdout(contains("zh_CN"))
        .stdout(contains("/srv/crew/souls"));
}

#[test]
fn test_tilde_expansion() {
    let fixture = ConfigFixture::with("[crew]\nsystem_dir = \"~/filmeto/crew\"\n\n[souls]\nsystem_dir = \"~/filmeto/souls\"\n");

    let output = show(fixture.path()).success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout).into_owned();
    assert!(!stdout.contains("system_dir = \"~"));
}

// ─────────────────────────────────────────────────────────────────
// config init
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_config_init_writes_valid_file() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("nested").join("crew.toml");

    config_cmd("init")
        .arg("--path")
        .arg(&target)
        .assert()
        .success()
        .stdout(contains("Configuration file created"));

    assert!(target.is_file());
    validate(&target).success();
}

#[test]
fn test_config_init_keeps_existing_without_force() {
    let fixture = ConfigFixture::with("[crew]\nlanguage = \"old\"\n");

    config_cmd("init")
        .arg("--path")
        .arg(fixture.path())
        .assert()
        .failure()
        .stderr(contains("already exists"));
    assert!(fs::read_to_string(fixture.path()).unwrap().contains("\"old\""));

    config_cmd("init")
        .arg("--path")
        .arg(fixture.path())
        .arg("--force")
        .assert()
        .success();
    assert!(!fs::read_to_string(fixture.path()).unwrap().contains("\"old\""));
}

// ─────────────────────────────────────────────────────────────────
// Environment overrides
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_env_beats_file() {
    let fixture = ConfigFixture::with("[crew]\nlanguage = \"en_US\"\n");

    config_cmd("show")
        .arg("--config")
        .arg(fixture.path())
        .env("FILMETO_LANGUAGE", "ja_JP")
        .assert()
        .success()
        .stdout(contains("ja_JP"));
}

#[test]
fn test_env_override_importance() {
    let fixture = ConfigFixture::with("[crew]\n");

    config_cmd("show")
        .arg("--config")
        .arg(fixture.path())
        .env("FILMETO_IMPORTANCE", "dynamic")
        .env("FILMETO_CREW_SYSTEM_DIR", "/env/templates")
        .assert()
        .success()
        .stdout(contains("dynamic"))
        .stdout(contains("/env/templates"));
}

#[test]
fn test_config_path_from_env() {
    let fixture = ConfigFixture::with("[crew]\nsystem_dir = \"/from/env/path\"\n");

    config_cmd("show")
        .env("FILMETO_CONFIG", fixture.path())
        .assert()
        .success()
        .stdout(contains("/from/env/path"));
}
