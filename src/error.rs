//! Errors raised by crew resolution and the `filmeto-crew` binary.
//!
//! Resolution itself is forgiving: a missing template directory, malformed
//! frontmatter or an unreadable member file is logged and skipped. The
//! variants below are the failures that abort a call. Each maps to a stable
//! `E<nnn>` code and a process exit code so scripts can tell them apart.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Broad failure class; decides the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Config,
    Filesystem,
    Crew,
}

impl ErrorCategory {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorCategory::Config => 10,
            ErrorCategory::Filesystem => 20,
            ErrorCategory::Crew => 30,
        }
    }
}

/// Stable numeric code, printed as `E<nnn>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    ConfigMissing = 100,
    ConfigSyntax = 101,
    ConfigInvalid = 102,

    ReadFailed = 200,
    WriteFailed = 201,
    PermissionDenied = 202,
    PathMissing = 203,

    MemberNotFound = 300,
    SoulNotFound = 301,
    MetadataSerialize = 302,
    UnknownCrewTitle = 304,
}

impl ErrorCode {
    pub fn category(self) -> ErrorCategory {
        match self as u16 {
            100..=199 => ErrorCategory::Config,
            200..=299 => ErrorCategory::Filesystem,
            _ => ErrorCategory::Crew,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", *self as u16)
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },

    /// A config value failed validation; `field` is the dotted key
    #[error("Invalid configuration: {message}")]
    ConfigValidation { message: String, field: Option<String> },

    /// Setup failure outside the config file (logging, config init)
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cannot read {path}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot write {path}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("Cannot render configuration: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("Cannot render JSON output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Crew member '{name}' not found in project {project}")]
    MemberNotFound { name: String, project: String },

    #[error("Soul not found: {name}")]
    SoulNotFound { name: String },

    /// Frontmatter metadata could not be rendered back to YAML
    #[error("Cannot render frontmatter for {path}")]
    MetadataSerialize {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Unknown crew title: {title}")]
    UnknownCrewTitle { title: String },
}

impl Error {
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Error::ConfigNotFound { path: path.into() }
    }

    pub fn config_parse(message: impl Into<String>, source: Option<toml::de::Error>) -> Self {
        Error::ConfigParse {
            message: message.into(),
            source,
        }
    }

    pub fn config_field_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub fn io_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::IoRead {
            path: path.into(),
            source,
        }
    }

    pub fn io_write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::IoWrite {
            path: path.into(),
            source,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigNotFound { .. } => ErrorCode::ConfigMissing,
            Error::ConfigParse { .. } | Error::Toml(_) => ErrorCode::ConfigSyntax,
            Error::ConfigValidation { .. } | Error::Config(_) => ErrorCode::ConfigInvalid,
            Error::IoRead { source, .. } => io_code(source, ErrorCode::ReadFailed),
            Error::IoWrite { source, .. } => io_code(source, ErrorCode::WriteFailed),
            Error::Io(source) => io_code(source, ErrorCode::ReadFailed),
            Error::MemberNotFound { .. } => ErrorCode::MemberNotFound,
            Error::SoulNotFound { .. } => ErrorCode::SoulNotFound,
            Error::MetadataSerialize { .. } | Error::Json(_) => ErrorCode::MetadataSerialize,
            Error::UnknownCrewTitle { .. } => ErrorCode::UnknownCrewTitle,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.code().category().exit_code()
    }

    /// Next step to suggest to the user, if there is an obvious one.
    pub fn hint(&self) -> Option<&'static str> {
        let hint = match self {
            Error::ConfigNotFound { .. } => "Create one with 'filmeto-crew config init'.",
            Error::ConfigParse { .. } => "Fix the TOML syntax; 'filmeto-crew config show' prints the effective settings.",
            Error::ConfigValidation { .. } => "Fix the value in the configuration file or the FILMETO_* variable overriding it.",
            Error::IoWrite { .. } => "Check that the project directory is writable.",
            Error::MemberNotFound { .. } => "Run 'filmeto-crew list <PROJECT>' to see the crew.",
            Error::SoulNotFound { .. } => "Run 'filmeto-crew souls' to see the available souls.",
            Error::UnknownCrewTitle { .. } => "Run 'filmeto-crew titles' to see the known crew titles.",
            _ => return None,
        };
        Some(hint)
    }

    /// `Error [E301]: ...` in red, followed by the hint, for stderr.
    pub fn format_for_terminal(&self) -> String {
        let mut out = format!("\x1b[31mError [{}]\x1b[0m: {}\n", self.code(), self);

        let mut cause = std::error::Error::source(self);
        while let Some(inner) = cause {
            out.push_str(&format!("  caused by: {inner}\n"));
            cause = std::error::Error::source(inner);
        }

        if let Some(hint) = self.hint() {
            out.push_str(&format!("\x1b[33mHint\x1b[0m: {hint}\n"));
        }
        out
    }
}

fn io_code(source: &io::Error, fallback: ErrorCode) -> ErrorCode {
    match source.kind() {
        io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
        io::ErrorKind::NotFound => ErrorCode::PathMissing,
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_display() {
        assert_eq!(ErrorCode::ConfigMissing.to_string(), "E100");
        assert_eq!(ErrorCode::MemberNotFound.to_string(), "E300");
        assert_eq!(ErrorCode::UnknownCrewTitle.to_string(), "E304");
    }

    #[test]
    fn test_exit_codes_by_category() {
        assert_eq!(Error::config_not_found("/x.toml").exit_code(), 10);
        assert_eq!(Error::Config("logging".into()).exit_code(), 10);
        assert_eq!(
            Error::io_write("/p", io::Error::new(io::ErrorKind::Other, "full")).exit_code(),
            20
        );
        assert_eq!(Error::SoulNotFound { name: "x".into() }.exit_code(), 30);
    }

    #[test]
    fn test_io_kind_refines_code() {
        let denied = Error::io_write("/ro/crew.md", io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        assert_eq!(denied.code(), ErrorCode::PermissionDenied);

        let missing: Error = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert_eq!(missing.code(), ErrorCode::PathMissing);

        let other = Error::io_read("/x", io::Error::new(io::ErrorKind::InvalidData, "utf8"));
        assert_eq!(other.code(), ErrorCode::ReadFailed);
    }

    #[test]
    fn test_member_not_found_message() {
        let err = Error::MemberNotFound {
            name: "director".to_string(),
            project: "/tmp/demo".to_string(),
        };
        assert_eq!(err.to_string(), "Crew member 'director' not found in project /tmp/demo");
        assert!(err.hint().is_some());
    }

    #[test]
    fn test_terminal_output_includes_cause_and_hint() {
        let err = Error::io_write("/p/agent", io::Error::new(io::ErrorKind::Other, "disk full"));
        let out = err.format_for_terminal();
        assert!(out.contains("E201"));
        assert!(out.contains("Cannot write /p/agent"));
        assert!(out.contains("caused by: disk full"));
        assert!(out.contains("Hint"));

        let out = Error::Toml(serde::ser::Error::custom("bad")).format_for_terminal();
        assert!(!out.contains("Hint"));
    }
}
