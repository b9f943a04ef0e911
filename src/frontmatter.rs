//! Markdown files with a YAML metadata block.
//!
//! Role templates, crew members and souls all share this on-disk shape:
//!
//! ```text
//! ---
//! name: director
//! skills: [storyboard, shot_list]
//! ---
//! Free-form Markdown body (the system prompt).
//! ```
//!
//! A file without a leading `---` line has no metadata. Malformed YAML is
//! never an error here: the metadata is treated as empty so one broken file
//! cannot abort a directory scan.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use tracing::{debug, warn};

use crate::error::{Error, Result};

const DELIMITER: &str = "---";

/// A parsed Markdown-with-metadata document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    /// Metadata mapping, in file order. Empty when absent or malformed.
    pub metadata: Mapping,

    /// Everything after the closing delimiter, untouched (usually starts
    /// with a newline). The whole content when there is no frontmatter.
    pub body: String,

    /// Whether a delimited block was found (even if its YAML was invalid).
    pub has_frontmatter: bool,
}

impl Frontmatter {
    /// Body with surrounding whitespace removed.
    pub fn prompt(&self) -> &str {
        self.body.trim()
    }
}

/// Split `content` into metadata and body.
pub fn parse(content: &str) -> Frontmatter {
    let Some(rest) = strip_opening(content) else {
        return Frontmatter {
            metadata: Mapping::new(),
            body: content.to_string(),
            has_frontmatter: false,
        };
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(|c| c == '\r' || c == '\n') == DELIMITER {
            let yaml = &rest[..offset];
            let body = &rest[offset + DELIMITER.len()..];
            return Frontmatter {
                metadata: parse_mapping(yaml),
                body: body.to_string(),
                has_frontmatter: true,
            };
        }
        offset += line.len();
    }

    // Opening delimiter without a closing one
    Frontmatter {
        metadata: Mapping::new(),
        body: content.to_string(),
        has_frontmatter: false,
    }
}

fn strip_opening(content: &str) -> Option<&str> {
    let newline = content.find('\n')?;
    let first = content[..newline].trim_end_matches('\r');
    (first == DELIMITER).then(|| &content[newline + 1..])
}

fn parse_mapping(yaml: &str) -> Mapping {
    if yaml.trim().is_empty() {
        return Mapping::new();
    }
    match serde_yaml::from_str::<Value>(yaml) {
        Ok(Value::Mapping(map)) => map,
        Ok(Value::Null) => Mapping::new(),
        Ok(other) => {
            debug!(kind = ?value_kind(&other), "Frontmatter is not a mapping, ignoring");
            Mapping::new()
        }
        Err(e) => {
            warn!(error = %e, "Malformed YAML frontmatter, using defaults");
            Mapping::new()
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged",
    }
}

/// Render metadata and a raw body as `---\n<yaml>\n---<body>`.
pub fn render(metadata: &Mapping, body: &str) -> std::result::Result<String, serde_yaml::Error> {
    let yaml = serde_yaml::to_string(metadata)?;
    Ok(format!("{DELIMITER}\n{}\n{DELIMITER}{body}", yaml.trim_end()))
}

/// Read and parse a file.
pub fn read(path: &Path) -> Result<Frontmatter> {
    let content = fs::read_to_string(path).map_err(|e| Error::io_read(path, e))?;
    Ok(parse(&content))
}

/// Write metadata and a prompt to `path`, creating parent directories.
pub fn write(path: &Path, metadata: &Mapping, prompt: &str) -> Result<()> {
    let content = render(metadata, &format!("\n{prompt}")).map_err(|source| {
        Error::MetadataSerialize {
            path: path.to_path_buf(),
            source,
        }
    })?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io_write(parent, e))?;
    }
    fs::write(path, content).map_err(|e| Error::io_write(path, e))
}

/// Merge `updates` into the metadata of an existing file, optionally
/// replacing its prompt. Returns `false` if the file does not exist.
pub fn update(path: &Path, updates: &Mapping, prompt: Option<&str>) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }

    let mut current = read(path)?;
    for (key, value) in updates {
        current.metadata.insert(key.clone(), value.clone());
    }
    let prompt = prompt.unwrap_or_else(|| current.prompt());
    write(path, &current.metadata, prompt)?;
    Ok(true)
}

/// Regular file with an `.md` extension.
pub fn is_markdown(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == "md")
}

/// Markdown files directly inside `dir`, in directory-listing order.
///
/// The order is whatever the filesystem returns and may differ across
/// platforms. A missing directory yields an empty list.
pub fn list_markdown(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        debug!(path = %dir.display(), "Directory not found, nothing to list");
        return Vec::new();
    }
    match fs::read_dir(dir) {
        Ok(entries) => entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| is_markdown(path))
            .collect(),
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "Failed to list directory");
            Vec::new()
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Metadata accessors
// ─────────────────────────────────────────────────────────────────

/// String-ish value for `key`. Numbers and booleans are stringified.
pub fn get_string(metadata: &Mapping, key: &str) -> Option<String> {
    metadata.get(key).and_then(scalar_to_string)
}

/// Floating point value for `key`, accepting integers and numeric strings.
pub fn get_f64(metadata: &Mapping, key: &str) -> Option<f64> {
    match metadata.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Unsigned integer value for `key`, accepting numeric strings.
pub fn get_u32(metadata: &Mapping, key: &str) -> Option<u32> {
    match metadata.get(key)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// List value for `key`. A comma separated string is split; blank entries
/// are dropped.
pub fn get_list(metadata: &Mapping, key: &str) -> Vec<String> {
    match metadata.get(key) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Sequence(items)) => items
            .iter()
            .filter_map(scalar_to_string)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(other) => scalar_to_string(other)
            .map(|s| vec![s.trim().to_string()])
            .unwrap_or_default(),
    }
}

/// Nested string map for `key` (e.g. `display_names`).
pub fn get_string_map(metadata: &Mapping, key: &str) -> Vec<(String, String)> {
    match metadata.get(key) {
        Some(Value::Mapping(map)) => map
            .iter()
            .filter_map(|(k, v)| Some((scalar_to_string(k)?, scalar_to_string(v)?)))
            .collect(),
        _ => Vec::new(),
    }
}

/// Set a string value, keeping the key's position if it already exists.
pub fn set_string(metadata: &mut Mapping, key: &str, value: impl Into<String>) {
    metadata.insert(Value::String(key.to_string()), Value::String(value.into()));
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
