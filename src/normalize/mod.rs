//! Route source normalization.
//!
//! Rewrites bracket parameters (`/author/[authorId]`) into colon parameters
//! (`/author/:authorId`) in the route source text. The rewrite is textual:
//! every `[` + non-`]` characters + `]` in the file is replaced, so the
//! route source must not use YAML flow sequences.
//!
//! # Design Decisions
//! - Pure text transform; pattern validation belongs to table construction
//! - Applied until no bracket group remains, so a second run is a no-op
//! - Read fully, write to a sibling temp file, rename over the source
//! - Unchanged input is left untouched on disk

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use thiserror::Error;

static BRACKET_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]").expect("bracket pattern is valid"));

/// Output of [`normalize_text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub text: String,
    /// Captured parameter names, in the order they were rewritten.
    pub converted: Vec<String>,
}

impl Normalized {
    pub fn changed(&self) -> bool {
        !self.converted.is_empty()
    }
}

/// Replace every bracket parameter with its colon form.
pub fn normalize_text(input: &str) -> Normalized {
    let mut text = input.to_string();
    let mut converted = Vec::new();

    // Nested groups like `[[a]]` expose a new outer group after each pass.
    while BRACKET_PARAM.is_match(&text) {
        text = BRACKET_PARAM
            .replace_all(&text, |caps: &Captures<'_>| {
                converted.push(caps[1].to_string());
                format!(":{}", &caps[1])
            })
            .into_owned();
    }

    Normalized { text, converted }
}

/// File access failure while normalizing.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What [`normalize_file`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeReport {
    pub path: PathBuf,
    pub converted: Vec<String>,
    /// False when the file was already normalized (or in check mode).
    pub written: bool,
}

impl NormalizeReport {
    /// Converted parameter names with their occurrence counts, sorted by name.
    pub fn counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for name in &self.converted {
            *counts.entry(name.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Human-readable summary for the operator.
    pub fn summary(&self) -> String {
        if self.converted.is_empty() {
            return format!("{}: already normalized", self.path.display());
        }
        let verb = if self.written { "converted" } else { "would convert" };
        let mut out = format!(
            "{}: {} {} parameter segment(s)",
            self.path.display(),
            verb,
            self.converted.len()
        );
        for (name, count) in self.counts() {
            out.push_str(&format!("\n  [{}] -> :{} (x{})", name, name, count));
        }
        out
    }
}

/// Normalize the route source at `path` in place.
///
/// With `check` set the file is never written; the report says what would change.
pub fn normalize_file(path: &Path, check: bool) -> Result<NormalizeReport, NormalizeError> {
    let original = fs::read_to_string(path).map_err(|source| NormalizeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let normalized = normalize_text(&original);

    let written = normalized.changed() && !check;
    if written {
        replace_contents(path, &normalized.text).map_err(|source| NormalizeError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = ?path, converted = normalized.converted.len(), "Route source normalized");
    }

    Ok(NormalizeReport {
        path: path.to_path_buf(),
        converted: normalized.converted,
        written,
    })
}

fn replace_contents(path: &Path, contents: &str) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().sync_all()?;
    if let Ok(meta) = fs::metadata(path) {
        fs::set_permissions(tmp.path(), meta.permissions())?;
    }
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
