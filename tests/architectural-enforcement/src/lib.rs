//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - No sleep() calls in production code
//! - The core schedules on its logical timeline, never on the wall clock
//!
//! The scanning helpers live here so each test file stays a list of rules.

use std::fs;
use std::path::{Path, PathBuf};

/// A forbidden call found in production code
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// File containing the call
    pub path: PathBuf,
    /// 1-based line number
    pub line_number: usize,
    /// The offending line, trimmed
    pub line: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} - {}", self.path.display(), self.line_number, self.line)
    }
}

/// Workspace root, resolved from this package's manifest directory
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..")
}

/// Scan every `.rs` file under `dir` (relative to the workspace root) for
/// lines containing any of `patterns`
///
/// Files whose path ends with one of `allowed_files` are skipped. Scanning of
/// a file stops at its `#[cfg(test)]` module.
#[must_use]
pub fn find_violations(dir: &str, patterns: &[&str], allowed_files: &[&str]) -> Vec<Violation> {
    let root = workspace_root().join(dir);
    let mut violations = Vec::new();

    for entry in walkdir::WalkDir::new(&root)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some("rs") {
            continue;
        }
        if allowed_files.iter().any(|allowed| path.ends_with(allowed)) {
            continue;
        }
        check_file(path, patterns, &mut violations);
    }

    violations
}

/// Whether `dir` (relative to the workspace root) exists
#[must_use]
pub fn source_dir_exists(dir: &str) -> bool {
    workspace_root().join(dir).is_dir()
}

fn check_file(path: &Path, patterns: &[&str], violations: &mut Vec<Violation>) {
    let Ok(content) = fs::read_to_string(path) else {
        return;
    };

    for (idx, line) in content.lines().enumerate() {
        if line.trim_start().starts_with("#[cfg(test)]") {
            break;
        }

        // Skip comments
        let code_part = line.split("//").next().unwrap_or(line);

        if patterns.iter().any(|p| code_part.contains(p)) {
            violations.push(Violation {
                path: path.to_path_buf(),
                line_number: idx + 1,
                line: line.trim().to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_root_has_manifest() {
        assert!(workspace_root().join("Cargo.toml").is_file());
    }

    #[test]
    fn test_missing_dir_has_no_violations() {
        assert!(find_violations("does/not/exist", &["sleep("], &[]).is_empty());
    }
}
