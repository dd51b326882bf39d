//! Data validation utilities.

use std::fs;
use std::path::{Path, PathBuf};

use cellforge_core::error::CellforgeError;
use serde::Serialize;

use crate::error::{Result, ToolError};
use crate::load::{load_config, load_policy};

/// What a RON file is expected to contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FileKind {
    /// A `CellforgeConfig`.
    Config,
    /// A sandbox `SubstitutionPolicy`.
    Policy,
}

/// A file that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    /// Offending file.
    pub path: String,
    /// What was wrong.
    pub message: String,
}

/// Result of validating one or more files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Files checked.
    pub checked: usize,
    /// Files that failed.
    pub failures: Vec<ValidationFailure>,
}

impl ValidationReport {
    /// Whether every checked file passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Validate one RON file.
pub fn validate_file(path: &Path, kind: FileKind) -> cellforge_core::error::Result<()> {
    match kind {
        FileKind::Config => load_config(path).map(|_| ()),
        FileKind::Policy => load_policy(path).map(|_| ()),
    }
}

fn ron_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let io = |e: std::io::Error| CellforgeError::Io {
        path: dir.display().to_string(),
        message: e.to_string(),
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io)? {
        let path = entry.map_err(io)?.path();
        if path.extension().is_some_and(|ext| ext == "ron") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Validate a RON file, or every RON file directly inside a directory.
///
/// Individual file failures are collected in the report; only an unreadable
/// directory or an unsupported path is an error.
pub fn validate_path(path: &Path, kind: FileKind) -> Result<ValidationReport> {
    let files = if path.is_dir() {
        ron_files(path)?
    } else if path.extension().is_some_and(|ext| ext == "ron") {
        vec![path.to_path_buf()]
    } else {
        return Err(ToolError::UnsupportedPath(path.display().to_string()));
    };

    let mut report = ValidationReport::default();
    for file in files {
        report.checked += 1;
        match validate_file(&file, kind) {
            Ok(()) => tracing::debug!(path = %file.display(), "Valid"),
            Err(e) => {
                tracing::warn!(path = %file.display(), "Validation failed: {e}");
                report.failures.push(ValidationFailure {
                    path: file.display().to_string(),
                    message: e.to_string(),
                });
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("data")
    }

    #[test]
    fn test_shipped_config_is_valid() {
        let report = validate_path(&data_dir().join("cellforge.ron"), FileKind::Config).unwrap();
        assert_eq!(report.checked, 1);
        assert!(report.passed(), "{:?}", report.failures);
    }

    #[test]
    fn test_shipped_policies_are_valid() {
        let report = validate_path(&data_dir().join("policies"), FileKind::Policy).unwrap();
        assert!(report.checked >= 1);
        assert!(report.passed(), "{:?}", report.failures);
    }

    #[test]
    fn test_config_is_not_a_policy() {
        let report = validate_path(&data_dir().join("cellforge.ron"), FileKind::Policy).unwrap();
        assert!(!report.passed());
    }

    #[test]
    fn test_unsupported_path() {
        let err = validate_path(Path::new("Cargo.toml"), FileKind::Config).unwrap_err();
        assert!(matches!(err, ToolError::UnsupportedPath(_)));
    }
}
