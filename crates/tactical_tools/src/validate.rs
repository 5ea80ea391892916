//! Data loading and validation.
//!
//! A data directory holds ship catalogue files (RON lists of
//! `ShipTemplate`) and combat rule files (a single `CombatConfig`, any file
//! whose name starts with `combat`).

use std::path::{Path, PathBuf};

use tactical_core::config::CombatConfig;
use tactical_core::data::ShipCatalogue;

use crate::error::{ToolError, ToolResult};

/// What a directory validation found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Catalogue files checked.
    pub catalogue_files: usize,
    /// Ship classes across all catalogue files.
    pub classes: usize,
    /// Combat rule files checked.
    pub config_files: usize,
}

fn read(path: &Path) -> ToolResult<String> {
    std::fs::read_to_string(path).map_err(|e| ToolError::io(path, e))
}

fn is_config_file(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s.starts_with("combat"))
}

fn ron_files(dir: &Path, out: &mut Vec<PathBuf>) -> ToolResult<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| ToolError::io(dir, e))?;
    for entry in entries {
        let path = entry.map_err(|e| ToolError::io(dir, e))?.path();
        if path.is_dir() {
            ron_files(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "ron") {
            out.push(path);
        }
    }
    Ok(())
}

/// Parse and validate combat rules from a file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, does not parse, or fails
/// validation.
pub fn load_config(path: &Path) -> ToolResult<CombatConfig> {
    let text = read(path)?;
    let config = CombatConfig::from_ron_str(&path.display().to_string(), &text)?;
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ToolError::Validation {
            path: path.display().to_string(),
            errors,
        });
    }
    Ok(config)
}

/// Built-in catalogue, plus the classes in `extra` if given.
///
/// # Errors
///
/// Returns an error if `extra` cannot be read or any template in it is invalid.
pub fn load_catalogue(extra: Option<&Path>) -> ToolResult<ShipCatalogue> {
    let mut catalogue = ShipCatalogue::with_builtin_classes();
    if let Some(path) = extra {
        let text = read(path)?;
        let added = catalogue.load_ron_str(&path.display().to_string(), &text)?;
        tracing::info!(path = %path.display(), added, "catalogue loaded");
    }
    Ok(catalogue)
}

/// Validate all RON data files in a directory, recursively.
///
/// # Errors
///
/// Returns the first file that fails to read, parse or validate.
pub fn validate_data_directory(path: &Path) -> ToolResult<ValidationReport> {
    let mut files = Vec::new();
    ron_files(path, &mut files)?;
    files.sort();

    let mut report = ValidationReport::default();
    for file in &files {
        if is_config_file(file) {
            load_config(file)?;
            report.config_files += 1;
        } else {
            let text = read(file)?;
            let classes = ShipCatalogue::new().load_ron_str(&file.display().to_string(), &text)?;
            report.catalogue_files += 1;
            report.classes += classes;
        }
        tracing::debug!(file = %file.display(), "validated");
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tactical-tools-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(dir.join("ships")).unwrap();
        dir
    }

    #[test]
    fn test_validate_directory() {
        let dir = scratch_dir("valid");
        std::fs::write(dir.join("combat.ron"), "(max_engagement_range: 10)").unwrap();
        std::fs::write(
            dir.join("ships").join("extra.ron"),
            r#"[(class: "Nova"), (class: "Intrepid", impulse_speed: 8)]"#,
        )
        .unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let report = validate_data_directory(&dir).unwrap();
        assert_eq!(
            report,
            ValidationReport {
                catalogue_files: 1,
                classes: 2,
                config_files: 1,
            }
        );
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_invalid_config_rejected() {
        let dir = scratch_dir("invalid");
        let path = dir.join("combat.ron");
        std::fs::write(&path, "(energy_hit_chance: 1.5)").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ToolError::Validation { .. }));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_directory() {
        let err = validate_data_directory(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, ToolError::Io { .. }));
    }

    #[test]
    fn test_catalogue_with_extra_classes() {
        let dir = scratch_dir("catalogue");
        let path = dir.join("ships").join("extra.ron");
        std::fs::write(&path, r#"[(class: "Nova")]"#).unwrap();
        let catalogue = load_catalogue(Some(path.as_path())).unwrap();
        assert_eq!(catalogue.len(), 6);
        assert!(catalogue.get("Nova").is_some());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
