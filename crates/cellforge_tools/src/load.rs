//! RON file loading for configs and substitution policies.

use std::fs;
use std::path::Path;

use cellforge_core::config::CellforgeConfig;
use cellforge_core::error::{CellforgeError, Result};
use cellforge_core::sandbox::MaterialId;
use cellforge_core::substitution::SubstitutionPolicy;

/// Read a whole file as text.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| CellforgeError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Load and validate a [`CellforgeConfig`].
pub fn load_config(path: &Path) -> Result<CellforgeConfig> {
    let text = read_text(path)?;
    let config = CellforgeConfig::from_ron_str(&text, &path.display().to_string())?;
    tracing::debug!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// Parse and validate a sandbox substitution policy.
pub fn parse_policy(text: &str, source: &str) -> Result<SubstitutionPolicy<MaterialId>> {
    let policy: SubstitutionPolicy<MaterialId> = ron::from_str(text).map_err(|e| CellforgeError::ConfigParse {
        path: source.to_string(),
        message: e.to_string(),
    })?;
    policy.validate()?;
    Ok(policy)
}

/// Load and validate a sandbox substitution policy.
pub fn load_policy(path: &Path) -> Result<SubstitutionPolicy<MaterialId>> {
    let text = read_text(path)?;
    let policy = parse_policy(&text, &path.display().to_string())?;
    tracing::debug!(path = %path.display(), depth = policy.depth(), "Loaded policy");
    Ok(policy)
}
