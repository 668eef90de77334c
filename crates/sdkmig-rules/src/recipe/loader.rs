//! Recipe loader
//!
//! Load recipe tables from strings or files and merge them over the
//! embedded defaults.

use std::fs;
use std::path::{Path, PathBuf};

use super::schema::RecipeTables;
use crate::registry::ConfigError;

/// Parse and validate recipe tables from YAML text
pub fn load_tables_from_string(yaml: &str) -> Result<RecipeTables, ConfigError> {
    let tables: RecipeTables = if yaml.trim().is_empty() {
        RecipeTables::default()
    } else {
        serde_yaml::from_str(yaml)?
    };
    tables.validate()?;
    Ok(tables)
}

/// Load recipe tables from a file
pub fn load_tables_from_file(path: &Path) -> Result<RecipeTables, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_tables_from_string(&content)
}

/// The embedded defaults followed by each user recipe file, in order
pub fn load_recipes(files: &[PathBuf]) -> Result<RecipeTables, ConfigError> {
    let mut tables = RecipeTables::builtin()?;
    for path in files {
        tables.merge(load_tables_from_file(path)?);
    }
    Ok(tables)
}
