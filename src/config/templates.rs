//! Default template loading from templates.toml
//!
//! The templates defined here seed the database on first run, so a fresh
//! installation starts with a few reusable lists.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire templates.toml file
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Template lists to seed
    #[serde(default)]
    pub templates: Vec<TemplateConfig>,
}

/// A single template list
#[derive(Debug, Deserialize, Clone)]
pub struct TemplateConfig {
    /// Name of the list
    pub name: String,
    /// `"packing"` or `"task"`
    #[serde(default = "default_list_type")]
    pub list_type: String,
    /// Whether the list belongs to the day-of rollup
    #[serde(default)]
    pub is_day_of: bool,
    /// Whether materialized counts follow the trip length
    #[serde(default)]
    pub count_as_days: bool,
    /// Items on the template
    #[serde(default)]
    pub items: Vec<TemplateItemConfig>,
}

/// A single item on a template list
#[derive(Debug, Deserialize, Clone)]
pub struct TemplateItemConfig {
    /// Item name
    pub name: String,
    /// Informational category
    #[serde(default)]
    pub category: String,
    /// How many to pack
    #[serde(default = "default_count")]
    pub count: i32,
}

fn default_list_type() -> String {
    "packing".to_string()
}

const fn default_count() -> i32 {
    1
}

/// Parses template configuration from TOML text.
///
/// # Errors
/// Returns [`Error::Config`] when the TOML is invalid or required fields are missing.
pub fn parse_config(contents: &str) -> Result<Config> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse templates config: {e}"),
    })
}

/// Loads template configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path_ref = path.as_ref();
    tracing::debug!("Loading templates from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read templates file {path_ref:?}: {e}"),
    })?;
    parse_config(&contents)
}

/// Loads templates from `TEMPLATES_PATH`, or `./templates.toml` when unset.
///
/// A missing file is not an error; it yields an empty configuration.
pub fn load_default_config() -> Result<Config> {
    let path = std::env::var("TEMPLATES_PATH").unwrap_or_else(|_| "templates.toml".to_string());
    if !Path::new(&path).exists() {
        tracing::info!("No templates file at {}, skipping seed data", path);
        return Ok(Config {
            templates: Vec::new(),
        });
    }
    load_config(path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_template_config() {
        let toml_str = r#"
            [[templates]]
            name = "Clothes"
            count_as_days = true

            [[templates.items]]
            name = "Socks"
            category = "Clothing"

            [[templates.items]]
            name = "Jacket"
            category = "Clothing"
            count = 1

            [[templates]]
            name = "Before leaving"
            list_type = "task"
            is_day_of = true

            [[templates.items]]
            name = "Take out trash"
        "#;

        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.templates.len(), 2);

        let clothes = &config.templates[0];
        assert_eq!(clothes.list_type, "packing");
        assert!(clothes.count_as_days);
        assert!(!clothes.is_day_of);
        assert_eq!(clothes.items.len(), 2);
        assert_eq!(clothes.items[0].count, 1);

        let chores = &config.templates[1];
        assert_eq!(chores.list_type, "task");
        assert!(chores.is_day_of);
        assert_eq!(chores.items[0].category, "");
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = parse_config("[[templates]]\nlist_type = 3");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_empty_config() {
        let config = parse_config("").unwrap();
        assert!(config.templates.is_empty());
    }

    #[test]
    fn test_bundled_templates_parse() {
        let config = parse_config(include_str!("../../templates.toml")).unwrap();
        assert!(!config.templates.is_empty());
        assert!(config.templates.iter().all(|t| !t.items.is_empty()));
    }
}
