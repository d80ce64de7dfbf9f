//! Generator configuration.
//!
//! Defines the YAML-serializable configuration that controls which tables
//! are generated and how the generated source is shaped. Every key is
//! optional; missing keys take the values of [`GeneratorConfig::default`].
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! reserved_prefix: sqlite_
//! exclude:
//!   - migrations
//! runtime_crate: datatier_sqlite
//! emit_module_index: true
//! format: true
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::emitter::EmitOptions;
use crate::error::Result;

/// Top-level generator configuration.
///
/// Loaded from a YAML file (typically `datatier.yml` next to the database)
/// and overridden by command-line flags.
///
/// # Examples
///
/// ```no_run
/// use datatier_codegen::GeneratorConfig;
///
/// let config = GeneratorConfig::load("datatier.yml").unwrap();
/// if config.is_excluded("Migrations") {
///     println!("migrations table is skipped");
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Configuration format version (e.g., `"1.0"`).
    pub version: String,
    /// Tables whose name contains this text (ignoring case) are never generated.
    pub reserved_prefix: String,
    /// Tables to skip, matched ignoring case.
    pub exclude: Vec<String>,
    /// Path of the runtime crate as seen from the generated code.
    pub runtime_crate: String,
    /// Whether to write a `mod.rs` declaring every generated module.
    pub emit_module_index: bool,
    /// Whether to run `rustfmt` over the generated source.
    pub format: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            reserved_prefix: datatier_core::DEFAULT_RESERVED_PREFIX.to_string(),
            exclude: Vec::new(),
            runtime_crate: "datatier_sqlite".to_string(),
            emit_module_index: true,
            format: true,
        }
    }
}

impl GeneratorConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::CodegenError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::CodegenError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::CodegenError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::CodegenError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Returns `true` if `table` is in the exclusion list.
    ///
    /// # Examples
    ///
    /// ```
    /// # let config: datatier_codegen::GeneratorConfig =
    /// #     serde_yaml::from_str("exclude: [audit_log]").unwrap();
    /// assert!(config.is_excluded("Audit_log"));
    /// assert!(!config.is_excluded("Albums"));
    /// ```
    pub fn is_excluded(&self, table: &str) -> bool {
        self.exclude.iter().any(|t| t.eq_ignore_ascii_case(table))
    }

    /// Emission settings derived from this configuration.
    pub fn emit_options(&self) -> EmitOptions {
        EmitOptions {
            runtime_crate: self.runtime_crate.clone(),
            format: self.format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
version: "1.0"
reserved_prefix: tmp_
exclude:
  - migrations
  - Audit
runtime_crate: crate::runtime
emit_module_index: false
format: false
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let config: GeneratorConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.reserved_prefix, "tmp_");
        assert_eq!(config.exclude, vec!["migrations", "Audit"]);
        assert_eq!(config.runtime_crate, "crate::runtime");
        assert!(!config.emit_module_index);
        assert!(!config.format);
    }

    #[test]
    fn test_missing_keys_take_defaults() {
        let config: GeneratorConfig = serde_yaml::from_str("exclude: [notes]").unwrap();
        assert_eq!(config.reserved_prefix, "sqlite_");
        assert_eq!(config.runtime_crate, "datatier_sqlite");
        assert!(config.emit_module_index);
        assert!(config.format);
        assert_eq!(config.exclude, vec!["notes"]);
    }

    #[test]
    fn test_is_excluded_ignores_case() {
        let config: GeneratorConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert!(config.is_excluded("Migrations"));
        assert!(config.is_excluded("audit"));
        assert!(!config.is_excluded("Albums"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("datatier.yml");
        let mut config = GeneratorConfig::default();
        config.exclude.push("Logs".to_string());

        config.save(&path).unwrap();
        let loaded = GeneratorConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let err = GeneratorConfig::load("/nonexistent/datatier.yml").unwrap_err();
        assert!(matches!(err, crate::CodegenError::IoError(_)));
    }

    #[test]
    fn test_emit_options_follow_config() {
        let config: GeneratorConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        let options = config.emit_options();
        assert_eq!(options.runtime_crate, "crate::runtime");
        assert!(!options.format);
    }
}
