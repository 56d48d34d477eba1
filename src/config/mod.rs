//! Configuration for `sri.toml` and the per-build plugin settings.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── error      # ConfigError
//! ├── util       # Config file lookup
//! └── mod.rs     # SriConfig, PluginConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section    | Purpose                                           |
//! |------------|---------------------------------------------------|
//! | `base`     | Prefix stripped from references before lookup     |
//! | `[build]`  | Output directory and entry HTML files             |
//! | `[fetch]`  | HTTP client settings for remote resources         |
//!
//! The file is optional: without it every field takes its default.

mod error;
mod util;

pub use error::ConfigError;
use util::find_config_file;

use crate::cli::InjectArgs;
use crate::log;
use crate::plugin::ResolvedConfig;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Default config file name, searched upward from the working directory.
pub const CONFIG_FILE: &str = "sri.toml";

/// Default base path when none is configured.
pub const DEFAULT_BASE: &str = "/";

// ============================================================================
// plugin configuration
// ============================================================================

/// Settings handed to each transform call.
///
/// Built fresh from the host's resolved configuration for every build and
/// never merged with a previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginConfig {
    /// Prefix stripped from `src`/`href` values to form bundle keys.
    /// Empty means nothing is stripped.
    pub base: String,
}

impl PluginConfig {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE)
    }
}

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing sri.toml
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SriConfig {
    /// Absolute path to the config file, if one was loaded (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Project root directory - parent of config file or cwd (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Base path the build output is served under
    pub base: String,

    /// Build output settings
    pub build: BuildConfig,

    /// Remote fetch settings
    pub fetch: FetchConfig,
}

impl Default for SriConfig {
    fn default() -> Self {
        Self {
            config_path: None,
            root: PathBuf::new(),
            base: DEFAULT_BASE.to_string(),
            build: BuildConfig::default(),
            fetch: FetchConfig::default(),
        }
    }
}

/// `[build]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Build output directory (relative to project root)
    pub output: PathBuf,

    /// Entry HTML files (relative to the output directory)
    pub entries: Vec<PathBuf>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("dist"),
            entries: vec![PathBuf::from("index.html")],
        }
    }
}

/// `[fetch]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-request timeout in seconds
    pub timeout: u64,

    /// User-Agent header sent with remote requests
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            user_agent: concat!("html-sri/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl SriConfig {
    /// Load configuration.
    ///
    /// An explicit `config` path must exist. Otherwise `sri.toml` is searched
    /// upward from `cwd`, falling back to defaults rooted at `cwd`.
    pub fn load(config: Option<&Path>, cwd: &Path) -> Result<Self, ConfigError> {
        let found = match config {
            Some(path) => {
                let path = cwd.join(path);
                if !path.exists() {
                    return Err(ConfigError::NotFound(path));
                }
                Some(path)
            }
            None => find_config_file(cwd, Path::new(CONFIG_FILE)),
        };

        let mut config = match &found {
            Some(path) => Self::from_path(path)?,
            None => Self::default(),
        };

        config.root = found
            .as_deref()
            .and_then(Path::parent)
            .map_or_else(|| cwd.to_path_buf(), Path::to_path_buf);
        config.config_path = found;
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let (config, ignored) = Self::parse_with_ignored(content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, Path::new(CONFIG_FILE));
        }
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring: {}", display_path, fields.join(", "));
    }

    /// Reject values that can never work.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch.timeout == 0 {
            return Err(ConfigError::Validation(
                "fetch.timeout must be at least 1 second".to_string(),
            ));
        }
        if self.build.entries.is_empty() {
            return Err(ConfigError::Validation(
                "build.entries must name at least one HTML file".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply `inject` command-line overrides on top of file values.
    pub fn apply_inject_args(&mut self, args: &InjectArgs) {
        if let Some(base) = &args.base {
            self.base.clone_from(base);
        }
        if let Some(output) = &args.output {
            self.build.output.clone_from(output);
        }
        if !args.entries.is_empty() {
            self.build.entries.clone_from(&args.entries);
        }
    }

    /// Absolute build output directory.
    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.build.output)
    }

    /// Absolute entry HTML paths.
    pub fn entry_paths(&self) -> Vec<PathBuf> {
        let output = self.output_dir();
        self.build
            .entries
            .iter()
            .map(|entry| output.join(entry))
            .collect()
    }

    /// The configuration object handed to the plugin's config hook.
    pub fn resolved(&self) -> ResolvedConfig {
        ResolvedConfig {
            base: Some(self.base.clone()),
        }
    }
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = SriConfig::default();
        assert_eq!(config.base, "/");
        assert_eq!(config.build.output, PathBuf::from("dist"));
        assert_eq!(config.build.entries, vec![PathBuf::from("index.html")]);
        assert_eq!(config.fetch.timeout, 30);
        assert!(config.fetch.user_agent.starts_with("html-sri/"));
        assert_eq!(PluginConfig::default().base, "/");
    }

    #[test]
    fn test_from_str() {
        let config = SriConfig::from_str(
            r#"
            base = "/local/"

            [build]
            output = "public"
            entries = ["index.html", "admin/index.html"]

            [fetch]
            timeout = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.base, "/local/");
        assert_eq!(config.build.output, PathBuf::from("public"));
        assert_eq!(config.build.entries.len(), 2);
        assert_eq!(config.fetch.timeout, 5);
        // Unset fields keep their defaults
        assert!(config.fetch.user_agent.starts_with("html-sri/"));
    }

    #[test]
    fn test_empty_base_is_kept() {
        let config = SriConfig::from_str(r#"base = """#).unwrap();
        assert_eq!(config.base, "");
    }

    #[test]
    fn test_unknown_fields_are_collected() {
        let (config, ignored) =
            SriConfig::parse_with_ignored("base = \"/\"\nhash = \"sha512\"\n[build]\nminify = true\n")
                .unwrap();
        assert_eq!(config.base, "/");
        assert_eq!(ignored, vec!["hash".to_string(), "build.minify".to_string()]);
    }

    #[test]
    fn test_invalid_toml() {
        let result = SriConfig::from_str("base = ");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = SriConfig::load(None, dir.path()).unwrap();
        assert!(config.config_path.is_none());
        assert_eq!(config.root, dir.path());
        assert_eq!(config.output_dir(), dir.path().join("dist"));
        assert_eq!(config.entry_paths(), vec![dir.path().join("dist/index.html")]);
    }

    #[test]
    fn test_load_finds_file_upward() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("src/pages");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "[build]\noutput = \"out\"\n").unwrap();

        let config = SriConfig::load(None, &nested).unwrap();
        assert_eq!(config.root, dir.path());
        assert_eq!(config.output_dir(), dir.path().join("out"));
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = SriConfig::load(Some(Path::new("custom.toml")), dir.path());
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_rejects_zero_timeout() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "[fetch]\ntimeout = 0\n").unwrap();
        let result = SriConfig::load(None, dir.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_apply_inject_args() {
        let mut config = SriConfig::default();
        let args = InjectArgs {
            output: Some(PathBuf::from("build")),
            entries: vec![],
            base: Some(String::new()),
            dry: false,
        };
        config.apply_inject_args(&args);

        assert_eq!(config.base, "");
        assert_eq!(config.build.output, PathBuf::from("build"));
        // No entries given: file value kept
        assert_eq!(config.build.entries, vec![PathBuf::from("index.html")]);
    }

    #[test]
    fn test_resolved_carries_base() {
        let mut config = SriConfig::default();
        config.base = "https://cdn.example.com/".to_string();
        assert_eq!(
            config.resolved().base.as_deref(),
            Some("https://cdn.example.com/")
        );
    }
}
