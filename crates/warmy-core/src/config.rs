use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::WarmyError;

/// Default per-file diff text ceiling (1 MiB).
pub const DEFAULT_MAX_DIFF_SIZE: usize = 1024 * 1024;

/// Top-level configuration loaded from `.warmy.toml` or `config.json`.
///
/// Supports layered resolution: CLI flags > config file > defaults. Every key
/// is optional in the file; missing keys take the defaults below.
///
/// # Examples
///
/// ```
/// use warmy_core::WarmyConfig;
///
/// let config = WarmyConfig::default();
/// assert_eq!(config.max_diff_size, 1024 * 1024);
/// assert!(config.parse_diff);
/// assert!(config.focus.enable);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WarmyConfig {
    /// Repository to open.
    pub repo_path: PathBuf,
    /// Commit reference to analyze; empty means `HEAD`.
    pub commit_hash: String,
    /// Indent the JSON report.
    pub pretty_json: bool,
    /// Per-file diff text ceiling in bytes.
    pub max_diff_size: usize,
    /// Concatenate every file's diff text into `diff_summary.full_diff`.
    pub include_full_diff: bool,
    /// Re-parse diff text into addition/deletion line lists.
    pub parse_diff: bool,
    /// Directory the report file is written to.
    pub output_dir: PathBuf,
    /// Do not write the report file.
    pub no_file: bool,
    /// Do not print the report to stdout.
    pub no_console: bool,
    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Focus classification rules.
    pub focus: FocusConfig,
}

impl Default for WarmyConfig {
    fn default() -> Self {
        Self {
            repo_path: PathBuf::from("."),
            commit_hash: String::new(),
            pretty_json: true,
            max_diff_size: DEFAULT_MAX_DIFF_SIZE,
            include_full_diff: false,
            parse_diff: true,
            output_dir: PathBuf::from("."),
            no_file: false,
            no_console: false,
            log_level: "info".into(),
            focus: FocusConfig::default(),
        }
    }
}

impl WarmyConfig {
    /// Load configuration from `path`.
    ///
    /// Files ending in `.json` are parsed as JSON, anything else as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`WarmyError::FileNotFound`] if `path` does not exist,
    /// [`WarmyError::Io`] if it cannot be read, or a parse error if the content
    /// is malformed.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use warmy_core::WarmyConfig;
    /// use std::path::Path;
    ///
    /// let config = WarmyConfig::from_file(Path::new(".warmy.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, WarmyError> {
        if !path.exists() {
            return Err(WarmyError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_toml(&content)
        }
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`WarmyError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use warmy_core::WarmyConfig;
    ///
    /// let toml = r#"
    /// max_diff_size = 2048
    ///
    /// [focus]
    /// file_patterns = ['.*\.yaml$']
    /// "#;
    /// let config = WarmyConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.max_diff_size, 2048);
    /// assert_eq!(config.focus.file_patterns, vec![r".*\.yaml$"]);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, WarmyError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Parse configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`WarmyError::Serialization`] if parsing fails.
    pub fn from_json(content: &str) -> Result<Self, WarmyError> {
        let config: Self = serde_json::from_str(content)?;
        Ok(config)
    }

    /// Locate and load the configuration for a run.
    ///
    /// An explicit path must exist. Without one, `.warmy.toml` and then
    /// `config.json` in `dir` are tried; if neither exists the defaults are
    /// returned.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`WarmyConfig::from_file`].
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self, WarmyError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        for name in [".warmy.toml", "config.json"] {
            let candidate = dir.join(name);
            if candidate.exists() {
                return Self::from_file(&candidate);
            }
        }
        Ok(Self::default())
    }
}

/// Focus classification configuration.
///
/// # Examples
///
/// ```
/// use warmy_core::FocusConfig;
///
/// let config = FocusConfig::default();
/// assert!(config.enable && config.add_files && config.modify_files && config.delete_files);
/// assert!(config.file_patterns.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusConfig {
    /// Enable focus classification.
    pub enable: bool,
    /// Flag newly added target files.
    pub add_files: bool,
    /// Flag modified target files whose changed lines escape the ignore patterns.
    pub modify_files: bool,
    /// Flag deleted target files.
    pub delete_files: bool,
    /// Regular expressions selecting target paths.
    pub file_patterns: Vec<String>,
    /// Regular expressions ignoring paths and changed-line content.
    pub ignore_patterns: Vec<String>,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            enable: true,
            add_files: true,
            modify_files: true,
            delete_files: true,
            file_patterns: Vec::new(),
            ignore_patterns: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = WarmyConfig::default();
        assert_eq!(config.repo_path, PathBuf::from("."));
        assert!(config.commit_hash.is_empty());
        assert!(config.pretty_json);
        assert_eq!(config.max_diff_size, DEFAULT_MAX_DIFF_SIZE);
        assert!(!config.include_full_diff);
        assert!(config.parse_diff);
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert!(!config.no_file);
        assert!(!config.no_console);
        assert_eq!(config.log_level, "info");
        assert!(config.focus.enable);
        assert!(config.focus.ignore_patterns.is_empty());
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = WarmyConfig::from_toml("").unwrap();
        assert_eq!(config.max_diff_size, DEFAULT_MAX_DIFF_SIZE);
        assert!(config.focus.delete_files);
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
repo_path = "/srv/rules"
commit_hash = "abc123"
pretty_json = false
max_diff_size = 4096
include_full_diff = true
parse_diff = false
output_dir = "reports"
no_console = true
log_level = "debug"

[focus]
enable = true
add_files = false
file_patterns = ['.*\.ya?ml$', '.*\.json$']
ignore_patterns = ['digest', 'sha256:']
"#;
        let config = WarmyConfig::from_toml(toml).unwrap();
        assert_eq!(config.repo_path, PathBuf::from("/srv/rules"));
        assert_eq!(config.commit_hash, "abc123");
        assert!(!config.pretty_json);
        assert_eq!(config.max_diff_size, 4096);
        assert!(config.include_full_diff);
        assert!(!config.parse_diff);
        assert_eq!(config.output_dir, PathBuf::from("reports"));
        assert!(config.no_console);
        assert_eq!(config.log_level, "debug");
        assert!(!config.focus.add_files);
        assert!(config.focus.modify_files);
        assert_eq!(config.focus.file_patterns.len(), 2);
        assert_eq!(config.focus.ignore_patterns, vec!["digest", "sha256:"]);
    }

    #[test]
    fn parse_partial_json_keeps_focus_defaults() {
        let json = r#"{"repo_path": "repo", "focus": {"file_patterns": [".*\\.yaml$"]}}"#;
        let config = WarmyConfig::from_json(json).unwrap();
        assert_eq!(config.repo_path, PathBuf::from("repo"));
        assert!(config.focus.enable);
        assert!(config.focus.modify_files);
        assert_eq!(config.focus.file_patterns, vec![r".*\.yaml$"]);
        assert!(config.parse_diff);
    }

    #[test]
    fn invalid_toml_returns_error() {
        assert!(matches!(
            WarmyConfig::from_toml("{{invalid}}"),
            Err(WarmyError::Toml(_))
        ));
    }

    #[test]
    fn invalid_json_returns_error() {
        assert!(matches!(
            WarmyConfig::from_json("{"),
            Err(WarmyError::Serialization(_))
        ));
    }

    #[test]
    fn from_file_picks_format_by_extension() {
        let dir = std::env::temp_dir().join(format!("warmy-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let json_path = dir.join("config.json");
        std::fs::write(&json_path, r#"{"max_diff_size": 10}"#).unwrap();
        assert_eq!(WarmyConfig::from_file(&json_path).unwrap().max_diff_size, 10);

        let toml_path = dir.join(".warmy.toml");
        std::fs::write(&toml_path, "max_diff_size = 20\n").unwrap();
        assert_eq!(WarmyConfig::from_file(&toml_path).unwrap().max_diff_size, 20);

        // .warmy.toml wins over config.json when discovering
        let found = WarmyConfig::discover(None, &dir).unwrap();
        assert_eq!(found.max_diff_size, 20);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = WarmyConfig::discover(Some(Path::new("/nonexistent/warmy.toml")), Path::new("."))
            .unwrap_err();
        assert!(matches!(err, WarmyError::FileNotFound(_)));
    }
}
