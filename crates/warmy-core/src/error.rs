use std::fmt;
use std::path::PathBuf;

/// Which configured pattern list a regular expression came from.
///
/// # Examples
///
/// ```
/// use warmy_core::PatternKind;
///
/// assert_eq!(PatternKind::File.to_string(), "file");
/// assert_eq!(PatternKind::Ignore.to_string(), "ignore");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// Target path patterns (`focus.file_patterns`).
    File,
    /// Ignore patterns applied to paths and line content (`focus.ignore_patterns`).
    Ignore,
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternKind::File => write!(f, "file"),
            PatternKind::Ignore => write!(f, "ignore"),
        }
    }
}

/// Errors that can occur across warmy.
///
/// Library crates use this type directly; the binary crate renders it through
/// `miette` at the boundary.
///
/// # Examples
///
/// ```
/// use warmy_core::WarmyError;
///
/// let err = WarmyError::CommitNotFound("deadbeef".into());
/// assert!(err.to_string().contains("deadbeef"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum WarmyError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    #[diagnostic(code(warmy::io))]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(code(warmy::config))]
    Config(String),

    /// A configured regular expression failed to compile.
    #[error("failed to compile {kind} pattern `{pattern}`")]
    #[diagnostic(
        code(warmy::pattern),
        help("focus patterns use Rust `regex` syntax; escape literal dots as `\\.`")
    )]
    Pattern {
        /// The list the pattern belongs to.
        kind: PatternKind,
        /// The pattern source text.
        pattern: String,
        /// Underlying compile error.
        #[source]
        source: regex::Error,
    },

    /// Git operation failure.
    #[error("git error: {0}")]
    #[diagnostic(code(warmy::git))]
    Git(String),

    /// The requested commit reference matched nothing (or more than one object).
    #[error("specified commit not found: {0}")]
    #[diagnostic(
        code(warmy::commit_not_found),
        help("use a full hash, a unique hash prefix, or a ref name such as HEAD")
    )]
    CommitNotFound(String),

    /// Diff text could not be parsed.
    #[error("parse error: {0}")]
    #[diagnostic(code(warmy::parse))]
    Parse(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    #[diagnostic(code(warmy::serialization))]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    #[diagnostic(code(warmy::toml))]
    Toml(#[from] toml::de::Error),

    /// A required file was not found.
    #[error("file not found: {}", .0.display())]
    #[diagnostic(code(warmy::file_not_found))]
    FileNotFound(PathBuf),
}
