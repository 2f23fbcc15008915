//! Core types, configuration, and error handling for warmy.
//!
//! This crate provides the shared foundation used by the other warmy crates:
//! - [`WarmyError`]: unified error type using `thiserror`
//! - [`WarmyConfig`]: configuration loaded from `.warmy.toml` or `config.json`
//! - The commit report model: [`CommitInfo`], [`ChangeInfo`], [`LineChange`],
//!   [`FocusFileInfo`], [`StatsInfo`], [`FocusStats`], [`DiffSummary`]

mod config;
mod error;
mod types;

pub use config::{FocusConfig, WarmyConfig, DEFAULT_MAX_DIFF_SIZE};
pub use error::{PatternKind, WarmyError};
pub use types::{
    file_extension, is_likely_binary_path, split_commit_message, truncate_chars, AuthorInfo,
    ChangeAction, ChangeInfo, CommitInfo, DiffSummary, FocusFileInfo, FocusStats, LineChange,
    LineKind, StatsInfo,
};

/// A convenience `Result` type for warmy operations.
pub type Result<T> = std::result::Result<T, WarmyError>;
