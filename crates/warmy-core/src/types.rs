use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Whether a [`LineChange`] was added or removed.
///
/// # Examples
///
/// ```
/// use warmy_core::LineKind;
///
/// let kind: LineKind = serde_json::from_str("\"delete\"").unwrap();
/// assert_eq!(kind, LineKind::Delete);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    /// Line present only in the new version.
    Add,
    /// Line present only in the old version.
    Delete,
}

impl LineKind {
    /// The unified-diff marker for this kind (`+` or `-`).
    pub fn marker(self) -> char {
        match self {
            LineKind::Add => '+',
            LineKind::Delete => '-',
        }
    }
}

/// One added or removed line of text, without its `+`/`-` marker.
///
/// # Examples
///
/// ```
/// use warmy_core::{LineChange, LineKind};
///
/// let line = LineChange::add("severity: high");
/// assert_eq!(line.kind, LineKind::Add);
/// assert_eq!(line.content, "severity: high");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineChange {
    /// Added or deleted.
    #[serde(rename = "type")]
    pub kind: LineKind,
    /// Line content.
    pub content: String,
}

impl LineChange {
    /// An added line.
    pub fn add(content: impl Into<String>) -> Self {
        Self {
            kind: LineKind::Add,
            content: content.into(),
        }
    }

    /// A deleted line.
    pub fn delete(content: impl Into<String>) -> Self {
        Self {
            kind: LineKind::Delete,
            content: content.into(),
        }
    }
}

/// What happened to a file within a commit.
///
/// # Examples
///
/// ```
/// use warmy_core::ChangeAction;
///
/// assert_eq!(ChangeAction::Rename.to_string(), "rename");
/// assert_eq!("modify".parse::<ChangeAction>().unwrap(), ChangeAction::Modify);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    /// New file.
    Add,
    /// File removed.
    Delete,
    /// Existing file changed in place.
    Modify,
    /// File moved to a new path, possibly with content changes.
    Rename,
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeAction::Add => write!(f, "add"),
            ChangeAction::Delete => write!(f, "delete"),
            ChangeAction::Modify => write!(f, "modify"),
            ChangeAction::Rename => write!(f, "rename"),
        }
    }
}

impl FromStr for ChangeAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "add" => Ok(ChangeAction::Add),
            "delete" => Ok(ChangeAction::Delete),
            "modify" => Ok(ChangeAction::Modify),
            "rename" => Ok(ChangeAction::Rename),
            other => Err(format!("unknown change action: {other}")),
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_zero_u64(value: &u64) -> bool {
    *value == 0
}

fn is_zero_usize(value: &usize) -> bool {
    *value == 0
}

/// One file's change within a commit.
///
/// `filepath` is the new path for added, modified and renamed files and the old
/// path for deleted files. `old_path` / `new_path` are only set for renames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeInfo {
    /// What happened to the file.
    pub action: ChangeAction,
    /// Path the change is reported under.
    pub filepath: String,
    /// Original path of a renamed file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_path: Option<String>,
    /// Destination path of a renamed file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_path: Option<String>,
    /// Number of added lines.
    pub additions: usize,
    /// Number of deleted lines.
    pub deletions: usize,
    /// Synthesized diff text (or a placeholder when too large or unreadable).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub diff_content: String,
    /// Extension of `filepath`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub extension: String,
    /// Blob size in bytes.
    #[serde(default, skip_serializing_if = "is_zero_u64")]
    pub file_size: u64,
    /// Binary files carry no line lists.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_binary: bool,
    /// Added lines in diff order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additions_list: Vec<LineChange>,
    /// Deleted lines in diff order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deletions_list: Vec<LineChange>,
    /// Set when the focus classifier selected this change.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_focus: bool,
    /// Why the change was selected.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub focus_reason: String,
}

impl ChangeInfo {
    /// A bare change record for `filepath` with everything else zeroed.
    ///
    /// # Examples
    ///
    /// ```
    /// use warmy_core::{ChangeAction, ChangeInfo};
    ///
    /// let change = ChangeInfo::new(ChangeAction::Add, "rules/app.yaml");
    /// assert_eq!(change.extension, "yaml");
    /// assert!(!change.is_focus);
    /// ```
    pub fn new(action: ChangeAction, filepath: impl Into<String>) -> Self {
        let filepath = filepath.into();
        Self {
            action,
            extension: file_extension(&filepath).to_string(),
            filepath,
            old_path: None,
            new_path: None,
            additions: 0,
            deletions: 0,
            diff_content: String::new(),
            file_size: 0,
            is_binary: false,
            additions_list: Vec::new(),
            deletions_list: Vec::new(),
            is_focus: false,
            focus_reason: String::new(),
        }
    }
}

/// A change selected by the focus rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusFileInfo {
    /// Path of the change.
    pub filepath: String,
    /// Action of the change.
    pub action: ChangeAction,
    /// Why the change was selected.
    pub reason: String,
    /// Number of changed lines escaping the ignore patterns.
    #[serde(default, skip_serializing_if = "is_zero_usize")]
    pub match_count: usize,
    /// Deduplicated line summaries, at most 100 characters each.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub match_lines: Vec<String>,
}

/// Author or committer signature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorInfo {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// `YYYY-MM-DD HH:MM:SS +ZZZZ` in the signature's own offset.
    pub when: String,
}

/// Per-commit change counters.
///
/// The per-action counters always sum to `total_files`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsInfo {
    /// Added lines across all files.
    pub total_additions: usize,
    /// Deleted lines across all files.
    pub total_deletions: usize,
    /// Files changed.
    pub total_files: usize,
    /// Files added.
    pub add_files: usize,
    /// Files deleted.
    pub delete_files: usize,
    /// Files modified.
    pub modify_files: usize,
    /// Files renamed.
    pub rename_files: usize,
    /// Files flagged binary.
    pub binary_files: usize,
}

impl StatsInfo {
    /// Count one file under `action`.
    pub fn record(&mut self, action: ChangeAction) {
        self.total_files += 1;
        match action {
            ChangeAction::Add => self.add_files += 1,
            ChangeAction::Delete => self.delete_files += 1,
            ChangeAction::Modify => self.modify_files += 1,
            ChangeAction::Rename => self.rename_files += 1,
        }
    }
}

/// Per-commit focus counters.
///
/// `total_focus_files` always equals the sum of the per-action counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusStats {
    /// Focus files of any action.
    pub total_focus_files: usize,
    /// Focus files that were added.
    pub add_focus_files: usize,
    /// Focus files that were modified.
    pub modify_focus_files: usize,
    /// Focus files that were deleted.
    pub delete_focus_files: usize,
    /// Focus files selected on their path alone.
    pub match_pattern_files: usize,
    /// Focus files selected on their changed content.
    pub match_content_files: usize,
}

/// Diff size bookkeeping for a commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    /// Sum of every file's full diff text size in bytes.
    pub total_diff_size: usize,
    /// Set when any single file's diff text exceeded `max_diff_size`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub diff_too_large: bool,
    /// Configured per-file ceiling.
    #[serde(default, skip_serializing_if = "is_zero_usize")]
    pub max_diff_size: usize,
    /// Concatenated diff text, only when enabled.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub full_diff: String,
}

/// The complete report for one commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitInfo {
    /// Full commit hash.
    pub hash: String,
    /// First 8 characters of the hash.
    pub short_hash: String,
    /// Author signature.
    pub author: AuthorInfo,
    /// Committer signature.
    pub committer: AuthorInfo,
    /// Subject line.
    pub message: String,
    /// Body after the subject.
    pub description: String,
    /// Trimmed full message.
    pub full_message: String,
    /// Parent hashes in order.
    pub parent_hashes: Vec<String>,
    /// Every changed file in tree-comparison order.
    pub changes: Vec<ChangeInfo>,
    /// Subset of `changes` selected by the focus rules.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub focus_files: Vec<FocusFileInfo>,
    /// Committer time as unix seconds.
    pub timestamp: i64,
    /// Tree object hash.
    pub tree_hash: String,
    /// `filepath` of every change, in order.
    pub files_changed: Vec<String>,
    /// Change counters.
    pub stats: StatsInfo,
    /// Diff size bookkeeping.
    pub diff_summary: DiffSummary,
    /// Branches whose tip is this commit.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<String>,
    /// Tags pointing at this commit.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Name of the report file, when one is written.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub output_file: String,
    /// Local analysis time, `YYYYMMDD-HHMMSS`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub analyze_time: String,
    /// Focus counters.
    pub focus_stats: FocusStats,
}

impl CommitInfo {
    /// Return the report with `output_file` recorded.
    pub fn with_output_file(self, output_file: impl Into<String>) -> Self {
        Self {
            output_file: output_file.into(),
            ..self
        }
    }

    /// Serialize to JSON, indented when `pretty` is set.
    ///
    /// # Errors
    ///
    /// Returns [`crate::WarmyError::Serialization`] if serialization fails.
    pub fn to_json(&self, pretty: bool) -> Result<String, crate::WarmyError> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

/// Split a commit message into its subject and description.
///
/// The subject is the trimmed first line. The description is every following
/// line, trimmed, with one blank separator line after the subject dropped.
///
/// # Examples
///
/// ```
/// use warmy_core::split_commit_message;
///
/// let (subject, body) = split_commit_message("Tighten rules\n\n  raise severity\nfor ssh");
/// assert_eq!(subject, "Tighten rules");
/// assert_eq!(body, "raise severity\nfor ssh");
/// ```
pub fn split_commit_message(message: &str) -> (String, String) {
    let lines: Vec<&str> = message.split('\n').collect();
    let subject = lines.first().map(|l| l.trim()).unwrap_or("").to_string();
    if lines.len() < 2 {
        return (subject, String::new());
    }
    let start = if lines[1].is_empty() { 2 } else { 1 };
    let description = lines
        .iter()
        .skip(start)
        .map(|l| l.trim())
        .collect::<Vec<_>>()
        .join("\n");
    (subject, description)
}

/// Text after the last `.` in the file name of `path`, or `""` when there is none.
///
/// # Examples
///
/// ```
/// use warmy_core::file_extension;
///
/// assert_eq!(file_extension("rules/app.yaml"), "yaml");
/// assert_eq!(file_extension("conf.d/Makefile"), "");
/// ```
pub fn file_extension(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rsplit_once('.') {
        Some((_, ext)) => ext,
        None => "",
    }
}

const BINARY_EXTENSIONS: &[&str] = &[
    "exe", "dll", "so", "dylib", "bin", "class", "jar", "war", "png", "jpg", "jpeg", "gif", "bmp",
    "ico", "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "zip", "tar", "gz", "7z", "rar",
    "mp3", "mp4", "avi", "mkv", "mov", "wav", "iso", "img", "dmg", "pkg", "o", "obj", "lib", "a",
];

/// Whether `path` has an extension that usually means binary content.
///
/// # Examples
///
/// ```
/// use warmy_core::is_likely_binary_path;
///
/// assert!(is_likely_binary_path("assets/logo.PNG"));
/// assert!(!is_likely_binary_path("src/main.rs"));
/// ```
pub fn is_likely_binary_path(path: &str) -> bool {
    let ext = file_extension(path).to_lowercase();
    BINARY_EXTENSIONS.contains(&ext.as_str())
}

/// The first `max_chars` characters of `text`.
///
/// # Examples
///
/// ```
/// use warmy_core::truncate_chars;
///
/// assert_eq!(truncate_chars("héllo", 2), "hé");
/// assert_eq!(truncate_chars("ok", 100), "ok");
/// ```
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
