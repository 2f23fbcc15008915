//! Textual diff synthesis from structured tree-comparison output.
//!
//! The emitted text mirrors `git diff` headers but carries only changed lines:
//! context lines are never reproduced. Every hunk is introduced by an `@@`
//! header whose counts are the numbers of lines actually emitted for it.

use warmy_core::{ChangeAction, LineKind};

/// Placeholder prefix for files whose content could not be read as text.
pub const UNREADABLE_PREFIX: &str = "// Unable to read file content: ";

/// A run of consecutive added or removed lines, without markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineGroup {
    /// Whether the lines were added or removed.
    pub kind: LineKind,
    /// Raw line text, trailing newline stripped.
    pub lines: Vec<String>,
}

impl LineGroup {
    /// A group of added lines.
    pub fn added<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: LineKind::Add,
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// A group of removed lines.
    pub fn removed<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: LineKind::Delete,
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

/// One location of change within a file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hunk {
    /// First line of the hunk in the old version.
    pub old_start: u32,
    /// First line of the hunk in the new version.
    pub new_start: u32,
    /// Changed lines in file order.
    pub groups: Vec<LineGroup>,
}

impl Hunk {
    /// A hunk starting at the given old/new lines.
    pub fn new(old_start: u32, new_start: u32) -> Self {
        Self {
            old_start,
            new_start,
            groups: Vec::new(),
        }
    }

    /// Append a line group.
    pub fn with_group(mut self, group: LineGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Append one line, extending the last group when it has the same kind.
    pub fn push_line(&mut self, kind: LineKind, line: impl Into<String>) {
        match self.groups.last_mut() {
            Some(group) if group.kind == kind => group.lines.push(line.into()),
            _ => self.groups.push(LineGroup {
                kind,
                lines: vec![line.into()],
            }),
        }
    }

    /// Number of added lines.
    pub fn additions(&self) -> usize {
        self.count(LineKind::Add)
    }

    /// Number of removed lines.
    pub fn deletions(&self) -> usize {
        self.count(LineKind::Delete)
    }

    fn count(&self, kind: LineKind) -> usize {
        self.groups
            .iter()
            .filter(|g| g.kind == kind)
            .map(|g| g.lines.len())
            .sum()
    }
}

/// One file's change as reported by a tree comparison.
///
/// # Examples
///
/// ```
/// use warmy_difflens::synth::{FileChange, Hunk, LineGroup};
///
/// let change = FileChange::modified("config.yaml").with_hunk(
///     Hunk::new(3, 3)
///         .with_group(LineGroup::removed(["severity: critical"]))
///         .with_group(LineGroup::added(["severity: high"])),
/// );
/// assert_eq!(change.path(), "config.yaml");
/// assert_eq!((change.additions(), change.deletions()), (1, 1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    /// What happened to the file.
    pub action: ChangeAction,
    /// Path on the old side (`None` for additions).
    pub old_path: Option<String>,
    /// Path on the new side (`None` for deletions).
    pub new_path: Option<String>,
    /// Blob size in bytes (new side, or old side for deletions).
    pub size: u64,
    /// Content hint from the comparison.
    pub binary: bool,
    /// Changed hunks in file order.
    pub hunks: Vec<Hunk>,
}

impl FileChange {
    fn with_paths(action: ChangeAction, old: Option<&str>, new: Option<&str>) -> Self {
        Self {
            action,
            old_path: old.map(str::to_string),
            new_path: new.map(str::to_string),
            size: 0,
            binary: false,
            hunks: Vec::new(),
        }
    }

    /// A newly added file.
    pub fn added(path: &str) -> Self {
        Self::with_paths(ChangeAction::Add, None, Some(path))
    }

    /// A deleted file.
    pub fn deleted(path: &str) -> Self {
        Self::with_paths(ChangeAction::Delete, Some(path), None)
    }

    /// A file modified in place.
    pub fn modified(path: &str) -> Self {
        Self::with_paths(ChangeAction::Modify, Some(path), Some(path))
    }

    /// A file moved from `old` to `new`.
    pub fn renamed(old: &str, new: &str) -> Self {
        Self::with_paths(ChangeAction::Rename, Some(old), Some(new))
    }

    /// Append a hunk.
    pub fn with_hunk(mut self, hunk: Hunk) -> Self {
        self.hunks.push(hunk);
        self
    }

    /// Set the blob size.
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    /// Set the binary hint.
    pub fn with_binary(mut self, binary: bool) -> Self {
        self.binary = binary;
        self
    }

    /// The path the change is reported under: old path for deletions,
    /// new path otherwise.
    pub fn path(&self) -> &str {
        let path = match self.action {
            ChangeAction::Delete => self.old_path.as_deref(),
            _ => self.new_path.as_deref(),
        };
        path.or(self.old_path.as_deref())
            .or(self.new_path.as_deref())
            .unwrap_or("")
    }

    /// Total added lines across hunks.
    pub fn additions(&self) -> usize {
        self.hunks.iter().map(Hunk::additions).sum()
    }

    /// Total removed lines across hunks.
    pub fn deletions(&self) -> usize {
        self.hunks.iter().map(Hunk::deletions).sum()
    }
}

/// Produce the diff text for one file change.
///
/// # Examples
///
/// ```
/// use warmy_difflens::synth::{synthesize, FileChange, Hunk, LineGroup};
///
/// let change = FileChange::deleted("old.txt")
///     .with_hunk(Hunk::new(1, 0).with_group(LineGroup::removed(["a", "b"])));
/// let text = synthesize(&change);
/// assert_eq!(
///     text,
///     "diff --git a/old.txt b/old.txt\n\
///      deleted file mode 100644\n\
///      --- a/old.txt\n\
///      +++ /dev/null\n\
///      @@ -1,2 +0,0 @@\n\
///      -a\n\
///      -b\n"
/// );
/// ```
pub fn synthesize(change: &FileChange) -> String {
    let mut out = String::new();
    write_header(&mut out, change);
    for hunk in &change.hunks {
        write_hunk(&mut out, hunk);
    }
    out
}

/// Produce the diff text for a file present at a root commit: the whole content
/// as one added hunk.
///
/// # Examples
///
/// ```
/// use warmy_difflens::synth::synthesize_root_file;
///
/// let text = synthesize_root_file("a.txt", "one\ntwo\n");
/// assert!(text.contains("@@ -0,0 +1,2 @@\n+one\n+two\n"));
/// ```
pub fn synthesize_root_file(path: &str, content: &str) -> String {
    let lines = split_lines(content);
    let mut out = String::new();
    write_added_header(&mut out, path);
    out.push_str(&format!("@@ -0,0 +1,{} @@\n", lines.len()));
    for line in lines {
        out.push('+');
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Placeholder diff text for a file whose content could not be read.
pub fn unreadable_placeholder(reason: &str) -> String {
    format!("{UNREADABLE_PREFIX}{reason}\n")
}

/// Split file content into lines the way a line-based diff sees them: on `\n`,
/// with a trailing newline not starting an extra empty line.
///
/// # Examples
///
/// ```
/// use warmy_difflens::synth::split_lines;
///
/// assert_eq!(split_lines("a\nb\nc\n"), vec!["a", "b", "c"]);
/// assert_eq!(split_lines("a\nb"), vec!["a", "b"]);
/// assert!(split_lines("").is_empty());
/// ```
pub fn split_lines(content: &str) -> Vec<&str> {
    if content.is_empty() {
        return Vec::new();
    }
    let body = content.strip_suffix('\n').unwrap_or(content);
    body.split('\n').collect()
}

fn write_added_header(out: &mut String, path: &str) {
    out.push_str(&format!("diff --git a/{path} b/{path}\n"));
    out.push_str("new file mode 100644\n");
    out.push_str("--- /dev/null\n");
    out.push_str(&format!("+++ b/{path}\n"));
}

fn write_header(out: &mut String, change: &FileChange) {
    let path = change.path();
    match change.action {
        ChangeAction::Add => write_added_header(out, path),
        ChangeAction::Delete => {
            out.push_str(&format!("diff --git a/{path} b/{path}\n"));
            out.push_str("deleted file mode 100644\n");
            out.push_str(&format!("--- a/{path}\n"));
            out.push_str("+++ /dev/null\n");
        }
        ChangeAction::Modify => {
            out.push_str(&format!("diff --git a/{path} b/{path}\n"));
            out.push_str(&format!("--- a/{path}\n"));
            out.push_str(&format!("+++ b/{path}\n"));
        }
        ChangeAction::Rename => {
            let old = change.old_path.as_deref().unwrap_or(path);
            out.push_str(&format!("diff --git a/{old} b/{path}\n"));
            out.push_str(&format!("rename from {old}\n"));
            out.push_str(&format!("rename to {path}\n"));
        }
    }
}

fn write_hunk(out: &mut String, hunk: &Hunk) {
    let (additions, deletions) = (hunk.additions(), hunk.deletions());
    if additions == 0 && deletions == 0 {
        return;
    }
    out.push_str(&format!(
        "@@ -{},{} +{},{} @@\n",
        hunk.old_start, deletions, hunk.new_start, additions
    ));
    for group in &hunk.groups {
        let marker = group.kind.marker();
        for line in &group.lines {
            out.push(marker);
            out.push_str(line);
            out.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_edit() -> FileChange {
        FileChange::modified("config.yaml").with_hunk(
            Hunk::new(2, 2)
                .with_group(LineGroup::removed(["severity: critical"]))
                .with_group(LineGroup::added(["severity: high"])),
        )
    }

    #[test]
    fn added_file_has_null_origin() {
        let change = FileChange::added("new.rs")
            .with_hunk(Hunk::new(0, 1).with_group(LineGroup::added(["fn main() {}"])));
        let text = synthesize(&change);
        assert!(text.starts_with("diff --git a/new.rs b/new.rs\nnew file mode 100644\n"));
        assert!(text.contains("--- /dev/null\n+++ b/new.rs\n"));
        assert!(text.ends_with("@@ -0,0 +1,1 @@\n+fn main() {}\n"));
    }

    #[test]
    fn modified_file_emits_only_changed_lines() {
        let text = synthesize(&config_edit());
        assert_eq!(
            text,
            "diff --git a/config.yaml b/config.yaml\n\
             --- a/config.yaml\n\
             +++ b/config.yaml\n\
             @@ -2,1 +2,1 @@\n\
             -severity: critical\n\
             +severity: high\n"
        );
    }

    #[test]
    fn renamed_file_records_both_paths() {
        let change = FileChange::renamed("rules/old.yaml", "rules/new.yaml")
            .with_hunk(Hunk::new(1, 1).with_group(LineGroup::added(["x: 1"])));
        let text = synthesize(&change);
        assert!(text.starts_with(
            "diff --git a/rules/old.yaml b/rules/new.yaml\n\
             rename from rules/old.yaml\n\
             rename to rules/new.yaml\n"
        ));
        assert!(text.contains("+x: 1\n"));
        assert_eq!(change.path(), "rules/new.yaml");
    }

    #[test]
    fn pure_rename_has_no_hunks() {
        let text = synthesize(&FileChange::renamed("a", "b"));
        assert!(!text.contains("@@"));
    }

    #[test]
    fn empty_hunks_are_skipped() {
        let change = FileChange::modified("f").with_hunk(Hunk::new(1, 1));
        assert!(!synthesize(&change).contains("@@"));
    }

    #[test]
    fn empty_lines_keep_their_marker() {
        let change = FileChange::modified("f")
            .with_hunk(Hunk::new(1, 1).with_group(LineGroup::added(["", "x"])));
        assert!(synthesize(&change).ends_with("@@ -1,0 +1,2 @@\n+\n+x\n"));
    }

    #[test]
    fn push_line_merges_runs() {
        let mut hunk = Hunk::new(1, 1);
        hunk.push_line(LineKind::Delete, "a");
        hunk.push_line(LineKind::Delete, "b");
        hunk.push_line(LineKind::Add, "c");
        assert_eq!(hunk.groups.len(), 2);
        assert_eq!((hunk.additions(), hunk.deletions()), (1, 2));
    }

    #[test]
    fn root_file_counts_lines() {
        let text = synthesize_root_file("a.txt", "1\n2\n3\n");
        assert!(text.contains("+++ b/a.txt\n@@ -0,0 +1,3 @@\n+1\n+2\n+3\n"));

        let no_trailing_newline = synthesize_root_file("b.txt", "1\n2");
        assert!(no_trailing_newline.contains("@@ -0,0 +1,2 @@\n+1\n+2\n"));

        let empty = synthesize_root_file("empty", "");
        assert!(empty.ends_with("@@ -0,0 +1,0 @@\n"));
    }

    #[test]
    fn deleted_path_uses_old_side() {
        assert_eq!(FileChange::deleted("gone.txt").path(), "gone.txt");
    }

    #[test]
    fn placeholder_has_prefix() {
        assert!(unreadable_placeholder("binary content").starts_with(UNREADABLE_PREFIX));
    }
}
