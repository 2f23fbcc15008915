//! Focus classification: which changes in a commit actually matter.
//!
//! A change is considered in a fixed order: ignored paths are never focus,
//! paths outside the target patterns are never focus, then the per-action rules
//! for added, deleted and modified files apply.

use tracing::debug;
use warmy_core::{
    truncate_chars, ChangeAction, ChangeInfo, FocusConfig, FocusFileInfo, PatternKind, WarmyError,
};

use crate::classify::PatternSet;

/// Reason recorded for added focus files.
pub const REASON_NEW_FILE: &str = "new file";
/// Reason recorded for deleted focus files.
pub const REASON_DELETED_FILE: &str = "deleted file";
/// Maximum characters kept per matched-line summary.
pub const MATCH_SUMMARY_CHARS: usize = 100;

/// What a focus decision was based on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusBasis {
    /// The path alone (added and deleted files).
    Path,
    /// Changed line content escaping the ignore patterns.
    Content,
}

/// Outcome of classifying one change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusDecision {
    /// The change is not interesting.
    NotFocus,
    /// The change is interesting.
    Focus {
        /// Summary entry for the report's focus list.
        info: FocusFileInfo,
        /// What the decision was based on.
        basis: FocusBasis,
    },
}

impl FocusDecision {
    /// `true` for [`FocusDecision::Focus`].
    pub fn is_focus(&self) -> bool {
        matches!(self, FocusDecision::Focus { .. })
    }

    /// Mark `change` with the focus flag and reason when this is a focus
    /// decision; leave it untouched otherwise.
    pub fn apply(&self, change: &mut ChangeInfo) {
        if let FocusDecision::Focus { info, .. } = self {
            change.is_focus = true;
            change.focus_reason = info.reason.clone();
        }
    }

    /// The focus-list entry, if any.
    pub fn into_focus_file(self) -> Option<FocusFileInfo> {
        match self {
            FocusDecision::Focus { info, .. } => Some(info),
            FocusDecision::NotFocus => None,
        }
    }
}

/// Compiled focus rules, built once per run and shared by reference.
///
/// # Examples
///
/// ```
/// use warmy_core::{ChangeAction, ChangeInfo, FocusConfig};
/// use warmy_difflens::focus::FocusMatcher;
///
/// let config = FocusConfig {
///     file_patterns: vec![r".*\.yaml$".into()],
///     ..FocusConfig::default()
/// };
/// let matcher = FocusMatcher::new(&config).unwrap();
///
/// let mut change = ChangeInfo::new(ChangeAction::Add, "rules/ssh.yaml");
/// let decision = matcher.classify(&change);
/// decision.apply(&mut change);
/// assert!(change.is_focus);
/// assert_eq!(change.focus_reason, "new file");
/// ```
#[derive(Debug, Clone)]
pub struct FocusMatcher {
    enabled: bool,
    add_files: bool,
    modify_files: bool,
    delete_files: bool,
    file_patterns: PatternSet,
    ignore_patterns: PatternSet,
}

impl FocusMatcher {
    /// Compile the focus configuration.
    ///
    /// Patterns are only compiled when focus is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`WarmyError::Pattern`] when any pattern fails to compile.
    pub fn new(config: &FocusConfig) -> Result<Self, WarmyError> {
        if !config.enable {
            return Ok(Self::disabled());
        }
        Ok(Self {
            enabled: true,
            add_files: config.add_files,
            modify_files: config.modify_files,
            delete_files: config.delete_files,
            file_patterns: PatternSet::compile(PatternKind::File, config.file_patterns.as_slice())?,
            ignore_patterns: PatternSet::compile(
                PatternKind::Ignore,
                config.ignore_patterns.as_slice(),
            )?,
        })
    }

    /// A matcher that never selects anything.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            add_files: false,
            modify_files: false,
            delete_files: false,
            file_patterns: PatternSet::empty(PatternKind::File),
            ignore_patterns: PatternSet::empty(PatternKind::Ignore),
        }
    }

    /// Whether focus classification is enabled at all.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Decide whether `change` is a focus change. Does not modify it.
    pub fn classify(&self, change: &ChangeInfo) -> FocusDecision {
        if !self.enabled {
            return FocusDecision::NotFocus;
        }

        let path = change.filepath.as_str();
        if let Some(pattern) = self.ignore_patterns.first_match(path) {
            debug!(file = path, pattern = pattern.as_str(), "file matches ignore pattern");
            return FocusDecision::NotFocus;
        }

        if !self.file_patterns.matches(path) {
            return FocusDecision::NotFocus;
        }

        match change.action {
            ChangeAction::Add if self.add_files => self.path_focus(change, REASON_NEW_FILE),
            ChangeAction::Delete if self.delete_files => {
                self.path_focus(change, REASON_DELETED_FILE)
            }
            ChangeAction::Modify if self.modify_files => self.content_focus(change),
            _ => FocusDecision::NotFocus,
        }
    }

    /// Classify `change` and mark it in place, returning the focus-list entry.
    pub fn mark(&self, change: &mut ChangeInfo) -> Option<FocusFileInfo> {
        let decision = self.classify(change);
        decision.apply(change);
        decision.into_focus_file()
    }

    fn path_focus(&self, change: &ChangeInfo, reason: &str) -> FocusDecision {
        debug!(
            file = change.filepath.as_str(),
            action = %change.action,
            reason,
            "file marked as focus"
        );
        FocusDecision::Focus {
            info: FocusFileInfo {
                filepath: change.filepath.clone(),
                action: change.action,
                reason: reason.to_string(),
                match_count: 0,
                match_lines: Vec::new(),
            },
            basis: FocusBasis::Path,
        }
    }

    fn content_focus(&self, change: &ChangeInfo) -> FocusDecision {
        let mut match_count = 0;
        let mut match_lines: Vec<String> = Vec::new();

        let lines = change.additions_list.iter().chain(&change.deletions_list);
        for line in lines {
            if self.ignore_patterns.matches(&line.content) {
                continue;
            }
            match_count += 1;
            let summary = truncate_chars(&line.content, MATCH_SUMMARY_CHARS);
            if !summary.is_empty() && !match_lines.iter().any(|l| l == summary) {
                match_lines.push(summary.to_string());
            }
        }

        if match_count == 0 {
            return FocusDecision::NotFocus;
        }

        let reason = format!("content doesn't match ignore patterns, match count: {match_count}");
        debug!(
            file = change.filepath.as_str(),
            action = %change.action,
            match_count,
            "modified file content doesn't match ignore patterns"
        );
        FocusDecision::Focus {
            info: FocusFileInfo {
                filepath: change.filepath.clone(),
                action: change.action,
                reason,
                match_count,
                match_lines,
            },
            basis: FocusBasis::Content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warmy_core::LineChange;

    fn matcher(files: &[&str], ignore: &[&str]) -> FocusMatcher {
        FocusMatcher::new(&FocusConfig {
            file_patterns: files.iter().map(|s| s.to_string()).collect(),
            ignore_patterns: ignore.iter().map(|s| s.to_string()).collect(),
            ..FocusConfig::default()
        })
        .unwrap()
    }

    fn modified(path: &str, added: &[&str], deleted: &[&str]) -> ChangeInfo {
        let mut change = ChangeInfo::new(ChangeAction::Modify, path);
        change.additions_list = added.iter().map(|l| LineChange::add(*l)).collect();
        change.deletions_list = deleted.iter().map(|l| LineChange::delete(*l)).collect();
        change.additions = added.len();
        change.deletions = deleted.len();
        change
    }

    #[test]
    fn modified_content_outside_ignore_is_focus() {
        let m = matcher(&[r".*\.yaml$"], &["digest"]);
        let mut change = modified("config.yaml", &["severity: high"], &["severity: critical"]);
        let info = m.mark(&mut change).expect("focus");
        assert!(change.is_focus);
        assert!(change.focus_reason.contains("match count: 2"));
        assert_eq!(info.match_count, 2);
        assert_eq!(info.match_lines, vec!["severity: high", "severity: critical"]);
        assert_eq!(info.reason, change.focus_reason);
    }

    #[test]
    fn only_ignored_content_is_not_focus() {
        let m = matcher(&[r".*\.yaml$"], &["digest"]);
        let mut change = modified("config.yaml", &["digest: sha256:b"], &["digest: sha256:a"]);
        assert!(m.mark(&mut change).is_none());
        assert!(!change.is_focus);
        assert!(change.focus_reason.is_empty());
    }

    #[test]
    fn ignored_path_wins_over_every_rule() {
        let m = matcher(&[".*"], &["^vendor/"]);
        for action in [ChangeAction::Add, ChangeAction::Delete, ChangeAction::Modify] {
            let mut change = ChangeInfo::new(action, "vendor/rules.yaml");
            change.additions_list = vec![LineChange::add("anything")];
            assert_eq!(m.classify(&change), FocusDecision::NotFocus);
        }
    }

    #[test]
    fn path_outside_targets_is_not_focus() {
        let m = matcher(&[r".*\.yaml$"], &[]);
        let change = ChangeInfo::new(ChangeAction::Add, "README.md");
        assert!(!m.classify(&change).is_focus());
    }

    #[test]
    fn no_target_patterns_means_nothing_is_focus() {
        let m = matcher(&[], &[]);
        let change = ChangeInfo::new(ChangeAction::Add, "config.yaml");
        assert!(!m.classify(&change).is_focus());
    }

    #[test]
    fn deleted_file_is_path_focus() {
        let m = matcher(&[r"\.bin$"], &[]);
        let change = ChangeInfo::new(ChangeAction::Delete, "old.bin");
        match m.classify(&change) {
            FocusDecision::Focus { info, basis } => {
                assert_eq!(info.reason, REASON_DELETED_FILE);
                assert_eq!(basis, FocusBasis::Path);
                assert_eq!(info.match_count, 0);
            }
            FocusDecision::NotFocus => panic!("expected focus"),
        }
    }

    #[test]
    fn disabled_action_rules_are_respected() {
        let m = FocusMatcher::new(&FocusConfig {
            add_files: false,
            delete_files: false,
            modify_files: false,
            file_patterns: vec![".*".into()],
            ..FocusConfig::default()
        })
        .unwrap();
        for action in [ChangeAction::Add, ChangeAction::Delete] {
            assert!(!m.classify(&ChangeInfo::new(action, "a.yaml")).is_focus());
        }
        assert!(!m.classify(&modified("a.yaml", &["x"], &[])).is_focus());
    }

    #[test]
    fn rename_is_never_focus() {
        let m = matcher(&[".*"], &[]);
        let mut change = ChangeInfo::new(ChangeAction::Rename, "new.yaml");
        change.additions_list = vec![LineChange::add("x")];
        assert!(!m.classify(&change).is_focus());
    }

    #[test]
    fn focus_disabled_selects_nothing() {
        let m = FocusMatcher::new(&FocusConfig {
            enable: false,
            file_patterns: vec!["(".into()],
            ..FocusConfig::default()
        })
        .unwrap();
        assert!(!m.is_enabled());
        assert!(!m.classify(&ChangeInfo::new(ChangeAction::Add, "x")).is_focus());
    }

    #[test]
    fn summaries_are_deduplicated_and_truncated() {
        let m = matcher(&[".*"], &[]);
        let long = "x".repeat(150);
        let change = modified("f.yaml", &["same", "same", "", &long], &["same"]);
        let info = m.classify(&change).into_focus_file().unwrap();
        assert_eq!(info.match_count, 5);
        assert_eq!(info.match_lines.len(), 2);
        assert_eq!(info.match_lines[0], "same");
        assert_eq!(info.match_lines[1].chars().count(), MATCH_SUMMARY_CHARS);
    }

    #[test]
    fn classification_is_idempotent() {
        let m = matcher(&[r".*\.yaml$"], &["digest"]);
        let mut change = modified("c.yaml", &["a: 1"], &["a: 0"]);
        let first = m.classify(&change);
        first.apply(&mut change);
        let second = m.classify(&change);
        assert_eq!(first, second);
    }

    #[test]
    fn invalid_pattern_fails_construction() {
        let err = FocusMatcher::new(&FocusConfig {
            ignore_patterns: vec!["*oops".into()],
            ..FocusConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, WarmyError::Pattern { kind: PatternKind::Ignore, .. }));
    }
}
