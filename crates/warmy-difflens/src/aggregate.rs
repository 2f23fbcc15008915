//! Per-commit aggregation of file changes into change records and counters.

use tracing::{debug, warn};
use warmy_core::{
    is_likely_binary_path, ChangeAction, ChangeInfo, DiffSummary, FocusFileInfo, FocusStats,
    StatsInfo, WarmyConfig,
};

use crate::focus::{FocusBasis, FocusDecision, FocusMatcher};
use crate::parser::{parse_diff_text, ParsedLines};
use crate::synth::{
    split_lines, synthesize, synthesize_root_file, unreadable_placeholder, FileChange,
};

/// The subset of configuration the aggregator needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateOptions {
    /// Per-file diff text ceiling in bytes.
    pub max_diff_size: usize,
    /// Whether to build the concatenated full diff.
    pub include_full_diff: bool,
    /// Whether to fill the per-change line lists.
    pub parse_diff: bool,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self::from(&WarmyConfig::default())
    }
}

impl From<&WarmyConfig> for AggregateOptions {
    fn from(config: &WarmyConfig) -> Self {
        Self {
            max_diff_size: config.max_diff_size,
            include_full_diff: config.include_full_diff,
            parse_diff: config.parse_diff,
        }
    }
}

/// Content of a file present at a root commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootContent {
    /// Readable text.
    Text(String),
    /// Content that could not be read as text, with the reason.
    Unreadable(String),
}

/// A tracked file at a commit with no parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootFile {
    /// Path within the tree.
    pub path: String,
    /// Blob size in bytes.
    pub size: u64,
    /// File content.
    pub content: RootContent,
}

impl RootFile {
    /// A readable root file.
    pub fn text(path: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            path: path.into(),
            size: content.len() as u64,
            content: RootContent::Text(content),
        }
    }

    /// A root file whose content could not be read.
    pub fn unreadable(path: impl Into<String>, size: u64, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            size,
            content: RootContent::Unreadable(reason.into()),
        }
    }
}

/// Everything the aggregator produced for one commit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    /// Every change in input order.
    pub changes: Vec<ChangeInfo>,
    /// Focus entries, in the order of their changes.
    pub focus_files: Vec<FocusFileInfo>,
    /// Change counters.
    pub stats: StatsInfo,
    /// Focus counters.
    pub focus_stats: FocusStats,
    /// Diff size bookkeeping.
    pub diff_summary: DiffSummary,
}

impl ChangeSet {
    /// The degraded result: no changes, zeroed counters, configured ceiling kept.
    pub fn empty(max_diff_size: usize) -> Self {
        Self {
            diff_summary: DiffSummary {
                max_diff_size,
                ..DiffSummary::default()
            },
            ..Self::default()
        }
    }

    /// `filepath` of every change, in order.
    pub fn files_changed(&self) -> Vec<String> {
        self.changes.iter().map(|c| c.filepath.clone()).collect()
    }
}

/// Folds file changes one at a time into a [`ChangeSet`].
///
/// # Examples
///
/// ```
/// use warmy_difflens::aggregate::{AggregateOptions, ChangeAggregator, RootFile};
/// use warmy_difflens::focus::FocusMatcher;
///
/// let matcher = FocusMatcher::disabled();
/// let mut aggregator = ChangeAggregator::new(AggregateOptions::default(), &matcher);
/// aggregator.push_root_file(RootFile::text("a.txt", "1\n2\n3\n"));
/// let set = aggregator.finish();
///
/// assert_eq!(set.stats.add_files, 1);
/// assert_eq!(set.changes[0].additions, 3);
/// ```
#[derive(Debug)]
pub struct ChangeAggregator<'a> {
    options: AggregateOptions,
    matcher: &'a FocusMatcher,
    changes: Vec<ChangeInfo>,
    focus_files: Vec<FocusFileInfo>,
    stats: StatsInfo,
    focus_stats: FocusStats,
    total_diff_size: usize,
    diff_too_large: bool,
    full_diff: String,
}

impl<'a> ChangeAggregator<'a> {
    /// An aggregator with empty accumulators.
    pub fn new(options: AggregateOptions, matcher: &'a FocusMatcher) -> Self {
        Self {
            options,
            matcher,
            changes: Vec::new(),
            focus_files: Vec::new(),
            stats: StatsInfo::default(),
            focus_stats: FocusStats::default(),
            total_diff_size: 0,
            diff_too_large: false,
            full_diff: String::new(),
        }
    }

    /// Process one change from a tree comparison.
    pub fn push_change(&mut self, file: &FileChange) {
        let path = file.path();
        let mut change = ChangeInfo::new(file.action, path);
        if file.action == ChangeAction::Rename {
            change.old_path = file.old_path.clone();
            change.new_path = file.new_path.clone();
        }
        change.file_size = file.size;
        change.is_binary = file.binary || is_likely_binary_path(path);
        change.additions = file.additions();
        change.deletions = file.deletions();

        let text = synthesize(file);
        self.record(change, text, true);
    }

    /// Process one file of a commit with no parent, as a wholly added file.
    pub fn push_root_file(&mut self, file: RootFile) {
        let mut change = ChangeInfo::new(ChangeAction::Add, file.path.as_str());
        change.file_size = file.size;

        let (text, readable) = match &file.content {
            RootContent::Text(content) => {
                change.additions = split_lines(content).len();
                change.is_binary = is_likely_binary_path(&file.path);
                (synthesize_root_file(&file.path, content), true)
            }
            RootContent::Unreadable(reason) => {
                warn!(
                    file = file.path.as_str(),
                    reason = reason.as_str(),
                    "unable to read file content"
                );
                change.is_binary = true;
                (unreadable_placeholder(reason), false)
            }
        };
        self.record(change, text, readable);
    }

    fn record(&mut self, mut change: ChangeInfo, text: String, readable: bool) {
        let size = text.len();
        self.total_diff_size += size;

        if self.options.parse_diff && readable && !change.is_binary {
            let ParsedLines {
                additions,
                deletions,
            } = parse_diff_text(&text);
            change.additions_list = additions;
            change.deletions_list = deletions;
        }

        if self.options.include_full_diff {
            self.full_diff.push_str(&text);
            self.full_diff.push_str("\n\n");
        }

        if size > self.options.max_diff_size {
            debug!(
                file = change.filepath.as_str(),
                size,
                max = self.options.max_diff_size,
                "diff content too large"
            );
            self.diff_too_large = true;
            change.diff_content = format!("// Diff content too large ({size} bytes), truncated");
        } else {
            change.diff_content = text;
        }

        self.stats.record(change.action);
        self.stats.total_additions += change.additions;
        self.stats.total_deletions += change.deletions;
        if change.is_binary {
            self.stats.binary_files += 1;
        }

        let decision = self.matcher.classify(&change);
        decision.apply(&mut change);
        if let FocusDecision::Focus { basis, .. } = &decision {
            self.count_focus(change.action, *basis);
        }
        if let Some(info) = decision.into_focus_file() {
            self.focus_files.push(info);
        }

        debug!(
            file = change.filepath.as_str(),
            action = %change.action,
            additions = change.additions,
            deletions = change.deletions,
            "processed change"
        );
        self.changes.push(change);
    }

    fn count_focus(&mut self, action: ChangeAction, basis: FocusBasis) {
        let stats = &mut self.focus_stats;
        stats.total_focus_files += 1;
        match action {
            ChangeAction::Add => stats.add_focus_files += 1,
            ChangeAction::Modify => stats.modify_focus_files += 1,
            ChangeAction::Delete => stats.delete_focus_files += 1,
            ChangeAction::Rename => {}
        }
        match basis {
            FocusBasis::Path => stats.match_pattern_files += 1,
            FocusBasis::Content => stats.match_content_files += 1,
        }
    }

    /// Number of changes processed so far.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// `true` before any change has been processed.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Freeze the accumulators into a [`ChangeSet`].
    pub fn finish(self) -> ChangeSet {
        ChangeSet {
            changes: self.changes,
            focus_files: self.focus_files,
            stats: self.stats,
            focus_stats: self.focus_stats,
            diff_summary: DiffSummary {
                total_diff_size: self.total_diff_size,
                diff_too_large: self.diff_too_large,
                max_diff_size: self.options.max_diff_size,
                full_diff: self.full_diff,
            },
        }
    }
}
