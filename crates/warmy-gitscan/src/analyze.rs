//! Single-commit analysis: the whole pipeline from a configuration to a report.

use chrono::{DateTime, FixedOffset, Local, Offset, Utc};
use git2::{Commit, Repository, Signature, Tree};
use tracing::{info, warn};
use warmy_core::{split_commit_message, AuthorInfo, CommitInfo, WarmyConfig, WarmyError};
use warmy_difflens::aggregate::{AggregateOptions, ChangeAggregator, ChangeSet};
use warmy_difflens::focus::FocusMatcher;

use crate::refs::{branches_at, tags_at};
use crate::repo::{open_repository, resolve_commit, short_hash};
use crate::tree::{collect_file_changes, collect_root_files};

/// Length of `CommitInfo::short_hash`.
pub const SHORT_HASH_LEN: usize = 8;

const SIGNATURE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";
const ANALYZE_TIME_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Analyze the commit named by `config.commit_hash` in `config.repo_path`.
///
/// Branch and tag lookup failures leave those lists empty, and a failure to
/// compute the changes leaves an empty change list with zeroed statistics.
/// Both are logged at warn level.
///
/// # Errors
///
/// Fails when the repository cannot be opened, the commit cannot be resolved,
/// or its tree cannot be read.
///
/// # Examples
///
/// ```no_run
/// use warmy_core::WarmyConfig;
/// use warmy_difflens::focus::FocusMatcher;
/// use warmy_gitscan::analyze::analyze_commit;
///
/// let config = WarmyConfig::default();
/// let matcher = FocusMatcher::new(&config.focus).unwrap();
/// let report = analyze_commit(&config, &matcher).unwrap();
/// println!("{} changed {} files", report.short_hash, report.stats.total_files);
/// ```
pub fn analyze_commit(
    config: &WarmyConfig,
    matcher: &FocusMatcher,
) -> Result<CommitInfo, WarmyError> {
    let repo = open_repository(&config.repo_path)?;
    let commit = resolve_commit(&repo, &config.commit_hash)?;
    let hash = commit.id().to_string();
    info!(commit = hash.as_str(), "analyzing commit");

    let tree = commit
        .tree()
        .map_err(|e| WarmyError::Git(format!("failed to get commit tree: {e}")))?;

    let branches = branches_at(&repo, commit.id()).unwrap_or_else(|e| {
        warn!(error = %e, "failed to look up branches");
        Vec::new()
    });
    let tags = tags_at(&repo, commit.id()).unwrap_or_else(|e| {
        warn!(error = %e, "failed to look up tags");
        Vec::new()
    });

    let changes = build_change_set(&repo, &commit, &tree, config, matcher).unwrap_or_else(|e| {
        warn!(error = %e, "failed to compute changes");
        ChangeSet::empty(config.max_diff_size)
    });

    let full_message = String::from_utf8_lossy(commit.message_bytes()).trim().to_string();
    let (message, description) = split_commit_message(&full_message);

    let report = CommitInfo {
        short_hash: short_hash(&hash, SHORT_HASH_LEN).to_string(),
        author: author_info(&commit.author()),
        committer: author_info(&commit.committer()),
        message,
        description,
        full_message,
        parent_hashes: commit.parent_ids().map(|id| id.to_string()).collect(),
        files_changed: changes.files_changed(),
        changes: changes.changes,
        focus_files: changes.focus_files,
        timestamp: commit.time().seconds(),
        tree_hash: tree.id().to_string(),
        stats: changes.stats,
        diff_summary: changes.diff_summary,
        branches,
        tags,
        output_file: String::new(),
        analyze_time: Local::now().format(ANALYZE_TIME_FORMAT).to_string(),
        focus_stats: changes.focus_stats,
        hash,
    };

    info!(
        commit = report.short_hash.as_str(),
        files = report.stats.total_files,
        additions = report.stats.total_additions,
        deletions = report.stats.total_deletions,
        focus_files = report.focus_stats.total_focus_files,
        "commit analyzed"
    );
    Ok(report)
}

/// Run every file of `commit` through a [`ChangeAggregator`].
///
/// A commit with no parent has each tracked file reported as wholly added;
/// otherwise the tree is compared with the first parent's.
///
/// # Errors
///
/// Returns [`WarmyError::Git`] if the parent or the tree comparison cannot be
/// read.
pub fn build_change_set(
    repo: &Repository,
    commit: &Commit<'_>,
    tree: &Tree<'_>,
    config: &WarmyConfig,
    matcher: &FocusMatcher,
) -> Result<ChangeSet, WarmyError> {
    let mut aggregator = ChangeAggregator::new(AggregateOptions::from(config), matcher);

    if commit.parent_count() == 0 {
        for file in collect_root_files(repo, tree)? {
            aggregator.push_root_file(file);
        }
    } else {
        let parent = commit
            .parent(0)
            .map_err(|e| WarmyError::Git(format!("failed to get parent: {e}")))?;
        let parent_tree = parent
            .tree()
            .map_err(|e| WarmyError::Git(format!("failed to get parent tree: {e}")))?;
        for change in collect_file_changes(repo, Some(&parent_tree), tree)? {
            aggregator.push_change(&change);
        }
    }

    Ok(aggregator.finish())
}

fn author_info(signature: &Signature<'_>) -> AuthorInfo {
    let when = signature.when();
    AuthorInfo {
        name: String::from_utf8_lossy(signature.name_bytes()).into_owned(),
        email: String::from_utf8_lossy(signature.email_bytes()).into_owned(),
        when: format_signature_time(when.seconds(), when.offset_minutes()),
    }
}

/// Render a signature time in its own UTC offset.
///
/// # Examples
///
/// ```
/// use warmy_gitscan::analyze::format_signature_time;
///
/// assert_eq!(format_signature_time(0, 0), "1970-01-01 00:00:00 +0000");
/// assert_eq!(format_signature_time(3600, 120), "1970-01-01 03:00:00 +0200");
/// ```
pub fn format_signature_time(seconds: i64, offset_minutes: i32) -> String {
    let offset = FixedOffset::east_opt(offset_minutes * 60).unwrap_or_else(|| Utc.fix());
    match DateTime::from_timestamp(seconds, 0) {
        Some(utc) => utc.with_timezone(&offset).format(SIGNATURE_TIME_FORMAT).to_string(),
        None => seconds.to_string(),
    }
}
