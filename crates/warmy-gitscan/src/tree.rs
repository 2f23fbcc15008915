//! Tree comparison and tree walking.
//!
//! Turns git2 diff deltas into [`FileChange`] values for the aggregator, and
//! reads every blob of a root commit's tree into [`RootFile`] values.

use git2::{
    Delta, Diff, DiffFile, DiffFindOptions, DiffOptions, ObjectType, Oid, Patch, Repository, Tree,
    TreeWalkMode, TreeWalkResult,
};
use tracing::debug;
use warmy_core::{LineKind, WarmyError};
use warmy_difflens::aggregate::RootFile;
use warmy_difflens::synth::{FileChange, Hunk};

/// Compare two trees and return one [`FileChange`] per changed file, in diff
/// order, with renames detected.
///
/// Copies and other unsupported delta kinds are skipped.
///
/// # Errors
///
/// Returns [`WarmyError::Git`] if the comparison or patch generation fails.
pub fn collect_file_changes(
    repo: &Repository,
    old_tree: Option<&Tree<'_>>,
    new_tree: &Tree<'_>,
) -> Result<Vec<FileChange>, WarmyError> {
    let mut diff_opts = DiffOptions::new();
    let mut diff = repo
        .diff_tree_to_tree(old_tree, Some(new_tree), Some(&mut diff_opts))
        .map_err(|e| WarmyError::Git(format!("failed to compute diff: {e}")))?;

    let mut find_opts = DiffFindOptions::new();
    find_opts.renames(true);
    diff.find_similar(Some(&mut find_opts))
        .map_err(|e| WarmyError::Git(format!("failed to find renames: {e}")))?;

    let mut changes = Vec::new();
    for idx in 0..diff.deltas().len() {
        if let Some(change) = file_change(repo, &diff, idx)? {
            changes.push(change);
        }
    }
    Ok(changes)
}

fn file_change(
    repo: &Repository,
    diff: &Diff<'_>,
    idx: usize,
) -> Result<Option<FileChange>, WarmyError> {
    let Some(delta) = diff.get_delta(idx) else {
        return Ok(None);
    };

    let old = path_of(&delta.old_file());
    let new = path_of(&delta.new_file());
    let change = match (delta.status(), old, new) {
        (Delta::Added, _, Some(new)) => FileChange::added(&new),
        (Delta::Deleted, Some(old), _) => FileChange::deleted(&old),
        (Delta::Modified | Delta::Typechange, _, Some(new)) => FileChange::modified(&new),
        (Delta::Renamed, Some(old), Some(new)) => FileChange::renamed(&old, &new),
        (status, old, new) => {
            debug!(?status, ?old, ?new, "skipping unsupported delta");
            return Ok(None);
        }
    };

    let sized_side = match delta.status() {
        Delta::Deleted => delta.old_file(),
        _ => delta.new_file(),
    };
    let mut change = change
        .with_size(blob_size(repo, &sized_side))
        .with_binary(delta.flags().is_binary());

    let patch = Patch::from_diff(diff, idx)
        .map_err(|e| WarmyError::Git(format!("failed to build patch for {}: {e}", change.path())))?;
    let Some(patch) = patch else {
        return Ok(Some(change));
    };

    if patch.delta().flags().is_binary() {
        change.binary = true;
    }

    for hunk_idx in 0..patch.num_hunks() {
        let (header, line_count) = patch
            .hunk(hunk_idx)
            .map_err(|e| WarmyError::Git(format!("failed to read hunk: {e}")))?;
        let mut hunk = Hunk::new(header.old_start(), header.new_start());
        for line_idx in 0..line_count {
            let line = patch
                .line_in_hunk(hunk_idx, line_idx)
                .map_err(|e| WarmyError::Git(format!("failed to read hunk line: {e}")))?;
            let kind = match line.origin() {
                '+' => LineKind::Add,
                '-' => LineKind::Delete,
                _ => continue,
            };
            hunk.push_line(kind, line_text(line.content()));
        }
        change.hunks.push(hunk);
    }

    Ok(Some(change))
}

fn path_of(file: &DiffFile<'_>) -> Option<String> {
    file.path().map(|p| p.to_string_lossy().into_owned())
}

fn blob_size(repo: &Repository, file: &DiffFile<'_>) -> u64 {
    if file.id().is_zero() {
        return file.size();
    }
    repo.find_blob(file.id())
        .map(|blob| blob.size() as u64)
        .unwrap_or_else(|_| file.size())
}

fn line_text(content: &[u8]) -> String {
    let content = content.strip_suffix(b"\n").unwrap_or(content);
    String::from_utf8_lossy(content).into_owned()
}

/// Read every blob reachable from `tree`, recursively, in tree order.
///
/// Blobs git flags as binary, or whose content is not UTF-8, are returned as
/// unreadable with the reason. Submodule entries are skipped.
///
/// # Errors
///
/// Returns [`WarmyError::Git`] if the tree cannot be walked.
pub fn collect_root_files(repo: &Repository, tree: &Tree<'_>) -> Result<Vec<RootFile>, WarmyError> {
    let mut entries: Vec<(String, Oid)> = Vec::new();
    tree.walk(TreeWalkMode::PreOrder, |root, entry| {
        if entry.kind() == Some(ObjectType::Blob) {
            let name = String::from_utf8_lossy(entry.name_bytes());
            entries.push((format!("{root}{name}"), entry.id()));
        }
        TreeWalkResult::Ok
    })
    .map_err(|e| WarmyError::Git(format!("failed to walk tree: {e}")))?;

    Ok(entries
        .into_iter()
        .map(|(path, oid)| read_root_file(repo, path, oid))
        .collect())
}

fn read_root_file(repo: &Repository, path: String, oid: Oid) -> RootFile {
    let blob = match repo.find_blob(oid) {
        Ok(blob) => blob,
        Err(e) => return RootFile::unreadable(path, 0, e.message()),
    };
    let size = blob.size() as u64;
    if blob.is_binary() {
        return RootFile::unreadable(path, size, "binary content");
    }
    match std::str::from_utf8(blob.content()) {
        Ok(text) => RootFile {
            size,
            ..RootFile::text(path, text)
        },
        Err(e) => RootFile::unreadable(path, size, format!("invalid UTF-8: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_text_strips_one_newline() {
        assert_eq!(line_text(b"severity: high\n"), "severity: high");
        assert_eq!(line_text(b"no newline"), "no newline");
        assert_eq!(line_text(b"\n"), "");
        assert_eq!(line_text(b"crlf\r\n"), "crlf\r");
    }
}
