//! Branches and tags pointing at a commit.

use git2::{Oid, Repository};
use warmy_core::WarmyError;

/// Local and remote-tracking branches whose tip is `oid`, sorted by name.
///
/// Symbolic refs such as `origin/HEAD` are skipped.
///
/// # Errors
///
/// Returns [`WarmyError::Git`] if the branch list cannot be read.
pub fn branches_at(repo: &Repository, oid: Oid) -> Result<Vec<String>, WarmyError> {
    let branches = repo
        .branches(None)
        .map_err(|e| WarmyError::Git(format!("failed to list branches: {e}")))?;

    let mut names = Vec::new();
    for entry in branches {
        let (branch, _) =
            entry.map_err(|e| WarmyError::Git(format!("failed to read branch: {e}")))?;
        if branch.get().target() != Some(oid) {
            continue;
        }
        if let Some(name) = branch
            .name()
            .map_err(|e| WarmyError::Git(format!("failed to read branch name: {e}")))?
        {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// Tags whose target, peeled through annotated tag objects, is `oid`, sorted
/// by name.
///
/// # Errors
///
/// Returns [`WarmyError::Git`] if the tag list cannot be read.
pub fn tags_at(repo: &Repository, oid: Oid) -> Result<Vec<String>, WarmyError> {
    let tag_names = repo
        .tag_names(None)
        .map_err(|e| WarmyError::Git(format!("failed to list tags: {e}")))?;

    let mut names = Vec::new();
    for name in tag_names.iter().flatten() {
        let Ok(reference) = repo.find_reference(&format!("refs/tags/{name}")) else {
            continue;
        };
        // tags on trees or blobs never match a commit
        let Ok(target) = reference.peel_to_commit() else {
            continue;
        };
        if target.id() == oid {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}
