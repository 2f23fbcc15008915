//! Repository opening and commit resolution.

use std::path::Path;

use git2::{Commit, ErrorCode, Oid, Repository};
use tracing::debug;
use warmy_core::WarmyError;

/// Open the repository at `path`.
///
/// # Errors
///
/// Returns [`WarmyError::Git`] if `path` is not a git repository.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use warmy_gitscan::repo::open_repository;
///
/// let repo = open_repository(Path::new(".")).unwrap();
/// assert!(!repo.is_bare());
/// ```
pub fn open_repository(path: &Path) -> Result<Repository, WarmyError> {
    Repository::open(path).map_err(|e| {
        WarmyError::Git(format!(
            "failed to open repository at {}: {}",
            path.display(),
            e.message()
        ))
    })
}

/// Resolve a commit reference: a full hash, a hash prefix unique among commits,
/// or any other revision git understands. An empty reference means `HEAD`.
///
/// Hex input that git rejects as unknown or ambiguous is matched against every
/// commit object, so short prefixes and prefixes shared with trees or blobs still
/// resolve when exactly one commit carries them.
///
/// # Errors
///
/// Returns [`WarmyError::CommitNotFound`] when no commit (or more than one)
/// matches, or the reference does not point at a commit.
pub fn resolve_commit<'r>(
    repo: &'r Repository,
    reference: &str,
) -> Result<Commit<'r>, WarmyError> {
    let spec = match reference.trim() {
        "" => "HEAD",
        other => other,
    };

    let object = match repo.revparse_single(spec) {
        Ok(object) => object,
        Err(e) if is_hex(spec) && is_unresolved(&e) => return commit_by_prefix(repo, spec),
        Err(e) => {
            return Err(WarmyError::CommitNotFound(format!("{spec} ({})", e.message())));
        }
    };

    object
        .peel_to_commit()
        .map_err(|e| WarmyError::CommitNotFound(format!("{spec} ({})", e.message())))
}

fn is_unresolved(error: &git2::Error) -> bool {
    matches!(error.code(), ErrorCode::Ambiguous | ErrorCode::NotFound)
}

fn is_hex(spec: &str) -> bool {
    !spec.is_empty() && spec.len() <= 40 && spec.bytes().all(|b| b.is_ascii_hexdigit())
}

fn commit_by_prefix<'r>(repo: &'r Repository, prefix: &str) -> Result<Commit<'r>, WarmyError> {
    let prefix = prefix.to_ascii_lowercase();
    let odb = repo
        .odb()
        .map_err(|e| WarmyError::Git(format!("failed to open object database: {e}")))?;

    let mut candidates: Vec<Oid> = Vec::new();
    odb.foreach(|oid| {
        if oid.to_string().starts_with(&prefix) {
            candidates.push(*oid);
        }
        true
    })
    .map_err(|e| WarmyError::Git(format!("failed to scan objects: {e}")))?;
    candidates.sort();
    candidates.dedup();

    let mut commits = candidates.into_iter().filter_map(|oid| repo.find_commit(oid).ok());
    match (commits.next(), commits.next()) {
        (Some(commit), None) => {
            debug!(prefix = prefix.as_str(), commit = %commit.id(), "resolved commit by prefix");
            Ok(commit)
        }
        (Some(_), Some(_)) => {
            Err(WarmyError::CommitNotFound(format!("{prefix} (ambiguous prefix)")))
        }
        (None, _) => Err(WarmyError::CommitNotFound(format!("{prefix} (no matching commit)"))),
    }
}

/// The first `len` characters of a hash.
///
/// # Examples
///
/// ```
/// use warmy_gitscan::repo::short_hash;
///
/// assert_eq!(short_hash("0123456789abcdef", 8), "01234567");
/// assert_eq!(short_hash("abc", 8), "abc");
/// ```
pub fn short_hash(hash: &str, len: usize) -> &str {
    hash.get(..len).unwrap_or(hash)
}
