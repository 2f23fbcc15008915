//! Git access for warmy via git2.
//!
//! Opens a repository, resolves the commit to analyze, compares its tree with
//! its first parent (or walks the whole tree for a root commit) and feeds the
//! result through the `warmy-difflens` aggregator to build a [`CommitInfo`].
//!
//! [`CommitInfo`]: warmy_core::CommitInfo

pub mod analyze;
pub mod refs;
pub mod repo;
pub mod tree;
