//! Diff synthesis, diff parsing, focus classification, and change aggregation.
//!
//! Turns the per-file output of a tree comparison into change records with
//! synthesized diff text, re-parses that text into line-level additions and
//! deletions, flags "focus" changes by path and content rules, and folds every
//! file into commit-wide statistics. Nothing in this crate touches a repository;
//! see `warmy-gitscan` for the git2-backed side.

pub mod aggregate;
pub mod classify;
pub mod focus;
pub mod parser;
pub mod synth;
