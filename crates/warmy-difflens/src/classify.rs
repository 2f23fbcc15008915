//! Line classification against compiled regular expressions.

use regex::Regex;
use warmy_core::{PatternKind, WarmyError};

/// An ordered, immutable list of compiled patterns from one configuration list.
///
/// # Examples
///
/// ```
/// use warmy_core::PatternKind;
/// use warmy_difflens::classify::PatternSet;
///
/// let set = PatternSet::compile(PatternKind::Ignore, &["digest", r"^\s*#"]).unwrap();
/// assert!(set.matches("image_digest: sha256:abc"));
/// assert!(set.matches("  # comment"));
/// assert!(!set.matches("severity: high"));
/// ```
#[derive(Debug, Clone)]
pub struct PatternSet {
    kind: PatternKind,
    patterns: Vec<Regex>,
}

impl PatternSet {
    /// Compile every source pattern, failing on the first invalid one.
    ///
    /// # Errors
    ///
    /// Returns [`WarmyError::Pattern`] naming the offending pattern.
    ///
    /// # Examples
    ///
    /// ```
    /// use warmy_core::{PatternKind, WarmyError};
    /// use warmy_difflens::classify::PatternSet;
    ///
    /// let err = PatternSet::compile(PatternKind::File, &["ok", "("]).unwrap_err();
    /// assert!(matches!(err, WarmyError::Pattern { ref pattern, .. } if pattern == "("));
    /// ```
    pub fn compile<S: AsRef<str>>(kind: PatternKind, sources: &[S]) -> Result<Self, WarmyError> {
        let mut patterns = Vec::with_capacity(sources.len());
        for source in sources {
            let source = source.as_ref();
            let regex = Regex::new(source).map_err(|e| WarmyError::Pattern {
                kind,
                pattern: source.to_string(),
                source: e,
            })?;
            patterns.push(regex);
        }
        Ok(Self { kind, patterns })
    }

    /// A set that matches nothing.
    pub fn empty(kind: PatternKind) -> Self {
        Self {
            kind,
            patterns: Vec::new(),
        }
    }

    /// Which configuration list the patterns came from.
    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    /// `true` iff any pattern matches anywhere in `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.first_match(text).is_some()
    }

    /// The first pattern (in configuration order) matching `text`.
    pub fn first_match(&self, text: &str) -> Option<&Regex> {
        self.patterns.iter().find(|re| re.is_match(text))
    }

    /// Number of compiled patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// `true` when the set holds no patterns.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Classify one line of text: `true` iff any of `patterns` matches it.
///
/// # Examples
///
/// ```
/// use warmy_core::PatternKind;
/// use warmy_difflens::classify::{classify, PatternSet};
///
/// let ignore = PatternSet::compile(PatternKind::Ignore, &["digest"]).unwrap();
/// assert!(classify("digest: abc", &ignore));
/// assert!(!classify("severity: low", &ignore));
/// ```
pub fn classify(content: &str, patterns: &PatternSet) -> bool {
    patterns.matches(content)
}
