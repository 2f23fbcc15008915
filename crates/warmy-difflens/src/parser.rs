//! Line-level parsing of single-file diff text.
//!
//! Two strategies exist and are chosen once per input by [`ParseMode::sniff`]:
//! hunk-aware parsing when the text carries at least one `@@` header, and
//! headerless parsing for bare `+`/`-` line lists.

use warmy_core::{LineChange, WarmyError};

/// Parsing strategy for a piece of diff text.
///
/// # Examples
///
/// ```
/// use warmy_difflens::parser::ParseMode;
///
/// assert_eq!(ParseMode::sniff("@@ -1 +1 @@\n+x\n"), ParseMode::HunkAware);
/// assert_eq!(ParseMode::sniff("--- a/f\n+++ b/f\n+x\n"), ParseMode::Headerless);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Lines are only collected after a `@@` hunk header.
    HunkAware,
    /// Lines are collected after the leading file-header block.
    Headerless,
}

impl ParseMode {
    /// Pick the strategy: hunk-aware iff some line starts with `@@`.
    pub fn sniff(text: &str) -> Self {
        if text.split('\n').any(|line| line.starts_with("@@")) {
            ParseMode::HunkAware
        } else {
            ParseMode::Headerless
        }
    }
}

/// Added and removed lines recovered from diff text, in encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedLines {
    /// Lines that started with `+`.
    pub additions: Vec<LineChange>,
    /// Lines that started with `-`.
    pub deletions: Vec<LineChange>,
}

const FILE_HEADER_PREFIXES: &[&str] = &[
    "diff --git",
    "index ",
    "--- ",
    "+++ ",
    "new file mode",
    "deleted file mode",
    "rename from",
    "rename to",
    "similarity index",
];

fn is_file_header(line: &str) -> bool {
    FILE_HEADER_PREFIXES.iter().any(|p| line.starts_with(p))
}

fn text_lines(text: &str) -> impl Iterator<Item = &str> {
    text.strip_suffix('\n').unwrap_or(text).split('\n')
}

/// Parse diff text into added and removed lines.
///
/// Header lines are never reported. A line made of only the `+`/`-` marker is
/// an empty-content record. Hunk header counts are not checked; use
/// [`parse_diff_strict`] for that.
///
/// # Examples
///
/// ```
/// use warmy_difflens::parser::parse_diff_text;
///
/// let diff = "diff --git a/config.yaml b/config.yaml\n\
///             --- a/config.yaml\n\
///             +++ b/config.yaml\n\
///             @@ -2,1 +2,1 @@\n\
///             -severity: critical\n\
///             +severity: high\n";
/// let parsed = parse_diff_text(diff);
/// assert_eq!(parsed.additions[0].content, "severity: high");
/// assert_eq!(parsed.deletions[0].content, "severity: critical");
/// ```
pub fn parse_diff_text(text: &str) -> ParsedLines {
    if text.trim().is_empty() {
        return ParsedLines::default();
    }
    match ParseMode::sniff(text) {
        ParseMode::HunkAware => parse_hunk_aware(text, None),
        ParseMode::Headerless => parse_headerless(text),
    }
}

/// Parse diff text like [`parse_diff_text`], additionally checking that every
/// hunk header's declared line counts match the lines that follow it.
///
/// Context lines count towards both sides. Headerless text has nothing to
/// check and always succeeds.
///
/// # Errors
///
/// Returns [`WarmyError::Parse`] for a malformed hunk header or a count
/// mismatch.
///
/// # Examples
///
/// ```
/// use warmy_difflens::parser::parse_diff_strict;
///
/// assert!(parse_diff_strict("@@ -1,1 +1,1 @@\n-a\n+b\n").is_ok());
/// assert!(parse_diff_strict("@@ -1,1 +1,3 @@\n-a\n+b\n").is_err());
/// ```
pub fn parse_diff_strict(text: &str) -> Result<ParsedLines, WarmyError> {
    if text.trim().is_empty() {
        return Ok(ParsedLines::default());
    }
    match ParseMode::sniff(text) {
        ParseMode::HunkAware => {
            let mut validator = HunkValidator::default();
            let parsed = parse_hunk_aware(text, Some(&mut validator));
            validator.finish()?;
            Ok(parsed)
        }
        ParseMode::Headerless => Ok(parse_headerless(text)),
    }
}

fn parse_hunk_aware(text: &str, mut validator: Option<&mut HunkValidator>) -> ParsedLines {
    let mut parsed = ParsedLines::default();
    let mut in_hunk = false;
    let lines: Vec<&str> = text_lines(text).collect();
    let mut skip = 0;

    for (idx, &line) in lines.iter().enumerate() {
        if skip > 0 {
            skip -= 1;
            continue;
        }

        if in_hunk && starts_path_header(&lines[idx..]) {
            in_hunk = false;
            if let Some(v) = validator.as_deref_mut() {
                v.close_hunk();
            }
            skip = 1;
            continue;
        }

        if line.starts_with("@@") {
            in_hunk = true;
            if let Some(v) = validator.as_deref_mut() {
                v.start_hunk(line);
            }
            continue;
        }

        if !in_hunk {
            continue;
        }

        if line.starts_with("diff --git") {
            in_hunk = false;
            if let Some(v) = validator.as_deref_mut() {
                v.close_hunk();
            }
            continue;
        }

        if let Some(content) = line.strip_prefix('+') {
            parsed.additions.push(LineChange::add(content));
            if let Some(v) = validator.as_deref_mut() {
                v.count(Side::New);
            }
        } else if let Some(content) = line.strip_prefix('-') {
            parsed.deletions.push(LineChange::delete(content));
            if let Some(v) = validator.as_deref_mut() {
                v.count(Side::Old);
            }
        } else if line.is_empty() || line.starts_with(' ') {
            if let Some(v) = validator.as_deref_mut() {
                v.count(Side::Both);
            }
        }
        // "\ No newline at end of file" and anything else is not a line of the file
    }

    if let Some(v) = validator {
        v.close_hunk();
    }
    parsed
}

/// `--- ` then `+++ ` then a hunk header: the path lines of the next file in a
/// plain unified diff without a `diff --git` line.
fn starts_path_header(lines: &[&str]) -> bool {
    match lines {
        [origin, destination, hunk, ..] => {
            origin.starts_with("--- ") && destination.starts_with("+++ ") && hunk.starts_with("@@")
        }
        _ => false,
    }
}

fn parse_headerless(text: &str) -> ParsedLines {
    let mut parsed = ParsedLines::default();
    let mut in_header = true;

    for line in text_lines(text) {
        if line.is_empty() {
            continue;
        }
        if line.starts_with("diff --git") {
            in_header = true;
            continue;
        }
        if in_header && is_file_header(line) {
            continue;
        }
        in_header = false;

        if let Some(content) = line.strip_prefix('+') {
            parsed.additions.push(LineChange::add(content));
        } else if let Some(content) = line.strip_prefix('-') {
            parsed.deletions.push(LineChange::delete(content));
        }
    }

    parsed
}

#[derive(Debug, Clone, Copy)]
enum Side {
    Old,
    New,
    Both,
}

#[derive(Debug)]
struct OpenHunk {
    header: String,
    old_lines: u32,
    new_lines: u32,
    seen_old: u32,
    seen_new: u32,
}

#[derive(Debug, Default)]
struct HunkValidator {
    open: Option<OpenHunk>,
    error: Option<WarmyError>,
}

impl HunkValidator {
    fn start_hunk(&mut self, line: &str) {
        self.close_hunk();
        match parse_hunk_header(line) {
            Ok((_, old_lines, _, new_lines)) => {
                self.open = Some(OpenHunk {
                    header: line.to_string(),
                    old_lines,
                    new_lines,
                    seen_old: 0,
                    seen_new: 0,
                });
            }
            Err(e) => self.fail(e),
        }
    }

    fn count(&mut self, side: Side) {
        if let Some(hunk) = self.open.as_mut() {
            match side {
                Side::Old => hunk.seen_old += 1,
                Side::New => hunk.seen_new += 1,
                Side::Both => {
                    hunk.seen_old += 1;
                    hunk.seen_new += 1;
                }
            }
        }
    }

    fn close_hunk(&mut self) {
        let Some(hunk) = self.open.take() else {
            return;
        };
        if hunk.seen_old != hunk.old_lines || hunk.seen_new != hunk.new_lines {
            self.fail(WarmyError::Parse(format!(
                "hunk `{}` declares -{} +{} lines but carries -{} +{}",
                hunk.header, hunk.old_lines, hunk.new_lines, hunk.seen_old, hunk.seen_new
            )));
        }
    }

    fn fail(&mut self, error: WarmyError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn finish(self) -> Result<(), WarmyError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn parse_hunk_header(line: &str) -> Result<(u32, u32, u32, u32), WarmyError> {
    let inner = line
        .strip_prefix("@@ ")
        .and_then(|s| {
            let end = s.find(" @@")?;
            Some(&s[..end])
        })
        .ok_or_else(|| WarmyError::Parse(format!("invalid hunk header: {line}")))?;

    let Some((old, new)) = inner.split_once(' ') else {
        return Err(WarmyError::Parse(format!("invalid hunk header: {line}")));
    };

    let old = old
        .strip_prefix('-')
        .ok_or_else(|| WarmyError::Parse(format!("invalid old range in hunk: {line}")))?;
    let new = new
        .strip_prefix('+')
        .ok_or_else(|| WarmyError::Parse(format!("invalid new range in hunk: {line}")))?;

    let (old_start, old_lines) = parse_range(old, line)?;
    let (new_start, new_lines) = parse_range(new, line)?;

    Ok((old_start, old_lines, new_start, new_lines))
}

fn parse_range(range: &str, context: &str) -> Result<(u32, u32), WarmyError> {
    let invalid = |what: &str| WarmyError::Parse(format!("invalid range {what} in: {context}"));
    match range.split_once(',') {
        Some((start, count)) => Ok((
            start.parse().map_err(|_| invalid("number"))?,
            count.parse().map_err(|_| invalid("count"))?,
        )),
        None => Ok((range.parse().map_err(|_| invalid("number"))?, 1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warmy_core::LineKind;

    fn contents(lines: &[LineChange]) -> Vec<&str> {
        lines.iter().map(|l| l.content.as_str()).collect()
    }

    #[test]
    fn empty_text_returns_empty_lists() {
        assert_eq!(parse_diff_text(""), ParsedLines::default());
        assert_eq!(parse_diff_text("\n  \n"), ParsedLines::default());
    }

    #[test]
    fn header_lines_are_not_reported() {
        let diff = "\
diff --git a/new.rs b/new.rs
new file mode 100644
--- /dev/null
+++ b/new.rs
@@ -0,0 +1,2 @@
+fn hello() {
+}
";
        let parsed = parse_diff_text(diff);
        assert_eq!(contents(&parsed.additions), vec!["fn hello() {", "}"]);
        assert!(parsed.deletions.is_empty());
        assert!(parsed.additions.iter().all(|l| l.kind == LineKind::Add));
    }

    #[test]
    fn context_lines_are_skipped() {
        let diff = "\
--- a/lib.rs
+++ b/lib.rs
@@ -1,3 +1,3 @@
 fn foo() {
-    bar();
+    baz();
 }
";
        let parsed = parse_diff_text(diff);
        assert_eq!(contents(&parsed.additions), vec!["    baz();"]);
        assert_eq!(contents(&parsed.deletions), vec!["    bar();"]);
    }

    #[test]
    fn lines_before_first_hunk_are_ignored() {
        let diff = "+not a change\n@@ -1 +1 @@\n+real\n";
        let parsed = parse_diff_text(diff);
        assert_eq!(contents(&parsed.additions), vec!["real"]);
    }

    #[test]
    fn marker_only_line_is_empty_record() {
        let parsed = parse_diff_text("@@ -1,1 +1,1 @@\n-\n+\n");
        assert_eq!(contents(&parsed.additions), vec![""]);
        assert_eq!(contents(&parsed.deletions), vec![""]);
    }

    #[test]
    fn body_lines_looking_like_headers_are_content() {
        // deleted "-- a/x" and added "++ b/x" inside a hunk
        let parsed = parse_diff_text("@@ -1,1 +1,1 @@\n--- a/x\n+++ b/x\n");
        assert_eq!(contents(&parsed.deletions), vec!["-- a/x"]);
        assert_eq!(contents(&parsed.additions), vec!["++ b/x"]);
    }

    #[test]
    fn no_newline_marker_skipped() {
        let diff = "@@ -1 +1 @@\n-old\n\\ No newline at end of file\n+new\n";
        let parsed = parse_diff_text(diff);
        assert_eq!(contents(&parsed.deletions), vec!["old"]);
        assert_eq!(contents(&parsed.additions), vec!["new"]);
    }

    #[test]
    fn second_file_header_resets_to_header_state() {
        let diff = "\
diff --git a/a b/a
--- a/a
+++ b/a
@@ -1,0 +1,1 @@
+one
diff --git a/b b/b
--- a/b
+++ b/b
@@ -1,1 +1,0 @@
-two
";
        let parsed = parse_diff_text(diff);
        assert_eq!(contents(&parsed.additions), vec!["one"]);
        assert_eq!(contents(&parsed.deletions), vec!["two"]);
    }

    #[test]
    fn path_lines_of_next_file_end_the_hunk() {
        let diff = "\
--- a/f
+++ b/f
@@ -1,1 +1,1 @@
-x
+y
--- a/g
+++ b/g
@@ -1,1 +1,1 @@
-p
+q
";
        let parsed = parse_diff_strict(diff).unwrap();
        assert_eq!(contents(&parsed.additions), vec!["y", "q"]);
        assert_eq!(contents(&parsed.deletions), vec!["x", "p"]);
        assert_eq!(parse_diff_text(diff), parsed);
    }

    #[test]
    fn headerless_text_skips_leading_headers() {
        let diff = "\
diff --git a/config.yaml b/config.yaml
--- a/config.yaml
+++ b/config.yaml
-severity: critical
+severity: high
";
        assert_eq!(ParseMode::sniff(diff), ParseMode::Headerless);
        let parsed = parse_diff_text(diff);
        assert_eq!(contents(&parsed.additions), vec!["severity: high"]);
        assert_eq!(contents(&parsed.deletions), vec!["severity: critical"]);
    }

    #[test]
    fn headerless_rename_without_changes_is_empty() {
        let diff = "diff --git a/a b/b\nrename from a\nrename to b\n";
        assert_eq!(parse_diff_text(diff), ParsedLines::default());
    }

    #[test]
    fn headerless_bare_lines() {
        let parsed = parse_diff_text("+x\n-y\n");
        assert_eq!(contents(&parsed.additions), vec!["x"]);
        assert_eq!(contents(&parsed.deletions), vec!["y"]);
    }

    #[test]
    fn order_is_encounter_order() {
        let parsed = parse_diff_text("@@ -1,2 +1,2 @@\n+b\n-z\n+a\n-y\n");
        assert_eq!(contents(&parsed.additions), vec!["b", "a"]);
        assert_eq!(contents(&parsed.deletions), vec!["z", "y"]);
    }

    #[test]
    fn lenient_mode_ignores_count_drift() {
        let parsed = parse_diff_text("@@ -0,0 +1,5 @@\n+only one\n");
        assert_eq!(parsed.additions.len(), 1);
    }

    #[test]
    fn strict_mode_counts_context_on_both_sides() {
        let diff = "@@ -1,3 +1,3 @@\n a\n-b\n+c\n d\n";
        let parsed = parse_diff_strict(diff).unwrap();
        assert_eq!(parsed.additions.len(), 1);
    }

    #[test]
    fn strict_mode_reports_mismatch() {
        let err = parse_diff_strict("@@ -0,0 +1,5 @@\n+only one\n").unwrap_err();
        assert!(err.to_string().contains("declares -0 +5"));
    }

    #[test]
    fn strict_mode_checks_every_hunk() {
        let diff = "@@ -1,1 +1,1 @@\n-a\n+b\n@@ -9,2 +9,1 @@\n-c\n+d\n";
        assert!(parse_diff_strict(diff).is_err());
    }

    #[test]
    fn strict_mode_rejects_malformed_header() {
        assert!(matches!(
            parse_diff_strict("@@ bogus @@\n+x\n"),
            Err(WarmyError::Parse(_))
        ));
    }

    #[test]
    fn hunk_header_without_counts_defaults_to_one() {
        assert_eq!(parse_hunk_header("@@ -3 +4 @@").unwrap(), (3, 1, 4, 1));
        assert_eq!(
            parse_hunk_header("@@ -1,3 +1,4 @@ fn main() {").unwrap(),
            (1, 3, 1, 4)
        );
    }
}
