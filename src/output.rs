use std::fs;
use std::path::{Path, PathBuf};

use warmy_core::{CommitInfo, WarmyError};

/// `<short_hash>-<analyze_time>.json`
pub fn report_file_name(report: &CommitInfo) -> String {
    format!("{}-{}.json", report.short_hash, report.analyze_time)
}

/// Write `json` to `dir/name`, creating `dir` when missing.
pub fn write_report(dir: &Path, name: &str, json: &str) -> Result<PathBuf, WarmyError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(name);
    fs::write(&path, json)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("reports/nested");
        let path = write_report(&target, "abc.json", "{}").unwrap();
        assert_eq!(path, target.join("abc.json"));
        assert_eq!(fs::read_to_string(path).unwrap(), "{}");
    }

    #[test]
    fn write_into_a_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        assert!(matches!(
            write_report(&blocker, "r.json", "{}"),
            Err(WarmyError::Io(_))
        ));
    }
}
