use std::process::Command;

use warmy_core::WarmyConfig;

#[test]
fn init_creates_valid_toml() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_warmy"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "warmy init failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let config_path = dir.path().join(".warmy.toml");
    assert!(config_path.exists(), ".warmy.toml should exist");

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[focus]"));
    assert!(content.contains("max_diff_size"));

    let config = WarmyConfig::from_file(&config_path).unwrap();
    assert!(config.focus.enable);
    assert_eq!(config.max_diff_size, 1024 * 1024);

    let raw: toml::Value = toml::from_str(&content).unwrap();
    assert!(raw.get("focus").is_some());
}

#[test]
fn init_commented_patterns_parse_as_lists() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_warmy"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let content = std::fs::read_to_string(dir.path().join(".warmy.toml")).unwrap();
    let enabled = content
        .replace("# file_patterns", "file_patterns")
        .replace("# ignore_patterns", "ignore_patterns")
        .replace("# parse_diff", "parse_diff");

    let config = WarmyConfig::from_toml(&enabled).unwrap();
    assert_eq!(config.focus.file_patterns, vec![r".*\.ya?ml$"]);
    assert_eq!(config.focus.ignore_patterns, vec!["digest", r"^\s*#"]);
    assert!(config.parse_diff);
    assert!(!config.include_full_diff);
    assert_eq!(config.commit_hash, "");
}

#[test]
fn init_refuses_if_exists() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".warmy.toml"), "# existing").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_warmy"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let content = std::fs::read_to_string(dir.path().join(".warmy.toml")).unwrap();
    assert_eq!(content, "# existing");
}
