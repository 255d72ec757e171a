// tests/config_test.rs
use git_semver::config::{
    load_config, locate_config, AssemblyVersioningScheme, Config, VersionStrategyKind, Workflow, CONFIG_FILE_NAME,
};
use serial_test::serial;
use std::env;
use std::fs;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

#[test]
fn test_load_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let toml_content = r#"
workflow = "TrunkBased"
tag_prefix = "release-"
next_version = "3.0.0"
assembly_versioning_scheme = "MajorMinor"
strategies = ["TaggedCommit", "TrunkBased"]

[[branches]]
name = "feature"
label = "feat-{BranchName}"
"#;
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = load_config(Some(temp_file.path())).unwrap();
    assert_eq!(config.workflow, Workflow::TrunkBased);
    assert_eq!(config.tag_prefix, "release-");
    assert_eq!(config.next_version.as_deref(), Some("3.0.0"));
    assert_eq!(config.assembly_versioning_scheme, AssemblyVersioningScheme::MajorMinor);
    assert_eq!(
        config.strategies,
        vec![VersionStrategyKind::TaggedCommit, VersionStrategyKind::TrunkBased]
    );

    let resolved = config.resolve().unwrap();
    let feature = resolved.branch_type("feature").unwrap();
    assert_eq!(feature.label.as_deref(), Some("feat-{BranchName}"));
    assert!(!resolved.strategy_enabled(VersionStrategyKind::MergeMessage));
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let result = load_config(Some(&dir.path().join("nope.toml")));
    assert!(result.is_err());
}

#[test]
fn test_malformed_file_names_the_path() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"workflow = [\n").unwrap();
    temp_file.flush().unwrap();

    let err = load_config(Some(temp_file.path())).unwrap_err();
    assert!(err.is_configuration_error());
    assert!(err.to_string().contains(&temp_file.path().display().to_string()));
}

#[test]
fn test_invalid_regex_fails_resolution() {
    let mut config = Config::default();
    config.major_version_bump_message = "(unclosed".to_string();
    assert!(config.resolve().is_err());
}

#[test]
#[serial]
fn test_config_in_working_directory_is_found() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(CONFIG_FILE_NAME), "workflow = \"TrunkBased\"\n").unwrap();
    let original_dir = env::current_dir().unwrap();

    env::set_current_dir(dir.path()).expect("Could not change to temp dir");
    let located = locate_config(None);
    let config = load_config(None);
    env::set_current_dir(original_dir).unwrap();

    assert!(located.is_some());
    assert_eq!(config.unwrap().workflow, Workflow::TrunkBased);
}

#[test]
#[serial]
fn test_explicit_path_wins_over_working_directory() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(CONFIG_FILE_NAME), "workflow = \"TrunkBased\"\n").unwrap();
    let explicit = dir.path().join("other.toml");
    fs::write(&explicit, "workflow = \"GitFlow\"\n").unwrap();
    let original_dir = env::current_dir().unwrap();

    env::set_current_dir(dir.path()).expect("Could not change to temp dir");
    let config = load_config(Some(&explicit));
    env::set_current_dir(original_dir).unwrap();

    assert_eq!(config.unwrap().workflow, Workflow::GitFlow);
}
