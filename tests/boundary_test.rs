use git_semver::boundary::BoundaryWarning;
use git_semver::config::{Config, Workflow};
use git_semver::git::MockRepository;
use git_semver::{calculate_version, ui};

// ============================================================================
// BoundaryWarning Display Tests
// ============================================================================

#[test]
fn test_boundary_warning_unparsable_branch_version_display() {
    let warning = BoundaryWarning::UnparsableBranchVersion {
        branch: "release/next".to_string(),
    };

    let display_msg = warning.to_string();
    assert!(
        display_msg.contains("release/next"),
        "Message should contain the branch name, got: {}",
        display_msg
    );
    assert!(
        display_msg.contains("parsable version"),
        "Message should explain the problem, got: {}",
        display_msg
    );
}

#[test]
fn test_boundary_warning_no_version_tag_display() {
    let warning = BoundaryWarning::NoVersionTag {
        branch: "feature/foo".to_string(),
        fallback_version: "0.1.0".to_string(),
    };

    let display_msg = warning.to_string();
    assert!(
        display_msg.contains("No version tag"),
        "Message should contain 'No version tag', got: {}",
        display_msg
    );
    assert!(
        display_msg.contains("0.1.0"),
        "Message should contain the fallback version, got: {}",
        display_msg
    );
}

#[test]
fn test_boundary_warning_unparsable_tag_display() {
    let warning = BoundaryWarning::UnparsableTag {
        tag: "v1.2.x".to_string(),
        reason: "Invalid format".to_string(),
    };

    let display_msg = warning.to_string();
    assert!(
        display_msg.contains("v1.2.x"),
        "Message should contain tag 'v1.2.x', got: {}",
        display_msg
    );
    assert!(
        display_msg.contains("Invalid format"),
        "Message should contain reason, got: {}",
        display_msg
    );
}

#[test]
fn test_boundary_warning_corrupt_cache_entry_shortens_key() {
    let warning = BoundaryWarning::CorruptCacheEntry {
        key: "0123456789abcdef0123456789abcdef".to_string(),
        reason: "expected value".to_string(),
    };

    let display_msg = warning.to_string();
    assert!(
        display_msg.contains("0123456789ab "),
        "Message should contain the shortened key, got: {}",
        display_msg
    );
    assert!(
        !display_msg.contains("0123456789abcdef0123"),
        "Message should not contain the full key, got: {}",
        display_msg
    );
}

#[test]
fn test_display_warning_does_not_panic() {
    // Visual verification test - output is printed to stderr
    ui::display_warning(&BoundaryWarning::UnparsableBranchVersion {
        branch: "release/next".to_string(),
    });
}

// ============================================================================
// Warnings raised during calculation
// ============================================================================

#[test]
fn test_unparsable_tag_is_reported_and_ignored() {
    let mut repo = MockRepository::new();
    let a = repo.commit("main", "A");
    repo.tag("1.0.0", a);
    let b = repo.commit("main", "B");
    repo.tag("v1.2.x", b);
    repo.tag("nightly", b);
    repo.commit("main", "C");

    let config = Config::for_workflow(Workflow::TrunkBased).resolve().unwrap();
    let result = calculate_version(&repo, &config, Some("main"), None).unwrap();

    assert_eq!(result.semantic_version.to_string(), "1.0.1");
    assert_eq!(result.warnings.len(), 1, "only version-like tags warn: {:?}", result.warnings);
    assert!(matches!(
        &result.warnings[0],
        BoundaryWarning::UnparsableTag { tag, .. } if tag == "v1.2.x"
    ));
}

#[test]
fn test_unparsable_release_branch_name_is_reported() {
    let mut repo = MockRepository::new();
    let a = repo.commit("main", "A");
    repo.tag("1.0.0", a);
    repo.branch("develop", "main");
    repo.commit("develop", "D");
    repo.branch("release/next", "develop");
    repo.commit("release/next", "R");

    let config = Config::default().resolve().unwrap();
    let result = calculate_version(&repo, &config, Some("release/next"), None).unwrap();

    assert_eq!(result.semantic_version.to_string(), "1.1.0-beta.2");
    assert_eq!(
        result.warnings,
        vec![BoundaryWarning::UnparsableBranchVersion {
            branch: "release/next".to_string()
        }]
    );
}
