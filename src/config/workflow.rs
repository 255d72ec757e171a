use super::{BranchConfig, IncrementStrategy, Workflow};

/// Name of the fallback branch type used when no regex matches
pub const UNKNOWN_BRANCH: &str = "unknown";

fn strings(names: &[&str]) -> Option<Vec<String>> {
    Some(names.iter().map(|s| s.to_string()).collect())
}

fn branch(
    name: &str,
    regex: &str,
    increment: IncrementStrategy,
    label: &str,
    source_branches: &[&str],
) -> BranchConfig {
    BranchConfig {
        name: name.to_string(),
        regex: Some(regex.to_string()),
        increment: Some(increment),
        label: Some(label.to_string()),
        source_branches: strings(source_branches),
        is_mainline: Some(false),
        is_main_branch: Some(false),
        is_release_branch: Some(false),
        prevent_increment_of_merged_branch: Some(false),
        prevent_increment_when_branch_merged: Some(false),
        prevent_increment_when_current_commit_tagged: Some(true),
        track_merge_target: Some(false),
        commit_message_incrementing: None,
        pre_release_weight: Some(30000),
    }
}

/// Ordered branch types of a workflow preset
pub fn preset_branches(workflow: Workflow) -> Vec<BranchConfig> {
    match workflow {
        Workflow::GitFlow => gitflow(),
        Workflow::TrunkBased => trunk_based(),
    }
}

/// Fallback branch type of a workflow preset
pub fn unknown_branch(workflow: Workflow) -> BranchConfig {
    let sources: &[&str] = match workflow {
        Workflow::GitFlow => &["main", "develop", "release", "feature", "pull-request", "hotfix", "support"],
        Workflow::TrunkBased => &["main", "feature", "hotfix", "pull-request"],
    };
    branch(
        UNKNOWN_BRANCH,
        "(?P<BranchName>.+)",
        IncrementStrategy::Inherit,
        "{BranchName}",
        sources,
    )
}

fn gitflow() -> Vec<BranchConfig> {
    let develop = BranchConfig {
        track_merge_target: Some(true),
        pre_release_weight: Some(0),
        ..branch(
            "develop",
            "^dev(elop)?(ment)?$",
            IncrementStrategy::Minor,
            "alpha",
            &["main"],
        )
    };

    let main = BranchConfig {
        is_mainline: Some(true),
        is_main_branch: Some(true),
        prevent_increment_of_merged_branch: Some(true),
        pre_release_weight: Some(55000),
        ..branch(
            "main",
            "^master$|^main$",
            IncrementStrategy::Patch,
            "",
            &["develop", "release"],
        )
    };

    let release = BranchConfig {
        is_release_branch: Some(true),
        prevent_increment_of_merged_branch: Some(true),
        ..branch(
            "release",
            "^releases?[/-](?P<BranchName>.+)",
            IncrementStrategy::Minor,
            "beta",
            &["main", "support", "develop"],
        )
    };

    let feature = branch(
        "feature",
        "^features?[/-](?P<BranchName>.+)",
        IncrementStrategy::Inherit,
        "{BranchName}",
        &["develop", "main", "release", "support", "hotfix"],
    );

    let pull_request = branch(
        "pull-request",
        r"^(pull-requests|pull|pr)[/-](?P<Number>\d*)",
        IncrementStrategy::Inherit,
        "PullRequest{Number}",
        &["develop", "main", "release", "feature", "support", "hotfix"],
    );

    let hotfix = BranchConfig {
        is_release_branch: Some(true),
        prevent_increment_of_merged_branch: Some(true),
        ..branch(
            "hotfix",
            "^hotfix(es)?[/-](?P<BranchName>.+)",
            IncrementStrategy::Inherit,
            "beta",
            &["main", "support"],
        )
    };

    let support = BranchConfig {
        is_main_branch: Some(true),
        prevent_increment_of_merged_branch: Some(true),
        pre_release_weight: Some(55000),
        ..branch(
            "support",
            "^support[/-](?P<BranchName>.+)",
            IncrementStrategy::Patch,
            "",
            &["main"],
        )
    };

    vec![develop, main, release, feature, pull_request, hotfix, support]
}

fn trunk_based() -> Vec<BranchConfig> {
    let main = BranchConfig {
        is_mainline: Some(true),
        is_main_branch: Some(true),
        pre_release_weight: Some(55000),
        ..branch("main", "^master$|^main$", IncrementStrategy::Patch, "", &[])
    };

    let feature = branch(
        "feature",
        "^features?[/-](?P<BranchName>.+)",
        IncrementStrategy::Minor,
        "{BranchName}",
        &["main"],
    );

    let hotfix = branch(
        "hotfix",
        "^hotfix(es)?[/-](?P<BranchName>.+)",
        IncrementStrategy::Patch,
        "{BranchName}",
        &["main"],
    );

    let pull_request = branch(
        "pull-request",
        r"^(pull-requests|pull|pr)[/-](?P<Number>\d*)",
        IncrementStrategy::Inherit,
        "PullRequest{Number}",
        &["main", "feature", "hotfix"],
    );

    vec![main, feature, hotfix, pull_request]
}
