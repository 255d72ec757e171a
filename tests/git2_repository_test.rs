// tests/git2_repository_test.rs
use git2::{Oid, Repository as RawRepository, RepositoryInitOptions, Signature};
use git_semver::cli::{run_calculation, CalculateArgs};
use git_semver::config::{Config, Workflow};
use git_semver::git::{Git2Repository, Repository};
use git_semver::output::CACHE_DIR_NAME;
use std::fs;
use tempfile::TempDir;

fn init_repo() -> (TempDir, RawRepository) {
    let temp_dir = TempDir::new().expect("Could not create temp dir");
    let mut options = RepositoryInitOptions::new();
    options.initial_head("main");
    let repo = RawRepository::init_opts(temp_dir.path(), &options).expect("Could not init repo");
    (temp_dir, repo)
}

/// Commit an empty tree with explicit parents; moves `update_ref` when given
fn commit(repo: &RawRepository, update_ref: Option<&str>, message: &str, parents: &[Oid]) -> Oid {
    let signature = Signature::now("Test", "test@example.com").expect("Could not create signature");
    let tree_id = repo
        .treebuilder(None)
        .expect("Could not create tree builder")
        .write()
        .expect("Could not write tree");
    let tree = repo.find_tree(tree_id).expect("Could not find tree");
    let parents: Vec<git2::Commit<'_>> = parents
        .iter()
        .map(|oid| repo.find_commit(*oid).expect("Could not find parent"))
        .collect();
    let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();

    repo.commit(update_ref, &signature, &signature, message, &tree, &parent_refs)
        .expect("Could not create commit")
}

fn tag(repo: &RawRepository, name: &str, oid: Oid) {
    let object = repo.find_object(oid, None).expect("Could not find object");
    repo.tag_lightweight(name, &object, false).expect("Could not create tag");
}

#[test]
fn test_repository_queries() {
    let (temp_dir, raw) = init_repo();
    let a = commit(&raw, Some("HEAD"), "A", &[]);
    let b = commit(&raw, Some("HEAD"), "B", &[a]);
    tag(&raw, "v1.0.0", a);
    let f = commit(&raw, Some("refs/heads/feature/x"), "F", &[a]);

    let repo = Git2Repository::open(temp_dir.path()).unwrap();
    let head = repo.head().unwrap();
    assert_eq!(head.branch.as_deref(), Some("main"));
    assert_eq!(head.commit, b);

    let mut names: Vec<String> = repo.branches().unwrap().into_iter().map(|b| b.name).collect();
    names.sort();
    assert_eq!(names, vec!["feature/x", "main"]);

    let tags = repo.tags().unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].target, a);

    assert_eq!(repo.merge_base(b, f).unwrap(), Some(a));
    assert!(repo.is_ancestor(a, b).unwrap());
    assert!(!repo.is_ancestor(f, b).unwrap());
    assert_eq!(repo.commits_between(b, None).unwrap(), vec![b, a]);
    assert_eq!(repo.commits_between(b, Some(a)).unwrap(), vec![b]);
    assert_eq!(repo.resolve_commit("v1.0.0").unwrap(), a);
    assert_eq!(repo.find_commit(b).unwrap().parents, vec![a]);
    assert!(repo.git_dir().ends_with(".git") || repo.git_dir().ends_with(".git/"));
}

#[test]
fn test_disjoint_histories_have_no_merge_base() {
    let (temp_dir, raw) = init_repo();
    let a = commit(&raw, Some("HEAD"), "A", &[]);
    let orphan = commit(&raw, Some("refs/heads/orphan"), "unrelated", &[]);

    let repo = Git2Repository::open(temp_dir.path()).unwrap();
    assert_eq!(repo.merge_base(a, orphan).unwrap(), None);
}

#[test]
fn test_merged_feature_on_real_repository() {
    let (temp_dir, raw) = init_repo();
    let a = commit(&raw, Some("HEAD"), "A", &[]);
    tag(&raw, "1.0.0", a);
    let f = commit(&raw, Some("refs/heads/feature/login"), "login form", &[a]);
    commit(&raw, Some("HEAD"), "Merge branch 'feature/login'", &[a, f]);

    let repo = Git2Repository::open(temp_dir.path()).unwrap();
    let config = Config::for_workflow(Workflow::TrunkBased).resolve().unwrap();
    let result = git_semver::calculate_version(&repo, &config, None, None).unwrap();
    assert_eq!(result.semantic_version.to_string(), "1.1.0");
    assert_eq!(result.branch, "main");
}

#[test]
fn test_run_calculation_end_to_end_with_cache() {
    let (temp_dir, raw) = init_repo();
    let a = commit(&raw, Some("HEAD"), "A", &[]);
    tag(&raw, "v1.0.0", a);
    commit(&raw, Some("HEAD"), "B", &[a]);

    let config_dir = TempDir::new().unwrap();
    let config_path = config_dir.path().join("GitSemver.toml");
    fs::write(&config_path, "workflow = \"TrunkBased\"\n").unwrap();

    let args = CalculateArgs {
        path: temp_dir.path().to_path_buf(),
        config_path: Some(config_path),
        ..CalculateArgs::default()
    };

    let first = run_calculation(&args).unwrap();
    assert!(!first.from_cache());
    assert_eq!(first.variables.get("FullSemVer"), Some("1.0.1"));
    assert_eq!(first.variables.get("BranchName"), Some("main"));
    assert!(temp_dir.path().join(".git").join(CACHE_DIR_NAME).is_dir());

    let second = run_calculation(&args).unwrap();
    assert!(second.from_cache());
    assert_eq!(second.variables, first.variables);

    let uncached = run_calculation(&CalculateArgs {
        no_cache: true,
        ..args.clone()
    })
    .unwrap();
    assert!(!uncached.from_cache());
}

#[test]
fn test_open_outside_repository_fails() {
    let temp_dir = TempDir::new().unwrap();
    let args = CalculateArgs {
        path: temp_dir.path().to_path_buf(),
        config_path: None,
        no_cache: true,
        ..CalculateArgs::default()
    };
    // A temp dir may live under a repository on some machines; only check when it does not
    if RawRepository::discover(temp_dir.path()).is_err() {
        assert!(run_calculation(&args).is_err());
    }
}
