use crate::domain::tag::TagPrefix;
use crate::domain::version::{SemanticVersion, SemanticVersionFormat};

const LOCAL_PREFIX: &str = "refs/heads/";
const REMOTE_PREFIX: &str = "refs/remotes/";
const ORIGIN_PREFIX: &str = "origin/";

/// Strip ref namespaces and the remote name from a branch name
///
/// "refs/heads/main" -> "main", "refs/remotes/upstream/develop" -> "develop",
/// "origin/feature/x" -> "feature/x"
pub fn friendly_name(name: &str) -> String {
    if let Some(local) = name.strip_prefix(LOCAL_PREFIX) {
        return local.to_string();
    }
    if let Some(remote) = name.strip_prefix(REMOTE_PREFIX) {
        return remote
            .split_once('/')
            .map(|(_, branch)| branch)
            .unwrap_or(remote)
            .to_string();
    }
    name.strip_prefix(ORIGIN_PREFIX).unwrap_or(name).to_string()
}

/// Replace every character outside `[0-9A-Za-z-]` with `-`
pub fn escape_branch_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '-' })
        .collect()
}

/// Version embedded in a branch name, e.g. "release/1.2.0" or "hotfix-1.2.1"
///
/// Each `/` segment is tried whole, then every suffix following a `-`.
pub fn version_in_branch_name(
    name: &str,
    prefix: &TagPrefix,
    format: SemanticVersionFormat,
) -> Option<SemanticVersion> {
    let name = friendly_name(name);
    for segment in name.split('/') {
        if let Some(version) = prefix.parse(segment, format) {
            return Some(version);
        }
        for (index, _) in segment.match_indices('-') {
            if let Some(version) = prefix.parse(&segment[index + 1..], format) {
                return Some(version);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tag::DEFAULT_TAG_PREFIX;

    #[test]
    fn test_friendly_name_local() {
        assert_eq!(friendly_name("refs/heads/main"), "main");
        assert_eq!(friendly_name("refs/heads/feature/x"), "feature/x");
    }

    #[test]
    fn test_friendly_name_remote() {
        assert_eq!(friendly_name("refs/remotes/upstream/develop"), "develop");
        assert_eq!(friendly_name("origin/release/1.0.0"), "release/1.0.0");
    }

    #[test]
    fn test_friendly_name_plain() {
        assert_eq!(friendly_name("develop"), "develop");
    }

    #[test]
    fn test_escape_branch_name() {
        assert_eq!(escape_branch_name("feature/foo_bar"), "feature-foo-bar");
        assert_eq!(escape_branch_name("release/1.2.0"), "release-1-2-0");
    }

    #[test]
    fn test_version_in_branch_name() {
        let prefix = TagPrefix::new(DEFAULT_TAG_PREFIX).unwrap();
        let strict = SemanticVersionFormat::Strict;
        assert_eq!(
            version_in_branch_name("release/1.2.0", &prefix, strict),
            Some(SemanticVersion::new(1, 2, 0))
        );
        assert_eq!(
            version_in_branch_name("hotfix-1.2.1", &prefix, strict),
            Some(SemanticVersion::new(1, 2, 1))
        );
        assert_eq!(
            version_in_branch_name("origin/release/v2.0.0", &prefix, strict),
            Some(SemanticVersion::new(2, 0, 0))
        );
    }

    #[test]
    fn test_version_in_branch_name_missing() {
        let prefix = TagPrefix::new(DEFAULT_TAG_PREFIX).unwrap();
        assert!(version_in_branch_name("release/abc", &prefix, SemanticVersionFormat::Strict).is_none());
        assert!(version_in_branch_name("release/1.2", &prefix, SemanticVersionFormat::Strict).is_none());
        assert_eq!(
            version_in_branch_name("release/1.2", &prefix, SemanticVersionFormat::Loose),
            Some(SemanticVersion::new(1, 2, 0))
        );
    }
}
