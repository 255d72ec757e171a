use crate::config::{BumpMessages, CommitMessageIncrementMode};
use crate::domain::VersionField;
use crate::git::Commit;

/// Reads `+semver:` bump instructions out of commit messages
pub struct IncrementStrategyFinder<'a> {
    messages: &'a BumpMessages,
}

impl<'a> IncrementStrategyFinder<'a> {
    /// Create a new finder over the configured message patterns
    pub fn new(messages: &'a BumpMessages) -> Self {
        IncrementStrategyFinder { messages }
    }

    /// The bump a message asks for, if any
    ///
    /// Checked from major down to the no-bump pattern; the first match wins.
    /// `Some(VersionField::None)` means the message explicitly asks for no bump.
    pub fn from_message(&self, message: &str) -> Option<VersionField> {
        if self.messages.major.is_match(message) {
            Some(VersionField::Major)
        } else if self.messages.minor.is_match(message) {
            Some(VersionField::Minor)
        } else if self.messages.patch.is_match(message) {
            Some(VersionField::Patch)
        } else if self.messages.none.is_match(message) {
            Some(VersionField::None)
        } else {
            None
        }
    }

    fn applies_to(mode: CommitMessageIncrementMode, commit: &Commit) -> bool {
        match mode {
            CommitMessageIncrementMode::Enabled => true,
            CommitMessageIncrementMode::Disabled => false,
            CommitMessageIncrementMode::MergeMessageOnly => commit.is_merge(),
        }
    }

    /// Increment of a single commit: the branch increment, overridden by its message
    ///
    /// A bump message can only raise the increment. A no-bump message clears
    /// it, except on mainline branches where every commit counts.
    pub fn commit_increment(
        &self,
        commit: &Commit,
        mode: CommitMessageIncrementMode,
        branch_increment: VersionField,
        is_mainline: bool,
    ) -> VersionField {
        if !Self::applies_to(mode, commit) {
            return branch_increment;
        }

        match self.from_message(&commit.message) {
            Some(VersionField::None) if !is_mainline => VersionField::None,
            Some(field) => branch_increment.consolidate(field),
            None => branch_increment,
        }
    }

    /// Highest bump requested by any of the commits, if any asks for one
    pub fn increment_for_commits<'c, I>(&self, commits: I, mode: CommitMessageIncrementMode) -> Option<VersionField>
    where
        I: IntoIterator<Item = &'c Commit>,
    {
        commits
            .into_iter()
            .filter(|commit| Self::applies_to(mode, commit))
            .filter_map(|commit| self.from_message(&commit.message))
            .max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use chrono::Utc;
    use git2::Oid;

    fn commit(message: &str, parents: usize) -> Commit {
        Commit {
            id: Oid::zero(),
            parents: vec![Oid::zero(); parents],
            message: message.to_string(),
            when: Utc::now(),
        }
    }

    fn with_finder(test: impl FnOnce(&IncrementStrategyFinder<'_>)) {
        let config = Config::default().resolve().unwrap();
        let finder = IncrementStrategyFinder::new(&config.bump_messages);
        test(&finder);
    }

    #[test]
    fn test_from_message() {
        with_finder(|finder| {
            assert_eq!(finder.from_message("api change +semver: breaking"), Some(VersionField::Major));
            assert_eq!(finder.from_message("+semver:major"), Some(VersionField::Major));
            assert_eq!(finder.from_message("add thing +semver: feature"), Some(VersionField::Minor));
            assert_eq!(finder.from_message("+semver: fix"), Some(VersionField::Patch));
            assert_eq!(finder.from_message("docs +semver: skip"), Some(VersionField::None));
            assert_eq!(finder.from_message("plain message"), None);
        });
    }

    #[test]
    fn test_bump_message_raises_increment() {
        with_finder(|finder| {
            let c = commit("+semver: minor", 1);
            assert_eq!(
                finder.commit_increment(&c, CommitMessageIncrementMode::Enabled, VersionField::Patch, false),
                VersionField::Minor
            );
            let c = commit("+semver: patch", 1);
            assert_eq!(
                finder.commit_increment(&c, CommitMessageIncrementMode::Enabled, VersionField::Minor, false),
                VersionField::Minor
            );
        });
    }

    #[test]
    fn test_no_bump_message() {
        with_finder(|finder| {
            let c = commit("readme +semver: none", 1);
            assert_eq!(
                finder.commit_increment(&c, CommitMessageIncrementMode::Enabled, VersionField::Minor, false),
                VersionField::None
            );
            assert_eq!(
                finder.commit_increment(&c, CommitMessageIncrementMode::Enabled, VersionField::Patch, true),
                VersionField::Patch
            );
        });
    }

    #[test]
    fn test_disabled_and_merge_only_modes() {
        with_finder(|finder| {
            let plain = commit("+semver: major", 1);
            let merge = commit("+semver: major", 2);
            assert_eq!(
                finder.commit_increment(&plain, CommitMessageIncrementMode::Disabled, VersionField::Patch, false),
                VersionField::Patch
            );
            assert_eq!(
                finder.commit_increment(&plain, CommitMessageIncrementMode::MergeMessageOnly, VersionField::Patch, false),
                VersionField::Patch
            );
            assert_eq!(
                finder.commit_increment(&merge, CommitMessageIncrementMode::MergeMessageOnly, VersionField::Patch, false),
                VersionField::Major
            );
        });
    }

    #[test]
    fn test_increment_for_commits() {
        with_finder(|finder| {
            let commits = vec![commit("+semver: fix", 1), commit("+semver: feature", 1), commit("x", 1)];
            assert_eq!(
                finder.increment_for_commits(&commits, CommitMessageIncrementMode::Enabled),
                Some(VersionField::Minor)
            );
            assert_eq!(finder.increment_for_commits(&commits, CommitMessageIncrementMode::Disabled), None);
        });
    }
}
