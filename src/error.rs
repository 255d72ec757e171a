use thiserror::Error;

/// Unified error type for git-semver operations
#[derive(Error, Debug)]
pub enum GitSemverError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A branch and the source branch it declares share no history at all
    #[error(
        "Configuration mismatch: branch '{branch}' shares no common ancestor with source branch '{source_branch}'"
    )]
    ConfigurationMismatch {
        branch: String,
        source_branch: String,
    },

    /// A tag on a release branch does not belong to the version the branch name declares
    #[error(
        "Configuration error: tag version '{tag_version}' on branch '{branch}' does not match the branch version family '{family}'"
    )]
    VersionFamilyMismatch {
        branch: String,
        tag_version: String,
        family: String,
    },

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Tag error: {0}")]
    Tag(String),

    #[error("Branch error: {0}")]
    Branch(String),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in git-semver
pub type Result<T> = std::result::Result<T, GitSemverError>;

impl GitSemverError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        GitSemverError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        GitSemverError::Version(msg.into())
    }

    /// Create a tag error with context
    pub fn tag(msg: impl Into<String>) -> Self {
        GitSemverError::Tag(msg.into())
    }

    /// Create a branch error with context
    pub fn branch(msg: impl Into<String>) -> Self {
        GitSemverError::Branch(msg.into())
    }

    /// Create a not-supported error; these signal a defect rather than bad input
    pub fn not_supported(msg: impl Into<String>) -> Self {
        GitSemverError::NotSupported(msg.into())
    }

    /// Create a cache error with context
    pub fn cache(msg: impl Into<String>) -> Self {
        GitSemverError::Cache(msg.into())
    }

    /// Whether the error stems from the branching model configuration.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            GitSemverError::Config(_)
                | GitSemverError::ConfigurationMismatch { .. }
                | GitSemverError::VersionFamilyMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GitSemverError::config("test config issue");
        assert_eq!(err.to_string(), "Configuration error: test config issue");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: GitSemverError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_configuration_mismatch_display() {
        let err = GitSemverError::ConfigurationMismatch {
            branch: "feature/orphan".to_string(),
            source_branch: "develop".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("feature/orphan"));
        assert!(msg.contains("develop"));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_version_family_mismatch_display() {
        let err = GitSemverError::VersionFamilyMismatch {
            branch: "release/1.2.0".to_string(),
            tag_version: "1.3.0".to_string(),
            family: "1.2".to_string(),
        };
        assert!(err.to_string().starts_with("Configuration error"));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (GitSemverError::config("x"), "Configuration error"),
            (GitSemverError::version("x"), "Version parsing error"),
            (GitSemverError::tag("x"), "Tag error"),
            (GitSemverError::branch("x"), "Branch error"),
            (GitSemverError::not_supported("x"), "Not supported"),
            (GitSemverError::cache("x"), "Cache error"),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }

    #[test]
    fn test_non_configuration_errors() {
        assert!(!GitSemverError::version("x").is_configuration_error());
        assert!(!GitSemverError::not_supported("x").is_configuration_error());
    }
}
