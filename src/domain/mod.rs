//! Domain logic - pure versioning rules independent of git access

pub mod branch;
pub mod commit;
pub mod metadata;
pub mod prerelease;
pub mod tag;
pub mod version;

pub use branch::{escape_branch_name, friendly_name, version_in_branch_name};
pub use commit::{MergeMessage, MergeMessageFormat};
pub use metadata::BuildMetaData;
pub use prerelease::PreReleaseTag;
pub use tag::{TagPrefix, VersionTag, DEFAULT_TAG_PREFIX};
pub use version::{SemanticVersion, SemanticVersionFormat, VersionField};
