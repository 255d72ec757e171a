//! Output projection and result cache

pub mod cache;
pub mod variables;

pub use cache::{cache_key, CacheEntry, CacheKey, CachedCalculation, VersionCache, CACHE_DIR_NAME};
pub use variables::{assembly_version, VersionVariables};
