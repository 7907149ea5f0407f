//! Domain models

pub mod config;
pub mod decoration;
pub mod user;

pub use config::{
    ApiConfig, CacheConfig, Config, LoggingConfig, RateLimitConfig, RetryConfig,
};
pub use decoration::{
    AvatarDecoration, Decoration, DecorationFile, NewDecoration, Preset, MAX_DECORATION_FILE_BYTES,
    RAW_SKU_ID, SKU_ID,
};
pub use user::{DecorationId, LiveUser, UserId};
