//! cachedns domain layer
pub mod cache;
pub mod config;
pub mod dns_message;
pub mod errors;

pub use cache::{CacheEntry, CacheKey, CacheStore, DEFAULT_CACHE_TTL_SECS};
pub use config::{CliOverrides, Config};
pub use dns_message::{Header, Message, Question, ResourceRecord};
pub use errors::DomainError;
