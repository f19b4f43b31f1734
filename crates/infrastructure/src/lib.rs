//! cachedns infrastructure layer
pub mod dns;
pub mod persistence;
