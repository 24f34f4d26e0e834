/// State module
///
/// This module holds everything a run knows about, none of it persistent:
/// - Run configuration and its JSON override file (config.rs)
/// - Shared data structures (data.rs)
/// - The optional run manifest (manifest.rs)

pub mod config;
pub mod data;
pub mod manifest;
