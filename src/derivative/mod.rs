/// Derivative generation module
///
/// This module handles:
/// - Deciding which derivatives a source produces (plan.rs)
/// - Decoding source images (loader.rs)
/// - Resizing, encoding and writing derivatives (processor.rs)

pub mod plan;
pub mod loader;
pub mod processor;
