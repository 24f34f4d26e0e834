/// Shared data structures for a derivative run
///
/// These structs describe what gets generated and what came out of it.
/// They flow from the planner to the processor and back to the reporter.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How a source image is classified by its filename
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceClass {
    /// Square application/favicon image
    Icon,
    /// Portrait content image
    Regular,
}

/// How the source is fitted into the target box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fit {
    /// Scale to exactly the target size, ignoring aspect ratio
    Exact,
    /// Scale to cover the target box, then crop the overflow around the center
    Cover,
}

/// Encoded output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    #[serde(rename = "webp")]
    WebP,
}

/// The purpose of a derivative, which also fixes its filename suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DerivativeKind {
    /// Search-engine PNG
    Google,
    /// Website WebP
    Optimized,
    /// Small WebP thumbnail
    Thumbnail,
}

impl DerivativeKind {
    /// Suffix appended to the source base name
    pub fn suffix(&self) -> &'static str {
        match self {
            DerivativeKind::Google => "_google.png",
            DerivativeKind::Optimized => "_optimized.webp",
            DerivativeKind::Thumbnail => "_thumb.webp",
        }
    }

    /// Short description used in the final summary
    pub fn purpose(&self) -> &'static str {
        match self {
            DerivativeKind::Google => "Google Search",
            DerivativeKind::Optimized => "Website",
            DerivativeKind::Thumbnail => "Thumbnail (optional)",
        }
    }
}

/// One row of the derivative table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivativeSpec {
    pub kind: DerivativeKind,
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    /// 1..=100
    pub quality: u8,
    pub fit: Fit,
}

impl DerivativeSpec {
    /// Output filename for a given base name (e.g. "dvip2" -> "dvip2_google.png")
    pub fn file_name(&self, base_name: &str) -> String {
        format!("{}{}", base_name, self.kind.suffix())
    }

    /// Human label, e.g. "675×1200 PNG"
    pub fn label(&self) -> String {
        let format = match self.format {
            OutputFormat::Png => "PNG",
            OutputFormat::WebP => "WebP",
        };
        format!("{}×{} {}", self.width, self.height, format)
    }
}

/// A configured source that exists on disk
#[derive(Debug, Clone, PartialEq)]
pub struct SourceImage {
    /// Filename only (e.g., "dvip2.webp")
    pub filename: String,
    /// Full path to the source file
    pub path: PathBuf,
    /// Filename without extension (e.g., "dvip2")
    pub base_name: String,
    pub class: SourceClass,
}

/// Result of a single derivative job
#[derive(Debug)]
pub struct DerivativeOutcome {
    /// Position of the source in the found list, for stable reporting
    pub source_index: usize,
    pub source: String,
    pub base_name: String,
    pub spec: DerivativeSpec,
    pub output: PathBuf,
    /// Bytes written, or why the job failed
    pub result: Result<usize, String>,
}

impl DerivativeOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn file_name(&self) -> String {
        self.spec.file_name(&self.base_name)
    }
}

/// Summary of a whole run
#[derive(Debug, Default)]
pub struct RunReport {
    /// Sources that were found, in configured order
    pub found: Vec<SourceImage>,
    /// How many sources were configured
    pub candidates: usize,
    /// One entry per dispatched derivative, sorted by source then kind
    pub outcomes: Vec<DerivativeOutcome>,
    /// Failures not tied to one derivative (lost source jobs, manifest write)
    pub run_errors: Vec<String>,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &DerivativeOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }

    pub fn is_success(&self) -> bool {
        self.run_errors.is_empty() && self.outcomes.iter().all(DerivativeOutcome::is_ok)
    }
}
