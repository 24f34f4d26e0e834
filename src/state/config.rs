/// Run configuration
///
/// Holds the list of expected source files, the quality table and the
/// few switches a run understands. Defaults are the fixed dvip* batch
/// values; an optional JSON file can override any field.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::derivative::plan;
use crate::error::{OptimizeError, Result};
use crate::state::data::Fit;

/// Name of the optional override file, looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "image-derivatives.json";

/// Default expected sources, in processing order
pub const DEFAULT_SOURCES: [&str; 5] = [
    "dvip1.webp",
    "dvip2.webp",
    "dvip3.webp",
    "dvip4.webp",
    "dvipicon512.webp",
];

/// Quality per derivative purpose (1..=100)
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct QualityTable {
    /// PNG for search engines
    #[serde(rename = "GOOGLE_PNG")]
    pub google_png: u8,

    /// WebP for website display
    #[serde(rename = "WEBSITE_WEBP")]
    pub website_webp: u8,

    /// WebP thumbnail
    #[serde(rename = "THUMBNAIL")]
    pub thumbnail: u8,
}

impl Default for QualityTable {
    fn default() -> Self {
        Self {
            google_png: 95,
            website_webp: 90,
            thumbnail: 85,
        }
    }
}

/// Everything a run needs to know
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Directory scanned for sources; derivatives are written next to them
    pub source_dir: PathBuf,

    /// Expected source filenames, in processing order
    pub sources: Vec<String>,

    /// Filenames containing this substring are treated as icons
    pub icon_marker: String,

    /// How icons are fitted into 512×512; cover crops non-square sources
    pub icon_fit: Fit,

    pub quality: QualityTable,

    /// Also emit the 225×400 thumbnail for regular images
    pub thumbnails: bool,

    /// Write image-manifest.json after the run
    pub write_manifest: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            sources: DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect(),
            icon_marker: "icon".to_string(),
            icon_fit: Fit::Cover,
            quality: QualityTable::default(),
            thumbnails: false,
            write_manifest: false,
        }
    }
}

impl Config {
    /// Same defaults, rooted at another directory (used by tests and callers
    /// that don't run from the image folder)
    pub fn with_source_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: dir.into(),
            ..Self::default()
        }
    }

    /// Parse from JSON; missing fields fall back to defaults
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load the override file from `dir` if present, otherwise the defaults.
    ///
    /// A relative `source_dir` in the file is resolved against `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);

        let mut config = if path.is_file() {
            let json = std::fs::read_to_string(&path).map_err(|source| OptimizeError::ConfigRead {
                path: path.clone(),
                source,
            })?;
            let config = Self::from_json(&json)
                .map_err(|source| OptimizeError::ConfigParse { path: path.clone(), source })?;
            tracing::debug!("loaded config from {}", path.display());
            config
        } else {
            Self::default()
        };

        if config.source_dir.is_relative() {
            config.source_dir = dir.join(&config.source_dir);
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values the generator cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(OptimizeError::InvalidConfig(
                "source list is empty".to_string(),
            ));
        }

        // Every derivative needs its own output file
        let mut seen_sources = HashSet::new();
        let mut seen_bases = HashMap::new();
        for source in &self.sources {
            if !seen_sources.insert(source.as_str()) {
                return Err(OptimizeError::InvalidConfig(format!(
                    "source {} is listed more than once",
                    source
                )));
            }
            if let Some(other) = seen_bases.insert(plan::base_name(source), source.as_str()) {
                return Err(OptimizeError::InvalidConfig(format!(
                    "sources {} and {} would write the same derivatives",
                    other, source
                )));
            }
        }

        if self.icon_marker.is_empty() {
            return Err(OptimizeError::InvalidConfig(
                "icon_marker must not be empty".to_string(),
            ));
        }

        let table = [
            ("GOOGLE_PNG", self.quality.google_png),
            ("WEBSITE_WEBP", self.quality.website_webp),
            ("THUMBNAIL", self.quality.thumbnail),
        ];
        for (name, value) in table {
            if !(1..=100).contains(&value) {
                return Err(OptimizeError::InvalidConfig(format!(
                    "{} quality must be within 1..=100, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}
