/// Run manifest
///
/// Optional JSON record of every derivative written during a run,
/// grouped by source base name. Failed jobs are left out.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::data::{OutputFormat, RunReport};
use crate::error::{OptimizeError, Result};

pub const MANIFEST_FILE_NAME: &str = "image-manifest.json";

/// One written derivative
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ManifestEntry {
    pub filename: String,
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    pub quality: u8,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Manifest {
    /// Base name -> derivatives, in derivative order
    pub generated: BTreeMap<String, Vec<ManifestEntry>>,
    /// Source filenames that were found
    pub sources: Vec<String>,
    /// RFC 3339, UTC
    pub timestamp: String,
}

impl Manifest {
    /// Build from a finished run
    pub fn from_report(report: &RunReport) -> Self {
        let mut generated: BTreeMap<String, Vec<ManifestEntry>> = BTreeMap::new();

        for outcome in report.outcomes.iter().filter(|o| o.is_ok()) {
            generated
                .entry(outcome.base_name.clone())
                .or_default()
                .push(ManifestEntry {
                    filename: outcome.file_name(),
                    width: outcome.spec.width,
                    height: outcome.spec.height,
                    format: outcome.spec.format,
                    quality: outcome.spec.quality,
                });
        }

        Self {
            generated,
            sources: report.found.iter().map(|s| s.filename.clone()).collect(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write into `dir`, returning the path written
    pub async fn write(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(MANIFEST_FILE_NAME);
        let json = self.to_json()?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| OptimizeError::io(&path, e))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::{
        DerivativeKind, DerivativeOutcome, DerivativeSpec, Fit, SourceClass, SourceImage,
    };

    fn outcome(base: &str, kind: DerivativeKind, result: std::result::Result<usize, String>) -> DerivativeOutcome {
        let spec = DerivativeSpec {
            kind,
            width: 512,
            height: 512,
            format: if kind == DerivativeKind::Google { OutputFormat::Png } else { OutputFormat::WebP },
            quality: 90,
            fit: Fit::Exact,
        };
        DerivativeOutcome {
            source_index: 0,
            source: format!("{}.webp", base),
            base_name: base.to_string(),
            output: PathBuf::from(spec.file_name(base)),
            spec,
            result,
        }
    }

    #[test]
    fn test_manifest_lists_only_written_files() {
        let report = RunReport {
            found: vec![SourceImage {
                filename: "dvipicon512.webp".to_string(),
                path: PathBuf::from("dvipicon512.webp"),
                base_name: "dvipicon512".to_string(),
                class: SourceClass::Icon,
            }],
            candidates: 5,
            outcomes: vec![
                outcome("dvipicon512", DerivativeKind::Google, Ok(100)),
                outcome("dvipicon512", DerivativeKind::Optimized, Err("boom".to_string())),
            ],
            run_errors: Vec::new(),
        };

        let manifest = Manifest::from_report(&report);
        let entries = &manifest.generated["dvipicon512"];
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].filename, "dvipicon512_google.png");
        assert_eq!(manifest.sources, vec!["dvipicon512.webp"]);

        let json = manifest.to_json().unwrap();
        assert!(json.contains("\"format\": \"png\""));
    }

    #[tokio::test]
    async fn test_manifest_write() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = Manifest::from_report(&RunReport::default());
        let path = manifest.write(dir.path()).await.unwrap();

        assert_eq!(path, dir.path().join(MANIFEST_FILE_NAME));
        let text = std::fs::read_to_string(path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(value["timestamp"].is_string());
    }
}
