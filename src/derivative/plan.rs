/// Derivative table
///
/// Decides which files a source produces. The sizes are fixed; the
/// quality values, the icon fit and the thumbnail switch come from the config.

use std::path::Path;

use crate::state::config::Config;
use crate::state::data::{
    DerivativeKind, DerivativeSpec, Fit, OutputFormat, SourceClass, SourceImage,
};

/// Square icon size
const ICON_SIZE: u32 = 512;

/// Regular image sizes (width, height)
const GOOGLE_SIZE: (u32, u32) = (675, 1200);
const WEBSITE_SIZE: (u32, u32) = (450, 800);
const THUMB_SIZE: (u32, u32) = (225, 400);

/// Classify a filename by the icon marker substring
pub fn classify(filename: &str, icon_marker: &str) -> SourceClass {
    if filename.contains(icon_marker) {
        SourceClass::Icon
    } else {
        SourceClass::Regular
    }
}

/// Filename without its extension ("dvip2.webp" -> "dvip2")
pub fn base_name(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| filename.to_string())
}

/// Build a `SourceImage` for a filename that was found in `config.source_dir`
pub fn source_image(filename: &str, config: &Config) -> SourceImage {
    SourceImage {
        filename: filename.to_string(),
        path: config.source_dir.join(filename),
        base_name: base_name(filename),
        class: classify(filename, &config.icon_marker),
    }
}

/// The derivatives a source of the given class produces, in output order
pub fn derivatives_for(class: SourceClass, config: &Config) -> Vec<DerivativeSpec> {
    let q = &config.quality;

    match class {
        SourceClass::Icon => vec![
            DerivativeSpec {
                kind: DerivativeKind::Google,
                width: ICON_SIZE,
                height: ICON_SIZE,
                format: OutputFormat::Png,
                quality: q.google_png,
                fit: config.icon_fit,
            },
            DerivativeSpec {
                kind: DerivativeKind::Optimized,
                width: ICON_SIZE,
                height: ICON_SIZE,
                format: OutputFormat::WebP,
                quality: q.website_webp,
                fit: config.icon_fit,
            },
        ],
        SourceClass::Regular => {
            let mut specs = vec![
                DerivativeSpec {
                    kind: DerivativeKind::Google,
                    width: GOOGLE_SIZE.0,
                    height: GOOGLE_SIZE.1,
                    format: OutputFormat::Png,
                    quality: q.google_png,
                    fit: Fit::Cover,
                },
                DerivativeSpec {
                    kind: DerivativeKind::Optimized,
                    width: WEBSITE_SIZE.0,
                    height: WEBSITE_SIZE.1,
                    format: OutputFormat::WebP,
                    quality: q.website_webp,
                    fit: Fit::Cover,
                },
            ];

            if config.thumbnails {
                specs.push(DerivativeSpec {
                    kind: DerivativeKind::Thumbnail,
                    width: THUMB_SIZE.0,
                    height: THUMB_SIZE.1,
                    format: OutputFormat::WebP,
                    quality: q.thumbnail,
                    fit: Fit::Cover,
                });
            }

            specs
        }
    }
}
