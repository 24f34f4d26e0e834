/// Source image loader
///
/// Decodes a source file into a `DynamicImage`. The format is sniffed from
/// the file content, so a PNG saved under a `.webp` name still loads.

use image::{DynamicImage, ImageReader};
use std::path::{Path, PathBuf};
use tokio::task;

use crate::error::{OptimizeError, Result};

/// Load and decode a source image on the blocking pool
pub async fn load_source(path: PathBuf) -> Result<DynamicImage> {
    // Decoding is CPU-bound
    task::spawn_blocking(move || load_source_blocking(&path)).await?
}

/// Blocking implementation of source loading
pub fn load_source_blocking(path: &Path) -> Result<DynamicImage> {
    let reader = ImageReader::open(path)
        .map_err(|e| OptimizeError::io(path, e))?
        .with_guessed_format()
        .map_err(|e| OptimizeError::io(path, e))?;

    let img = reader.decode().map_err(|source| OptimizeError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(
        "decoded {} ({}x{}, {:?})",
        path.display(),
        img.width(),
        img.height(),
        img.color()
    );

    Ok(img)
}
