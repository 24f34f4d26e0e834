/// Derivative processor
///
/// Turns one decoded source into one derivative file:
/// - Resize (exact, or cover with a centered crop)
/// - Encode (PNG lossless, WebP lossy at the configured quality)
/// - Write next to the source

use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::{imageops::FilterType, DynamicImage, ImageEncoder};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task;

use crate::error::{OptimizeError, Result};
use crate::state::data::{DerivativeSpec, Fit, OutputFormat};

/// Resampling filter used for every derivative
const RESAMPLE: FilterType = FilterType::Lanczos3;

/// Resize a source to the spec's box
pub fn resize(img: &DynamicImage, spec: &DerivativeSpec) -> DynamicImage {
    match spec.fit {
        Fit::Exact => img.resize_exact(spec.width, spec.height, RESAMPLE),
        // Scales to cover the box and crops the overflow evenly on both sides
        Fit::Cover => img.resize_to_fill(spec.width, spec.height, RESAMPLE),
    }
}

/// PNG is lossless; quality picks how hard the compressor works
fn png_compression(quality: u8) -> CompressionType {
    if quality >= 90 {
        CompressionType::Best
    } else if quality >= 50 {
        CompressionType::Default
    } else {
        CompressionType::Fast
    }
}

/// Encode an already-resized image
pub fn encode(img: &DynamicImage, spec: &DerivativeSpec, output: &Path) -> Result<Vec<u8>> {
    match spec.format {
        OutputFormat::Png => encode_png(img, spec.quality, output),
        OutputFormat::WebP => encode_webp(img, spec.quality, output),
    }
}

fn encode_png(img: &DynamicImage, quality: u8, output: &Path) -> Result<Vec<u8>> {
    // Keep alpha only when the source has it
    let img = if img.color().has_alpha() {
        DynamicImage::ImageRgba8(img.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    };

    let mut bytes = Vec::new();
    let encoder =
        PngEncoder::new_with_quality(&mut bytes, png_compression(quality), PngFilter::Adaptive);
    encoder
        .write_image(img.as_bytes(), img.width(), img.height(), img.color().into())
        .map_err(|e| OptimizeError::Encode {
            path: output.to_path_buf(),
            message: e.to_string(),
        })?;

    Ok(bytes)
}

fn encode_webp(img: &DynamicImage, quality: u8, output: &Path) -> Result<Vec<u8>> {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let encoder = webp::Encoder::from_rgba(rgba.as_raw(), width, height);
    let webp = encoder
        .encode_simple(false, quality as f32)
        .map_err(|e| OptimizeError::Encode {
            path: output.to_path_buf(),
            message: format!("{:?}", e),
        })?;
    Ok(webp.to_vec())
}

/// Resize and encode in one step (CPU-bound)
pub fn render(img: &DynamicImage, spec: &DerivativeSpec, output: &Path) -> Result<Vec<u8>> {
    let resized = resize(img, spec);
    encode(&resized, spec, output)
}

/// Render on the blocking pool, then write the file
///
/// Returns the number of bytes written.
pub async fn generate_derivative(
    img: Arc<DynamicImage>,
    spec: DerivativeSpec,
    output: PathBuf,
) -> Result<usize> {
    let render_path = output.clone();
    let bytes = task::spawn_blocking(move || render(&img, &spec, &render_path)).await??;

    tokio::fs::write(&output, &bytes)
        .await
        .map_err(|e| OptimizeError::io(&output, e))?;

    tracing::debug!("wrote {} ({} bytes)", output.display(), bytes.len());
    Ok(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::DerivativeKind;
    use image::{GenericImageView, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

    fn spec(width: u32, height: u32, format: OutputFormat, fit: Fit) -> DerivativeSpec {
        DerivativeSpec {
            kind: DerivativeKind::Google,
            width,
            height,
            format,
            quality: 90,
            fit,
        }
    }

    /// Left half red, right half blue
    fn split_image(width: u32, height: u32) -> DynamicImage {
        let img = RgbImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_exact_resize_ignores_aspect() {
        let img = split_image(100, 50);
        let out = resize(&img, &spec(512, 512, OutputFormat::Png, Fit::Exact));
        assert_eq!(out.dimensions(), (512, 512));
    }

    #[test]
    fn test_cover_fills_box_exactly() {
        // Wider than the target ratio: must crop left/right
        let img = split_image(800, 400);
        let out = resize(&img, &spec(450, 800, OutputFormat::WebP, Fit::Cover));
        assert_eq!(out.dimensions(), (450, 800));

        // Taller than the target ratio: must crop top/bottom
        let img = split_image(300, 1000);
        let out = resize(&img, &spec(675, 1200, OutputFormat::Png, Fit::Cover));
        assert_eq!(out.dimensions(), (675, 1200));
    }

    #[test]
    fn test_cover_crop_is_centered() {
        // 400x100 source into a 100x100 box keeps the middle 100 columns,
        // which straddle the red/blue split evenly.
        let img = split_image(400, 100);
        let out = resize(&img, &spec(100, 100, OutputFormat::Png, Fit::Cover)).to_rgb8();

        assert_eq!(out.get_pixel(5, 50)[0], 255);
        assert_eq!(out.get_pixel(94, 50)[2], 255);
    }

    #[test]
    fn test_png_encoding_is_decodable() {
        let img = split_image(40, 40);
        let s = spec(20, 30, OutputFormat::Png, Fit::Cover);
        let bytes = render(&img, &s, Path::new("x_google.png")).unwrap();

        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Png);
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (20, 30));
    }

    #[test]
    fn test_png_keeps_alpha() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([1, 2, 3, 128])));
        let bytes = render(&img, &spec(10, 10, OutputFormat::Png, Fit::Exact), Path::new("a.png"))
            .unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert!(decoded.color().has_alpha());
    }

    #[test]
    fn test_webp_encoding_is_decodable() {
        let img = split_image(64, 64);
        let s = spec(32, 48, OutputFormat::WebP, Fit::Cover);
        let bytes = render(&img, &s, Path::new("x_optimized.webp")).unwrap();

        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::WebP);
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (32, 48));
    }

    #[test]
    fn test_webp_failure_is_an_encode_error() {
        // libwebp rejects a zero-sized picture
        let img = DynamicImage::ImageRgba8(RgbaImage::new(0, 0));
        let s = spec(0, 0, OutputFormat::WebP, Fit::Exact);

        let result = encode(&img, &s, Path::new("empty_optimized.webp"));
        match result {
            Err(OptimizeError::Encode { path, .. }) => {
                assert_eq!(path, PathBuf::from("empty_optimized.webp"))
            }
            other => panic!("expected encode error, got {:?}", other.map(|b| b.len())),
        }
    }

    #[test]
    fn test_lower_webp_quality_is_smaller() {
        // Noisy content so quality actually matters
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(128, 128, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x ^ y) % 256) as u8])
        }));
        let mut high = spec(128, 128, OutputFormat::WebP, Fit::Exact);
        high.quality = 95;
        let mut low = high;
        low.quality = 10;

        let high_bytes = render(&img, &high, Path::new("h.webp")).unwrap();
        let low_bytes = render(&img, &low, Path::new("l.webp")).unwrap();
        assert!(low_bytes.len() < high_bytes.len());
    }

    #[test]
    fn test_png_compression_levels() {
        assert!(matches!(png_compression(95), CompressionType::Best));
        assert!(matches!(png_compression(60), CompressionType::Default));
        assert!(matches!(png_compression(10), CompressionType::Fast));
    }

    #[tokio::test]
    async fn test_generate_derivative_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("dvip1_optimized.webp");
        let img = Arc::new(split_image(90, 160));

        let written = generate_derivative(
            img,
            spec(45, 80, OutputFormat::WebP, Fit::Cover),
            output.clone(),
        )
        .await
        .unwrap();

        let on_disk = std::fs::metadata(&output).unwrap().len() as usize;
        assert_eq!(written, on_disk);
        assert_eq!(image::image_dimensions(&output).unwrap(), (45, 80));
    }

    #[tokio::test]
    async fn test_generate_derivative_reports_write_failure() {
        let output = PathBuf::from("/nonexistent/dir/dvip1_google.png");
        let img = Arc::new(split_image(10, 10));

        let result =
            generate_derivative(img, spec(5, 5, OutputFormat::Png, Fit::Exact), output).await;
        assert!(matches!(result, Err(OptimizeError::Io { .. })));
    }
}
