//! PNG loading into pixel buffers and PNG export with magnification

use crate::io::configuration::MAX_EXPORT_SCALE;
use crate::io::error::{Result, SpriteError, WithPath, invalid_buffer, invalid_parameter};
use crate::spatial::buffer::{Color, PixelBuffer, Rect};
use image::{ImageBuffer, Rgba, RgbaImage};
use log::debug;
use std::path::{Path, PathBuf};

/// Load an image file and normalize it to 8-bit RGBA
///
/// # Errors
///
/// Returns an error if:
/// - The file at the given path cannot be opened or decoded
/// - The decoded image has a zero dimension
pub fn load_png(path: &Path) -> Result<PixelBuffer> {
    let rgba = image::open(path)
        .map_err(|e| SpriteError::ImageLoad {
            path: path.to_path_buf(),
            source: e,
        })?
        .to_rgba8();
    let buffer = buffer_from_rgba(&rgba)?;
    debug!(
        "loaded {} ({}x{}, {} opaque pixel(s))",
        path.display(),
        buffer.width(),
        buffer.height(),
        buffer.opaque_count()
    );
    Ok(buffer)
}

/// Copy an RGBA image into a pixel buffer
///
/// # Errors
///
/// Returns `InvalidBuffer` if the image has a zero dimension
pub fn buffer_from_rgba(image: &RgbaImage) -> Result<PixelBuffer> {
    let (width, height) = image.dimensions();
    let pixels = image.pixels().map(|pixel| Color(pixel.0)).collect();
    PixelBuffer::from_pixels(width as usize, height as usize, pixels)
}

/// Copy a pixel buffer into an RGBA image
pub fn buffer_to_rgba(buffer: &PixelBuffer) -> RgbaImage {
    let mut image = ImageBuffer::new(buffer.width() as u32, buffer.height() as u32);
    for (point, color) in buffer.enumerate() {
        image.put_pixel(point.x as u32, point.y as u32, Rgba(color.0));
    }
    image
}

/// Check that `scale` is a supported export magnification
///
/// # Errors
///
/// Returns an error if the scale is zero or above [`MAX_EXPORT_SCALE`]
pub fn validate_scale(scale: usize) -> Result<()> {
    if scale == 0 || scale > MAX_EXPORT_SCALE {
        return Err(invalid_parameter(
            "scale",
            &scale,
            &format!("scale must be between 1 and {MAX_EXPORT_SCALE}"),
        ));
    }
    Ok(())
}

/// Export a buffer as PNG, magnified by an integer `scale`
///
/// # Errors
///
/// Returns an error if:
/// - The scale is zero or above the supported maximum
/// - The parent directory cannot be created
/// - The image cannot be saved to the specified path
pub fn export_buffer_as_png(buffer: &PixelBuffer, output_path: &Path, scale: usize) -> Result<()> {
    validate_scale(scale)?;

    let image = if scale == 1 {
        buffer_to_rgba(buffer)
    } else {
        buffer_to_rgba(&buffer.upscale(scale)?)
    };

    if let Some(parent) = output_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| SpriteError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source: e,
        })?;
    }

    image
        .save(output_path)
        .map_err(|e| SpriteError::ImageExport {
            path: output_path.to_path_buf(),
            source: e,
        })?;

    debug!(
        "exported {}x{} image to {}",
        image.width(),
        image.height(),
        output_path.display()
    );
    Ok(())
}

/// Write each region of `buffer` as its own PNG in `directory`
///
/// Files are named `<stem>_region_<index>.png` in extraction order.
///
/// # Errors
///
/// Returns an error if a region leaves the buffer or any export fails
pub fn export_regions(
    buffer: &PixelBuffer,
    regions: &[Rect],
    directory: &Path,
    stem: &str,
    scale: usize,
) -> Result<Vec<PathBuf>> {
    if regions.is_empty() {
        return Ok(Vec::new());
    }

    std::fs::create_dir_all(directory).with_path(directory)?;

    let mut written = Vec::with_capacity(regions.len());
    for (index, &region) in regions.iter().enumerate() {
        let crop = buffer.crop(region).map_err(|e| match e {
            SpriteError::InvalidBuffer { reason, .. } => invalid_buffer(
                region.width.max(0) as usize,
                region.height.max(0) as usize,
                &format!("region {index}: {reason}"),
            ),
            other => other,
        })?;
        let path = directory.join(format!("{stem}_region_{index:03}.png"));
        export_buffer_as_png(&crop, &path, scale)?;
        written.push(path);
    }
    Ok(written)
}
