use egui::ColorImage;
use image::{DynamicImage, ImageFormat};
use std::fs;
use std::path::Path;

/// Inputs larger than this on either axis are downscaled before upload
/// to keep texture memory in check.
pub const MAX_IMAGE_DIMENSION: u32 = 2048;

/// A decoded puzzle image ready for texture upload.
#[derive(Debug)]
pub struct LoadedImage {
    pub image: ColorImage,
    pub original_size: egui::Vec2,
}

pub fn load_puzzle_image(path: &Path) -> Result<LoadedImage, String> {
    let bytes =
        fs::read(path).map_err(|err| format!("Failed to read {}: {err}", path.display()))?;

    let format = image::guess_format(&bytes)
        .or_else(|_| ImageFormat::from_path(path))
        .map_err(|err| format!("Failed to determine format for {}: {err}", path.display()))?;

    let decoded = image::load_from_memory_with_format(&bytes, format)
        .map_err(|err| format!("Failed to decode {}: {err}", path.display()))?;

    let original_size = egui::vec2(decoded.width() as f32, decoded.height() as f32);
    let decoded = if decoded.width() > MAX_IMAGE_DIMENSION || decoded.height() > MAX_IMAGE_DIMENSION
    {
        decoded.thumbnail(MAX_IMAGE_DIMENSION, MAX_IMAGE_DIMENSION)
    } else {
        decoded
    };

    Ok(LoadedImage {
        image: color_image_from_dynamic(decoded),
        original_size,
    })
}

fn color_image_from_dynamic(image: DynamicImage) -> ColorImage {
    let rgba = image.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    ColorImage::from_rgba_unmultiplied(size, &rgba.into_raw())
}
