use std::path::Path;

use image::{DynamicImage, ImageReader};

use crate::error::Error;

/// A decoded image at its natural resolution.
pub struct LoadedImage {
    pixels: DynamicImage,
}

impl LoadedImage {
    pub fn natural_width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn natural_height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }
}

impl From<DynamicImage> for LoadedImage {
    fn from(value: DynamicImage) -> Self {
        Self { pixels: value }
    }
}

pub trait ImageLoader {
    fn load(&self, path: &Path) -> crate::Result<LoadedImage>;
}

/// Decodes files with the format guessed from their content, falling back
/// to the file extension.
pub struct FileImageLoader;

impl ImageLoader for FileImageLoader {
    fn load(&self, path: &Path) -> crate::Result<LoadedImage> {
        let display_path = path.display().to_string();
        let pixels = ImageReader::open(path)
            .map_err(|e| Error::UnableToOpenInputFileForReading(display_path.clone(), e))?
            .with_guessed_format()
            .map_err(|e| Error::UnableToOpenInputFileForReading(display_path.clone(), e))?
            .decode()
            .map_err(|e| Error::UnableToDecodeImage(display_path.clone(), e))?;
        log::info!(
            "Decoded '{}' with natural size {}x{}",
            display_path,
            pixels.width(),
            pixels.height()
        );
        Ok(LoadedImage::from(pixels))
    }
}
