use std::ops::Range;

use image::RgbaImage;

use crate::color::RgbaDot;

pub mod loader;
pub mod resampler;

pub const CHANNELS_PER_DOT: usize = 4;

/// Row-major RGBA bytes, top row first.
pub struct Raster {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Raster {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(
            data.len(),
            width as usize * height as usize * CHANNELS_PER_DOT,
            "Raster of {}x{} got a buffer of the wrong length",
            width,
            height
        );
        Self {
            width,
            height,
            data,
        }
    }

    pub fn from_dots(width: u32, height: u32, dots: &[RgbaDot]) -> Self {
        let data = dots
            .iter()
            .flat_map(|dot| [dot.red, dot.green, dot.blue, dot.alpha])
            .collect();
        Self::new(width, height, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dot(&self, column_index: u32, row_index: u32) -> RgbaDot {
        let start = self.byte_range_of_row(row_index as usize).start
            + column_index as usize * CHANNELS_PER_DOT;
        RgbaDot::new(
            self.data[start],
            self.data[start + 1],
            self.data[start + 2],
            self.data[start + 3],
        )
    }

    pub fn row(&self, row_index: usize) -> impl Iterator<Item = RgbaDot> + '_ {
        self.data[self.byte_range_of_row(row_index)]
            .chunks_exact(CHANNELS_PER_DOT)
            .map(|chunk| RgbaDot::new(chunk[0], chunk[1], chunk[2], chunk[3]))
    }

    fn byte_range_of_row(&self, row_index: usize) -> Range<usize> {
        let row_length = self.width as usize * CHANNELS_PER_DOT;
        let start = row_index * row_length;
        start..start + row_length
    }
}

impl From<RgbaImage> for Raster {
    fn from(value: RgbaImage) -> Self {
        let (width, height) = value.dimensions();
        Self::new(width, height, value.into_raw())
    }
}

#[cfg(test)]
mod test {
    use super::Raster;
    use crate::color::RgbaDot;

    #[rustfmt::skip]
    const TEST_DATA: &[u8] = &[
        1, 2, 3, 255,    4, 5, 6, 255,    7, 8, 9, 255,
        10, 11, 12, 0,   13, 14, 15, 0,   16, 17, 18, 0,
    ];

    #[test]
    fn read_dot() {
        let raster = Raster::new(3, 2, TEST_DATA.to_vec());
        assert_eq!(raster.dot(0, 0), RgbaDot::new(1, 2, 3, 255));
        assert_eq!(raster.dot(2, 1), RgbaDot::new(16, 17, 18, 0));
    }

    #[test]
    fn read_row() {
        let raster = Raster::new(3, 2, TEST_DATA.to_vec());
        let row: Vec<RgbaDot> = raster.row(1).collect();
        assert_eq!(row.len(), 3);
        assert_eq!(row[1], RgbaDot::new(13, 14, 15, 0));
    }

    #[test]
    fn build_from_dots() {
        let dots = [RgbaDot::opaque(1, 2, 3), RgbaDot::opaque(4, 5, 6)];
        let raster = Raster::from_dots(1, 2, &dots);
        assert_eq!(raster.dot(0, 1), RgbaDot::opaque(4, 5, 6));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic]
    fn reject_wrong_data_length() {
        Raster::new(2, 2, vec![0; 12]);
    }

    #[test]
    fn convert_from_rgba_image() {
        let image = image::RgbaImage::from_fn(2, 3, |x, y| image::Rgba([x as u8, y as u8, 0, 9]));
        let raster = Raster::from(image);
        assert_eq!(raster.width(), 2);
        assert_eq!(raster.height(), 3);
        assert_eq!(raster.dot(1, 2), RgbaDot::new(1, 2, 0, 9));
    }
}
