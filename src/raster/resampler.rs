use clap::builder::PossibleValue;
use clap::ValueEnum;
use image::imageops::{self, FilterType};

use super::loader::LoadedImage;
use super::Raster;
use crate::dimension::DimensionPair;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ResamplingFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl ValueEnum for ResamplingFilter {
    fn value_variants<'a>() -> &'a [Self] {
        &[
            Self::Nearest,
            Self::Triangle,
            Self::CatmullRom,
            Self::Gaussian,
            Self::Lanczos3,
        ]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        match self {
            Self::Nearest => Some(PossibleValue::new("Nearest")),
            Self::Triangle => Some(PossibleValue::new("Triangle")),
            Self::CatmullRom => Some(PossibleValue::new("CatmullRom")),
            Self::Gaussian => Some(PossibleValue::new("Gaussian")),
            Self::Lanczos3 => Some(PossibleValue::new("Lanczos3")),
        }
    }
}

impl From<ResamplingFilter> for FilterType {
    fn from(value: ResamplingFilter) -> Self {
        match value {
            ResamplingFilter::Nearest => FilterType::Nearest,
            ResamplingFilter::Triangle => FilterType::Triangle,
            ResamplingFilter::CatmullRom => FilterType::CatmullRom,
            ResamplingFilter::Gaussian => FilterType::Gaussian,
            ResamplingFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

pub trait Resampler {
    /// Returns a raster of exactly `target` size.
    fn resample(&self, image: &LoadedImage, target: DimensionPair) -> Raster;
}

pub struct FilterResampler {
    filter: ResamplingFilter,
}

impl FilterResampler {
    pub fn new(filter: ResamplingFilter) -> Self {
        Self { filter }
    }
}

impl Resampler for FilterResampler {
    fn resample(&self, image: &LoadedImage, target: DimensionPair) -> Raster {
        let rgba = image.pixels().to_rgba8();
        if rgba.dimensions() == (target.width(), target.height()) {
            return Raster::from(rgba);
        }
        log::debug!(
            "Resampling {}x{} to {} with {:?}",
            rgba.width(),
            rgba.height(),
            target,
            self.filter
        );
        let resized = imageops::resize(
            &rgba,
            target.width(),
            target.height(),
            self.filter.into(),
        );
        Raster::from(resized)
    }
}
