use std::fmt::Display;

use clap::builder::PossibleValue;
use clap::ValueEnum;

pub mod linker;

pub const MINIMUM_DIMENSION: u32 = 1;
/// Largest width or height rendered; larger requests and derived values are
/// clamped down to it.
pub const MAXIMUM_DIMENSION: u32 = 4096;
/// value of an emptied field while the user is still typing
pub const LIVE_EDIT_FALLBACK: u32 = 1;
/// value of an emptied field at the moment of conversion
pub const CONVERSION_FALLBACK: u32 = 64;

/// Output width and height, both within
/// [`MINIMUM_DIMENSION`]..=[`MAXIMUM_DIMENSION`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DimensionPair {
    width: u32,
    height: u32,
}

impl DimensionPair {
    pub fn new(width: i64, height: i64) -> Self {
        Self {
            width: clamp_dimension(width),
            height: clamp_dimension(height),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    fn set(&mut self, field: EditedField, value: u32) {
        let value = value.clamp(MINIMUM_DIMENSION, MAXIMUM_DIMENSION);
        match field {
            EditedField::Width => self.width = value,
            EditedField::Height => self.height = value,
        }
    }
}

impl Default for DimensionPair {
    fn default() -> Self {
        Self {
            width: CONVERSION_FALLBACK,
            height: CONVERSION_FALLBACK,
        }
    }
}

impl Display for DimensionPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditedField {
    Width,
    Height,
}

impl EditedField {
    pub fn other(&self) -> Self {
        match self {
            Self::Width => Self::Height,
            Self::Height => Self::Width,
        }
    }
}

/// Which field drives the other one on relink and before conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DerivationPolicy {
    LastEdited,
    AlwaysFromWidth,
}

impl ValueEnum for DerivationPolicy {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::LastEdited, Self::AlwaysFromWidth]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        match self {
            Self::LastEdited => Some(PossibleValue::new("LastEdited")),
            Self::AlwaysFromWidth => Some(PossibleValue::new("AlwaysFromWidth")),
        }
    }
}

/// Height divided by width of the selected image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AspectRatio(f64);

impl AspectRatio {
    pub fn from_natural_size(natural_width: u32, natural_height: u32) -> Option<Self> {
        if natural_width == 0 || natural_height == 0 {
            return None;
        }
        Some(Self(natural_height as f64 / natural_width as f64))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn height_for_width(&self, width: u32) -> u32 {
        round_dimension(width as f64 * self.0)
    }

    pub fn width_for_height(&self, height: u32) -> u32 {
        round_dimension(height as f64 / self.0)
    }

    fn derive(&self, field: EditedField, value: u32) -> u32 {
        match field {
            EditedField::Width => self.width_for_height(value),
            EditedField::Height => self.height_for_width(value),
        }
    }
}

pub fn clamp_dimension(value: i64) -> u32 {
    value.clamp(MINIMUM_DIMENSION as i64, MAXIMUM_DIMENSION as i64) as u32
}

/// Rounds half away from zero; the cast saturates and maps NaN to zero.
pub fn round_dimension(value: f64) -> u32 {
    (value.round() as u32).clamp(MINIMUM_DIMENSION, MAXIMUM_DIMENSION)
}

/// Reads field text the way integer parsing of a number input does.
///
/// Leading whitespace and a sign are accepted, parsing stops at the first
/// non-digit. Empty text yields `fallback`, text without any leading digit
/// yields [`MINIMUM_DIMENSION`]. Values beyond `i64` saturate.
pub fn parse_dimension(text: &str, fallback: u32) -> i64 {
    if text.is_empty() {
        return fallback as i64;
    }
    let trimmed = text.trim_start();
    let (sign, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let digit_count = unsigned
        .bytes()
        .take_while(|byte| byte.is_ascii_digit())
        .count();
    if digit_count == 0 {
        return MINIMUM_DIMENSION as i64;
    }
    unsigned[..digit_count]
        .parse::<i64>()
        .map(|value| sign * value)
        .unwrap_or(sign * i64::MAX)
}

#[cfg(test)]
mod test {
    use super::{
        clamp_dimension, parse_dimension, round_dimension, AspectRatio, DimensionPair,
        CONVERSION_FALLBACK, LIVE_EDIT_FALLBACK, MAXIMUM_DIMENSION,
    };

    #[test]
    fn parse_plain_number() {
        assert_eq!(parse_dimension("120", LIVE_EDIT_FALLBACK), 120);
    }

    #[test]
    fn parse_empty_uses_fallback() {
        assert_eq!(parse_dimension("", LIVE_EDIT_FALLBACK), 1);
        assert_eq!(parse_dimension("", CONVERSION_FALLBACK), 64);
    }

    #[test]
    fn parse_non_numeric_is_one() {
        assert_eq!(parse_dimension("abc", CONVERSION_FALLBACK), 1);
        assert_eq!(parse_dimension("   ", CONVERSION_FALLBACK), 1);
        assert_eq!(parse_dimension("-", CONVERSION_FALLBACK), 1);
    }

    #[test]
    fn parse_stops_at_first_non_digit() {
        assert_eq!(parse_dimension("  42px", LIVE_EDIT_FALLBACK), 42);
        assert_eq!(parse_dimension("12.9", LIVE_EDIT_FALLBACK), 12);
    }

    #[test]
    fn parse_signed_numbers() {
        assert_eq!(parse_dimension("-5", LIVE_EDIT_FALLBACK), -5);
        assert_eq!(parse_dimension("+7", LIVE_EDIT_FALLBACK), 7);
    }

    #[test]
    fn parse_huge_number_saturates() {
        let text = "99999999999999999999999";
        assert_eq!(parse_dimension(text, LIVE_EDIT_FALLBACK), i64::MAX);
        assert_eq!(
            clamp_dimension(parse_dimension(text, 1)),
            MAXIMUM_DIMENSION
        );
    }

    #[test]
    fn clamp_oversized_to_maximum() {
        assert_eq!(clamp_dimension(u32::MAX as i64), MAXIMUM_DIMENSION);
        assert_eq!(clamp_dimension(MAXIMUM_DIMENSION as i64 + 1), MAXIMUM_DIMENSION);
        assert_eq!(
            DimensionPair::new(i64::MAX, 5000),
            DimensionPair::new(4096, 4096)
        );
        assert_eq!(round_dimension(1e12), MAXIMUM_DIMENSION);
        assert_eq!(round_dimension(f64::INFINITY), MAXIMUM_DIMENSION);
    }

    #[test]
    fn clamp_zero_and_negative_to_one() {
        assert_eq!(clamp_dimension(0), 1);
        assert_eq!(clamp_dimension(-20), 1);
        assert_eq!(DimensionPair::new(0, -3), DimensionPair::new(1, 1));
    }

    #[test]
    fn round_half_away_from_zero() {
        assert_eq!(round_dimension(2.5), 3);
        assert_eq!(round_dimension(2.49), 2);
        assert_eq!(round_dimension(0.2), 1);
        assert_eq!(round_dimension(f64::NAN), 1);
    }

    #[test]
    fn aspect_ratio_of_empty_image_is_unknown() {
        assert!(AspectRatio::from_natural_size(0, 10).is_none());
        assert!(AspectRatio::from_natural_size(10, 0).is_none());
    }

    #[test]
    fn derive_height_and_width() {
        let ratio = AspectRatio::from_natural_size(640, 480).unwrap();
        assert_eq!(ratio.height_for_width(100), 75);
        assert_eq!(ratio.width_for_height(75), 100);
        assert_eq!(ratio.height_for_width(1), 1);
    }

    #[test]
    fn rederiving_width_may_drift_by_rounding() {
        let ratio = AspectRatio::from_natural_size(3, 1).unwrap();
        let height = ratio.height_for_width(4);
        assert_eq!(height, 1);
        // 1 / (1/3) = 3, not the starting width 4
        assert_eq!(ratio.width_for_height(height), 3);
        let height_again = ratio.height_for_width(ratio.width_for_height(height));
        assert_eq!(height_again, height);
    }

    #[test]
    fn display_pair() {
        assert_eq!(DimensionPair::new(12, 7).to_string(), "12x7");
    }
}
