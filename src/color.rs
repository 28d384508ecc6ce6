const RED_LUMA_WEIGHT: f64 = 0.2126;
const GREEN_LUMA_WEIGHT: f64 = 0.7152;
const BLUE_LUMA_WEIGHT: f64 = 0.0722;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RgbaDot {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Luma(pub u8);

impl RgbaDot {
    pub fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        RgbaDot {
            red,
            green,
            blue,
            alpha,
        }
    }

    pub fn opaque(red: u8, green: u8, blue: u8) -> Self {
        Self::new(red, green, blue, u8::MAX)
    }
}

impl From<[u8; 4]> for RgbaDot {
    fn from(value: [u8; 4]) -> Self {
        RgbaDot::new(value[0], value[1], value[2], value[3])
    }
}

impl From<&RgbaDot> for Luma {
    fn from(value: &RgbaDot) -> Self {
        let weighted_red = value.red as f64 * RED_LUMA_WEIGHT;
        let weighted_green = value.green as f64 * GREEN_LUMA_WEIGHT;
        let weighted_blue = value.blue as f64 * BLUE_LUMA_WEIGHT;
        let luma = (weighted_red + weighted_green + weighted_blue).round();
        Luma(luma.clamp(0.0, u8::MAX as f64) as u8)
    }
}
