use bitcode::Decode;
use bitcode::Encode;
use serde::Deserialize;
use serde::Serialize;

/// 24-bit RGB color as stored in the palette, before contrast is applied.
#[derive(
    Default, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Encode, Decode,
)]
pub struct Rgb24 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb24 {
    pub const BLACK: Rgb24 = Rgb24 { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Scales all channels by `contrast` (0.0 to 1.0).
    pub fn with_contrast(self, contrast: f32) -> Rgb24 {
        let scale = |channel: u8| (channel as f32 * contrast).round().clamp(0.0, 255.0) as u8;
        Rgb24 {
            r: scale(self.r),
            g: scale(self.g),
            b: scale(self.b),
        }
    }
}

/// 32-bit RGBA format used on modern machines for interop with frontends and image-rs
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rgba32(pub [u8; 4]);

impl From<Rgb24> for Rgba32 {
    fn from(value: Rgb24) -> Self {
        Self([value.r, value.g, value.b, 255])
    }
}

/// Abstract interface for image::RgbaImage (used in tests) or any frontend image type.
pub trait Image {
    fn new(width: u32, height: u32) -> Self;
    fn set_pixel(&mut self, index: (u32, u32), value: Rgba32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contrast_scaling() {
        let color = Rgb24::new(0x80, 0xFF, 0x10);
        assert_eq!(color.with_contrast(1.0), color);
        assert_eq!(color.with_contrast(0.0), Rgb24::BLACK);
        assert_eq!(color.with_contrast(0.5), Rgb24::new(0x40, 0x80, 0x08));
    }
}
