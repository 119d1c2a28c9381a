//! Hex colors backed by one-shot GPU uniform buffers

use thiserror::Error;

use crate::math::{AlignError, round_up};

/// Construction failures for [`Color`]
#[derive(Debug, Error, PartialEq)]
pub enum ColorError {
    #[error("expected a 6-digit hex color code, got {0:?}")]
    MalformedHex(String),
    #[error("expected an alpha value between 0.0 and 1.0, got {0}")]
    AlphaOutOfRange(f32),
}

/// An RGBA color parsed from a hex code, immutable after construction.
///
/// Each color owns at most one GPU uniform buffer, written once when the
/// palette is built and shared by every primitive drawn with it.
#[derive(Debug)]
pub struct Color {
    hex: String,
    rgba: [f32; 4],
    buffer: Option<wgpu::Buffer>,
}

impl Color {
    /// Parse an optionally `#`-prefixed 6-digit hex code with an alpha
    /// value in `[0, 1]`
    pub fn new(hex: &str, alpha: f32) -> Result<Self, ColorError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::MalformedHex(hex.to_string()));
        }
        if !(0.0..=1.0).contains(&alpha) {
            return Err(ColorError::AlphaOutOfRange(alpha));
        }

        let channel = |range| {
            u8::from_str_radix(&digits[range], 16)
                .map(|value| value as f32 / 255.0)
                .map_err(|_| ColorError::MalformedHex(hex.to_string()))
        };

        Ok(Self {
            hex: format!("#{}", digits.to_uppercase()),
            rgba: [channel(0..2)?, channel(2..4)?, channel(4..6)?, alpha],
            buffer: None,
        })
    }

    /// Fully opaque color from a hex code
    pub fn opaque(hex: &str) -> Result<Self, ColorError> {
        Self::new(hex, 1.0)
    }

    /// Normalized `#RRGGBB` form
    pub fn hex(&self) -> &str {
        &self.hex
    }

    /// Normalized red, green, blue, alpha floats
    pub fn rgba(&self) -> [f32; 4] {
        self.rgba
    }

    /// Double-precision form for render-pass clear values
    pub fn to_wgpu(&self) -> wgpu::Color {
        wgpu::Color {
            r: self.rgba[0] as f64,
            g: self.rgba[1] as f64,
            b: self.rgba[2] as f64,
            a: self.rgba[3] as f64,
        }
    }

    /// The color's uniform buffer, present once the palette has been built
    pub fn buffer(&self) -> Option<&wgpu::Buffer> {
        self.buffer.as_ref()
    }

    /// Create and write the uniform buffer. Later calls are no-ops; the
    /// buffer contents never change after this.
    pub(crate) fn init_buffer(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<(), AlignError> {
        if self.buffer.is_some() {
            return Ok(());
        }
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("color"),
            size: round_up(16, std::mem::size_of_val(&self.rgba) as u64)?,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&buffer, 0, bytemuck::cast_slice(&self.rgba));
        self.buffer = Some(buffer);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_with_and_without_hash() {
        let a = Color::opaque("#5C9EAD").unwrap();
        let b = Color::opaque("5c9ead").unwrap();
        assert_eq!(a.hex(), "#5C9EAD");
        assert_eq!(b.hex(), "#5C9EAD");
        assert_eq!(a.rgba(), b.rgba());
    }

    #[test]
    fn test_channel_normalization() {
        let color = Color::new("#FF0080", 0.5).unwrap();
        let [r, g, b, a] = color.rgba();
        assert_eq!(r, 1.0);
        assert_eq!(g, 0.0);
        assert!((b - 128.0 / 255.0).abs() < f32::EPSILON);
        assert_eq!(a, 0.5);
    }

    #[test]
    fn test_malformed_hex_rejected() {
        assert!(Color::opaque("#5C9EA").is_err());
        assert!(Color::opaque("#5C9EADF").is_err());
        assert!(Color::opaque("#5C9EAG").is_err());
        assert!(Color::opaque("").is_err());
    }

    #[test]
    fn test_alpha_out_of_range_rejected() {
        assert!(matches!(
            Color::new("#FFFFFF", -0.1),
            Err(ColorError::AlphaOutOfRange(_))
        ));
        assert!(Color::new("#FFFFFF", 1.5).is_err());
        assert!(Color::new("#FFFFFF", 1.0).is_ok());
        assert!(Color::new("#FFFFFF", 0.0).is_ok());
    }

    #[test]
    fn test_no_buffer_before_palette_init() {
        let color = Color::opaque("#326273").unwrap();
        assert!(color.buffer().is_none());
    }
}
