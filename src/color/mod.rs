use smart_leds::RGB8;

pub type Rgb = RGB8;

/// Byte order of one pixel on the wire
///
/// The strip latches the first byte it receives into its first color
/// register, so the order must match the strip model. WS2812-class parts
/// expect green first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorOrder {
    /// Green, red, blue
    #[default]
    Grb,
    /// Red, green, blue
    Rgb,
    /// Blue, red, green
    Brg,
}

impl ColorOrder {
    /// Bytes of `color` in transmission order
    pub const fn bytes(self, color: Rgb) -> [u8; 3] {
        match self {
            Self::Grb => [color.g, color.r, color.b],
            Self::Rgb => [color.r, color.g, color.b],
            Self::Brg => [color.b, color.r, color.g],
        }
    }
}
