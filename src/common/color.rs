use std::fmt;

/// RGB color representation.
///
/// Represents a color using red, green, and blue components, each in the
/// range 0-255. Colors serialize to the six-digit uppercase hex form used by
/// DrawingML `srgbClr` values.
///
/// # Examples
///
/// ```rust
/// use slidesmith::common::RGBColor;
///
/// let accent = RGBColor::new(0x35, 0x8E, 0xF1);
/// assert_eq!(accent.to_hex(), "358EF1");
///
/// let parsed = RGBColor::from_hex("#7C3AED").unwrap();
/// assert_eq!(parsed, RGBColor::new(0x7C, 0x3A, 0xED));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RGBColor {
    /// Red component (0-255)
    pub r: u8,
    /// Green component (0-255)
    pub g: u8,
    /// Blue component (0-255)
    pub b: u8,
}

impl RGBColor {
    /// Create a new RGB color.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create an RGB color from a hex string (with or without `#` prefix).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

        Some(Self::new(r, g, b))
    }

    /// Convert to an uppercase hex string without `#` prefix, as expected by
    /// `<a:srgbClr val="..."/>`.
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for RGBColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let color = RGBColor::new(0x0F, 0x17, 0x2A);
        assert_eq!(color.to_hex(), "0F172A");
        assert_eq!(RGBColor::from_hex("0F172A"), Some(color));
        assert_eq!(RGBColor::from_hex("#0F172A"), Some(color));
    }

    #[test]
    fn test_from_hex_rejects_malformed() {
        assert_eq!(RGBColor::from_hex("F172A"), None);
        assert_eq!(RGBColor::from_hex("0F172AG"), None);
        assert_eq!(RGBColor::from_hex("ZZZZZZ"), None);
    }
}
