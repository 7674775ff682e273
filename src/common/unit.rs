//! Unit conversion utilities.
//!
//! Slide geometry is expressed in English Metric Units (EMU) throughout the
//! package format: 914,400 EMU per inch, 12,700 EMU per point.

pub const EMUS_PER_INCH: i64 = 914_400;
pub const EMUS_PER_PT: i64 = 12_700;

/// Convert inches to EMUs.
#[inline]
pub fn inches(value: f64) -> i64 {
    (value * EMUS_PER_INCH as f64) as i64
}

/// Convert points to EMUs.
#[inline]
pub fn points(value: f64) -> i64 {
    (value * EMUS_PER_PT as f64) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inches_to_emu() {
        assert_eq!(inches(1.0), 914_400);
        assert_eq!(inches(0.5), 457_200);
        assert_eq!(inches(7.5), 6_858_000);
    }

    #[test]
    fn test_points_to_emu() {
        assert_eq!(points(3.0), 38_100);
        assert_eq!(points(18.0), 228_600);
    }
}
