//! Pixel type requirements.
//!
//! Input pixels need a zero, equality and a total-ish order so every
//! counting strategy can be evaluated. Output pixels hold a neighbor count,
//! so they must be constructible from a `usize` and expose their maximum.

use std::fmt::Debug;

use num_traits::{Bounded, NumCast, Zero};

/// Pixel type the filter reads.
///
/// Implemented for every primitive numeric type (`u8`, `u16`, `i32`, `f32`, ...).
pub trait InputPixel: Copy + PartialOrd + Zero + Debug + Send + Sync {}

impl<T> InputPixel for T where T: Copy + PartialOrd + Zero + Debug + Send + Sync {}

/// Pixel type the filter writes counts into.
pub trait CountPixel: Copy + PartialEq + Zero + NumCast + Bounded + Debug + Send + Sync {
    /// Convert a neighbor count, or `None` if it does not fit.
    #[inline]
    fn from_count(count: usize) -> Option<Self> {
        <Self as NumCast>::from(count)
    }

    /// Whether this type can represent every count in `0..=max_count`.
    fn can_hold(max_count: u64) -> bool {
        <Self as NumCast>::from(max_count).is_some()
    }
}

impl<T> CountPixel for T where T: Copy + PartialEq + Zero + NumCast + Bounded + Debug + Send + Sync {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_count_fits() {
        assert_eq!(u8::from_count(255), Some(255u8));
        assert_eq!(u8::from_count(256), None);
        assert_eq!(u16::from_count(289), Some(289u16));
        assert_eq!(f32::from_count(9), Some(9.0f32));
    }

    #[test]
    fn test_can_hold() {
        assert!(u8::can_hold(255));
        assert!(!u8::can_hold(289));
        assert!(u32::can_hold(289));
        assert!(!i8::can_hold(128));
    }
}
