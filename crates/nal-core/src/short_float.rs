use serde::{Deserialize, Serialize};
use std::fmt;

/// A [0,1] scalar stored as an integer count of ten-thousandths.
///
/// Four decimal digits is all the precision the truth/budget calculus is
/// defined over; storing the digits directly makes equality and hashing
/// exact, so structurally equal values never diverge by float noise.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShortFloat(u16);

const SCALE: f32 = 10000.0;

impl ShortFloat {
    pub const ZERO: ShortFloat = ShortFloat(0);
    pub const ONE: ShortFloat = ShortFloat(10000);
    pub const HALF: ShortFloat = ShortFloat(5000);

    /// Build from a native float, rounding half-up to four digits.
    /// Values outside [0,1] are a caller contract violation.
    pub fn new(v: f32) -> Self {
        assert!(
            (0.0..=1.0).contains(&v),
            "ShortFloat out of range: {v}"
        );
        ShortFloat((v * SCALE + 0.5) as u16)
    }

    /// Direct construction from ten-thousandths, for constants.
    pub fn from_ten_thousandths(v: u16) -> Self {
        assert!(v <= 10000, "ShortFloat out of range: {v}/10000");
        ShortFloat(v)
    }

    pub fn to_f32(self) -> f32 {
        self.0 as f32 / SCALE
    }

    /// Overwrite in place; budget fields are the only mutable users.
    pub fn set(&mut self, v: f32) {
        *self = ShortFloat::new(v);
    }

    /// Move toward 1 by the complement-product rule: x := or(x, v).
    pub fn increment(&mut self, v: f32) {
        let x = self.to_f32();
        self.set(1.0 - (1.0 - x) * (1.0 - v));
    }

    /// Move toward 0 by the product rule: x := and(x, v).
    pub fn decrement(&mut self, v: f32) {
        let x = self.to_f32();
        self.set(x * v);
    }
}

impl fmt::Debug for ShortFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.to_f32())
    }
}

impl fmt::Display for ShortFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.to_f32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_all_representable() {
        for i in 0..=10000u16 {
            let v = i as f32 / 10000.0;
            assert_eq!(ShortFloat::new(v).to_f32(), v, "round trip failed at {i}");
        }
    }

    #[test]
    fn test_rounds_half_up() {
        assert_eq!(ShortFloat::new(0.00005), ShortFloat::from_ten_thousandths(1));
        assert_eq!(ShortFloat::new(0.12344), ShortFloat::from_ten_thousandths(1234));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_rejects_above_one() {
        ShortFloat::new(1.0001);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_rejects_negative() {
        ShortFloat::new(-0.1);
    }

    #[test]
    fn test_increment_decrement() {
        let mut x = ShortFloat::new(0.5);
        x.increment(0.5);
        assert_eq!(x, ShortFloat::new(0.75));
        x.decrement(0.5);
        assert_eq!(x, ShortFloat::new(0.375));
    }

    #[test]
    fn test_increment_never_exceeds_one() {
        let mut x = ShortFloat::new(0.9999);
        x.increment(1.0);
        assert_eq!(x, ShortFloat::ONE);
    }

    #[test]
    fn test_exact_equality() {
        assert_eq!(ShortFloat::new(0.9), ShortFloat::new(0.90004));
        assert_ne!(ShortFloat::new(0.9), ShortFloat::new(0.9001));
    }
}
