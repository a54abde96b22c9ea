use std::ops::Add;

use crate::core::data::extended::ExtendedReal;

/// Complex number with extended-precision components.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ComplexExt {
    pub re: ExtendedReal,
    pub im: ExtendedReal,
}

impl ComplexExt {
    pub const ZERO: Self = Self {
        re: ExtendedReal::ZERO,
        im: ExtendedReal::ZERO,
    };

    #[must_use]
    pub fn new(re: ExtendedReal, im: ExtendedReal) -> Self {
        Self { re, im }
    }

    #[must_use]
    pub fn from_f64(re: f64, im: f64) -> Self {
        Self {
            re: ExtendedReal::from(re),
            im: ExtendedReal::from(im),
        }
    }

    #[must_use]
    pub fn magnitude_squared(&self) -> ExtendedReal {
        self.re * self.re + self.im * self.im
    }

    /// Component-wise absolute value (the Burning Ship fold). Sign flip only;
    /// magnitudes are untouched.
    #[must_use]
    pub fn abs_components(&self) -> Self {
        Self {
            re: self.re.abs(),
            im: self.im.abs(),
        }
    }

    /// `self²` via the component formulas `re² − im²` and `2·re·im`.
    #[must_use]
    pub fn square(&self) -> Self {
        Self {
            re: self.re * self.re - self.im * self.im,
            im: ExtendedReal::from(2.0) * self.re * self.im,
        }
    }
}

impl Add for ComplexExt {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            re: self.re + rhs.re,
            im: self.im + rhs.im,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magnitude_squared() {
        let c = ComplexExt::from_f64(3.0, 4.0);
        assert_eq!(c.magnitude_squared().to_f64(), 25.0); // 3² + 4² = 25
    }

    #[test]
    fn test_magnitude_squared_is_sign_invariant() {
        let mag = ComplexExt::from_f64(3.0, 4.0).magnitude_squared();

        assert_eq!(ComplexExt::from_f64(-3.0, 4.0).magnitude_squared(), mag);
        assert_eq!(ComplexExt::from_f64(3.0, -4.0).magnitude_squared(), mag);
        assert_eq!(ComplexExt::from_f64(-3.0, -4.0).magnitude_squared(), mag);
    }

    #[test]
    fn test_add() {
        let a = ComplexExt::from_f64(1.0, 2.0);
        let b = ComplexExt::from_f64(3.0, -7.0);
        let result = a + b;

        assert_eq!(result.re.to_f64(), 4.0);
        assert_eq!(result.im.to_f64(), -5.0);
    }

    #[test]
    fn test_square() {
        // (2 + 3i)² = 4 + 12i + 9i² = -5 + 12i
        let c = ComplexExt::from_f64(2.0, 3.0);
        let result = c.square();

        assert_eq!(result.re.to_f64(), -5.0);
        assert_eq!(result.im.to_f64(), 12.0);
    }

    #[test]
    fn test_square_of_zero_is_zero() {
        let result = ComplexExt::ZERO.square();

        assert_eq!(result.re.to_f64(), 0.0);
        assert_eq!(result.im.to_f64(), 0.0);
    }

    #[test]
    fn test_abs_components() {
        let c = ComplexExt::from_f64(-1.5, -2.5);
        let folded = c.abs_components();

        assert_eq!(folded.re.to_f64(), 1.5);
        assert_eq!(folded.im.to_f64(), 2.5);
        // magnitude unchanged
        assert_eq!(folded.magnitude_squared(), c.magnitude_squared());
    }
}
