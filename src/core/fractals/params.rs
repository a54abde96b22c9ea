use std::error::Error;
use std::fmt;

use crate::core::data::complex_ext::ComplexExt;

/// Default Julia formula constant (a classic dendrite-adjacent seed).
pub const DEFAULT_JULIA_CONSTANT: (f64, f64) = (-0.4, 0.6);
pub const DEFAULT_MAX_ITERATIONS: u32 = 500;

/// Selects which recurrence the escape evaluator runs.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FractalVariant {
    Mandelbrot,
    Julia,
    BurningShip,
}

impl FractalVariant {
    /// Stable numeric tag shared with the GPU parameter block.
    #[must_use]
    pub fn selector(&self) -> u32 {
        match self {
            Self::Mandelbrot => 0,
            Self::Julia => 1,
            Self::BurningShip => 2,
        }
    }

    /// Center the view re-frames on when switching to this variant.
    #[must_use]
    pub fn home_center(&self) -> (f64, f64) {
        match self {
            Self::Julia => (0.0, 0.0),
            Self::Mandelbrot | Self::BurningShip => (-0.5, 0.0),
        }
    }
}

impl fmt::Display for FractalVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mandelbrot => write!(f, "Mandelbrot"),
            Self::Julia => write!(f, "Julia"),
            Self::BurningShip => write!(f, "Burning Ship"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FractalParamsError {
    ZeroMaxIterations,
}

impl fmt::Display for FractalParamsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroMaxIterations => {
                write!(f, "maximum iterations must be greater than zero")
            }
        }
    }
}

impl Error for FractalParamsError {}

/// Parameters of one fractal evaluation, independent of the viewport.
///
/// `julia_constant` is only read when `variant` is `Julia`; it is carried
/// unconditionally so a parameter set can switch variants without losing the
/// seed.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FractalParams {
    pub variant: FractalVariant,
    pub julia_constant: ComplexExt,
    pub max_iterations: u32,
}

impl FractalParams {
    pub fn new(
        variant: FractalVariant,
        julia_constant: ComplexExt,
        max_iterations: u32,
    ) -> Result<Self, FractalParamsError> {
        if max_iterations == 0 {
            return Err(FractalParamsError::ZeroMaxIterations);
        }

        Ok(Self {
            variant,
            julia_constant,
            max_iterations,
        })
    }

    /// Parameters with the default seed and iteration cap.
    pub fn with_defaults(variant: FractalVariant) -> Self {
        Self {
            variant,
            julia_constant: ComplexExt::from_f64(
                DEFAULT_JULIA_CONSTANT.0,
                DEFAULT_JULIA_CONSTANT.1,
            ),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_iterations_must_be_greater_than_zero() {
        let result = FractalParams::new(FractalVariant::Mandelbrot, ComplexExt::ZERO, 0);

        assert_eq!(result, Err(FractalParamsError::ZeroMaxIterations));
    }

    #[test]
    fn test_valid_constructor() {
        let params = FractalParams::new(FractalVariant::Julia, ComplexExt::ZERO, 256);

        assert!(params.is_ok());
    }

    #[test]
    fn test_selectors_are_stable() {
        // The GPU uniform block depends on these exact values.
        assert_eq!(FractalVariant::Mandelbrot.selector(), 0);
        assert_eq!(FractalVariant::Julia.selector(), 1);
        assert_eq!(FractalVariant::BurningShip.selector(), 2);
    }

    #[test]
    fn test_defaults_match_initial_view_state() {
        let params = FractalParams::with_defaults(FractalVariant::Julia);

        assert_eq!(params.max_iterations, 500);
        assert_eq!(params.julia_constant.re.to_f64(), -0.4);
        assert_eq!(params.julia_constant.im.to_f64(), 0.6);
    }

    #[test]
    fn test_home_center_per_variant() {
        assert_eq!(FractalVariant::Julia.home_center(), (0.0, 0.0));
        assert_eq!(FractalVariant::Mandelbrot.home_center(), (-0.5, 0.0));
        assert_eq!(FractalVariant::BurningShip.home_center(), (-0.5, 0.0));
    }
}
