use std::cmp::Ordering;

use crate::core::data::complex_ext::ComplexExt;
use crate::core::data::extended::ExtendedReal;
use crate::core::fractals::params::{FractalParams, FractalVariant};

/// Squared-magnitude escape threshold (escape radius 2). A bound of 2 is
/// sufficient for all three recurrences: once |z| exceeds it the orbit is
/// guaranteed to diverge.
const ESCAPE_THRESHOLD: f64 = 4.0;

/// Escape iteration count for one plane coordinate.
///
/// Returns the number of completed recurrence steps before |z|² first
/// exceeded 4, or `max_iterations` if the orbit never escaped within the cap
/// (the point is treated as inside the set).
///
/// This function is the reference form of the numeric kernel; the WGSL
/// shader in `backends/gpu/shader.wgsl` re-implements the same operation
/// sequence over f32 limb pairs, and the two are pinned against the same
/// test vectors. Keep them in lockstep when changing either.
#[must_use]
pub fn escape_iterations(c: ComplexExt, params: &FractalParams) -> u32 {
    // For Julia the viewport coordinate seeds the orbit and the formula
    // constant is fixed; for the other variants the orbit starts at zero.
    let (mut z, c) = match params.variant {
        FractalVariant::Julia => (c, params.julia_constant),
        FractalVariant::Mandelbrot | FractalVariant::BurningShip => (ComplexExt::ZERO, c),
    };

    let mut iterations = 0;
    while iterations < params.max_iterations {
        let re_sq = z.re * z.re;
        let im_sq = z.im * z.im;

        if (re_sq + im_sq).compare_to(ESCAPE_THRESHOLD) == Ordering::Greater {
            return iterations;
        }

        // Burning Ship folds the orbit into the positive quadrant before
        // squaring; the squares above are unaffected by the sign flip.
        if params.variant == FractalVariant::BurningShip {
            z = z.abs_components();
        }

        z = ComplexExt {
            re: re_sq - im_sq + c.re,
            im: ExtendedReal::from(2.0) * z.re * z.im + c.im,
        };
        iterations += 1;
    }

    params.max_iterations
}
