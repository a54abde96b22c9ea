use std::error::Error;
use std::fmt;

use crate::core::data::complex_ext::ComplexExt;
use crate::core::data::extended::ExtendedReal;

/// Default framing: the classic whole-set view.
pub const DEFAULT_CENTER: (f64, f64) = (-0.5, 0.0);
pub const DEFAULT_PLANE_HEIGHT: f64 = 3.0;

/// Floor for the visible plane height. Below this the per-pixel step at
/// typical resolutions falls under the resolution of the two-limb
/// representation (~1e-31 around |center| ≈ 1) and frames degenerate into
/// banding, so deeper zoom requests are rejected as no-ops.
pub const MIN_PLANE_HEIGHT: f64 = 1e-27;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ViewportError {
    NonPositivePlaneHeight,
    ZeroPixelDimension { width: u32, height: u32 },
}

impl fmt::Display for ViewportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositivePlaneHeight => {
                write!(f, "viewport plane height must be positive")
            }
            Self::ZeroPixelDimension { width, height } => {
                write!(
                    f,
                    "viewport pixel dimensions must be positive: {}x{}",
                    width, height
                )
            }
        }
    }
}

impl Error for ViewportError {}

/// The visible region of the complex plane and its pixel raster.
///
/// `plane_height` is the vertical extent of the visible region; the
/// horizontal extent follows from the pixel aspect ratio. Screen Y grows
/// downward while plane Y grows upward, so the vertical mapping is inverted.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    center: ComplexExt,
    plane_height: ExtendedReal,
    pixel_width: u32,
    pixel_height: u32,
}

impl Viewport {
    pub fn new(
        center: ComplexExt,
        plane_height: ExtendedReal,
        pixel_width: u32,
        pixel_height: u32,
    ) -> Result<Self, ViewportError> {
        if plane_height.hi() <= 0.0 {
            return Err(ViewportError::NonPositivePlaneHeight);
        }
        if pixel_width == 0 || pixel_height == 0 {
            return Err(ViewportError::ZeroPixelDimension {
                width: pixel_width,
                height: pixel_height,
            });
        }

        Ok(Self {
            center,
            plane_height,
            pixel_width,
            pixel_height,
        })
    }

    /// Whole-set framing at the given raster size.
    pub fn initial(pixel_width: u32, pixel_height: u32) -> Result<Self, ViewportError> {
        Self::new(
            ComplexExt::from_f64(DEFAULT_CENTER.0, DEFAULT_CENTER.1),
            ExtendedReal::from(DEFAULT_PLANE_HEIGHT),
            pixel_width,
            pixel_height,
        )
    }

    #[must_use]
    pub fn center(&self) -> ComplexExt {
        self.center
    }

    #[must_use]
    pub fn plane_height(&self) -> ExtendedReal {
        self.plane_height
    }

    #[must_use]
    pub fn pixel_width(&self) -> u32 {
        self.pixel_width
    }

    #[must_use]
    pub fn pixel_height(&self) -> u32 {
        self.pixel_height
    }

    #[must_use]
    pub fn pixel_count(&self) -> usize {
        self.pixel_width as usize * self.pixel_height as usize
    }

    #[must_use]
    pub fn aspect(&self) -> f64 {
        self.pixel_width as f64 / self.pixel_height as f64
    }

    /// Re-frames on a new center at the default plane height (used when the
    /// fractal variant changes).
    pub fn reset(&mut self, center_re: f64, center_im: f64) {
        self.center = ComplexExt::from_f64(center_re, center_im);
        self.plane_height = ExtendedReal::from(DEFAULT_PLANE_HEIGHT);
    }

    fn horizontal_offset(&self, x: f64) -> ExtendedReal {
        let fx = ExtendedReal::from(x / self.pixel_width as f64);
        (fx - ExtendedReal::from(0.5)) * ExtendedReal::from(self.aspect()) * self.plane_height
    }

    fn vertical_offset(&self, y: f64) -> ExtendedReal {
        let fy = ExtendedReal::from(y / self.pixel_height as f64);
        (fy - ExtendedReal::from(0.5)) * self.plane_height
    }

    /// Maps a (possibly fractional) pixel position to its plane coordinate.
    ///
    /// The whole mapping runs in extended precision: the fractional offset of
    /// a pixel from the center is far below `f64` resolution once the view is
    /// a few dozen zoom steps deep.
    #[must_use]
    pub fn pixel_to_plane(&self, x: f64, y: f64) -> ComplexExt {
        ComplexExt {
            re: self.center.re + self.horizontal_offset(x),
            im: self.center.im - self.vertical_offset(y),
        }
    }

    /// Shifts the view by a pixel delta. Dragging right moves the window left
    /// over the plane so the content follows the pointer.
    pub fn pan_by(&mut self, dx_pixels: f64, dy_pixels: f64) {
        let shift_re =
            ExtendedReal::from(dx_pixels / self.pixel_width as f64 * self.aspect()) * self.plane_height;
        let shift_im = ExtendedReal::from(dy_pixels / self.pixel_height as f64) * self.plane_height;

        self.center.re = self.center.re - shift_re;
        self.center.im = self.center.im + shift_im;
    }

    /// Scales the plane height by `factor` (< 1 zooms in) while keeping the
    /// plane coordinate under pixel `(px, py)` fixed.
    ///
    /// A zoom that would push the plane height below [`MIN_PLANE_HEIGHT`]
    /// is a no-op, as is a non-positive or non-finite factor.
    pub fn zoom_at(&mut self, px: f64, py: f64, factor: f64) {
        if !(factor.is_finite() && factor > 0.0) {
            return;
        }

        let target = self.pixel_to_plane(px, py);
        let new_height = self.plane_height * ExtendedReal::from(factor);
        if new_height.hi() < MIN_PLANE_HEIGHT {
            return;
        }

        self.plane_height = new_height;
        // Solve pixel_to_plane(px, py) == target under the new plane height.
        self.center.re = target.re - self.horizontal_offset(px);
        self.center.im = target.im + self.vertical_offset(py);
    }
}
