use crate::core::data::viewport::Viewport;
use crate::core::fractals::params::FractalParams;

/// Immutable snapshot of everything one compute pass needs.
///
/// Requests are ordered by `sequence`; a request is stale once any request
/// with a higher sequence number exists. Parameter validity is guaranteed by
/// construction: both [`Viewport`] and [`FractalParams`] reject degenerate
/// values in their constructors, so a `RenderRequest` can only ever hold a
/// renderable combination.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderRequest {
    sequence: u64,
    viewport: Viewport,
    params: FractalParams,
}

impl RenderRequest {
    #[must_use]
    pub fn new(sequence: u64, viewport: Viewport, params: FractalParams) -> Self {
        Self {
            sequence,
            viewport,
            params,
        }
    }

    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    #[must_use]
    pub fn params(&self) -> &FractalParams {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fractals::params::FractalVariant;

    #[test]
    fn test_snapshot_is_independent_of_later_viewport_changes() {
        let mut viewport = Viewport::initial(100, 100).unwrap();
        let request = RenderRequest::new(
            1,
            viewport,
            FractalParams::with_defaults(FractalVariant::Mandelbrot),
        );

        viewport.pan_by(50.0, 50.0);

        // The request keeps the pre-pan center.
        assert_eq!(request.viewport().center().re.to_f64(), -0.5);
        assert_ne!(viewport.center(), request.viewport().center());
    }
}
