use rayon::prelude::*;

use crate::core::actions::cancellation::{
    CANCEL_CHECK_INTERVAL_PIXELS, CancelToken, Cancelled, NeverCancel,
};
use crate::core::data::render_request::RenderRequest;
use crate::core::fractals::escape::escape_iterations;

/// Evaluates every pixel of the request's viewport on rayon's work-stealing
/// pool and returns iteration counts in row-major order.
///
/// This is the batch path: all results arrive together. The streaming CPU
/// backend in `backends::cpu` serves interactive use.
#[must_use]
pub fn render_frame(request: &RenderRequest) -> Vec<u32> {
    match render_frame_cancelable(request, &NeverCancel) {
        Ok(counts) => counts,
        // NeverCancel never signals cancellation
        Err(Cancelled) => unreachable!("NeverCancel token signalled cancellation"),
    }
}

/// Like [`render_frame`], but polls the token at the start of each row and
/// every [`CANCEL_CHECK_INTERVAL_PIXELS`] pixels within a row.
///
/// Cancellation is expected control flow, not an error to display.
pub fn render_frame_cancelable<C>(
    request: &RenderRequest,
    cancel: &C,
) -> Result<Vec<u32>, Cancelled>
where
    C: CancelToken,
{
    let viewport = request.viewport();
    let params = request.params();
    let width = viewport.pixel_width();
    let height = viewport.pixel_height();

    let rows: Result<Vec<Vec<u32>>, Cancelled> = (0..height)
        .into_par_iter()
        .map(|y| {
            let mut row = Vec::with_capacity(width as usize);

            for x in 0..width {
                if x as usize % CANCEL_CHECK_INTERVAL_PIXELS == 0 && cancel.is_cancelled() {
                    return Err(Cancelled);
                }

                let c = viewport.pixel_to_plane(x as f64, y as f64);
                row.push(escape_iterations(c, params));
            }

            Ok(row)
        })
        .collect();

    rows.map(|r| r.into_iter().flatten().collect())
}
