use std::sync::Arc;
use std::sync::mpsc;
use std::thread;

use crate::backends::{
    BackendError, ComputeBackend, PixelResult, PixelResultStream, ResultMessage,
};
use crate::core::data::render_request::RenderRequest;
use crate::core::fractals::escape::escape_iterations;

/// Streaming CPU backend backed by a fixed pool of worker threads.
///
/// `render` bands the viewport's rows across the pool; each worker evaluates
/// its band and streams one result chunk per row, so the consumer can paint
/// progressively instead of waiting for the whole frame. Workers share one
/// immutable request snapshot; mutating the live viewport after dispatch
/// cannot affect rows already in flight.
pub struct CpuBackend {
    workers: Vec<mpsc::Sender<Job>>,
}

struct Job {
    request: Arc<RenderRequest>,
    row_start: u32,
    row_end: u32,
    reply: mpsc::Sender<ResultMessage>,
}

impl CpuBackend {
    /// Builds the pool with `threads` workers (0 means one per physical
    /// core). If any worker fails to spawn the whole pool is torn down and
    /// the backend reports unavailable; a partial pool is never used.
    pub fn new(threads: usize) -> Result<Self, BackendError> {
        let count = if threads == 0 {
            thread::available_parallelism().map_or(4, |n| n.get())
        } else {
            threads
        };

        let mut workers = Vec::with_capacity(count);
        for n in 0..count {
            let (tx, rx) = mpsc::channel::<Job>();
            let spawned = thread::Builder::new()
                .name(format!("escape-worker-{n}"))
                .spawn(move || worker_loop(&rx));

            if let Err(err) = spawned {
                // Dropping the senders collected so far closes their channels
                // and the already-running workers exit.
                return Err(BackendError::Unavailable {
                    reason: format!("worker pool creation failed: {err}"),
                });
            }
            workers.push(tx);
        }

        Ok(Self { workers })
    }

    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

fn worker_loop(jobs: &mpsc::Receiver<Job>) {
    while let Ok(job) = jobs.recv() {
        let viewport = job.request.viewport();
        let params = job.request.params();
        let sequence = job.request.sequence();
        let width = viewport.pixel_width();

        let mut abandoned = false;
        for y in job.row_start..job.row_end {
            let mut results = Vec::with_capacity(width as usize);
            for x in 0..width {
                let c = viewport.pixel_to_plane(f64::from(x), f64::from(y));
                results.push(PixelResult {
                    x,
                    y,
                    iterations: escape_iterations(c, params),
                });
            }

            if job.reply.send(ResultMessage::Results { sequence, results }).is_err() {
                // Consumer dropped the stream; stop computing this band.
                abandoned = true;
                break;
            }
        }

        if !abandoned {
            let _ = job.reply.send(ResultMessage::End { sequence });
        }
    }
}

impl ComputeBackend for CpuBackend {
    fn render(&self, request: &RenderRequest) -> Result<PixelResultStream, BackendError> {
        let snapshot = Arc::new(*request);
        let height = snapshot.viewport().pixel_height();

        // Never hand a worker an empty band.
        let worker_count = self.workers.len().min(height as usize).max(1);
        let band_height = height / worker_count as u32;

        let (tx, rx) = mpsc::channel();
        for (n, worker) in self.workers.iter().take(worker_count).enumerate() {
            let row_start = n as u32 * band_height;
            let row_end = if n == worker_count - 1 {
                height // last band takes any remainder rows
            } else {
                row_start + band_height
            };

            let job = Job {
                request: Arc::clone(&snapshot),
                row_start,
                row_end,
                reply: tx.clone(),
            };
            worker.send(job).map_err(|_| BackendError::Unavailable {
                reason: "worker pool has shut down".to_string(),
            })?;
        }

        Ok(PixelResultStream::from_channel(
            snapshot.sequence(),
            rx,
            worker_count,
        ))
    }

    fn name(&self) -> &'static str {
        "cpu"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::actions::render_frame::render_frame;
    use crate::core::data::complex_ext::ComplexExt;
    use crate::core::data::viewport::Viewport;
    use crate::core::fractals::params::{FractalParams, FractalVariant};
    use std::collections::HashSet;

    fn request(width: u32, height: u32, sequence: u64) -> RenderRequest {
        RenderRequest::new(
            sequence,
            Viewport::initial(width, height).unwrap(),
            FractalParams::new(FractalVariant::Mandelbrot, ComplexExt::ZERO, 50).unwrap(),
        )
    }

    #[test]
    fn test_stream_covers_every_pixel_exactly_once() {
        let backend = CpuBackend::new(4).unwrap();
        let stream = backend.render(&request(16, 12, 1)).unwrap();

        let mut seen = HashSet::new();
        let mut count = 0usize;
        for result in stream {
            assert!(result.x < 16 && result.y < 12);
            assert!(seen.insert((result.x, result.y)), "duplicate pixel");
            count += 1;
        }

        assert_eq!(count, 16 * 12);
    }

    #[test]
    fn test_stream_matches_batch_renderer() {
        let backend = CpuBackend::new(3).unwrap();
        let req = request(20, 10, 2);

        let batch = render_frame(&req);
        let mut streamed = vec![u32::MAX; 20 * 10];
        for result in backend.render(&req).unwrap() {
            streamed[(result.y * 20 + result.x) as usize] = result.iterations;
        }

        assert_eq!(streamed, batch);
    }

    #[test]
    fn test_stream_is_tagged_with_request_sequence() {
        let backend = CpuBackend::new(2).unwrap();
        let stream = backend.render(&request(8, 8, 42)).unwrap();

        assert_eq!(stream.sequence(), 42);
    }

    #[test]
    fn test_pool_is_reusable_across_requests() {
        let backend = CpuBackend::new(2).unwrap();

        for sequence in 1..=3 {
            let stream = backend.render(&request(8, 6, sequence)).unwrap();
            assert_eq!(stream.count(), 8 * 6);
        }
    }

    #[test]
    fn test_more_workers_than_rows() {
        let backend = CpuBackend::new(8).unwrap();
        let stream = backend.render(&request(10, 2, 1)).unwrap();

        assert_eq!(stream.count(), 10 * 2);
    }

    #[test]
    fn test_zero_threads_uses_default_parallelism() {
        let backend = CpuBackend::new(0).unwrap();

        assert!(backend.worker_count() >= 1);
    }

    #[test]
    fn test_dropping_stream_does_not_poison_pool() {
        let backend = CpuBackend::new(2).unwrap();

        let stream = backend.render(&request(64, 64, 1)).unwrap();
        drop(stream); // workers notice the closed channel and abandon the band

        let stream = backend.render(&request(8, 8, 2)).unwrap();
        assert_eq!(stream.count(), 64);
    }
}
