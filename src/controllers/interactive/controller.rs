use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::backends::ComputeBackend;
use crate::controllers::interactive::data::{FrameData, RenderError, RenderEvent};
use crate::controllers::interactive::ports::FrameSink;
use crate::core::actions::cancellation::CANCEL_CHECK_INTERVAL_PIXELS;
use crate::core::colour_mapping::{ColourSchemeKind, colour_map_for};
use crate::core::data::pixel_buffer::PixelBuffer;
use crate::core::data::render_request::RenderRequest;
use crate::core::data::viewport::Viewport;
use crate::core::fractals::params::FractalParams;

struct SharedState {
    generation: AtomicU64,
    last_completed_generation: AtomicU64,
    /// Pixel results thrown away because their request was superseded.
    /// Diagnostics only; discarding is expected behaviour under rapid input.
    discarded_results: AtomicU64,
    latest_request: Mutex<Option<RenderRequest>>,
    wake: Condvar,
    shutdown: AtomicBool,
    backend: Arc<dyn ComputeBackend>,
    colour_scheme: ColourSchemeKind,
    frame_sink: Arc<dyn FrameSink>,
}

/// Drives a compute backend from a mailbox of render requests.
///
/// Only the most recent request matters: submitting a new one supersedes
/// whatever is queued or in flight. In-flight work cannot be preempted
/// (workers are not interruptible mid-pixel), so cancellation is realised at
/// the consumption boundary — results whose sequence number is no longer
/// current are discarded instead of painted, which keeps rapid pan/zoom from
/// flashing stale frames.
pub struct InteractiveController {
    shared: Arc<SharedState>,
    worker: Option<JoinHandle<()>>,
}

impl InteractiveController {
    pub fn new(
        backend: Arc<dyn ComputeBackend>,
        colour_scheme: ColourSchemeKind,
        frame_sink: Arc<dyn FrameSink>,
    ) -> Self {
        let shared = Arc::new(SharedState {
            generation: AtomicU64::new(0),
            last_completed_generation: AtomicU64::new(0),
            discarded_results: AtomicU64::new(0),
            latest_request: Mutex::new(None),
            wake: Condvar::new(),
            shutdown: AtomicBool::new(false),
            backend,
            colour_scheme,
            frame_sink,
        });

        let worker_shared = Arc::clone(&shared);
        let worker = thread::spawn(move || {
            Self::worker_loop(&worker_shared);
        });

        Self {
            shared,
            worker: Some(worker),
        }
    }

    /// Snapshots the viewport and parameters into a new request and wakes the
    /// render worker. Returns the request's generation.
    pub fn submit(&self, viewport: Viewport, params: FractalParams) -> u64 {
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let request = RenderRequest::new(generation, viewport, params);

        {
            let mut guard = self.shared.latest_request.lock().unwrap();
            *guard = Some(request);
        }
        self.shared.wake.notify_one();

        generation
    }

    #[must_use]
    pub fn last_completed_generation(&self) -> u64 {
        self.shared
            .last_completed_generation
            .load(Ordering::Acquire)
    }

    /// Diagnostic count of pixel results discarded due to supersession.
    #[must_use]
    pub fn discarded_results(&self) -> u64 {
        self.shared.discarded_results.load(Ordering::Relaxed)
    }

    pub fn shutdown(&mut self) {
        self.shared.shutdown.store(true, Ordering::Release);
        self.shared.wake.notify_one();

        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }

    fn worker_loop(shared: &Arc<SharedState>) {
        loop {
            let request = {
                let mut guard = shared.latest_request.lock().unwrap();
                loop {
                    if shared.shutdown.load(Ordering::Acquire) {
                        return;
                    }
                    if let Some(request) = guard.take() {
                        break request;
                    }
                    guard = shared.wake.wait(guard).unwrap();
                }
            };

            let generation = request.sequence();
            let start = Instant::now();
            let outcome = Self::render_request(shared, &request);
            let render_duration = start.elapsed();

            match outcome {
                Ok(Some(pixel_buffer)) => {
                    if generation != shared.generation.load(Ordering::Acquire) {
                        // Superseded after completion: the whole frame is stale.
                        shared
                            .discarded_results
                            .fetch_add(request.viewport().pixel_count() as u64, Ordering::Relaxed);
                        continue;
                    }

                    shared.frame_sink.submit(RenderEvent::Frame(FrameData {
                        generation,
                        pixel_buffer,
                        render_duration,
                    }));
                    shared
                        .last_completed_generation
                        .store(generation, Ordering::Release);
                }
                // Superseded mid-stream; already counted.
                Ok(None) => continue,
                Err(message) => {
                    if generation != shared.generation.load(Ordering::Acquire) {
                        continue;
                    }

                    shared.frame_sink.submit(RenderEvent::Error(RenderError {
                        generation,
                        message,
                    }));
                    shared
                        .last_completed_generation
                        .store(generation, Ordering::Release);
                }
            }
        }
    }

    /// Consumes the backend's result stream into a pixel buffer, colouring as
    /// results arrive. Returns `Ok(None)` when the request went stale while
    /// streaming.
    fn render_request(
        shared: &Arc<SharedState>,
        request: &RenderRequest,
    ) -> Result<Option<PixelBuffer>, String> {
        let stream = shared
            .backend
            .render(request)
            .map_err(|err| err.to_string())?;

        let viewport = request.viewport();
        let colour_map = colour_map_for(shared.colour_scheme, request.params().max_iterations);
        let mut buffer = PixelBuffer::new(viewport.pixel_width(), viewport.pixel_height());

        let mut received: u64 = 0;
        for result in stream {
            received += 1;
            if received % CANCEL_CHECK_INTERVAL_PIXELS as u64 == 0
                && request.sequence() != shared.generation.load(Ordering::Relaxed)
            {
                shared
                    .discarded_results
                    .fetch_add(received, Ordering::Relaxed);
                return Ok(None);
            }

            let colour = colour_map
                .colour_for(result.iterations)
                .map_err(|err| err.to_string())?;
            buffer
                .set_pixel(result.x, result.y, colour)
                .map_err(|err| err.to_string())?;
        }

        Ok(Some(buffer))
    }
}

impl Drop for InteractiveController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
