//! Main GUI application loop: winit window, pixels framebuffer, and the
//! interactive controller wired to pointer/wheel input.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use egui::Context;
use egui_winit::State as EguiWinitState;
use pixels::{Pixels, SurfaceTexture};
use winit::{
    dpi::LogicalSize,
    event::{ElementState, Event, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::EventLoop,
    window::{Window, WindowBuilder},
};

use crate::backends::ComputeBackend;
use crate::backends::cpu::CpuBackend;
use crate::backends::gpu::GpuBackend;
use crate::controllers::interactive::{
    FrameData, FrameSink, InputTracker, InteractiveController, RenderEvent, ViewportCommand,
};
use crate::core::colour_mapping::ColourSchemeKind;
use crate::core::data::viewport::Viewport;
use crate::core::fractals::params::{FractalParams, FractalVariant};

/// Keeps only the newest completed frame; the event loop picks it up on the
/// next redraw. Render errors go to stderr rather than a blank frame.
struct LatestFrameSink {
    latest: Mutex<Option<FrameData>>,
}

impl FrameSink for LatestFrameSink {
    fn submit(&self, event: RenderEvent) {
        match event {
            RenderEvent::Frame(frame) => {
                *self.latest.lock().unwrap() = Some(frame);
            }
            RenderEvent::Error(error) => {
                eprintln!(
                    "render error (generation {}): {}",
                    error.generation, error.message
                );
            }
        }
    }
}

/// Application state holding the pixels framebuffer, egui context, and the
/// render pipeline.
struct App {
    pixels: Pixels<'static>,
    width: u32,
    height: u32,
    scale_factor: f64,
    /// Whether the window is focused. Can be used to reduce render rate when unfocused.
    #[allow(dead_code)]
    focused: bool,
    egui_ctx: Context,
    egui_state: EguiWinitState,

    controller: InteractiveController,
    sink: Arc<LatestFrameSink>,
    tracker: InputTracker,
    viewport: Viewport,
    params: FractalParams,
    backend_name: &'static str,
    /// GPU dispatches are cheap enough to reissue every redraw; the CPU pool
    /// renders only when input changes the view.
    continuous_submit: bool,
    cursor: (f64, f64),
    last_presented_generation: u64,
    last_render_duration: Duration,
}

impl App {
    fn new(
        window: &'static Window,
        event_loop: &EventLoop<()>,
        variant: FractalVariant,
        prefer_gpu: bool,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let size = window.inner_size();
        let scale_factor = window.scale_factor();
        let surface_texture = SurfaceTexture::new(size.width, size.height, window);
        let pixels = Pixels::new(size.width, size.height, surface_texture)
            .expect("Failed to create pixels surface");

        let egui_ctx = Context::default();
        let egui_state = EguiWinitState::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            event_loop,
            Some(scale_factor as f32),
            None, // max_texture_side, use default
        );

        // GPU first when requested; never a silent blank frame on failure.
        let backend: Arc<dyn ComputeBackend> = if prefer_gpu {
            match GpuBackend::new() {
                Ok(gpu) => Arc::new(gpu),
                Err(err) => {
                    eprintln!("GPU backend unavailable, falling back to CPU: {err}");
                    Arc::new(CpuBackend::new(0)?)
                }
            }
        } else {
            Arc::new(CpuBackend::new(0)?)
        };
        let backend_name = backend.name();
        let continuous_submit = backend_name == "gpu";

        let sink = Arc::new(LatestFrameSink {
            latest: Mutex::new(None),
        });
        let controller = InteractiveController::new(
            backend,
            ColourSchemeKind::HsvSpectrum,
            Arc::clone(&sink) as Arc<dyn FrameSink>,
        );

        let mut viewport = Viewport::initial(size.width, size.height)?;
        let home = variant.home_center();
        viewport.reset(home.0, home.1);
        let params = FractalParams::with_defaults(variant);

        let app = Self {
            pixels,
            width: size.width,
            height: size.height,
            scale_factor,
            focused: true,
            egui_ctx,
            egui_state,
            controller,
            sink,
            tracker: InputTracker::new(),
            viewport,
            params,
            backend_name,
            continuous_submit,
            cursor: (0.0, 0.0),
            last_presented_generation: 0,
            last_render_duration: Duration::ZERO,
        };
        app.submit_current();
        Ok(app)
    }

    fn submit_current(&self) {
        self.controller.submit(self.viewport, self.params);
    }

    fn apply(&mut self, command: ViewportCommand) {
        match command {
            ViewportCommand::Pan {
                dx_pixels,
                dy_pixels,
            } => self.viewport.pan_by(dx_pixels, dy_pixels),
            ViewportCommand::Zoom { factor, at_x, at_y } => {
                self.viewport.zoom_at(at_x, at_y, factor);
            }
        }
        self.submit_current();
    }

    /// Copies the newest completed frame into the framebuffer, dropping
    /// frames from superseded generations or mismatched sizes.
    fn present_latest(&mut self) {
        let frame = self.sink.latest.lock().unwrap().take();
        let Some(frame) = frame else { return };

        if frame.generation <= self.last_presented_generation
            || frame.pixel_buffer.width() != self.width
            || frame.pixel_buffer.height() != self.height
        {
            return;
        }

        let rgb = frame.pixel_buffer.buffer();
        for (dst, src) in self
            .pixels
            .frame_mut()
            .chunks_exact_mut(4)
            .zip(rgb.chunks_exact(3))
        {
            dst[0] = src[0];
            dst[1] = src[1];
            dst[2] = src[2];
            dst[3] = 255; // opaque
        }
        self.last_presented_generation = frame.generation;
        self.last_render_duration = frame.render_duration;
    }

    /// Renders the current frame to the window.
    fn render(&mut self) -> Result<(), pixels::Error> {
        // Skip rendering for invalid size (e.g., minimized window)
        if self.width == 0 || self.height == 0 {
            return Ok(());
        }
        self.present_latest();
        self.pixels.render()
    }

    /// Handles window resize by recreating the pixels surface and re-framing
    /// the viewport at the new raster size.
    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.width = width;
            self.height = height;
            self.pixels
                .resize_surface(width, height)
                .expect("Failed to resize surface");
            self.pixels
                .resize_buffer(width, height)
                .expect("Failed to resize buffer");

            if let Ok(viewport) = Viewport::new(
                self.viewport.center(),
                self.viewport.plane_height(),
                width,
                height,
            ) {
                self.viewport = viewport;
            }
            self.submit_current();
        }
    }

    /// Runs the egui frame and returns the output.
    fn update_ui(&mut self, window: &Window) -> egui::FullOutput {
        let raw_input = self.egui_state.take_egui_input(window);

        let variant = self.params.variant;
        let backend_name = self.backend_name;
        let plane_height = self.viewport.plane_height().to_f64();
        let render_duration = self.last_render_duration;
        let discarded = self.controller.discarded_results();

        self.egui_ctx.run(raw_input, |ctx| {
            egui::Window::new("Fractal Engine").show(ctx, |ui| {
                ui.label(format!("Variant: {}", variant));
                ui.label(format!("Backend: {}", backend_name));
                ui.label(format!("Plane height: {:.3e}", plane_height));
                ui.label(format!("Last frame: {:?}", render_duration));
                ui.label(format!("Discarded stale results: {}", discarded));
                ui.label("Drag to pan, scroll to zoom");
            });
        })
    }

    /// Handles a window event, forwarding it to egui first.
    ///
    /// Returns true if egui consumed the event (e.g., click on UI element).
    fn handle_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let response = self.egui_state.on_window_event(window, event);
        response.consumed
    }
}

/// Runs the GUI application.
///
/// This function does not return until the window is closed.
pub fn run_gui(variant: FractalVariant, prefer_gpu: bool) -> Result<(), Box<dyn std::error::Error>> {
    let event_loop = EventLoop::new().expect("Failed to create event loop");

    // Leak the window to get a 'static reference for pixels
    let window: &'static Window = Box::leak(Box::new(
        WindowBuilder::new()
            .with_title("Fractal Engine")
            .with_inner_size(LogicalSize::new(800.0, 600.0))
            .with_min_inner_size(LogicalSize::new(200.0, 200.0))
            .build(&event_loop)
            .expect("Failed to create window"),
    ));

    let mut app = App::new(window, &event_loop, variant, prefer_gpu)?;

    event_loop
        .run(move |event, elwt| {
            match event {
                Event::WindowEvent {
                    ref event,
                    window_id,
                } if window_id == window.id() => {
                    // Forward event to egui first
                    let egui_consumed = app.handle_window_event(window, event);

                    match event {
                        WindowEvent::CloseRequested => {
                            elwt.exit();
                        }
                        WindowEvent::RedrawRequested => {
                            // The GPU path reissues the current request every
                            // redraw, matching its per-frame dispatch cadence.
                            if app.continuous_submit {
                                app.submit_current();
                            }

                            let egui_output = app.update_ui(window);
                            app.egui_state
                                .handle_platform_output(window, egui_output.platform_output);

                            if let Err(e) = app.render() {
                                eprintln!("Render error: {e}");
                                elwt.exit();
                            }
                        }
                        WindowEvent::Resized(size) => {
                            app.resize(size.width, size.height);
                        }
                        WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                            app.scale_factor = *scale_factor;
                            app.egui_ctx.set_pixels_per_point(*scale_factor as f32);
                            let size = window.inner_size();
                            app.resize(size.width, size.height);
                        }
                        WindowEvent::Focused(focused) => {
                            app.focused = *focused;
                        }
                        WindowEvent::CursorMoved { position, .. } => {
                            app.cursor = (position.x, position.y);
                            if !egui_consumed {
                                if let Some(command) =
                                    app.tracker.pointer_move(position.x, position.y)
                                {
                                    app.apply(command);
                                }
                            }
                        }
                        WindowEvent::MouseInput { state, button, .. } => {
                            if *button == MouseButton::Left && !egui_consumed {
                                match state {
                                    ElementState::Pressed => {
                                        app.tracker.pointer_down(app.cursor.0, app.cursor.1);
                                    }
                                    ElementState::Released => {
                                        app.tracker.pointer_up();
                                    }
                                }
                            }
                        }
                        WindowEvent::MouseWheel { delta, .. } => {
                            if !egui_consumed {
                                // winit's line delta is positive scrolling up;
                                // the tracker expects browser-style sign.
                                let delta_y = match delta {
                                    MouseScrollDelta::LineDelta(_, y) => -f64::from(*y),
                                    MouseScrollDelta::PixelDelta(position) => -position.y,
                                };
                                let command =
                                    app.tracker.wheel(delta_y, app.cursor.0, app.cursor.1);
                                app.apply(command);
                            }
                        }
                        _ => {}
                    }
                }
                Event::AboutToWait => {
                    // Steady redraw cadence: new frames from the controller
                    // are picked up here even without input.
                    window.request_redraw();
                }
                _ => {}
            }
        })
        .expect("Event loop error");

    Ok(())
}
