mod backends;
mod controllers;
mod core;
#[cfg(feature = "gui")]
mod input;
mod storage;

pub use backends::cpu::CpuBackend;
pub use backends::gpu::GpuBackend;
pub use backends::{BackendError, ComputeBackend, PixelResult, PixelResultStream, ResultMessage};
pub use controllers::batch::render_to_ppm;
pub use controllers::interactive::{
    FrameData, FrameSink, InputTracker, InteractiveController, RenderError, RenderEvent,
    ViewportCommand, WHEEL_ZOOM_FACTOR,
};
pub use crate::core::actions::cancellation::{CancelToken, Cancelled, NeverCancel};
pub use crate::core::actions::render_frame::{render_frame, render_frame_cancelable};
pub use crate::core::colour_mapping::map::{ColourMap, ColourMapError};
pub use crate::core::colour_mapping::{ColourSchemeKind, colour_map_for};
pub use crate::core::data::colour::Colour;
pub use crate::core::data::complex_ext::ComplexExt;
pub use crate::core::data::extended::ExtendedReal;
pub use crate::core::data::pixel_buffer::{PixelBuffer, PixelBufferError};
pub use crate::core::data::render_request::RenderRequest;
pub use crate::core::data::viewport::{Viewport, ViewportError};
pub use crate::core::fractals::escape::escape_iterations;
pub use crate::core::fractals::params::{FractalParams, FractalParamsError, FractalVariant};

#[cfg(feature = "gui")]
pub use input::gui::run_gui;
