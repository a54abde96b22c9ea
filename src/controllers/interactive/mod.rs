//! Interactive render loop: input events mutate the viewport, every mutation
//! snapshots into a sequenced render request, and the controller paints only
//! results that are still current when they arrive.

pub mod controller;
pub mod data;
pub mod input;
pub mod ports;

pub use controller::InteractiveController;
pub use data::{FrameData, RenderError, RenderEvent};
pub use input::{InputTracker, ViewportCommand, WHEEL_ZOOM_FACTOR};
pub use ports::FrameSink;
