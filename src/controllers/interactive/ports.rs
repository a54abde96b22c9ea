use crate::controllers::interactive::data::RenderEvent;

/// Receives completed frames and render errors from the controller.
pub trait FrameSink: Send + Sync {
    fn submit(&self, event: RenderEvent);
}
