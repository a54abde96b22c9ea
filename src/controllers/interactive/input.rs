/// Wheel tick zoom step: each tick scales the plane height by this factor
/// (inverted for zooming in).
pub const WHEEL_ZOOM_FACTOR: f64 = 1.1;

/// Pointer interaction state. `Computing` is not tracked here: rendering
/// overlaps input freely, and supersession handles overlap (the controller
/// discards stale results).
#[derive(Debug, Copy, Clone, PartialEq)]
enum InputState {
    Idle,
    Dragging { last_x: f64, last_y: f64 },
}

/// A viewport mutation derived from an input event.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ViewportCommand {
    Pan { dx_pixels: f64, dy_pixels: f64 },
    Zoom { factor: f64, at_x: f64, at_y: f64 },
}

/// Translates raw pointer and wheel events into viewport commands.
///
/// Pointer-down starts a drag from the pressed position; every move while
/// dragging emits a pan by the pointer delta; pointer-up returns to idle.
/// Wheel events zoom at the cursor position regardless of drag state.
#[derive(Debug)]
pub struct InputTracker {
    state: InputState,
}

impl InputTracker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: InputState::Idle,
        }
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.state = InputState::Dragging {
            last_x: x,
            last_y: y,
        };
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> Option<ViewportCommand> {
        match self.state {
            InputState::Idle => None,
            InputState::Dragging { last_x, last_y } => {
                self.state = InputState::Dragging {
                    last_x: x,
                    last_y: y,
                };
                Some(ViewportCommand::Pan {
                    dx_pixels: x - last_x,
                    dy_pixels: y - last_y,
                })
            }
        }
    }

    pub fn pointer_up(&mut self) {
        self.state = InputState::Idle;
    }

    /// Scroll up (negative delta) zooms in at the cursor.
    pub fn wheel(&mut self, delta_y: f64, x: f64, y: f64) -> ViewportCommand {
        let factor = if delta_y < 0.0 {
            1.0 / WHEEL_ZOOM_FACTOR
        } else {
            WHEEL_ZOOM_FACTOR
        };

        ViewportCommand::Zoom {
            factor,
            at_x: x,
            at_y: y,
        }
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, InputState::Dragging { .. })
    }
}

impl Default for InputTracker {
    fn default() -> Self {
        Self::new()
    }
}
