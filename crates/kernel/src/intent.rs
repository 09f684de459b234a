use fpview_common::Key;
use serde::{Deserialize, Serialize};

/// Latched input state read by the motion step every tick.
///
/// Key flags are set on key-down and cleared on key-up. Mouse movement
/// accumulates into `look_dx` until a tick consumes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputIntent {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    /// Horizontal mouse movement since the last consumed tick, in pixels.
    pub look_dx: f32,
}

impl InputIntent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key(&mut self, key: Key, held: bool) {
        match key {
            Key::Forward => self.forward = held,
            Key::Backward => self.backward = held,
            Key::Left => self.left = held,
            Key::Right => self.right = held,
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        match key {
            Key::Forward => self.forward,
            Key::Backward => self.backward,
            Key::Left => self.left,
            Key::Right => self.right,
        }
    }

    pub fn add_look(&mut self, dx: f32) {
        if dx.is_finite() {
            self.look_dx += dx;
        }
    }

    /// Return the accumulated look delta and reset it.
    pub fn take_look(&mut self) -> f32 {
        std::mem::take(&mut self.look_dx)
    }

    /// -1, 0 or +1 along the forward axis. Opposing keys cancel.
    pub fn forward_axis(&self) -> f32 {
        axis(self.forward, self.backward)
    }

    /// -1, 0 or +1 along the right axis. Opposing keys cancel.
    pub fn right_axis(&self) -> f32 {
        axis(self.right, self.left)
    }

    /// Whether nothing at all is requested.
    pub fn is_idle(&self) -> bool {
        !self.forward && !self.backward && !self.left && !self.right && self.look_dx == 0.0
    }
}

fn axis(positive: bool, negative: bool) -> f32 {
    match (positive, negative) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    }
}
