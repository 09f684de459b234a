use fpview_common::Key;

/// A discrete input event, already decoded from raw platform codes.
///
/// The frame controller consumes these, never raw window events. Timing
/// ticks travel on the same channel so every event is handled serially.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A logical key went down.
    KeyDown(Key),
    /// A logical key was released.
    KeyUp(Key),
    /// Horizontal mouse movement in pixels while the pointer is captured.
    MouseMove { dx: f32 },
    /// Wall-clock time since the previous tick, in milliseconds.
    Tick { elapsed_ms: f32 },
}

impl InputEvent {
    /// Build a key event from a raw code through `keymap`. Unbound codes
    /// produce `None` so they never reach the controller.
    pub fn from_code(keymap: &crate::KeyMap, code: &str, pressed: bool) -> Option<Self> {
        let key = keymap.lookup(code)?;
        Some(if pressed {
            InputEvent::KeyDown(key)
        } else {
            InputEvent::KeyUp(key)
        })
    }
}
