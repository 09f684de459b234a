//! Input decoding: raw platform key codes mapped to logical keys, plus the
//! serial event stream the frame controller consumes.
//!
//! # Invariants
//! - Unrecognized key codes are filtered out here and never reach the core.

pub mod event;
pub mod keymap;

pub use event::InputEvent;
pub use keymap::KeyMap;
