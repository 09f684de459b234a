//! Frame controller: loading/ready phases, input intent, motion ticks and
//! per-frame draw lists.
//!
//! # Invariants
//! - The scene catalog is built exactly once, from a complete texture set.
//! - A failed texture batch leaves the controller in `Loading`; it never panics.
//! - Events are processed serially; nothing else mutates the pose.

mod controller;

pub use controller::{FrameController, LoadError, Phase};

pub fn crate_info() -> &'static str {
    concat!("fpview-frame v", env!("CARGO_PKG_VERSION"))
}
