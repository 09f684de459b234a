//! Player kernel: pose, latched input intent, and the collision-resolved
//! motion step.
//!
//! # Invariants
//! - The motion step is pure: same pose, intent, dt and map give the same result.
//! - Movement is resolved against the grid one axis at a time.
//! - A mouse-look delta is consumed exactly once.

mod intent;
mod motion;
mod player;
mod steering;

pub use intent::InputIntent;
pub use motion::{MotionRates, MotionStep, resolve_axis_separated};
pub use player::Player;
pub use steering::{ControlScheme, KeyTurn, MouseLook, Steering, SteeringPolicy};
