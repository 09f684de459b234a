use crate::InputIntent;
use serde::{Deserialize, Serialize};

/// Per-tick steering request: how far to turn, and how to move relative to
/// the new heading.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Steering {
    /// Change of facing angle in radians (counter-clockwise positive).
    pub turn: f32,
    /// -1, 0 or +1 along the forward vector.
    pub forward: f32,
    /// -1, 0 or +1 along the right vector.
    pub strafe: f32,
}

/// Maps latched input into a turn and a local movement direction.
///
/// The motion step is policy-agnostic: it only sees the returned [`Steering`].
pub trait SteeringPolicy: Send + Sync {
    fn steer(&self, intent: &InputIntent, dt_ms: f32) -> Steering;

    /// Short name used in logs and status output.
    fn name(&self) -> &'static str;
}

/// Mouse-look with strafing: mouse turns, left/right keys sidestep.
///
/// Facing is counter-clockwise positive, so the mouse delta is negated: a
/// positive `look_dx` (mouse moved right) turns the view to the right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseLook {
    /// Radians of turn per pixel of horizontal mouse movement.
    pub sensitivity: f32,
}

impl Default for MouseLook {
    fn default() -> Self {
        Self { sensitivity: 0.003 }
    }
}

impl SteeringPolicy for MouseLook {
    fn steer(&self, intent: &InputIntent, _dt_ms: f32) -> Steering {
        Steering {
            // Moving the mouse right turns right, i.e. clockwise.
            turn: -intent.look_dx * self.sensitivity,
            forward: intent.forward_axis(),
            strafe: intent.right_axis(),
        }
    }

    fn name(&self) -> &'static str {
        "mouse-look"
    }
}

/// Keyboard turning: left/right keys rotate, no strafing, mouse ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyTurn {
    /// Radians per millisecond while a turn key is held.
    pub rotation_rate: f32,
}

impl Default for KeyTurn {
    fn default() -> Self {
        Self {
            rotation_rate: 0.002,
        }
    }
}

impl SteeringPolicy for KeyTurn {
    fn steer(&self, intent: &InputIntent, dt_ms: f32) -> Steering {
        let rotation_speed = self.rotation_rate * dt_ms;
        Steering {
            // Right key turns clockwise.
            turn: -intent.right_axis() * rotation_speed,
            forward: intent.forward_axis(),
            strafe: 0.0,
        }
    }

    fn name(&self) -> &'static str {
        "key-turn"
    }
}

/// Which steering policy a controller runs with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlScheme {
    #[default]
    MouseLook,
    KeyTurn,
}

impl ControlScheme {
    pub fn policy(self, rates: &crate::MotionRates) -> Box<dyn SteeringPolicy> {
        match self {
            ControlScheme::MouseLook => Box::new(MouseLook {
                sensitivity: rates.mouse_sensitivity,
            }),
            ControlScheme::KeyTurn => Box::new(KeyTurn {
                rotation_rate: rates.rotation_rate,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mouse_look_turns_by_delta() {
        let policy = MouseLook { sensitivity: 0.01 };
        let intent = InputIntent {
            look_dx: 10.0,
            left: true,
            ..Default::default()
        };
        let s = policy.steer(&intent, 16.0);
        assert!((s.turn + 0.1).abs() < 1e-6);
        assert_eq!(s.strafe, -1.0);
        assert_eq!(s.forward, 0.0);
    }

    #[test]
    fn mouse_look_turn_ignores_dt() {
        let policy = MouseLook::default();
        let intent = InputIntent {
            look_dx: 5.0,
            ..Default::default()
        };
        assert_eq!(policy.steer(&intent, 1.0).turn, policy.steer(&intent, 100.0).turn);
    }

    #[test]
    fn key_turn_rotates_with_time() {
        let policy = KeyTurn {
            rotation_rate: 0.001,
        };
        let intent = InputIntent {
            left: true,
            forward: true,
            look_dx: 50.0,
            ..Default::default()
        };
        let s = policy.steer(&intent, 100.0);
        assert!((s.turn - 0.1).abs() < 1e-6);
        assert_eq!(s.strafe, 0.0);
        assert_eq!(s.forward, 1.0);
    }

    #[test]
    fn key_turn_opposing_keys_cancel() {
        let intent = InputIntent {
            left: true,
            right: true,
            ..Default::default()
        };
        assert_eq!(KeyTurn::default().steer(&intent, 50.0).turn, 0.0);
    }

    #[test]
    fn scheme_builds_matching_policy() {
        let rates = crate::MotionRates::default();
        assert_eq!(ControlScheme::MouseLook.policy(&rates).name(), "mouse-look");
        assert_eq!(ControlScheme::KeyTurn.policy(&rates).name(), "key-turn");
        assert_eq!(ControlScheme::default(), ControlScheme::MouseLook);
    }
}
