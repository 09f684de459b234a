use fpview_common::Pose;
use fpview_map::GridMap;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{InputIntent, SteeringPolicy};

/// Speed constants. Time is measured in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionRates {
    /// World units per millisecond.
    pub movement_rate: f32,
    /// Radians per millisecond for keyboard turning.
    pub rotation_rate: f32,
    /// Radians per pixel for mouse-look.
    pub mouse_sensitivity: f32,
}

impl Default for MotionRates {
    fn default() -> Self {
        Self {
            movement_rate: 0.0025,
            rotation_rate: 0.002,
            mouse_sensitivity: 0.003,
        }
    }
}

/// Advances a pose by one frame against a static grid.
pub struct MotionStep {
    rates: MotionRates,
    policy: Box<dyn SteeringPolicy>,
}

impl MotionStep {
    pub fn new(rates: MotionRates, policy: Box<dyn SteeringPolicy>) -> Self {
        Self { rates, policy }
    }

    pub fn rates(&self) -> &MotionRates {
        &self.rates
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Compute the next pose. Pure: reads the intent, never mutates it.
    ///
    /// A non-positive or non-finite `dt_ms` returns `pose` unchanged.
    pub fn step(&self, pose: Pose, intent: &InputIntent, dt_ms: f32, map: &GridMap) -> Pose {
        if !(dt_ms.is_finite() && dt_ms > 0.0) {
            return pose;
        }

        let steering = self.policy.steer(intent, dt_ms);
        let facing = pose.facing + steering.turn;
        let turned = Pose { facing, ..pose };

        let movement_speed = self.rates.movement_rate * dt_ms;
        let displacement = (turned.forward() * steering.forward
            + turned.right() * steering.strafe)
            * movement_speed;

        if displacement == Vec2::ZERO {
            return turned;
        }

        let position = resolve_axis_separated(map, pose.position, pose.position + displacement);
        tracing::trace!(
            from = ?pose.position,
            to = ?position,
            facing,
            "motion step"
        );
        Pose { position, facing }
    }
}

/// Clamp a proposed move against the grid one axis at a time.
///
/// Each axis is tested with the other axis at its original value, so a move
/// into a wall slides along it instead of stopping dead.
pub fn resolve_axis_separated(map: &GridMap, from: Vec2, target: Vec2) -> Vec2 {
    let from_x = from.x.floor() as i32;
    let from_y = from.y.floor() as i32;

    let x = if map.cell_at(target.x.floor() as i32, from_y).is_blocked() {
        from.x
    } else {
        target.x
    };
    let y = if map.cell_at(from_x, target.y.floor() as i32).is_blocked() {
        from.y
    } else {
        target.y
    };
    Vec2::new(x, y)
}
