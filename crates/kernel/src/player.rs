use fpview_common::{Key, Pose};
use fpview_map::GridMap;

use crate::{InputIntent, MotionStep};

/// Camera/player state: the current pose plus latched input intent.
///
/// Owned by the frame controller; nothing else holds a mutable reference.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Player {
    pose: Pose,
    intent: InputIntent,
}

impl Player {
    pub fn new(pose: Pose) -> Self {
        Self {
            pose,
            intent: InputIntent::default(),
        }
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn intent(&self) -> &InputIntent {
        &self.intent
    }

    pub fn press(&mut self, key: Key) {
        self.intent.set_key(key, true);
    }

    pub fn release(&mut self, key: Key) {
        self.intent.set_key(key, false);
    }

    pub fn look(&mut self, dx: f32) {
        self.intent.add_look(dx);
    }

    /// Drop every held key and pending look delta, e.g. when focus is lost.
    pub fn clear_intent(&mut self) {
        self.intent = InputIntent::default();
    }

    /// Run one motion step. The look delta is consumed only when time
    /// actually advanced; a zero-length tick leaves it for the next one.
    pub fn advance(&mut self, motion: &MotionStep, dt_ms: f32, map: &GridMap) -> Pose {
        let next = motion.step(self.pose, &self.intent, dt_ms, map);
        if dt_ms.is_finite() && dt_ms > 0.0 {
            self.intent.take_look();
        }
        self.pose = next;
        next
    }
}
