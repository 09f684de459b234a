use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Camera/player pose on the ground plane.
///
/// `position` is in world units (one unit per grid cell). `facing` is the
/// heading in radians, counter-clockwise from +X.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec2,
    pub facing: f32,
}

impl Pose {
    pub fn new(x: f32, y: f32, facing: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            facing,
        }
    }

    /// Unit vector the pose is looking along.
    pub fn forward(&self) -> Vec2 {
        Vec2::new(self.facing.cos(), self.facing.sin())
    }

    /// Unit vector to the right of `forward`.
    pub fn right(&self) -> Vec2 {
        Vec2::new(self.facing.sin(), -self.facing.cos())
    }

    /// World-space eye position. Ground plane is XY, Z is up.
    pub fn eye(&self, height: f32) -> Vec3 {
        self.position.extend(height)
    }
}

/// Logical movement keys. Raw platform codes are mapped to these before they
/// reach the frame controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Forward,
    Backward,
    Left,
    Right,
}

/// Mesh shapes the viewer knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeshKind {
    /// Unit quad standing upright in the XZ plane, centered on the origin.
    Quad,
    /// Two unit quads crossed at right angles around the Z axis.
    CrossedQuads,
}

/// Opaque handle into a loaded texture set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureId(pub u32);

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn default_pose_faces_positive_x() {
        let p = Pose::default();
        assert_eq!(p.position, Vec2::ZERO);
        assert_eq!(p.forward(), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn right_is_clockwise_of_forward() {
        let p = Pose::new(0.0, 0.0, FRAC_PI_2);
        assert!(p.forward().abs_diff_eq(Vec2::new(0.0, 1.0), 1e-6));
        assert!(p.right().abs_diff_eq(Vec2::new(1.0, 0.0), 1e-6));
        assert!(p.forward().perp_dot(p.right()) < 0.0);
    }

    #[test]
    fn eye_lifts_position() {
        let p = Pose::new(2.0, 3.0, 0.0);
        assert_eq!(p.eye(0.5), Vec3::new(2.0, 3.0, 0.5));
    }
}
