use fpview_common::Pose;
use fpview_scene::{CameraConfig, GameObject, Rotation};
use glam::{Mat4, Quat, Vec3};

/// Perspective projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_y: 45.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.01,
            far: 100.0,
        }
    }
}

impl Projection {
    pub fn from_camera(camera: &CameraConfig, width: u32, height: u32) -> Self {
        let mut projection = Self {
            fov_y: camera.fov_degrees.to_radians(),
            near: camera.near,
            far: camera.far,
            ..Self::default()
        };
        projection.set_viewport(width, height);
        projection
    }

    /// Update the aspect ratio. A zero-sized viewport keeps the old aspect.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }
}

/// Per-object matrices handed to the backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawTransforms {
    /// Projection times view.
    pub projection: Mat4,
    pub model: Mat4,
}

/// Derives view/projection and model matrices from the camera pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformBuilder {
    pub projection: Projection,
    pub eye_height: f32,
}

impl Default for TransformBuilder {
    fn default() -> Self {
        Self {
            projection: Projection::default(),
            eye_height: 0.0,
        }
    }
}

impl TransformBuilder {
    pub fn new(camera: &CameraConfig, width: u32, height: u32) -> Self {
        Self {
            projection: Projection::from_camera(camera, width, height),
            eye_height: camera.eye_height,
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.projection.set_viewport(width, height);
    }

    /// Look from the eye toward `eye + forward`, Z up.
    pub fn view_matrix(&self, pose: &Pose) -> Mat4 {
        let eye = pose.eye(self.eye_height);
        let target = eye + pose.forward().extend(0.0);
        Mat4::look_at_rh(eye, target, Vec3::Z)
    }

    pub fn view_projection(&self, pose: &Pose) -> Mat4 {
        self.projection.matrix() * self.view_matrix(pose)
    }

    pub fn build(&self, pose: &Pose, object: &GameObject) -> DrawTransforms {
        DrawTransforms {
            projection: self.view_projection(pose),
            model: model_matrix(object),
        }
    }
}

/// `translate(position) * rotate_about_pivot * scale`.
///
/// The unit meshes are 1 wide in X and Y and 1 tall in Z, so `size.x` scales
/// both horizontal axes and `size.y` the height.
pub fn model_matrix(object: &GameObject) -> Mat4 {
    let translation = Mat4::from_translation(object.position.extend(0.0));
    let scale = Mat4::from_scale(Vec3::new(object.size.x, object.size.x, object.size.y));
    let rotation = object
        .rotation
        .as_ref()
        .map(rotation_matrix)
        .unwrap_or(Mat4::IDENTITY);
    translation * rotation * scale
}

/// `translate(pivot) * rotate(axis, angle) * translate(-pivot)`.
///
/// A zero-length or non-finite axis, or a non-finite angle, yields identity.
pub fn rotation_matrix(rotation: &Rotation) -> Mat4 {
    let Some(axis) = rotation.axis.try_normalize() else {
        return Mat4::IDENTITY;
    };
    if !rotation.angle.is_finite() || !rotation.pivot.is_finite() {
        return Mat4::IDENTITY;
    }
    let rotate = Mat4::from_quat(Quat::from_axis_angle(axis, rotation.angle));
    if rotation.pivot == Vec3::ZERO {
        return rotate;
    }
    Mat4::from_translation(rotation.pivot) * rotate * Mat4::from_translation(-rotation.pivot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fpview_common::{MeshKind, TextureId};
    use glam::{Vec2, Vec4};
    use std::f32::consts::{FRAC_PI_2, PI};

    fn object(position: Vec2) -> GameObject {
        GameObject {
            mesh: MeshKind::Quad,
            texture: TextureId(0),
            position,
            size: Vec2::ONE,
            rotation: None,
        }
    }

    fn to_ndc(m: Mat4, p: Vec3) -> Vec3 {
        let clip = m * p.extend(1.0);
        assert!(clip.w > 0.0, "point behind camera");
        clip.truncate() / clip.w
    }

    #[test]
    fn identity_rotation_unit_size_is_pure_translation() {
        let obj = object(Vec2::new(3.5, 2.0));
        assert_eq!(
            model_matrix(&obj),
            Mat4::from_translation(Vec3::new(3.5, 2.0, 0.0))
        );

        let zero_turn = GameObject {
            rotation: Some(Rotation::about_z(0.0)),
            ..obj
        };
        assert_eq!(
            model_matrix(&zero_turn),
            Mat4::from_translation(Vec3::new(3.5, 2.0, 0.0))
        );
    }

    #[test]
    fn scale_applies_before_rotation_and_translation() {
        let obj = GameObject {
            size: Vec2::new(2.0, 3.0),
            rotation: Some(Rotation::about_z(FRAC_PI_2)),
            ..object(Vec2::new(1.0, 1.0))
        };
        let m = model_matrix(&obj);
        // Local +X corner at (0.5, 0, 0.5): scaled to (1, 0, 1.5), rotated to
        // (0, 1, 1.5), translated to (1, 2, 1.5).
        let p = m.transform_point3(Vec3::new(0.5, 0.0, 0.5));
        assert!(p.abs_diff_eq(Vec3::new(1.0, 2.0, 1.5), 1e-5));
    }

    #[test]
    fn rotation_about_offset_pivot() {
        let rot = Rotation {
            angle: PI,
            axis: Vec3::Z,
            pivot: Vec3::new(0.5, 0.0, 0.0),
        };
        let m = rotation_matrix(&rot);
        // The origin swings around the pivot to twice the offset.
        assert!(m
            .transform_point3(Vec3::ZERO)
            .abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), 1e-5));
        // The pivot itself stays put.
        assert!(m
            .transform_point3(rot.pivot)
            .abs_diff_eq(rot.pivot, 1e-5));
    }

    #[test]
    fn degenerate_rotation_falls_back_to_identity() {
        for rot in [
            Rotation {
                angle: 1.0,
                axis: Vec3::ZERO,
                pivot: Vec3::ONE,
            },
            Rotation {
                angle: f32::NAN,
                axis: Vec3::Z,
                pivot: Vec3::ZERO,
            },
            Rotation {
                angle: 1.0,
                axis: Vec3::new(f32::INFINITY, 0.0, 0.0),
                pivot: Vec3::ZERO,
            },
        ] {
            assert_eq!(rotation_matrix(&rot), Mat4::IDENTITY);
        }
    }

    #[test]
    fn view_looks_along_facing() {
        let builder = TransformBuilder::default();
        let pose = Pose::new(1.0, 2.0, 0.0);
        let vp = builder.view_projection(&pose);

        let ahead = to_ndc(vp, Vec3::new(5.0, 2.0, 0.0));
        assert!(ahead.x.abs() < 1e-5 && ahead.y.abs() < 1e-5);
        assert!(ahead.z > 0.0 && ahead.z < 1.0);

        // pose.right() is (0, -1): that side lands on the right of the screen.
        let right = to_ndc(vp, Vec3::new(5.0, 1.0, 0.0));
        assert!(right.x > 0.0);

        let above = to_ndc(vp, Vec3::new(5.0, 2.0, 1.0));
        assert!(above.y > 0.0);
    }

    #[test]
    fn build_pairs_view_projection_with_model() {
        let builder = TransformBuilder::default();
        let pose = Pose::new(0.5, 0.5, 1.0);
        let obj = object(Vec2::new(2.0, 2.0));
        let t = builder.build(&pose, &obj);
        assert_eq!(t.projection, builder.view_projection(&pose));
        assert_eq!(t.model.w_axis, Vec4::new(2.0, 2.0, 0.0, 1.0));
    }

    #[test]
    fn viewport_sets_aspect_and_ignores_zero() {
        let mut builder = TransformBuilder::new(&CameraConfig::default(), 800, 400);
        assert_eq!(builder.projection.aspect, 2.0);
        assert!((builder.projection.fov_y - 45.0_f32.to_radians()).abs() < 1e-6);
        assert_eq!(builder.projection.near, 0.01);
        builder.set_viewport(640, 0);
        assert_eq!(builder.projection.aspect, 2.0);
        builder.set_viewport(300, 300);
        assert_eq!(builder.projection.aspect, 1.0);
    }

    #[test]
    fn eye_height_lifts_camera() {
        let builder = TransformBuilder {
            eye_height: 0.5,
            ..TransformBuilder::default()
        };
        let pose = Pose::new(0.0, 0.0, 0.0);
        let ndc = to_ndc(builder.view_projection(&pose), Vec3::new(3.0, 0.0, 0.5));
        assert!(ndc.y.abs() < 1e-5);
    }
}
