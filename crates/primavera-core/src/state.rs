//! View-side state handed to the renderer as uniforms.
//!
//! These types avoid platform APIs; the frontends turn them into whatever
//! uniform upload their graphics API needs. The world rotation comes from the
//! pointer-driven arcball, which lives outside the core.

use crate::constants::{CAMERA_DISTANCE, CAMERA_FAR, CAMERA_FOVY, CAMERA_NEAR};
use glam::{Mat4, Quat, Vec3};

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, CAMERA_DISTANCE),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: 1.0,
            fovy_radians: CAMERA_FOVY,
            znear: CAMERA_NEAR,
            zfar: CAMERA_FAR,
        }
    }
}

impl Camera {
    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }
    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }
}

/// The named uniform slots shared by the leaf and vessel programs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawUniforms {
    pub world: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    pub world_inverse_transpose: Mat4,
    pub camera_position: Vec3,
}

impl DrawUniforms {
    pub fn new(camera: &Camera, rotation: Quat) -> Self {
        let world = Mat4::from_quat(rotation.normalize());
        Self {
            world,
            view: camera.view_matrix(),
            projection: camera.projection_matrix(),
            world_inverse_transpose: world.inverse().transpose(),
            camera_position: camera.eye,
        }
    }

    /// World matrix for the leaves: the scene rotation applied after the
    /// plant's own model transform.
    pub fn plant_world(&self, plant_model: Mat4) -> Mat4 {
        self.world * plant_model
    }

    /// Inverse-transpose with flipped normals, for drawing leaf back faces.
    pub fn back_face_normal_matrix(&self) -> Mat4 {
        self.world_inverse_transpose * Mat4::from_scale(Vec3::splat(-1.0))
    }
}
