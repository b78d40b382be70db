//! Camera placed from an instance's load-time framing.

use cgmath::{perspective, Deg, EuclideanSpace, Matrix4, Point3, Vector3};

use super::camera_utils::{convert_matrix4_to_array, Camera, CameraUniform, OPENGL_TO_WGPU_MATRIX};
use crate::gfx::geometry::CameraFraming;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramedCamera {
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub aspect: f32,
    pub fovy: Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera for FramedCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }
}

impl FramedCamera {
    /// Look at the framing target from its position, +Y up
    pub fn from_framing(framing: &CameraFraming, field_of_view_degrees: f32, aspect: f32) -> Self {
        Self {
            eye: framing.position,
            target: framing.target,
            up: Vector3::unit_y(),
            aspect,
            fovy: Deg(field_of_view_degrees),
            znear: framing.z_near,
            zfar: framing.z_far,
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(
            Point3::from_vec(self.eye),
            Point3::from_vec(self.target),
            self.up,
        )
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn uniform(&self) -> CameraUniform {
        CameraUniform {
            view_position: [self.eye.x, self.eye.y, self.eye.z, 1.0],
            view_proj: convert_matrix4_to_array(self.build_view_projection_matrix()),
        }
    }
}
