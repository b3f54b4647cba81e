//! Camera state and its GPU uniform.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Host-side camera state
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: Vec3,
    pub yaw_degrees: f32,
    pub pitch_degrees: f32,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 24.0, -24.0),
            yaw_degrees: 90.0,
            pitch_degrees: -30.0,
            fov_degrees: 70.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Camera {
    /// Unit vector the camera looks along.
    pub fn front(&self) -> Vec3 {
        let yaw = self.yaw_degrees.to_radians();
        let pitch = self.pitch_degrees.to_radians();
        Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize()
    }

    /// Build the packed uniform for an output of the given aspect ratio.
    pub fn uniform(&self, aspect: f32) -> CameraUniform {
        let view = Mat4::look_at_rh(self.position, self.position + self.front(), Vec3::Y);
        let projection =
            Mat4::perspective_rh(self.fov_degrees.to_radians(), aspect, self.near, self.far);
        CameraUniform {
            view_projection: (projection * view).to_cols_array_2d(),
            position: [self.position.x, self.position.y, self.position.z, 1.0],
        }
    }
}

/// Must match the `CameraUniform` struct in world.wgsl
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    /// View-projection matrix (column-major)
    pub view_projection: [[f32; 4]; 4],
    /// Camera position (vec3 + padding)
    pub position: [f32; 4],
}

static_assertions::const_assert_eq!(std::mem::size_of::<CameraUniform>(), 80);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_front_is_unit_length() {
        let camera = Camera::default();
        assert!((camera.front().length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_uniform_carries_position() {
        let camera = Camera {
            position: Vec3::new(1.0, 2.0, 3.0),
            ..Camera::default()
        };
        let uniform = camera.uniform(16.0 / 9.0);
        assert_eq!(uniform.position, [1.0, 2.0, 3.0, 1.0]);
    }
}
