//! # Camera Component
//!
//! Projection parameters for the entity that views the scene. The camera's pose
//! is not stored here: it comes from the owning entity's local-to-world matrix,
//! so parenting a camera to a moving entity just works.
//!
//! ## Coordinate System
//! Right-handed, Y-up. The camera looks down its local -Z axis and its local +Y
//! is up. Projection matrices follow OpenGL conventions (NDC depth in [-1, 1]),
//! which the sky pass relies on to pin its depth to the far plane.

use crate::ecs::Component;
use crate::foundation::math::{utils, Mat4, Point3, Vec3};

/// Projection model of a camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Perspective projection with a vertical field of view in radians
    Perspective {
        /// Vertical field of view (radians)
        fov_y: f32,
    },
    /// Orthographic projection with a fixed visible height in world units
    Orthographic {
        /// Visible height; width follows from the aspect ratio
        height: f32,
    },
}

/// Camera component
#[derive(Debug, Clone, PartialEq)]
pub struct CameraComponent {
    /// Projection model
    pub projection: Projection,

    /// Distance to near clipping plane
    pub near: f32,

    /// Distance to far clipping plane
    pub far: f32,
}

impl Component for CameraComponent {}

impl Default for CameraComponent {
    /// 90 degree perspective camera with near 0.01 and far 100
    fn default() -> Self {
        Self {
            projection: Projection::Perspective {
                fov_y: utils::deg_to_rad(90.0),
            },
            near: 0.01,
            far: 100.0,
        }
    }
}

impl CameraComponent {
    /// Create a perspective camera
    ///
    /// # Arguments
    /// * `fov_y_degrees` - Vertical field of view in degrees
    /// * `near` - Distance to near clipping plane (must be > 0)
    /// * `far` - Distance to far clipping plane (must be > near)
    pub fn perspective(fov_y_degrees: f32, near: f32, far: f32) -> Self {
        Self {
            projection: Projection::Perspective {
                fov_y: utils::deg_to_rad(fov_y_degrees),
            },
            near,
            far,
        }
    }

    /// Create an orthographic camera showing `height` world units vertically
    pub fn orthographic(height: f32, near: f32, far: f32) -> Self {
        Self {
            projection: Projection::Orthographic { height },
            near,
            far,
        }
    }

    /// World-to-camera matrix for a camera whose owner has `local_to_world`.
    ///
    /// Eye is the owner's origin, the target is one unit down local -Z, and up
    /// is local +Y, all carried into world space.
    pub fn view_matrix(local_to_world: &Mat4) -> Mat4 {
        let eye = local_to_world.transform_point(&Point3::origin());
        let target = local_to_world.transform_point(&Point3::new(0.0, 0.0, -1.0));
        let up = local_to_world.transform_vector(&Vec3::y());
        Mat4::look_at_rh(&eye, &target, &up)
    }

    /// Projection matrix for a viewport of `viewport_size` pixels
    pub fn projection_matrix(&self, viewport_size: (u32, u32)) -> Mat4 {
        let (width, height) = viewport_size;
        let aspect = if height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        };

        match self.projection {
            Projection::Perspective { fov_y } => {
                Mat4::new_perspective(aspect, fov_y, self.near, self.far)
            }
            Projection::Orthographic { height } => {
                let half_height = height * 0.5;
                let half_width = half_height * aspect;
                Mat4::new_orthographic(
                    -half_width,
                    half_width,
                    -half_height,
                    half_height,
                    self.near,
                    self.far,
                )
            }
        }
    }

    /// Combined view-projection matrix, `P * V`
    pub fn view_projection_matrix(&self, local_to_world: &Mat4, viewport_size: (u32, u32)) -> Mat4 {
        self.projection_matrix(viewport_size) * Self::view_matrix(local_to_world)
    }

    /// Camera's forward axis (local -Z) in world space, normalized
    pub fn forward(local_to_world: &Mat4) -> Vec3 {
        local_to_world
            .transform_vector(&Vec3::new(0.0, 0.0, -1.0))
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(|| Vec3::new(0.0, 0.0, -1.0))
    }
}
