//! Transform component for the ECS system
//!
//! Pure data component holding an entity's transform relative to its parent
//! (or to the world for root entities).

use crate::ecs::Component;
use crate::foundation::math::{Mat4, Quat, Transform as MathTransform, Vec3};

/// ECS Transform component
///
/// Y-up right-handed coordinates. Rotation is applied after scale and before
/// translation.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformComponent {
    /// Position relative to the parent
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Component for TransformComponent {}

impl Default for TransformComponent {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl TransformComponent {
    /// Create identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create from position only
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Convert to foundation math Transform for calculations
    pub fn to_math_transform(&self) -> MathTransform {
        MathTransform {
            position: self.position,
            rotation: self.rotation,
            scale: self.scale,
        }
    }

    /// Convert to transformation matrix (TRS order)
    pub fn to_matrix(&self) -> Mat4 {
        self.to_math_transform().to_matrix()
    }

    /// Builder pattern: Set position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Builder pattern: Set rotation from quaternion
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Builder pattern: Set scale (uniform)
    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::new(scale, scale, scale);
        self
    }

    /// Builder pattern: Set scale (non-uniform)
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::utils::origin_of;
    use approx::assert_relative_eq;

    #[test]
    fn test_transform_identity() {
        let transform = TransformComponent::identity();

        assert_eq!(transform.position, Vec3::zeros());
        assert_eq!(transform.scale, Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(transform.to_matrix(), Mat4::identity());
    }

    #[test]
    fn test_builder_chain() {
        let transform = TransformComponent::identity()
            .with_position(Vec3::new(3.0, 0.0, -1.0))
            .with_uniform_scale(2.0);

        let matrix = transform.to_matrix();
        assert_relative_eq!(origin_of(&matrix), Vec3::new(3.0, 0.0, -1.0));
        assert_relative_eq!(matrix[(0, 0)], 2.0);
    }
}
