//! Position / rotation / scale triple shared by blocks, faces and proxies.

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Rigid transform with non-uniform scale.
///
/// Rotation is stored as XYZ Euler angles in radians so snapshots serialize
/// the same three numbers the editor shows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quat(), self.position)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_matrix() {
        assert_eq!(Transform::default().matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_translation_applies_after_scale() {
        let t = Transform {
            position: Vec3::new(1.0, 0.0, 0.0),
            rotation: Vec3::ZERO,
            scale: Vec3::splat(2.0),
        };
        let p = t.matrix().transform_point3(Vec3::new(0.5, 0.5, 0.5));
        assert!((p - Vec3::new(2.0, 1.0, 1.0)).length() < 1e-6);
    }
}
