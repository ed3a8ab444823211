use glam::{Affine3A, Quat, Vec3};

/// World-space placement of a scene object: translation, rotation and
/// per-axis scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Local-to-world matrix (scale, then rotation, then translation).
    pub fn to_affine(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Maps a point from this object's local frame into world space.
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.to_affine().transform_point3(local)
    }

    /// Maps a world-space point into this object's local frame.
    ///
    /// A zero scale component makes the result non-finite.
    pub fn inverse_transform_point(&self, world: Vec3) -> Vec3 {
        self.to_affine().inverse().transform_point3(world)
    }
}
