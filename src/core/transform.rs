use glam::{Mat4, Quat, Vec3};

/// Which frame of reference a node operation is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransformSpace {
    /// Relative to the node's own axes.
    #[default]
    Local,
    /// Relative to the parent node's axes.
    Parent,
    /// Relative to the scene root, i.e. fixed world axes.
    World,
}

/// Position / orientation / scale of a node relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub pos: Vec3,
    pub rot: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        pos: Vec3::ZERO,
        rot: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rot, self.pos)
    }

    /// Compose `rotation` after the current orientation, expressed in the node's own
    /// axes.
    pub fn rotate_local(&mut self, rotation: Quat) {
        self.rot = (self.rot * rotation).normalize();
    }

    /// Compose `rotation` in the parent's axes.
    pub fn rotate_parent(&mut self, rotation: Quat) {
        self.rot = (rotation * self.rot).normalize();
    }
}
