use glam::{Quat, Vec3};
use log::debug;

use crate::core::mesh::SHIP_MESH;
use crate::core::{NodeId, SceneManager, TransformSpace};
use crate::error::Result;

use super::input::{InputFlags, ShipKey};

/// Ship variants. There is only one so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShipKind {
    #[default]
    Default,
}

/// How a ship looks and handles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShipProfile {
    pub mesh: &'static str,
    /// Degrees per second about the world Y axis
    pub yaw_rate: f32,
    /// Degrees per second about the world Z axis
    pub roll_rate: f32,
}

impl ShipKind {
    pub fn profile(self) -> ShipProfile {
        match self {
            ShipKind::Default => ShipProfile {
                mesh: SHIP_MESH,
                yaw_rate: 5.0,
                roll_rate: 5.0,
            },
        }
    }
}

/// The player's ship: a profile and the scene node carrying its mesh.
#[derive(Debug, Clone)]
pub struct Ship {
    kind: ShipKind,
    profile: ShipProfile,
    node: NodeId,
}

impl Ship {
    /// Creates the ship entity under the root node. `mesh` overrides the
    /// profile's mesh.
    pub fn spawn(scene: &mut SceneManager, kind: ShipKind, mesh: Option<&str>) -> Result<Self> {
        let profile = kind.profile();
        let mesh = mesh.unwrap_or(profile.mesh);

        let entity = scene.create_entity(mesh)?;
        scene.entity_mut(entity).set_cast_shadows(true);

        let node = scene.create_child_scene_node(scene.root_scene_node());
        scene.attach_object(node, entity);
        debug!("spawned {:?} ship with mesh {} on {:?}", kind, mesh, node);

        Ok(Self {
            kind,
            profile,
            node,
        })
    }

    pub fn kind(&self) -> ShipKind {
        self.kind
    }

    pub fn profile(&self) -> &ShipProfile {
        &self.profile
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Turns the ship for one frame. Each held rotation key adds
    /// `rate * elapsed` degrees about its world axis, checked left, right, up,
    /// down. Thrust keys do nothing.
    pub fn apply_input(&self, scene: &mut SceneManager, flags: &InputFlags, elapsed: f32) {
        let steps = [
            (ShipKey::RotateLeft, Vec3::Y, self.profile.yaw_rate),
            (ShipKey::RotateRight, Vec3::Y, -self.profile.yaw_rate),
            (ShipKey::RotateUp, Vec3::Z, self.profile.roll_rate),
            (ShipKey::RotateDown, Vec3::Z, -self.profile.roll_rate),
        ];

        for (key, axis, rate) in steps {
            if flags.is_held(key) {
                let angle = (rate * elapsed).to_radians();
                scene.rotate(
                    self.node,
                    Quat::from_axis_angle(axis, angle),
                    TransformSpace::World,
                );
            }
        }
    }
}
