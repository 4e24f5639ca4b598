use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};
use log::{debug, warn};

use crate::core::camera::Camera;
use crate::core::entity::Entity;
use crate::core::light::{Light, WorldLight};
use crate::core::mesh::Mesh;
use crate::core::shadow::{ShadowCasters, ShadowTechnique};
use crate::core::transform::{Transform, TransformSpace};
use crate::core::Color;
use crate::error::Result;

/// Handle to a node in a [`SceneManager`]. Nodes are never removed, so a handle
/// stays valid for the lifetime of the manager that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CameraId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LightId(usize);

/// Anything that can hang off a scene node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovableObject {
    Entity(EntityId),
    Camera(CameraId),
    Light(LightId),
}

impl From<EntityId> for MovableObject {
    fn from(id: EntityId) -> Self {
        MovableObject::Entity(id)
    }
}

impl From<CameraId> for MovableObject {
    fn from(id: CameraId) -> Self {
        MovableObject::Camera(id)
    }
}

impl From<LightId> for MovableObject {
    fn from(id: LightId) -> Self {
        MovableObject::Light(id)
    }
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    transform: Transform,
    attached: Vec<MovableObject>,
}

impl SceneNode {
    fn new(parent: Option<NodeId>) -> Self {
        Self {
            parent,
            children: Vec::new(),
            transform: Transform::IDENTITY,
            attached: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn attached(&self) -> &[MovableObject] {
        &self.attached
    }

    pub fn position(&self) -> Vec3 {
        self.transform.pos
    }

    pub fn orientation(&self) -> Quat {
        self.transform.rot
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    object: T,
    node: Option<NodeId>,
}

impl<T> Slot<T> {
    fn new(object: T) -> Self {
        Self { object, node: None }
    }
}

/// The scene graph plus everything living in it: nodes, entities, cameras and
/// lights, along with scene wide lighting state.
pub struct SceneManager {
    nodes: Vec<SceneNode>,
    entities: Vec<Slot<Entity>>,
    cameras: Vec<Slot<Camera>>,
    lights: Vec<Slot<Light>>,
    mesh_cache: HashMap<String, Arc<Mesh>>,
    resource_dirs: Vec<PathBuf>,
    ambient: Color,
    shadow_technique: ShadowTechnique,
    shadow_colour: Color,
}

impl Default for SceneManager {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl SceneManager {
    const ROOT: NodeId = NodeId(0);

    pub fn new(resource_dirs: Vec<PathBuf>) -> Self {
        Self {
            nodes: vec![SceneNode::new(None)],
            entities: Vec::new(),
            cameras: Vec::new(),
            lights: Vec::new(),
            mesh_cache: HashMap::new(),
            resource_dirs,
            ambient: Color::gray(0.2),
            shadow_technique: ShadowTechnique::None,
            shadow_colour: Color::gray(0.25),
        }
    }

    pub fn root_scene_node(&self) -> NodeId {
        Self::ROOT
    }

    pub fn node(&self, id: NodeId) -> &SceneNode {
        &self.nodes[id.0]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn create_child_scene_node(&mut self, parent: NodeId) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SceneNode::new(Some(parent)));
        self.nodes[parent.0].children.push(id);
        id
    }

    // --- movable objects --------------------------------------------------

    /// Creates an entity for `mesh_name`. Meshes are loaded once and shared.
    pub fn create_entity(&mut self, mesh_name: &str) -> Result<EntityId> {
        let mesh = match self.mesh_cache.get(mesh_name) {
            Some(mesh) => Arc::clone(mesh),
            None => {
                let mesh = Arc::new(Mesh::resolve(mesh_name, &self.resource_dirs)?);
                self.mesh_cache
                    .insert(mesh_name.to_string(), Arc::clone(&mesh));
                mesh
            }
        };
        let id = EntityId(self.entities.len());
        let name = format!("{}#{}", mesh_name, id.0);
        debug!("created entity {}", name);
        self.entities.push(Slot::new(Entity::new(name, mesh)));
        Ok(id)
    }

    pub fn create_camera(&mut self, name: &str) -> CameraId {
        let id = CameraId(self.cameras.len());
        self.cameras.push(Slot::new(Camera::new(name)));
        id
    }

    pub fn create_light(&mut self, name: &str) -> LightId {
        let id = LightId(self.lights.len());
        self.lights.push(Slot::new(Light::new(name)));
        id
    }

    pub fn entity(&self, id: EntityId) -> &Entity {
        &self.entities[id.0].object
    }

    pub fn entity_mut(&mut self, id: EntityId) -> &mut Entity {
        &mut self.entities[id.0].object
    }

    pub fn camera(&self, id: CameraId) -> &Camera {
        &self.cameras[id.0].object
    }

    pub fn camera_mut(&mut self, id: CameraId) -> &mut Camera {
        &mut self.cameras[id.0].object
    }

    pub fn light(&self, id: LightId) -> &Light {
        &self.lights[id.0].object
    }

    pub fn light_mut(&mut self, id: LightId) -> &mut Light {
        &mut self.lights[id.0].object
    }

    /// Hangs `object` off `node`. An object lives on at most one node, attaching it
    /// again moves it.
    pub fn attach_object(&mut self, node: NodeId, object: impl Into<MovableObject>) {
        let object = object.into();
        let slot_node = match object {
            MovableObject::Entity(id) => &mut self.entities[id.0].node,
            MovableObject::Camera(id) => &mut self.cameras[id.0].node,
            MovableObject::Light(id) => &mut self.lights[id.0].node,
        };
        if let Some(previous) = slot_node.replace(node) {
            warn!("{:?} was already attached to {:?}, moving it", object, previous);
            self.nodes[previous.0].attached.retain(|o| *o != object);
        }
        self.nodes[node.0].attached.push(object);
    }

    // --- scene wide state ---------------------------------------------------

    pub fn set_ambient_light(&mut self, colour: Color) {
        self.ambient = colour;
    }

    pub fn ambient_light(&self) -> Color {
        self.ambient
    }

    pub fn set_shadow_technique(&mut self, technique: ShadowTechnique) {
        debug!("shadow technique: {}", technique);
        self.shadow_technique = technique;
    }

    pub fn shadow_technique(&self) -> ShadowTechnique {
        self.shadow_technique
    }

    pub fn shadow_colour(&self) -> Color {
        self.shadow_colour
    }

    // --- node transforms ----------------------------------------------------

    pub fn set_position(&mut self, node: NodeId, pos: Vec3) {
        self.nodes[node.0].transform.pos = pos;
    }

    pub fn set_orientation(&mut self, node: NodeId, rot: Quat) {
        self.nodes[node.0].transform.rot = rot.normalize();
    }

    /// Incremental rotation of `node` by `q`, with the rotation axis expressed in
    /// `space`.
    pub fn rotate(&mut self, node: NodeId, q: Quat, space: TransformSpace) {
        let q = q.normalize();
        match space {
            TransformSpace::Local => self.nodes[node.0].transform.rotate_local(q),
            TransformSpace::Parent => self.nodes[node.0].transform.rotate_parent(q),
            TransformSpace::World => {
                // conjugate the world rotation into the node's local frame
                let derived = self.derived_orientation(node);
                let local = derived.inverse() * q * derived;
                self.nodes[node.0].transform.rotate_local(local);
            }
        }
    }

    pub fn rotate_axis(&mut self, node: NodeId, axis: Vec3, degrees: f32, space: TransformSpace) {
        let q = Quat::from_axis_angle(axis.normalize(), degrees.to_radians());
        self.rotate(node, q, space);
    }

    /// Rotate about the local Y axis.
    pub fn yaw(&mut self, node: NodeId, degrees: f32) {
        self.rotate_axis(node, Vec3::Y, degrees, TransformSpace::Local);
    }

    /// Rotate about the local X axis.
    pub fn pitch(&mut self, node: NodeId, degrees: f32) {
        self.rotate_axis(node, Vec3::X, degrees, TransformSpace::Local);
    }

    /// Rotate about the local Z axis.
    pub fn roll(&mut self, node: NodeId, degrees: f32) {
        self.rotate_axis(node, Vec3::Z, degrees, TransformSpace::Local);
    }

    /// Turns the node so its local -Z axis points at `target`, using the shortest
    /// arc from where it currently points.
    pub fn look_at(&mut self, node: NodeId, target: Vec3, space: TransformSpace) {
        let world_target = match space {
            TransformSpace::World => target,
            TransformSpace::Parent => match self.nodes[node.0].parent {
                Some(parent) => self.world_matrix(parent).transform_point3(target),
                None => target,
            },
            TransformSpace::Local => self.world_matrix(node).transform_point3(target),
        };

        let dir = (world_target - self.derived_position(node)).normalize_or_zero();
        if dir == Vec3::ZERO {
            warn!("look_at target coincides with node {:?}, ignoring", node);
            return;
        }

        let current = self.derived_orientation(node);
        let current_dir = current * Vec3::NEG_Z;
        let target_world = Quat::from_rotation_arc(current_dir, dir) * current;
        self.set_derived_orientation(node, target_world);
    }

    fn set_derived_orientation(&mut self, node: NodeId, world: Quat) {
        let parent_rot = match self.nodes[node.0].parent {
            Some(parent) => self.derived_orientation(parent),
            None => Quat::IDENTITY,
        };
        self.nodes[node.0].transform.rot = (parent_rot.inverse() * world).normalize();
    }

    // --- derived (world space) state ---------------------------------------

    pub fn derived_orientation(&self, node: NodeId) -> Quat {
        let n = &self.nodes[node.0];
        match n.parent {
            Some(parent) => self.derived_orientation(parent) * n.transform.rot,
            None => n.transform.rot,
        }
    }

    pub fn derived_position(&self, node: NodeId) -> Vec3 {
        self.world_matrix(node).w_axis.truncate()
    }

    pub fn world_matrix(&self, node: NodeId) -> Mat4 {
        let n = &self.nodes[node.0];
        match n.parent {
            Some(parent) => self.world_matrix(parent) * n.transform.matrix(),
            None => n.transform.matrix(),
        }
    }

    /// World matrices for every node, parents before children.
    pub fn world_matrices(&self) -> Vec<Mat4> {
        let mut out = vec![Mat4::IDENTITY; self.nodes.len()];
        let mut stack = vec![(Self::ROOT, Mat4::IDENTITY)];
        while let Some((id, parent)) = stack.pop() {
            let node = &self.nodes[id.0];
            let world = parent * node.transform.matrix();
            out[id.0] = world;
            stack.extend(node.children.iter().map(|c| (*c, world)));
        }
        out
    }

    /// Whether `node` hangs (transitively) off the root. Detached subtrees are not
    /// rendered.
    pub fn is_in_scene_graph(&self, node: NodeId) -> bool {
        let mut cur = node;
        loop {
            if cur == Self::ROOT {
                return true;
            }
            match self.nodes[cur.0].parent {
                Some(p) => cur = p,
                None => return false,
            }
        }
    }

    /// View matrix for a camera: the inverse of its node's rigid transform.
    /// `None` while the camera isn't attached anywhere.
    pub fn view_matrix(&self, camera: CameraId) -> Option<Mat4> {
        let node = self.cameras[camera.0].node?;
        let rot = self.derived_orientation(node);
        let pos = self.derived_position(node);
        Some(Mat4::from_rotation_translation(rot, pos).inverse())
    }

    pub fn camera_position(&self, camera: CameraId) -> Option<Vec3> {
        self.cameras[camera.0]
            .node
            .map(|node| self.derived_position(node))
    }

    /// Entities attached into the scene graph, with their world matrices.
    pub fn renderables(&self) -> Vec<(&Entity, Mat4)> {
        let worlds = self.world_matrices();
        self.entities
            .iter()
            .filter_map(|slot| {
                let node = slot.node?;
                self.is_in_scene_graph(node)
                    .then(|| (&slot.object, worlds[node.0]))
            })
            .collect()
    }

    pub fn world_lights(&self) -> Vec<WorldLight> {
        self.lights
            .iter()
            .filter_map(|slot| {
                let node = slot.node?;
                if !self.is_in_scene_graph(node) {
                    return None;
                }
                Some(WorldLight {
                    light: slot.object.clone(),
                    position: self.derived_position(node),
                    direction: self.derived_orientation(node) * Vec3::NEG_Z,
                })
            })
            .collect()
    }

    /// Triangles of every shadow casting entity, or nothing when shadows are off.
    pub fn shadow_casters(&self) -> ShadowCasters {
        let mut casters = ShadowCasters::new();
        if self.shadow_technique == ShadowTechnique::None {
            return casters;
        }
        for (entity, world) in self.renderables() {
            if !entity.cast_shadows() {
                continue;
            }
            let mesh = &entity.mesh;
            casters.push(
                &world,
                mesh.tris
                    .iter()
                    .map(|t| t.vertices.map(|i| mesh.vertices[i].pos)),
            );
        }
        casters
    }
}
