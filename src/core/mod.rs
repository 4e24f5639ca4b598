pub mod camera;
pub mod color;
pub mod entity;
pub mod light;
pub mod mesh;
pub mod scene;
pub mod shadow;
pub mod transform;

pub use camera::Camera;
pub use color::Color;
pub use entity::Entity;
pub use light::{Light, LightType, WorldLight};
pub use mesh::{Material, Mesh, Tri, Vertex};
pub use scene::{CameraId, EntityId, LightId, MovableObject, NodeId, SceneManager, SceneNode};
pub use shadow::{ShadowCasters, ShadowTechnique};
pub use transform::{Transform, TransformSpace};
