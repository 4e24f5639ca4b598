use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use crate::core::mesh::Mesh;

/// A renderable instance of a mesh. Meshes are shared between entities created
/// from the same name.
#[derive(Clone, Debug)]
pub struct Entity {
    pub name: String,
    pub mesh: Arc<Mesh>,
    cast_shadows: bool,
}

impl Display for Entity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Entity: {:?} ({})", self.name, self.mesh.name)
    }
}

impl Entity {
    pub fn new(name: impl Into<String>, mesh: Arc<Mesh>) -> Self {
        Self {
            name: name.into(),
            mesh,
            cast_shadows: false,
        }
    }

    pub fn set_cast_shadows(&mut self, cast: bool) {
        self.cast_shadows = cast;
    }

    pub fn cast_shadows(&self) -> bool {
        self.cast_shadows
    }
}
