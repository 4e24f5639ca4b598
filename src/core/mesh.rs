use std::path::{Path, PathBuf};

use glam::Vec3;
use log::{debug, info};

use crate::core::Color;
use crate::error::{EngineError, Result};

/// Name the ship profile asks for; always answered by the built-in hull.
pub const SHIP_MESH: &str = "Ship.mesh";
pub const CUBE_MESH: &str = "cube.mesh";

#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub pos: Vec3,            // Position in model space
    pub normal: Vec3,         // Unit normal in model space
    pub color: Option<Color>, // Optional vertex color, wins over the material
}

#[derive(Debug, Clone)]
pub struct Tri {
    pub vertices: [usize; 3],    // Indices into the vertex buffer
    pub material: Option<usize>, // Material ID
}

#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    pub diffuse: Color,
    pub specular: Color,
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            diffuse: Color::WHITE,
            specular: Color::gray(0.5),
            shininess: 32.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<Vertex>,    // Vertex buffer
    pub tris: Vec<Tri>,           // Triangles
    pub materials: Vec<Material>, // Materials if available
}

impl Mesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vertices: Vec::new(),
            tris: Vec::new(),
            materials: Vec::new(),
        }
    }

    /// Look a mesh up by name: built-ins first, then `name` as a path, then each
    /// resource directory in order.
    pub fn resolve(name: &str, resource_dirs: &[PathBuf]) -> Result<Self> {
        match name {
            SHIP_MESH => return Ok(Mesh::ship()),
            CUBE_MESH => return Ok(Mesh::cube(10.0)),
            _ => {}
        }

        let direct = Path::new(name);
        if direct.is_file() {
            return Mesh::from_obj(direct);
        }

        for dir in resource_dirs {
            let candidate = dir.join(name);
            debug!("looking for mesh at {}", candidate.display());
            if candidate.is_file() {
                return Mesh::from_obj(&candidate);
            }
        }

        Err(EngineError::MeshNotFound(name.to_string()))
    }

    pub fn from_obj(path: &Path) -> Result<Self> {
        let (models, materials_result) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )
        .map_err(|source| EngineError::MeshLoad {
            path: path.to_path_buf(),
            source,
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mut mesh = Mesh::new(name);

        // Materials are optional, a missing .mtl just means everything is white
        if let Ok(materials) = materials_result {
            for m in materials {
                let mut mat = Material {
                    name: m.name.clone(),
                    ..Material::default()
                };
                if let Some(d) = m.diffuse {
                    mat.diffuse = Color::new(d[0], d[1], d[2]);
                }
                if let Some(s) = m.specular {
                    mat.specular = Color::new(s[0], s[1], s[2]);
                }
                if let Some(shininess) = m.shininess {
                    mat.shininess = shininess;
                }
                mesh.materials.push(mat);
            }
        }

        let mut needs_normals = false;
        for model in models {
            let data = model.mesh;
            let base = mesh.vertices.len();
            let has_normals = data.normals.len() == data.positions.len();
            needs_normals |= !has_normals;

            for (i, pos) in data.positions.chunks_exact(3).enumerate() {
                let normal = if has_normals {
                    Vec3::new(
                        data.normals[i * 3],
                        data.normals[i * 3 + 1],
                        data.normals[i * 3 + 2],
                    )
                    .normalize_or_zero()
                } else {
                    Vec3::ZERO
                };
                mesh.vertices.push(Vertex {
                    pos: Vec3::new(pos[0], pos[1], pos[2]),
                    normal,
                    color: None,
                });
            }

            for face in data.indices.chunks_exact(3) {
                mesh.tris.push(Tri {
                    vertices: [
                        base + face[0] as usize,
                        base + face[1] as usize,
                        base + face[2] as usize,
                    ],
                    material: data.material_id,
                });
            }
        }

        if needs_normals {
            mesh.compute_normals();
        }

        info!(
            "loaded {} ({} vertices, {} tris, {} materials)",
            mesh.name,
            mesh.vertices.len(),
            mesh.tris.len(),
            mesh.materials.len()
        );
        Ok(mesh)
    }

    /// Smooth per-vertex normals: area weighted average of the adjacent faces.
    pub fn compute_normals(&mut self) {
        let mut acc = vec![Vec3::ZERO; self.vertices.len()];
        for tri in &self.tris {
            let [a, b, c] = tri.vertices;
            let n = (self.vertices[b].pos - self.vertices[a].pos)
                .cross(self.vertices[c].pos - self.vertices[a].pos);
            acc[a] += n;
            acc[b] += n;
            acc[c] += n;
        }
        for (v, n) in self.vertices.iter_mut().zip(acc) {
            v.normal = n.normalize_or_zero();
        }
    }

    pub fn material(&self, tri: &Tri) -> Option<&Material> {
        tri.material.and_then(|id| self.materials.get(id))
    }

    /// Pushes a flat shaded triangle, flipping the winding if needed so the face
    /// normal points along `outward`.
    fn push_flat_tri(&mut self, mut a: Vec3, b: Vec3, mut c: Vec3, outward: Vec3, color: Color) {
        let mut normal = (b - a).cross(c - a).normalize_or_zero();
        if normal.dot(outward) < 0.0 {
            std::mem::swap(&mut a, &mut c);
            normal = -normal;
        }
        let base = self.vertices.len();
        for pos in [a, b, c] {
            self.vertices.push(Vertex {
                pos,
                normal,
                color: Some(color),
            });
        }
        self.tris.push(Tri {
            vertices: [base, base + 1, base + 2],
            material: None,
        });
    }

    pub fn cube(size: f32) -> Self {
        let h = size * 0.5;
        #[rustfmt::skip]
        let faces = [
            (Vec3::X, [Vec3::new(h, -h, -h), Vec3::new(h, h, -h), Vec3::new(h, h, h), Vec3::new(h, -h, h)]),
            (Vec3::NEG_X, [Vec3::new(-h, -h, -h), Vec3::new(-h, -h, h), Vec3::new(-h, h, h), Vec3::new(-h, h, -h)]),
            (Vec3::Y, [Vec3::new(-h, h, -h), Vec3::new(-h, h, h), Vec3::new(h, h, h), Vec3::new(h, h, -h)]),
            (Vec3::NEG_Y, [Vec3::new(-h, -h, -h), Vec3::new(h, -h, -h), Vec3::new(h, -h, h), Vec3::new(-h, -h, h)]),
            (Vec3::Z, [Vec3::new(-h, -h, h), Vec3::new(h, -h, h), Vec3::new(h, h, h), Vec3::new(-h, h, h)]),
            (Vec3::NEG_Z, [Vec3::new(-h, -h, -h), Vec3::new(-h, h, -h), Vec3::new(h, h, -h), Vec3::new(h, -h, -h)]),
        ];

        let mut mesh = Mesh::new(CUBE_MESH);
        for (outward, q) in faces {
            mesh.push_flat_tri(q[0], q[1], q[2], outward, Color::LIGHT_GRAY);
            mesh.push_flat_tri(q[2], q[3], q[0], outward, Color::LIGHT_GRAY);
        }
        mesh
    }

    /// Low poly dart: fuselage along +Z, wings in the YZ plane, a fin on +X.
    pub fn ship() -> Self {
        let mut mesh = Mesh::new(SHIP_MESH);

        let nose = Vec3::new(0.0, 0.0, 16.0);
        let tail = [
            Vec3::new(2.0, 0.0, -8.0),
            Vec3::new(0.0, 2.0, -8.0),
            Vec3::new(-2.0, 0.0, -8.0),
            Vec3::new(0.0, -2.0, -8.0),
        ];

        // hull: four sides running from the nose to the tail diamond
        for i in 0..4 {
            let a = tail[i];
            let b = tail[(i + 1) % 4];
            let outward = (a + b) * 0.5 - Vec3::new(0.0, 0.0, -8.0);
            mesh.push_flat_tri(nose, a, b, outward, Color::STEEL);
        }
        // tail cap
        mesh.push_flat_tri(tail[0], tail[1], tail[2], Vec3::NEG_Z, Color::DARK_GRAY);
        mesh.push_flat_tri(tail[2], tail[3], tail[0], Vec3::NEG_Z, Color::DARK_GRAY);

        // wings, two slightly separated skins so both sides shade
        for side in [1.0_f32, -1.0] {
            let root_front = Vec3::new(0.0, 2.0 * side, 2.0);
            let tip = Vec3::new(0.0, 10.0 * side, -8.0);
            let root_back = Vec3::new(0.0, 2.0 * side, -8.0);
            for skin in [Vec3::X, Vec3::NEG_X] {
                let off = skin * 0.25;
                mesh.push_flat_tri(
                    root_front + off,
                    tip + off,
                    root_back + off,
                    skin,
                    Color::GRAY,
                );
            }
        }

        // fin
        let fin = [
            Vec3::new(2.0, 0.0, -2.0),
            Vec3::new(6.0, 0.0, -8.0),
            Vec3::new(2.0, 0.0, -8.0),
        ];
        for skin in [Vec3::Y, Vec3::NEG_Y] {
            let off = skin * 0.25;
            mesh.push_flat_tri(fin[0] + off, fin[1] + off, fin[2] + off, skin, Color::ORANGE);
        }

        mesh
    }
}
