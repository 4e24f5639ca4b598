use glam::{Mat3, Mat4, Vec3, Vec4};
use log::trace;
use rayon::prelude::*;

use crate::core::{Color, Material, SceneManager, ShadowCasters, ShadowTechnique, WorldLight};
use crate::error::{EngineError, Result};

pub mod buffer;
pub mod clipper;
pub mod rasterizer;
pub mod viewport;

pub use buffer::{Buffer, Cell, FrameBuffer, TermBuffer};
pub use clipper::{ClipTriangle, ClipVertex, Clipper};
pub use rasterizer::Rasterizer;
pub use viewport::Viewport;

/// The bits of a material the fragment stage needs, small enough to copy around.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceParams {
    pub specular: Color,
    pub shininess: f32,
}

impl Default for SurfaceParams {
    fn default() -> Self {
        let m = Material::default();
        Self {
            specular: m.specular,
            shininess: m.shininess,
        }
    }
}

impl From<&Material> for SurfaceParams {
    fn from(m: &Material) -> Self {
        Self {
            specular: m.specular,
            shininess: m.shininess,
        }
    }
}

/// A clipped, front facing triangle ready for rasterization
#[derive(Clone, Debug)]
pub struct ProcessedGeometry {
    pub vertices: [ClipVertex; 3],
    pub surface: SurfaceParams,
}

#[derive(Clone, Debug)]
pub struct Fragment {
    pub x: usize,
    pub y: usize,
    /// View space distance from the camera
    pub depth: f32,
    pub world: Vec3,
    pub normal: Vec3,
    /// Unlit surface colour
    pub color: Color,
    pub surface: SurfaceParams,
}

/// Everything the fragment stage needs from the scene for one frame.
struct LightingContext {
    eye: Vec3,
    ambient: Color,
    lights: Vec<WorldLight>,
    technique: ShadowTechnique,
    shadow_colour: Color,
    casters: ShadowCasters,
}

impl LightingContext {
    fn shade(&self, frag: &Fragment) -> Color {
        let view_dir = (self.eye - frag.world).normalize_or_zero();
        let material = Material {
            specular: frag.surface.specular,
            shininess: frag.surface.shininess,
            ..Material::default()
        };

        let mut color = self.ambient * frag.color;
        let mut in_shadow = false;
        for light in &self.lights {
            let lit = light.contribution(frag.world, frag.normal, view_dir, frag.color, &material);
            if lit.is_black() {
                continue;
            }
            let occluded = self.technique != ShadowTechnique::None
                && light.light.cast_shadows
                && self.casters.occluded(frag.world, self.light_point(light, frag.world));

            match (self.technique, occluded) {
                // additive: an occluded light simply isn't accumulated
                (ShadowTechnique::StencilAdditive, true) => {}
                (ShadowTechnique::StencilModulative, true) => {
                    in_shadow = true;
                    color += lit;
                }
                _ => color += lit,
            }
        }

        if in_shadow {
            color = color * self.shadow_colour;
        }
        color.clamped()
    }

    /// Where a shadow ray towards `light` should end.
    fn light_point(&self, light: &WorldLight, from: Vec3) -> Vec3 {
        let (dir, dist) = light.incidence(from);
        if dist.is_finite() {
            light.position
        } else {
            // far enough to leave any caster behind
            from + dir * 1.0e5
        }
    }
}

/// A graphics rendering pipeline that turns a scene into pixels.
///
/// The pipeline handles:
/// - Vertex processing and transformation to clip space
/// - Triangle clipping against view frustum and back face culling
/// - Rasterization of triangles to fragments
/// - Depth resolve, then lighting and shadows for the visible fragments only
/// - Writing the result into the back buffer and swapping
pub struct Pipeline<B: Buffer> {
    pub width: usize,                   // Screen width in pixels
    pub height: usize,                  // Screen height in pixels
    front_buffer: B,                    // Currently displayed buffer
    back_buffer: B,                     // Buffer being rendered to
    geometry: Vec<ProcessedGeometry>,   // Transformed geometry ready for rasterization
    rasterizer: Rasterizer,             // Converts triangles to fragments
    clipper: Clipper,                   // Clips triangles against view frustum
    fragments: Vec<Fragment>,           // Output fragments from rasterization
    nearest: Vec<Option<usize>>,        // Winning fragment per pixel
}

impl<B: Buffer> Pipeline<B> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            front_buffer: B::new(width, height),
            back_buffer: B::new(width, height),
            geometry: Vec::with_capacity(1024),
            rasterizer: Rasterizer::new(width, height),
            clipper: Clipper::new(),
            fragments: Vec::with_capacity(1024),
            nearest: vec![None; width * height],
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        self.front_buffer = B::new(width, height);
        self.back_buffer = B::new(width, height);
        self.rasterizer.resize(width, height);
        self.nearest = vec![None; width * height];
    }

    pub fn front_buffer(&self) -> &B {
        &self.front_buffer
    }

    /// Renders one frame of `scene` as seen through `viewport` and swaps buffers.
    pub fn render_frame(&mut self, scene: &SceneManager, viewport: &Viewport) -> Result<()> {
        let camera = scene.camera(viewport.camera());
        let view = scene
            .view_matrix(viewport.camera())
            .ok_or_else(|| EngineError::CameraDetached(camera.name.clone()))?;
        let projection = camera.projection_matrix();

        self.back_buffer.clear(viewport.background_colour());

        self.process_geometry(scene, projection * view);
        self.rasterizer.rasterize(&self.geometry, &mut self.fragments);

        let lighting = LightingContext {
            eye: scene.camera_position(viewport.camera()).unwrap_or(Vec3::ZERO),
            ambient: scene.ambient_light(),
            lights: scene.world_lights(),
            technique: scene.shadow_technique(),
            shadow_colour: scene.shadow_colour(),
            casters: scene.shadow_casters(),
        };
        self.process_fragments(&lighting);

        std::mem::swap(&mut self.front_buffer, &mut self.back_buffer);
        Ok(())
    }

    /// For each entity:
    /// 1. Calculate model-view-projection matrix
    /// 2. Transform vertices to clip space, positions and normals to world space
    /// 3. Clip triangles against view frustum
    /// 4. Store processed geometry for rasterization
    fn process_geometry(&mut self, scene: &SceneManager, view_proj: Mat4) {
        self.geometry.clear();

        for (entity, world) in scene.renderables() {
            let mvp = view_proj * world;
            let normal_matrix = Mat3::from_mat4(world).inverse().transpose();
            let mesh = &entity.mesh;

            for tri in &mesh.tris {
                let material = mesh.material(tri);
                let base_color = material.map(|m| m.diffuse).unwrap_or(Color::WHITE);
                let surface = material.map(SurfaceParams::from).unwrap_or_default();

                let vertices = tri.vertices.map(|i| {
                    let v = &mesh.vertices[i];
                    ClipVertex {
                        position: mvp * Vec4::from((v.pos, 1.0)),
                        world: world.transform_point3(v.pos),
                        normal: (normal_matrix * v.normal).normalize_or_zero(),
                        color: v.color.unwrap_or(base_color),
                    }
                });

                for clipped in self.clipper.clip_triangle(&ClipTriangle { vertices }) {
                    self.geometry.push(ProcessedGeometry {
                        vertices: clipped.vertices,
                        surface,
                    });
                }
            }
        }

        trace!("{} triangles survived clipping", self.geometry.len());
    }

    fn process_fragments(&mut self, lighting: &LightingContext) {
        // depth resolve first so the expensive shading only runs once per pixel
        self.nearest.iter_mut().for_each(|n| *n = None);
        for (i, frag) in self.fragments.iter().enumerate() {
            let index = frag.x + frag.y * self.width;
            match self.nearest[index] {
                Some(best) if self.fragments[best].depth <= frag.depth => {}
                _ => self.nearest[index] = Some(i),
            }
        }

        let fragments = &self.fragments;
        let shaded: Vec<(usize, Color)> = self
            .nearest
            .par_iter()
            .filter_map(|n| *n)
            .map(|i| (i, lighting.shade(&fragments[i])))
            .collect();

        for (i, color) in shaded {
            let frag = &self.fragments[i];
            self.back_buffer.set_pixel((frag.x, frag.y), frag.depth, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mesh::CUBE_MESH;
    use crate::core::TransformSpace;

    /// Camera at +Z looking at a cube at the origin, white point light next to it.
    fn cube_scene(technique: ShadowTechnique) -> (SceneManager, Viewport) {
        let mut scene = SceneManager::default();
        let root = scene.root_scene_node();

        let cam = scene.create_camera("cam");
        let cam_node = scene.create_child_scene_node(root);
        scene.set_position(cam_node, Vec3::new(0.0, 0.0, 40.0));
        scene.look_at(cam_node, Vec3::ZERO, TransformSpace::World);
        scene.camera_mut(cam).set_near_clip_distance(1.0);
        scene.attach_object(cam_node, cam);

        let cube = scene.create_entity(CUBE_MESH).unwrap();
        let cube_node = scene.create_child_scene_node(root);
        scene.attach_object(cube_node, cube);
        scene.entity_mut(cube).set_cast_shadows(true);

        let light = scene.create_light("Sun");
        let light_node = scene.create_child_scene_node(root);
        scene.set_position(light_node, Vec3::new(0.0, 0.0, 40.0));
        scene.attach_object(light_node, light);

        scene.set_ambient_light(Color::BLACK);
        scene.set_shadow_technique(technique);

        let mut viewport = Viewport::new(cam, 32, 32);
        viewport.set_background_colour(Color::BLUE);
        (scene, viewport)
    }

    #[test]
    fn renders_lit_cube_over_background() {
        let (scene, viewport) = cube_scene(ShadowTechnique::StencilAdditive);
        let mut pipeline = Pipeline::<FrameBuffer>::new(32, 32);
        pipeline.render_frame(&scene, &viewport).unwrap();

        let fb = pipeline.front_buffer();
        assert_eq!(fb.color_at((0, 0)), Some(Color::BLUE));
        let center = fb.color_at((16, 16)).unwrap();
        // front face is lit head on by a white light, so it's near full brightness
        assert!(center.r > 0.7 && center.g > 0.7, "{center:?}");
    }

    #[test]
    fn detached_camera_is_an_error() {
        let mut scene = SceneManager::default();
        let cam = scene.create_camera("floating");
        let viewport = Viewport::new(cam, 8, 8);
        let mut pipeline = Pipeline::<FrameBuffer>::new(8, 8);
        assert!(matches!(
            pipeline.render_frame(&scene, &viewport),
            Err(EngineError::CameraDetached(ref name)) if name == "floating"
        ));
    }

    #[test]
    fn additive_shadows_hide_occluded_light() {
        let (mut scene, _) = cube_scene(ShadowTechnique::StencilAdditive);
        let lighting = LightingContext {
            eye: Vec3::new(0.0, 0.0, 40.0),
            ambient: Color::BLACK,
            lights: scene.world_lights(),
            technique: ShadowTechnique::StencilAdditive,
            shadow_colour: scene.shadow_colour(),
            casters: scene.shadow_casters(),
        };
        // a fragment behind the cube, facing the light
        let frag = Fragment {
            x: 0,
            y: 0,
            depth: 1.0,
            world: Vec3::new(0.0, 0.0, -20.0),
            normal: Vec3::Z,
            color: Color::WHITE,
            surface: SurfaceParams::default(),
        };
        assert!(lighting.shade(&frag).is_black());

        scene.set_shadow_technique(ShadowTechnique::None);
        let unshadowed = LightingContext {
            technique: ShadowTechnique::None,
            casters: scene.shadow_casters(),
            ..lighting
        };
        assert!(!unshadowed.shade(&frag).is_black());
    }

    #[test]
    fn modulative_shadows_darken_instead() {
        let (scene, _) = cube_scene(ShadowTechnique::StencilModulative);
        let lighting = LightingContext {
            eye: Vec3::new(0.0, 0.0, 40.0),
            ambient: Color::BLACK,
            lights: scene.world_lights(),
            technique: ShadowTechnique::StencilModulative,
            shadow_colour: Color::gray(0.5),
            casters: scene.shadow_casters(),
        };
        let frag = Fragment {
            x: 0,
            y: 0,
            depth: 1.0,
            world: Vec3::new(0.0, 0.0, -20.0),
            normal: Vec3::Z,
            color: Color::WHITE,
            surface: SurfaceParams::default(),
        };
        let c = lighting.shade(&frag);
        assert!(!c.is_black());
        assert!(c.r <= 0.5 + 1e-4);
    }
}
