use glam::{Vec2, Vec3};
use log::trace;
use rayon::prelude::*;

use crate::pipeline::{Fragment, ProcessedGeometry};

pub struct Rasterizer {
    width: usize,
    height: usize,
}

impl Rasterizer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }

    /// Modifies the fragment buffer in place
    pub fn rasterize(&self, geometry: &[ProcessedGeometry], frags: &mut Vec<Fragment>) {
        frags.clear();
        if self.width == 0 || self.height == 0 {
            return;
        }

        frags.par_extend(
            geometry
                .par_iter()
                .flat_map_iter(|geo| self.rasterize_triangle(geo)),
        );

        trace!(
            "rasterized {} triangles into {} fragments",
            geometry.len(),
            frags.len()
        );
    }

    fn project_to_screen(&self, geo: &ProcessedGeometry) -> [Vec2; 3] {
        geo.vertices.map(|v| {
            let ndc = Vec2::new(v.position.x / v.position.w, v.position.y / v.position.w);
            // NDC y is up, buffer rows go down
            Vec2::new(
                (ndc.x + 1.0) * 0.5 * self.width as f32,
                (1.0 - ndc.y) * 0.5 * self.height as f32,
            )
        })
    }

    /// Barycentric scan of the triangle's bounding box, sampling pixel centres.
    /// Attributes are interpolated perspective correct.
    fn rasterize_triangle(&self, geo: &ProcessedGeometry) -> Vec<Fragment> {
        let mut fragments = Vec::new();
        let screen = self.project_to_screen(geo);

        let min = screen[0].min(screen[1]).min(screen[2]).floor().max(Vec2::ZERO);
        let max = screen[0]
            .max(screen[1])
            .max(screen[2])
            .ceil()
            .min(Vec2::new(self.width as f32, self.height as f32));
        if min.x >= max.x || min.y >= max.y {
            return fragments;
        }

        if barycentric(screen[0], screen[0], screen[1], screen[2]).is_none() {
            return fragments;
        }

        let inv_w = geo.vertices.map(|v| 1.0 / v.position.w);
        let [a, b, c] = &geo.vertices;

        for y in min.y as usize..max.y as usize {
            for x in min.x as usize..max.x as usize {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let Some((w0, w1, w2)) = barycentric(p, screen[0], screen[1], screen[2]) else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let pw0 = w0 * inv_w[0];
                let pw1 = w1 * inv_w[1];
                let pw2 = w2 * inv_w[2];
                let sum = pw0 + pw1 + pw2;
                if sum <= 0.0 {
                    continue;
                }
                // view space depth is 1 / interpolated(1 / w)
                let depth = 1.0 / sum;
                let (pw0, pw1, pw2) = (pw0 * depth, pw1 * depth, pw2 * depth);

                let world = a.world * pw0 + b.world * pw1 + c.world * pw2;
                let normal: Vec3 =
                    (a.normal * pw0 + b.normal * pw1 + c.normal * pw2).normalize_or_zero();
                let color = a.color * pw0 + b.color * pw1 + c.color * pw2;

                fragments.push(Fragment {
                    x,
                    y,
                    depth,
                    world,
                    normal,
                    color,
                    surface: geo.surface,
                });
            }
        }

        fragments
    }
}

fn barycentric(p: Vec2, v0: Vec2, v1: Vec2, v2: Vec2) -> Option<(f32, f32, f32)> {
    let denom = (v1.y - v2.y) * (v0.x - v2.x) + (v2.x - v1.x) * (v0.y - v2.y);
    if denom.abs() < 1e-10 {
        // Degenerate triangle
        return None;
    }
    let w0 = ((v1.y - v2.y) * (p.x - v2.x) + (v2.x - v1.x) * (p.y - v2.y)) / denom;
    let w1 = ((v2.y - v0.y) * (p.x - v2.x) + (v0.x - v2.x) * (p.y - v2.y)) / denom;
    let w2 = 1.0 - w0 - w1;
    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Color;
    use crate::pipeline::clipper::ClipVertex;
    use crate::pipeline::SurfaceParams;
    use glam::Vec4;

    fn vert(x: f32, y: f32, w: f32) -> ClipVertex {
        ClipVertex {
            position: Vec4::new(x * w, y * w, 0.0, w),
            world: Vec3::ZERO,
            normal: Vec3::Z,
            color: Color::RED,
        }
    }

    #[test]
    fn covers_roughly_half_the_screen() {
        let geo = ProcessedGeometry {
            vertices: [vert(-1.0, -1.0, 1.0), vert(1.0, -1.0, 1.0), vert(-1.0, 1.0, 1.0)],
            surface: SurfaceParams::default(),
        };
        let r = Rasterizer::new(10, 10);
        let mut frags = Vec::new();
        r.rasterize(&[geo], &mut frags);

        // 10x10 screen, lower left half including the diagonal
        assert!(frags.len() >= 45 && frags.len() <= 55, "{}", frags.len());
        assert!(frags.iter().all(|f| f.x < 10 && f.y < 10));
        assert!(frags
            .iter()
            .all(|f| (f.color.r - 1.0).abs() < 1e-4 && f.color.g == 0.0));
    }

    #[test]
    fn depth_is_perspective_correct() {
        let geo = ProcessedGeometry {
            vertices: [vert(-1.0, -1.0, 2.0), vert(1.0, -1.0, 2.0), vert(-1.0, 1.0, 2.0)],
            surface: SurfaceParams::default(),
        };
        let r = Rasterizer::new(8, 8);
        let mut frags = Vec::new();
        r.rasterize(&[geo], &mut frags);
        assert!(!frags.is_empty());
        assert!(frags.iter().all(|f| (f.depth - 2.0).abs() < 1e-4));
    }

    #[test]
    fn degenerate_triangle_makes_no_fragments() {
        let geo = ProcessedGeometry {
            vertices: [vert(0.0, 0.0, 1.0), vert(0.5, 0.5, 1.0), vert(1.0, 1.0, 1.0)],
            surface: SurfaceParams::default(),
        };
        let mut frags = Vec::new();
        Rasterizer::new(8, 8).rasterize(&[geo], &mut frags);
        assert!(frags.is_empty());
    }
}
