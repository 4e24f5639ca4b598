use glam::{Vec3, Vec4};

use crate::core::{Camera, Color};

#[derive(Clone, Copy, Debug)]
pub struct ClipVertex {
    /// Clip space position (after the MVP transform, before the divide)
    pub position: Vec4,
    /// World space position, needed for lighting and shadows
    pub world: Vec3,
    pub normal: Vec3,
    pub color: Color,
}

impl ClipVertex {
    pub fn lerp(&self, other: &ClipVertex, t: f32) -> Self {
        Self {
            position: self.position.lerp(other.position, t),
            world: self.world.lerp(other.world, t),
            normal: self.normal.lerp(other.normal, t),
            color: self.color.lerp(&other.color, t),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ClipTriangle {
    pub vertices: [ClipVertex; 3],
}

pub struct Clipper {
    frustum_planes: [Vec4; 6],
}

impl Default for Clipper {
    fn default() -> Self {
        Self::new()
    }
}

impl Clipper {
    pub fn new() -> Self {
        Self {
            frustum_planes: Camera::clip_planes(),
        }
    }

    /// Culls back faces and clips against the view frustum. Returns zero or more
    /// triangles that are fully inside.
    pub fn clip_triangle(&self, triangle: &ClipTriangle) -> Vec<ClipTriangle> {
        if self.is_degenerate(triangle) {
            return Vec::new();
        }

        let mut triangles = vec![triangle.clone()];
        for plane in &self.frustum_planes {
            triangles = self.clip_against_plane(triangles, *plane);
            if triangles.is_empty() {
                break;
            }
        }

        // culling after the near plane clip, so nothing left has w <= 0
        triangles.retain(|t| self.is_front_facing(t));
        triangles
    }

    fn is_degenerate(&self, triangle: &ClipTriangle) -> bool {
        let epsilon = 1e-12;
        (0..3).any(|i| {
            let j = (i + 1) % 3;
            let diff = triangle.vertices[i].position - triangle.vertices[j].position;
            diff.length_squared() < epsilon
        })
    }

    /// Counter clockwise in NDC (y up) is front facing.
    fn is_front_facing(&self, tri: &ClipTriangle) -> bool {
        let ndc = tri.vertices.map(|v| v.position.truncate() / v.position.w);
        let edge1 = ndc[1] - ndc[0];
        let edge2 = ndc[2] - ndc[0];
        edge1.cross(edge2).z > 0.0
    }

    fn clip_against_plane(&self, triangles: Vec<ClipTriangle>, plane: Vec4) -> Vec<ClipTriangle> {
        let mut result = Vec::with_capacity(triangles.len());

        for triangle in triangles {
            let distances = triangle.vertices.map(|v| plane.dot(v.position));
            let inside_count = distances.iter().filter(|d| **d >= 0.0).count();

            match inside_count {
                0 => continue,              // Triangle is completely outside
                3 => result.push(triangle), // Triangle is completely inside
                _ => result.extend(self.split(&triangle, distances)),
            }
        }

        result
    }

    /// Sutherland-Hodgman against a single plane, then fan the polygon back into
    /// triangles.
    fn split(&self, triangle: &ClipTriangle, distances: [f32; 3]) -> Vec<ClipTriangle> {
        let mut poly: Vec<ClipVertex> = Vec::with_capacity(4);
        for i in 0..3 {
            let j = (i + 1) % 3;
            let (v0, v1) = (&triangle.vertices[i], &triangle.vertices[j]);
            let (d0, d1) = (distances[i], distances[j]);

            if d0 >= 0.0 {
                poly.push(*v0);
            }
            if (d0 < 0.0) != (d1 < 0.0) {
                let t = d0 / (d0 - d1);
                poly.push(v0.lerp(v1, t));
            }
        }

        (1..poly.len().saturating_sub(1))
            .map(|i| ClipTriangle {
                vertices: [poly[0], poly[i], poly[i + 1]],
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vert(x: f32, y: f32, z: f32, w: f32) -> ClipVertex {
        ClipVertex {
            position: Vec4::new(x, y, z, w),
            world: Vec3::new(x, y, z),
            normal: Vec3::Z,
            color: Color::WHITE,
        }
    }

    fn tri(a: ClipVertex, b: ClipVertex, c: ClipVertex) -> ClipTriangle {
        ClipTriangle {
            vertices: [a, b, c],
        }
    }

    #[test]
    fn inside_triangle_passes_untouched() {
        let t = tri(
            vert(-0.5, -0.5, 0.0, 1.0),
            vert(0.5, -0.5, 0.0, 1.0),
            vert(0.0, 0.5, 0.0, 1.0),
        );
        let out = Clipper::new().clip_triangle(&t);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn back_face_is_culled() {
        let t = tri(
            vert(-0.5, -0.5, 0.0, 1.0),
            vert(0.0, 0.5, 0.0, 1.0),
            vert(0.5, -0.5, 0.0, 1.0),
        );
        assert!(Clipper::new().clip_triangle(&t).is_empty());
    }

    #[test]
    fn straddling_the_right_plane_splits_into_inside_pieces() {
        let t = tri(
            vert(0.0, -0.5, 0.0, 1.0),
            vert(2.0, -0.5, 0.0, 1.0),
            vert(0.0, 0.5, 0.0, 1.0),
        );
        let out = Clipper::new().clip_triangle(&t);
        assert!(!out.is_empty());
        for piece in &out {
            for v in &piece.vertices {
                assert!(v.position.x <= v.position.w + 1e-5);
            }
        }
    }

    #[test]
    fn fully_outside_is_dropped() {
        let t = tri(
            vert(3.0, -0.5, 0.0, 1.0),
            vert(4.0, -0.5, 0.0, 1.0),
            vert(3.0, 0.5, 0.0, 1.0),
        );
        assert!(Clipper::new().clip_triangle(&t).is_empty());
    }
}
