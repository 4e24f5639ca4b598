use std::fmt::{self, Display, Formatter};

use glam::{Mat4, Vec3};

/// How (and whether) shadow casting entities darken the rest of the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadowTechnique {
    #[default]
    None,
    /// Lit normally, then occluded fragments are multiplied by the shadow colour.
    StencilModulative,
    /// Each light is accumulated separately and simply skipped where occluded.
    StencilAdditive,
}

impl Display for ShadowTechnique {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ShadowTechnique::None => write!(f, "none"),
            ShadowTechnique::StencilModulative => write!(f, "stencil modulative"),
            ShadowTechnique::StencilAdditive => write!(f, "stencil additive"),
        }
    }
}

// Keeps a surface from shadowing itself through float noise
const SHADOW_BIAS: f32 = 1e-3;

struct Caster {
    center: Vec3,
    radius: f32,
    tris: Vec<[Vec3; 3]>,
}

/// World space triangles of every shadow casting entity for one frame.
#[derive(Default)]
pub struct ShadowCasters {
    casters: Vec<Caster>,
}

impl ShadowCasters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a caster from model space triangles and its world matrix.
    pub fn push<I>(&mut self, world: &Mat4, tris: I)
    where
        I: IntoIterator<Item = [Vec3; 3]>,
    {
        let tris: Vec<[Vec3; 3]> = tris
            .into_iter()
            .map(|t| t.map(|v| world.transform_point3(v)))
            .collect();
        if tris.is_empty() {
            return;
        }

        let count = (tris.len() * 3) as f32;
        let center = tris.iter().flatten().copied().sum::<Vec3>() / count;
        let radius = tris
            .iter()
            .flatten()
            .map(|v| v.distance(center))
            .fold(0.0, f32::max);

        self.casters.push(Caster {
            center,
            radius,
            tris,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.casters.is_empty()
    }

    /// True when something lies strictly between `from` and `to`.
    pub fn occluded(&self, from: Vec3, to: Vec3) -> bool {
        let delta = to - from;
        let max_t = delta.length();
        if max_t <= SHADOW_BIAS {
            return false;
        }
        let dir = delta / max_t;
        // nudge the origin off the surface we're shading
        let origin = from + dir * SHADOW_BIAS;

        self.casters.iter().any(|caster| {
            segment_hits_sphere(origin, dir, max_t, caster.center, caster.radius)
                && caster.tris.iter().any(|tri| {
                    ray_triangle(origin, dir, tri)
                        .is_some_and(|t| t > SHADOW_BIAS && t < max_t - SHADOW_BIAS)
                })
        })
    }
}

fn segment_hits_sphere(origin: Vec3, dir: Vec3, max_t: f32, center: Vec3, radius: f32) -> bool {
    let t = (center - origin).dot(dir).clamp(0.0, max_t);
    let closest = origin + dir * t;
    closest.distance_squared(center) <= radius * radius
}

/// Möller-Trumbore. Returns the distance along `dir` to the hit, if any.
/// Double sided on purpose: a shadow volume doesn't care about winding.
fn ray_triangle(origin: Vec3, dir: Vec3, tri: &[Vec3; 3]) -> Option<f32> {
    let e1 = tri[1] - tri[0];
    let e2 = tri[2] - tri[0];
    let p = dir.cross(e2);
    let det = e1.dot(p);
    if det.abs() < 1e-8 {
        return None;
    }
    let inv_det = 1.0 / det;
    let s = origin - tri[0];
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(e1);
    let v = dir.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    Some(e2.dot(q) * inv_det)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall() -> ShadowCasters {
        // 10x10 quad in the z = 0 plane
        let a = Vec3::new(-5.0, -5.0, 0.0);
        let b = Vec3::new(5.0, -5.0, 0.0);
        let c = Vec3::new(5.0, 5.0, 0.0);
        let d = Vec3::new(-5.0, 5.0, 0.0);
        let mut casters = ShadowCasters::new();
        casters.push(&Mat4::IDENTITY, [[a, b, c], [c, d, a]]);
        casters
    }

    #[test]
    fn wall_between_points_occludes() {
        let casters = wall();
        assert!(casters.occluded(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 5.0)));
    }

    #[test]
    fn segment_stopping_short_of_the_wall_is_clear() {
        let casters = wall();
        assert!(!casters.occluded(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, -1.0)));
        // beside the wall
        assert!(!casters.occluded(Vec3::new(20.0, 0.0, -5.0), Vec3::new(20.0, 0.0, 5.0)));
    }

    #[test]
    fn surface_does_not_shadow_itself() {
        let casters = wall();
        assert!(!casters.occluded(Vec3::new(1.0, 1.0, 0.0), Vec3::new(1.0, 1.0, -10.0)));
    }

    #[test]
    fn casters_follow_their_world_matrix() {
        let tri = [Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, -1.0, 0.0), Vec3::new(0.0, 1.0, 0.0)];
        let mut casters = ShadowCasters::new();
        casters.push(&Mat4::from_translation(Vec3::new(0.0, 0.0, 10.0)), [tri]);
        assert!(!casters.occluded(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 5.0)));
        assert!(casters.occluded(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 15.0)));
    }
}
