use glam::Vec3;

use crate::core::mesh::Material;
use crate::core::Color;

/// The kinds of light we support.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LightType {
    /// Emits in all directions from the position of the node it is attached to.
    Point,
    /// Constant direction, no attenuation. The direction is the node's local -Z.
    Directional,
}

/// A light source. Like cameras and entities it has no transform of its own, it
/// takes position and direction from the scene node it's attached to.
#[derive(Clone, Debug)]
pub struct Light {
    pub name: String,
    pub kind: LightType,
    pub diffuse: Color,
    pub specular: Color,
    /// Constant attenuation factor.
    pub constant: f32,
    /// Linear attenuation factor.
    pub linear: f32,
    /// Quadratic attenuation factor.
    pub quadratic: f32,
    /// Beyond this distance a point light contributes nothing.
    pub range: f32,
    pub cast_shadows: bool,
}

impl Light {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: LightType::Point,
            diffuse: Color::WHITE,
            specular: Color::BLACK,
            constant: 1.0,
            linear: 0.0,
            quadratic: 0.0,
            range: 100_000.0,
            cast_shadows: true,
        }
    }

    pub fn set_type(&mut self, kind: LightType) {
        self.kind = kind;
    }

    pub fn set_diffuse_colour(&mut self, r: f32, g: f32, b: f32) {
        self.diffuse = Color::new(r, g, b);
    }

    pub fn set_specular_colour(&mut self, r: f32, g: f32, b: f32) {
        self.specular = Color::new(r, g, b);
    }

    pub fn set_attenuation(&mut self, range: f32, constant: f32, linear: f32, quadratic: f32) {
        self.range = range;
        self.constant = constant;
        self.linear = linear;
        self.quadratic = quadratic;
    }
}

/// A light with its world space placement resolved for this frame.
#[derive(Clone, Debug)]
pub struct WorldLight {
    pub light: Light,
    pub position: Vec3,
    /// Direction the light travels along (directional lights only).
    pub direction: Vec3,
}

impl WorldLight {
    /// Unit vector from `frag_pos` towards the light and the distance to it.
    /// Directional lights are infinitely far away.
    pub fn incidence(&self, frag_pos: Vec3) -> (Vec3, f32) {
        match self.light.kind {
            LightType::Point => {
                let to_light = self.position - frag_pos;
                let dist = to_light.length();
                (to_light / dist.max(f32::EPSILON), dist)
            }
            LightType::Directional => (-self.direction.normalize_or_zero(), f32::INFINITY),
        }
    }

    pub fn attenuation(&self, distance: f32) -> f32 {
        match self.light.kind {
            LightType::Directional => 1.0,
            LightType::Point => {
                if distance > self.light.range {
                    return 0.0;
                }
                let l = &self.light;
                1.0 / (l.constant + l.linear * distance + l.quadratic * distance * distance)
                    .max(f32::EPSILON)
            }
        }
    }

    /// Blinn-Phong diffuse + specular contribution of this light. Ambient is the
    /// scene's business, not the light's.
    pub fn contribution(
        &self,
        frag_pos: Vec3,
        normal: Vec3,
        view_dir: Vec3,
        surface: Color,
        material: &Material,
    ) -> Color {
        let (light_dir, dist) = self.incidence(frag_pos);
        let atten = self.attenuation(dist);
        if atten <= 0.0 {
            return Color::BLACK;
        }

        let diff = normal.dot(light_dir).max(0.0);
        if diff <= 0.0 {
            return Color::BLACK;
        }
        let diffuse = self.light.diffuse * surface * diff;

        let halfway = (light_dir + view_dir).normalize_or_zero();
        let spec = normal.dot(halfway).max(0.0).powf(material.shininess);
        let specular = self.light.specular * material.specular * spec;

        (diffuse + specular) * atten
    }
}
