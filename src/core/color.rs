use std::ops::{Add, AddAssign, Mul};

/// Linear RGB colour, components nominally in 0.0 - 1.0.
///
/// Used both as a "ColourValue" for the scene (light colours, ambient, viewport
/// background) and as the per-fragment colour that ends up in a buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32, // Red component (0.0 - 1.0)
    pub g: f32, // Green component (0.0 - 1.0)
    pub b: f32, // Blue component (0.0 - 1.0)
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const fn gray(v: f32) -> Self {
        Self { r: v, g: v, b: v }
    }

    pub fn clamped(&self) -> Self {
        Self {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
        }
    }

    pub fn is_black(&self) -> bool {
        self.r <= 0.0 && self.g <= 0.0 && self.b <= 0.0
    }

    pub fn to_crossterm_color(&self) -> crossterm::style::Color {
        let c = self.clamped();
        crossterm::style::Color::Rgb {
            r: (c.r * 255.0) as u8,
            g: (c.g * 255.0) as u8,
            b: (c.b * 255.0) as u8,
        }
    }

    /// 0x00RRGGBB, the layout minifb wants.
    pub fn to_u32(&self) -> u32 {
        let c = self.clamped();
        let r = (c.r * 255.0) as u32;
        let g = (c.g * 255.0) as u32;
        let b = (c.b * 255.0) as u32;
        (r << 16) | (g << 8) | b
    }

    pub fn lerp(&self, end: &Color, t: f32) -> Color {
        Color {
            r: self.r + (end.r - self.r) * t,
            g: self.g + (end.g - self.g) * t,
            b: self.b + (end.b - self.b) * t,
        }
    }
}

// Predefined colors
impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);
    pub const GRAY: Color = Color::new(0.5, 0.5, 0.5);
    pub const DARK_GRAY: Color = Color::new(0.21, 0.22, 0.22);
    pub const LIGHT_GRAY: Color = Color::new(0.83, 0.83, 0.83);
    pub const RED: Color = Color::new(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::new(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::new(0.0, 0.0, 1.0);
    pub const STEEL: Color = Color::new(0.55, 0.6, 0.68);
    pub const ORANGE: Color = Color::new(1.0, 0.65, 0.0);
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

impl Add for Color {
    type Output = Color;

    fn add(self, rhs: Color) -> Color {
        Color::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl AddAssign for Color {
    fn add_assign(&mut self, rhs: Color) {
        self.r += rhs.r;
        self.g += rhs.g;
        self.b += rhs.b;
    }
}

/// Component-wise modulation (light colour * surface colour).
impl Mul for Color {
    type Output = Color;

    fn mul(self, rhs: Color) -> Color {
        Color::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b)
    }
}

impl Mul<f32> for Color {
    type Output = Color;

    fn mul(self, rhs: f32) -> Color {
        Color::new(self.r * rhs, self.g * rhs, self.b * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_into_minifb_layout() {
        assert_eq!(Color::RED.to_u32(), 0x00FF0000);
        assert_eq!(Color::GREEN.to_u32(), 0x0000FF00);
        assert_eq!(Color::BLUE.to_u32(), 0x000000FF);
        // out of range values saturate instead of bleeding into the next channel
        assert_eq!(Color::new(2.0, -1.0, 0.0).to_u32(), 0x00FF0000);
    }

    #[test]
    fn modulate_and_lerp() {
        let c = Color::new(0.5, 1.0, 0.25) * Color::gray(0.5);
        assert_eq!(c, Color::new(0.25, 0.5, 0.125));

        let mid = Color::BLACK.lerp(&Color::WHITE, 0.5);
        assert_eq!(mid, Color::gray(0.5));
        assert!(Color::BLACK.is_black());
    }
}
