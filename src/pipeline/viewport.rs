use crate::core::{CameraId, Color};

/// A rectangle of the render target that a camera draws into. We only ever have
/// one, covering the whole target.
#[derive(Debug, Clone)]
pub struct Viewport {
    camera: CameraId,
    background: Color,
    actual_width: usize,
    actual_height: usize,
    /// Width over height of a single pixel. Terminal cells are about twice as
    /// tall as they are wide.
    pixel_aspect: f32,
}

impl Viewport {
    pub fn new(camera: CameraId, width: usize, height: usize) -> Self {
        Self {
            camera,
            background: Color::BLACK,
            actual_width: width,
            actual_height: height,
            pixel_aspect: 1.0,
        }
    }

    pub fn with_pixel_aspect(mut self, pixel_aspect: f32) -> Self {
        self.pixel_aspect = pixel_aspect;
        self
    }

    pub fn camera(&self) -> CameraId {
        self.camera
    }

    pub fn set_background_colour(&mut self, colour: Color) {
        self.background = colour;
    }

    pub fn background_colour(&self) -> Color {
        self.background
    }

    pub fn actual_width(&self) -> usize {
        self.actual_width
    }

    pub fn actual_height(&self) -> usize {
        self.actual_height
    }

    pub fn set_actual_size(&mut self, width: usize, height: usize) {
        self.actual_width = width;
        self.actual_height = height;
    }

    /// Aspect ratio of the visible image, what a camera looking through this
    /// viewport should use.
    pub fn aspect_ratio(&self) -> f32 {
        if self.actual_height == 0 {
            return 1.0;
        }
        self.actual_width as f32 * self.pixel_aspect / self.actual_height as f32
    }
}
