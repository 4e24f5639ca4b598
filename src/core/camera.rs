use glam::{Mat4, Vec4};

/// Projection half of a camera. Position and orientation come from the scene node
/// the camera is attached to, so moving a camera means moving its node.
#[derive(Debug, Clone)]
pub struct Camera {
    pub name: String,
    /// Vertical field of view, in degrees
    pub fov_y: f32,
    /// The aspect ratio of the camera
    pub aspect_ratio: f32,
    /// The near plane of the camera, anything closer than this will not be rendered
    pub near: f32,
    /// The far plane of the camera, anything beyond this will not be rendered
    pub far: f32,
}

impl Camera {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fov_y: 45.0,
            aspect_ratio: 4.0 / 3.0,
            near: 100.0,
            far: 100_000.0,
        }
    }

    pub fn set_near_clip_distance(&mut self, near: f32) {
        self.near = near;
    }

    pub fn set_far_clip_distance(&mut self, far: f32) {
        self.far = far;
    }

    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect_ratio = aspect;
        }
    }

    pub fn set_fov_y(&mut self, degrees: f32) {
        self.fov_y = degrees;
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y.to_radians(), self.aspect_ratio, self.near, self.far)
    }

    /// The six frustum planes expressed in clip space. A clip space vertex `v` is
    /// inside a plane `p` when `p.dot(v) >= 0`.
    pub fn clip_planes() -> [Vec4; 6] {
        [
            Vec4::new(1.0, 0.0, 0.0, 1.0),  // left:   w + x >= 0
            Vec4::new(-1.0, 0.0, 0.0, 1.0), // right:  w - x >= 0
            Vec4::new(0.0, 1.0, 0.0, 1.0),  // bottom: w + y >= 0
            Vec4::new(0.0, -1.0, 0.0, 1.0), // top:    w - y >= 0
            Vec4::new(0.0, 0.0, 1.0, 1.0),  // near:   w + z >= 0
            Vec4::new(0.0, 0.0, -1.0, 1.0), // far:    w - z >= 0
        ]
    }
}
