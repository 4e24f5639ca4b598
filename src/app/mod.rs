//! The application layer: a render loop that owns the scene and feeds input and
//! frame events to an [`Application`].

use std::path::PathBuf;

use log::{debug, info};

use crate::core::{CameraId, SceneManager};
use crate::error::{EngineError, Result};
use crate::pipeline::{Pipeline, Viewport};
use crate::renderers::Backend;
use crate::util::format_mat4;

pub mod events;
pub mod metrics;

pub use events::{FrameEvent, InputEvent, KeyboardEvent, Keycode, MouseMotionEvent};
pub use metrics::Metrics;

/// Callbacks the render loop drives. Everything runs on the loop thread, one call
/// at a time, so implementors own their state outright.
pub trait Application: Sized {
    /// Builds the scene. Runs once, before the loop can deliver any event.
    fn setup(root: &mut Root) -> Result<Self>;

    fn key_pressed(&mut self, root: &mut Root, evt: &KeyboardEvent);

    fn key_released(&mut self, root: &mut Root, evt: &KeyboardEvent);

    fn mouse_moved(&mut self, _root: &mut Root, _evt: &MouseMotionEvent) {}

    /// Called after every rendered frame.
    fn frame_rendered(&mut self, root: &mut Root, evt: &FrameEvent);
}

/// Scene, viewport and loop control, everything an [`Application`] gets to touch.
pub struct Root {
    scene: SceneManager,
    viewport: Option<Viewport>,
    width: usize,
    height: usize,
    pixel_aspect: f32,
    end_requested: bool,
}

impl Root {
    fn new(scene: SceneManager, width: usize, height: usize, pixel_aspect: f32) -> Self {
        Self {
            scene,
            viewport: None,
            width,
            height,
            pixel_aspect,
            end_requested: false,
        }
    }

    pub fn scene_manager(&self) -> &SceneManager {
        &self.scene
    }

    pub fn scene_manager_mut(&mut self) -> &mut SceneManager {
        &mut self.scene
    }

    /// Binds `camera` to the render target. There is a single viewport; adding
    /// another replaces it.
    pub fn add_viewport(&mut self, camera: CameraId) -> &mut Viewport {
        let viewport =
            Viewport::new(camera, self.width, self.height).with_pixel_aspect(self.pixel_aspect);
        self.viewport.insert(viewport)
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    /// Asks the loop to stop once the current callback returns.
    pub fn queue_end_rendering(&mut self) {
        self.end_requested = true;
    }

    pub fn end_requested(&self) -> bool {
        self.end_requested
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        if let Some(vp) = self.viewport.as_mut() {
            vp.set_actual_size(width, height);
            let aspect = vp.aspect_ratio();
            let camera = vp.camera();
            self.scene.camera_mut(camera).set_aspect_ratio(aspect);
        }
    }
}

/// Owns the presentation backend, the pipeline and the [`Root`], and runs the
/// loop.
pub struct ApplicationContext<B: Backend> {
    name: String,
    backend: B,
    root: Root,
    pipeline: Pipeline<B::Buffer>,
    metrics: Metrics,
}

impl<B: Backend> ApplicationContext<B> {
    pub fn init_app(name: &str, backend: B, resource_dirs: Vec<PathBuf>) -> Result<Self> {
        let (width, height) = backend.size();
        info!("starting {} ({}x{}, {})", name, width, height, backend.name());
        debug!("resource locations: {:?}", resource_dirs);

        let root = Root::new(
            SceneManager::new(resource_dirs),
            width,
            height,
            backend.pixel_aspect(),
        );
        Ok(Self {
            name: name.to_string(),
            backend,
            root,
            pipeline: Pipeline::new(width, height),
            metrics: Metrics::new(),
        })
    }

    pub fn root(&self) -> &Root {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Root {
        &mut self.root
    }

    pub fn pipeline(&self) -> &Pipeline<B::Buffer> {
        &self.pipeline
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Runs until the application calls [`Root::queue_end_rendering`] or the
    /// backend reports the user left.
    pub fn start_rendering<A: Application>(&mut self, app: &mut A) -> Result<()> {
        let viewport = self.root.viewport.as_ref().ok_or(EngineError::NoViewport)?;
        debug!(
            "viewport {}x{} for {:?}",
            viewport.actual_width(),
            viewport.actual_height(),
            viewport.camera()
        );
        if let Some(view) = self.root.scene.view_matrix(viewport.camera()) {
            debug!("{}", format_mat4("view", &view));
        }
        self.root.end_requested = false;

        while !self.root.end_requested {
            for event in self.backend.poll_events()? {
                self.dispatch(app, event);
            }
            if self.root.end_requested {
                break;
            }

            let viewport = self.root.viewport.as_ref().ok_or(EngineError::NoViewport)?;
            self.pipeline.render_frame(&self.root.scene, viewport)?;
            self.backend.present(self.pipeline.front_buffer())?;

            let delta = self.backend.frame_delta();
            if self.metrics.update(delta) {
                self.backend
                    .show_status(&format!("{} | {}", self.name, self.metrics));
            }

            app.frame_rendered(
                &mut self.root,
                &FrameEvent {
                    time_since_last_frame: delta.as_secs_f32(),
                },
            );
        }

        info!("render loop stopped after {} frames", self.metrics.frames_total);
        Ok(())
    }

    fn dispatch<A: Application>(&mut self, app: &mut A, event: InputEvent) {
        match event {
            InputEvent::KeyDown(evt) => app.key_pressed(&mut self.root, &evt),
            InputEvent::KeyUp(evt) => app.key_released(&mut self.root, &evt),
            InputEvent::MouseMoved(evt) => app.mouse_moved(&mut self.root, &evt),
            InputEvent::Resized { width, height } => {
                debug!("resized to {}x{}", width, height);
                self.pipeline.resize(width, height);
                self.root.resize(width, height);
            }
            InputEvent::Quit => {
                info!("{} backend closed", self.backend.name());
                self.root.queue_end_rendering();
            }
        }
    }

    /// Tears the backend down. The context can't be used afterwards.
    pub fn close_app(mut self) -> Result<()> {
        info!("closing {}", self.name);
        self.backend.close()
    }
}
