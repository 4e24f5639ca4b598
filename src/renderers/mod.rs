//! Presentation backends: where finished frames go and where input comes from.

use std::time::{Duration, Instant};

use crate::app::InputEvent;
use crate::error::Result;
use crate::pipeline::Buffer;

pub mod headless;
pub mod terminal;
pub mod window;

pub use headless::HeadlessBackend;
pub use terminal::TerminalBackend;
pub use window::WindowBackend;

pub trait Backend {
    /// The kind of buffer the pipeline should render into for this backend.
    type Buffer: Buffer;

    fn name(&self) -> &'static str;

    /// Render target size in pixels (or cells).
    fn size(&self) -> (usize, usize);

    /// Width over height of a single pixel.
    fn pixel_aspect(&self) -> f32 {
        1.0
    }

    /// Input that arrived since the last call, oldest first.
    fn poll_events(&mut self) -> Result<Vec<InputEvent>>;

    fn present(&mut self, frame: &Self::Buffer) -> Result<()>;

    /// Time since the previous call.
    fn frame_delta(&mut self) -> Duration;

    /// One line of status, e.g. frame metrics. Ignored where there's nowhere to
    /// put it.
    fn show_status(&mut self, _status: &str) {}

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Wall clock frame timing for the live backends. It starts on the first poll,
/// so time spent building the scene isn't charged to the first frame.
#[derive(Debug, Default)]
pub struct FrameClock {
    last: Option<Instant>,
}

impl FrameClock {
    /// Starts timing unless already running.
    pub fn start(&mut self) {
        self.last.get_or_insert_with(Instant::now);
    }

    /// Time since the previous tick, or since `start`. Zero before either.
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let delta = self.last.map_or(Duration::ZERO, |last| now - last);
        self.last = Some(now);
        delta
    }
}
