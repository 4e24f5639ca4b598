use std::collections::VecDeque;
use std::time::Duration;

use log::debug;

use crate::app::InputEvent;
use crate::error::Result;
use crate::pipeline::{Buffer, FrameBuffer};

use super::Backend;

/// Renders into memory on a fixed timestep, replaying a script of input events.
/// Used by tests and `--mode headless`.
pub struct HeadlessBackend {
    width: usize,
    height: usize,
    frame_limit: u64,
    frames_presented: u64,
    /// (frame index, event), kept sorted by frame
    script: VecDeque<(u64, InputEvent)>,
    last_frame: Option<FrameBuffer>,
    quit_sent: bool,
}

impl HeadlessBackend {
    pub const DEFAULT_FRAME_LIMIT: u64 = 600;
    /// Every frame is reported as taking exactly this long.
    pub const STEP: Duration = Duration::from_nanos(1_000_000_000 / 60);

    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            frame_limit: Self::DEFAULT_FRAME_LIMIT,
            frames_presented: 0,
            script: VecDeque::new(),
            last_frame: None,
            quit_sent: false,
        }
    }

    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = frames;
        self
    }

    /// Queues `event` to be delivered before frame `frame` (0 based) is rendered.
    /// Events for the same frame keep the order they were added in.
    pub fn with_event(mut self, frame: u64, event: InputEvent) -> Self {
        let at = self
            .script
            .iter()
            .position(|(f, _)| *f > frame)
            .unwrap_or(self.script.len());
        self.script.insert(at, (frame, event));
        self
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// The most recently presented frame.
    pub fn last_frame(&self) -> Option<&FrameBuffer> {
        self.last_frame.as_ref()
    }
}

impl Backend for HeadlessBackend {
    type Buffer = FrameBuffer;

    fn name(&self) -> &'static str {
        "headless"
    }

    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn poll_events(&mut self) -> Result<Vec<InputEvent>> {
        let mut events = Vec::new();
        while self
            .script
            .front()
            .is_some_and(|(frame, _)| *frame <= self.frames_presented)
        {
            if let Some((_, event)) = self.script.pop_front() {
                events.push(event);
            }
        }

        if self.frames_presented >= self.frame_limit && !self.quit_sent {
            debug!("frame limit of {} reached", self.frame_limit);
            self.quit_sent = true;
            events.push(InputEvent::Quit);
        }
        Ok(events)
    }

    fn present(&mut self, frame: &FrameBuffer) -> Result<()> {
        self.frames_presented += 1;
        let copy = self
            .last_frame
            .get_or_insert_with(|| FrameBuffer::new(frame.width, frame.height));
        if copy.width != frame.width || copy.height != frame.height {
            *copy = FrameBuffer::new(frame.width, frame.height);
        }
        copy.data.copy_from_slice(&frame.data);
        copy.depth.copy_from_slice(&frame.depth);
        Ok(())
    }

    fn frame_delta(&mut self) -> Duration {
        Self::STEP
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_is_delivered_by_frame() {
        let mut backend = HeadlessBackend::new(4, 4)
            .with_event(1, InputEvent::key_up('a'))
            .with_event(0, InputEvent::key_down('a'))
            .with_frame_limit(2);
        let frame = FrameBuffer::new(4, 4);

        assert_eq!(backend.poll_events().unwrap(), vec![InputEvent::key_down('a')]);
        backend.present(&frame).unwrap();
        assert_eq!(backend.poll_events().unwrap(), vec![InputEvent::key_up('a')]);
        backend.present(&frame).unwrap();
        assert_eq!(backend.poll_events().unwrap(), vec![InputEvent::Quit]);
        // only once
        assert!(backend.poll_events().unwrap().is_empty());
        assert_eq!(backend.frames_presented(), 2);
        assert!(backend.last_frame().is_some());
    }

    #[test]
    fn fixed_step_of_a_sixtieth() {
        let mut backend = HeadlessBackend::new(1, 1);
        assert_eq!(backend.frame_delta(), backend.frame_delta());
        assert!((HeadlessBackend::STEP.as_secs_f32() - 1.0 / 60.0).abs() < 1e-6);
    }
}
