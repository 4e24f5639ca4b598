use std::fmt::Display;
use std::time::Duration;

use log::debug;

/// Rolling frame timing, refreshed once per second of accumulated frame time.
pub struct Metrics {
    pub frame_time: Duration,
    pub fps_counter: u32,
    pub fps_update_timer: Duration,
    pub current_fps: f32,
    pub frame_times: Vec<f32>,
    pub frames_total: u64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    const WINDOW: usize = 120;

    pub fn new() -> Self {
        Self {
            frame_time: Duration::from_secs_f32(1.0 / 60.0),
            fps_counter: 0,
            fps_update_timer: Duration::ZERO,
            current_fps: 0.0,
            frame_times: Vec::with_capacity(Self::WINDOW),
            frames_total: 0,
        }
    }

    /// Records one frame. Returns true when the once-a-second summary was refreshed.
    pub fn update(&mut self, frame_delta: Duration) -> bool {
        self.fps_counter += 1;
        self.frames_total += 1;
        self.frame_times.push(frame_delta.as_secs_f32() * 1000.0);
        if self.frame_times.len() > Self::WINDOW {
            self.frame_times.remove(0);
        }

        self.fps_update_timer += frame_delta;
        if self.fps_update_timer < Duration::from_secs(1) {
            return false;
        }

        self.current_fps = self.fps_counter as f32 / self.fps_update_timer.as_secs_f32();
        self.fps_counter = 0;
        self.fps_update_timer = Duration::ZERO;

        let avg = self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32;
        self.frame_time = Duration::from_secs_f32(avg / 1000.0);
        debug!("{}", self);
        true
    }
}

impl Display for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "FPS: {:.2} | Avg: {:.2}ms | Min: {:.2}ms | Max: {:.2}ms",
            self.current_fps,
            self.frame_time.as_secs_f32() * 1000.0,
            self.frame_times
                .iter()
                .copied()
                .reduce(f32::min)
                .unwrap_or(0.0),
            self.frame_times
                .iter()
                .copied()
                .reduce(f32::max)
                .unwrap_or(0.0)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_refreshes_after_a_second() {
        let mut m = Metrics::new();
        let dt = Duration::from_millis(250);
        assert!(!m.update(dt));
        assert!(!m.update(dt));
        assert!(!m.update(dt));
        assert!(m.update(dt));
        assert!((m.current_fps - 4.0).abs() < 1e-3);
        assert_eq!(m.fps_counter, 0);
        assert_eq!(m.frames_total, 4);
        assert!(m.to_string().starts_with("FPS: 4.00"));
    }

    #[test]
    fn keeps_a_bounded_window() {
        let mut m = Metrics::new();
        for _ in 0..500 {
            m.update(Duration::from_millis(1));
        }
        assert_eq!(m.frame_times.len(), 120);
    }
}
