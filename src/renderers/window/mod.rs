use std::time::Duration;

use log::debug;
use minifb::{Key, KeyRepeat, MouseMode, Scale, Window, WindowOptions};

use crate::app::{InputEvent, KeyboardEvent, Keycode, MouseMotionEvent};
use crate::error::Result;
use crate::pipeline::FrameBuffer;

use super::{Backend, FrameClock};

/// A native window through minifb.
pub struct WindowBackend {
    window: Window,
    title: String,
    size: (usize, usize),
    last_mouse: Option<(i32, i32)>,
    clock: FrameClock,
}

impl WindowBackend {
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
        let opts = WindowOptions {
            resize: true,
            scale: Scale::X1,
            title: true,
            borderless: false,
            ..WindowOptions::default()
        };
        let mut window = Window::new(title, width, height, opts)?;
        window.set_target_fps(60);

        Ok(Self {
            window,
            title: title.to_string(),
            size: (width, height),
            last_mouse: None,
            clock: FrameClock::default(),
        })
    }
}

impl Backend for WindowBackend {
    type Buffer = FrameBuffer;

    fn name(&self) -> &'static str {
        "window"
    }

    fn size(&self) -> (usize, usize) {
        self.size
    }

    fn poll_events(&mut self) -> Result<Vec<InputEvent>> {
        self.clock.start();
        let mut events = Vec::new();
        if !self.window.is_open() {
            events.push(InputEvent::Quit);
            return Ok(events);
        }

        // minifb refreshes its input state in update_with_buffer, so this sees
        // everything since the last present
        for key in self.window.get_keys_pressed(KeyRepeat::No) {
            events.push(InputEvent::KeyDown(KeyboardEvent {
                keycode: map_key(key),
            }));
        }
        for key in self.window.get_keys_released() {
            events.push(InputEvent::KeyUp(KeyboardEvent {
                keycode: map_key(key),
            }));
        }

        if let Some((x, y)) = self.window.get_mouse_pos(MouseMode::Discard) {
            let pos = (x as i32, y as i32);
            if self.last_mouse != Some(pos) {
                self.last_mouse = Some(pos);
                events.push(InputEvent::MouseMoved(MouseMotionEvent { x: pos.0, y: pos.1 }));
            }
        }

        let size = self.window.get_size();
        if size != self.size && size.0 > 0 && size.1 > 0 {
            self.size = size;
            events.push(InputEvent::Resized {
                width: size.0,
                height: size.1,
            });
        }

        Ok(events)
    }

    fn present(&mut self, frame: &FrameBuffer) -> Result<()> {
        self.window
            .update_with_buffer(&frame.data, frame.width, frame.height)?;
        Ok(())
    }

    fn frame_delta(&mut self) -> Duration {
        self.clock.tick()
    }

    fn show_status(&mut self, status: &str) {
        self.window.set_title(status);
    }

    fn close(&mut self) -> Result<()> {
        debug!("closing window '{}'", self.title);
        Ok(())
    }
}

fn map_key(key: Key) -> Keycode {
    let c = match key {
        Key::Escape => return Keycode::Escape,
        Key::A => 'a',
        Key::B => 'b',
        Key::C => 'c',
        Key::D => 'd',
        Key::E => 'e',
        Key::F => 'f',
        Key::G => 'g',
        Key::H => 'h',
        Key::I => 'i',
        Key::J => 'j',
        Key::K => 'k',
        Key::L => 'l',
        Key::M => 'm',
        Key::N => 'n',
        Key::O => 'o',
        Key::P => 'p',
        Key::Q => 'q',
        Key::R => 'r',
        Key::S => 's',
        Key::T => 't',
        Key::U => 'u',
        Key::V => 'v',
        Key::W => 'w',
        Key::X => 'x',
        Key::Y => 'y',
        Key::Z => 'z',
        Key::Key0 => '0',
        Key::Key1 => '1',
        Key::Key2 => '2',
        Key::Key3 => '3',
        Key::Key4 => '4',
        Key::Key5 => '5',
        Key::Key6 => '6',
        Key::Key7 => '7',
        Key::Key8 => '8',
        Key::Key9 => '9',
        Key::Space => ' ',
        other => return Keycode::Other(other as u32),
    };
    Keycode::Char(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_lowercase_chars() {
        assert_eq!(map_key(Key::W), Keycode::Char('w'));
        assert_eq!(map_key(Key::Key7), Keycode::Char('7'));
        assert_eq!(map_key(Key::Escape), Keycode::Escape);
        assert!(matches!(map_key(Key::F1), Keycode::Other(_)));
    }
}
