use std::fmt;

/// A key as the game sees it, independent of which backend produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keycode {
    Escape,
    /// Printable keys, always lowercase for letters.
    Char(char),
    /// Anything else, carrying the backend's own code.
    Other(u32),
}

impl Keycode {
    pub const ESCAPE_SYM: u32 = 27;

    /// Numeric key symbol, the value that ends up in the "unhandled key" log line.
    pub fn sym(&self) -> u32 {
        match self {
            Keycode::Escape => Self::ESCAPE_SYM,
            Keycode::Char(c) => *c as u32,
            Keycode::Other(code) => *code,
        }
    }

    /// Letters are folded to lowercase so 'W' and 'w' are the same key.
    pub fn from_char(c: char) -> Self {
        Keycode::Char(c.to_ascii_lowercase())
    }
}

impl fmt::Display for Keycode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Keycode::Escape => write!(f, "Escape"),
            Keycode::Char(c) => write!(f, "'{c}'"),
            Keycode::Other(code) => write!(f, "#{code}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyboardEvent {
    pub keycode: Keycode,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseMotionEvent {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameEvent {
    /// Seconds since the previous frame
    pub time_since_last_frame: f32,
}

/// What a backend hands the application loop each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(KeyboardEvent),
    KeyUp(KeyboardEvent),
    MouseMoved(MouseMotionEvent),
    Resized { width: usize, height: usize },
    /// The user closed the window or otherwise asked to leave.
    Quit,
}

impl InputEvent {
    pub fn key_down(c: char) -> Self {
        InputEvent::KeyDown(KeyboardEvent {
            keycode: Keycode::from_char(c),
        })
    }

    pub fn key_up(c: char) -> Self {
        InputEvent::KeyUp(KeyboardEvent {
            keycode: Keycode::from_char(c),
        })
    }
}
