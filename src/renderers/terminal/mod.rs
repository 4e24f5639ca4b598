use std::collections::HashMap;
use std::io::{self, stdout, Write};
use std::panic;
use std::time::{Duration, Instant};

use crossterm::{
    cursor::{Hide, Show},
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, MouseEventKind, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    style::SetBackgroundColor,
    terminal::{
        self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use log::{debug, error, info};

use crate::app::{InputEvent, KeyboardEvent, Keycode, MouseMotionEvent};
use crate::core::Color;
use crate::error::Result;
use crate::pipeline::TermBuffer;

use super::{Backend, FrameClock};

/// Most terminals can't report key releases. Without them a key counts as
/// released once its auto repeat stops for this long.
const HOLD_TIMEOUT: Duration = Duration::from_millis(600);

/// Draws frames as coloured block characters on the alternate screen.
pub struct TerminalBackend {
    size: (usize, usize),
    /// The terminal reports press/repeat/release separately
    enhanced: bool,
    held: HashMap<Keycode, Instant>,
    clock: FrameClock,
    restored: bool,
}

impl TerminalBackend {
    pub fn new() -> Result<Self> {
        // Put the terminal back before the panic message is printed
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = Self::cleanup_terminal(true);
            error!("Panic occurred: {}", panic_info);
            original_hook(panic_info);
        }));

        let mut stdout = stdout();
        enable_raw_mode()?;
        execute!(
            stdout,
            EnterAlternateScreen,
            Hide,
            EnableMouseCapture,
            SetBackgroundColor(Color::BLACK.to_crossterm_color()),
            Clear(ClearType::All),
        )?;

        let enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if enhanced {
            execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }
        info!(
            "terminal key release events {}",
            if enhanced { "available" } else { "emulated" }
        );

        let (width, height) = terminal::size()?;
        Ok(Self {
            size: (width as usize, height as usize),
            enhanced,
            held: HashMap::new(),
            clock: FrameClock::default(),
            restored: false,
        })
    }

    fn cleanup_terminal(enhanced: bool) -> io::Result<()> {
        let mut stdout = stdout();
        if enhanced {
            execute!(stdout, PopKeyboardEnhancementFlags)?;
        }
        disable_raw_mode()?;
        execute!(stdout, Show, LeaveAlternateScreen, DisableMouseCapture)?;
        Ok(())
    }

    fn on_key(&mut self, key: KeyEvent, now: Instant, events: &mut Vec<InputEvent>) {
        // raw mode swallows the signal, so treat ctrl-c as closing the app
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            events.push(InputEvent::Quit);
            return;
        }
        let keycode = map_key(key.code);
        match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                if self.held.insert(keycode, now).is_none() {
                    events.push(InputEvent::KeyDown(KeyboardEvent { keycode }));
                }
            }
            KeyEventKind::Release => {
                if self.held.remove(&keycode).is_some() {
                    events.push(InputEvent::KeyUp(KeyboardEvent { keycode }));
                }
            }
        }
    }

    /// Synthesises releases for keys whose auto repeat has gone quiet.
    fn expire_held(&mut self, now: Instant, events: &mut Vec<InputEvent>) {
        if self.enhanced {
            return;
        }
        let mut expired: Vec<Keycode> = self
            .held
            .iter()
            .filter(|(_, last)| now.duration_since(**last) >= HOLD_TIMEOUT)
            .map(|(k, _)| *k)
            .collect();
        expired.sort_by_key(|k| k.sym());
        for keycode in expired {
            self.held.remove(&keycode);
            events.push(InputEvent::KeyUp(KeyboardEvent { keycode }));
        }
    }
}

impl Backend for TerminalBackend {
    type Buffer = TermBuffer;

    fn name(&self) -> &'static str {
        "terminal"
    }

    fn size(&self) -> (usize, usize) {
        self.size
    }

    fn pixel_aspect(&self) -> f32 {
        0.5
    }

    fn poll_events(&mut self) -> Result<Vec<InputEvent>> {
        self.clock.start();
        let mut events = Vec::new();
        let now = Instant::now();

        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) => self.on_key(key, now, &mut events),
                Event::Mouse(mouse) => {
                    if matches!(mouse.kind, MouseEventKind::Moved | MouseEventKind::Drag(_)) {
                        events.push(InputEvent::MouseMoved(MouseMotionEvent {
                            x: mouse.column as i32,
                            y: mouse.row as i32,
                        }));
                    }
                }
                Event::Resize(width, height) => {
                    self.size = (width as usize, height as usize);
                    events.push(InputEvent::Resized {
                        width: width as usize,
                        height: height as usize,
                    });
                }
                _ => {}
            }
        }

        self.expire_held(now, &mut events);
        Ok(events)
    }

    fn present(&mut self, frame: &TermBuffer) -> Result<()> {
        let mut stdout = stdout().lock();
        stdout.write_all(frame.to_ansi().as_bytes())?;
        stdout.flush()?;
        Ok(())
    }

    fn frame_delta(&mut self) -> Duration {
        self.clock.tick()
    }

    fn close(&mut self) -> Result<()> {
        if !self.restored {
            self.restored = true;
            Self::cleanup_terminal(self.enhanced)?;
            debug!("terminal restored");
        }
        Ok(())
    }
}

impl Drop for TerminalBackend {
    fn drop(&mut self) {
        if !self.restored {
            let _ = Self::cleanup_terminal(self.enhanced);
        }
    }
}

fn map_key(code: KeyCode) -> Keycode {
    match code {
        KeyCode::Esc => Keycode::Escape,
        KeyCode::Char(c) => Keycode::from_char(c),
        KeyCode::F(n) => Keycode::Other(0x100 + n as u32),
        KeyCode::Up => Keycode::Other(0x200),
        KeyCode::Down => Keycode::Other(0x201),
        KeyCode::Left => Keycode::Other(0x202),
        KeyCode::Right => Keycode::Other(0x203),
        KeyCode::Enter => Keycode::Other(13),
        KeyCode::Tab => Keycode::Other(9),
        KeyCode::Backspace => Keycode::Other(8),
        _ => Keycode::Other(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_keys_fold_case() {
        assert_eq!(map_key(KeyCode::Char('A')), Keycode::Char('a'));
        assert_eq!(map_key(KeyCode::Esc), Keycode::Escape);
        assert_eq!(map_key(KeyCode::F(2)), Keycode::Other(0x102));
    }

    /// A backend that never touches the real terminal.
    fn detached(enhanced: bool) -> TerminalBackend {
        TerminalBackend {
            size: (80, 24),
            enhanced,
            held: HashMap::new(),
            clock: FrameClock::default(),
            restored: true,
        }
    }

    #[test]
    fn auto_repeat_is_one_press_and_times_out() {
        let mut backend = detached(false);
        let start = Instant::now();
        let mut events = Vec::new();
        let w = KeyEvent::new(KeyCode::Char('w'), KeyModifiers::NONE);

        backend.on_key(w, start, &mut events);
        backend.on_key(w, start + Duration::from_millis(30), &mut events);
        assert_eq!(events, vec![InputEvent::key_down('w')]);

        events.clear();
        backend.expire_held(start + Duration::from_millis(100), &mut events);
        assert!(events.is_empty());
        backend.expire_held(start + Duration::from_millis(30) + HOLD_TIMEOUT, &mut events);
        assert_eq!(events, vec![InputEvent::key_up('w')]);
    }

    #[test]
    fn real_release_events_are_used_when_available() {
        let mut backend = detached(true);
        let now = Instant::now();
        let mut events = Vec::new();
        backend.on_key(
            KeyEvent::new_with_kind(KeyCode::Char('a'), KeyModifiers::NONE, KeyEventKind::Press),
            now,
            &mut events,
        );
        // no timeout expiry in this mode
        backend.expire_held(now + HOLD_TIMEOUT * 10, &mut events);
        backend.on_key(
            KeyEvent::new_with_kind(KeyCode::Char('a'), KeyModifiers::NONE, KeyEventKind::Release),
            now,
            &mut events,
        );
        assert_eq!(
            events,
            vec![InputEvent::key_down('a'), InputEvent::key_up('a')]
        );
    }

    #[test]
    fn ctrl_c_quits() {
        let mut backend = detached(false);
        let mut events = Vec::new();
        backend.on_key(
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Instant::now(),
            &mut events,
        );
        assert_eq!(events, vec![InputEvent::Quit]);
    }
}
