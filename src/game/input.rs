use log::info;

use crate::app::Keycode;

/// The keys the game tracks. Anything else is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShipKey {
    RotateLeft,
    RotateRight,
    RotateUp,
    RotateDown,
    PrimaryThrust,
    SecondaryThrust,
}

impl ShipKey {
    pub const ALL: [ShipKey; 6] = [
        ShipKey::RotateLeft,
        ShipKey::RotateRight,
        ShipKey::RotateUp,
        ShipKey::RotateDown,
        ShipKey::PrimaryThrust,
        ShipKey::SecondaryThrust,
    ];

    pub fn from_keycode(key: Keycode) -> Option<Self> {
        match key {
            Keycode::Char('a') => Some(ShipKey::RotateLeft),
            Keycode::Char('d') => Some(ShipKey::RotateRight),
            Keycode::Char('w') => Some(ShipKey::RotateUp),
            Keycode::Char('s') => Some(ShipKey::RotateDown),
            Keycode::Char('q') => Some(ShipKey::PrimaryThrust),
            Keycode::Char('e') => Some(ShipKey::SecondaryThrust),
            _ => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// What the caller should do after a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Tracked(ShipKey),
    /// Escape: stop the render loop.
    Quit,
    Ignored,
}

/// Held state for each [`ShipKey`], all released to begin with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputFlags {
    held: [bool; ShipKey::ALL.len()],
}

impl InputFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_key_down(&mut self, key: Keycode) -> KeyOutcome {
        self.set(key, true)
    }

    pub fn on_key_up(&mut self, key: Keycode) -> KeyOutcome {
        self.set(key, false)
    }

    pub fn is_held(&self, key: ShipKey) -> bool {
        self.held[key.index()]
    }

    fn set(&mut self, key: Keycode, held: bool) -> KeyOutcome {
        if key == Keycode::Escape {
            return KeyOutcome::Quit;
        }
        match ShipKey::from_keycode(key) {
            Some(ship_key) => {
                self.held[ship_key.index()] = held;
                KeyOutcome::Tracked(ship_key)
            }
            None => {
                info!("unhandled key {}", key.sym());
                KeyOutcome::Ignored
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(c: char) -> Keycode {
        Keycode::from_char(c)
    }

    #[test]
    fn all_released_at_start() {
        let flags = InputFlags::new();
        assert!(ShipKey::ALL.iter().all(|k| !flags.is_held(*k)));
    }

    #[test]
    fn down_then_up_round_trips() {
        for c in ['a', 'd', 'w', 's', 'q', 'e'] {
            let mut flags = InputFlags::new();
            let ship_key = ShipKey::from_keycode(key(c)).unwrap();
            assert_eq!(flags.on_key_down(key(c)), KeyOutcome::Tracked(ship_key));
            assert!(flags.is_held(ship_key));
            flags.on_key_up(key(c));
            assert!(!flags.is_held(ship_key));
            assert_eq!(flags, InputFlags::new());
        }
    }

    #[test]
    fn repeated_down_is_idempotent() {
        let mut once = InputFlags::new();
        once.on_key_down(key('a'));
        let mut twice = InputFlags::new();
        twice.on_key_down(key('a'));
        twice.on_key_down(key('a'));
        assert_eq!(once, twice);
    }

    #[test]
    fn unrecognized_keys_change_nothing() {
        let mut flags = InputFlags::new();
        flags.on_key_down(key('w'));
        let before = flags.clone();
        for k in [key('x'), key('1'), Keycode::Other(1073741906), Keycode::Other(0)] {
            assert_eq!(flags.on_key_down(k), KeyOutcome::Ignored);
            assert_eq!(flags.on_key_up(k), KeyOutcome::Ignored);
        }
        assert_eq!(flags, before);
    }

    #[test]
    fn escape_quits_on_either_edge() {
        let mut flags = InputFlags::new();
        assert_eq!(flags.on_key_down(Keycode::Escape), KeyOutcome::Quit);
        assert_eq!(flags.on_key_up(Keycode::Escape), KeyOutcome::Quit);
        assert_eq!(flags, InputFlags::new());
    }

    #[test]
    fn uppercase_letters_are_the_same_key() {
        let mut flags = InputFlags::new();
        flags.on_key_down(Keycode::from_char('D'));
        assert!(flags.is_held(ShipKey::RotateRight));
    }
}
