use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal;
use log::debug;
use std::collections::HashMap;
use std::io;
use std::time::{Duration, Instant};

/// how many keys the hex keypad has
pub const KEY_COUNT: usize = 16;

/// Current state of the sixteen hex keys. The input collaborator writes it;
/// the interpreter reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputLatch {
    keys: [bool; KEY_COUNT],
}

impl InputLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// keys outside 0x0..=0xF are ignored
    pub fn set(&mut self, key: u8, pressed: bool) {
        match self.keys.get_mut(key as usize) {
            Some(k) => *k = pressed,
            None => debug!("ignoring state change for key 0x{:02x}", key),
        }
    }

    /// keys outside 0x0..=0xF are never pressed
    pub fn is_pressed(&self, key: u8) -> bool {
        self.keys.get(key as usize).copied().unwrap_or(false)
    }

    pub fn any_pressed(&self) -> bool {
        self.keys.iter().any(|k| *k)
    }

    /// lowest-numbered key held down, if any
    pub fn first_pressed(&self) -> Option<u8> {
        self.keys.iter().position(|k| *k).map(|k| k as u8)
    }
}

/// left-hand side of a qwerty keyboard laid out like the 4x4 hex keypad:
///   1 2 3 4      1 2 3 C
///   q w e r  =>  4 5 6 D
///   a s d f      7 8 9 E
///   z x c v      A 0 B F
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// Terminals report presses (and auto-repeat) but never releases, so a key
/// counts as held for this long after its last press event.
pub const KEY_HOLD: Duration = Duration::from_millis(150);

/// What the driver should do after input has been read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputStatus {
    Continue,
    Quit,
}

/// reads keypresses from the host and mirrors them into the latch
pub trait Input {
    /// apply every pending host event to `latch`
    fn poll(&mut self, latch: &mut InputLatch, now: Instant) -> Result<InputStatus, io::Error>;
}

/// Synthesises releases for keys that stop repeating.
#[derive(Debug, Default)]
pub struct HeldKeys {
    last_seen: [Option<Instant>; KEY_COUNT],
}

impl HeldKeys {
    pub fn press(&mut self, key: u8, now: Instant, latch: &mut InputLatch) {
        if let Some(slot) = self.last_seen.get_mut(key as usize) {
            *slot = Some(now);
            latch.set(key, true);
        }
    }

    pub fn release_expired(&mut self, now: Instant, latch: &mut InputLatch) {
        for (key, slot) in self.last_seen.iter_mut().enumerate() {
            if let Some(seen) = *slot {
                if now.saturating_duration_since(seen) >= KEY_HOLD {
                    *slot = None;
                    latch.set(key as u8, false);
                }
            }
        }
    }
}

/// keyboard input from a raw-mode terminal, via crossterm
pub struct TermInput {
    keymap: HashMap<char, u8>,
    held: HeldKeys,
}

impl TermInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(TermInput {
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            held: HeldKeys::default(),
        })
    }

    fn handle_key(&mut self, evt: KeyEvent, latch: &mut InputLatch, now: Instant) -> InputStatus {
        match evt.code {
            KeyCode::Esc => return InputStatus::Quit,
            KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => {
                return InputStatus::Quit
            }
            KeyCode::Char(key) => match self.keymap.get(&key.to_ascii_lowercase()) {
                Some(mapped_key) => self.held.press(*mapped_key, now, latch),
                None => debug!("can't map {:?} to a hex key", key),
            },
            other => debug!("unmapped key event {:?}", other),
        }
        InputStatus::Continue
    }
}

impl Drop for TermInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for TermInput {
    fn poll(&mut self, latch: &mut InputLatch, now: Instant) -> Result<InputStatus, io::Error> {
        while poll(Duration::from_millis(0))? {
            if let Event::Key(evt) = read()? {
                if self.handle_key(evt, latch, now) == InputStatus::Quit {
                    return Ok(InputStatus::Quit);
                }
            }
        }
        self.held.release_expired(now, latch);
        Ok(InputStatus::Continue)
    }
}

/// dummy Input implementation for testing: holds a fixed set of keys and can
/// ask to quit after a number of polls
pub struct DummyInput {
    keys: Vec<u8>,
    quit_after: Option<usize>,
    polls: usize,
}

impl DummyInput {
    pub fn new(keys: &[u8]) -> Self {
        DummyInput {
            keys: Vec::from(keys),
            quit_after: None,
            polls: 0,
        }
    }

    pub fn quit_after(mut self, polls: usize) -> Self {
        self.quit_after = Some(polls);
        self
    }
}

impl Input for DummyInput {
    fn poll(&mut self, latch: &mut InputLatch, _now: Instant) -> Result<InputStatus, io::Error> {
        self.polls += 1;
        if self.quit_after.map_or(false, |n| self.polls > n) {
            return Ok(InputStatus::Quit);
        }
        for key in &self.keys {
            latch.set(*key, true);
        }
        Ok(InputStatus::Continue)
    }
}
