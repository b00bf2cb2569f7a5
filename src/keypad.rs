use std::{
    sync::atomic::{
        AtomicBool,
        AtomicU16,
        Ordering,
    },
    sync::Arc,
    thread,
    time::Duration,
};

use thiserror::Error;

use crate::{
    emulator::Timers,
    Cadence,
};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum KeypadError {
    #[error("key code {0:#04x} is not on the keypad")]
    InvalidKey(u8),
}

/// Input device the key opcodes consult. Key codes run 0x0..=0xF.
pub trait Keypad {
    fn is_pressed(&self, key: u8) -> Result<bool, KeypadError>;

    /// Called between scan rounds of the blocking key wait (FX0A). The host
    /// may pump events here and keep its timer cadence running against the
    /// borrowed `timers`. Returning false cancels the wait.
    fn idle(&mut self, timers: &mut Timers) -> bool {
        let _ = timers;
        true
    }
}

/// Held-key mask and shutdown flag shared between the frame loop and the
/// machine thread. The frame loop writes, the machine reads.
#[derive(Default)]
pub struct KeyState {
    held: AtomicU16,
    closed: AtomicBool,
}

impl KeyState {
    pub fn set_held(&self, mask: u16) {
        self.held.store(mask, Ordering::Relaxed);
    }

    pub fn held(&self) -> u16 {
        self.held.load(Ordering::Relaxed)
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::Relaxed);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }
}

/// Machine-side view of [`KeyState`]; keeps the 60 Hz cadence alive while an
/// instruction blocks on a key.
pub struct SharedKeypad {
    state: Arc<KeyState>,
    cadence: Cadence,
}

impl SharedKeypad {
    pub fn new(state: Arc<KeyState>) -> Self {
        Self {
            state,
            cadence: Cadence::sixty_hz(),
        }
    }
}

impl Keypad for SharedKeypad {
    fn is_pressed(&self, key: u8) -> Result<bool, KeypadError> {
        if key > 0xF {
            return Err(KeypadError::InvalidKey(key));
        }

        Ok(self.state.held() & (1 << key) != 0)
    }

    fn idle(&mut self, timers: &mut Timers) -> bool {
        if self.state.is_closed() {
            return false;
        }
        if self.cadence.tick() {
            timers.tick();
        }
        thread::sleep(Duration::from_micros(500));

        true
    }
}
