use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// the timers count down at a fixed rate no matter how fast instructions run
pub const TIMER_HZ: u32 = 60;

/// Sound timer shared with whatever produces audio. Audio output may run on
/// its own thread, so the count lives in an atomic and every clone of the
/// handle sees the same value.
#[derive(Debug, Clone, Default)]
pub struct SoundTimer(Arc<AtomicU8>);

impl SoundTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> u8 {
        self.0.load(Ordering::Acquire)
    }

    pub fn set(&self, value: u8) {
        self.0.store(value, Ordering::Release);
    }

    pub fn is_active(&self) -> bool {
        self.get() > 0
    }

    /// count down by one, stopping at zero
    fn tick(&self) {
        let _ = self
            .0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |v| v.checked_sub(1));
    }
}

/// The delay and sound countdown timers.
#[derive(Debug, Clone, Default)]
pub struct TimerPair {
    pub delay: u8,
    sound: SoundTimer,
}

impl TimerPair {
    pub fn new() -> Self {
        Self::default()
    }

    /// one 60 Hz tick: both timers drop by one, saturating at zero
    pub fn tick(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound.tick();
    }

    pub fn sound(&self) -> u8 {
        self.sound.get()
    }

    pub fn set_sound(&mut self, value: u8) {
        self.sound.set(value);
    }

    /// a handle onto the sound timer for an audio collaborator
    pub fn sound_handle(&self) -> SoundTimer {
        self.sound.clone()
    }
}
