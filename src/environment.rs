//! # environment
//!
//! Sets everything up around the interpreter and runs the main loop: read the
//! keyboard, run however many instructions are due at the configured rate,
//! tick the timers at 60 Hz, switch the tone on or off, and repaint when the
//! framebuffer changed.

use log::{error, info};
use std::time::{Duration, Instant};

use crate::error::AppError;
use crate::input::{Input, InputStatus};
use crate::interpreter::Chip8Interpreter;
use crate::render::Renderer;
use crate::sound::Sound;
use crate::timer::TIMER_HZ;

/// how long the main loop sleeps between frames
const FRAME_SLEEP: Duration = Duration::from_millis(1);

/// Fixed-rate tick accounting. Ticks that fall further behind than
/// `max_burst` are dropped rather than run in one go.
#[derive(Debug)]
pub struct Cadence {
    interval: Duration,
    next: Instant,
    max_burst: u32,
}

impl Cadence {
    pub fn new(hz: u32, max_burst: u32, start: Instant) -> Self {
        Cadence {
            interval: Duration::from_secs(1) / hz.max(1),
            next: start,
            max_burst: max_burst.max(1),
        }
    }

    /// number of ticks that have come due by `now`
    pub fn due(&mut self, now: Instant) -> u32 {
        let mut ticks = 0;
        while self.next <= now {
            ticks += 1;
            self.next += self.interval;
            if ticks == self.max_burst {
                if self.next <= now {
                    self.next = now + self.interval;
                }
                break;
            }
        }
        ticks
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

pub struct Environment<'a> {
    interpreter: Chip8Interpreter,
    renderer: &'a mut dyn Renderer,
    input: &'a mut dyn Input,
    sound: &'a mut dyn Sound,
    cpu: Cadence,
    timers: Cadence,
}

impl<'a> Environment<'a> {
    pub fn new(
        interpreter: Chip8Interpreter,
        renderer: &'a mut dyn Renderer,
        input: &'a mut dyn Input,
        sound: &'a mut dyn Sound,
        cpu_hz: u32,
        start: Instant,
    ) -> Self {
        Environment {
            interpreter,
            renderer,
            input,
            sound,
            // catch up on at most 50ms of instructions
            cpu: Cadence::new(cpu_hz, cpu_hz / 20, start),
            timers: Cadence::new(TIMER_HZ, 3, start),
        }
    }

    /// run frames until the user asks to quit or the program faults
    pub fn run(&mut self) -> Result<(), AppError> {
        info!(
            "running at one instruction every {:?}",
            self.cpu.interval()
        );
        loop {
            if self.frame(Instant::now())? == InputStatus::Quit {
                info!("quit requested");
                return Ok(());
            }
            spin_sleep::sleep(FRAME_SLEEP);
        }
    }

    /// one pass of the main loop as of `now`
    pub fn frame(&mut self, now: Instant) -> Result<InputStatus, AppError> {
        if self.input.poll(self.interpreter.input_mut(), now)? == InputStatus::Quit {
            return Ok(InputStatus::Quit);
        }

        for _ in 0..self.cpu.due(now) {
            if let Err(e) = self.interpreter.step() {
                error!(
                    "halting at {:#05x}: {}",
                    self.interpreter.program_counter(),
                    e
                );
                return Err(e.into());
            }
        }

        for _ in 0..self.timers.due(now) {
            self.interpreter.tick_timers();
        }

        let tone = if self.interpreter.timers().sound() > 0 {
            self.sound.beep()
        } else {
            self.sound.stop()
        };
        tone.map_err(|e| AppError::Audio(e.to_string()))?;

        if self.interpreter.display_mut().take_dirty() {
            self.renderer.render(self.interpreter.display())?;
        }
        Ok(InputStatus::Continue)
    }

    pub fn interpreter(&self) -> &Chip8Interpreter {
        &self.interpreter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VmError;
    use crate::input::DummyInput;
    use crate::render::DummyRenderer;
    use crate::sound::Mute;
    use std::error::Error;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn interpreter(program: &[u8]) -> Chip8Interpreter {
        let mut i = Chip8Interpreter::with_seed(1);
        let mut prog = program;
        i.load_program(&mut prog).unwrap();
        i
    }

    /// records every beep/stop call
    #[derive(Default)]
    struct Recorder {
        calls: Vec<bool>,
    }

    impl Sound for Recorder {
        fn beep(&mut self) -> Result<(), Box<dyn Error>> {
            self.calls.push(true);
            Ok(())
        }

        fn stop(&mut self) -> Result<(), Box<dyn Error>> {
            self.calls.push(false);
            Ok(())
        }
    }

    #[test]
    fn test_cadence_first_tick_is_immediate() {
        let t0 = Instant::now();
        let mut c = Cadence::new(100, 10, t0);
        assert_eq!(c.due(t0), 1);
        assert_eq!(c.due(t0), 0);
        assert_eq!(c.due(t0 + ms(9)), 0);
        assert_eq!(c.due(t0 + ms(10)), 1);
    }

    #[test]
    fn test_cadence_catches_up() {
        let t0 = Instant::now();
        let mut c = Cadence::new(1000, 50, t0);
        assert_eq!(c.due(t0 + ms(10)), 11);
        assert_eq!(c.due(t0 + ms(15)), 5);
    }

    #[test]
    fn test_cadence_drops_backlog_past_burst() {
        let t0 = Instant::now();
        let mut c = Cadence::new(1000, 5, t0);
        assert_eq!(c.due(t0 + ms(1000)), 5);
        assert_eq!(c.due(t0 + ms(1000)), 0);
        assert_eq!(c.due(t0 + ms(1001)), 1);
    }

    #[test]
    fn test_cadence_timer_rate() {
        let t0 = Instant::now();
        let mut c = Cadence::new(TIMER_HZ, 3, t0);
        let mut ticks = 0;
        for n in 0..1000 {
            ticks += c.due(t0 + ms(n));
        }
        // ticks at 0, 16.6, 33.3 ... 999.9ms
        assert_eq!(ticks, 60);
    }

    #[test]
    fn test_frame_runs_due_instructions_and_renders() -> Result<(), AppError> {
        // V0 = 5; I = glyph 0; draw at (V0, V0); loop forever
        let program = [0x60, 0x05, 0xA0, 0x00, 0xD0, 0x05, 0x12, 0x06];
        let mut renderer = DummyRenderer::new();
        let mut input = DummyInput::new(&[]);
        let mut sound = Mute::new();
        let t0 = Instant::now();
        let mut env = Environment::new(
            interpreter(&program),
            &mut renderer,
            &mut input,
            &mut sound,
            1000,
            t0,
        );

        assert_eq!(env.frame(t0 + ms(5))?, InputStatus::Continue);
        assert_eq!(env.interpreter().registers().get(0), 5);
        assert_eq!(env.interpreter().program_counter(), 0x206);
        env.frame(t0 + ms(6))?;
        drop(env);
        assert_eq!(renderer.frames, 1);
        assert_eq!(renderer.last_lit, 14);
        Ok(())
    }

    #[test]
    fn test_frame_stops_on_quit() -> Result<(), AppError> {
        let mut renderer = DummyRenderer::new();
        let mut input = DummyInput::new(&[]).quit_after(0);
        let mut sound = Mute::new();
        let t0 = Instant::now();
        let mut env = Environment::new(
            interpreter(&[0x60, 0x01]),
            &mut renderer,
            &mut input,
            &mut sound,
            700,
            t0,
        );
        assert_eq!(env.frame(t0)?, InputStatus::Quit);
        assert_eq!(env.interpreter().program_counter(), 0x200);
        Ok(())
    }

    #[test]
    fn test_run_returns_on_quit() -> Result<(), AppError> {
        let mut renderer = DummyRenderer::new();
        let mut input = DummyInput::new(&[]).quit_after(3);
        let mut sound = Mute::new();
        let mut env = Environment::new(
            interpreter(&[0x12, 0x00]),
            &mut renderer,
            &mut input,
            &mut sound,
            700,
            Instant::now(),
        );
        env.run()
    }

    #[test]
    fn test_key_reaches_the_interpreter() -> Result<(), AppError> {
        // wait for a key into V1
        let mut renderer = DummyRenderer::new();
        let mut input = DummyInput::new(&[0xB]);
        let mut sound = Mute::new();
        let t0 = Instant::now();
        let mut env = Environment::new(
            interpreter(&[0xF1, 0x0A]),
            &mut renderer,
            &mut input,
            &mut sound,
            700,
            t0,
        );
        env.frame(t0)?;
        assert!(env.interpreter().input().is_pressed(0xB));
        assert_eq!(env.interpreter().registers().get(1), 0xB);
        assert_eq!(env.interpreter().program_counter(), 0x202);
        Ok(())
    }

    #[test]
    fn test_sound_follows_timer() -> Result<(), AppError> {
        // V0 = 2; sound = V0; loop forever
        let program = [0x60, 0x02, 0xF0, 0x18, 0x12, 0x04];
        let mut renderer = DummyRenderer::new();
        let mut input = DummyInput::new(&[]);
        let mut sound = Recorder::default();
        let t0 = Instant::now();
        let mut env = Environment::new(
            interpreter(&program),
            &mut renderer,
            &mut input,
            &mut sound,
            1000,
            t0,
        );
        // first frame: the instructions run, then the first timer tick takes
        // the count from 2 to 1
        env.frame(t0 + ms(2))?;
        assert_eq!(env.interpreter().timers().sound(), 1);
        env.frame(t0 + ms(17))?;
        assert_eq!(env.interpreter().timers().sound(), 0);
        env.frame(t0 + ms(18))?;
        drop(env);
        assert_eq!(sound.calls, vec![true, false, false]);
        Ok(())
    }

    #[test]
    fn test_fault_ends_the_run() {
        let mut renderer = DummyRenderer::new();
        let mut input = DummyInput::new(&[]);
        let mut sound = Mute::new();
        let t0 = Instant::now();
        let mut env = Environment::new(
            interpreter(&[0x00, 0xEE]),
            &mut renderer,
            &mut input,
            &mut sound,
            700,
            t0,
        );
        assert!(matches!(
            env.frame(t0),
            Err(AppError::Vm(VmError::StackUnderflow { pc: 0x200 }))
        ));
    }
}
