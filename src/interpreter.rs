//! # interpreter
//!
//! The CHIP-8 machine proper: 4K of memory, sixteen V registers plus I, a
//! sixteen frame call stack, the 64x32 framebuffer, the hex keypad latch and
//! the delay/sound timers.
//!
//! The interpreter never looks at the clock. A driver calls `step` as often as
//! it likes and `tick_timers` sixty times a second; in between it may render
//! the framebuffer, feed the keypad and read the sound timer.
//!
//! Each `step` fetches the big-endian word at PC, decodes it into an
//! `Instruction` and executes it. Straight-line instructions advance PC by 2,
//! skips by 2 or 4, jumps/calls/returns set it outright, and FX0A leaves it
//! alone until a key is down.

use crate::display::Display;
use crate::error::VmError;
use crate::input::InputLatch;
use crate::instruction::Instruction;
use crate::memory::{
    Chip8MemoryMap, MemoryMap, CHIP8_FONT_ADDR, CHIP8_FONT_GLYPH_BYTES, CHIP8_PROGRAM_ADDR,
};
use crate::registers::{RegisterFile, FLAG_REGISTER};
use crate::stack::Stack;
use crate::timer::{SoundTimer, TimerPair};
use log::{trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io;

/// what a single `step` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Executed(Instruction),
    /// FX0A with no key down; PC is unchanged so the next step retries it
    WaitingForKey,
}

pub struct Chip8Interpreter {
    memory: Chip8MemoryMap,
    registers: RegisterFile,
    stack: Stack,
    display: Display,
    input: InputLatch,
    timers: TimerPair,
    program_counter: u16,
    rng: StdRng,
}

impl Chip8Interpreter {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// deterministic CXNN, for tests and replays
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Chip8Interpreter {
            memory: Chip8MemoryMap::new(),
            registers: RegisterFile::new(),
            stack: Stack::new(),
            display: Display::new(),
            input: InputLatch::new(),
            timers: TimerPair::new(),
            program_counter: CHIP8_PROGRAM_ADDR,
            rng,
        }
    }

    /// load a chip8 program at 0x200
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize, VmError> {
        self.memory.load_program(reader)
    }

    /// execute exactly one instruction
    pub fn step(&mut self) -> Result<StepOutcome, VmError> {
        let pc = self.program_counter;
        let opcode = self.memory.get_word(pc)?;
        let instruction = Instruction::decode(opcode);
        trace!("{:#05x}: {:04x}  {}", pc, opcode, instruction);
        self.execute(instruction)
    }

    /// one 60 Hz timer tick
    pub fn tick_timers(&mut self) {
        self.timers.tick();
    }

    fn execute(&mut self, instruction: Instruction) -> Result<StepOutcome, VmError> {
        use Instruction::*;

        let pc = self.program_counter;
        let mut next = pc + 2;
        let regs = &mut self.registers;

        match instruction {
            ClearScreen => self.display.clear(),
            Return => {
                let ret = self.stack.pop().ok_or(VmError::StackUnderflow { pc })?;
                next = ret + 2;
            }
            Jump { nnn } => next = nnn,
            Call { nnn } => {
                if !self.stack.push(pc) {
                    return Err(VmError::StackOverflow { pc });
                }
                next = nnn;
            }
            SkipIfEqualImm { x, nn } => next += skip(regs.get(x) == nn),
            SkipIfNotEqualImm { x, nn } => next += skip(regs.get(x) != nn),
            SkipIfEqual { x, y } => next += skip(regs.get(x) == regs.get(y)),
            LoadImm { x, nn } => regs.set(x, nn),
            AddImm { x, nn } => regs.set(x, regs.get(x).wrapping_add(nn)),
            Move { x, y } => regs.set(x, regs.get(y)),
            Or { x, y } => regs.set(x, regs.get(x) | regs.get(y)),
            And { x, y } => regs.set(x, regs.get(x) & regs.get(y)),
            Xor { x, y } => regs.set(x, regs.get(x) ^ regs.get(y)),
            // the flag is written before the result, so with X = F the result wins
            Add { x, y } => {
                let sum = regs.get(x) as u16 + regs.get(y) as u16;
                regs.set_flag(sum > 0xFF);
                regs.set(x, sum as u8);
            }
            Sub { x, y } => {
                regs.set_flag(regs.get(x) >= regs.get(y));
                regs.set(x, regs.get(x).wrapping_sub(regs.get(y)));
            }
            ShiftRight { x } => {
                regs.set(FLAG_REGISTER, regs.get(x) & 0x01);
                regs.set(x, regs.get(x) >> 1);
            }
            SubReverse { x, y } => {
                regs.set_flag(regs.get(y) >= regs.get(x));
                regs.set(x, regs.get(y).wrapping_sub(regs.get(x)));
            }
            ShiftLeft { x } => {
                regs.set(FLAG_REGISTER, regs.get(x) >> 7);
                regs.set(x, regs.get(x) << 1);
            }
            SkipIfNotEqual { x, y } => next += skip(regs.get(x) != regs.get(y)),
            LoadIndex { nnn } => regs.i = nnn,
            JumpOffset { nnn } => next = regs.get(0) as u16 + nnn,
            Random { x, nn } => regs.set(x, self.rng.gen::<u8>() & nn),
            Draw { x, y, n } => {
                let rows = self.memory.get_ro_slice(regs.i, n as usize)?;
                // VF is cleared first, so it reads as 0 when used as a coordinate
                regs.set_flag(false);
                if self.display.draw(rows, regs.get(x), regs.get(y)) {
                    regs.set_flag(true);
                }
            }
            SkipIfKey { x } => next += skip(self.input.is_pressed(regs.get(x))),
            SkipIfNotKey { x } => next += skip(!self.input.is_pressed(regs.get(x))),
            LoadDelay { x } => regs.set(x, self.timers.delay),
            WaitKey { x } => match self.input.first_pressed() {
                Some(key) => regs.set(x, key),
                None => return Ok(StepOutcome::WaitingForKey),
            },
            SetDelay { x } => self.timers.delay = regs.get(x),
            SetSound { x } => self.timers.set_sound(regs.get(x)),
            AddIndex { x } => regs.i = regs.i.wrapping_add(regs.get(x) as u16),
            LoadGlyph { x } => {
                regs.i = CHIP8_FONT_ADDR + regs.get(x) as u16 * CHIP8_FONT_GLYPH_BYTES
            }
            StoreBcd { x } => {
                let value = regs.get(x);
                let digits = self.memory.get_rw_slice(regs.i, 3)?;
                digits.copy_from_slice(&[value / 100, value / 10 % 10, value % 10]);
            }
            StoreRegisters { x } => {
                let dst = self.memory.get_rw_slice(regs.i, x as usize + 1)?;
                dst.copy_from_slice(regs.up_to(x));
            }
            LoadRegisters { x } => {
                let src = self.memory.get_ro_slice(regs.i, x as usize + 1)?;
                regs.up_to_mut(x).copy_from_slice(src);
            }
            Unknown(opcode) => warn!("unknown opcode {:#06x} at {:#05x}, skipping", opcode, pc),
        }

        self.program_counter = next;
        Ok(StepOutcome::Executed(instruction))
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    pub fn memory(&self) -> &Chip8MemoryMap {
        &self.memory
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    /// the renderer consumes the dirty flag through this
    pub fn display_mut(&mut self) -> &mut Display {
        &mut self.display
    }

    pub fn input(&self) -> &InputLatch {
        &self.input
    }

    /// the input collaborator writes key state through this
    pub fn input_mut(&mut self) -> &mut InputLatch {
        &mut self.input
    }

    pub fn timers(&self) -> &TimerPair {
        &self.timers
    }

    pub fn sound_handle(&self) -> SoundTimer {
        self.timers.sound_handle()
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.depth()
    }
}

impl Default for Chip8Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// extra PC advance for a skip instruction
#[inline(always)]
fn skip(condition: bool) -> u16 {
    if condition {
        2
    } else {
        0
    }
}
