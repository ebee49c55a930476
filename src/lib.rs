//! # chip8_vm
//!
//! A CHIP-8 virtual machine that runs programs in a terminal.
//!
//! ## Design
//!
//! * the interpreter core is plain data: memory, registers, stack, display,
//!   keypad latch and timers, with no clock, terminal or audio inside it
//! * `step()` executes exactly one instruction; `tick_timers()` is the 60 Hz
//!   countdown; the caller decides how often each happens
//! * decode produces a closed `Instruction` enum, execute is a single match
//!   over it, so the decoder can be tested against raw byte pairs
//! * abstract display, input and sound behind traits so alternatives plug in;
//!   the shipped ones are a TUI canvas, crossterm key events and a beeper
//! * the sound timer is shared through an atomic handle so audio running on
//!   its own thread reads a consistent value
//!
//! Model
//!
//! Environment
//!  |-- renderer, input, sound, cadences (cpu rate, 60 Hz timers)
//!  |-- interpreter(memory, registers, stack, display, input latch, timers)
//!  |    |-- instruction::decode(opcode)
//!  |    `-- execute(instruction)
//!  `-- main loop
//!       |-- input.poll(latch)                 // Esc quits
//!       |-- for each due cpu tick: interpreter.step()
//!       |-- for each due timer tick: interpreter.tick_timers()
//!       |-- sound.beep() / sound.stop() depending on the sound timer
//!       |-- if display.take_dirty(): renderer.render(display)
//!       `-- sleep(1ms)
pub mod config;
pub mod display;
pub mod environment;
pub mod error;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod logger;
pub mod memory;
pub mod registers;
pub mod render;
pub mod sound;
pub mod stack;
pub mod timer;

pub use error::{AppError, VmError};
pub use interpreter::{Chip8Interpreter, StepOutcome};
