use std::io;

use thiserror::Error;

/// Faults raised by the machine itself while loading or executing a program.
#[derive(Debug, Error)]
pub enum VmError {
    #[error("memory access out of bounds at address {address:#06X}")]
    MemoryOutOfBounds { address: usize },

    #[error("stack overflow: call at {pc:#06X} with every frame in use")]
    StackOverflow { pc: u16 },

    #[error("stack underflow: return at {pc:#06X} with an empty call stack")]
    StackUnderflow { pc: u16 },

    #[error("ROM is too large (at least {size} bytes), max size is {max_size} bytes")]
    RomTooLarge { size: usize, max_size: usize },

    #[error("could not read program: {0}")]
    Io(#[from] io::Error),
}

/// Faults raised while setting up or driving the machine.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Vm(#[from] VmError),

    #[error("terminal error: {0}")]
    Io(#[from] io::Error),

    #[error("audio error: {0}")]
    Audio(String),

    #[error("logger error: {0}")]
    Logger(String),
}
