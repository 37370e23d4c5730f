use std::io;

use thiserror::Error;

/// Failure to copy a program into memory. The machine is left untouched.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read ROM: {0}")]
    Io(#[from] io::Error),
    /// `size` counts the bytes read, which stops one past `max`
    #[error("ROM is larger than {max} bytes")]
    TooLarge { size: usize, max: usize },
}

/// A program did something the machine can't represent. `pc` is the address of
/// the faulting instruction.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    #[error("stack overflow calling from {pc:#05X}")]
    StackOverflow { pc: u16 },
    #[error("return with empty stack at {pc:#05X}")]
    StackUnderflow { pc: u16 },
    #[error("address {addr:#06X} out of range at {pc:#05X}")]
    AddressOutOfRange { addr: usize, pc: u16 },
    /// raised by `Chip8::write_memory`, not by a running program
    #[error("write to {addr:#06X} is past the end of memory")]
    WriteOutOfRange { addr: usize },
}
