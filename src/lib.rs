//! CHIP-8 virtual machine: 4K memory, sixteen 8-bit registers, a 64x32
//! monochrome framebuffer, and delay/sound timers that the host ticks once per
//! frame independently of how many instructions it executes.

pub mod chip8;
pub mod error;
pub mod speed;

pub use crate::chip8::display::{Framebuffer, HEIGHT, WIDTH};
pub use crate::chip8::keypad::Keypad;
pub use crate::chip8::opcode::Opcode;
pub use crate::chip8::{Chip8, MAX_ROM_SIZE, MEMORY_SIZE, PROGRAM_START, STACK_DEPTH};
pub use crate::error::{Fault, LoadError};
pub use crate::speed::Speed;
