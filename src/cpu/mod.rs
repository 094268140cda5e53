//! CPU emulation for a 6502-class processor.
//!
//! This module implements the execution core:
//! - 64 KiB flat memory bus
//! - A, X, Y, PC, SP registers and a seven-flag status register
//! - bit-field opcode decoding into (operation, addressing mode) pairs
//! - per-mode operand resolution with cycle accounting

pub mod memory;
pub mod status;
pub mod registers;
pub mod decode;
pub mod addressing;
pub mod execute;

pub use memory::{Address, Memory, MemoryError};
pub use status::{Flag, Status};
pub use registers::Registers;
pub use decode::{decode, decode_fields, encode, AddressingMode, Instruction};
pub use execute::{Cpu, CpuError, Cycles};
