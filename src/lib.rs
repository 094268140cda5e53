//! # MOS 6502 Core
//!
//! The fetch/decode/execute engine of an 8-bit 6502-class microprocessor.
//!
//! A caller builds a [`Cpu`], writes a program into its memory, and runs it
//! for a cycle budget with [`Cpu::execute`]. Opcodes use a simplified
//! encoding: the high three bits name the operation and the low five bits
//! name the addressing mode, see [`encode`].

pub mod cpu;
pub mod disasm;

// Re-export commonly used types
pub use cpu::{decode, encode, AddressingMode, Cpu, CpuError, Flag, Instruction, Memory, Registers, Status};
pub use disasm::{disassemble, disassemble_at};
