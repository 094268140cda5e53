//! 6502 register file.
//!
//! - A: 8-bit accumulator
//! - X, Y: 8-bit index registers
//! - PC: 16-bit program counter
//! - SP: stack pointer, kept as a full 16-bit address into a descending stack
//! - P: status flags

use crate::cpu::status::Status;
use serde::{Deserialize, Serialize};

/// Where execution starts after construction or reset.
pub const RESET_VECTOR: u16 = 0xFFFC;

/// Initial stack pointer. The first push lands at 0x00FF.
pub const STACK_RESET: u16 = 0x0100;

/// The register file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub pc: u16,
    pub sp: u16,
    pub status: Status,
}

impl Registers {
    /// Create a register file in its power-on state.
    pub fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            pc: RESET_VECTOR,
            sp: STACK_RESET,
            status: Status::new(),
        }
    }

    /// Return every register to its power-on state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Increment the program counter by 1, wrapping at 0xFFFF.
    /// Returns the old value.
    pub fn advance_pc(&mut self) -> u16 {
        let old = self.pc;
        self.pc = self.pc.wrapping_add(1);
        old
    }

    /// Set the program counter to an absolute address.
    pub fn jump(&mut self, addr: u16) {
        self.pc = addr;
    }

    /// Load the accumulator and update Z/N.
    pub fn set_a(&mut self, value: u8) {
        self.a = value;
        self.status.update_zero_negative(value);
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_on_state() {
        let regs = Registers::new();
        assert_eq!(regs.pc, 0xFFFC);
        assert_eq!(regs.sp, 0x0100);
        assert_eq!((regs.a, regs.x, regs.y), (0, 0, 0));
        assert_eq!(regs.status.bits(), 0);
    }

    #[test]
    fn test_advance_pc_wraps() {
        let mut regs = Registers::new();
        regs.pc = 0xFFFF;

        let old = regs.advance_pc();
        assert_eq!(old, 0xFFFF);
        assert_eq!(regs.pc, 0x0000);
    }

    #[test]
    fn test_set_a_updates_flags() {
        let mut regs = Registers::new();
        regs.set_a(0x80);
        assert_eq!(regs.a, 0x80);
        assert!(regs.status.negative());
        assert!(!regs.status.zero());
    }

    #[test]
    fn test_reset() {
        let mut regs = Registers::new();
        regs.a = 1;
        regs.x = 2;
        regs.y = 3;
        regs.sp = 0x00F0;
        regs.jump(0x1234);
        regs.status.set_carry(true);

        regs.reset();
        assert_eq!(regs, Registers::new());
    }

    #[test]
    fn test_serialize_json() {
        let mut regs = Registers::new();
        regs.set_a(0x42);
        let json = serde_json::to_value(&regs).unwrap();
        assert_eq!(json["a"], 0x42);
        assert_eq!(json["pc"], 0xFFFC);
        assert_eq!(json["sp"], 0x0100);
        assert_eq!(json["status"], 0);

        let back: Registers = serde_json::from_value(json).unwrap();
        assert_eq!(back, regs);
    }
}
