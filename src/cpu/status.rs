//! Processor status register.
//!
//! Seven condition bits packed into one byte. Bit 7 is reserved and keeps
//! whatever value it was initialized with.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Individual status bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Flag: u8 {
        const CARRY = 0b0000_0001;
        const ZERO = 0b0000_0010;
        const INTERRUPT_DISABLE = 0b0000_0100;
        const DECIMAL = 0b0000_1000;
        const BREAK = 0b0001_0000;
        const OVERFLOW = 0b0010_0000;
        const NEGATIVE = 0b0100_0000;
    }
}

/// The status register.
///
/// Serializes as its raw byte.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct Status {
    flags: Flag,
}

impl Status {
    /// All flags cleared.
    pub const fn new() -> Self {
        Self {
            flags: Flag::empty(),
        }
    }

    /// Build from a raw byte, reserved bit included.
    pub const fn from_bits(bits: u8) -> Self {
        Self {
            flags: Flag::from_bits_retain(bits),
        }
    }

    /// Raw byte value.
    pub const fn bits(&self) -> u8 {
        self.flags.bits()
    }

    /// True if every bit of `flag` is set.
    pub fn get(&self, flag: Flag) -> bool {
        self.flags.contains(flag)
    }

    pub fn set(&mut self, flag: Flag, value: bool) {
        self.flags.set(flag, value);
    }

    /// Set Z and N from a value just written to a register.
    pub fn update_zero_negative(&mut self, value: u8) {
        self.set(Flag::ZERO, value == 0);
        self.set(Flag::NEGATIVE, value & 0x80 != 0);
    }

    pub fn carry(&self) -> bool {
        self.get(Flag::CARRY)
    }

    pub fn set_carry(&mut self, value: bool) {
        self.set(Flag::CARRY, value);
    }

    pub fn zero(&self) -> bool {
        self.get(Flag::ZERO)
    }

    pub fn set_zero(&mut self, value: bool) {
        self.set(Flag::ZERO, value);
    }

    pub fn interrupt_disable(&self) -> bool {
        self.get(Flag::INTERRUPT_DISABLE)
    }

    pub fn set_interrupt_disable(&mut self, value: bool) {
        self.set(Flag::INTERRUPT_DISABLE, value);
    }

    pub fn decimal(&self) -> bool {
        self.get(Flag::DECIMAL)
    }

    pub fn set_decimal(&mut self, value: bool) {
        self.set(Flag::DECIMAL, value);
    }

    pub fn break_command(&self) -> bool {
        self.get(Flag::BREAK)
    }

    pub fn set_break_command(&mut self, value: bool) {
        self.set(Flag::BREAK, value);
    }

    pub fn overflow(&self) -> bool {
        self.get(Flag::OVERFLOW)
    }

    pub fn set_overflow(&mut self, value: bool) {
        self.set(Flag::OVERFLOW, value);
    }

    pub fn negative(&self) -> bool {
        self.get(Flag::NEGATIVE)
    }

    pub fn set_negative(&mut self, value: bool) {
        self.set(Flag::NEGATIVE, value);
    }

    /// Named flags in display order.
    pub fn named(&self) -> [(char, bool); 7] {
        [
            ('C', self.carry()),
            ('Z', self.zero()),
            ('I', self.interrupt_disable()),
            ('D', self.decimal()),
            ('B', self.break_command()),
            ('V', self.overflow()),
            ('N', self.negative()),
        ]
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::new()
    }
}

impl From<u8> for Status {
    fn from(bits: u8) -> Self {
        Self::from_bits(bits)
    }
}

impl From<Status> for u8 {
    fn from(status: Status) -> Self {
        status.bits()
    }
}

impl std::fmt::Debug for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P=")?;
        for (name, set) in self.named().iter().rev() {
            if *set {
                write!(f, "{}", name)?;
            } else {
                write!(f, "{}", name.to_ascii_lowercase())?;
            }
        }
        write!(f, " (0x{:02X})", self.bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_independent() {
        let all = [
            Flag::CARRY,
            Flag::ZERO,
            Flag::INTERRUPT_DISABLE,
            Flag::DECIMAL,
            Flag::BREAK,
            Flag::OVERFLOW,
            Flag::NEGATIVE,
        ];

        for flag in all {
            let mut status = Status::new();
            status.set(flag, true);
            assert_eq!(status.bits(), flag.bits());
            for other in all.iter().filter(|&&o| o != flag) {
                assert!(!status.get(*other));
            }
            status.set(flag, false);
            assert_eq!(status.bits(), 0);
        }
    }

    #[test]
    fn test_named_accessors() {
        let mut status = Status::new();
        status.set_carry(true);
        status.set_overflow(true);
        status.set_decimal(true);
        assert!(status.carry() && status.overflow() && status.decimal());
        assert!(!status.zero() && !status.negative() && !status.break_command());
        assert_eq!(status.bits(), 0b0010_1001);

        status.set_interrupt_disable(true);
        status.set_break_command(true);
        assert!(status.interrupt_disable() && status.break_command());
    }

    #[test]
    fn test_update_zero_negative() {
        let mut status = Status::new();

        status.update_zero_negative(0x00);
        assert!(status.zero());
        assert!(!status.negative());

        status.update_zero_negative(0x80);
        assert!(!status.zero());
        assert!(status.negative());

        status.update_zero_negative(0x42);
        assert!(!status.zero());
        assert!(!status.negative());
    }

    #[test]
    fn test_reserved_bit_preserved() {
        let mut status = Status::from_bits(0x80);
        status.update_zero_negative(0xFF);
        status.set_carry(true);
        assert_eq!(status.bits(), 0x80 | 0x40 | 0x01);
    }

    #[test]
    fn test_set_clear_keeps_other_bits() {
        let mut status = Status::from_bits(0xFF);
        status.set(Flag::ZERO | Flag::CARRY, false);
        assert_eq!(status.bits(), 0xFC);
        assert!(!status.get(Flag::ZERO | Flag::NEGATIVE));
        assert!(status.get(Flag::NEGATIVE | Flag::OVERFLOW));
        assert_eq!(u8::from(status), 0xFC);
        assert_eq!(Status::from(0xFCu8), status);
    }

    #[test]
    fn test_debug_format() {
        let mut status = Status::new();
        status.set_zero(true);
        assert_eq!(format!("{:?}", status), "P=nvbdiZc (0x02)");
    }
}
