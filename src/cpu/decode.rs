//! Opcode decoder.
//!
//! An opcode byte is split into two bit fields:
//! - bits 7-5: the operation (mask `0b1110_0000`)
//! - bits 4-0: the addressing mode (mask `0b0001_1111`)
//!
//! Each field is looked up independently. Most of the 256 byte values have
//! no meaning, and decoding them yields `None` rather than an error.

use serde::{Deserialize, Serialize};
use std::fmt;

const INSTRUCTION_MASK: u8 = 0b1110_0000;
const MODE_MASK: u8 = 0b0001_1111;

/// Operation selected by the high three bits of an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instruction {
    /// Jump to subroutine: push return address, PC := addr
    Jsr,
    /// Store accumulator (decodable, not executable yet)
    Sta,
    /// Load accumulator: A := operand
    Lda,
}

impl Instruction {
    /// Every decodable operation.
    pub const ALL: [Instruction; 3] = [Instruction::Jsr, Instruction::Sta, Instruction::Lda];

    /// The operation's bits, already in opcode position.
    pub const fn bits(self) -> u8 {
        match self {
            Instruction::Jsr => 0x20,
            Instruction::Sta => 0x80,
            Instruction::Lda => 0xA0,
        }
    }

    /// Look up the operation for the high bits of `opcode`.
    pub fn from_bits(opcode: u8) -> Option<Self> {
        let bits = opcode & INSTRUCTION_MASK;
        Self::ALL.into_iter().find(|i| i.bits() == bits)
    }

    /// Addressing modes the execution handler for this operation accepts.
    pub fn modes(self) -> &'static [AddressingMode] {
        use AddressingMode::*;
        match self {
            Instruction::Lda => &[
                Immediate, ZeroPage, ZeroPageX, Absolute, AbsoluteX, AbsoluteY, IndirectX,
                IndirectY,
            ],
            Instruction::Jsr => &[Absolute],
            Instruction::Sta => &[],
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Instruction::Jsr => "JSR",
            Instruction::Sta => "STA",
            Instruction::Lda => "LDA",
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// How an operation locates its operand.
///
/// The last four variants are reserved: they decode, but no operation
/// handler accepts them yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressingMode {
    /// `#$nn`
    Immediate,
    /// `$nn`
    ZeroPage,
    /// `$nn,X`, wraps within the zero page
    ZeroPageX,
    /// `$nnnn`
    Absolute,
    /// `$nnnn,X`
    AbsoluteX,
    /// `$nnnn,Y`
    AbsoluteY,
    /// `($nn,X)`
    IndirectX,
    /// `($nn),Y`
    IndirectY,
    Accumulator,
    Relative,
    Implied,
    Indirect,
}

impl AddressingMode {
    pub const ALL: [AddressingMode; 12] = [
        AddressingMode::Immediate,
        AddressingMode::ZeroPage,
        AddressingMode::ZeroPageX,
        AddressingMode::Absolute,
        AddressingMode::AbsoluteX,
        AddressingMode::AbsoluteY,
        AddressingMode::IndirectX,
        AddressingMode::IndirectY,
        AddressingMode::Accumulator,
        AddressingMode::Relative,
        AddressingMode::Implied,
        AddressingMode::Indirect,
    ];

    /// The mode's bits, already in opcode position.
    pub const fn bits(self) -> u8 {
        match self {
            AddressingMode::Immediate => 0x09,
            AddressingMode::ZeroPage => 0x05,
            AddressingMode::ZeroPageX => 0x15,
            AddressingMode::Absolute => 0x0D,
            AddressingMode::AbsoluteX => 0x1D,
            AddressingMode::AbsoluteY => 0x19,
            AddressingMode::IndirectX => 0x01,
            AddressingMode::IndirectY => 0x11,
            AddressingMode::Accumulator => 0x0A,
            AddressingMode::Relative => 0x10,
            AddressingMode::Implied => 0x00,
            AddressingMode::Indirect => 0x02,
        }
    }

    /// Look up the mode for the low bits of `opcode`.
    pub fn from_bits(opcode: u8) -> Option<Self> {
        let bits = opcode & MODE_MASK;
        Self::ALL.into_iter().find(|m| m.bits() == bits)
    }

    /// Number of operand bytes following the opcode.
    pub const fn operand_len(self) -> u16 {
        match self {
            AddressingMode::Accumulator | AddressingMode::Implied => 0,
            AddressingMode::Immediate
            | AddressingMode::ZeroPage
            | AddressingMode::ZeroPageX
            | AddressingMode::IndirectX
            | AddressingMode::IndirectY
            | AddressingMode::Relative => 1,
            AddressingMode::Absolute
            | AddressingMode::AbsoluteX
            | AddressingMode::AbsoluteY
            | AddressingMode::Indirect => 2,
        }
    }

    /// Render an operand in conventional assembler syntax.
    pub fn format_operand(self, operand: u16) -> String {
        match self {
            AddressingMode::Immediate => format!("#${:02X}", operand),
            AddressingMode::ZeroPage => format!("${:02X}", operand),
            AddressingMode::ZeroPageX => format!("${:02X},X", operand),
            AddressingMode::Absolute => format!("${:04X}", operand),
            AddressingMode::AbsoluteX => format!("${:04X},X", operand),
            AddressingMode::AbsoluteY => format!("${:04X},Y", operand),
            AddressingMode::IndirectX => format!("(${:02X},X)", operand),
            AddressingMode::IndirectY => format!("(${:02X}),Y", operand),
            AddressingMode::Accumulator => "A".to_string(),
            AddressingMode::Relative => format!("${:02X}", operand),
            AddressingMode::Implied => String::new(),
            AddressingMode::Indirect => format!("(${:04X})", operand),
        }
    }
}

impl fmt::Display for AddressingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AddressingMode::Immediate => "immediate",
            AddressingMode::ZeroPage => "zero page",
            AddressingMode::ZeroPageX => "zero page,X",
            AddressingMode::Absolute => "absolute",
            AddressingMode::AbsoluteX => "absolute,X",
            AddressingMode::AbsoluteY => "absolute,Y",
            AddressingMode::IndirectX => "(indirect,X)",
            AddressingMode::IndirectY => "(indirect),Y",
            AddressingMode::Accumulator => "accumulator",
            AddressingMode::Relative => "relative",
            AddressingMode::Implied => "implied",
            AddressingMode::Indirect => "indirect",
        };
        f.write_str(name)
    }
}

/// Decode each half of an opcode independently.
pub fn decode_fields(opcode: u8) -> (Option<Instruction>, Option<AddressingMode>) {
    (Instruction::from_bits(opcode), AddressingMode::from_bits(opcode))
}

/// Decode an opcode. `None` unless both halves are defined.
pub fn decode(opcode: u8) -> Option<(Instruction, AddressingMode)> {
    match decode_fields(opcode) {
        (Some(instruction), Some(mode)) => Some((instruction, mode)),
        _ => None,
    }
}

/// Build the opcode byte for an operation and addressing mode.
pub const fn encode(instruction: Instruction, mode: AddressingMode) -> u8 {
    instruction.bits() | mode.bits()
}
