//! CPU execution engine.
//!
//! Implements the fetch-decode-execute cycle against a cycle budget.
//! Cycles are charged as the instruction runs and the budget is only
//! checked between instructions, so the last instruction of a run may
//! overrun it.

use crate::cpu::addressing::{self, Operand};
use crate::cpu::decode::{self, AddressingMode, Instruction};
use crate::cpu::{Memory, Registers};
use crate::disasm::disassemble_at;
use log::{debug, trace, warn};
use thiserror::Error;

/// Total cost of JSR, opcode and operand fetches included.
const JSR_CYCLES: u32 = 6;

/// Cycle accounting for one `execute` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cycles {
    remaining: i64,
    spent: u64,
}

impl Cycles {
    /// Start an accounting run with `budget` cycles available.
    pub fn new(budget: u32) -> Self {
        Self {
            remaining: budget as i64,
            spent: 0,
        }
    }

    /// Charge one cycle.
    #[inline]
    pub fn tick(&mut self) {
        self.charge(1);
    }

    /// Charge `n` cycles. Going below zero is allowed.
    #[inline]
    pub fn charge(&mut self, n: u32) {
        self.remaining -= n as i64;
        self.spent += n as u64;
    }

    /// Charge whatever is left to bring an instruction that started at
    /// `start` up to `total` cycles.
    pub fn settle(&mut self, start: u64, total: u32) {
        let used = self.spent - start;
        if used < total as u64 {
            self.charge((total as u64 - used) as u32);
        }
    }

    /// Cycles left in the budget; negative after an overrun.
    pub fn remaining(&self) -> i64 {
        self.remaining
    }

    /// Cycles charged so far.
    pub fn spent(&self) -> u64 {
        self.spent
    }

    /// Whether the budget is used up, i.e. no further instruction starts.
    pub fn exhausted(&self) -> bool {
        self.remaining <= 0
    }
}

/// The 6502 CPU: registers plus the memory it exclusively owns.
#[derive(Clone)]
pub struct Cpu {
    /// CPU registers.
    pub regs: Registers,
    /// Main memory.
    pub mem: Memory,
    /// Cycles consumed since construction or reset.
    cycles: u64,
    /// Last decoded instruction (for debugging).
    last_instr: Option<(Instruction, AddressingMode)>,
}

impl Cpu {
    /// Create a CPU in its power-on state with zeroed memory.
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            mem: Memory::new(),
            cycles: 0,
            last_instr: None,
        }
    }

    /// Reset registers and flags and replace memory with a fresh zeroed
    /// bus. Any loaded program is gone afterwards.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.mem = Memory::new();
        self.cycles = 0;
        self.last_instr = None;
    }

    /// Run instructions until `budget` cycles have been consumed.
    ///
    /// An instruction is always completed once started, so more cycles than
    /// `budget` may be used. On error, state changes made before the failure
    /// are kept.
    pub fn execute(&mut self, budget: u32) -> Result<(), CpuError> {
        debug!("executing {} cycles from PC=${:04X}", budget, self.regs.pc);

        let mut cycles = Cycles::new(budget);
        let mut result = Ok(());
        while !cycles.exhausted() {
            if let Err(e) = self.step_with(&mut cycles) {
                result = Err(e);
                break;
            }
        }
        self.cycles += cycles.spent();

        match &result {
            Ok(()) => debug!(
                "spent {} cycles ({} remaining), PC=${:04X}",
                cycles.spent(),
                cycles.remaining(),
                self.regs.pc
            ),
            Err(e) => warn!("execution aborted after {} cycles: {}", cycles.spent(), e),
        }
        result
    }

    /// Execute a single instruction regardless of any budget.
    ///
    /// Returns the number of cycles it took.
    pub fn step(&mut self) -> Result<u32, CpuError> {
        let mut cycles = Cycles::new(0);
        let result = self.step_with(&mut cycles);
        self.cycles += cycles.spent();
        result.map(|()| cycles.spent() as u32)
    }

    fn step_with(&mut self, cycles: &mut Cycles) -> Result<(), CpuError> {
        let start = cycles.spent();
        let pc = self.regs.pc;
        let opcode = self.fetch_byte(cycles);

        let (instruction, mode) = decode::decode(opcode).ok_or(CpuError::UnknownOpcode(opcode))?;
        if log::log_enabled!(log::Level::Trace) {
            let (text, _) = disassemble_at(&self.mem, pc);
            trace!("${:04X}: {:02X}  {}", pc, opcode, text);
        }
        self.last_instr = Some((instruction, mode));

        match instruction {
            Instruction::Lda => self.lda(mode, cycles),
            Instruction::Jsr => self.jsr(mode, cycles, start),
            _ => Err(CpuError::UnhandledInstruction(instruction)),
        }
    }

    /// Resolve the operand for `instruction`, rejecting modes its handler
    /// does not accept.
    fn resolve(
        &mut self,
        instruction: Instruction,
        mode: AddressingMode,
        cycles: &mut Cycles,
    ) -> Result<Operand, CpuError> {
        let unhandled = CpuError::UnhandledAddressingMode { instruction, mode };
        if !instruction.modes().contains(&mode) {
            return Err(unhandled);
        }
        let resolve = addressing::resolver(mode).ok_or(unhandled)?;
        let operand = resolve(self, cycles);
        trace!("{} {} -> {:?}", instruction, mode, operand);
        Ok(operand)
    }

    /// Read the byte an operand refers to, charging the read.
    fn load_operand(&mut self, operand: Operand, cycles: &mut Cycles) -> u8 {
        match operand {
            Operand::Value(value) => value,
            Operand::Address(addr) => self.read_byte(addr, cycles),
        }
    }

    fn lda(&mut self, mode: AddressingMode, cycles: &mut Cycles) -> Result<(), CpuError> {
        let operand = self.resolve(Instruction::Lda, mode, cycles)?;
        let value = self.load_operand(operand, cycles);
        self.regs.set_a(value);
        Ok(())
    }

    fn jsr(&mut self, mode: AddressingMode, cycles: &mut Cycles, start: u64) -> Result<(), CpuError> {
        let target = match self.resolve(Instruction::Jsr, mode, cycles)? {
            Operand::Address(addr) => addr,
            Operand::Value(_) => {
                return Err(CpuError::UnhandledAddressingMode {
                    instruction: Instruction::Jsr,
                    mode,
                })
            }
        };

        // PC now points past the operand; that is the return address.
        let [lo, hi] = self.regs.pc.to_le_bytes();
        let sp = self.regs.sp;
        self.mem.write(sp.wrapping_sub(1), hi);
        self.mem.write(sp.wrapping_sub(2), lo);
        self.regs.sp = sp.wrapping_sub(2);
        self.regs.jump(target);

        cycles.settle(start, JSR_CYCLES);
        Ok(())
    }

    /// Read the byte at PC and advance PC. One cycle.
    pub(crate) fn fetch_byte(&mut self, cycles: &mut Cycles) -> u8 {
        let pc = self.regs.advance_pc();
        cycles.tick();
        self.mem.read(pc)
    }

    /// Read a little-endian word from the instruction stream. Two cycles.
    pub(crate) fn fetch_word(&mut self, cycles: &mut Cycles) -> u16 {
        let lo = self.fetch_byte(cycles);
        let hi = self.fetch_byte(cycles);
        u16::from_le_bytes([lo, hi])
    }

    /// One cycle.
    pub(crate) fn read_byte(&mut self, addr: u16, cycles: &mut Cycles) -> u8 {
        cycles.tick();
        self.mem.read(addr)
    }

    /// Two cycles.
    pub(crate) fn read_word(&mut self, addr: u16, cycles: &mut Cycles) -> u16 {
        let lo = self.read_byte(addr, cycles);
        let hi = self.read_byte(addr.wrapping_add(1), cycles);
        u16::from_le_bytes([lo, hi])
    }

    /// Total cycles consumed since construction or reset.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Get the last decoded instruction.
    pub fn last_instruction(&self) -> Option<(Instruction, AddressingMode)> {
        self.last_instr
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cpu")
            .field("cycles", &self.cycles)
            .field("regs", &self.regs)
            .field("mem", &self.mem)
            .finish()
    }
}

impl std::fmt::Display for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let regs = &self.regs;
        writeln!(f, "CPU {{")?;
        writeln!(f, "    PC: 0x{:04X}", regs.pc)?;
        writeln!(f, "    SP: 0x{:04X}", regs.sp)?;
        writeln!(f, "    A: 0x{:02X}", regs.a)?;
        writeln!(f, "    X: 0x{:02X}", regs.x)?;
        writeln!(f, "    Y: 0x{:02X}", regs.y)?;
        writeln!(f, "    Flags(0x{:02X}) {{", regs.status.bits())?;
        for (name, set) in regs.status.named() {
            writeln!(f, "        {}: {}", name, set)?;
        }
        writeln!(f, "    }}")?;
        write!(f, "}}")
    }
}

/// Errors that abort an `execute` call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("unknown opcode: 0x{0:02X}")]
    UnknownOpcode(u8),

    #[error("no handler for instruction {0}")]
    UnhandledInstruction(Instruction),

    #[error("{instruction} does not support {mode} addressing")]
    UnhandledAddressingMode {
        instruction: Instruction,
        mode: AddressingMode,
    },
}
