//! Flat 64 KiB memory bus.
//!
//! Every address in 0x0000-0xFFFF is valid. Addresses arrive as any
//! primitive integer and are truncated to 16 bits, so an index computation
//! that overflows wraps around the address space instead of failing.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};
use thiserror::Error;

/// The number of addressable bytes.
pub const MEMORY_SIZE: usize = 0x1_0000;

/// Conversion of an integer into a bus address.
///
/// Values wider than 16 bits are truncated modulo 65536.
pub trait Address: Copy {
    fn to_address(self) -> u16;
}

macro_rules! impl_address {
    ($($t:ty),*) => {
        $(
            impl Address for $t {
                #[inline]
                fn to_address(self) -> u16 {
                    self as u16
                }
            }
        )*
    };
}

impl_address!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

/// 65536 bytes of zero-initialized RAM.
///
/// Serializes as a flat byte array; deserializing anything other than
/// exactly [`MEMORY_SIZE`] bytes fails.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct Memory {
    cells: Vec<u8>,
}

impl Memory {
    /// Create a new memory with all cells zeroed.
    pub fn new() -> Self {
        Self {
            cells: vec![0; MEMORY_SIZE],
        }
    }

    #[inline]
    pub fn read<A: Address>(&self, addr: A) -> u8 {
        self.cells[addr.to_address() as usize]
    }

    #[inline]
    pub fn write<A: Address>(&mut self, addr: A, value: u8) {
        self.cells[addr.to_address() as usize] = value;
    }

    /// Read a little-endian word. The high byte comes from `addr + 1`,
    /// wrapping at the top of the address space.
    pub fn read_word<A: Address>(&self, addr: A) -> u16 {
        let addr = addr.to_address();
        let lo = self.read(addr);
        let hi = self.read(addr.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    /// Clear all memory to zeros.
    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// Copy a program into memory starting at `start`.
    pub fn load<A: Address>(&mut self, start: A, program: &[u8]) -> Result<(), MemoryError> {
        let start = start.to_address();
        let begin = start as usize;
        if begin + program.len() > MEMORY_SIZE {
            return Err(MemoryError::ProgramTooLarge {
                start,
                size: program.len(),
            });
        }

        self.cells[begin..begin + program.len()].copy_from_slice(program);
        Ok(())
    }

    /// Dump memory contents (for debugging). Stops at the end of the
    /// address space rather than wrapping.
    pub fn dump<A: Address>(&self, start: A, count: usize) -> Vec<(u16, u8)> {
        let begin = start.to_address() as usize;
        let end = (begin + count).min(MEMORY_SIZE);
        (begin..end).map(|i| (i as u16, self.cells[i])).collect()
    }

    /// Whether every cell reads zero.
    pub fn is_clear(&self) -> bool {
        self.cells.iter().all(|&b| b == 0)
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<Vec<u8>> for Memory {
    type Error = MemoryError;

    fn try_from(cells: Vec<u8>) -> Result<Self, MemoryError> {
        if cells.len() != MEMORY_SIZE {
            return Err(MemoryError::WrongSize(cells.len()));
        }
        Ok(Self { cells })
    }
}

impl From<Memory> for Vec<u8> {
    fn from(mem: Memory) -> Self {
        mem.cells
    }
}

impl<A: Address> Index<A> for Memory {
    type Output = u8;

    fn index(&self, addr: A) -> &u8 {
        &self.cells[addr.to_address() as usize]
    }
}

impl<A: Address> IndexMut<A> for Memory {
    fn index_mut(&mut self, addr: A) -> &mut u8 {
        &mut self.cells[addr.to_address() as usize]
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let non_zero = self.cells.iter().filter(|&&b| b != 0).count();

        f.debug_struct("Memory")
            .field("non_zero_cells", &non_zero)
            .field("total_cells", &MEMORY_SIZE)
            .finish()
    }
}

/// Errors that can occur during bulk memory operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("program of {size} bytes at ${start:04X} runs past the end of memory")]
    ProgramTooLarge { start: u16, size: usize },

    #[error("memory image has {0} bytes, expected {}", MEMORY_SIZE)]
    WrongSize(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_read_write() {
        let mut mem = Memory::new();
        mem.write(0x1234u16, 0x42);
        assert_eq!(mem.read(0x1234u16), 0x42);
        assert_eq!(mem[0x1234u16], 0x42);
    }

    #[test]
    fn test_address_truncates() {
        let mut mem = Memory::new();
        mem[0x1_0010u32] = 0x99;
        assert_eq!(mem.read(0x0010u16), 0x99);
        assert_eq!(mem[-1i32], mem[0xFFFFu16]);
    }

    #[test]
    fn test_read_word_little_endian() {
        let mut mem = Memory::new();
        mem[0x10u8] = 0x34;
        mem[0x11u8] = 0x12;
        assert_eq!(mem.read_word(0x10u8), 0x1234);

        // high byte wraps to 0x0000
        mem[0xFFFFu16] = 0xCD;
        mem[0x0000u16] = 0xAB;
        assert_eq!(mem.read_word(0xFFFFu16), 0xABCD);
    }

    #[test]
    fn test_load_program() {
        let mut mem = Memory::new();
        mem.load(0x0600u16, &[0xA9, 0x01, 0x20]).unwrap();
        assert_eq!(mem.dump(0x0600u16, 3), vec![(0x0600, 0xA9), (0x0601, 0x01), (0x0602, 0x20)]);
    }

    #[test]
    fn test_load_program_too_large() {
        let mut mem = Memory::new();
        let err = mem.load(0xFFFEu16, &[1, 2, 3]).unwrap_err();
        assert_eq!(err, MemoryError::ProgramTooLarge { start: 0xFFFE, size: 3 });
        assert!(mem.is_clear());
    }

    #[test]
    fn test_deserialize_rejects_short_image() {
        let result: Result<Memory, _> = serde_json::from_str("[1,2,3]");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("memory image has 3 bytes"));

        assert_eq!(Memory::try_from(vec![0; 3]), Err(MemoryError::WrongSize(3)));
    }

    #[test]
    fn test_serialize_full_image() {
        let mut mem = Memory::new();
        mem[0xFFFCu16] = 0xA9;

        let json = serde_json::to_string(&mem).unwrap();
        let back: Memory = serde_json::from_str(&json).unwrap();
        assert_eq!(back.read(0xFFFCu16), 0xA9);
        assert_eq!(back, mem);
    }

    #[test]
    fn test_clear() {
        let mut mem = Memory::new();
        mem[0x8000u16] = 1;
        assert!(!mem.is_clear());
        mem.clear();
        assert!(mem.is_clear());
    }
}
