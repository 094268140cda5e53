//! Disassembler.
//!
//! Converts opcode bytes in memory back to readable assembly.

use crate::cpu::decode::decode;
use crate::cpu::Memory;

/// Disassemble the instruction at `addr`.
///
/// Returns the text and the instruction length in bytes. Undecodable bytes
/// come back as a one-byte `.byte` directive.
pub fn disassemble_at(mem: &Memory, addr: u16) -> (String, u16) {
    let opcode = mem.read(addr);
    let Some((instruction, mode)) = decode(opcode) else {
        return (format!(".byte ${:02X}", opcode), 1);
    };

    let operand = match mode.operand_len() {
        0 => 0,
        1 => mem.read(addr.wrapping_add(1)) as u16,
        _ => mem.read_word(addr.wrapping_add(1)),
    };
    let text = match mode.format_operand(operand) {
        operand if operand.is_empty() => instruction.mnemonic().to_string(),
        operand => format!("{} {}", instruction, operand),
    };

    (text, 1 + mode.operand_len())
}

/// Disassemble `count` instructions starting at `start`.
pub fn disassemble(mem: &Memory, start: u16, count: usize) -> String {
    let mut output = String::new();
    let mut addr = start;

    for _ in 0..count {
        let (text, len) = disassemble_at(mem, addr);
        let bytes: Vec<String> = (0..len)
            .map(|i| format!("{:02X}", mem.read(addr.wrapping_add(i))))
            .collect();
        output.push_str(&format!("${:04X}: {:<9} {}\n", addr, bytes.join(" "), text));
        addr = addr.wrapping_add(len);
    }

    output
}
