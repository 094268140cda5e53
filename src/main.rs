//! MOS 6502 Core - demonstration entry point
//!
//! Loads a tiny built-in program at the reset vector, runs it, and prints
//! the resulting CPU state. `RUST_LOG=trace` shows every executed
//! instruction.

use clap::{Parser, ValueEnum};
use mos6502_core::{disassemble, encode, AddressingMode, Cpu, CpuError, Instruction};
use std::process;

#[derive(Parser)]
#[command(name = "mos6502-core")]
#[command(version)]
#[command(about = "Runs a built-in program on the 6502 execution core")]
struct Cli {
    /// Which built-in program to run
    #[arg(value_enum, default_value_t = Demo::IndirectY)]
    demo: Demo,
    /// Override the program's cycle budget
    #[arg(short, long)]
    cycles: Option<u32>,
    /// Print the final registers as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Demo {
    /// LDA #$42
    Immediate,
    /// LDA ($10),Y through a pointer to $9000 with Y=4
    IndirectY,
    /// JSR $9000
    Subroutine,
}

impl Demo {
    /// Poke the program into memory and return its cycle budget.
    fn load(self, cpu: &mut Cpu) -> u32 {
        let mem = &mut cpu.mem;
        match self {
            Demo::Immediate => {
                mem[0xFFFCu16] = encode(Instruction::Lda, AddressingMode::Immediate);
                mem[0xFFFDu16] = 0x42;
                2
            }
            Demo::IndirectY => {
                cpu.regs.y = 0x04;
                mem[0xFFFCu16] = encode(Instruction::Lda, AddressingMode::IndirectY);
                mem[0xFFFDu16] = 0x10;
                mem[0x0010u16] = 0x00;
                mem[0x0011u16] = 0x90;
                mem[0x9004u16] = 0xAB;
                5
            }
            Demo::Subroutine => {
                mem[0xFFFCu16] = encode(Instruction::Jsr, AddressingMode::Absolute);
                mem[0xFFFDu16] = 0x00;
                mem[0xFFFEu16] = 0x90;
                6
            }
        }
    }
}

/// Load `demo` into a fresh CPU and run it.
fn run_demo(demo: Demo, cycles: Option<u32>, show_program: bool) -> (Cpu, Result<(), CpuError>) {
    let mut cpu = Cpu::new();
    let budget = demo.load(&mut cpu);
    let budget = cycles.unwrap_or(budget);

    if show_program {
        println!("━━━ Program ━━━");
        print!("{}", disassemble(&cpu.mem, cpu.regs.pc, 1));
        println!();
    }

    let result = cpu.execute(budget);
    (cpu, result)
}

/// Process exit status for a finished run.
fn exit_code(result: &Result<(), CpuError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(_) => 1,
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let (cpu, result) = run_demo(cli.demo, cli.cycles, !cli.json);

    if cli.json {
        match serde_json::to_string_pretty(&cpu.regs) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("error: failed to serialize registers: {}", e);
                process::exit(1);
            }
        }
    } else {
        println!("━━━ Result ({} cycles) ━━━", cpu.cycles());
        println!("{}", cpu);
    }

    if let Err(e) = &result {
        eprintln!("error: CPU error at PC=${:04X}: {}", cpu.regs.pc, e);
        process::exit(exit_code(&result));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demos_run_cleanly() {
        for demo in [Demo::Immediate, Demo::IndirectY, Demo::Subroutine] {
            let (_, result) = run_demo(demo, None, false);
            assert_eq!(exit_code(&result), 0);
        }
    }

    #[test]
    fn test_cpu_error_fails_the_run() {
        // past the JSR the CPU lands on zeroed memory at $9000
        let (cpu, result) = run_demo(Demo::Subroutine, Some(7), false);
        assert_eq!(result, Err(CpuError::UnknownOpcode(0x00)));
        assert_eq!(cpu.regs.pc, 0x9001);
        assert_eq!(exit_code(&result), 1);
    }
}
