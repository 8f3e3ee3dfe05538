use crate::exec::{self, TickResult};
use crate::memory::Memory;
use crate::pstate::Pstate;
use crate::register::RegisterFile;
use crate::constants;

use std::error::Error as StdError;
use std::fmt;
use std::io::{self, Write};

/// Why a run stopped.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum ExitCode {
    Halted,             // The halt sentinel was fetched (normal shutdown)
    BadMemoryAccess,    // An access ran past the end of memory
    InvalidInstruction, // The fetched word decodes to no known layout
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ExitCode::Halted => f.write_str("halted"),
            ExitCode::BadMemoryAccess => f.write_str("memory access out of bounds"),
            ExitCode::InvalidInstruction => f.write_str("unknown instruction"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    InvalidProgram(usize),
    ProgramTooLarge(usize),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::InvalidProgram(len) => {
                write!(f, "program size {} is not a multiple of 4", len)
            }
            Error::ProgramTooLarge(len) => {
                write!(f, "program size {} exceeds memory", len)
            }
        }
    }
}

impl StdError for Error {}

/// The execution engine: register file, memory image and condition
/// flags, driven by [`step`](#method.step).
#[derive(Debug)]
pub struct Processor {
    registers: RegisterFile,
    memory: Memory,
    pstate: Pstate,
}

impl Processor {
    pub fn new() -> Processor {
        Processor {
            registers: RegisterFile::new(),
            memory: Memory::new(),
            pstate: Pstate::default(),
        }
    }

    /// Copies a raw program image to address 0. The image must be a
    /// whole number of instruction words and fit in memory.
    pub fn load_image(&mut self, image: &[u8]) -> Result<(), Error> {
        if image.len() % constants::INSTRUCTION_BYTES as usize != 0 {
            return Err(Error::InvalidProgram(image.len()));
        }
        self.memory
            .load(image)
            .map_err(|()| Error::ProgramTooLarge(image.len()))
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut RegisterFile {
        &mut self.registers
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn pstate(&self) -> &Pstate {
        &self.pstate
    }

    /// Fetches and executes one instruction.
    ///
    /// Returns `None` while the program is still running. Fetching the
    /// halt sentinel stops execution before it is executed; it encodes
    /// `and x0, x0, x0`, so the machine state is unaffected either way.
    pub fn step(&mut self) -> Option<ExitCode> {
        let program_counter = self.registers.pc();
        let word = match self.memory.read_word(program_counter) {
            Ok(word) => word,
            Err(()) => return Some(ExitCode::BadMemoryAccess),
        };

        if word == constants::HALT_INSTRUCTION {
            return Some(ExitCode::Halted);
        }

        match exec::tick(
            &mut self.registers,
            &mut self.memory,
            &mut self.pstate,
            word,
            program_counter,
        ) {
            TickResult::Next => {
                self.registers
                    .set_pc(program_counter.wrapping_add(u64::from(constants::INSTRUCTION_BYTES)));
                None
            }
            TickResult::Jump(target) => {
                self.registers.set_pc(target);
                None
            }
            TickResult::Stop(code) => Some(code),
        }
    }

    /// Runs until the program stops.
    pub fn run(&mut self) -> ExitCode {
        loop {
            if let Some(code) = self.step() {
                return code;
            }
        }
    }

    /// Writes the final state dump: every general register, PC, the
    /// flags, and all non-zero memory words.
    pub fn write_state<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "Registers:")?;
        for i in 0..constants::REGISTER_COUNT as u32 {
            writeln!(writer, "X{:02}    = {:016x}", i, self.registers.read_64(i))?;
        }
        writeln!(writer, "PC     = {:016x}", self.registers.pc())?;
        writeln!(writer, "PSTATE : {}", self.pstate)?;
        writeln!(writer, "Non-Zero Memory:")?;
        for (address, word) in self.memory.non_zero_words() {
            writeln!(writer, "0x{:08x}: {:08x}", address, word)?;
        }
        Ok(())
    }
}

impl Default for Processor {
    fn default() -> Processor {
        Processor::new()
    }
}
