pub mod constants;
pub mod insn;
pub mod memory;
pub mod processor;
pub mod pstate;
pub mod register;

mod exec;

#[cfg(test)]
mod test;

pub use crate::insn::{decode, patch_displacement, Cond, Instruction, LogicOp, ShiftKind, WideMoveOp};
pub use crate::memory::Memory;
pub use crate::processor::{Error, ExitCode, Processor};
pub use crate::pstate::Pstate;
pub use crate::register::RegisterFile;

/// One machine instruction, and the unit of 32-bit memory access.
pub type Word = u32;
/// The unit of 64-bit memory access.
pub type DoubleWord = u64;

pub type Endian = byteorder::LittleEndian;
