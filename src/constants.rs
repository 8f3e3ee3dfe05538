use super::{DoubleWord, Word};
use std::mem;

pub const WORD_BYTES: u32 = mem::size_of::<Word>() as u32;
pub const DOUBLE_WORD_BYTES: u32 = mem::size_of::<DoubleWord>() as u32;

/// Every instruction occupies one word.
pub const INSTRUCTION_BYTES: u32 = WORD_BYTES;

/// Byte-addressable memory size (2^21).
pub const MEMORY_SIZE: usize = 1 << 21;

pub const REGISTER_COUNT: usize = 31;
/// Register index that encodes the zero register in every family.
pub const ZERO_REGISTER: u32 = 31;

/// Encoding of `and x0, x0, x0`; fetching it terminates execution.
pub const HALT_INSTRUCTION: Word = 0x8A00_0000;

// Register fields. The same positions carry rt/xn/xm in the data
// transfer layouts.
pub const RD_MASK: Word = 0b0000_0000_0000_0000_0000_0000_0001_1111;
pub const RN_MASK: Word = 0b0000_0000_0000_0000_0000_0011_1110_0000;
pub const RM_MASK: Word = 0b0000_0000_0001_1111_0000_0000_0000_0000;
pub const RA_MASK: Word = 0b0000_0000_0000_0000_0111_1100_0000_0000;

pub const RD_OFFSET: u32 = 0;
pub const RN_OFFSET: u32 = 5;
pub const RM_OFFSET: u32 = 16;
pub const RA_OFFSET: u32 = 10;

// Shared high bits of the data processing layouts.
pub const SF_MASK: Word = 0b1000_0000_0000_0000_0000_0000_0000_0000;
pub const OP_MASK: Word = 0b0100_0000_0000_0000_0000_0000_0000_0000;
pub const FLAGS_MASK: Word = 0b0010_0000_0000_0000_0000_0000_0000_0000;
pub const OPC_MASK: Word = 0b0110_0000_0000_0000_0000_0000_0000_0000;
pub const OPC_OFFSET: u32 = 29;

// Data processing (immediate): op0 at bits 28:26, opi at bits 25:23.
pub const DP_IMM_OP0_MASK: Word = 0b0001_1100_0000_0000_0000_0000_0000_0000;
pub const DP_IMM_OP0_OFFSET: u32 = 26;
pub const DP_IMM_OP0: Word = 0b100;
pub const OPI_MASK: Word = 0b0000_0011_1000_0000_0000_0000_0000_0000;
pub const OPI_OFFSET: u32 = 23;
pub const OPI_ARITHMETIC: Word = 0b010;
pub const OPI_WIDE_MOVE: Word = 0b101;

pub const SH_MASK: Word = 0b0000_0000_0100_0000_0000_0000_0000_0000;
pub const IMM12_MASK: Word = 0b0000_0000_0011_1111_1111_1100_0000_0000;
pub const IMM12_OFFSET: u32 = 10;
pub const IMM16_MASK: Word = 0b0000_0000_0001_1111_1111_1111_1110_0000;
pub const IMM16_OFFSET: u32 = 5;
pub const HW_MASK: Word = 0b0000_0000_0110_0000_0000_0000_0000_0000;
pub const HW_OFFSET: u32 = 21;

// Data processing (register): op0 at bits 27:25, M at bit 28, id at
// bit 24 (arithmetic when set, logic when clear).
pub const DP_REG_OP0_MASK: Word = 0b0000_1110_0000_0000_0000_0000_0000_0000;
pub const DP_REG_OP0_OFFSET: u32 = 25;
pub const DP_REG_OP0: Word = 0b101;
pub const M_MASK: Word = 0b0001_0000_0000_0000_0000_0000_0000_0000;
pub const REG_ID_MASK: Word = 0b0000_0001_0000_0000_0000_0000_0000_0000;

pub const SHIFT_KIND_MASK: Word = 0b0000_0000_1100_0000_0000_0000_0000_0000;
pub const SHIFT_KIND_OFFSET: u32 = 22;
pub const SHIFT_AMOUNT_MASK: Word = 0b0000_0000_0000_0000_1111_1100_0000_0000;
pub const SHIFT_AMOUNT_OFFSET: u32 = 10;
pub const N_MASK: Word = 0b0000_0000_0010_0000_0000_0000_0000_0000;
pub const X_MASK: Word = 0b0000_0000_0000_0000_1000_0000_0000_0000;

// Data transfer: class is bit 27 set with bit 25 clear; bit 31 clear
// selects the load literal layout.
pub const DT_BIT_27_MASK: Word = 0b0000_1000_0000_0000_0000_0000_0000_0000;
pub const DT_BIT_25_MASK: Word = 0b0000_0010_0000_0000_0000_0000_0000_0000;
pub const DT_ID_MASK: Word = 0b1000_0000_0000_0000_0000_0000_0000_0000;
pub const DT_SF_MASK: Word = 0b0100_0000_0000_0000_0000_0000_0000_0000;
pub const DT_BASE: Word = 0b1011_1000_0000_0000_0000_0000_0000_0000;
pub const LOAD_LITERAL_BASE: Word = 0b0001_1000_0000_0000_0000_0000_0000_0000;

pub const L_MASK: Word = 0b0000_0000_0100_0000_0000_0000_0000_0000;
pub const U_MASK: Word = 0b0000_0001_0000_0000_0000_0000_0000_0000;
pub const REG_OFFSET_ID_MASK: Word = 0b0000_0000_0010_0000_0000_0000_0000_0000;
pub const REG_OFFSET_BITS: Word = 0b0000_0000_0000_0000_0110_1000_0000_0000;
pub const INDEX_I_MASK: Word = 0b0000_0000_0000_0000_0000_1000_0000_0000;
pub const INDEX_WB_MASK: Word = 0b0000_0000_0000_0000_0000_0100_0000_0000;
pub const SIMM9_MASK: Word = 0b0000_0000_0001_1111_1111_0000_0000_0000;
pub const SIMM9_OFFSET: u32 = 12;
pub const SIMM9_WIDTH: u32 = 9;

// simm19 sits at the same position in the conditional branch and load
// literal layouts.
pub const SIMM19_MASK: Word = 0b0000_0000_1111_1111_1111_1111_1110_0000;
pub const SIMM19_OFFSET: u32 = 5;
pub const SIMM19_WIDTH: u32 = 19;

// Branches: op0 at bits 28:26, id at bits 31:30.
pub const BRANCH_OP0_MASK: Word = 0b0001_1100_0000_0000_0000_0000_0000_0000;
pub const BRANCH_OP0_OFFSET: u32 = 26;
pub const BRANCH_OP0: Word = 0b101;
pub const BRANCH_ID_MASK: Word = 0b1100_0000_0000_0000_0000_0000_0000_0000;
pub const BRANCH_ID_OFFSET: u32 = 30;
pub const BRANCH_UNCONDITIONAL: Word = 0;
pub const BRANCH_CONDITIONAL: Word = 1;
pub const BRANCH_REGISTER: Word = 3;
pub const BRANCH_REG_BITS: Word = 0b0000_0010_0001_1111_0000_0000_0000_0000;

pub const SIMM26_MASK: Word = 0b0000_0011_1111_1111_1111_1111_1111_1111;
pub const SIMM26_OFFSET: u32 = 0;
pub const SIMM26_WIDTH: u32 = 26;

pub const COND_MASK: Word = 0b0000_0000_0000_0000_0000_0000_0000_1111;
pub const COND_OFFSET: u32 = 0;
