use crate::constants::*;
use crate::Word;
use num::{FromPrimitive, ToPrimitive};
use num_derive::{FromPrimitive, ToPrimitive};

/// Shift applied to a register operand. Encodes as LSL=0, LSR=1,
/// ASR=2, ROR=3.
#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive, ToPrimitive)]
pub enum ShiftKind {
    LSL,
    LSR,
    ASR,
    ROR,
}

/// Logic operation selected by the opc field of the register logic
/// layout. `ANDS` is an AND that also sets the flags.
#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive, ToPrimitive)]
pub enum LogicOp {
    AND,
    ORR,
    EOR,
    ANDS,
}

/// Wide move operation. The value 1 is unallocated.
#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive, ToPrimitive)]
pub enum WideMoveOp {
    MOVN = 0,
    MOVZ = 2,
    MOVK = 3,
}

/// Branch condition, evaluated against PSTATE.
#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive, ToPrimitive)]
pub enum Cond {
    EQ = 0,
    NE = 1,
    GE = 10,
    LT = 11,
    GT = 12,
    LE = 13,
    AL = 14,
}

/// A fully decoded instruction.
///
/// Each variant corresponds to one bit layout; [`decode`] is total over
/// the supported subset and returns `None` for anything else. Register
/// fields hold raw 5-bit indices (31 is the zero register), and signed
/// displacements are already sign-extended, in instruction units.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Instruction {
    /// `add|adds|sub|subs rd, rn, #imm12 {, lsl #12}`
    ImmArith {
        sf: bool,
        subtract: bool,
        set_flags: bool,
        sh: bool,
        imm12: Word,
        rn: Word,
        rd: Word,
    },
    /// `movn|movz|movk rd, #imm16 {, lsl #(16*hw)}`
    WideMove {
        sf: bool,
        opc: WideMoveOp,
        hw: Word,
        imm16: Word,
        rd: Word,
    },
    /// `add|adds|sub|subs rd, rn, rm {, shift #amount}`
    RegArith {
        sf: bool,
        subtract: bool,
        set_flags: bool,
        shift: ShiftKind,
        amount: Word,
        rm: Word,
        rn: Word,
        rd: Word,
    },
    /// `and|orr|eor|ands rd, rn, rm {, shift #amount}`, with `invert`
    /// selecting the negated forms `bic|orn|eon|bics`.
    RegLogic {
        sf: bool,
        opc: LogicOp,
        invert: bool,
        shift: ShiftKind,
        amount: Word,
        rm: Word,
        rn: Word,
        rd: Word,
    },
    /// `madd|msub rd, rn, rm, ra`
    Multiply {
        sf: bool,
        negate: bool,
        rm: Word,
        ra: Word,
        rn: Word,
        rd: Word,
    },
    /// `ldr|str rt, [xn {, #imm12}]` — unsigned scaled offset.
    ImmOffset {
        sf: bool,
        load: bool,
        imm12: Word,
        xn: Word,
        rt: Word,
    },
    /// `ldr|str rt, [xn, xm]`
    RegOffset {
        sf: bool,
        load: bool,
        xm: Word,
        xn: Word,
        rt: Word,
    },
    /// `ldr|str rt, [xn, #simm9]!` (pre) or `ldr|str rt, [xn], #simm9`
    /// (post).
    IndexOffset {
        sf: bool,
        load: bool,
        pre: bool,
        simm9: i32,
        xn: Word,
        rt: Word,
    },
    /// `ldr rt, <literal>` — PC-relative.
    LoadLiteral { sf: bool, simm19: i32, rt: Word },
    /// `b <literal>`
    Branch { simm26: i32 },
    /// `b.cond <literal>`
    BranchCond { cond: Cond, simm19: i32 },
    /// `br xn`
    BranchReg { xn: Word },
}

/// Interprets an N-bit field as a signed value.
pub fn sign_extend(bits: Word, width: u32) -> i32 {
    debug_assert!(width >= 1 && width < 32);
    ((bits << (32 - width)) as i32) >> (32 - width)
}

#[inline]
fn enum_to_word<T: ToPrimitive>(val: T) -> Word {
    val.to_u32().unwrap()
}

#[inline]
fn bit(set: bool, mask: Word) -> Word {
    if set {
        mask
    } else {
        0
    }
}

/// Decodes one instruction word.
///
/// The four families occupy disjoint bit patterns: branches have bits
/// 28:26 = `101`, data processing with immediates has bits 28:26 =
/// `100`, data processing with registers has bits 27:25 = `101`, and
/// data transfers have bit 27 set with bit 25 clear.
pub fn decode(word: Word) -> Option<Instruction> {
    if (word & BRANCH_OP0_MASK) >> BRANCH_OP0_OFFSET == BRANCH_OP0 {
        return decode_branch(word);
    }
    if (word & DP_IMM_OP0_MASK) >> DP_IMM_OP0_OFFSET == DP_IMM_OP0 {
        return decode_dp_immediate(word);
    }
    if (word & DP_REG_OP0_MASK) >> DP_REG_OP0_OFFSET == DP_REG_OP0 {
        return decode_dp_register(word);
    }
    if word & DT_BIT_27_MASK != 0 && word & DT_BIT_25_MASK == 0 {
        return decode_data_transfer(word);
    }
    None
}

fn decode_dp_immediate(word: Word) -> Option<Instruction> {
    let sf = word & SF_MASK != 0;
    let rd = word & RD_MASK;
    match (word & OPI_MASK) >> OPI_OFFSET {
        OPI_ARITHMETIC => Some(Instruction::ImmArith {
            sf,
            subtract: word & OP_MASK != 0,
            set_flags: word & FLAGS_MASK != 0,
            sh: word & SH_MASK != 0,
            imm12: (word & IMM12_MASK) >> IMM12_OFFSET,
            rn: (word & RN_MASK) >> RN_OFFSET,
            rd,
        }),
        OPI_WIDE_MOVE => Some(Instruction::WideMove {
            sf,
            opc: WideMoveOp::from_u32((word & OPC_MASK) >> OPC_OFFSET)?,
            hw: (word & HW_MASK) >> HW_OFFSET,
            imm16: (word & IMM16_MASK) >> IMM16_OFFSET,
            rd,
        }),
        _ => None,
    }
}

fn decode_dp_register(word: Word) -> Option<Instruction> {
    let sf = word & SF_MASK != 0;
    let rd = word & RD_MASK;
    let rn = (word & RN_MASK) >> RN_OFFSET;
    let rm = (word & RM_MASK) >> RM_OFFSET;

    if word & M_MASK != 0 {
        return Some(Instruction::Multiply {
            sf,
            negate: word & X_MASK != 0,
            rm,
            ra: (word & RA_MASK) >> RA_OFFSET,
            rn,
            rd,
        });
    }

    let shift = ShiftKind::from_u32((word & SHIFT_KIND_MASK) >> SHIFT_KIND_OFFSET)?;
    let amount = (word & SHIFT_AMOUNT_MASK) >> SHIFT_AMOUNT_OFFSET;

    if word & REG_ID_MASK != 0 {
        Some(Instruction::RegArith {
            sf,
            subtract: word & OP_MASK != 0,
            set_flags: word & FLAGS_MASK != 0,
            shift,
            amount,
            rm,
            rn,
            rd,
        })
    } else {
        Some(Instruction::RegLogic {
            sf,
            opc: LogicOp::from_u32((word & OPC_MASK) >> OPC_OFFSET)?,
            invert: word & N_MASK != 0,
            shift,
            amount,
            rm,
            rn,
            rd,
        })
    }
}

fn decode_data_transfer(word: Word) -> Option<Instruction> {
    let sf = word & DT_SF_MASK != 0;
    let rt = word & RD_MASK;

    if word & DT_ID_MASK == 0 {
        return Some(Instruction::LoadLiteral {
            sf,
            simm19: sign_extend((word & SIMM19_MASK) >> SIMM19_OFFSET, SIMM19_WIDTH),
            rt,
        });
    }

    let load = word & L_MASK != 0;
    let xn = (word & RN_MASK) >> RN_OFFSET;

    if word & U_MASK != 0 {
        return Some(Instruction::ImmOffset {
            sf,
            load,
            imm12: (word & IMM12_MASK) >> IMM12_OFFSET,
            xn,
            rt,
        });
    }
    if word & REG_OFFSET_ID_MASK != 0 {
        return Some(Instruction::RegOffset {
            sf,
            load,
            xm: (word & RM_MASK) >> RM_OFFSET,
            xn,
            rt,
        });
    }
    Some(Instruction::IndexOffset {
        sf,
        load,
        pre: word & INDEX_I_MASK != 0,
        simm9: sign_extend((word & SIMM9_MASK) >> SIMM9_OFFSET, SIMM9_WIDTH),
        xn,
        rt,
    })
}

fn decode_branch(word: Word) -> Option<Instruction> {
    match (word & BRANCH_ID_MASK) >> BRANCH_ID_OFFSET {
        BRANCH_UNCONDITIONAL => Some(Instruction::Branch {
            simm26: sign_extend(word & SIMM26_MASK, SIMM26_WIDTH),
        }),
        BRANCH_CONDITIONAL => Some(Instruction::BranchCond {
            cond: Cond::from_u32(word & COND_MASK)?,
            simm19: sign_extend((word & SIMM19_MASK) >> SIMM19_OFFSET, SIMM19_WIDTH),
        }),
        BRANCH_REGISTER => Some(Instruction::BranchReg {
            xn: (word & RN_MASK) >> RN_OFFSET,
        }),
        _ => None,
    }
}

/// Constructs an immediate arithmetic instruction.
pub fn make_imm_arith(
    sf: bool,
    subtract: bool,
    set_flags: bool,
    rd: Word,
    rn: Word,
    imm12: Word,
    sh: bool,
) -> Word {
    bit(sf, SF_MASK)
        | bit(subtract, OP_MASK)
        | bit(set_flags, FLAGS_MASK)
        | (DP_IMM_OP0 << DP_IMM_OP0_OFFSET)
        | (OPI_ARITHMETIC << OPI_OFFSET)
        | bit(sh, SH_MASK)
        | ((imm12 << IMM12_OFFSET) & IMM12_MASK)
        | ((rn << RN_OFFSET) & RN_MASK)
        | (rd & RD_MASK)
}

/// Constructs a wide move instruction.
pub fn make_wide_move(sf: bool, opc: WideMoveOp, rd: Word, imm16: Word, hw: Word) -> Word {
    bit(sf, SF_MASK)
        | (enum_to_word(opc) << OPC_OFFSET)
        | (DP_IMM_OP0 << DP_IMM_OP0_OFFSET)
        | (OPI_WIDE_MOVE << OPI_OFFSET)
        | ((hw << HW_OFFSET) & HW_MASK)
        | ((imm16 << IMM16_OFFSET) & IMM16_MASK)
        | (rd & RD_MASK)
}

/// Constructs a register arithmetic instruction.
pub fn make_reg_arith(
    sf: bool,
    subtract: bool,
    set_flags: bool,
    rd: Word,
    rn: Word,
    rm: Word,
    shift: ShiftKind,
    amount: Word,
) -> Word {
    bit(sf, SF_MASK)
        | bit(subtract, OP_MASK)
        | bit(set_flags, FLAGS_MASK)
        | (DP_REG_OP0 << DP_REG_OP0_OFFSET)
        | REG_ID_MASK
        | (enum_to_word(shift) << SHIFT_KIND_OFFSET)
        | ((amount << SHIFT_AMOUNT_OFFSET) & SHIFT_AMOUNT_MASK)
        | ((rm << RM_OFFSET) & RM_MASK)
        | ((rn << RN_OFFSET) & RN_MASK)
        | (rd & RD_MASK)
}

/// Constructs a register logic instruction.
pub fn make_reg_logic(
    sf: bool,
    opc: LogicOp,
    invert: bool,
    rd: Word,
    rn: Word,
    rm: Word,
    shift: ShiftKind,
    amount: Word,
) -> Word {
    bit(sf, SF_MASK)
        | (enum_to_word(opc) << OPC_OFFSET)
        | (DP_REG_OP0 << DP_REG_OP0_OFFSET)
        | bit(invert, N_MASK)
        | (enum_to_word(shift) << SHIFT_KIND_OFFSET)
        | ((amount << SHIFT_AMOUNT_OFFSET) & SHIFT_AMOUNT_MASK)
        | ((rm << RM_OFFSET) & RM_MASK)
        | ((rn << RN_OFFSET) & RN_MASK)
        | (rd & RD_MASK)
}

/// Constructs a multiply instruction (`madd` or, with `negate`,
/// `msub`).
pub fn make_multiply(sf: bool, negate: bool, rd: Word, rn: Word, rm: Word, ra: Word) -> Word {
    bit(sf, SF_MASK)
        | M_MASK
        | (DP_REG_OP0 << DP_REG_OP0_OFFSET)
        | REG_ID_MASK
        | ((rm << RM_OFFSET) & RM_MASK)
        | bit(negate, X_MASK)
        | ((ra << RA_OFFSET) & RA_MASK)
        | ((rn << RN_OFFSET) & RN_MASK)
        | (rd & RD_MASK)
}

/// Constructs an unsigned immediate offset load or store. `imm12` is
/// already scaled to access units.
pub fn make_imm_offset(sf: bool, load: bool, rt: Word, xn: Word, imm12: Word) -> Word {
    DT_BASE
        | bit(sf, DT_SF_MASK)
        | U_MASK
        | bit(load, L_MASK)
        | ((imm12 << IMM12_OFFSET) & IMM12_MASK)
        | ((xn << RN_OFFSET) & RN_MASK)
        | (rt & RD_MASK)
}

/// Constructs a register offset load or store.
pub fn make_reg_offset(sf: bool, load: bool, rt: Word, xn: Word, xm: Word) -> Word {
    DT_BASE
        | bit(sf, DT_SF_MASK)
        | bit(load, L_MASK)
        | REG_OFFSET_ID_MASK
        | REG_OFFSET_BITS
        | ((xm << RM_OFFSET) & RM_MASK)
        | ((xn << RN_OFFSET) & RN_MASK)
        | (rt & RD_MASK)
}

/// Constructs a pre- or post-indexed load or store.
pub fn make_index_offset(sf: bool, load: bool, pre: bool, rt: Word, xn: Word, simm9: i32) -> Word {
    DT_BASE
        | bit(sf, DT_SF_MASK)
        | bit(load, L_MASK)
        | INDEX_WB_MASK
        | bit(pre, INDEX_I_MASK)
        | (((simm9 as Word) << SIMM9_OFFSET) & SIMM9_MASK)
        | ((xn << RN_OFFSET) & RN_MASK)
        | (rt & RD_MASK)
}

/// Constructs a PC-relative load literal. `simm19` is in instruction
/// units.
pub fn make_load_literal(sf: bool, rt: Word, simm19: i32) -> Word {
    LOAD_LITERAL_BASE
        | bit(sf, DT_SF_MASK)
        | (((simm19 as Word) << SIMM19_OFFSET) & SIMM19_MASK)
        | (rt & RD_MASK)
}

/// Constructs an unconditional branch. `simm26` is in instruction
/// units.
pub fn make_branch(simm26: i32) -> Word {
    (BRANCH_OP0 << BRANCH_OP0_OFFSET)
        | (BRANCH_UNCONDITIONAL << BRANCH_ID_OFFSET)
        | ((simm26 as Word) & SIMM26_MASK)
}

/// Constructs a conditional branch. `simm19` is in instruction units.
pub fn make_branch_cond(cond: Cond, simm19: i32) -> Word {
    (BRANCH_OP0 << BRANCH_OP0_OFFSET)
        | (BRANCH_CONDITIONAL << BRANCH_ID_OFFSET)
        | (((simm19 as Word) << SIMM19_OFFSET) & SIMM19_MASK)
        | (enum_to_word(cond) & COND_MASK)
}

/// Constructs a register branch.
pub fn make_branch_reg(xn: Word) -> Word {
    (BRANCH_OP0 << BRANCH_OP0_OFFSET)
        | (BRANCH_REGISTER << BRANCH_ID_OFFSET)
        | BRANCH_REG_BITS
        | ((xn << RN_OFFSET) & RN_MASK)
}

/// Rewrites the PC-relative displacement of an already emitted word.
///
/// Exactly three layouts carry such a displacement: the simm26 of an
/// unconditional branch, and the simm19 of a conditional branch or a
/// load literal. Returns `None` for any other word.
pub fn patch_displacement(word: Word, offset: i32) -> Option<Word> {
    match decode(word)? {
        Instruction::Branch { .. } => Some((word & !SIMM26_MASK) | ((offset as Word) & SIMM26_MASK)),
        Instruction::BranchCond { .. } | Instruction::LoadLiteral { .. } => {
            Some((word & !SIMM19_MASK) | (((offset as Word) << SIMM19_OFFSET) & SIMM19_MASK))
        }
        _ => None,
    }
}
