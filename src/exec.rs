use crate::insn::{self, Instruction, LogicOp, ShiftKind, WideMoveOp};
use crate::memory::Memory;
use crate::processor::ExitCode;
use crate::pstate::Pstate;
use crate::register::RegisterFile;
use crate::{constants, Word};

pub enum TickResult {
    Next,
    Jump(u64),
    Stop(ExitCode),
}

fn apply_shift_64(operand: u64, amount: u32, kind: ShiftKind) -> u64 {
    let amount = amount % 64;
    match kind {
        ShiftKind::LSL => operand << amount,
        ShiftKind::LSR => operand >> amount,
        ShiftKind::ASR => ((operand as i64) >> amount) as u64,
        ShiftKind::ROR => operand.rotate_right(amount),
    }
}

fn apply_shift_32(operand: u32, amount: u32, kind: ShiftKind) -> u32 {
    let amount = amount % 32;
    match kind {
        ShiftKind::LSL => operand << amount,
        ShiftKind::LSR => operand >> amount,
        ShiftKind::ASR => ((operand as i32) >> amount) as u32,
        ShiftKind::ROR => operand.rotate_right(amount),
    }
}

// V is derived from the operand/result sign pattern: an addition
// overflows when both operands share a sign the result lacks, a
// subtraction when the operands differ and the result leaves the
// minuend's sign.
fn signed_overflow(src_negative: bool, op2_negative: bool, result_negative: bool, subtract: bool) -> bool {
    if subtract {
        src_negative != op2_negative && result_negative != src_negative
    } else {
        src_negative == op2_negative && result_negative != src_negative
    }
}

fn arithmetic_64(
    registers: &mut RegisterFile,
    pstate: &mut Pstate,
    src: u64,
    operand2: u64,
    rd: Word,
    set_flags: bool,
    subtract: bool,
) {
    let (result, carry) = if subtract {
        (src.wrapping_sub(operand2), src >= operand2)
    } else {
        let (sum, carried) = src.overflowing_add(operand2);
        (sum, carried)
    };

    if set_flags {
        pstate.negative = (result as i64) < 0;
        pstate.zero = result == 0;
        pstate.carry = carry;
        pstate.overflow = signed_overflow(
            (src as i64) < 0,
            (operand2 as i64) < 0,
            (result as i64) < 0,
            subtract,
        );
    }

    registers.write(rd, result);
}

fn arithmetic_32(
    registers: &mut RegisterFile,
    pstate: &mut Pstate,
    src: u32,
    operand2: u32,
    rd: Word,
    set_flags: bool,
    subtract: bool,
) {
    let (result, carry) = if subtract {
        (src.wrapping_sub(operand2), src >= operand2)
    } else {
        let (sum, carried) = src.overflowing_add(operand2);
        (sum, carried)
    };

    if set_flags {
        pstate.negative = (result as i32) < 0;
        pstate.zero = result == 0;
        pstate.carry = carry;
        pstate.overflow = signed_overflow(
            (src as i32) < 0,
            (operand2 as i32) < 0,
            (result as i32) < 0,
            subtract,
        );
    }

    registers.write(rd, u64::from(result));
}

fn transfer(
    registers: &mut RegisterFile,
    memory: &mut Memory,
    rt: Word,
    address: u64,
    sf: bool,
    load: bool,
) -> TickResult {
    let ok = if load {
        if sf {
            memory
                .read_double_word(address)
                .map(|v| registers.write(rt, v))
                .is_ok()
        } else {
            // 32-bit loads zero-extend into the full register.
            memory
                .read_word(address)
                .map(|v| registers.write(rt, u64::from(v)))
                .is_ok()
        }
    } else if sf {
        memory
            .write_double_word(address, registers.read_64(rt))
            .is_ok()
    } else {
        memory.write_word(address, registers.read_32(rt)).is_ok()
    };

    if ok {
        TickResult::Next
    } else {
        TickResult::Stop(ExitCode::BadMemoryAccess)
    }
}

fn branch_target(program_counter: u64, units: i32) -> u64 {
    let offset = i64::from(units) * i64::from(constants::INSTRUCTION_BYTES);
    program_counter.wrapping_add(offset as u64)
}

/// Executes one already fetched instruction word.
pub fn tick(
    registers: &mut RegisterFile,
    memory: &mut Memory,
    pstate: &mut Pstate,
    word: Word,
    program_counter: u64,
) -> TickResult {
    let inst = match insn::decode(word) {
        Some(inst) => inst,
        None => return TickResult::Stop(ExitCode::InvalidInstruction),
    };

    match inst {
        Instruction::ImmArith {
            sf,
            subtract,
            set_flags,
            sh,
            imm12,
            rn,
            rd,
        } => {
            let operand2 = if sh { imm12 << 12 } else { imm12 };
            if sf {
                let src = registers.read_64(rn);
                arithmetic_64(registers, pstate, src, u64::from(operand2), rd, set_flags, subtract);
            } else {
                let src = registers.read_32(rn);
                arithmetic_32(registers, pstate, src, operand2, rd, set_flags, subtract);
            }
        }

        Instruction::RegArith {
            sf,
            subtract,
            set_flags,
            shift,
            amount,
            rm,
            rn,
            rd,
        } => {
            if sf {
                let operand2 = apply_shift_64(registers.read_64(rm), amount, shift);
                let src = registers.read_64(rn);
                arithmetic_64(registers, pstate, src, operand2, rd, set_flags, subtract);
            } else {
                let operand2 = apply_shift_32(registers.read_32(rm), amount, shift);
                let src = registers.read_32(rn);
                arithmetic_32(registers, pstate, src, operand2, rd, set_flags, subtract);
            }
        }

        Instruction::RegLogic {
            sf,
            opc,
            invert,
            shift,
            amount,
            rm,
            rn,
            rd,
        } => {
            if sf {
                let mut operand2 = apply_shift_64(registers.read_64(rm), amount, shift);
                if invert {
                    operand2 = !operand2;
                }
                let src = registers.read_64(rn);
                let result = match opc {
                    LogicOp::AND | LogicOp::ANDS => src & operand2,
                    LogicOp::ORR => src | operand2,
                    LogicOp::EOR => src ^ operand2,
                };
                if opc == LogicOp::ANDS {
                    pstate.negative = (result as i64) < 0;
                    pstate.zero = result == 0;
                    pstate.carry = false;
                    pstate.overflow = false;
                }
                registers.write(rd, result);
            } else {
                let mut operand2 = apply_shift_32(registers.read_32(rm), amount, shift);
                if invert {
                    operand2 = !operand2;
                }
                let src = registers.read_32(rn);
                let result = match opc {
                    LogicOp::AND | LogicOp::ANDS => src & operand2,
                    LogicOp::ORR => src | operand2,
                    LogicOp::EOR => src ^ operand2,
                };
                if opc == LogicOp::ANDS {
                    pstate.negative = (result as i32) < 0;
                    pstate.zero = result == 0;
                    pstate.carry = false;
                    pstate.overflow = false;
                }
                registers.write(rd, u64::from(result));
            }
        }

        Instruction::WideMove {
            sf,
            opc,
            hw,
            imm16,
            rd,
        } => {
            let position = 16 * hw;
            let shifted = u64::from(imm16) << position;
            let result = match opc {
                WideMoveOp::MOVZ => shifted,
                WideMoveOp::MOVN => !shifted,
                WideMoveOp::MOVK => {
                    (registers.read_64(rd) & !(0xFFFFu64 << position)) | shifted
                }
            };
            let result = if sf { result } else { result & 0xFFFF_FFFF };
            registers.write(rd, result);
        }

        Instruction::Multiply {
            sf,
            negate,
            rm,
            ra,
            rn,
            rd,
        } => {
            if sf {
                let product = registers.read_64(rn).wrapping_mul(registers.read_64(rm));
                let acc = registers.read_64(ra);
                let result = if negate {
                    acc.wrapping_sub(product)
                } else {
                    acc.wrapping_add(product)
                };
                registers.write(rd, result);
            } else {
                let product = registers.read_32(rn).wrapping_mul(registers.read_32(rm));
                let acc = registers.read_32(ra);
                let result = if negate {
                    acc.wrapping_sub(product)
                } else {
                    acc.wrapping_add(product)
                };
                registers.write(rd, u64::from(result));
            }
        }

        Instruction::ImmOffset {
            sf,
            load,
            imm12,
            xn,
            rt,
        } => {
            let scale = if sf {
                constants::DOUBLE_WORD_BYTES
            } else {
                constants::WORD_BYTES
            };
            let address = registers
                .read_64(xn)
                .wrapping_add(u64::from(imm12) * u64::from(scale));
            return transfer(registers, memory, rt, address, sf, load);
        }

        Instruction::RegOffset {
            sf,
            load,
            xm,
            xn,
            rt,
        } => {
            let address = registers.read_64(xn).wrapping_add(registers.read_64(xm));
            return transfer(registers, memory, rt, address, sf, load);
        }

        Instruction::IndexOffset {
            sf,
            load,
            pre,
            simm9,
            xn,
            rt,
        } => {
            let base = registers.read_64(xn);
            let updated = base.wrapping_add(i64::from(simm9) as u64);
            let address = if pre { updated } else { base };
            if pre {
                registers.write(xn, updated);
            }
            if let TickResult::Stop(code) = transfer(registers, memory, rt, address, sf, load) {
                return TickResult::Stop(code);
            }
            if !pre {
                registers.write(xn, updated);
            }
        }

        Instruction::LoadLiteral { sf, simm19, rt } => {
            let address = branch_target(program_counter, simm19);
            return transfer(registers, memory, rt, address, sf, true);
        }

        Instruction::Branch { simm26 } => {
            return TickResult::Jump(branch_target(program_counter, simm26));
        }

        Instruction::BranchCond { cond, simm19 } => {
            if pstate.holds(cond) {
                return TickResult::Jump(branch_target(program_counter, simm19));
            }
        }

        Instruction::BranchReg { xn } => {
            return TickResult::Jump(registers.read_64(xn));
        }
    }

    TickResult::Next
}
