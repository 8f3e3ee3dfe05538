use crate::parser::{AddrOffset, Operand, Reg};
use crate::symbols::SymbolTable;
use crate::{new_parser_error, Result};
use a64::constants::{DOUBLE_WORD_BYTES, INSTRUCTION_BYTES, WORD_BYTES, ZERO_REGISTER};
use a64::insn::{
    make_branch, make_branch_cond, make_branch_reg, make_imm_arith, make_imm_offset,
    make_index_offset, make_load_literal, make_multiply, make_reg_arith, make_reg_logic,
    make_reg_offset, make_wide_move, Cond, LogicOp, ShiftKind, WideMoveOp,
};
use a64::Word;
use pest::Span;

/// Encodes one canonical statement into an instruction word.
///
/// `address` is the byte address the word will occupy; label operands
/// resolve through `symbols`, registering a pending patch when the
/// label is still unknown.
pub fn encode<'i>(
    span: Span<'i>,
    mnemonic: &str,
    operands: &[Operand<'i>],
    symbols: &mut SymbolTable<'i>,
    address: u32,
) -> Result<Word> {
    match mnemonic {
        ".int" => encode_int(span, operands),
        "add" | "adds" | "sub" | "subs" => encode_add_sub(span, mnemonic, operands),
        "madd" | "msub" => encode_multiply(span, mnemonic, operands),
        "and" | "ands" | "bic" | "bics" | "orr" | "orn" | "eor" | "eon" => {
            encode_logic(span, mnemonic, operands)
        }
        "movn" | "movz" | "movk" => encode_wide_move(span, mnemonic, operands),
        "ldr" | "str" => encode_load_store(span, mnemonic, operands, symbols, address),
        "b" | "br" => encode_branch(span, mnemonic, operands, symbols, address),
        m if m.starts_with("b.") => encode_branch(span, mnemonic, operands, symbols, address),
        _ => Err(new_parser_error(
            span,
            format!("unknown mnemonic \"{}\"", mnemonic),
        )),
    }
}

// The width bit comes from the first operand, unless that is the zero
// register, in which case the second operand names the width.
fn operand_sf(operands: &[Operand]) -> bool {
    match operands.first() {
        Some(Operand::Reg(reg)) if reg.index != ZERO_REGISTER => reg.is_64,
        _ => match operands.get(1) {
            Some(Operand::Reg(reg)) => reg.is_64,
            _ => false,
        },
    }
}

fn expect_reg<'i>(span: Span<'i>, operands: &[Operand<'i>], index: usize) -> Result<Reg> {
    match operands.get(index) {
        Some(Operand::Reg(reg)) => Ok(*reg),
        Some(_) => Err(new_parser_error(
            span,
            format!("operand {} must be a register", index + 1),
        )),
        None => Err(missing_operand(span, index)),
    }
}

fn expect_imm<'i>(span: Span<'i>, operands: &[Operand<'i>], index: usize) -> Result<i64> {
    match operands.get(index) {
        Some(Operand::Imm(value)) => Ok(*value),
        Some(_) => Err(new_parser_error(
            span,
            format!("operand {} must be an immediate", index + 1),
        )),
        None => Err(missing_operand(span, index)),
    }
}

fn expect_label<'i>(span: Span<'i>, operands: &[Operand<'i>], index: usize) -> Result<Span<'i>> {
    match operands.get(index) {
        Some(Operand::Label(label)) => Ok(*label),
        Some(_) => Err(new_parser_error(
            span,
            format!("operand {} must be a label", index + 1),
        )),
        None => Err(missing_operand(span, index)),
    }
}

fn expect_end<'i>(span: Span<'i>, operands: &[Operand<'i>], count: usize) -> Result<()> {
    if operands.len() > count {
        return Err(new_parser_error(
            span,
            format!("expected at most {} operands", count),
        ));
    }
    Ok(())
}

fn missing_operand(span: Span, index: usize) -> crate::Error {
    new_parser_error(span, format!("too few operands: operand {} is missing", index + 1))
}

/// Reads an optional trailing shift operand at `index`; absent means
/// `lsl #0`.
fn trailing_shift<'i>(
    span: Span<'i>,
    operands: &[Operand<'i>],
    index: usize,
) -> Result<(ShiftKind, Word)> {
    match operands.get(index) {
        None => Ok((ShiftKind::LSL, 0)),
        Some(Operand::Shift(kind, amount)) => {
            expect_end(span, operands, index + 1)?;
            if !(0..64).contains(amount) {
                return Err(new_parser_error(
                    span,
                    format!("shift amount {} is out of range", amount),
                ));
            }
            Ok((*kind, *amount as Word))
        }
        Some(_) => Err(new_parser_error(
            span,
            format!("operand {} must be a shift", index + 1),
        )),
    }
}

fn encode_int<'i>(span: Span<'i>, operands: &[Operand<'i>]) -> Result<Word> {
    let value = expect_imm(span, operands, 0)?;
    expect_end(span, operands, 1)?;
    if value < -(1 << 31) || value > i64::from(u32::max_value()) {
        return Err(new_parser_error(
            span,
            format!("value {} does not fit in a word", value),
        ));
    }
    Ok(value as Word)
}

fn encode_add_sub<'i>(span: Span<'i>, mnemonic: &str, operands: &[Operand<'i>]) -> Result<Word> {
    let subtract = mnemonic.starts_with("sub");
    let set_flags = mnemonic.ends_with('s');
    let sf = operand_sf(operands);
    let rd = expect_reg(span, operands, 0)?;
    let rn = expect_reg(span, operands, 1)?;

    match operands.get(2) {
        Some(Operand::Imm(value)) => {
            let (kind, amount) = trailing_shift(span, operands, 3)?;
            if kind != ShiftKind::LSL || (amount != 0 && amount != 12) {
                return Err(new_parser_error(
                    span,
                    "an arithmetic immediate allows only lsl #0 or lsl #12".to_owned(),
                ));
            }
            if !(0..=0xFFF).contains(value) {
                return Err(new_parser_error(
                    span,
                    format!("immediate {} does not fit in 12 bits", value),
                ));
            }
            Ok(make_imm_arith(
                sf,
                subtract,
                set_flags,
                rd.index,
                rn.index,
                *value as Word,
                amount == 12,
            ))
        }
        Some(Operand::Reg(rm)) => {
            let rm = *rm;
            let (kind, amount) = trailing_shift(span, operands, 3)?;
            Ok(make_reg_arith(
                sf, subtract, set_flags, rd.index, rn.index, rm.index, kind, amount,
            ))
        }
        Some(_) => Err(new_parser_error(
            span,
            "operand 3 must be a register or an immediate".to_owned(),
        )),
        None => Err(missing_operand(span, 2)),
    }
}

fn encode_multiply<'i>(span: Span<'i>, mnemonic: &str, operands: &[Operand<'i>]) -> Result<Word> {
    let sf = operand_sf(operands);
    let rd = expect_reg(span, operands, 0)?;
    let rn = expect_reg(span, operands, 1)?;
    let rm = expect_reg(span, operands, 2)?;
    let ra = expect_reg(span, operands, 3)?;
    expect_end(span, operands, 4)?;

    Ok(make_multiply(
        sf,
        mnemonic == "msub",
        rd.index,
        rn.index,
        rm.index,
        ra.index,
    ))
}

fn encode_logic<'i>(span: Span<'i>, mnemonic: &str, operands: &[Operand<'i>]) -> Result<Word> {
    let (opc, invert) = match mnemonic {
        "and" => (LogicOp::AND, false),
        "bic" => (LogicOp::AND, true),
        "orr" => (LogicOp::ORR, false),
        "orn" => (LogicOp::ORR, true),
        "eor" => (LogicOp::EOR, false),
        "eon" => (LogicOp::EOR, true),
        "ands" => (LogicOp::ANDS, false),
        "bics" => (LogicOp::ANDS, true),
        _ => unreachable!(),
    };

    let sf = operand_sf(operands);
    let rd = expect_reg(span, operands, 0)?;
    let rn = expect_reg(span, operands, 1)?;
    let rm = expect_reg(span, operands, 2)?;
    let (kind, amount) = trailing_shift(span, operands, 3)?;

    Ok(make_reg_logic(
        sf, opc, invert, rd.index, rn.index, rm.index, kind, amount,
    ))
}

fn encode_wide_move<'i>(span: Span<'i>, mnemonic: &str, operands: &[Operand<'i>]) -> Result<Word> {
    let opc = match mnemonic {
        "movn" => WideMoveOp::MOVN,
        "movz" => WideMoveOp::MOVZ,
        "movk" => WideMoveOp::MOVK,
        _ => unreachable!(),
    };

    let sf = operand_sf(operands);
    let rd = expect_reg(span, operands, 0)?;
    let imm16 = expect_imm(span, operands, 1)?;
    if !(0..=0xFFFF).contains(&imm16) {
        return Err(new_parser_error(
            span,
            format!("immediate {} does not fit in 16 bits", imm16),
        ));
    }

    let (kind, amount) = trailing_shift(span, operands, 2)?;
    if kind != ShiftKind::LSL || amount % 16 != 0 || amount > 48 {
        return Err(new_parser_error(
            span,
            "a wide move shift must be lsl by a multiple of 16 up to 48".to_owned(),
        ));
    }

    Ok(make_wide_move(
        sf,
        opc,
        rd.index,
        imm16 as Word,
        amount / 16,
    ))
}

fn encode_load_store<'i>(
    span: Span<'i>,
    mnemonic: &str,
    operands: &[Operand<'i>],
    symbols: &mut SymbolTable<'i>,
    address: u32,
) -> Result<Word> {
    let rt = expect_reg(span, operands, 0)?;
    let sf = rt.is_64;
    let load = mnemonic == "ldr";

    match operands.get(1) {
        Some(Operand::Label(label)) => {
            if !load {
                return Err(new_parser_error(
                    span,
                    "only ldr can take a PC-relative literal".to_owned(),
                ));
            }
            expect_end(span, operands, 2)?;
            let offset = symbols.resolve(*label, address);
            Ok(make_load_literal(sf, rt.index, offset))
        }
        Some(Operand::Imm(byte_offset)) => {
            if !load {
                return Err(new_parser_error(
                    span,
                    "only ldr can take a PC-relative literal".to_owned(),
                ));
            }
            expect_end(span, operands, 2)?;
            let offset = byte_offset / i64::from(INSTRUCTION_BYTES);
            Ok(make_load_literal(sf, rt.index, offset as i32))
        }
        Some(Operand::Addr {
            base,
            offset,
            writeback,
        }) => {
            let base = *base;
            if *writeback {
                let simm9 = match offset {
                    Some(AddrOffset::Imm(value)) => *value,
                    _ => {
                        return Err(new_parser_error(
                            span,
                            "pre-indexing requires an immediate offset".to_owned(),
                        ))
                    }
                };
                expect_end(span, operands, 2)?;
                check_simm9(span, simm9)?;
                return Ok(make_index_offset(
                    sf,
                    load,
                    true,
                    rt.index,
                    base.index,
                    simm9 as i32,
                ));
            }

            match offset {
                None => match operands.get(2) {
                    // A trailing immediate after a bare base is the
                    // post-index form.
                    Some(Operand::Imm(post)) => {
                        expect_end(span, operands, 3)?;
                        check_simm9(span, *post)?;
                        Ok(make_index_offset(
                            sf,
                            load,
                            false,
                            rt.index,
                            base.index,
                            *post as i32,
                        ))
                    }
                    None => Ok(make_imm_offset(sf, load, rt.index, base.index, 0)),
                    Some(_) => Err(new_parser_error(
                        span,
                        "unexpected operand after the address".to_owned(),
                    )),
                },
                Some(AddrOffset::Imm(byte_offset)) => {
                    expect_end(span, operands, 2)?;
                    let scale = i64::from(if sf { DOUBLE_WORD_BYTES } else { WORD_BYTES });
                    if *byte_offset < 0 || byte_offset % scale != 0 {
                        return Err(new_parser_error(
                            span,
                            format!(
                                "an unsigned offset must be a non-negative multiple of {}",
                                scale
                            ),
                        ));
                    }
                    let units = byte_offset / scale;
                    if units > 0xFFF {
                        return Err(new_parser_error(
                            span,
                            format!("offset {} does not fit in 12 bits", byte_offset),
                        ));
                    }
                    Ok(make_imm_offset(
                        sf,
                        load,
                        rt.index,
                        base.index,
                        units as Word,
                    ))
                }
                Some(AddrOffset::Reg(xm)) => {
                    expect_end(span, operands, 2)?;
                    Ok(make_reg_offset(sf, load, rt.index, base.index, xm.index))
                }
            }
        }
        Some(_) => Err(new_parser_error(
            span,
            "operand 2 must be an address or a literal".to_owned(),
        )),
        None => Err(missing_operand(span, 1)),
    }
}

fn check_simm9(span: Span, value: i64) -> Result<()> {
    if !(-256..=255).contains(&value) {
        return Err(new_parser_error(
            span,
            format!("offset {} does not fit in 9 signed bits", value),
        ));
    }
    Ok(())
}

fn encode_branch<'i>(
    span: Span<'i>,
    mnemonic: &str,
    operands: &[Operand<'i>],
    symbols: &mut SymbolTable<'i>,
    address: u32,
) -> Result<Word> {
    match mnemonic {
        "b" => {
            let label = expect_label(span, operands, 0)?;
            expect_end(span, operands, 1)?;
            Ok(make_branch(symbols.resolve(label, address)))
        }
        "br" => {
            let xn = expect_reg(span, operands, 0)?;
            expect_end(span, operands, 1)?;
            Ok(make_branch_reg(xn.index))
        }
        _ => {
            let cond = read_branch_cond(span, mnemonic)?;
            let label = expect_label(span, operands, 0)?;
            expect_end(span, operands, 1)?;
            Ok(make_branch_cond(cond, symbols.resolve(label, address)))
        }
    }
}

fn read_branch_cond(span: Span, mnemonic: &str) -> Result<Cond> {
    match &mnemonic[2..] {
        "eq" => Ok(Cond::EQ),
        "ne" => Ok(Cond::NE),
        "ge" => Ok(Cond::GE),
        "lt" => Ok(Cond::LT),
        "gt" => Ok(Cond::GT),
        "le" => Ok(Cond::LE),
        "al" => Ok(Cond::AL),
        other => Err(new_parser_error(
            span,
            format!("unknown branch condition \"{}\"", other),
        )),
    }
}
