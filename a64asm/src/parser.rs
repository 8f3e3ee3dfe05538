use crate::{new_parser_error, Result};
use a64::constants::ZERO_REGISTER;
use a64::insn::ShiftKind;
use a64::Word;
use matches::debug_assert_matches;
use pest::iterators::Pair;
use pest::Span;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct AsmParser;

/// A general register operand. The zero register parses to index 31;
/// `rzr` carries no width of its own and defaults to 64-bit, which is
/// never consulted (the width bit is always taken from a non-zero
/// operand).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Reg {
    pub index: Word,
    pub is_64: bool,
}

pub const ZERO_REG: Reg = Reg {
    index: ZERO_REGISTER,
    is_64: true,
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AddrOffset {
    Reg(Reg),
    Imm(i64),
}

/// One classified operand, in source order.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Operand<'i> {
    Reg(Reg),
    Imm(i64),
    Addr {
        base: Reg,
        offset: Option<AddrOffset>,
        writeback: bool,
    },
    Label(Span<'i>),
    Shift(ShiftKind, i64),
}

/// Splits a statement pair into its mnemonic and classified operands.
pub fn process_statement(pair: Pair<Rule>) -> Result<(&str, Vec<Operand>)> {
    debug_assert_matches!(pair.as_rule(), Rule::statement);

    let mut pairs = pair.into_inner();
    let mnemonic = pairs.next().unwrap().as_str();

    let mut operands = Vec::new();
    for operand in pairs {
        operands.push(process_operand(operand)?);
    }

    Ok((mnemonic, operands))
}

fn process_operand(pair: Pair<Rule>) -> Result<Operand> {
    match pair.as_rule() {
        Rule::register => Ok(Operand::Reg(read_register(&pair)?)),
        Rule::immediate => Ok(Operand::Imm(read_int(&pair)?)),
        Rule::identifier => Ok(Operand::Label(pair.as_span())),
        Rule::shift => {
            let mut pairs = pair.into_inner();
            let kind = read_shift_kind(&pairs.next().unwrap());
            let amount = read_int(&pairs.next().unwrap())?;
            Ok(Operand::Shift(kind, amount))
        }
        Rule::address => {
            let mut base = None;
            let mut offset = None;
            let mut writeback = false;
            for inner in pair.into_inner() {
                match inner.as_rule() {
                    Rule::register if base.is_none() => base = Some(read_register(&inner)?),
                    Rule::register => offset = Some(AddrOffset::Reg(read_register(&inner)?)),
                    Rule::immediate => offset = Some(AddrOffset::Imm(read_int(&inner)?)),
                    Rule::writeback => writeback = true,
                    _ => unreachable!(),
                }
            }
            Ok(Operand::Addr {
                base: base.unwrap(),
                offset,
                writeback,
            })
        }
        _ => unreachable!(),
    }
}

fn read_register(pair: &Pair<Rule>) -> Result<Reg> {
    let name = pair.as_str();
    if name.ends_with("zr") {
        return Ok(Reg {
            index: ZERO_REGISTER,
            is_64: !name.starts_with('w'),
        });
    }

    let index: Word = name[1..]
        .parse()
        .map_err(|_| new_parser_error(pair.as_span(), format!("invalid register \"{}\"", name)))?;
    if index >= ZERO_REGISTER {
        return Err(new_parser_error(
            pair.as_span(),
            format!("register index {} is out of range", index),
        ));
    }

    Ok(Reg {
        index,
        is_64: name.starts_with('x'),
    })
}

/// Reads a decimal or `0x` hexadecimal integer, with an optional `#`
/// prefix and sign.
fn read_int(pair: &Pair<Rule>) -> Result<i64> {
    let mut text = pair.as_str();
    if let Some(stripped) = text.strip_prefix('#') {
        text = stripped;
    }

    let (text, sign) = match text.strip_prefix('-') {
        Some(stripped) => (stripped, -1),
        None => (text, 1),
    };

    let parsed = match text.strip_prefix("0x") {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => text.parse(),
    };

    parsed.map(|value: i64| sign * value).map_err(|err| {
        new_parser_error(pair.as_span(), format!("invalid immediate: {}", err))
    })
}

fn read_shift_kind(pair: &Pair<Rule>) -> ShiftKind {
    match pair.as_str() {
        "lsl" => ShiftKind::LSL,
        "lsr" => ShiftKind::LSR,
        "asr" => ShiftKind::ASR,
        "ror" => ShiftKind::ROR,
        _ => unreachable!(),
    }
}
