use crate::parser::{Operand, ZERO_REG};

fn insert_zero(operands: &mut Vec<Operand>, index: usize) {
    let index = index.min(operands.len());
    operands.insert(index, Operand::Reg(ZERO_REG));
}

/// Rewrites alias mnemonics into the canonical form the encoders
/// understand, shuffling the zero register into the operand vector.
/// A trailing shift operand keeps its place at the end.
///
/// | Alias            | Canonical                |
/// |------------------|--------------------------|
/// | `neg rd, op2`    | `sub rd, rzr, op2`       |
/// | `negs rd, op2`   | `subs rd, rzr, op2`      |
/// | `cmn rn, op2`    | `adds rzr, rn, op2`      |
/// | `cmp rn, op2`    | `subs rzr, rn, op2`      |
/// | `tst rn, op2`    | `ands rzr, rn, op2`      |
/// | `mvn rd, op2`    | `orn rd, rzr, op2`       |
/// | `mov rd, rm`     | `orr rd, rzr, rm`        |
/// | `mul rd, rn, rm` | `madd rd, rn, rm, rzr`   |
/// | `mneg rd, rn, rm`| `msub rd, rn, rm, rzr`   |
pub fn expand<'i>(mnemonic: &'i str, operands: &mut Vec<Operand<'i>>) -> &'i str {
    match mnemonic {
        "neg" => {
            insert_zero(operands, 1);
            "sub"
        }
        "negs" => {
            insert_zero(operands, 1);
            "subs"
        }
        "cmn" => {
            insert_zero(operands, 0);
            "adds"
        }
        "cmp" => {
            insert_zero(operands, 0);
            "subs"
        }
        "tst" => {
            insert_zero(operands, 0);
            "ands"
        }
        "mvn" => {
            insert_zero(operands, 1);
            "orn"
        }
        "mov" => {
            insert_zero(operands, 1);
            "orr"
        }
        "mul" => {
            operands.push(Operand::Reg(ZERO_REG));
            "madd"
        }
        "mneg" => {
            operands.push(Operand::Reg(ZERO_REG));
            "msub"
        }
        _ => mnemonic,
    }
}
