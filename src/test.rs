use super::*;
use crate::insn::*;
use byteorder::ByteOrder;

mod instructions;

pub fn image_from_words(words: &[Word]) -> Vec<u8> {
    let mut image = vec![0u8; words.len() * constants::WORD_BYTES as usize];
    Endian::write_u32_into(words, &mut image);
    image
}

pub fn run_words(words: &[Word]) -> (Processor, ExitCode) {
    let mut processor = Processor::new();
    processor.load_image(&image_from_words(words)).unwrap();
    let code = processor.run();
    (processor, code)
}

/// Appends the halt sentinel, runs, and asserts a clean shutdown.
pub fn run_to_halt(words: &[Word]) -> Processor {
    let mut program = Vec::from(words);
    program.push(constants::HALT_INSTRUCTION);
    let (processor, code) = run_words(&program);
    assert_eq!(code, ExitCode::Halted);
    processor
}

#[test]
fn halt_encodes_and_x0_x0_x0() {
    assert_eq!(
        make_reg_logic(true, LogicOp::AND, false, 0, 0, 0, ShiftKind::LSL, 0),
        constants::HALT_INSTRUCTION
    );
}

#[test]
fn known_encodings() {
    // Cross-checked against the architectural encodings.
    assert_eq!(make_branch(0), 0x1400_0000);
    assert_eq!(make_branch_cond(Cond::EQ, 0), 0x5400_0000);
    assert_eq!(make_branch_reg(0), 0xD61F_0000);
    assert_eq!(make_imm_offset(true, true, 0, 0, 0), 0xF940_0000);
    assert_eq!(make_imm_offset(true, false, 0, 0, 0), 0xF900_0000);
    assert_eq!(make_load_literal(true, 0, 0), 0x5800_0000);
    assert_eq!(make_wide_move(true, WideMoveOp::MOVZ, 0, 0, 0), 0xD280_0000);
    assert_eq!(make_imm_arith(true, false, false, 0, 0, 0, false), 0x9100_0000);
    assert_eq!(
        make_reg_arith(true, false, false, 0, 0, 0, ShiftKind::LSL, 0),
        0x8B00_0000
    );
    assert_eq!(make_multiply(true, false, 0, 0, 0, 31), 0x9B00_7C00);
}

#[test]
fn imm_arith_round_trip() {
    let word = make_imm_arith(true, true, true, 3, 7, 0xABC, true);
    assert_eq!(
        decode(word),
        Some(Instruction::ImmArith {
            sf: true,
            subtract: true,
            set_flags: true,
            sh: true,
            imm12: 0xABC,
            rn: 7,
            rd: 3,
        })
    );
}

#[test]
fn wide_move_round_trip() {
    let word = make_wide_move(false, WideMoveOp::MOVK, 12, 0xBEEF, 1);
    assert_eq!(
        decode(word),
        Some(Instruction::WideMove {
            sf: false,
            opc: WideMoveOp::MOVK,
            hw: 1,
            imm16: 0xBEEF,
            rd: 12,
        })
    );
}

#[test]
fn reg_arith_round_trip() {
    let word = make_reg_arith(true, false, true, 1, 2, 3, ShiftKind::ASR, 17);
    assert_eq!(
        decode(word),
        Some(Instruction::RegArith {
            sf: true,
            subtract: false,
            set_flags: true,
            shift: ShiftKind::ASR,
            amount: 17,
            rm: 3,
            rn: 2,
            rd: 1,
        })
    );
}

#[test]
fn reg_logic_round_trip() {
    let word = make_reg_logic(false, LogicOp::EOR, true, 4, 5, 6, ShiftKind::ROR, 9);
    assert_eq!(
        decode(word),
        Some(Instruction::RegLogic {
            sf: false,
            opc: LogicOp::EOR,
            invert: true,
            shift: ShiftKind::ROR,
            amount: 9,
            rm: 6,
            rn: 5,
            rd: 4,
        })
    );
}

#[test]
fn multiply_round_trip() {
    let word = make_multiply(true, true, 2, 0, 1, 31);
    assert_eq!(
        decode(word),
        Some(Instruction::Multiply {
            sf: true,
            negate: true,
            rm: 1,
            ra: 31,
            rn: 0,
            rd: 2,
        })
    );
}

#[test]
fn data_transfer_round_trips() {
    assert_eq!(
        decode(make_imm_offset(true, true, 1, 2, 0xFFF)),
        Some(Instruction::ImmOffset {
            sf: true,
            load: true,
            imm12: 0xFFF,
            xn: 2,
            rt: 1,
        })
    );
    assert_eq!(
        decode(make_reg_offset(false, false, 3, 4, 5)),
        Some(Instruction::RegOffset {
            sf: false,
            load: false,
            xm: 5,
            xn: 4,
            rt: 3,
        })
    );
    assert_eq!(
        decode(make_index_offset(true, true, true, 6, 7, -256)),
        Some(Instruction::IndexOffset {
            sf: true,
            load: true,
            pre: true,
            simm9: -256,
            xn: 7,
            rt: 6,
        })
    );
    assert_eq!(
        decode(make_index_offset(false, false, false, 8, 9, 255)),
        Some(Instruction::IndexOffset {
            sf: false,
            load: false,
            pre: false,
            simm9: 255,
            xn: 9,
            rt: 8,
        })
    );
    assert_eq!(
        decode(make_load_literal(true, 10, -1)),
        Some(Instruction::LoadLiteral {
            sf: true,
            simm19: -1,
            rt: 10,
        })
    );
}

#[test]
fn branch_round_trips() {
    assert_eq!(
        decode(make_branch(-(1 << 25))),
        Some(Instruction::Branch {
            simm26: -(1 << 25)
        })
    );
    assert_eq!(
        decode(make_branch((1 << 25) - 1)),
        Some(Instruction::Branch {
            simm26: (1 << 25) - 1
        })
    );
    assert_eq!(
        decode(make_branch_cond(Cond::LE, -(1 << 18))),
        Some(Instruction::BranchCond {
            cond: Cond::LE,
            simm19: -(1 << 18)
        })
    );
    assert_eq!(
        decode(make_branch_reg(30)),
        Some(Instruction::BranchReg { xn: 30 })
    );
}

#[test]
fn decode_rejects_unknown_words() {
    assert_eq!(decode(0x0000_0000), None);
    assert_eq!(decode(0xFFFF_FFFF), None);
}

#[test]
fn sign_extend_extremes() {
    assert_eq!(sign_extend(0x1FF_FFFF, 26), (1 << 25) - 1);
    assert_eq!(sign_extend(0x200_0000, 26), -(1 << 25));
    assert_eq!(sign_extend(0x3FF_FFFF, 26), -1);
    assert_eq!(sign_extend(0x3_FFFF, 19), (1 << 18) - 1);
    assert_eq!(sign_extend(0x4_0000, 19), -(1 << 18));
    assert_eq!(sign_extend(0x0FF, 9), 255);
    assert_eq!(sign_extend(0x100, 9), -256);
}

#[test]
fn patch_branch_displacement() {
    let word = make_branch(0);
    assert_eq!(patch_displacement(word, -4), Some(make_branch(-4)));
    assert_eq!(patch_displacement(word, 100), Some(make_branch(100)));
}

#[test]
fn patch_conditional_and_literal_displacements() {
    let cond = make_branch_cond(Cond::NE, 0);
    assert_eq!(
        patch_displacement(cond, 12),
        Some(make_branch_cond(Cond::NE, 12))
    );

    let literal = make_load_literal(true, 3, 0);
    assert_eq!(
        patch_displacement(literal, -2),
        Some(make_load_literal(true, 3, -2))
    );
}

#[test]
fn patch_rejects_non_carriers() {
    assert_eq!(patch_displacement(make_imm_arith(true, false, false, 0, 0, 1, false), 4), None);
    assert_eq!(patch_displacement(make_branch_reg(5), 4), None);
    assert_eq!(patch_displacement(make_imm_offset(true, true, 0, 0, 0), 4), None);
}

#[test]
fn state_dump_format() {
    let processor = run_to_halt(&[
        make_wide_move(true, WideMoveOp::MOVZ, 0, 0x100, 0),
        make_wide_move(true, WideMoveOp::MOVZ, 1, 0xABCD, 0),
        make_imm_offset(true, false, 1, 0, 0),
    ]);

    let mut out = Vec::new();
    processor.write_state(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.starts_with("Registers:\nX00    = 0000000000000100\n"));
    assert!(text.contains("X01    = 000000000000abcd\n"));
    assert!(text.contains("PC     = 000000000000000c\n"));
    assert!(text.contains("PSTATE : -Z--\n"));
    assert!(text.contains("Non-Zero Memory:\n"));
    assert!(text.contains("0x00000100: 0000abcd\n"));
}

#[test]
fn load_image_rejects_ragged_programs() {
    let mut processor = Processor::new();
    assert_eq!(
        processor.load_image(&[1, 2, 3]),
        Err(Error::InvalidProgram(3))
    );
}
