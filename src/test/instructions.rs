use super::{run_to_halt, run_words};
use crate::insn::*;
use crate::{constants, ExitCode};

const MOVN: WideMoveOp = WideMoveOp::MOVN;
const MOVZ: WideMoveOp = WideMoveOp::MOVZ;
const MOVK: WideMoveOp = WideMoveOp::MOVK;

#[test]
fn empty_program_halts_in_place() {
    let processor = run_to_halt(&[]);
    assert_eq!(processor.registers().pc(), 0);
    for i in 0..constants::REGISTER_COUNT as u32 {
        assert_eq!(processor.registers().read_64(i), 0);
    }
}

#[test]
fn movz_loads_immediate() {
    let processor = run_to_halt(&[make_wide_move(true, MOVZ, 0, 5, 0)]);
    assert_eq!(processor.registers().read_64(0), 5);
}

#[test]
fn movz_shifted_by_48() {
    let processor = run_to_halt(&[make_wide_move(true, MOVZ, 0, 0xFFFF, 3)]);
    assert_eq!(processor.registers().read_64(0), 0xFFFF_0000_0000_0000);
}

#[test]
fn movn_inverts() {
    let processor = run_to_halt(&[
        make_wide_move(true, MOVN, 0, 0, 0),
        make_wide_move(false, MOVN, 1, 0, 0),
    ]);
    assert_eq!(processor.registers().read_64(0), u64::max_value());
    // The 32-bit form masks the inverted value to the low word.
    assert_eq!(processor.registers().read_64(1), 0xFFFF_FFFF);
}

#[test]
fn movk_keeps_other_quarters() {
    let processor = run_to_halt(&[
        make_wide_move(true, MOVZ, 0, 0x1234, 0),
        make_wide_move(true, MOVK, 0, 0xABCD, 1),
    ]);
    assert_eq!(processor.registers().read_64(0), 0xABCD_1234);
}

#[test]
fn add_registers() {
    let processor = run_to_halt(&[
        make_wide_move(true, MOVZ, 0, 3, 0),
        make_wide_move(true, MOVZ, 1, 4, 0),
        make_reg_arith(true, false, false, 2, 0, 1, ShiftKind::LSL, 0),
    ]);
    assert_eq!(processor.registers().read_64(2), 7);
}

#[test]
fn add_immediate_with_shift() {
    let processor = run_to_halt(&[make_imm_arith(true, false, false, 0, 31, 5, true)]);
    assert_eq!(processor.registers().read_64(0), 5 << 12);
}

#[test]
fn shifted_register_operand() {
    let processor = run_to_halt(&[
        make_wide_move(true, MOVZ, 1, 3, 0),
        make_reg_arith(true, false, false, 2, 31, 1, ShiftKind::LSL, 4),
    ]);
    assert_eq!(processor.registers().read_64(2), 48);
}

#[test]
fn arithmetic_shift_right_preserves_sign() {
    let processor = run_to_halt(&[
        // movn x1, #7 leaves -8 in x1
        make_wide_move(true, MOVN, 1, 7, 0),
        make_reg_arith(true, false, false, 2, 31, 1, ShiftKind::ASR, 1),
    ]);
    assert_eq!(processor.registers().read_64(2) as i64, -4);
}

#[test]
fn rotate_right_by_zero_and_one() {
    let processor = run_to_halt(&[
        make_wide_move(true, MOVZ, 1, 1, 0),
        make_reg_arith(true, false, false, 2, 31, 1, ShiftKind::ROR, 1),
        make_reg_arith(true, false, false, 3, 31, 1, ShiftKind::ROR, 0),
    ]);
    assert_eq!(processor.registers().read_64(2), 1u64 << 63);
    assert_eq!(processor.registers().read_64(3), 1);
}

#[test]
fn rotate_right_by_word_width() {
    // A 32-bit rotate by 32 brings every bit back home.
    let processor = run_to_halt(&[
        make_wide_move(false, MOVZ, 1, 0x1234, 0),
        make_reg_arith(false, false, false, 2, 31, 1, ShiftKind::ROR, 32),
    ]);
    assert_eq!(processor.registers().read_64(2), 0x1234);
}

#[test]
fn subs_sets_zero_and_carry() {
    let processor = run_to_halt(&[
        make_wide_move(true, MOVZ, 0, 10, 0),
        make_imm_arith(true, true, true, 31, 0, 10, false),
    ]);
    let pstate = processor.pstate();
    assert!(pstate.zero);
    assert!(pstate.carry);
    assert!(!pstate.negative);
    assert!(!pstate.overflow);
}

#[test]
fn subs_borrow_clears_carry() {
    let processor = run_to_halt(&[
        make_wide_move(true, MOVZ, 0, 5, 0),
        make_imm_arith(true, true, true, 1, 0, 10, false),
    ]);
    assert_eq!(processor.registers().read_64(1) as i64, -5);
    let pstate = processor.pstate();
    assert!(pstate.negative);
    assert!(!pstate.carry);
    assert!(!pstate.zero);
    assert!(!pstate.overflow);
}

#[test]
fn adds_unsigned_carry_out() {
    let processor = run_to_halt(&[
        make_wide_move(true, MOVN, 0, 0, 0),
        make_imm_arith(true, false, true, 1, 0, 1, false),
    ]);
    assert_eq!(processor.registers().read_64(1), 0);
    let pstate = processor.pstate();
    assert!(pstate.zero);
    assert!(pstate.carry);
    assert!(!pstate.overflow);
}

#[test]
fn adds_signed_overflow_32() {
    // 0x7FFF0000 + 0x7FFF0000 overflows the positive range.
    let processor = run_to_halt(&[
        make_wide_move(false, MOVZ, 0, 0x7FFF, 1),
        make_reg_arith(false, false, true, 1, 0, 0, ShiftKind::LSL, 0),
    ]);
    assert_eq!(processor.registers().read_64(1), 0xFFFE_0000);
    let pstate = processor.pstate();
    assert!(pstate.negative);
    assert!(pstate.overflow);
    assert!(!pstate.carry);
    assert!(!pstate.zero);
}

#[test]
fn subs_signed_overflow_64() {
    // min - 1 overflows: operands differ in sign, result flips.
    let processor = run_to_halt(&[
        // movz x0, #0x8000, lsl #48 leaves i64::MIN in x0
        make_wide_move(true, MOVZ, 0, 0x8000, 3),
        make_imm_arith(true, true, true, 1, 0, 1, false),
    ]);
    assert_eq!(processor.registers().read_64(0), i64::min_value() as u64);
    assert_eq!(processor.registers().read_64(1), i64::max_value() as u64);
    let pstate = processor.pstate();
    assert!(pstate.overflow);
    assert!(!pstate.negative);
}

#[test]
fn ands_sets_flags_and_clears_carry_overflow() {
    let processor = run_to_halt(&[
        // Leave C set from a wrapping adds first.
        make_wide_move(true, MOVN, 0, 0, 0),
        make_imm_arith(true, false, true, 31, 0, 1, false),
        make_wide_move(true, MOVN, 1, 0, 0),
        make_reg_logic(true, LogicOp::ANDS, false, 2, 1, 1, ShiftKind::LSL, 0),
    ]);
    assert_eq!(processor.registers().read_64(2), u64::max_value());
    let pstate = processor.pstate();
    assert!(pstate.negative);
    assert!(!pstate.zero);
    assert!(!pstate.carry);
    assert!(!pstate.overflow);
}

#[test]
fn bic_masks_with_inverted_operand() {
    let processor = run_to_halt(&[
        make_wide_move(true, MOVZ, 0, 15, 0),
        make_wide_move(true, MOVZ, 1, 5, 0),
        make_reg_logic(true, LogicOp::AND, true, 2, 0, 1, ShiftKind::LSL, 0),
    ]);
    assert_eq!(processor.registers().read_64(2), 10);
}

#[test]
fn orn_from_zero_register_is_not() {
    let processor = run_to_halt(&[
        make_wide_move(true, MOVZ, 1, 0xF0F0, 0),
        make_reg_logic(true, LogicOp::ORR, true, 0, 31, 1, ShiftKind::LSL, 0),
    ]);
    assert_eq!(processor.registers().read_64(0), !0xF0F0u64);
}

#[test]
fn madd_accumulates() {
    let processor = run_to_halt(&[
        make_wide_move(true, MOVZ, 0, 5, 0),
        make_wide_move(true, MOVZ, 1, 3, 0),
        make_wide_move(true, MOVZ, 2, 100, 0),
        make_multiply(true, false, 3, 0, 1, 2),
    ]);
    assert_eq!(processor.registers().read_64(3), 115);
}

#[test]
fn msub_from_zero_register_negates_product() {
    let processor = run_to_halt(&[
        make_wide_move(true, MOVZ, 0, 5, 0),
        make_wide_move(true, MOVZ, 1, 3, 0),
        make_multiply(true, true, 2, 0, 1, 31),
    ]);
    assert_eq!(processor.registers().read_64(2), 0xFFFF_FFFF_FFFF_FFF1);
}

#[test]
fn multiply_32_truncates_and_zero_extends() {
    let processor = run_to_halt(&[
        make_wide_move(false, MOVZ, 0, 0xFFFF, 1),
        make_multiply(false, false, 1, 0, 0, 31),
    ]);
    // (0xFFFF0000)^2 mod 2^32 == 0, upper half untouched.
    assert_eq!(processor.registers().read_64(1), 0);
}

#[test]
fn store_and_load_double_word() {
    let processor = run_to_halt(&[
        make_wide_move(true, MOVZ, 0, 0x100, 0),
        make_wide_move(true, MOVZ, 1, 0xABCD, 0),
        make_imm_offset(true, false, 1, 0, 0),
        make_imm_offset(true, true, 2, 0, 0),
    ]);
    assert_eq!(processor.registers().read_64(2), 0xABCD);
    assert_eq!(processor.memory().read_word(0x100), Ok(0xABCD));
}

#[test]
fn scaled_immediate_offset() {
    let processor = run_to_halt(&[
        make_wide_move(true, MOVZ, 0, 0x100, 0),
        make_wide_move(true, MOVZ, 1, 77, 0),
        // imm12 of 1 addresses one double word past the base.
        make_imm_offset(true, false, 1, 0, 1),
        make_imm_offset(true, true, 2, 0, 1),
    ]);
    assert_eq!(processor.memory().read_double_word(0x108), Ok(77));
    assert_eq!(processor.registers().read_64(2), 77);
}

#[test]
fn word_store_and_zero_extending_load() {
    let processor = run_to_halt(&[
        make_wide_move(true, MOVZ, 0, 0x200, 0),
        make_wide_move(true, MOVN, 1, 0, 0),
        make_imm_offset(false, false, 1, 0, 0),
        make_imm_offset(false, true, 2, 0, 0),
    ]);
    assert_eq!(processor.memory().read_word(0x200), Ok(0xFFFF_FFFF));
    assert_eq!(processor.registers().read_64(2), 0xFFFF_FFFF);
}

#[test]
fn register_offset_addressing() {
    let processor = run_to_halt(&[
        make_wide_move(true, MOVZ, 0, 0x100, 0),
        make_wide_move(true, MOVZ, 1, 0x20, 0),
        make_wide_move(true, MOVZ, 2, 42, 0),
        make_reg_offset(true, false, 2, 0, 1),
        make_reg_offset(true, true, 3, 0, 1),
    ]);
    assert_eq!(processor.memory().read_double_word(0x120), Ok(42));
    assert_eq!(processor.registers().read_64(3), 42);
}

#[test]
fn pre_index_updates_base_before_access() {
    let processor = run_to_halt(&[
        make_wide_move(true, MOVZ, 0, 0x108, 0),
        make_wide_move(true, MOVZ, 1, 9, 0),
        make_index_offset(true, false, true, 1, 0, -8),
        make_index_offset(true, true, true, 2, 0, 0),
    ]);
    assert_eq!(processor.registers().read_64(0), 0x100);
    assert_eq!(processor.memory().read_double_word(0x100), Ok(9));
    assert_eq!(processor.registers().read_64(2), 9);
}

#[test]
fn post_index_updates_base_after_access() {
    let processor = run_to_halt(&[
        make_wide_move(true, MOVZ, 0, 0x100, 0),
        make_wide_move(true, MOVZ, 1, 11, 0),
        make_index_offset(true, false, false, 1, 0, 16),
    ]);
    assert_eq!(processor.memory().read_double_word(0x100), Ok(11));
    assert_eq!(processor.registers().read_64(0), 0x110);
}

#[test]
fn load_literal_reads_relative_to_pc() {
    let (processor, code) = run_words(&[
        make_load_literal(false, 0, 2),
        constants::HALT_INSTRUCTION,
        0xDEAD_BEEF,
    ]);
    assert_eq!(code, ExitCode::Halted);
    assert_eq!(processor.registers().read_64(0), 0xDEAD_BEEF);
}

#[test]
fn conditional_branch_skips_when_taken() {
    let (processor, code) = run_words(&[
        make_wide_move(true, MOVZ, 0, 10, 0),
        make_imm_arith(true, true, true, 31, 0, 10, false),
        make_branch_cond(Cond::EQ, 2),
        make_wide_move(true, MOVZ, 1, 1, 0),
        constants::HALT_INSTRUCTION,
    ]);
    assert_eq!(code, ExitCode::Halted);
    assert_eq!(processor.registers().read_64(1), 0);
    assert!(processor.pstate().zero);
    assert_eq!(processor.registers().pc(), 16);
}

#[test]
fn conditional_branch_falls_through_when_not_taken() {
    let processor = run_to_halt(&[
        make_wide_move(true, MOVZ, 0, 10, 0),
        make_imm_arith(true, true, true, 31, 0, 9, false),
        make_branch_cond(Cond::EQ, 2),
        make_wide_move(true, MOVZ, 1, 1, 0),
    ]);
    assert_eq!(processor.registers().read_64(1), 1);
}

#[test]
fn backward_branch_loops() {
    let processor = run_to_halt(&[
        make_wide_move(true, MOVZ, 0, 3, 0),
        make_imm_arith(true, true, true, 0, 0, 1, false),
        make_branch_cond(Cond::NE, -1),
    ]);
    assert_eq!(processor.registers().read_64(0), 0);
    assert!(processor.pstate().zero);
}

#[test]
fn unconditional_branch_jumps_over() {
    let (processor, code) = run_words(&[
        make_branch(2),
        make_wide_move(true, MOVZ, 0, 1, 0),
        constants::HALT_INSTRUCTION,
    ]);
    assert_eq!(code, ExitCode::Halted);
    assert_eq!(processor.registers().read_64(0), 0);
}

#[test]
fn register_branch_jumps_to_address() {
    let (processor, code) = run_words(&[
        make_wide_move(true, MOVZ, 0, 16, 0),
        make_branch_reg(0),
        make_wide_move(true, MOVZ, 1, 1, 0),
        make_wide_move(true, MOVZ, 2, 2, 0),
        constants::HALT_INSTRUCTION,
    ]);
    assert_eq!(code, ExitCode::Halted);
    assert_eq!(processor.registers().read_64(1), 0);
    assert_eq!(processor.registers().read_64(2), 0);
}

#[test]
fn greater_and_less_conditions() {
    // 5 - 7: N != V, so LT holds and GE does not.
    let processor = run_to_halt(&[
        make_wide_move(true, MOVZ, 0, 5, 0),
        make_imm_arith(true, true, true, 31, 0, 7, false),
    ]);
    let pstate = *processor.pstate();
    assert!(pstate.holds(Cond::LT));
    assert!(pstate.holds(Cond::LE));
    assert!(pstate.holds(Cond::NE));
    assert!(!pstate.holds(Cond::GE));
    assert!(!pstate.holds(Cond::GT));
    assert!(!pstate.holds(Cond::EQ));
    assert!(pstate.holds(Cond::AL));
}

#[test]
fn zero_register_write_is_dropped() {
    let processor = run_to_halt(&[make_wide_move(true, MOVZ, 31, 7, 0)]);
    assert_eq!(processor.registers().read_64(31), 0);
}

#[test]
fn word_result_zero_extends() {
    let processor = run_to_halt(&[
        make_wide_move(true, MOVN, 0, 0, 0),
        make_imm_arith(false, false, false, 0, 0, 0, false),
    ]);
    assert_eq!(processor.registers().read_64(0), 0xFFFF_FFFF);
}

#[test]
fn out_of_bounds_access_stops_execution() {
    let (_, code) = run_words(&[
        make_wide_move(true, MOVN, 0, 0, 0),
        make_imm_offset(true, true, 1, 0, 0),
        constants::HALT_INSTRUCTION,
    ]);
    assert_eq!(code, ExitCode::BadMemoryAccess);
}

#[test]
fn unknown_word_stops_execution() {
    let (_, code) = run_words(&[0xFFFF_FFFF]);
    assert_eq!(code, ExitCode::InvalidInstruction);
}

#[test]
fn running_off_the_end_stops_on_zero_words() {
    // Without a halt, the next fetched word is zero, which decodes to
    // no family.
    let (_, code) = run_words(&[make_wide_move(true, MOVZ, 0, 1, 0)]);
    assert_eq!(code, ExitCode::InvalidInstruction);
}
