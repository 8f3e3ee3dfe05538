use a64::constants::INSTRUCTION_BYTES;

/// 1-based source line of each emitted instruction word, in emission
/// order.
pub type SourceMap = Vec<u32>;

/// Looks up the source line of the instruction at a byte address.
pub fn line_for_address(map: &SourceMap, address: u64) -> Option<u32> {
    map.get((address / u64::from(INSTRUCTION_BYTES)) as usize)
        .copied()
}
