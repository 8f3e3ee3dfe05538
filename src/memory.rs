use crate::{constants, DoubleWord, Endian, Word};
use byteorder::ByteOrder;

/// The emulated main memory: a fixed block of 2 MiB, byte addressable,
/// little endian.
///
/// Word accessors move 4 bytes and double word accessors move 8; any
/// access whose span leaves the block is an error.
#[derive(Debug)]
pub struct Memory {
    data: Vec<u8>,
}

impl Memory {
    /// Constructs a zeroed memory block.
    pub fn new() -> Memory {
        Memory {
            data: vec![0; constants::MEMORY_SIZE],
        }
    }

    pub fn length(&self) -> usize {
        self.data.len()
    }

    /// Checks whether `[address..address+length]` lies inside memory.
    pub fn check_range(&self, address: u64, length: u32) -> bool {
        address
            .checked_add(u64::from(length))
            .map_or(false, |end| end <= self.data.len() as u64)
    }

    fn slice(&self, address: u64, length: u32) -> Result<&[u8], ()> {
        if self.check_range(address, length) {
            let start = address as usize;
            Ok(&self.data[start..start + length as usize])
        } else {
            Err(())
        }
    }

    fn slice_mut(&mut self, address: u64, length: u32) -> Result<&mut [u8], ()> {
        if self.check_range(address, length) {
            let start = address as usize;
            Ok(&mut self.data[start..start + length as usize])
        } else {
            Err(())
        }
    }

    /// Reads a 32-bit word.
    ///
    /// # Examples
    /// ```
    /// use a64::Memory;
    ///
    /// let mut memory = Memory::new();
    /// memory.write_word(0x100, 0xABCD).unwrap();
    /// assert_eq!(memory.read_word(0x100), Ok(0xABCD));
    /// assert_eq!(memory.read_word(1 << 21), Err(()));
    /// ```
    pub fn read_word(&self, address: u64) -> Result<Word, ()> {
        Ok(Endian::read_u32(
            self.slice(address, constants::WORD_BYTES)?,
        ))
    }

    /// Writes a 32-bit word.
    pub fn write_word(&mut self, address: u64, value: Word) -> Result<(), ()> {
        Endian::write_u32(self.slice_mut(address, constants::WORD_BYTES)?, value);
        Ok(())
    }

    /// Reads a 64-bit double word.
    pub fn read_double_word(&self, address: u64) -> Result<DoubleWord, ()> {
        Ok(Endian::read_u64(
            self.slice(address, constants::DOUBLE_WORD_BYTES)?,
        ))
    }

    /// Writes a 64-bit double word.
    pub fn write_double_word(&mut self, address: u64, value: DoubleWord) -> Result<(), ()> {
        Endian::write_u64(
            self.slice_mut(address, constants::DOUBLE_WORD_BYTES)?,
            value,
        );
        Ok(())
    }

    /// Copies a program image to the bottom of memory.
    pub fn load(&mut self, image: &[u8]) -> Result<(), ()> {
        if image.len() > self.data.len() {
            return Err(());
        }
        self.data[..image.len()].copy_from_slice(image);
        Ok(())
    }

    /// Walks memory a word at a time, yielding the address and value of
    /// every non-zero word. Used by the final state dump.
    pub fn non_zero_words(&self) -> impl Iterator<Item = (u64, Word)> + '_ {
        self.data
            .chunks_exact(constants::WORD_BYTES as usize)
            .enumerate()
            .filter_map(|(i, chunk)| {
                let word = Endian::read_u32(chunk);
                if word != 0 {
                    Some((i as u64 * u64::from(constants::WORD_BYTES), word))
                } else {
                    None
                }
            })
    }
}

impl Default for Memory {
    fn default() -> Memory {
        Memory::new()
    }
}
