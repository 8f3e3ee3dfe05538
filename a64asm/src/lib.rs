//! Assembler for the [a64](../a64/index.html) instruction subset.
//!
//! [`assemble`](fn.assemble.html) turns a source string into the
//! emitted instruction words plus a [`SourceMap`](type.SourceMap.html)
//! associating each word with its source line. The binary format is a
//! bare sequence of little-endian words, one per instruction, loaded
//! at address 0; [`program_to_bytes`](fn.program_to_bytes.html)
//! produces it.
//!
//! The source language is line oriented: one statement or label per
//! line, `/` starts a comment, labels end with `:`, and `.int` emits a
//! raw word. Parsing uses [pest], and the crate's [`Error`] type is an
//! alias of `pest::error::Error`, so every diagnostic points at the
//! offending span.
//!
//! Forward references are legal: a branch or load literal naming a
//! label that is not yet defined is emitted with a zero displacement
//! and patched in place once the label's address is known.
//!
//! [pest]: https://docs.rs/pest/

mod alias;
mod encode;
mod parser;
mod source_map;
mod symbols;


use a64::constants::INSTRUCTION_BYTES;
use a64::{Endian, Word};
use byteorder::ByteOrder;
use parser::AsmParser;
use pest::iterators::Pair;
use pest::{Parser, Span};

pub use parser::{AddrOffset, Operand, Reg, Rule};
pub use source_map::{line_for_address, SourceMap};
pub use symbols::SymbolTable;

pub type Error = pest::error::Error<Rule>;

pub type Result<T> = std::result::Result<T, Error>;

fn new_parser_error(span: Span, message: String) -> Error {
    Error::new_from_span(pest::error::ErrorVariant::CustomError { message }, span)
}

/// Assembles a whole source file.
pub fn assemble(input: &str) -> Result<(Vec<Word>, SourceMap)> {
    let program = parse(input)?;

    let mut words: Vec<Word> = Vec::new();
    let mut source_map = SourceMap::new();
    let mut symbols = SymbolTable::new();

    for pair in program.into_inner() {
        match pair.as_rule() {
            Rule::label_def => {
                let name = pair.into_inner().next().unwrap();
                let address = current_address(&words);
                symbols.define(&mut words, name.as_str(), name.as_span(), address)?;
            }
            Rule::statement => {
                let span = pair.as_span();
                let line = span.start_pos().line_col().0 as u32;
                let (mnemonic, mut operands) = parser::process_statement(pair)?;
                let mnemonic = alias::expand(mnemonic, &mut operands);
                let address = current_address(&words);
                let word = encode::encode(span, mnemonic, &operands, &mut symbols, address)?;
                words.push(word);
                source_map.push(line);
            }
            Rule::EOI => {}
            _ => unreachable!(),
        }
    }

    symbols.finish()?;

    Ok((words, source_map))
}

/// Assembles straight to the raw binary image.
pub fn assemble_to_bytes(input: &str) -> Result<Vec<u8>> {
    let (words, _) = assemble(input)?;
    Ok(program_to_bytes(&words))
}

/// Serializes emitted words as the flat little-endian binary format.
pub fn program_to_bytes(words: &[Word]) -> Vec<u8> {
    let mut bytes = vec![0u8; words.len() * INSTRUCTION_BYTES as usize];
    Endian::write_u32_into(words, &mut bytes);
    bytes
}

fn current_address(words: &[Word]) -> u32 {
    words.len() as u32 * INSTRUCTION_BYTES
}

fn parse(input: &str) -> Result<Pair<Rule>> {
    Ok(AsmParser::parse(Rule::program, input)?.next().unwrap())
}
