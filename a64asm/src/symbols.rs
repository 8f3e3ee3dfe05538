use crate::{new_parser_error, Result};
use a64::constants::INSTRUCTION_BYTES;
use a64::insn::patch_displacement;
use a64::Word;
use pest::Span;
use std::collections::HashMap;

struct Pending<'i> {
    /// First reference, kept for the undefined-label diagnostic.
    span: Span<'i>,
    /// Byte addresses of emitted words awaiting this label.
    sites: Vec<u32>,
}

/// Label resolution for the single emission pass.
///
/// A reference to a not-yet-defined label is emitted with a zero
/// displacement and recorded; defining the label later rewrites every
/// recorded word with the real PC-relative offset in instruction
/// units.
pub struct SymbolTable<'i> {
    defined: HashMap<&'i str, u32>,
    pending: HashMap<&'i str, Pending<'i>>,
}

impl<'i> SymbolTable<'i> {
    pub fn new() -> SymbolTable<'i> {
        SymbolTable {
            defined: HashMap::new(),
            pending: HashMap::new(),
        }
    }

    /// Defines `name` at `address` and patches every pending site in
    /// `words`. Redefinition is an error, as is a pending word that
    /// carries no displacement field.
    pub fn define(
        &mut self,
        words: &mut [Word],
        name: &'i str,
        span: Span<'i>,
        address: u32,
    ) -> Result<()> {
        if self.defined.insert(name, address).is_some() {
            return Err(new_parser_error(
                span,
                format!("label \"{}\" is defined more than once", name),
            ));
        }

        if let Some(pending) = self.pending.remove(name) {
            for site in pending.sites {
                let index = (site / INSTRUCTION_BYTES) as usize;
                let offset = displacement(address, site);
                words[index] = patch_displacement(words[index], offset).ok_or_else(|| {
                    new_parser_error(
                        span,
                        format!(
                            "instruction at address {:#x} referencing \"{}\" carries no displacement",
                            site, name
                        ),
                    )
                })?;
            }
        }

        Ok(())
    }

    /// Resolves a reference from the instruction being emitted at
    /// `address`. Returns the offset in instruction units, or zero
    /// after recording a pending patch for an undefined label.
    pub fn resolve(&mut self, label: Span<'i>, address: u32) -> i32 {
        let name = label.as_str();
        if let Some(&target) = self.defined.get(name) {
            return displacement(target, address);
        }

        self.pending
            .entry(name)
            .or_insert_with(|| Pending {
                span: label,
                sites: Vec::new(),
            })
            .sites
            .push(address);
        0
    }

    /// End-of-assembly check: a leftover pending entry is an undefined
    /// label.
    pub fn finish(&self) -> Result<()> {
        match self.pending.iter().next() {
            Some((name, pending)) => Err(new_parser_error(
                pending.span,
                format!("undefined label \"{}\"", name),
            )),
            None => Ok(()),
        }
    }
}

fn displacement(target: u32, site: u32) -> i32 {
    ((i64::from(target) - i64::from(site)) / i64::from(INSTRUCTION_BYTES)) as i32
}

impl<'i> Default for SymbolTable<'i> {
    fn default() -> SymbolTable<'i> {
        SymbolTable::new()
    }
}
