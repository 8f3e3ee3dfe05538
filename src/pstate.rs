use crate::insn::Cond;
use std::fmt;

/// The four condition flags.
///
/// The reset state has only Z set, matching a zeroed register file
/// (the "result" of nothing is zero).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Pstate {
    pub negative: bool,
    pub zero: bool,
    pub carry: bool,
    pub overflow: bool,
}

impl Pstate {
    /// Evaluates a branch condition against the current flags.
    pub fn holds(&self, cond: Cond) -> bool {
        match cond {
            Cond::EQ => self.zero,
            Cond::NE => !self.zero,
            Cond::GE => self.negative == self.overflow,
            Cond::LT => self.negative != self.overflow,
            Cond::GT => !self.zero && self.negative == self.overflow,
            Cond::LE => !(!self.zero && self.negative == self.overflow),
            Cond::AL => true,
        }
    }
}

impl Default for Pstate {
    fn default() -> Pstate {
        Pstate {
            negative: false,
            zero: true,
            carry: false,
            overflow: false,
        }
    }
}

impl fmt::Display for Pstate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}",
            if self.negative { "N" } else { "-" },
            if self.zero { "Z" } else { "-" },
            if self.carry { "C" } else { "-" },
            if self.overflow { "V" } else { "-" }
        )
    }
}
