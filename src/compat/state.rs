//! Reference lexer state bitset
//!
//! The reference tokenizer attaches a bitset of expression states to every
//! token it emits. The upstream lexer reports the same states as a raw
//! integer; this module wraps them in a typed bitset with the reference's
//! names, the compound masks used by the comparison relaxations, and a
//! `EXPR_BEG|EXPR_LABEL`-style rendering for diagnostics.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

bitflags! {
    /// Expression state of the reference lexer at token emission time
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LexState: u32 {
        const EXPR_BEG = 1 << 0;
        const EXPR_END = 1 << 1;
        const EXPR_ENDARG = 1 << 2;
        const EXPR_ENDFN = 1 << 3;
        const EXPR_ARG = 1 << 4;
        const EXPR_CMDARG = 1 << 5;
        const EXPR_MID = 1 << 6;
        const EXPR_FNAME = 1 << 7;
        const EXPR_DOT = 1 << 8;
        const EXPR_CLASS = 1 << 9;
        const EXPR_LABEL = 1 << 10;
        const EXPR_LABELED = 1 << 11;
        const EXPR_FITEM = 1 << 12;

        // Compound masks, as the reference names them
        const EXPR_BEG_ANY =
            Self::EXPR_BEG.bits() | Self::EXPR_MID.bits() | Self::EXPR_CLASS.bits();
        const EXPR_ARG_ANY = Self::EXPR_ARG.bits() | Self::EXPR_CMDARG.bits();
        const EXPR_END_ANY =
            Self::EXPR_END.bits() | Self::EXPR_ENDARG.bits() | Self::EXPR_ENDFN.bits();
    }
}

impl LexState {
    pub const EXPR_NONE: LexState = LexState::empty();

    /// Wrap a raw upstream state integer, keeping unknown bits as-is
    pub fn from_raw(bits: u32) -> Self {
        LexState::from_bits_retain(bits)
    }
}

const NAMED_BITS: &[(LexState, &str)] = &[
    (LexState::EXPR_BEG, "EXPR_BEG"),
    (LexState::EXPR_END, "EXPR_END"),
    (LexState::EXPR_ENDARG, "EXPR_ENDARG"),
    (LexState::EXPR_ENDFN, "EXPR_ENDFN"),
    (LexState::EXPR_ARG, "EXPR_ARG"),
    (LexState::EXPR_CMDARG, "EXPR_CMDARG"),
    (LexState::EXPR_MID, "EXPR_MID"),
    (LexState::EXPR_FNAME, "EXPR_FNAME"),
    (LexState::EXPR_DOT, "EXPR_DOT"),
    (LexState::EXPR_CLASS, "EXPR_CLASS"),
    (LexState::EXPR_LABEL, "EXPR_LABEL"),
    (LexState::EXPR_LABELED, "EXPR_LABELED"),
    (LexState::EXPR_FITEM, "EXPR_FITEM"),
];

impl fmt::Display for LexState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "EXPR_NONE");
        }

        let mut first = true;
        for (bit, name) in NAMED_BITS {
            if self.contains(*bit) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{}", name)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl Serialize for LexState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> Deserialize<'de> for LexState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(LexState::from_raw(u32::deserialize(deserializer)?))
    }
}
