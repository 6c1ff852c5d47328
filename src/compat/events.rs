//! Reference tokenizer event set
//!
//! Every output token carries one of the reference tokenizer's event tags.
//! The set is closed: the kind map in [`crate::compat::upstream`] is the only
//! producer, plus the two synthetic events the heredoc rewriters emit
//! (`ignored_sp`) and the driver strips (`eof`).

use serde::{Serialize, Serializer};

/// An event tag from the reference tokenizer's closed event set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    Backref,
    Backtick,
    CharLiteral,
    Comma,
    Comment,
    Const,
    Cvar,
    Embdoc,
    EmbdocBeg,
    EmbdocEnd,
    EmbexprBeg,
    EmbexprEnd,
    Embvar,
    EndMarker,
    Eof,
    Float,
    Gvar,
    HeredocBeg,
    HeredocEnd,
    Ident,
    IgnoredNl,
    IgnoredSp,
    Imaginary,
    Int,
    Ivar,
    Kw,
    Label,
    LabelEnd,
    Lbrace,
    Lbracket,
    Lparen,
    Nl,
    Op,
    Period,
    QsymbolsBeg,
    QwordsBeg,
    Rational,
    Rbrace,
    Rbracket,
    RegexpBeg,
    RegexpEnd,
    Rparen,
    Semicolon,
    Symbeg,
    SymbolsBeg,
    Tlambda,
    TlamBeg,
    TstringBeg,
    TstringContent,
    TstringEnd,
    WordsBeg,
    WordsSep,
}

impl Event {
    /// The reference's `on_*` spelling of this event
    pub fn name(self) -> &'static str {
        match self {
            Event::Backref => "on_backref",
            Event::Backtick => "on_backtick",
            Event::CharLiteral => "on_CHAR",
            Event::Comma => "on_comma",
            Event::Comment => "on_comment",
            Event::Const => "on_const",
            Event::Cvar => "on_cvar",
            Event::Embdoc => "on_embdoc",
            Event::EmbdocBeg => "on_embdoc_beg",
            Event::EmbdocEnd => "on_embdoc_end",
            Event::EmbexprBeg => "on_embexpr_beg",
            Event::EmbexprEnd => "on_embexpr_end",
            Event::Embvar => "on_embvar",
            Event::EndMarker => "on___end__",
            Event::Eof => "on_eof",
            Event::Float => "on_float",
            Event::Gvar => "on_gvar",
            Event::HeredocBeg => "on_heredoc_beg",
            Event::HeredocEnd => "on_heredoc_end",
            Event::Ident => "on_ident",
            Event::IgnoredNl => "on_ignored_nl",
            Event::IgnoredSp => "on_ignored_sp",
            Event::Imaginary => "on_imaginary",
            Event::Int => "on_int",
            Event::Ivar => "on_ivar",
            Event::Kw => "on_kw",
            Event::Label => "on_label",
            Event::LabelEnd => "on_label_end",
            Event::Lbrace => "on_lbrace",
            Event::Lbracket => "on_lbracket",
            Event::Lparen => "on_lparen",
            Event::Nl => "on_nl",
            Event::Op => "on_op",
            Event::Period => "on_period",
            Event::QsymbolsBeg => "on_qsymbols_beg",
            Event::QwordsBeg => "on_qwords_beg",
            Event::Rational => "on_rational",
            Event::Rbrace => "on_rbrace",
            Event::Rbracket => "on_rbracket",
            Event::RegexpBeg => "on_regexp_beg",
            Event::RegexpEnd => "on_regexp_end",
            Event::Rparen => "on_rparen",
            Event::Semicolon => "on_semicolon",
            Event::Symbeg => "on_symbeg",
            Event::SymbolsBeg => "on_symbols_beg",
            Event::Tlambda => "on_tlambda",
            Event::TlamBeg => "on_tlambeg",
            Event::TstringBeg => "on_tstring_beg",
            Event::TstringContent => "on_tstring_content",
            Event::TstringEnd => "on_tstring_end",
            Event::WordsBeg => "on_words_beg",
            Event::WordsSep => "on_words_sep",
        }
    }
}

impl Serialize for Event {
    /// Events serialize as their `on_*` spelling
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}
