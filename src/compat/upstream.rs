//! Upstream lexer contract and token-kind mapping
//!
//! The upstream lexer is a black box to this crate: it exposes a single
//! lex-the-source operation whose output is consumed here. This module pins
//! down that contract (token kinds, token/state pairs, the surrounding
//! comment and diagnostic lists) and provides the total mapping from upstream
//! token kinds to reference event tags.
//!
//! The kind enumeration and its mapping table are the stable external
//! surface: adding an upstream kind requires adding a table entry, and
//! looking up a kind with no entry is a fatal precondition violation.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::compat::events::Event;

/// Token kinds produced by the upstream lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    Ampersand,
    AmpersandAmpersand,
    AmpersandAmpersandEqual,
    AmpersandDot,
    AmpersandEqual,
    BackReference,
    Backtick,
    Bang,
    BangEqual,
    BangTilde,
    BraceLeft,
    BraceRight,
    BracketLeft,
    BracketLeftArray,
    BracketLeftRight,
    BracketLeftRightEqual,
    BracketRight,
    Caret,
    CaretEqual,
    CharacterLiteral,
    ClassVariable,
    Colon,
    ColonColon,
    Comma,
    Comment,
    Constant,
    Dot,
    DotDot,
    DotDotDot,
    EmbdocBegin,
    EmbdocEnd,
    EmbdocLine,
    EmbexprBegin,
    EmbexprEnd,
    Embvar,
    Eof,
    Equal,
    EqualEqual,
    EqualEqualEqual,
    EqualGreater,
    EqualTilde,
    Float,
    FloatImaginary,
    FloatRational,
    FloatRationalImaginary,
    GlobalVariable,
    Greater,
    GreaterEqual,
    GreaterGreater,
    GreaterGreaterEqual,
    HeredocEnd,
    HeredocStart,
    Identifier,
    IgnoredNewline,
    InstanceVariable,
    Integer,
    IntegerImaginary,
    IntegerRational,
    IntegerRationalImaginary,
    #[serde(rename = "KEYWORD___ENCODING__")]
    KeywordEncoding,
    #[serde(rename = "KEYWORD___FILE__")]
    KeywordFile,
    #[serde(rename = "KEYWORD___LINE__")]
    KeywordLine,
    KeywordAlias,
    KeywordAnd,
    KeywordBegin,
    KeywordBeginUpcase,
    KeywordBreak,
    KeywordCase,
    KeywordClass,
    KeywordDef,
    KeywordDefined,
    KeywordDo,
    KeywordDoLoop,
    KeywordElse,
    KeywordElsif,
    KeywordEnd,
    KeywordEndUpcase,
    KeywordEnsure,
    KeywordFalse,
    KeywordFor,
    KeywordIf,
    KeywordIfModifier,
    KeywordIn,
    KeywordModule,
    KeywordNext,
    KeywordNil,
    KeywordNot,
    KeywordOr,
    KeywordRedo,
    KeywordRescue,
    KeywordRescueModifier,
    KeywordRetry,
    KeywordReturn,
    KeywordSelf,
    KeywordSuper,
    KeywordThen,
    KeywordTrue,
    KeywordUndef,
    KeywordUnless,
    KeywordUnlessModifier,
    KeywordUntil,
    KeywordUntilModifier,
    KeywordWhen,
    KeywordWhile,
    KeywordWhileModifier,
    KeywordYield,
    Label,
    LabelEnd,
    LambdaBegin,
    Less,
    LessEqual,
    LessEqualGreater,
    LessLess,
    LessLessEqual,
    Minus,
    MinusEqual,
    MinusGreater,
    Missing,
    Newline,
    NotProvided,
    NthReference,
    ParenthesisLeft,
    ParenthesisRight,
    Percent,
    PercentEqual,
    PercentLowerI,
    PercentLowerW,
    PercentLowerX,
    PercentUpperI,
    PercentUpperW,
    Pipe,
    PipeEqual,
    PipePipe,
    PipePipeEqual,
    Plus,
    PlusEqual,
    QuestionMark,
    RegexpBegin,
    RegexpEnd,
    Semicolon,
    Slash,
    SlashEqual,
    Star,
    StarEqual,
    StarStar,
    StarStarEqual,
    StringBegin,
    StringContent,
    StringEnd,
    SymbolBegin,
    Tilde,
    Uampersand,
    UcolonColon,
    UdotDot,
    UdotDotDot,
    Uminus,
    UminusNum,
    Uplus,
    #[serde(rename = "__END__")]
    UnderscoreEnd,
    Ustar,
    UstarStar,
    WordsSep,
}

/// A token as reported by the upstream lexer
///
/// Offsets are absolute byte offsets into the source buffer; `value` is the
/// verbatim source slice the token covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamToken {
    pub kind: TokenKind,
    pub start_offset: usize,
    pub end_offset: usize,
    pub value: String,
}

/// A token paired with the upstream lexer state captured at emission time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexedToken {
    pub token: UpstreamToken,
    pub state: u32,
}

/// A source comment, forwarded verbatim from the upstream lexer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub start_offset: usize,
    pub end_offset: usize,
    pub value: String,
}

/// An error or warning, forwarded verbatim from the upstream lexer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub start_offset: usize,
    pub message: String,
}

/// Everything one upstream `lex` call produces
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpstreamOutput {
    /// Token/state pairs in source order, ending with the end-of-file token
    #[serde(rename = "value")]
    pub tokens: Vec<LexedToken>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub errors: Vec<Diagnostic>,
    #[serde(default)]
    pub warnings: Vec<Diagnostic>,
}

/// The upstream lexer seam
///
/// Implementations wrap whatever produces the upstream token stream: the
/// real lexer linked in as a library, a canned fixture in tests, or a replay
/// of a serialized dump in the conformance harness.
pub trait UpstreamLexer {
    fn lex(&self, source: &str) -> UpstreamOutput;
}

/// Errors produced by the transform
#[derive(Debug, Clone, PartialEq)]
pub enum CompatError {
    /// An upstream kind with no reference event mapping reached the transform
    UnknownKind(TokenKind),
}

impl fmt::Display for CompatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompatError::UnknownKind(kind) => {
                write!(f, "no reference event mapping for upstream token kind {:?}", kind)
            }
        }
    }
}

impl std::error::Error for CompatError {}

/// The many-to-one mapping from upstream token kinds to reference events
///
/// Kinds the reference has no counterpart for (`Missing`, `NotProvided`) are
/// deliberately absent; encountering one at runtime is the fail-fast path.
static EVENTS: Lazy<HashMap<TokenKind, Event>> = Lazy::new(|| {
    use Event::*;
    use TokenKind as K;

    HashMap::from([
        (K::Ampersand, Op),
        (K::AmpersandAmpersand, Op),
        (K::AmpersandAmpersandEqual, Op),
        (K::AmpersandDot, Op),
        (K::AmpersandEqual, Op),
        (K::BackReference, Backref),
        (K::Backtick, Event::Backtick),
        (K::Bang, Op),
        (K::BangEqual, Op),
        (K::BangTilde, Op),
        (K::BraceLeft, Lbrace),
        (K::BraceRight, Rbrace),
        (K::BracketLeft, Lbracket),
        (K::BracketLeftArray, Lbracket),
        (K::BracketLeftRight, Op),
        (K::BracketLeftRightEqual, Op),
        (K::BracketRight, Rbracket),
        (K::Caret, Op),
        (K::CaretEqual, Op),
        (K::CharacterLiteral, CharLiteral),
        (K::ClassVariable, Cvar),
        (K::Colon, Op),
        (K::ColonColon, Op),
        (K::Comma, Event::Comma),
        (K::Comment, Event::Comment),
        (K::Constant, Const),
        (K::Dot, Period),
        (K::DotDot, Op),
        (K::DotDotDot, Op),
        (K::EmbdocBegin, EmbdocBeg),
        (K::EmbdocEnd, Event::EmbdocEnd),
        (K::EmbdocLine, Embdoc),
        (K::EmbexprBegin, EmbexprBeg),
        (K::EmbexprEnd, Event::EmbexprEnd),
        (K::Embvar, Event::Embvar),
        (K::Eof, Eof),
        (K::Equal, Op),
        (K::EqualEqual, Op),
        (K::EqualEqualEqual, Op),
        (K::EqualGreater, Op),
        (K::EqualTilde, Op),
        (K::Float, Event::Float),
        (K::FloatImaginary, Imaginary),
        (K::FloatRational, Rational),
        (K::FloatRationalImaginary, Imaginary),
        (K::GlobalVariable, Gvar),
        (K::Greater, Op),
        (K::GreaterEqual, Op),
        (K::GreaterGreater, Op),
        (K::GreaterGreaterEqual, Op),
        (K::HeredocEnd, Event::HeredocEnd),
        (K::HeredocStart, HeredocBeg),
        (K::Identifier, Ident),
        (K::IgnoredNewline, IgnoredNl),
        (K::InstanceVariable, Ivar),
        (K::Integer, Int),
        (K::IntegerImaginary, Imaginary),
        (K::IntegerRational, Rational),
        (K::IntegerRationalImaginary, Imaginary),
        (K::KeywordEncoding, Kw),
        (K::KeywordFile, Kw),
        (K::KeywordLine, Kw),
        (K::KeywordAlias, Kw),
        (K::KeywordAnd, Kw),
        (K::KeywordBegin, Kw),
        (K::KeywordBeginUpcase, Kw),
        (K::KeywordBreak, Kw),
        (K::KeywordCase, Kw),
        (K::KeywordClass, Kw),
        (K::KeywordDef, Kw),
        (K::KeywordDefined, Kw),
        (K::KeywordDo, Kw),
        (K::KeywordDoLoop, Kw),
        (K::KeywordElse, Kw),
        (K::KeywordElsif, Kw),
        (K::KeywordEnd, Kw),
        (K::KeywordEndUpcase, Kw),
        (K::KeywordEnsure, Kw),
        (K::KeywordFalse, Kw),
        (K::KeywordFor, Kw),
        (K::KeywordIf, Kw),
        (K::KeywordIfModifier, Kw),
        (K::KeywordIn, Kw),
        (K::KeywordModule, Kw),
        (K::KeywordNext, Kw),
        (K::KeywordNil, Kw),
        (K::KeywordNot, Kw),
        (K::KeywordOr, Kw),
        (K::KeywordRedo, Kw),
        (K::KeywordRescue, Kw),
        (K::KeywordRescueModifier, Kw),
        (K::KeywordRetry, Kw),
        (K::KeywordReturn, Kw),
        (K::KeywordSelf, Kw),
        (K::KeywordSuper, Kw),
        (K::KeywordThen, Kw),
        (K::KeywordTrue, Kw),
        (K::KeywordUndef, Kw),
        (K::KeywordUnless, Kw),
        (K::KeywordUnlessModifier, Kw),
        (K::KeywordUntil, Kw),
        (K::KeywordUntilModifier, Kw),
        (K::KeywordWhen, Kw),
        (K::KeywordWhile, Kw),
        (K::KeywordWhileModifier, Kw),
        (K::KeywordYield, Kw),
        (K::Label, Event::Label),
        (K::LabelEnd, Event::LabelEnd),
        (K::LambdaBegin, TlamBeg),
        (K::Less, Op),
        (K::LessEqual, Op),
        (K::LessEqualGreater, Op),
        (K::LessLess, Op),
        (K::LessLessEqual, Op),
        (K::Minus, Op),
        (K::MinusEqual, Op),
        (K::MinusGreater, Tlambda),
        (K::Newline, Nl),
        (K::NthReference, Backref),
        (K::ParenthesisLeft, Lparen),
        (K::ParenthesisRight, Rparen),
        (K::Percent, Op),
        (K::PercentEqual, Op),
        (K::PercentLowerI, QsymbolsBeg),
        (K::PercentLowerW, QwordsBeg),
        (K::PercentLowerX, Event::Backtick),
        (K::PercentUpperI, SymbolsBeg),
        (K::PercentUpperW, WordsBeg),
        (K::Pipe, Op),
        (K::PipeEqual, Op),
        (K::PipePipe, Op),
        (K::PipePipeEqual, Op),
        (K::Plus, Op),
        (K::PlusEqual, Op),
        (K::QuestionMark, Op),
        (K::RegexpBegin, RegexpBeg),
        (K::RegexpEnd, Event::RegexpEnd),
        (K::Semicolon, Event::Semicolon),
        (K::Slash, Op),
        (K::SlashEqual, Op),
        (K::Star, Op),
        (K::StarEqual, Op),
        (K::StarStar, Op),
        (K::StarStarEqual, Op),
        (K::StringBegin, TstringBeg),
        (K::StringContent, TstringContent),
        (K::StringEnd, TstringEnd),
        (K::SymbolBegin, Symbeg),
        (K::Tilde, Op),
        (K::Uampersand, Op),
        (K::UcolonColon, Op),
        (K::UdotDot, Op),
        (K::UdotDotDot, Op),
        (K::Uminus, Op),
        (K::UminusNum, Op),
        (K::Uplus, Op),
        (K::UnderscoreEnd, EndMarker),
        (K::Ustar, Op),
        (K::UstarStar, Op),
        (K::WordsSep, Event::WordsSep),
    ])
});

/// Translate an upstream token kind to its reference event tag
pub fn event_for(kind: TokenKind) -> Result<Event, CompatError> {
    EVENTS.get(&kind).copied().ok_or(CompatError::UnknownKind(kind))
}
