//! Test factories for building tokens and upstream streams succinctly

use crate::compat::compare::CompatToken;
use crate::compat::events::Event;
use crate::compat::location::Position;
use crate::compat::state::LexState;
use crate::compat::upstream::{LexedToken, TokenKind, UpstreamLexer, UpstreamOutput, UpstreamToken};

/// Make an output token at a line/column position
pub fn tok(line: usize, column: isize, event: Event, value: &str, state: LexState) -> CompatToken {
    CompatToken::new(Position::new(line, column), event, value.to_string(), state)
}

/// Make an upstream token/state pair; the end offset follows from the value
pub fn lexed(kind: TokenKind, start_offset: usize, value: &str, state: u32) -> LexedToken {
    LexedToken {
        token: UpstreamToken {
            kind,
            start_offset,
            end_offset: start_offset + value.len(),
            value: value.to_string(),
        },
        state,
    }
}

/// An upstream lexer that replays a fixed output, for driving the transform
/// end-to-end in tests
pub struct CannedLexer {
    output: UpstreamOutput,
}

impl CannedLexer {
    pub fn new(output: UpstreamOutput) -> Self {
        Self { output }
    }
}

impl UpstreamLexer for CannedLexer {
    fn lex(&self, _source: &str) -> UpstreamOutput {
        self.output.clone()
    }
}
