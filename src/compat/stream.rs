//! Stream reordering driver
//!
//! The transform is a single fold over the upstream token/state pairs in
//! source order. A three-state machine decides, per token, whether it goes
//! straight to the output or into the accumulator of the most recently
//! opened heredoc; flush points append the rewritten bodies in opener order.
//! Two fixups run around the fold: the regexp-end state backfill (the
//! reference reports the state it *entered* a regexp with, not the state it
//! exits with) and the byte-order-mark shift on line 1.

use serde::Serialize;

use crate::compat::compare::CompatToken;
use crate::compat::events::Event;
use crate::compat::heredoc::Heredoc;
use crate::compat::location::SourceIndex;
use crate::compat::state::LexState;
use crate::compat::upstream::{
    event_for, Comment, CompatError, Diagnostic, LexedToken, UpstreamLexer, UpstreamOutput,
};

/// Where the driver is relative to open heredocs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    /// No heredoc in flight
    Default,
    /// An opener was seen and its body is being buffered
    HeredocOpened,
    /// The close token was buffered; waiting for the flush point
    HeredocClosed,
}

/// Everything one compat lex call produces
///
/// Comments, errors, and warnings pass through verbatim from the upstream
/// lexer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LexOutput {
    pub tokens: Vec<CompatToken>,
    pub comments: Vec<Comment>,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

/// Drives an upstream lexer and reshapes its output
pub struct LexCompat<L> {
    upstream: L,
}

impl<L: UpstreamLexer> LexCompat<L> {
    pub fn new(upstream: L) -> Self {
        Self { upstream }
    }

    /// Lex the source upstream and transform the result into the reference
    /// tokenizer's shape
    pub fn lex(&self, source: &str) -> Result<LexOutput, CompatError> {
        transform(source, self.upstream.lex(source))
    }
}

/// Transform an already-produced upstream output into the reference shape
///
/// The final end-of-file token is stripped: the reference tokenizer does not
/// emit it in comparable form.
pub fn transform(source: &str, upstream: UpstreamOutput) -> Result<LexOutput, CompatError> {
    let mut tokens = reshape(source, &upstream.tokens)?;
    tokens.pop();

    Ok(LexOutput {
        tokens,
        comments: upstream.comments,
        errors: upstream.errors,
        warnings: upstream.warnings,
    })
}

/// The fold itself, producing the full stream including the end-of-file
/// token
fn reshape(source: &str, pairs: &[LexedToken]) -> Result<Vec<CompatToken>, CompatError> {
    let index = SourceIndex::new(source);
    let mut output = Vec::with_capacity(pairs.len());
    let mut state = StreamState::Default;
    let mut heredocs: Vec<Heredoc> = Vec::new();
    let mut previous_state = LexState::EXPR_NONE;

    for (position, pair) in pairs.iter().enumerate() {
        let event = event_for(pair.token.kind)?;
        let location = index.position(pair.token.start_offset);

        let lex_state = if event == Event::RegexpEnd {
            regexp_entry_state(pairs, position, previous_state)
        } else {
            LexState::from_raw(pair.state)
        };

        let token = CompatToken::new(location, event, pair.token.value.clone(), lex_state);
        previous_state = token.state;

        match state {
            StreamState::Default => {
                if event == Event::HeredocBeg {
                    heredocs.push(Heredoc::build(&token.value));
                    output.push(token);
                    state = StreamState::HeredocOpened;
                } else {
                    output.push(token);
                }
            }
            StreamState::HeredocOpened => {
                let top = heredocs
                    .last_mut()
                    .expect("accumulator stack is non-empty while a heredoc is open");
                top.append(token);
                if event == Event::HeredocEnd {
                    state = StreamState::HeredocClosed;
                }
            }
            StreamState::HeredocClosed => {
                if event == Event::HeredocBeg {
                    heredocs.push(Heredoc::build(&token.value));
                    output.push(token);
                    state = StreamState::HeredocOpened;
                } else if flushes_heredocs(event, &token.value) {
                    output.push(token);
                    for heredoc in heredocs.drain(..) {
                        output.extend(heredoc.flush());
                    }
                    state = StreamState::Default;
                } else {
                    output.push(token);
                }
            }
        }
    }

    // End of input is a forced flush point; an unterminated heredoc is
    // tolerated and its buffered body still lands in opener order
    for heredoc in heredocs.drain(..) {
        output.extend(heredoc.flush());
    }

    if source.as_bytes().starts_with(BOM) {
        apply_bom_shift(&mut output);
    }

    Ok(output)
}

/// Whether an event ends the line that triggered heredoc buffering
fn flushes_heredocs(event: Event, value: &str) -> bool {
    matches!(event, Event::Nl | Event::IgnoredNl | Event::Comment)
        || (event == Event::TstringContent && value.ends_with('\n'))
}

/// The state the reference reports on a regexp close token
///
/// When the regexp ends right after an embedded expression, scan back to the
/// matching begin brace and reuse the upstream state captured there;
/// otherwise the state of the immediately preceding token stands in.
fn regexp_entry_state(
    pairs: &[LexedToken],
    position: usize,
    previous_state: LexState,
) -> LexState {
    use crate::compat::upstream::TokenKind;

    if position == 0 || pairs[position - 1].token.kind != TokenKind::EmbexprEnd {
        return previous_state;
    }

    let mut counter = 1;
    let mut cursor = position - 1;
    while cursor > 0 {
        cursor -= 1;
        match pairs[cursor].token.kind {
            TokenKind::EmbexprEnd => counter += 1,
            TokenKind::EmbexprBegin => {
                counter -= 1;
                if counter == 0 {
                    return LexState::from_raw(pairs[cursor].state);
                }
            }
            _ => {}
        }
    }

    previous_state
}

const BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Fold the byte-order mark into the first token and back-date line-1
/// columns by six bytes, matching the reference's historical behavior
fn apply_bom_shift(output: &mut [CompatToken]) {
    for token in output.iter_mut() {
        if token.position.line == 1 {
            token.position.column -= 6;
        }
    }
    if let Some(first) = output.first_mut() {
        first.value.insert_str(0, "\u{FEFF}");
    }
}
