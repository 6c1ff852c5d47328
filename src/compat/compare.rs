//! Comparison-flavored output tokens
//!
//! Output tokens are 4-tuples of position, event, value, and lexer state,
//! compared against reference-produced tuples. A handful of events carry
//! deliberate divergences from the reference (documented per flavor below),
//! so each token is tagged with a comparison flavor that relaxes equality
//! for exactly those cases.

use std::fmt;

use serde::ser::SerializeTuple;
use serde::{Serialize, Serializer};

use crate::compat::events::Event;
use crate::compat::location::Position;
use crate::compat::state::LexState;

/// How a token compares against its reference counterpart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    /// Full 4-tuple equality
    Plain,
    /// End-of-file marker that may carry trailing source: only the first
    /// line of the value participates
    EndContent,
    /// Comments and heredoc close tokens: the state is not compared
    IgnoreState,
    /// Identifiers lexed in `EXPR_END|EXPR_LABEL`: we track local names the
    /// reference does not (regex named captures), so the reference may land
    /// in a different state and the state is not compared
    Ident,
    /// Ignored newlines: an `EXPR_ARG|EXPR_LABELED` state on our side
    /// accepts any reference state with overlapping bits
    IgnoredNewline,
}

/// Pick the comparison flavor for a token about to be emitted
pub fn flavor_for(event: Event, state: LexState) -> Flavor {
    match event {
        Event::EndMarker => Flavor::EndContent,
        Event::Comment | Event::HeredocEnd => Flavor::IgnoreState,
        Event::Ident | Event::EmbexprEnd
            if state == (LexState::EXPR_END | LexState::EXPR_LABEL) =>
        {
            Flavor::Ident
        }
        Event::IgnoredNl => Flavor::IgnoredNewline,
        _ => Flavor::Plain,
    }
}

/// An output token in the reference tokenizer's shape
#[derive(Debug, Clone)]
pub struct CompatToken {
    pub position: Position,
    pub event: Event,
    pub value: String,
    pub state: LexState,
    pub flavor: Flavor,
}

impl CompatToken {
    /// Build a token, deriving its comparison flavor from event and state
    pub fn new(position: Position, event: Event, value: String, state: LexState) -> Self {
        let flavor = flavor_for(event, state);
        Self { position, event, value, state, flavor }
    }
}

fn first_line(value: &str) -> &str {
    value.split('\n').next().unwrap_or(value)
}

impl PartialEq for CompatToken {
    /// Flavor-relaxed equality; the left-hand side is the shim's token
    fn eq(&self, other: &Self) -> bool {
        if self.position != other.position || self.event != other.event {
            return false;
        }

        match self.flavor {
            Flavor::Plain => self.value == other.value && self.state == other.state,
            Flavor::EndContent => {
                first_line(&self.value) == first_line(&other.value) && self.state == other.state
            }
            Flavor::IgnoreState => self.value == other.value,
            // States match when either side is EXPR_END|EXPR_LABEL or has
            // an EXPR_ARG_ANY bit; this flavor is only selected when our
            // side carries EXPR_END|EXPR_LABEL, so that disjunction already
            // holds and no reference state can disqualify the token
            Flavor::Ident => self.value == other.value,
            Flavor::IgnoredNewline => {
                if self.value != other.value {
                    return false;
                }
                // The reference publishes this check with `==` binding
                // tighter than `|`; the intended rule is any overlap of the
                // EXPR_ARG|EXPR_LABELED bits, implemented here as written.
                let mask = LexState::EXPR_ARG | LexState::EXPR_LABELED;
                if self.state == mask {
                    other.state.intersects(mask)
                } else {
                    self.state == other.state
                }
            }
        }
    }
}

impl Serialize for CompatToken {
    /// Tokens serialize as the reference's `[[line, column], event, value,
    /// state]` tuple
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(4)?;
        tuple.serialize_element(&self.position)?;
        tuple.serialize_element(&self.event)?;
        tuple.serialize_element(&self.value)?;
        tuple.serialize_element(&self.state)?;
        tuple.end()
    }
}

impl fmt::Display for CompatToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {:?}, {}]",
            self.position,
            self.event.name(),
            self.value,
            self.state
        )
    }
}

/// The first point where two token streams disagree
#[derive(Debug, Clone, PartialEq)]
pub enum Mismatch {
    /// The streams have different lengths
    Length { ours: usize, reference: usize },
    /// The streams disagree at `index` under the flavor rules
    Token { index: usize, ours: Box<CompatToken>, reference: Box<CompatToken> },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::Length { ours, reference } => {
                write!(f, "stream lengths differ: ours {} vs reference {}", ours, reference)
            }
            Mismatch::Token { index, ours, reference } => {
                write!(f, "token {} differs: ours {} vs reference {}", index, ours, reference)
            }
        }
    }
}

/// Compare a transformed stream against a reference stream position by
/// position, returning the first divergence
pub fn compare(ours: &[CompatToken], reference: &[CompatToken]) -> Option<Mismatch> {
    for (index, (token, other)) in ours.iter().zip(reference.iter()).enumerate() {
        if token != other {
            return Some(Mismatch::Token {
                index,
                ours: Box::new(token.clone()),
                reference: Box::new(other.clone()),
            });
        }
    }

    if ours.len() != reference.len() {
        return Some(Mismatch::Length { ours: ours.len(), reference: reference.len() });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn token(event: Event, value: &str, state: LexState) -> CompatToken {
        CompatToken::new(Position::new(1, 0), event, value.to_string(), state)
    }

    #[test]
    fn test_plain_requires_full_equality() {
        let ours = token(Event::Int, "1", LexState::EXPR_END);
        let same = token(Event::Int, "1", LexState::EXPR_END);
        let other_state = token(Event::Int, "1", LexState::EXPR_BEG);
        let other_value = token(Event::Int, "2", LexState::EXPR_END);

        assert_eq!(ours, same);
        assert_ne!(ours, other_state);
        assert_ne!(ours, other_value);
    }

    #[test]
    fn test_position_always_participates() {
        let ours = token(Event::Comment, "# hi\n", LexState::EXPR_BEG);
        let mut moved = token(Event::Comment, "# hi\n", LexState::EXPR_BEG);
        moved.position = Position::new(2, 0);

        assert_ne!(ours, moved);
    }

    #[test]
    fn test_end_content_compares_first_line_only() {
        let ours = token(Event::EndMarker, "__END__\ntrailing data", LexState::EXPR_NONE);
        let reference = token(Event::EndMarker, "__END__\n", LexState::EXPR_NONE);

        assert_eq!(ours, reference);

        let different = token(Event::EndMarker, "__DATA__\n", LexState::EXPR_NONE);
        assert_ne!(ours, different);
    }

    #[rstest]
    #[case(Event::Comment, "# note\n")]
    #[case(Event::HeredocEnd, "FOO\n")]
    fn test_ignore_state_flavor(#[case] event: Event, #[case] value: &str) {
        let ours = token(event, value, LexState::EXPR_BEG);
        let reference = token(event, value, LexState::EXPR_END | LexState::EXPR_LABEL);

        assert_eq!(ours.flavor, Flavor::IgnoreState);
        assert_eq!(ours, reference);
    }

    #[test]
    fn test_ident_flavor_selection() {
        let relaxed = token(Event::Ident, "a", LexState::EXPR_END | LexState::EXPR_LABEL);
        assert_eq!(relaxed.flavor, Flavor::Ident);

        let strict = token(Event::Ident, "a", LexState::EXPR_END);
        assert_eq!(strict.flavor, Flavor::Plain);

        let embexpr = token(Event::EmbexprEnd, "}", LexState::EXPR_END | LexState::EXPR_LABEL);
        assert_eq!(embexpr.flavor, Flavor::Ident);
    }

    #[test]
    fn test_ident_accepts_any_reference_state() {
        // Our side carries EXPR_END|EXPR_LABEL whenever this flavor is
        // active, which alone satisfies the either-side state rule
        let ours = token(Event::Ident, "a", LexState::EXPR_END | LexState::EXPR_LABEL);

        let end_label = token(Event::Ident, "a", LexState::EXPR_END | LexState::EXPR_LABEL);
        let arg = token(Event::Ident, "a", LexState::EXPR_ARG);
        let cmdarg = token(Event::Ident, "a", LexState::EXPR_CMDARG | LexState::EXPR_LABEL);
        let beg = token(Event::Ident, "a", LexState::EXPR_BEG);
        let fname = token(Event::Ident, "a", LexState::EXPR_FNAME);

        assert_eq!(ours, end_label);
        assert_eq!(ours, arg);
        assert_eq!(ours, cmdarg);
        assert_eq!(ours, beg);
        assert_eq!(ours, fname);

        // The value still participates
        let other_value = token(Event::Ident, "b", LexState::EXPR_BEG);
        assert_ne!(ours, other_value);
    }

    #[test]
    fn test_ignored_newline_overlap_rule() {
        let mask = LexState::EXPR_ARG | LexState::EXPR_LABELED;
        let ours = token(Event::IgnoredNl, "\n", mask);

        let arg_only = token(Event::IgnoredNl, "\n", LexState::EXPR_ARG);
        let labeled_plus = token(Event::IgnoredNl, "\n", LexState::EXPR_LABELED | LexState::EXPR_BEG);
        let disjoint = token(Event::IgnoredNl, "\n", LexState::EXPR_BEG);

        assert_eq!(ours, arg_only);
        assert_eq!(ours, labeled_plus);
        assert_ne!(ours, disjoint);
    }

    #[test]
    fn test_ignored_newline_exact_when_not_masked() {
        let ours = token(Event::IgnoredNl, "\n", LexState::EXPR_BEG);
        let same = token(Event::IgnoredNl, "\n", LexState::EXPR_BEG);
        let different = token(Event::IgnoredNl, "\n", LexState::EXPR_ARG);

        assert_eq!(ours, same);
        assert_ne!(ours, different);
    }

    #[test]
    fn test_compare_reports_first_divergence() {
        let ours = vec![
            token(Event::Ident, "a", LexState::EXPR_CMDARG),
            token(Event::Op, "=", LexState::EXPR_BEG),
        ];
        let reference = vec![
            token(Event::Ident, "a", LexState::EXPR_CMDARG),
            token(Event::Op, "+", LexState::EXPR_BEG),
        ];

        match compare(&ours, &reference) {
            Some(Mismatch::Token { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected token mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_compare_reports_length_difference() {
        let ours = vec![token(Event::Ident, "a", LexState::EXPR_CMDARG)];

        assert_eq!(
            compare(&ours, &[]),
            Some(Mismatch::Length { ours: 1, reference: 0 })
        );
        assert_eq!(compare(&ours, &ours.clone()), None);
    }

    #[test]
    fn test_token_serializes_as_reference_tuple() {
        let ours = CompatToken::new(
            Position::new(2, 4),
            Event::Ident,
            "foo".to_string(),
            LexState::EXPR_CMDARG,
        );
        let json = serde_json::to_string(&ours).unwrap();
        assert_eq!(json, "[[2,4],\"on_ident\",\"foo\",32]");
    }
}
