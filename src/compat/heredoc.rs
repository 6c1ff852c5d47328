//! Heredoc accumulators
//!
//! The upstream lexer emits heredoc body tokens immediately after the opener
//! token, while the reference emits them after the line that contains the
//! opener. The stream driver buffers body tokens in an accumulator per open
//! heredoc and appends the rewritten bodies at the flush point.
//!
//! Three accumulator strategies exist, selected from the opener token's
//! textual value:
//!
//! - *Plain* (`<<FOO`): bodies flush unchanged.
//! - *Dash* (`<<-FOO`): interpolating bodies are additionally split on
//!   backslash-newline, because the reference emits one string-content token
//!   per continued line.
//! - *Dedenting* (`<<~FOO`): the minimum common leading whitespace across
//!   body lines is computed with 8-column tab stops, and the flush rewrites
//!   each line into a synthetic `ignored_sp` token carrying the elided
//!   prefix followed by the shortened string content, reconstructing the
//!   whitespace-elision tokens the upstream lexer never emits.
//!
//! Tokens inside embedded expressions are never dedent-analyzed; each
//! strategy tracks the begin/end brace balance while walking its buffer.

use crate::compat::compare::CompatToken;
use crate::compat::events::Event;
use crate::compat::location::Position;

/// Tab stops for dedent computation are multiples of eight columns
pub(crate) const TAB_WIDTH: usize = 8;

/// Advance a tab-expanded column count by one character
fn advance_tab_stop(width: usize, c: char) -> usize {
    if c == '\t' {
        width - (width % TAB_WIDTH) + TAB_WIDTH
    } else {
        width + 1
    }
}

/// Nesting depth of embedded expressions within a heredoc body
///
/// Each walk over a buffer owns its own balance; the counter is shared
/// logic, not shared state.
#[derive(Debug, Default)]
struct EmbexprBalance {
    depth: i32,
}

impl EmbexprBalance {
    fn observe(&mut self, event: Event) {
        match event {
            Event::EmbexprBeg => self.depth += 1,
            Event::EmbexprEnd => self.depth -= 1,
            _ => {}
        }
    }

    fn is_open(&self) -> bool {
        self.depth > 0
    }
}

/// An accumulator for one open heredoc
#[derive(Debug)]
pub enum Heredoc {
    Plain(PlainHeredoc),
    Dash(DashHeredoc),
    Dedenting(DedentingHeredoc),
}

impl Heredoc {
    /// Select the accumulator strategy from the opener token's value
    ///
    /// The third byte of the opener disambiguates (`<<~` / `<<-` / plain);
    /// a dash opener splits on backslash-newline unless the delimiter is
    /// single-quoted (non-interpolating).
    pub fn build(opener_value: &str) -> Self {
        let bytes = opener_value.as_bytes();
        match bytes.get(2).copied() {
            Some(b'~') => Heredoc::Dedenting(DedentingHeredoc::default()),
            Some(b'-') => Heredoc::Dash(DashHeredoc {
                tokens: Vec::new(),
                split: bytes.get(3) != Some(&b'\''),
            }),
            _ => Heredoc::Plain(PlainHeredoc::default()),
        }
    }

    pub fn append(&mut self, token: CompatToken) {
        match self {
            Heredoc::Plain(heredoc) => heredoc.tokens.push(token),
            Heredoc::Dash(heredoc) => heredoc.tokens.push(token),
            Heredoc::Dedenting(heredoc) => heredoc.append(token),
        }
    }

    /// Consume the accumulator, yielding the rewritten body tokens
    pub fn flush(self) -> Vec<CompatToken> {
        match self {
            Heredoc::Plain(heredoc) => heredoc.tokens,
            Heredoc::Dash(heredoc) => heredoc.flush(),
            Heredoc::Dedenting(heredoc) => heredoc.flush(),
        }
    }
}

/// Buffers body tokens verbatim
#[derive(Debug, Default)]
pub struct PlainHeredoc {
    tokens: Vec<CompatToken>,
}

/// Buffers body tokens and splits interpolating content on backslash-newline
#[derive(Debug)]
pub struct DashHeredoc {
    tokens: Vec<CompatToken>,
    split: bool,
}

impl DashHeredoc {
    fn flush(self) -> Vec<CompatToken> {
        let mut results = Vec::with_capacity(self.tokens.len());
        let mut balance = EmbexprBalance::default();

        for token in self.tokens {
            balance.observe(token.event);

            if token.event == Event::TstringContent && self.split && !balance.is_open() {
                // The delimiter stays on the preceding segment, so each
                // emitted token still covers its verbatim source slice
                let mut line = token.position.line;
                for (index, segment) in token.value.split_inclusive("\\\n").enumerate() {
                    let column = if index == 0 { token.position.column } else { 0 };
                    results.push(CompatToken::new(
                        Position::new(line, column),
                        Event::TstringContent,
                        segment.to_string(),
                        token.state,
                    ));
                    line += segment.matches('\n').count();
                }
            } else {
                results.push(token);
            }
        }

        results
    }
}

/// Buffers body tokens while computing the common leading whitespace, then
/// rewrites the body with synthetic `ignored_sp` tokens on flush
#[derive(Debug)]
pub struct DedentingHeredoc {
    tokens: Vec<CompatToken>,
    /// Minimum tab-expanded leading-whitespace width over non-blank body
    /// lines; `None` until one has been seen
    dedent: Option<usize>,
    /// Whether the next string-content token begins a fresh line
    dedent_next: bool,
    balance: EmbexprBalance,
}

impl Default for DedentingHeredoc {
    fn default() -> Self {
        Self {
            tokens: Vec::new(),
            dedent: None,
            dedent_next: true,
            balance: EmbexprBalance::default(),
        }
    }
}

impl DedentingHeredoc {
    fn append(&mut self, token: CompatToken) {
        self.balance.observe(token.event);

        if token.event == Event::TstringContent && !self.balance.is_open() {
            self.measure(&token.value);
        }

        self.dedent_next = token.event == Event::TstringContent && !self.balance.is_open();
        self.tokens.push(token);
    }

    /// Fold one content value into the running dedent minimum
    fn measure(&mut self, value: &str) {
        for (index, line) in value.split_inclusive('\n').enumerate() {
            // Whitespace-only lines do not participate in the minimum; a
            // trailing whitespace run without a newline still does, since
            // the line continues in a later token
            if line.ends_with('\n') && line.trim().is_empty() {
                continue;
            }
            if index == 0 && !self.dedent_next {
                continue;
            }

            let mut next_dedent = 0;
            for c in line.chars() {
                if !c.is_ascii_whitespace() || c == '\n' {
                    break;
                }
                next_dedent = advance_tab_stop(next_dedent, c);
            }

            self.dedent = Some(self.dedent.map_or(next_dedent, |d| d.min(next_dedent)));
        }
    }

    fn flush(self) -> Vec<CompatToken> {
        match self.dedent {
            None => flush_blank(self.tokens),
            Some(dedent) => flush_dedented(self.tokens, dedent),
        }
    }
}

/// Flush for a body with no non-blank line: nothing is elided, but content
/// still splits into one token per line
fn flush_blank(tokens: Vec<CompatToken>) -> Vec<CompatToken> {
    let mut results = Vec::with_capacity(tokens.len());
    let mut balance = EmbexprBalance::default();

    for token in tokens {
        balance.observe(token.event);

        if token.event == Event::TstringContent && !balance.is_open() {
            for (index, segment) in token.value.split_inclusive('\n').enumerate() {
                let line = token.position.line + index;
                let column = if index == 0 { token.position.column } else { 0 };
                results.push(CompatToken::new(
                    Position::new(line, column),
                    Event::TstringContent,
                    segment.to_string(),
                    token.state,
                ));
            }
        } else {
            results.push(token);
        }
    }

    results
}

/// Flush for a body with a known dedent width
fn flush_dedented(tokens: Vec<CompatToken>, dedent: usize) -> Vec<CompatToken> {
    let mut results = Vec::with_capacity(tokens.len());
    let mut balance = EmbexprBalance::default();
    let mut dedent_next = true;

    for token in tokens {
        balance.observe(token.event);
        let is_content = token.event == Event::TstringContent;

        if is_content && !balance.is_open() {
            split_dedented(&token, dedent, dedent_next, &mut results);
        } else {
            results.push(token);
        }

        dedent_next = is_content && !balance.is_open();
    }

    results
}

/// Rewrite one content token, eliding up to `dedent` tab-expanded columns of
/// leading whitespace from each fresh line
fn split_dedented(
    token: &CompatToken,
    dedent: usize,
    dedent_next: bool,
    results: &mut Vec<CompatToken>,
) {
    let segments: Vec<&str> = token.value.split_inclusive('\n').collect();

    for (index, segment) in segments.iter().enumerate() {
        let segment = *segment;
        let fresh = dedent_next || index > 0;
        let line = token.position.line + index;
        let mut column = token.position.column;

        if segment == "\n" && fresh {
            column = 0;
        }

        // A zero dedent elides nothing from here on: emit the rest of the
        // value as a single token
        if dedent == 0 && (!fresh || !starts_with_whitespace(segment)) {
            let rest: String = segments[index..].concat();
            results.push(CompatToken::new(
                Position::new(line, column),
                Event::TstringContent,
                rest,
                token.state,
            ));
            return;
        }

        if segment != "\n" && dedent > 0 && fresh {
            let elided = elided_prefix(segment, dedent);
            if !elided.is_empty() {
                results.push(CompatToken::new(
                    Position::new(line, 0),
                    Event::IgnoredSp,
                    elided.to_string(),
                    token.state,
                ));
            }
            let remaining = &segment[elided.len()..];
            if !remaining.is_empty() {
                results.push(CompatToken::new(
                    Position::new(line, elided.len() as isize),
                    Event::TstringContent,
                    remaining.to_string(),
                    token.state,
                ));
            }
        } else if !segment.is_empty() {
            results.push(CompatToken::new(
                Position::new(line, column),
                Event::TstringContent,
                segment.to_string(),
                token.state,
            ));
        }
    }
}

fn starts_with_whitespace(segment: &str) -> bool {
    segment.chars().next().is_some_and(|c| c.is_ascii_whitespace())
}

/// The longest leading run of spaces and tabs whose tab-expanded width does
/// not exceed `dedent`
fn elided_prefix(segment: &str, dedent: usize) -> &str {
    let mut deleting = 0;
    let mut end = 0;

    for c in segment.chars() {
        if c != ' ' && c != '\t' {
            break;
        }
        let next = advance_tab_stop(deleting, c);
        if next > dedent {
            break;
        }
        deleting = next;
        end += c.len_utf8();
    }

    &segment[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compat::state::LexState;
    use crate::compat::testing::tok;

    fn events_and_values(tokens: &[CompatToken]) -> Vec<(Event, &str)> {
        tokens.iter().map(|t| (t.event, t.value.as_str())).collect()
    }

    #[test]
    fn test_selection_from_opener_value() {
        assert!(matches!(Heredoc::build("<<FOO"), Heredoc::Plain(_)));
        assert!(matches!(Heredoc::build("<<~FOO"), Heredoc::Dedenting(_)));
        assert!(matches!(Heredoc::build("<<~'FOO'"), Heredoc::Dedenting(_)));
        assert!(matches!(
            Heredoc::build("<<-FOO"),
            Heredoc::Dash(DashHeredoc { split: true, .. })
        ));
        assert!(matches!(
            Heredoc::build("<<-'FOO'"),
            Heredoc::Dash(DashHeredoc { split: false, .. })
        ));
    }

    #[test]
    fn test_plain_flushes_unchanged() {
        let mut heredoc = Heredoc::build("<<FOO");
        heredoc.append(tok(2, 0, Event::TstringContent, "hi\n", LexState::EXPR_BEG));
        heredoc.append(tok(3, 0, Event::HeredocEnd, "FOO\n", LexState::EXPR_BEG));

        let flushed = heredoc.flush();
        assert_eq!(
            events_and_values(&flushed),
            vec![(Event::TstringContent, "hi\n"), (Event::HeredocEnd, "FOO\n")]
        );
    }

    #[test]
    fn test_dash_splits_on_backslash_newline() {
        let mut heredoc = Heredoc::build("<<-FOO");
        heredoc.append(tok(2, 0, Event::TstringContent, "hi\\\nbye\n", LexState::EXPR_BEG));
        heredoc.append(tok(4, 0, Event::HeredocEnd, "FOO\n", LexState::EXPR_BEG));

        let flushed = heredoc.flush();
        assert_eq!(
            events_and_values(&flushed),
            vec![
                (Event::TstringContent, "hi\\\n"),
                (Event::TstringContent, "bye\n"),
                (Event::HeredocEnd, "FOO\n"),
            ]
        );
        assert_eq!(flushed[0].position, Position::new(2, 0));
        assert_eq!(flushed[1].position, Position::new(3, 0));
    }

    #[test]
    fn test_dash_single_quoted_does_not_split() {
        let mut heredoc = Heredoc::build("<<-'FOO'");
        heredoc.append(tok(2, 0, Event::TstringContent, "hi\\\nbye\n", LexState::EXPR_BEG));

        let flushed = heredoc.flush();
        assert_eq!(events_and_values(&flushed), vec![(Event::TstringContent, "hi\\\nbye\n")]);
    }

    #[test]
    fn test_dash_leaves_embedded_expressions_alone() {
        let mut heredoc = Heredoc::build("<<-FOO");
        heredoc.append(tok(2, 0, Event::EmbexprBeg, "#{", LexState::EXPR_BEG));
        heredoc.append(tok(2, 2, Event::TstringContent, "a\\\nb", LexState::EXPR_BEG));
        heredoc.append(tok(3, 1, Event::EmbexprEnd, "}", LexState::EXPR_END));

        let flushed = heredoc.flush();
        assert_eq!(
            events_and_values(&flushed),
            vec![
                (Event::EmbexprBeg, "#{"),
                (Event::TstringContent, "a\\\nb"),
                (Event::EmbexprEnd, "}"),
            ]
        );
    }

    #[test]
    fn test_dedent_common_indent() {
        // <<~FOO with body "  ab\n  cd\n": common indent is two spaces
        let mut heredoc = Heredoc::build("<<~FOO");
        heredoc.append(tok(2, 0, Event::TstringContent, "  ab\n  cd\n", LexState::EXPR_BEG));
        heredoc.append(tok(4, 0, Event::HeredocEnd, "FOO\n", LexState::EXPR_BEG));

        let flushed = heredoc.flush();
        assert_eq!(
            events_and_values(&flushed),
            vec![
                (Event::IgnoredSp, "  "),
                (Event::TstringContent, "ab\n"),
                (Event::IgnoredSp, "  "),
                (Event::TstringContent, "cd\n"),
                (Event::HeredocEnd, "FOO\n"),
            ]
        );
        assert_eq!(flushed[0].position, Position::new(2, 0));
        assert_eq!(flushed[1].position, Position::new(2, 2));
        assert_eq!(flushed[2].position, Position::new(3, 0));
        assert_eq!(flushed[3].position, Position::new(3, 2));
    }

    #[test]
    fn test_dedent_across_separate_content_tokens() {
        let mut heredoc = Heredoc::build("<<~FOO");
        heredoc.append(tok(2, 0, Event::TstringContent, "    ab\n", LexState::EXPR_BEG));
        heredoc.append(tok(3, 0, Event::TstringContent, "  cd\n", LexState::EXPR_BEG));

        let flushed = heredoc.flush();
        assert_eq!(
            events_and_values(&flushed),
            vec![
                (Event::IgnoredSp, "  "),
                (Event::TstringContent, "  ab\n"),
                (Event::IgnoredSp, "  "),
                (Event::TstringContent, "cd\n"),
            ]
        );
        assert_eq!(flushed[1].position, Position::new(2, 2));
    }

    #[test]
    fn test_dedent_with_tabs_uses_eight_column_stops() {
        // "\t a" expands to column 9, "  b" to column 2; the minimum is 2.
        // The tab alone would already exceed two columns, so line 1 keeps
        // its whitespace while line 2 loses both spaces.
        let mut heredoc = Heredoc::build("<<~FOO");
        heredoc.append(tok(2, 0, Event::TstringContent, "\t a\n  b\n", LexState::EXPR_BEG));

        let flushed = heredoc.flush();
        assert_eq!(
            events_and_values(&flushed),
            vec![
                (Event::TstringContent, "\t a\n"),
                (Event::IgnoredSp, "  "),
                (Event::TstringContent, "b\n"),
            ]
        );
        assert_eq!(flushed[0].position, Position::new(2, 0));
        assert_eq!(flushed[1].position, Position::new(3, 0));
        assert_eq!(flushed[2].position, Position::new(3, 2));
    }

    #[test]
    fn test_dedent_partial_tab_elision() {
        // Common indent 4; the tab on line 2 expands straight to 8, so only
        // the spaces before it can be elided
        let mut heredoc = Heredoc::build("<<~FOO");
        heredoc.append(tok(2, 0, Event::TstringContent, "    a\n  \tb\n", LexState::EXPR_BEG));

        let flushed = heredoc.flush();
        assert_eq!(
            events_and_values(&flushed),
            vec![
                (Event::IgnoredSp, "    "),
                (Event::TstringContent, "a\n"),
                (Event::IgnoredSp, "  "),
                (Event::TstringContent, "\tb\n"),
            ]
        );
    }

    #[test]
    fn test_dedent_zero_emits_content_unchanged() {
        let mut heredoc = Heredoc::build("<<~FOO");
        heredoc.append(tok(2, 0, Event::TstringContent, "ab\n  cd\n", LexState::EXPR_BEG));

        let flushed = heredoc.flush();
        assert_eq!(events_and_values(&flushed), vec![(Event::TstringContent, "ab\n  cd\n")]);
        assert_eq!(flushed[0].position, Position::new(2, 0));
    }

    #[test]
    fn test_all_blank_body_splits_per_line_without_elision() {
        let mut heredoc = Heredoc::build("<<~FOO");
        heredoc.append(tok(2, 0, Event::TstringContent, "\n\n", LexState::EXPR_BEG));
        heredoc.append(tok(4, 0, Event::HeredocEnd, "FOO\n", LexState::EXPR_BEG));

        let flushed = heredoc.flush();
        assert_eq!(
            events_and_values(&flushed),
            vec![
                (Event::TstringContent, "\n"),
                (Event::TstringContent, "\n"),
                (Event::HeredocEnd, "FOO\n"),
            ]
        );
        assert_eq!(flushed[0].position, Position::new(2, 0));
        assert_eq!(flushed[1].position, Position::new(3, 0));
    }

    #[test]
    fn test_whitespace_only_lines_do_not_shrink_the_dedent() {
        // The middle line is blank; the minimum comes from the others
        let mut heredoc = Heredoc::build("<<~FOO");
        heredoc.append(tok(
            2,
            0,
            Event::TstringContent,
            "    a\n \n    b\n",
            LexState::EXPR_BEG,
        ));

        let flushed = heredoc.flush();
        assert_eq!(
            events_and_values(&flushed),
            vec![
                (Event::IgnoredSp, "    "),
                (Event::TstringContent, "a\n"),
                (Event::IgnoredSp, " "),
                (Event::TstringContent, "\n"),
                (Event::IgnoredSp, "    "),
                (Event::TstringContent, "b\n"),
            ]
        );
    }

    #[test]
    fn test_blank_line_without_indent_keeps_dedent() {
        let mut heredoc = Heredoc::build("<<~FOO");
        heredoc.append(tok(2, 0, Event::TstringContent, "  a\n\n  b\n", LexState::EXPR_BEG));

        let flushed = heredoc.flush();
        assert_eq!(
            events_and_values(&flushed),
            vec![
                (Event::IgnoredSp, "  "),
                (Event::TstringContent, "a\n"),
                (Event::TstringContent, "\n"),
                (Event::IgnoredSp, "  "),
                (Event::TstringContent, "b\n"),
            ]
        );
        // The bare newline lands at column 0
        assert_eq!(flushed[2].position, Position::new(3, 0));
    }

    #[test]
    fn test_embedded_expressions_are_not_dedent_analyzed() {
        // "  #{x}\n  b\n" - the content inside the braces must not shrink
        // the dedent nor be rewritten
        let mut heredoc = Heredoc::build("<<~FOO");
        heredoc.append(tok(2, 0, Event::TstringContent, "  ", LexState::EXPR_BEG));
        heredoc.append(tok(2, 2, Event::EmbexprBeg, "#{", LexState::EXPR_BEG));
        heredoc.append(tok(2, 4, Event::TstringContent, "x", LexState::EXPR_BEG));
        heredoc.append(tok(2, 5, Event::EmbexprEnd, "}", LexState::EXPR_END));
        heredoc.append(tok(2, 6, Event::TstringContent, "\n  b\n", LexState::EXPR_BEG));

        let flushed = heredoc.flush();
        assert_eq!(
            events_and_values(&flushed),
            vec![
                (Event::IgnoredSp, "  "),
                (Event::EmbexprBeg, "#{"),
                (Event::TstringContent, "x"),
                (Event::EmbexprEnd, "}"),
                (Event::TstringContent, "\n"),
                (Event::IgnoredSp, "  "),
                (Event::TstringContent, "b\n"),
            ]
        );
    }

    #[test]
    fn test_byte_accounting_is_preserved() {
        let body = "    ab\n\t cd\n  ef\n";
        let mut heredoc = Heredoc::build("<<~FOO");
        heredoc.append(tok(2, 0, Event::TstringContent, body, LexState::EXPR_BEG));

        let flushed = heredoc.flush();
        let total: usize = flushed.iter().map(|t| t.value.len()).sum();
        assert_eq!(total, body.len(), "elided and remaining bytes must add back up");
    }
}
