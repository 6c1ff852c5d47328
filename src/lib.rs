//! # lex-compat
//!
//!     A compatibility shim that reshapes a modern lexer's token stream into
//!     the form emitted by the legacy reference tokenizer, so a new parser
//!     can prove token-for-token equivalence against the entrenched
//!     implementation.
//!
//! Overview
//!
//!     The upstream lexer and the reference tokenizer disagree on two
//!     fundamentals. First, the upstream lexer emits heredoc body tokens
//!     immediately after the opener token, while the reference emits them
//!     after the line that contains the opener. Second, the upstream lexer
//!     never emits the whitespace-elision tokens a dedenting heredoc
//!     produces in the reference, because it encodes dedenting as a
//!     post-parse node-level rewrite. The shim buffers heredoc bodies,
//!     replays them at the reference's flush points, and reconstructs the
//!     elision tokens by running the same common-leading-whitespace
//!     computation up front.
//!
//! Architecture
//!
//!     The transform is a single fold over the upstream token/state pairs:
//!
//!     1. **Offset index** - converts byte offsets to line/column positions
//!     2. **Kind map** - translates upstream token kinds to reference events
//!     3. **Comparison flavors** - per-event equality relaxations
//!     4. **Heredoc accumulators** - buffer and rewrite heredoc bodies
//!     5. **Stream state machine** - decides when tokens buffer vs. flush
//!
//!     See the [compat] module for the component layout, and
//!     [compat::stream] for the driver that ties them together.
//!
//! Getting Started
//!
//!     Implement [compat::UpstreamLexer] over whatever produces the upstream
//!     token stream and drive it through [compat::LexCompat], or feed an
//!     already-produced [compat::UpstreamOutput] to [compat::transform].
//!     The resulting tokens compare against reference-produced 4-tuples via
//!     `PartialEq`, and [compat::compare] reports the first divergence
//!     between two streams.

#![allow(rustdoc::invalid_html_tags)]

pub mod compat;
