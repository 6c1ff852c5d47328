//! Main module for the lexer-compatibility shim

pub mod compare;
pub mod events;
pub mod heredoc;
pub mod location;
pub mod state;
pub mod stream;
pub mod testing;
pub mod upstream;

pub use compare::{compare, CompatToken, Flavor, Mismatch};
pub use events::Event;
pub use location::{Position, SourceIndex};
pub use state::LexState;
pub use stream::{transform, LexCompat, LexOutput};
pub use upstream::{
    event_for, Comment, CompatError, Diagnostic, LexedToken, TokenKind, UpstreamLexer,
    UpstreamOutput, UpstreamToken,
};
