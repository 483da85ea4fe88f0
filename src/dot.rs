//! DOT language front end
//!
//! The first client of the [`combos`](crate::combos) engine: a logos
//! tokenizer, a rewindable token source, the DOT productions, parse and
//! stream-parse entry points, and a renderer back to DOT text.
//!
//! ```text
//! let tree = dotparse::dot::parse("digraph { a -> b; }")?;
//! println!("{}", tree.dump());
//! ```

pub mod grammar;
pub mod lexer;
pub mod parser;
pub mod render;
pub mod token;

pub use lexer::{tokenize, DotTokens};
pub use parser::{parse, stream_parse, DotGrammar, DotParser};
pub use render::{render, RenderError};
pub use token::{DotToken, LexFault};
