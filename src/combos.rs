//! Backtracking parser combinators
//!
//! A grammar is a table of named [`Consumer`]s. Parsing runs the start
//! production against a [`TokenSource`], backtracking by cursor save and
//! restore, and returns either a [`Node`](crate::ast::Node) tree or the most
//! informative [`ParseError`] seen during the run.
//!
//! ## Modules
//!
//! - [`token`] - token and token source contract
//! - [`consumer`] - the consumer algebra and its builder functions
//! - [`grammar`] - production table, validation, parse entry points
//! - [`context`] - per-run state: cursor, memo table, failures
//! - [`error`] - error kinds and furthest-failure ranking
//! - [`callbacks`] - streaming enter/exit/stmt hooks
//!
//! ## Building a grammar
//!
//! ```text
//! let mut g = Grammar::new(["WORD", ","]);
//! g.add_rule("List", alt(vec![
//!     seq(vec![token(0), token(1), prod("List")], join),
//!     seq(vec![token(0)], single),
//! ]))
//! .start("List");
//! ```

pub mod callbacks;
pub mod consumer;
pub mod context;
pub mod error;
pub mod grammar;
pub mod token;

pub use callbacks::{Callbacks, Hooks};
pub use consumer::{
    alt, effect, epsilon, lookahead, memo, prod, seq, token, Consumer, Matched,
};
pub use context::{ParseContext, ParseStats};
pub use error::{CallbackError, Cause, ErrorKind, GrammarError, ParseError};
pub use grammar::Grammar;
pub use token::{LexError, Token, TokenKind, TokenSource, VecTokens};
