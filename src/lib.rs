//! # dotparse
//!
//! A backtracking parser-combinator engine and a DOT graph language parser
//! built on it.
//!
//! - [`combos`] - consumers, grammars, furthest-failure errors, streaming hooks
//! - [`ast`] - the node tree, source spans and the debug dump
//! - [`dot`] - DOT tokenizer, productions, parse entry points and renderer
//! - [`config`] - DOT parse options

pub mod ast;
pub mod combos;
pub mod config;
pub mod dot;

pub use ast::{Node, Position, Span};
pub use combos::{Callbacks, Grammar, ParseError};
pub use config::DotOptions;
pub use dot::{parse, stream_parse, DotGrammar};
