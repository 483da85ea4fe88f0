//! AST and location model
//!
//! Trees are built bottom-up by grammar actions: token leaves carry their own
//! span, interior nodes derive theirs from their children on demand.
//!
//! - [`node`] - the [`Node`] tree
//! - [`span`] - [`Position`], [`Span`] and byte-offset conversion
//! - [`dump`] - one line per node, for logs and snapshots

pub mod dump;
pub mod node;
pub mod span;

pub use node::Node;
pub use span::{Position, SourceLocation, Span};
