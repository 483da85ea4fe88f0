//! Streaming callback protocol
//!
//! A streaming parse reports structure as it is recognised instead of (or as
//! well as) returning it in the tree. Scopes fire [`Callbacks::enter`] before
//! their body and [`Callbacks::exit`] after it; each finished statement fires
//! [`Callbacks::stmt`] once. Any error a callback returns aborts the parse.

use super::error::CallbackError;
use crate::ast::Node;

pub trait Callbacks {
    fn stmt(&mut self, node: &Node) -> Result<(), CallbackError>;
    fn enter(&mut self, scope: &str, node: &Node) -> Result<(), CallbackError>;
    fn exit(&mut self, scope: &str) -> Result<(), CallbackError>;
}

/// What side-effect consumers see of the caller's callbacks. When the parse
/// is not streaming every hook is a no-op.
pub struct Hooks<'h> {
    callbacks: Option<&'h mut dyn Callbacks>,
}

impl<'h> Hooks<'h> {
    pub fn new(callbacks: Option<&'h mut dyn Callbacks>) -> Self {
        Self { callbacks }
    }

    pub fn silent() -> Self {
        Self { callbacks: None }
    }

    pub fn is_streaming(&self) -> bool {
        self.callbacks.is_some()
    }

    pub fn stmt(&mut self, node: &Node) -> Result<(), CallbackError> {
        match self.callbacks.as_mut() {
            Some(callbacks) => callbacks.stmt(node),
            None => Ok(()),
        }
    }

    pub fn enter(&mut self, scope: &str, node: &Node) -> Result<(), CallbackError> {
        match self.callbacks.as_mut() {
            Some(callbacks) => callbacks.enter(scope, node),
            None => Ok(()),
        }
    }

    pub fn exit(&mut self, scope: &str) -> Result<(), CallbackError> {
        match self.callbacks.as_mut() {
            Some(callbacks) => callbacks.exit(scope),
            None => Ok(()),
        }
    }
}
