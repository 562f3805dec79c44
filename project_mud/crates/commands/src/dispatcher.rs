use std::collections::HashMap;

use crate::context::Context;

pub type Handler<C> = Box<dyn Fn(&C, &str) + Send + Sync>;

/// Verb table. Resolution is an exact match first, then the first verb in
/// registration order that the typed word is a prefix of.
pub struct Dispatcher<C = Context> {
    handlers: HashMap<String, Handler<C>>,
    order: Vec<String>,
}

impl<C> Dispatcher<C> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Bind `name` (lower-cased). Re-registering a verb replaces its handler
    /// and keeps its original position.
    pub fn register<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(&C, &str) + Send + Sync + 'static,
    {
        let name = name.trim().to_lowercase();
        if self.handlers.insert(name.clone(), Box::new(handler)).is_none() {
            self.order.push(name);
        }
    }

    /// Verb that `typed` resolves to, if any.
    pub fn resolve(&self, typed: &str) -> Option<&str> {
        let typed = typed.trim().to_lowercase();
        if typed.is_empty() {
            return None;
        }
        if let Some((name, _)) = self.handlers.get_key_value(&typed) {
            return Some(name.as_str());
        }
        self.order
            .iter()
            .find(|name| name.starts_with(&typed))
            .map(String::as_str)
    }

    /// Run the handler `verb` resolves to. Returns whether one matched.
    pub fn execute(&self, ctx: &C, verb: &str, args: &str) -> bool {
        let Some(handler) = self.resolve(verb).and_then(|name| self.handlers.get(name)) else {
            return false;
        };
        handler(ctx, args);
        true
    }

    /// Every verb, alphabetically.
    pub fn list(&self) -> Vec<String> {
        let mut names = self.order.clone();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl<C> Default for Dispatcher<C> {
    fn default() -> Self {
        Self::new()
    }
}
