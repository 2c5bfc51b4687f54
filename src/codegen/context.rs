//! # Generation Context
//!
//! All mutable state for exactly one generation pass: the three symbol
//! registries, the name resolver, and the guards that turn a cyclic graph
//! into a reportable error instead of a stack overflow.
//!
//! A context is constructed fresh per pass and discarded afterwards, so no
//! registry entries or resolved names leak between runs. Concurrent passes
//! over different workspaces each own an independent context.

use std::collections::HashMap;

use super::names::{NameCategory, NameResolver};
use super::registry::SymbolRegistry;
use super::GenerateError;

/// Maximum nesting depth of slot references before a cycle is assumed.
const MAX_DEPTH: usize = 128;

/// Maximum number of nodes emitted in one pass before a `next` cycle is
/// assumed.
const MAX_STEPS: usize = 100_000;

#[derive(Debug, Default)]
pub struct GenContext {
    /// Includes, constants and helper functions.
    pub definitions: SymbolRegistry,
    /// Global variable and object declarations.
    pub globals: SymbolRegistry,
    /// One-time initialization statements for `setup()`.
    pub setups: SymbolRegistry,
    pub names: NameResolver,
    /// Generated servo object identifier per pin.
    servos: HashMap<String, String>,
    depth: usize,
    steps: usize,
}

impl GenContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifier of the servo object driving `pin`, minted through the
    /// name resolver on first use so it cannot collide with a user
    /// variable that happens to be called `servo_<pin>`.
    pub fn servo_name(&mut self, pin: &str) -> String {
        if let Some(existing) = self.servos.get(pin) {
            return existing.clone();
        }
        let name = self
            .names
            .distinct(&format!("servo_{pin}"), NameCategory::Variable);
        self.servos.insert(pin.to_string(), name.clone());
        name
    }

    /// Enter one level of slot nesting. Fails once the depth guard trips.
    pub fn enter(&mut self) -> Result<(), GenerateError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(GenerateError::RecursionLimit { depth: self.depth });
        }
        Ok(())
    }

    pub fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Account for one emitted node. Fails once the step budget is spent,
    /// which can only happen if `next` references form a cycle.
    pub fn tick(&mut self) -> Result<(), GenerateError> {
        self.steps += 1;
        if self.steps > MAX_STEPS {
            return Err(GenerateError::RecursionLimit { depth: self.depth });
        }
        Ok(())
    }
}
