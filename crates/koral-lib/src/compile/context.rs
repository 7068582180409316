//! Per-compile state: diagnostics, class allocator, recursion fuel.

use rowan::TextRange;

use crate::diagnostics::{DiagnosticBuilder, DiagnosticKind, Diagnostics};
use crate::{Error, Result};

use super::classes::ClassAllocator;

/// Nesting depth that fits a 2 MiB thread stack in debug builds.
pub const DEFAULT_RECURSION_FUEL: u32 = 256;

/// State owned by exactly one compile.
///
/// Drivers thread `&mut Context` through every builder. Nothing in here is
/// shared between compiles.
#[derive(Debug)]
pub struct Context {
    diagnostics: Diagnostics,
    classes: ClassAllocator,
    recursion_fuel_limit: Option<u32>,
    depth: u32,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    pub fn new() -> Self {
        Self {
            diagnostics: Diagnostics::new(),
            classes: ClassAllocator::new(),
            recursion_fuel_limit: Some(DEFAULT_RECURSION_FUEL),
            depth: 0,
        }
    }

    /// Set recursion depth limit. None = infinite.
    ///
    /// Recursion fuel restores when exiting recursion. It protects against
    /// deeply nested trees.
    pub fn with_recursion_fuel(mut self, limit: Option<u32>) -> Self {
        self.recursion_fuel_limit = limit;
        self
    }

    pub fn report(&mut self, kind: DiagnosticKind, range: TextRange) -> DiagnosticBuilder<'_> {
        self.diagnostics.report(kind, range)
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    pub fn classes(&mut self) -> &mut ClassAllocator {
        &mut self.classes
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn enter_recursion(&mut self) -> Result<()> {
        if let Some(limit) = self.recursion_fuel_limit
            && self.depth >= limit
        {
            return Err(Error::RecursionLimitExceeded);
        }
        self.depth += 1;
        Ok(())
    }

    pub fn exit_recursion(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Runs `f` one recursion level deeper.
    pub fn guarded<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.enter_recursion()?;
        let result = f(self);
        self.exit_recursion();
        result
    }
}
