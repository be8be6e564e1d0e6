//! Position-based mapping from control ids to mixer selectors.
//!
//! Ids are positions in the most recent parse pass of a scope. They are not
//! stable keys: a re-parse that adds, removes or reorders controls changes
//! which selector an id resolves to.

use crate::context::{MixerContext, Scope};
use crate::error::MixerError;

/// Selectors of one scope, id = position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlIndex {
    selectors: Vec<String>,
}

impl ControlIndex {
    pub fn new(selectors: Vec<String>) -> Self {
        Self { selectors }
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&str> {
        self.selectors.get(id).map(String::as_str)
    }
}

/// The standard and equalizer indices.
#[derive(Debug, Clone, Default)]
pub struct ControlTables {
    standard: ControlIndex,
    equalizer: ControlIndex,
}

impl ControlTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, scope: Scope) -> &ControlIndex {
        match scope {
            Scope::Standard => &self.standard,
            Scope::Equalizer => &self.equalizer,
        }
    }

    /// Replace a scope's index wholesale.
    pub fn replace(&mut self, scope: Scope, index: ControlIndex) {
        match scope {
            Scope::Standard => self.standard = index,
            Scope::Equalizer => self.equalizer = index,
        }
    }

    /// Resolve `id` in `scope`, which must be the scope active in `context`.
    pub fn resolve(
        &self,
        context: &MixerContext,
        scope: Scope,
        id: usize,
    ) -> Result<&str, MixerError> {
        let active = context.scope();
        if active != scope {
            return Err(MixerError::ScopeMismatch {
                requested: scope,
                active,
            });
        }
        self.table(scope)
            .get(id)
            .ok_or(MixerError::NotFound { scope, id })
    }
}
