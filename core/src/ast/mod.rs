mod expr;
mod stmt;

pub use expr::*;
pub use stmt::*;

use serde::Serialize;

/// Root of a parsed document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Program {
    pub body: Vec<Statement>,
}

impl Program {
    pub fn new(body: Vec<Statement>) -> Self {
        Self { body }
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Top-level function definitions in source order.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDefinition> {
        self.body.iter().filter_map(|stmt| match &stmt.kind {
            StatementKind::FunctionDefinition(def) => Some(def.as_ref()),
            _ => None,
        })
    }
}
