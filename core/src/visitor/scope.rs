use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ScopeId(pub u32);

impl ScopeId {
    pub const FILE: ScopeId = ScopeId(0);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    File,
    Function,
    AnonymousFunction,
    Block,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scope {
    pub id: ScopeId,
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    pub depth: usize,
}

/// Lexical scopes opened while walking a program. Every scope ever opened is
/// kept so definitions can point back at theirs; `open` tracks the current
/// chain from the file scope inwards.
#[derive(Debug, Clone)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
    open: Vec<ScopeId>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope {
                id: ScopeId::FILE,
                kind: ScopeKind::File,
                parent: None,
                depth: 0,
            }],
            open: vec![ScopeId::FILE],
        }
    }

    pub fn push(&mut self, kind: ScopeKind) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            id,
            kind,
            parent: Some(self.current()),
            depth: self.open.len(),
        });
        self.open.push(id);
        id
    }

    /// Close the innermost scope. The file scope is never closed.
    pub fn pop(&mut self) {
        if self.open.len() > 1 {
            self.open.pop();
        }
    }

    pub fn current(&self) -> ScopeId {
        self.open.last().copied().unwrap_or(ScopeId::FILE)
    }

    pub fn depth(&self) -> usize {
        self.open.len() - 1
    }

    /// True when any open scope belongs to a function body.
    pub fn in_function(&self) -> bool {
        self.open.iter().any(|id| {
            matches!(
                self.scopes[id.0 as usize].kind,
                ScopeKind::Function | ScopeKind::AnonymousFunction
            )
        })
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_pop_track_depth() {
        let mut stack = ScopeStack::new();
        assert_eq!(stack.current(), ScopeId::FILE);
        assert!(!stack.in_function());

        let block = stack.push(ScopeKind::Block);
        assert_eq!(stack.depth(), 1);
        assert!(!stack.in_function());

        let function = stack.push(ScopeKind::Function);
        assert_eq!(stack.current(), function);
        assert!(stack.in_function());
        assert_eq!(stack.scopes()[function.0 as usize].parent, Some(block));

        stack.pop();
        stack.pop();
        stack.pop();
        assert_eq!(stack.current(), ScopeId::FILE);
        assert_eq!(stack.scopes().len(), 3);
    }
}
