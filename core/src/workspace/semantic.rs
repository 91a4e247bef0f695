use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
    ast::Program,
    diagnostic::{Diagnostic, ErrorCode},
    token::grammar::{is_keyword, is_native_function},
    visitor::{CallSite, Definition, DefinitionKind, Reference, ReferenceKind},
};

/// Checks that need the whole document (and, for unresolved names, the rest
/// of the index) rather than a single statement.
pub(crate) struct SemanticCheck<'a> {
    pub program: &'a Program,
    pub references: &'a [Reference],
    pub definitions: &'a [Definition],
    pub calls: &'a [CallSite],
}

impl SemanticCheck<'_> {
    pub fn run(&self, report_unresolved: bool, defined_elsewhere: &dyn Fn(&str) -> bool) -> Vec<Diagnostic> {
        let mut diagnostics = self.duplicate_functions();
        diagnostics.extend(self.too_many_arguments());
        if report_unresolved {
            diagnostics.extend(self.unresolved_calls(defined_elsewhere));
        }
        diagnostics
    }

    /// A second file-level function with an already used name.
    fn duplicate_functions(&self) -> Vec<Diagnostic> {
        let mut seen = FxHashSet::default();
        self.definitions
            .iter()
            .filter(|d| d.kind == DefinitionKind::Function && d.file_level)
            .filter(|d| !seen.insert(d.name.as_str()))
            .map(|d| {
                Diagnostic::error(
                    ErrorCode::DuplicateDefinition,
                    format!("function '{}' is already defined in this file", d.name),
                    d.range,
                )
            })
            .collect()
    }

    /// Calls to top-level functions of this document passing more arguments
    /// than the definition declares. Names that are also assigned as
    /// variables are skipped, since `x(1, 2)` may be indexing.
    fn too_many_arguments(&self) -> Vec<Diagnostic> {
        let mut limits: FxHashMap<&str, Option<usize>> = FxHashMap::default();
        for function in self.program.functions() {
            limits.entry(function.name.as_str()).or_insert_with(|| function.max_arguments());
        }
        if limits.is_empty() {
            return Vec::new();
        }
        let variables: FxHashSet<&str> = self
            .definitions
            .iter()
            .filter(|d| !d.is_callable() && d.kind != DefinitionKind::Argument)
            .map(|d| d.name.as_str())
            .collect();

        self.calls
            .iter()
            .filter(|call| !variables.contains(call.name.as_str()))
            .filter_map(|call| {
                let max = (*limits.get(call.name.as_str())?)?;
                (call.arguments > max).then(|| {
                    Diagnostic::error(
                        ErrorCode::TooManyArguments,
                        format!(
                            "'{}' accepts at most {} argument{}, {} given",
                            call.name,
                            max,
                            if max == 1 { "" } else { "s" },
                            call.arguments
                        ),
                        call.range,
                    )
                })
            })
            .collect()
    }

    fn unresolved_calls(&self, defined_elsewhere: &dyn Fn(&str) -> bool) -> Vec<Diagnostic> {
        let local: FxHashSet<&str> = self.definitions.iter().map(|d| d.name.as_str()).collect();
        self.references
            .iter()
            .filter(|r| r.kind == ReferenceKind::Function)
            .filter(|r| {
                let name = r.name.as_str();
                !local.contains(name) && !is_native_function(name) && !is_keyword(name)
            })
            .filter(|r| !defined_elsewhere(&r.name))
            .map(|r| {
                Diagnostic::warning(
                    ErrorCode::UnresolvedReference,
                    format!("'{}' is not defined in the workspace", r.name),
                    r.range,
                )
            })
            .collect()
    }
}
