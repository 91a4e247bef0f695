//! Single pass over a [`Program`] collecting every name use (references) and
//! every name introduction (definitions), in document order.

mod scope;

pub use scope::*;

use crate::{
    ast::{CallArguments, Expression, ExpressionKind, FunctionDefinition, Program, Statement, StatementKind},
    token::{Position, Range},
};
use rustc_hash::FxHashMap;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferenceKind {
    Function,
    Variable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reference {
    pub name: String,
    pub kind: ReferenceKind,
    pub range: Range,
    pub documentation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DefinitionKind {
    Function,
    Variable,
    Argument,
    AnonymousFunction,
    DefaultArgument,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Definition {
    pub name: String,
    pub kind: DefinitionKind,
    pub range: Range,
    pub documentation: Option<String>,
    /// Parameters, for functions
    pub arguments: Vec<Definition>,
    /// Source text of the default value, for default arguments
    pub content: Option<String>,
    pub scope: ScopeId,
    pub depth: usize,
    /// Not nested in any function
    pub file_level: bool,
}

impl Definition {
    pub fn is_callable(&self) -> bool {
        matches!(self.kind, DefinitionKind::Function | DefinitionKind::AnonymousFunction)
    }
}

/// A parenthesized call or command-syntax invocation of `name`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallSite {
    pub name: String,
    /// Range of the callee name
    pub range: Range,
    /// Argument count as the callee receives it; `Name = value` counts twice
    pub arguments: usize,
}

#[derive(Debug, Default)]
pub struct Visitor {
    pub references: Vec<Reference>,
    pub definitions: Vec<Definition>,
    pub calls: Vec<CallSite>,
    scopes: ScopeStack,
}

impl Visitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visit(&mut self, program: &Program) {
        for statement in &program.body {
            self.visit_statement(statement);
        }
        self.link_documentation();
    }

    pub fn scopes(&self) -> &[Scope] {
        self.scopes.scopes()
    }

    pub fn into_parts(self) -> (Vec<Reference>, Vec<Definition>, Vec<CallSite>) {
        (self.references, self.definitions, self.calls)
    }

    fn add_reference(&mut self, name: &str, kind: ReferenceKind, range: Range) {
        self.references.push(Reference {
            name: name.to_string(),
            kind,
            range,
            documentation: None,
        });
    }

    fn definition(&self, name: &str, kind: DefinitionKind, range: Range) -> Definition {
        Definition {
            name: name.to_string(),
            kind,
            range,
            documentation: None,
            arguments: Vec::new(),
            content: None,
            scope: self.scopes.current(),
            depth: self.scopes.depth(),
            file_level: !self.scopes.in_function(),
        }
    }

    fn visit_block(&mut self, body: &[Statement]) {
        self.scopes.push(ScopeKind::Block);
        for statement in body {
            self.visit_statement(statement);
        }
        self.scopes.pop();
    }

    fn visit_statement(&mut self, statement: &Statement) {
        match &statement.kind {
            StatementKind::Assignment { target, value } => {
                let kind = match value.kind {
                    ExpressionKind::AnonymousFunction { .. } => DefinitionKind::AnonymousFunction,
                    _ => DefinitionKind::Variable,
                };
                self.visit_target(target, kind);
                self.visit_expression(value);
            }
            StatementKind::MultiAssignment { targets, value } => {
                for target in targets {
                    self.visit_target(target, DefinitionKind::Variable);
                }
                self.visit_expression(value);
            }
            StatementKind::FunctionCall(expr) | StatementKind::Expression(expr) => self.visit_expression(expr),
            StatementKind::CommandCall { name, name_range, words } => {
                self.add_reference(name, ReferenceKind::Function, *name_range);
                self.calls.push(CallSite {
                    name: name.clone(),
                    range: *name_range,
                    arguments: words.len(),
                });
            }
            StatementKind::FunctionDefinition(def) => self.visit_function(def),
            StatementKind::If { branches, else_body } => {
                for branch in branches {
                    if let Some(condition) = &branch.condition {
                        self.visit_expression(condition);
                    }
                    self.visit_block(&branch.body);
                }
                if let Some(body) = else_body {
                    self.visit_block(body);
                }
            }
            StatementKind::For {
                variable,
                iterable,
                body,
            } => {
                if let Some(variable) = variable {
                    self.visit_target(variable, DefinitionKind::Variable);
                }
                if let Some(iterable) = iterable {
                    self.visit_expression(iterable);
                }
                self.visit_block(body);
            }
            StatementKind::While { condition, body } => {
                if let Some(condition) = condition {
                    self.visit_expression(condition);
                }
                self.visit_block(body);
            }
            StatementKind::DoUntil { body, condition } => {
                self.visit_block(body);
                if let Some(condition) = condition {
                    self.visit_expression(condition);
                }
            }
            StatementKind::Switch {
                subject,
                cases,
                otherwise,
            } => {
                if let Some(subject) = subject {
                    self.visit_expression(subject);
                }
                for case in cases {
                    if let Some(value) = &case.value {
                        self.visit_expression(value);
                    }
                    self.visit_block(&case.body);
                }
                if let Some(body) = otherwise {
                    self.visit_block(body);
                }
            }
            StatementKind::Break | StatementKind::Continue | StatementKind::Return => {}
        }
    }

    /// Assignment target: the root name is both referenced and defined, then
    /// any index expressions along the chain are visited.
    fn visit_target(&mut self, target: &Expression, kind: DefinitionKind) {
        if target.is_placeholder() {
            return;
        }
        match target.root_name() {
            Some((name, range)) => {
                self.add_reference(name, ReferenceKind::Variable, range);
                let definition = self.definition(name, kind, range);
                self.definitions.push(definition);
                self.visit_target_indices(target);
            }
            None => self.visit_expression(target),
        }
    }

    fn visit_target_indices(&mut self, target: &Expression) {
        match &target.kind {
            ExpressionKind::Identifier { call: Some(args), .. } => self.visit_arguments(args),
            ExpressionKind::FieldAccess { object, .. } => self.visit_target_indices(object),
            ExpressionKind::Index { object, call } => {
                self.visit_target_indices(object);
                self.visit_arguments(call);
            }
            _ => {}
        }
    }

    fn visit_arguments(&mut self, args: &CallArguments) {
        for argument in &args.arguments {
            self.visit_expression(argument);
        }
    }

    fn visit_expression(&mut self, expr: &Expression) {
        match &expr.kind {
            ExpressionKind::Identifier { name, call } => {
                let kind = if call.is_some() {
                    ReferenceKind::Function
                } else {
                    ReferenceKind::Variable
                };
                let range = expr.name_or_self_range();
                self.add_reference(name, kind, range);
                if let Some(args) = call {
                    if !args.brace {
                        self.calls.push(CallSite {
                            name: name.clone(),
                            range,
                            arguments: args.arguments.iter().map(argument_width).sum(),
                        });
                    }
                    self.visit_arguments(args);
                }
            }
            ExpressionKind::Number(_)
            | ExpressionKind::String(_)
            | ExpressionKind::Colon
            | ExpressionKind::End
            | ExpressionKind::Placeholder => {}
            ExpressionKind::BinaryOperation { left, right, .. } => {
                self.visit_expression(left);
                self.visit_expression(right);
            }
            ExpressionKind::UnaryOperation { operand, .. } => self.visit_expression(operand),
            ExpressionKind::Transpose(inner) => self.visit_expression(inner),
            ExpressionKind::FieldAccess { object, .. } => self.visit_expression(object),
            ExpressionKind::Index { object, call } => {
                self.visit_expression(object);
                self.visit_arguments(call);
            }
            ExpressionKind::Vector { rows } | ExpressionKind::Struct { rows } => {
                for element in rows.iter().flatten() {
                    self.visit_expression(element);
                }
            }
            ExpressionKind::AnonymousFunction { parameters, body } => {
                self.scopes.push(ScopeKind::AnonymousFunction);
                // Parameter positions are not tracked; they point at the whole
                // anonymous function.
                for parameter in parameters {
                    if let Some(name) = parameter.identifier_name() {
                        self.add_reference(name, ReferenceKind::Variable, expr.range);
                        let definition = self.definition(name, DefinitionKind::Argument, expr.range);
                        self.definitions.push(definition);
                    }
                }
                self.visit_expression(body);
                self.scopes.pop();
            }
            ExpressionKind::FunctionHandle { name } => {
                let start = expr.range.start;
                let after_at = Position::new(start.line, start.column + 1, start.offset + 1);
                self.add_reference(name, ReferenceKind::Function, Range::new(after_at, expr.range.end));
            }
            // A `name = value` pair in a call only names an option
            ExpressionKind::DefaultValueArgument { value, .. } => self.visit_expression(value),
        }
    }

    /// Header first (outputs, name, parameters), then the body in order.
    /// The function itself belongs to the enclosing scope; its outputs and
    /// parameters to its own.
    fn visit_function(&mut self, def: &FunctionDefinition) {
        let mut function = self.definition(&def.name, DefinitionKind::Function, def.name_range);
        function.documentation = def.documentation.clone();

        self.scopes.push(ScopeKind::Function);
        for output in &def.outputs {
            self.visit_target(output, DefinitionKind::Variable);
        }

        let function_index = if def.name.is_empty() {
            None
        } else {
            self.references.push(Reference {
                name: def.name.clone(),
                kind: ReferenceKind::Function,
                range: def.name_range,
                documentation: def.documentation.clone(),
            });
            self.definitions.push(function);
            Some(self.definitions.len() - 1)
        };

        let mut arguments = Vec::new();
        for parameter in &def.parameters {
            match &parameter.kind {
                ExpressionKind::Identifier { name, .. } => {
                    self.add_reference(name, ReferenceKind::Variable, parameter.range);
                    arguments.push(self.definition(name, DefinitionKind::Argument, parameter.range));
                }
                ExpressionKind::DefaultValueArgument {
                    name,
                    name_range,
                    value,
                    content,
                } => {
                    self.add_reference(name, ReferenceKind::Variable, *name_range);
                    let mut argument = self.definition(name, DefinitionKind::DefaultArgument, *name_range);
                    argument.content = Some(content.clone());
                    arguments.push(argument);
                    self.visit_expression(value);
                }
                _ => {}
            }
        }
        self.definitions.extend(arguments.iter().cloned());
        if let Some(index) = function_index {
            self.definitions[index].arguments = arguments;
        }

        for statement in &def.body {
            self.visit_statement(statement);
        }
        self.scopes.pop();
    }

    /// Function references pick up the documentation of a same-named function
    /// defined in this program.
    fn link_documentation(&mut self) {
        let docs: FxHashMap<&str, &str> = self
            .definitions
            .iter()
            .filter(|d| d.kind == DefinitionKind::Function)
            .filter_map(|d| Some((d.name.as_str(), d.documentation.as_deref()?)))
            .collect();
        if docs.is_empty() {
            return;
        }
        for reference in &mut self.references {
            if reference.kind == ReferenceKind::Function && reference.documentation.is_none() {
                if let Some(doc) = docs.get(reference.name.as_str()) {
                    reference.documentation = Some((*doc).to_string());
                }
            }
        }
    }
}

fn argument_width(argument: &Expression) -> usize {
    match argument.kind {
        ExpressionKind::DefaultValueArgument { .. } => 2,
        _ => 1,
    }
}
