use super::Expression;
use crate::token::Range;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub kind: StatementKind,
    pub range: Range,
    /// Set by a trailing `;`
    pub suppress_output: bool,
}

impl Statement {
    pub fn new(kind: StatementKind, range: Range) -> Self {
        Self {
            kind,
            range,
            suppress_output: false,
        }
    }
}

/// Bare word passed to a command-syntax call (`hold on`, `pkg load x`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Word {
    pub text: String,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionalBranch {
    /// `None` when the header was empty
    pub condition: Option<Expression>,
    pub body: Vec<Statement>,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitchCase {
    pub value: Option<Expression>,
    pub body: Vec<Statement>,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub name_range: Range,
    /// Output variables, `[o1, o2] = name(...)`
    pub outputs: Vec<Expression>,
    /// Identifiers, default-value arguments or `~`
    pub parameters: Vec<Expression>,
    pub body: Vec<Statement>,
    pub documentation: Option<String>,
    /// False when the closing `end`/`endfunction` was missing
    pub terminated: bool,
}

impl FunctionDefinition {
    /// Upper bound on call arguments, `None` when the function takes `varargin`.
    pub fn max_arguments(&self) -> Option<usize> {
        let variadic = self
            .parameters
            .iter()
            .any(|p| p.identifier_name() == Some("varargin"));
        if variadic { None } else { Some(self.parameters.len()) }
    }
}

/// Statement grammar:
///
/// program   ::= { statement sep }
/// sep       ::= NL | ';' | ','
/// statement ::= assign | multi_assign | call | command | fn_def | if | for
///             | while | do_until | switch | 'break' | 'continue' | 'return' | expr
/// assign    ::= lvalue '=' expr
/// multi     ::= '[' lvalue { [','] lvalue } ']' '=' expr
/// command   ::= id word { word }
/// fn_def    ::= 'function' [ outputs '=' ] id [ '(' params ')' ] body ('end' | 'endfunction')
/// if        ::= 'if' expr body { 'elseif' expr body } [ 'else' body ] ('end' | 'endif')
/// for       ::= 'for' ['('] id '=' expr [')'] body ('end' | 'endfor')
/// while     ::= 'while' expr body ('end' | 'endwhile')
/// do_until  ::= 'do' body 'until' expr
/// switch    ::= 'switch' expr { 'case' expr body } [ 'otherwise' body ] ('end' | 'endswitch')
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StatementKind {
    Assignment {
        target: Expression,
        value: Expression,
    },
    MultiAssignment {
        targets: Vec<Expression>,
        value: Expression,
    },
    /// A statement that is only a name, with or without arguments
    FunctionCall(Expression),
    CommandCall {
        name: String,
        name_range: Range,
        words: Vec<Word>,
    },
    Expression(Expression),
    FunctionDefinition(Box<FunctionDefinition>),
    If {
        branches: Vec<ConditionalBranch>,
        else_body: Option<Vec<Statement>>,
    },
    For {
        variable: Option<Expression>,
        iterable: Option<Expression>,
        body: Vec<Statement>,
    },
    While {
        condition: Option<Expression>,
        body: Vec<Statement>,
    },
    DoUntil {
        body: Vec<Statement>,
        condition: Option<Expression>,
    },
    Switch {
        subject: Option<Expression>,
        cases: Vec<SwitchCase>,
        otherwise: Option<Vec<Statement>>,
    },
    Break,
    Continue,
    Return,
}
