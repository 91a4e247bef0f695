use crate::token::{Position, Range};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOperator {
    ShortOr, // ||
    ShortAnd, // &&
    Or, // |
    And, // &
    Equal, // ==
    NotEqual, // ~= or !=
    Less, // <
    LessEqual, // <=
    Greater, // >
    GreaterEqual, // >=
    Range, // :
    Add, // +
    Subtract, // -
    Multiply, // *
    Divide, // /
    LeftDivide, // \
    Modulus, // %
    ElementMultiply, // .*
    ElementDivide, // ./
    ElementLeftDivide, // .\
    Power, // ^
    ElementPower, // .^
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOperator {
    Negate,
    Plus,
    Not,
}

/// Parenthesized (`f(a, b)`) or brace (`c{1}`) argument list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallArguments {
    pub arguments: Vec<Expression>,
    pub range: Range,
    pub brace: bool,
}

impl CallArguments {
    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub range: Range,
}

/// Expression grammar, lowest precedence first:
///
/// expr     ::= or_or
/// or_or    ::= and_and { '||' and_and }
/// and_and  ::= or { '&&' or }
/// or       ::= and { '|' and }
/// and      ::= cmp { '&' cmp }
/// cmp      ::= range { ('=='|'~='|'!='|'<'|'<='|'>'|'>=') range }
/// range    ::= add { ':' add }
/// add      ::= mul { ('+'|'-') mul }
/// mul      ::= unary { ('*'|'/'|'\'|'.*'|'./'|'.\'|'%') unary }
/// unary    ::= ('-'|'+'|'!'|'~') unary | power
/// power    ::= postfix { ('^'|'.^') unary }
/// postfix  ::= primary { '(' args ')' | '{' args '}' | '.' id | ''' }
/// primary  ::= number | string | id | '(' expr ')' | '[' rows ']' | '{' rows '}'
///            | '@' '(' params ')' expr | '@' id | ':' | 'end'
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExpressionKind {
    /// `name` or `name(args)`; indexing and calls look the same
    Identifier { name: String, call: Option<CallArguments> },
    Number(String),
    /// Raw text including the quotes
    String(String),
    /// Bare `:` used as an index
    Colon,
    /// `end` used inside an index
    End,
    /// `~` placeholder in output lists and parameter lists
    Placeholder,
    BinaryOperation {
        operator: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    UnaryOperation {
        operator: UnaryOperator,
        operand: Box<Expression>,
    },
    Transpose(Box<Expression>),
    FieldAccess {
        object: Box<Expression>,
        field: String,
        field_range: Range,
    },
    /// Indexing applied to something other than a plain name, e.g. `s.a(1)`
    Index {
        object: Box<Expression>,
        call: CallArguments,
    },
    /// `[a, b; c, d]`, one inner vector per row
    Vector { rows: Vec<Vec<Expression>> },
    /// `{a, b; c, d}`
    Struct { rows: Vec<Vec<Expression>> },
    AnonymousFunction {
        parameters: Vec<Expression>,
        body: Box<Expression>,
    },
    /// `@name`
    FunctionHandle { name: String },
    /// `name = value` inside a parameter or argument list. `content` is the
    /// source text of `value`.
    DefaultValueArgument {
        name: String,
        name_range: Range,
        value: Box<Expression>,
        content: String,
    },
}

impl Expression {
    pub fn new(kind: ExpressionKind, range: Range) -> Self {
        Self { kind, range }
    }

    pub fn identifier(name: impl Into<String>, range: Range) -> Self {
        Self::new(
            ExpressionKind::Identifier {
                name: name.into(),
                call: None,
            },
            range,
        )
    }

    /// Name of a plain or called identifier.
    pub fn identifier_name(&self) -> Option<&str> {
        match &self.kind {
            ExpressionKind::Identifier { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Name at the root of an lvalue chain: `a` for `a`, `a(1)`, `a.b{2}`.
    pub fn root_name(&self) -> Option<(&str, Range)> {
        match &self.kind {
            ExpressionKind::Identifier { name, call } => {
                let range = match call {
                    Some(_) => self.name_range(name),
                    None => self.range,
                };
                Some((name, range))
            }
            ExpressionKind::FieldAccess { object, .. } | ExpressionKind::Index { object, .. } => object.root_name(),
            _ => None,
        }
    }

    // Names never span lines, so the end is a fixed char count from the start.
    fn name_range(&self, name: &str) -> Range {
        let len = name.chars().count();
        let start = self.range.start;
        let end = Position::new(start.line, start.column + len as u32, start.offset + len);
        Range::new(start, end)
    }

    /// Range of just the name for an identifier, the whole node otherwise.
    pub fn name_or_self_range(&self) -> Range {
        match &self.kind {
            ExpressionKind::Identifier { name, .. } => self.name_range(name),
            _ => self.range,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.kind, ExpressionKind::Placeholder)
    }
}
