use super::{MAX_NESTING, ParseResult, Parser};
use crate::{
    ast::{BinaryOperator, CallArguments, Expression, ExpressionKind, UnaryOperator},
    diagnostic::{Diagnostic, ErrorCode},
    token::{Range, TokenKind},
};

fn precedence(op: BinaryOperator) -> u8 {
    use BinaryOperator::*;
    match op {
        ShortOr => 1,
        ShortAnd => 2,
        Or => 3,
        And => 4,
        Equal | NotEqual | Less | LessEqual | Greater | GreaterEqual => 5,
        Range => 6,
        Add | Subtract => 7,
        Multiply | Divide | LeftDivide | Modulus | ElementMultiply | ElementDivide | ElementLeftDivide => 8,
        Power | ElementPower => 10,
    }
}

fn binary(operator: BinaryOperator, left: Expression, right: Expression) -> Expression {
    let range = left.range.merge(&right.range);
    Expression::new(
        ExpressionKind::BinaryOperation {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        },
        range,
    )
}

impl<'a> Parser<'a> {
    pub(crate) fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.nested(|p| p.parse_binary(1))
    }

    /// Run a recursive step, refusing to go deeper than [`MAX_NESTING`].
    fn nested<T>(&mut self, step: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.nesting >= MAX_NESTING {
            return Err(Diagnostic::error(
                ErrorCode::UnexpectedTokenExpr,
                "expression nested too deeply",
                self.peek().range,
            ));
        }
        self.nesting += 1;
        let result = step(self);
        self.nesting -= 1;
        result
    }

    /// Precedence climbing over every level below unary operators.
    fn parse_binary(&mut self, min_precedence: u8) -> ParseResult<Expression> {
        let mut left = self.parse_unary()?;
        while let Some((op, width)) = self.peek_binary_operator() {
            let prec = precedence(op);
            if prec < min_precedence || matches!(op, BinaryOperator::Power | BinaryOperator::ElementPower) {
                break;
            }
            // `[a -b]` holds two elements, `[a - b]` and `[a-b]` one.
            if self.in_matrix
                && matches!(op, BinaryOperator::Add | BinaryOperator::Subtract)
                && self.gap_before(self.pos)
                && !self.gap_before(self.pos + 1)
            {
                break;
            }
            for _ in 0..width {
                self.advance();
            }
            let right = self.parse_binary(prec + 1)?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn unary_operator(&self) -> Option<UnaryOperator> {
        match self.peek().kind {
            TokenKind::Subtraction => Some(UnaryOperator::Negate),
            TokenKind::Addition => Some(UnaryOperator::Plus),
            TokenKind::Not | TokenKind::Tilde => Some(UnaryOperator::Not),
            _ => None,
        }
    }

    fn parse_unary(&mut self) -> ParseResult<Expression> {
        match self.unary_operator() {
            Some(operator) => {
                let start = self.advance().range.start;
                let operand = self.nested(|p| p.parse_unary())?;
                Ok(Expression::new(
                    ExpressionKind::UnaryOperation {
                        operator,
                        operand: Box::new(operand),
                    },
                    self.range_from(start),
                ))
            }
            None => self.parse_power(),
        }
    }

    /// `^` binds tighter than unary minus on its left (`-2^2` is `-(2^2)`)
    /// but accepts a signed exponent on its right (`2^-1`).
    fn parse_power(&mut self) -> ParseResult<Expression> {
        let mut base = self.parse_postfix()?;
        while let Some((op @ (BinaryOperator::Power | BinaryOperator::ElementPower), width)) = self.peek_binary_operator()
        {
            for _ in 0..width {
                self.advance();
            }
            let exponent = self.parse_power_operand()?;
            base = binary(op, base, exponent);
        }
        Ok(base)
    }

    fn parse_power_operand(&mut self) -> ParseResult<Expression> {
        match self.unary_operator() {
            Some(operator) => {
                let start = self.advance().range.start;
                let operand = self.nested(|p| p.parse_power_operand())?;
                Ok(Expression::new(
                    ExpressionKind::UnaryOperation {
                        operator,
                        operand: Box::new(operand),
                    },
                    self.range_from(start),
                ))
            }
            None => self.parse_postfix(),
        }
    }

    /// Calls, indexing, field access and transposes applied to a primary.
    pub(super) fn parse_postfix(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_primary()?;
        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::LParent | TokenKind::LSquirly => {
                    // Inside a matrix `[f (1)]` is two elements
                    if self.in_matrix && self.gap_before(self.pos) {
                        break;
                    }
                    let close = if token.kind == TokenKind::LParent {
                        TokenKind::RParent
                    } else {
                        TokenKind::RSquirly
                    };
                    let args = self.parse_call_arguments(close)?;
                    expr = attach_arguments(expr, args);
                }
                TokenKind::Period => {
                    let next = self.peek_at(1);
                    if next.is_name() || next.kind == TokenKind::Keyword {
                        self.advance();
                        let field = self.advance();
                        let range = expr.range.merge(&field.range);
                        expr = Expression::new(
                            ExpressionKind::FieldAccess {
                                object: Box::new(expr),
                                field: field.text.clone(),
                                field_range: field.range,
                            },
                            range,
                        );
                    } else if next.kind == TokenKind::LParent {
                        // Dynamic field `s.(name)`
                        self.advance();
                        let args = self.parse_call_arguments(TokenKind::RParent)?;
                        let range = expr.range.merge(&args.range);
                        expr = Expression::new(
                            ExpressionKind::Index {
                                object: Box::new(expr),
                                call: args,
                            },
                            range,
                        );
                    } else {
                        break;
                    }
                }
                TokenKind::Transpose => {
                    let end = self.advance().range;
                    let range = expr.range.merge(&end);
                    expr = Expression::new(ExpressionKind::Transpose(Box::new(expr)), range);
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> ParseResult<Expression> {
        let token = self.peek();
        match token.kind {
            TokenKind::Number => {
                self.advance();
                Ok(Expression::new(ExpressionKind::Number(token.text.clone()), token.range))
            }
            TokenKind::String => {
                self.advance();
                if token.is_unterminated_string() {
                    self.errors.push(Diagnostic::error(
                        ErrorCode::UnexpectedTokenExpr,
                        "unterminated string",
                        token.range,
                    ));
                }
                Ok(Expression::new(ExpressionKind::String(token.text.clone()), token.range))
            }
            TokenKind::Identifier | TokenKind::NativeFunction => {
                self.advance();
                Ok(Expression::identifier(token.text.clone(), token.range))
            }
            TokenKind::Keyword if token.text == "end" && self.index_depth > 0 => {
                self.advance();
                Ok(Expression::new(ExpressionKind::End, token.range))
            }
            TokenKind::Colon if self.index_depth > 0 => {
                self.advance();
                Ok(Expression::new(ExpressionKind::Colon, token.range))
            }
            TokenKind::LParent => self.parse_parenthesized(),
            TokenKind::LBracket => self.parse_matrix(TokenKind::RBracket),
            TokenKind::LSquirly => self.parse_matrix(TokenKind::RSquirly),
            TokenKind::At => self.parse_function_handle(),
            _ => Err(self.unexpected()),
        }
    }

    fn parse_parenthesized(&mut self) -> ParseResult<Expression> {
        let open = self.advance();
        let saved_matrix = std::mem::replace(&mut self.in_matrix, false);
        let inner = self.parse_expression();
        self.in_matrix = saved_matrix;
        let mut inner = inner?;
        if !self.eat(TokenKind::RParent) {
            return Err(Diagnostic::error(
                ErrorCode::MissingClosingParen,
                "missing closing parenthesis",
                open.range.merge(&inner.range),
            ));
        }
        inner.range = self.range_from(open.range.start);
        Ok(inner)
    }

    /// `(args)` or `{args}` after a name or expression. A newline or end of
    /// statement before the closing token is reported and the arguments read
    /// so far are kept.
    pub(super) fn parse_call_arguments(&mut self, close: TokenKind) -> ParseResult<CallArguments> {
        let open = self.advance();
        let saved_matrix = std::mem::replace(&mut self.in_matrix, false);
        self.index_depth += 1;
        let result = self.parse_argument_list(close);
        self.index_depth -= 1;
        self.in_matrix = saved_matrix;
        let arguments = result?;
        Ok(CallArguments {
            arguments,
            range: self.range_from(open.range.start),
            brace: close == TokenKind::RSquirly,
        })
    }

    fn parse_argument_list(&mut self, close: TokenKind) -> ParseResult<Vec<Expression>> {
        let mut arguments = Vec::new();
        if self.eat(close) {
            return Ok(arguments);
        }
        loop {
            let argument = if self.peek().is_name() && self.is_assignment_equals(self.pos + 1) {
                let argument = self.parse_default_value_argument()?;
                self.errors.push(Diagnostic::error(
                    ErrorCode::UnexpectedDefaultValueArgument,
                    "unexpected default value argument in function call",
                    argument.range,
                ));
                argument
            } else {
                self.parse_expression()?
            };
            arguments.push(argument);

            let token = self.peek();
            match token.kind {
                TokenKind::Comma => {
                    self.advance();
                }
                kind if kind == close => {
                    self.advance();
                    break;
                }
                TokenKind::Nl | TokenKind::Semicolon | TokenKind::Eof => {
                    let expected = if close == TokenKind::RParent { ')' } else { '}' };
                    self.errors.push(Diagnostic::error(
                        ErrorCode::MissingParen,
                        format!("missing closing '{}'", expected),
                        token.range,
                    ));
                    break;
                }
                _ => {
                    return Err(Diagnostic::error(
                        ErrorCode::ExpectedCommaParen,
                        format!("expected ',' or ')' but found '{}'", token.text),
                        token.range,
                    ));
                }
            }
        }
        Ok(arguments)
    }

    /// `name = value` in an argument or parameter list.
    pub(super) fn parse_default_value_argument(&mut self) -> ParseResult<Expression> {
        let name = self.advance();
        self.advance(); // '='
        if self.at_statement_end() || self.check(TokenKind::RParent) {
            return Err(Diagnostic::error(
                ErrorCode::InvalidDefaultValue,
                format!("expected a default value for '{}'", name.text),
                name.range,
            ));
        }
        let from = self.pos;
        let value = self.parse_expression()?;
        let content = self.source_text(from, self.pos);
        Ok(Expression::new(
            ExpressionKind::DefaultValueArgument {
                name: name.text.clone(),
                name_range: name.range,
                value: Box::new(value),
                content,
            },
            self.range_from(name.range.start),
        ))
    }

    /// Vector `[...]` or struct `{...}` literal. Rows split on `;` or newline,
    /// elements on `,` or whitespace.
    fn parse_matrix(&mut self, close: TokenKind) -> ParseResult<Expression> {
        let open = self.advance();
        let saved_matrix = std::mem::replace(&mut self.in_matrix, true);
        let mut rows = Vec::new();
        let mut row = Vec::new();
        loop {
            let token = self.peek();
            match token.kind {
                kind if kind == close => {
                    self.advance();
                    break;
                }
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::Semicolon | TokenKind::Nl => {
                    self.advance();
                    if !row.is_empty() {
                        rows.push(std::mem::take(&mut row));
                    }
                }
                TokenKind::Keyword
                    if self.at_block_boundary() && !(token.text == "end" && self.index_depth > 0) =>
                {
                    self.push_unterminated_matrix(close, open.range);
                    break;
                }
                TokenKind::Eof => {
                    self.push_unterminated_matrix(close, open.range);
                    break;
                }
                _ => {
                    let before = self.pos;
                    match self.parse_expression() {
                        Ok(element) => row.push(element),
                        Err(diagnostic) => {
                            self.errors.push(diagnostic);
                            if self.pos == before {
                                self.advance();
                            }
                        }
                    }
                }
            }
        }
        if !row.is_empty() {
            rows.push(row);
        }
        self.in_matrix = saved_matrix;

        let kind = if close == TokenKind::RBracket {
            ExpressionKind::Vector { rows }
        } else {
            ExpressionKind::Struct { rows }
        };
        Ok(Expression::new(kind, self.range_from(open.range.start)))
    }

    fn push_unterminated_matrix(&mut self, close: TokenKind, open: Range) {
        let (code, message) = if close == TokenKind::RBracket {
            (ErrorCode::UnexpectedVectorValue, "missing closing ']'")
        } else {
            (ErrorCode::StructBadArgs, "missing closing '}'")
        };
        self.errors.push(Diagnostic::error(code, message, open));
    }

    /// `@name` or `@(params) body`.
    fn parse_function_handle(&mut self) -> ParseResult<Expression> {
        let at = self.advance();
        let token = self.peek();
        match token.kind {
            TokenKind::Identifier | TokenKind::NativeFunction => {
                self.advance();
                Ok(Expression::new(
                    ExpressionKind::FunctionHandle {
                        name: token.text.clone(),
                    },
                    self.range_from(at.range.start),
                ))
            }
            TokenKind::LParent => {
                let open = self.advance();
                let mut parameters = Vec::new();
                loop {
                    let token = self.peek();
                    match token.kind {
                        TokenKind::RParent => {
                            self.advance();
                            break;
                        }
                        TokenKind::Comma => {
                            self.advance();
                        }
                        TokenKind::Identifier | TokenKind::NativeFunction => {
                            self.advance();
                            parameters.push(Expression::identifier(token.text.clone(), token.range));
                        }
                        TokenKind::Tilde | TokenKind::Not => {
                            self.advance();
                            parameters.push(Expression::new(ExpressionKind::Placeholder, token.range));
                        }
                        TokenKind::Nl | TokenKind::Semicolon | TokenKind::Eof => {
                            self.errors.push(Diagnostic::error(
                                ErrorCode::MissingParen,
                                "missing closing ')'",
                                open.range,
                            ));
                            break;
                        }
                        _ => {
                            return Err(Diagnostic::error(
                                ErrorCode::InvalidArgument,
                                format!("invalid parameter '{}'", token.text),
                                token.range,
                            ));
                        }
                    }
                }
                let saved_matrix = std::mem::replace(&mut self.in_matrix, false);
                let body = self.parse_expression();
                self.in_matrix = saved_matrix;
                let body = body?;
                Ok(Expression::new(
                    ExpressionKind::AnonymousFunction {
                        parameters,
                        body: Box::new(body),
                    },
                    self.range_from(at.range.start),
                ))
            }
            _ => Err(self.unexpected()),
        }
    }
}

/// The first argument list on a bare name belongs to the identifier node;
/// anything further wraps the expression in an index.
fn attach_arguments(expr: Expression, args: CallArguments) -> Expression {
    let range = expr.range.merge(&args.range);
    match expr.kind {
        ExpressionKind::Identifier { name, call: None } => Expression::new(
            ExpressionKind::Identifier {
                name,
                call: Some(args),
            },
            range,
        ),
        kind => Expression::new(
            ExpressionKind::Index {
                object: Box::new(Expression::new(kind, expr.range)),
                call: args,
            },
            range,
        ),
    }
}
