use super::{ParseResult, Parser};
use crate::{
    ast::{Expression, ExpressionKind, FunctionDefinition, Statement, StatementKind},
    diagnostic::{Diagnostic, ErrorCode},
    token::{Range, TokenKind},
};

const FUNCTION_TERMINATORS: &[&str] = &["end", "endfunction"];

impl<'a> Parser<'a> {
    /// `function [outs] = name(params) body end`
    ///
    /// A missing `end` is reported and the definition closes at the end of
    /// input with everything parsed so far as its body.
    pub(super) fn parse_function_definition(&mut self) -> ParseResult<Statement> {
        let keyword_index = self.pos;
        let keyword = self.advance().range;

        let mut outputs = Vec::new();
        if self.check(TokenKind::LBracket) {
            let open = self.advance().range;
            outputs = self.parse_output_list(open);
            if !self.eat(TokenKind::Equals) {
                self.errors.push(Diagnostic::error(
                    ErrorCode::OutputVector,
                    "expected '=' after output list",
                    self.range_from(open.start),
                ));
            }
        } else if self.peek().is_name() && self.is_assignment_equals(self.pos + 1) {
            let output = self.advance();
            self.advance(); // '='
            outputs.push(Expression::identifier(output.text.clone(), output.range));
        }

        let (name, name_range) = if self.peek().is_name() {
            let token = self.advance();
            (token.text.clone(), token.range)
        } else {
            self.errors.push(Diagnostic::error(
                ErrorCode::ExpectedFnIdent,
                "expected function name",
                self.peek().range,
            ));
            (String::new(), Range::single(self.last_end()))
        };

        let parameters = if self.check(TokenKind::LParent) {
            self.parse_parameter_list()
        } else {
            Vec::new()
        };

        let documentation = self
            .leading_documentation(keyword_index)
            .or_else(|| self.trailing_documentation(self.pos));

        let body = self.parse_statement_list(FUNCTION_TERMINATORS);
        let terminated = self.check_any_keyword(FUNCTION_TERMINATORS);
        if terminated {
            self.advance();
        } else {
            let label = if name.is_empty() { "function" } else { name.as_str() };
            self.errors.push(Diagnostic::error(
                ErrorCode::FnDefMissingEnd,
                format!("missing 'end' for function '{}'", label),
                Range::new(keyword.start, name_range.end.max(keyword.end)),
            ));
        }

        let definition = FunctionDefinition {
            name,
            name_range,
            outputs,
            parameters,
            body,
            documentation,
            terminated,
        };
        Ok(Statement::new(
            StatementKind::FunctionDefinition(Box::new(definition)),
            self.range_from(keyword.start),
        ))
    }

    fn parse_parameter_list(&mut self) -> Vec<Expression> {
        let open = self.advance().range;
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
                TokenKind::Identifier | TokenKind::NativeFunction if self.is_assignment_equals(self.pos + 1) => {
                    let before = self.pos;
                    match self.parse_default_value_argument() {
                        Ok(parameter) => parameters.push(parameter),
                        Err(diagnostic) => {
                            self.errors.push(diagnostic);
                            if self.pos == before {
                                self.advance();
                            }
                        }
                    }
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
                        "missing closing ')' in parameter list",
                        open,
                    ));
                    break;
                }
                _ => {
                    self.errors.push(Diagnostic::error(
                        ErrorCode::InvalidFnDefArgument,
                        format!("invalid parameter '{}'", token.text),
                        token.range,
                    ));
                    self.advance();
                }
            }
        }
        parameters
    }
}
