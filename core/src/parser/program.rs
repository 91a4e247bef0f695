use super::{MAX_NESTING, ParseResult, Parser};
use crate::{
    ast::{Expression, ExpressionKind, Program, Statement, StatementKind, Word},
    diagnostic::{Diagnostic, ErrorCode},
    token::{TokenKind, grammar},
};

impl<'a> Parser<'a> {
    /// Parse the whole token stream. Never fails: problems are collected in
    /// [`Parser::errors`] and [`Parser::warnings`].
    pub fn parse(&mut self) -> Program {
        let body = self.parse_statement_list(&[]);
        Program::new(body)
    }

    /// Parse statements until one of `terminators` (left unconsumed) or the
    /// end of input. A block keyword that closes an enclosing block also stops
    /// the list so the enclosing block can claim it; any other stray block
    /// keyword is reported and skipped.
    pub(super) fn parse_statement_list(&mut self, terminators: &'static [&'static str]) -> Vec<Statement> {
        self.open_blocks.push(terminators);
        let mut body = Vec::new();
        loop {
            self.skip_separators();
            if self.eof() {
                break;
            }
            let token = self.peek();
            if token.kind == TokenKind::Keyword && grammar::is_block_boundary(&token.text) {
                let word = token.text.as_str();
                if self.open_blocks.iter().any(|set| set.contains(&word)) {
                    break;
                }
                self.errors.push(Diagnostic::error(
                    ErrorCode::UnexpectedToken,
                    format!("unexpected '{}'", word),
                    token.range,
                ));
                self.advance();
                continue;
            }

            let before = self.pos;
            match self.parse_statement() {
                Ok(statement) => body.push(statement),
                Err(diagnostic) => {
                    self.errors.push(diagnostic);
                    self.synchronize();
                }
            }
            // Always make progress
            if self.pos == before {
                self.advance();
            }
        }
        self.open_blocks.pop();
        body
    }

    pub(crate) fn parse_statement(&mut self) -> ParseResult<Statement> {
        let token = self.peek();
        let mut statement = match token.kind {
            TokenKind::Keyword => self.parse_keyword_statement()?,
            TokenKind::LBracket if self.is_multi_assignment() => self.parse_multi_assignment()?,
            TokenKind::Identifier | TokenKind::NativeFunction if self.is_command_syntax() => {
                self.parse_command_call()
            }
            _ => self.parse_simple_statement()?,
        };
        self.finish_statement(&mut statement);
        Ok(statement)
    }

    fn parse_keyword_statement(&mut self) -> ParseResult<Statement> {
        let token = self.peek();
        let opens_block = matches!(token.text.as_str(), "function" | "if" | "for" | "while" | "do" | "switch");
        if opens_block && self.open_blocks.len() > MAX_NESTING {
            return Err(Diagnostic::error(
                ErrorCode::UnexpectedToken,
                "blocks nested too deeply",
                token.range,
            ));
        }
        match token.text.as_str() {
            "function" => self.parse_function_definition(),
            "if" => Ok(self.parse_if()),
            "for" => Ok(self.parse_for()),
            "while" => Ok(self.parse_while()),
            "do" => Ok(self.parse_do_until()),
            "switch" => Ok(self.parse_switch()),
            "break" | "continue" | "return" => {
                self.advance();
                let kind = match token.text.as_str() {
                    "break" => StatementKind::Break,
                    "continue" => StatementKind::Continue,
                    _ => StatementKind::Return,
                };
                Ok(Statement::new(kind, token.range))
            }
            _ => Err(Diagnostic::error(
                ErrorCode::UnexpectedToken,
                format!("unexpected '{}'", token.text),
                token.range,
            )),
        }
    }

    /// Consume the statement separator, record `;`, and warn when the
    /// statement would echo to the console.
    fn finish_statement(&mut self, statement: &mut Statement) {
        let token = self.peek();
        match token.kind {
            TokenKind::Semicolon => {
                statement.suppress_output = true;
                self.advance();
            }
            TokenKind::Comma | TokenKind::Nl => {
                self.advance();
            }
            TokenKind::Eof => {}
            TokenKind::Keyword if self.at_block_boundary() => {}
            _ => {
                self.errors.push(Diagnostic::error(
                    ErrorCode::UnexpectedToken,
                    format!("expected end of statement but found '{}'", token.text),
                    token.range,
                ));
                self.synchronize();
            }
        }

        let echoes = matches!(
            statement.kind,
            StatementKind::Assignment { .. } | StatementKind::MultiAssignment { .. } | StatementKind::Expression(_)
        );
        if echoes && !statement.suppress_output {
            self.warnings.push(Diagnostic::warning(
                ErrorCode::OutputNotSuppressed,
                "Will output to the console",
                statement.range,
            ));
        }
    }

    /// Assignment, or an expression standing alone. A statement that is just
    /// a name, called or not, is a function call.
    fn parse_simple_statement(&mut self) -> ParseResult<Statement> {
        let start = self.peek().range.start;
        if self.find_assignment() {
            let target = self.parse_postfix()?;
            if target.root_name().is_none() {
                self.errors.push(Diagnostic::error(
                    ErrorCode::UnexpectedToken,
                    "invalid assignment target",
                    target.range,
                ));
            }
            if !self.eat(TokenKind::Equals) {
                return Err(self.unexpected_in_statement());
            }
            let value = self.parse_expression()?;
            return Ok(Statement::new(
                StatementKind::Assignment { target, value },
                self.range_from(start),
            ));
        }

        let expr = self.parse_expression()?;
        let kind = match expr.kind {
            ExpressionKind::Identifier { .. } => StatementKind::FunctionCall(expr),
            _ => StatementKind::Expression(expr),
        };
        Ok(Statement::new(kind, self.range_from(start)))
    }

    fn unexpected_in_statement(&self) -> Diagnostic {
        let token = self.peek();
        Diagnostic::error(
            ErrorCode::UnexpectedToken,
            format!("unexpected token '{}'", token.text),
            token.range,
        )
    }

    /// `[...]` whose matching `]` is followed by a lone `=`.
    fn is_multi_assignment(&self) -> bool {
        let mut depth = 0usize;
        let mut index = self.pos;
        while index < self.len {
            match self.token_at(index).kind {
                TokenKind::Nl => return false,
                TokenKind::LParent | TokenKind::LBracket | TokenKind::LSquirly => depth += 1,
                TokenKind::RParent | TokenKind::RSquirly => depth = depth.saturating_sub(1),
                TokenKind::RBracket => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return self.is_assignment_equals(index + 1);
                    }
                }
                _ => {}
            }
            index += 1;
        }
        false
    }

    fn parse_multi_assignment(&mut self) -> ParseResult<Statement> {
        let open = self.advance();
        let targets = self.parse_output_list(open.range);
        if !self.eat(TokenKind::Equals) {
            return Err(self.unexpected_in_statement());
        }
        let value = self.parse_expression()?;
        Ok(Statement::new(
            StatementKind::MultiAssignment { targets, value },
            self.range_from(open.range.start),
        ))
    }

    /// Targets of `[a, b(1), ~]` after the opening bracket, through the
    /// closing one.
    pub(super) fn parse_output_list(&mut self, open: crate::token::Range) -> Vec<Expression> {
        let saved_matrix = std::mem::replace(&mut self.in_matrix, true);
        let mut targets = Vec::new();
        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::RBracket => {
                    self.advance();
                    break;
                }
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::Tilde | TokenKind::Not => {
                    self.advance();
                    targets.push(Expression::new(ExpressionKind::Placeholder, token.range));
                }
                TokenKind::Identifier | TokenKind::NativeFunction => match self.parse_postfix() {
                    Ok(target) => targets.push(target),
                    Err(diagnostic) => self.errors.push(diagnostic),
                },
                TokenKind::Nl | TokenKind::Semicolon | TokenKind::Eof | TokenKind::Equals => {
                    self.errors.push(Diagnostic::error(
                        ErrorCode::OutputVector,
                        "missing closing ']' in output list",
                        open,
                    ));
                    break;
                }
                _ => {
                    self.errors.push(Diagnostic::error(
                        ErrorCode::OutputVector,
                        format!("invalid output '{}'", token.text),
                        token.range,
                    ));
                    self.advance();
                }
            }
        }
        self.in_matrix = saved_matrix;
        targets
    }

    /// `name word ...`: a name, whitespace, then a bare word on the same line,
    /// with no assignment in the statement.
    fn is_command_syntax(&self) -> bool {
        let next = self.peek_at(1);
        if !self.gap_before(self.pos + 1) {
            return false;
        }
        match next.kind {
            TokenKind::Identifier | TokenKind::NativeFunction | TokenKind::Number | TokenKind::String => {
                !self.find_assignment()
            }
            _ => false,
        }
    }

    fn parse_command_call(&mut self) -> Statement {
        let name = self.advance();
        let mut words: Vec<Word> = Vec::new();
        while !self.at_statement_end() {
            let gap = self.gap_before(self.pos);
            let token = self.advance();
            match words.last_mut() {
                // Touching tokens form one word: `-all`, `on.`
                Some(last) if !gap => {
                    last.text.push_str(&token.text);
                    last.range = last.range.merge(&token.range);
                }
                _ => words.push(Word {
                    text: token.text.clone(),
                    range: token.range,
                }),
            }
        }
        Statement::new(
            StatementKind::CommandCall {
                name: name.text.clone(),
                name_range: name.range,
                words,
            },
            self.range_from(name.range.start),
        )
    }
}
