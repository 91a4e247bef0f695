use super::Parser;
use crate::{
    ast::{ConditionalBranch, Expression, Statement, StatementKind, SwitchCase},
    diagnostic::{Diagnostic, ErrorCode},
    token::{Range, TokenKind},
};

const IF_TERMINATORS: &[&str] = &["elseif", "else", "end", "endif"];
const ELSE_TERMINATORS: &[&str] = &["end", "endif"];
const FOR_TERMINATORS: &[&str] = &["end", "endfor"];
const WHILE_TERMINATORS: &[&str] = &["end", "endwhile"];
const DO_TERMINATORS: &[&str] = &["until"];
const CASE_TERMINATORS: &[&str] = &["case", "otherwise", "end", "endswitch"];

impl<'a> Parser<'a> {
    /// Expression heading a block. Errors inside it are recorded and the rest
    /// of the header skipped, so the block itself still parses.
    fn parse_header_expression(&mut self) -> Option<Expression> {
        match self.parse_expression() {
            Ok(expr) => Some(expr),
            Err(diagnostic) => {
                self.errors.push(diagnostic);
                self.synchronize();
                None
            }
        }
    }

    /// Condition after `keyword`, or `None` plus a diagnostic when it is empty.
    fn parse_condition(&mut self, code: ErrorCode, keyword: Range, word: &str) -> Option<Expression> {
        if self.at_statement_end() || self.at_block_boundary() {
            self.errors.push(Diagnostic::error(
                code,
                format!("expected a condition after '{}'", word),
                keyword,
            ));
            return None;
        }
        self.parse_header_expression()
    }

    fn close_block(&mut self, terminators: &[&str], code: ErrorCode, keyword: Range, word: &str) {
        if self.check_any_keyword(terminators) {
            self.advance();
        } else {
            self.errors.push(Diagnostic::error(
                code,
                format!("missing '{}' for '{}' statement", terminators[0], word),
                keyword,
            ));
        }
    }

    pub(super) fn parse_if(&mut self) -> Statement {
        let keyword = self.advance().range;
        let mut branches = Vec::new();
        let mut else_body = None;

        let condition = self.parse_condition(ErrorCode::ExpectedValidIfStmnt, keyword, "if");
        let body = self.parse_statement_list(IF_TERMINATORS);
        branches.push(ConditionalBranch {
            condition,
            body,
            range: self.range_from(keyword.start),
        });

        while self.check_keyword("elseif") {
            let branch_keyword = self.advance().range;
            let condition = self.parse_condition(ErrorCode::ExpectedValidIfStmnt, branch_keyword, "elseif");
            let body = self.parse_statement_list(IF_TERMINATORS);
            branches.push(ConditionalBranch {
                condition,
                body,
                range: self.range_from(branch_keyword.start),
            });
        }
        if self.check_keyword("else") {
            self.advance();
            else_body = Some(self.parse_statement_list(ELSE_TERMINATORS));
        }

        self.close_block(ELSE_TERMINATORS, ErrorCode::MissingEndIfStmnt, keyword, "if");
        Statement::new(StatementKind::If { branches, else_body }, self.range_from(keyword.start))
    }

    /// `for i = expr`, optionally wrapped in parentheses.
    pub(super) fn parse_for(&mut self) -> Statement {
        let keyword = self.advance().range;
        let parenthesized = self.check(TokenKind::LParent)
            && self.peek_at(1).is_name()
            && self.is_assignment_equals(self.pos + 2);
        if parenthesized {
            self.advance();
        }

        let mut variable = None;
        let mut iterable = None;
        if self.peek().is_name() && self.is_assignment_equals(self.pos + 1) {
            let name = self.advance();
            self.advance(); // '='
            variable = Some(Expression::identifier(name.text.clone(), name.range));
            if self.at_statement_end() {
                self.errors.push(Diagnostic::error(
                    ErrorCode::ExpectedValidForStmnt,
                    format!("expected a range for loop variable '{}'", name.text),
                    name.range,
                ));
            } else {
                iterable = self.parse_header_expression();
            }
            if parenthesized && !self.eat(TokenKind::RParent) {
                self.errors.push(Diagnostic::error(
                    ErrorCode::MissingClosingParen,
                    "missing closing parenthesis",
                    keyword,
                ));
            }
        } else {
            self.errors.push(Diagnostic::error(
                ErrorCode::ExpectedValidForStmnt,
                "expected 'variable = range' after 'for'",
                keyword,
            ));
            if !self.at_block_boundary() {
                self.synchronize();
            }
        }

        let body = self.parse_statement_list(FOR_TERMINATORS);
        self.close_block(FOR_TERMINATORS, ErrorCode::MissingEndForStmnt, keyword, "for");
        Statement::new(
            StatementKind::For {
                variable,
                iterable,
                body,
            },
            self.range_from(keyword.start),
        )
    }

    pub(super) fn parse_while(&mut self) -> Statement {
        let keyword = self.advance().range;
        let condition = self.parse_condition(ErrorCode::ExpectedValidWhileStmnt, keyword, "while");
        let body = self.parse_statement_list(WHILE_TERMINATORS);
        self.close_block(WHILE_TERMINATORS, ErrorCode::MissingEndWhileStmnt, keyword, "while");
        Statement::new(StatementKind::While { condition, body }, self.range_from(keyword.start))
    }

    pub(super) fn parse_do_until(&mut self) -> Statement {
        let keyword = self.advance().range;
        let body = self.parse_statement_list(DO_TERMINATORS);
        let condition = if self.check_keyword("until") {
            let until = self.advance().range;
            self.parse_condition(ErrorCode::ExpectedValidUntilStmnt, until, "until")
        } else {
            self.errors.push(Diagnostic::error(
                ErrorCode::MissingUntilStmnt,
                "missing 'until' for 'do' statement",
                keyword,
            ));
            None
        };
        Statement::new(StatementKind::DoUntil { body, condition }, self.range_from(keyword.start))
    }

    pub(super) fn parse_switch(&mut self) -> Statement {
        let keyword = self.advance().range;
        let subject = self.parse_condition(ErrorCode::ExpectedValidSwitchStmnt, keyword, "switch");
        let mut cases = Vec::new();
        let mut otherwise = None;
        let mut terminated = false;

        loop {
            self.skip_separators();
            if self.check_keyword("case") {
                let case_keyword = self.advance().range;
                let value = if self.at_statement_end() {
                    self.errors.push(Diagnostic::error(
                        ErrorCode::ExpectedValidSwitchStmnt,
                        "expected a value after 'case'",
                        case_keyword,
                    ));
                    None
                } else {
                    self.parse_header_expression()
                };
                let body = self.parse_statement_list(CASE_TERMINATORS);
                cases.push(SwitchCase {
                    value,
                    body,
                    range: self.range_from(case_keyword.start),
                });
            } else if self.check_keyword("otherwise") {
                self.advance();
                otherwise = Some(self.parse_statement_list(CASE_TERMINATORS));
            } else if self.check_any_keyword(&["end", "endswitch"]) {
                self.advance();
                terminated = true;
                break;
            } else if self.eof() || self.at_block_boundary() {
                break;
            } else {
                let token = self.peek();
                self.errors.push(Diagnostic::error(
                    ErrorCode::ExpectedValidSwitchStmnt,
                    format!("expected 'case' or 'otherwise' but found '{}'", token.text),
                    token.range,
                ));
                let before = self.pos;
                self.synchronize();
                if self.pos == before {
                    self.advance();
                }
            }
        }

        if !terminated {
            self.errors.push(Diagnostic::error(
                ErrorCode::MissingEndSwitchStmnt,
                "missing 'end' for 'switch' statement",
                keyword,
            ));
        }
        Statement::new(
            StatementKind::Switch {
                subject,
                cases,
                otherwise,
            },
            self.range_from(keyword.start),
        )
    }
}
