use super::Parser;
use crate::{
    ast::BinaryOperator,
    diagnostic::{Diagnostic, ErrorCode},
    token::{Position, Range, Token, TokenKind, grammar},
};

impl<'a> Parser<'a> {
    pub(super) fn eof(&self) -> bool {
        self.pos >= self.len
    }

    pub(super) fn token_at(&self, index: usize) -> &'a Token {
        match self.significant.get(index) {
            Some(&raw) => &self.tokens[raw],
            None => self.end_token,
        }
    }

    pub(super) fn peek(&self) -> &'a Token {
        self.token_at(self.pos)
    }

    pub(super) fn peek_at(&self, offset: usize) -> &'a Token {
        self.token_at(self.pos + offset)
    }

    pub(super) fn advance(&mut self) -> &'a Token {
        let token = self.peek();
        if !self.eof() {
            self.pos += 1;
        }
        token
    }

    pub(super) fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub(super) fn check_keyword(&self, word: &str) -> bool {
        self.peek().is_keyword(word)
    }

    pub(super) fn check_any_keyword(&self, words: &[&str]) -> bool {
        let token = self.peek();
        token.kind == TokenKind::Keyword && words.contains(&token.text.as_str())
    }

    pub(super) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// End of the last consumed token, or the start of the current one.
    pub(super) fn last_end(&self) -> Position {
        if self.pos > 0 {
            self.token_at(self.pos - 1).range.end
        } else {
            self.peek().range.start
        }
    }

    pub(super) fn range_from(&self, start: Position) -> Range {
        Range::new(start, self.last_end().max(start))
    }

    /// Whether whitespace (or a comment) separates token `index` from the one
    /// before it.
    pub(super) fn gap_before(&self, index: usize) -> bool {
        if index == 0 {
            return true;
        }
        let prev = self.token_at(index - 1);
        let current = self.token_at(index);
        current.range.start.offset > prev.range.end.offset
    }

    pub(super) fn at_statement_end(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Nl | TokenKind::Semicolon | TokenKind::Comma | TokenKind::Eof
        )
    }

    pub(super) fn at_block_boundary(&self) -> bool {
        let token = self.peek();
        token.kind == TokenKind::Keyword && grammar::is_block_boundary(&token.text)
    }

    pub(super) fn skip_separators(&mut self) {
        while matches!(
            self.peek().kind,
            TokenKind::Nl | TokenKind::Semicolon | TokenKind::Comma
        ) {
            self.advance();
        }
    }

    /// Diagnostic for whatever token sits at the cursor.
    pub(super) fn unexpected(&self) -> Diagnostic {
        let token = self.peek();
        match token.kind {
            TokenKind::Nl | TokenKind::Semicolon | TokenKind::Comma | TokenKind::Eof => {
                Diagnostic::error(ErrorCode::UnexpectedNl, "unexpected end of statement", token.range)
            }
            TokenKind::Illegal => Diagnostic::error(
                ErrorCode::UnexpectedTokenExpr,
                format!("illegal character '{}'", token.text),
                token.range,
            ),
            _ => Diagnostic::error(
                ErrorCode::UnexpectedTokenExpr,
                format!("unexpected token '{}'", token.text),
                token.range,
            ),
        }
    }

    /// Skip to the next statement boundary: a newline, a `;`/`,` outside any
    /// brackets (both consumed), or a block keyword (left in place).
    pub(super) fn synchronize(&mut self) {
        let mut depth = 0usize;
        while !self.eof() {
            let token = self.peek();
            match token.kind {
                TokenKind::Nl => {
                    self.advance();
                    return;
                }
                TokenKind::Semicolon | TokenKind::Comma if depth == 0 => {
                    self.advance();
                    return;
                }
                TokenKind::Keyword if depth == 0 && grammar::is_block_boundary(&token.text) => return,
                TokenKind::LParent | TokenKind::LBracket | TokenKind::LSquirly => depth += 1,
                TokenKind::RParent | TokenKind::RBracket | TokenKind::RSquirly => {
                    depth = depth.saturating_sub(1);
                }
                _ => {}
            }
            self.advance();
        }
    }

    /// Binary operator at the cursor and how many tokens spell it.
    /// Two-character operators are only recognized when their halves touch.
    pub(super) fn peek_binary_operator(&self) -> Option<(BinaryOperator, usize)> {
        use BinaryOperator::*;
        use TokenKind as K;

        let first = self.peek().kind;
        let second = if self.gap_before(self.pos + 1) {
            None
        } else {
            Some(self.peek_at(1).kind)
        };
        let op = match (first, second) {
            (K::Pipe, Some(K::Pipe)) => (ShortOr, 2),
            (K::Pipe, _) => (Or, 1),
            (K::Ampersand, Some(K::Ampersand)) => (ShortAnd, 2),
            (K::Ampersand, _) => (And, 1),
            (K::Equals, Some(K::Equals)) => (Equal, 2),
            (K::Tilde | K::Not, Some(K::Equals)) => (NotEqual, 2),
            (K::LessThan, Some(K::Equals)) => (LessEqual, 2),
            (K::LessThan, _) => (Less, 1),
            (K::GreaterThan, Some(K::Equals)) => (GreaterEqual, 2),
            (K::GreaterThan, _) => (Greater, 1),
            (K::Colon, _) => (Range, 1),
            (K::Addition, _) => (Add, 1),
            (K::Subtraction, _) => (Subtract, 1),
            (K::Multiplication, _) => (Multiply, 1),
            (K::Division, _) => (Divide, 1),
            (K::LeftDivision, _) => (LeftDivide, 1),
            (K::Modulus, _) => (Modulus, 1),
            (K::Exponentiation, _) => (Power, 1),
            (K::Period, Some(K::Multiplication)) => (ElementMultiply, 2),
            (K::Period, Some(K::Division)) => (ElementDivide, 2),
            (K::Period, Some(K::LeftDivision)) => (ElementLeftDivide, 2),
            (K::Period, Some(K::Exponentiation)) => (ElementPower, 2),
            _ => return None,
        };
        Some(op)
    }

    /// A lone `=` at `index`, not part of `==`, `<=`, `>=`, `~=` or `!=`.
    pub(super) fn is_assignment_equals(&self, index: usize) -> bool {
        if self.token_at(index).kind != TokenKind::Equals {
            return false;
        }
        let next_is_equals = !self.gap_before(index + 1) && self.token_at(index + 1).kind == TokenKind::Equals;
        let joined_to_previous = index > 0
            && !self.gap_before(index)
            && matches!(
                self.token_at(index - 1).kind,
                TokenKind::Equals
                    | TokenKind::LessThan
                    | TokenKind::GreaterThan
                    | TokenKind::Tilde
                    | TokenKind::Not
            );
        !next_is_equals && !joined_to_previous
    }

    /// Look ahead to the end of the statement for an assignment `=` outside
    /// any brackets.
    pub(super) fn find_assignment(&self) -> bool {
        let mut depth = 0usize;
        let mut index = self.pos;
        while index < self.len {
            let token = self.token_at(index);
            match token.kind {
                TokenKind::Nl => return false,
                TokenKind::Semicolon | TokenKind::Comma if depth == 0 => return false,
                TokenKind::Keyword if depth == 0 && grammar::is_block_boundary(&token.text) => return false,
                TokenKind::LParent | TokenKind::LBracket | TokenKind::LSquirly => depth += 1,
                TokenKind::RParent | TokenKind::RBracket | TokenKind::RSquirly => {
                    depth = depth.saturating_sub(1);
                }
                TokenKind::Equals if depth == 0 && self.is_assignment_equals(index) => return true,
                _ => {}
            }
            index += 1;
        }
        false
    }

    /// Source text of significant tokens `[from, to)`, with inner spacing kept.
    pub(super) fn source_text(&self, from: usize, to: usize) -> String {
        let mut text = String::new();
        let mut prev: Option<&Token> = None;
        for index in from..to.min(self.len) {
            let token = self.token_at(index);
            if let Some(prev) = prev {
                let gap = token.range.start.offset.saturating_sub(prev.range.end.offset);
                if token.range.start.line != prev.range.end.line {
                    text.push(' ');
                } else {
                    text.extend(std::iter::repeat_n(' ', gap));
                }
            }
            text.push_str(&token.text);
            prev = Some(token);
        }
        text
    }

    /// Comment block right above the token at significant index `index`.
    /// Only comments that start their own line count.
    pub(super) fn leading_documentation(&self, index: usize) -> Option<String> {
        let mut raw = *self.significant.get(index)?;
        let mut lines = Vec::new();
        while raw > 0 {
            raw -= 1;
            let token = &self.tokens[raw];
            match token.kind {
                TokenKind::Nl => continue,
                TokenKind::Comment if raw == 0 || self.tokens[raw - 1].kind == TokenKind::Nl => {
                    lines.push(strip_comment_marker(&token.text));
                }
                _ => break,
            }
        }
        if lines.is_empty() {
            return None;
        }
        lines.reverse();
        Some(lines.join("\n"))
    }

    /// Comment block following a header that ends before significant index
    /// `index`, on the header's line or the lines right after it.
    pub(super) fn trailing_documentation(&self, index: usize) -> Option<String> {
        let mut raw = match index.checked_sub(1) {
            Some(last) => *self.significant.get(last)? + 1,
            None => 0,
        };
        let mut lines = Vec::new();
        while let Some(token) = self.tokens.get(raw) {
            match token.kind {
                TokenKind::Nl => {}
                TokenKind::Comment => lines.push(strip_comment_marker(&token.text)),
                _ => break,
            }
            raw += 1;
        }
        if lines.is_empty() { None } else { Some(lines.join("\n")) }
    }
}

/// `% text`, `## text` and `#text` all become `text`.
pub(crate) fn strip_comment_marker(comment: &str) -> String {
    let body = comment.trim_start_matches(['%', '#']);
    let body = body.strip_prefix(' ').unwrap_or(body);
    body.trim_end().to_string()
}
