use super::grammar::{is_keyword, is_native_function, symbol_kind};
use super::{Position, Range, Token, TokenKind, TokenizeError};

/// Ceiling for [`Tokenizer::tokenize`]. Reaching it means the scanner stopped
/// making progress, not that the input is large.
pub const MAX_TOKENS: usize = 1_000_000;

#[inline]
fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

#[inline]
fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Lazy scanner over a document. Yields tokens in order and finishes with
/// exactly one [`TokenKind::Eof`].
///
/// Two characters of lookahead (`current`, `lookahead`) drive every decision;
/// line and column are tracked incrementally as the cursor moves.
pub struct Tokenizer {
    chars: Vec<char>,
    idx: usize,
    current: Option<char>,
    lookahead: Option<char>,
    line: u32,
    column: u32,
    last_kind: Option<TokenKind>,
    last_end: usize,
    finished: bool,
}

impl Tokenizer {
    pub fn new(text: &str) -> Self {
        let mut t = Tokenizer {
            chars: Vec::with_capacity(text.len()),
            idx: 0,
            current: None,
            lookahead: None,
            line: 0,
            column: 0,
            last_kind: None,
            last_end: 0,
            finished: false,
        };
        t.reset(text);
        t
    }

    /// Start over on new text, keeping the character buffer's allocation.
    pub fn reset(&mut self, text: &str) {
        self.chars.clear();
        self.chars.extend(text.chars());
        self.idx = 0;
        self.line = 0;
        self.column = 0;
        self.last_kind = None;
        self.last_end = 0;
        self.finished = false;
        self.current = self.chars.first().copied();
        self.lookahead = self.chars.get(1).copied();
    }

    /// Pull every token, failing if the stream exceeds [`MAX_TOKENS`].
    pub fn tokenize(text: &str) -> Result<Vec<Token>, TokenizeError> {
        Self::tokenize_with_limit(text, MAX_TOKENS)
    }

    pub fn tokenize_with_limit(text: &str, limit: usize) -> Result<Vec<Token>, TokenizeError> {
        let mut t = Tokenizer::new(text);
        let mut tokens = Vec::with_capacity(text.len() / 4);
        for token in &mut t {
            if tokens.len() >= limit {
                return Err(TokenizeError::TooManyTokens {
                    limit,
                    position: token.range.start,
                });
            }
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Get current position
    pub fn current_position(&self) -> Position {
        Position::new(self.line, self.column, self.idx)
    }

    fn char_at(&self, idx: usize) -> Option<char> {
        self.chars.get(idx).copied()
    }

    fn advance(&mut self) {
        if let Some(c) = self.current {
            if c == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += 1;
            }
            self.idx += 1;
        }
        self.current = self.lookahead;
        self.lookahead = self.char_at(self.idx + 1);
    }

    fn emit(&mut self, kind: TokenKind, start: Position) -> Token {
        let text: String = self.chars[start.offset..self.idx].iter().collect();
        self.last_kind = Some(kind);
        self.last_end = self.idx;
        Token::new(kind, text, Range::new(start, self.current_position()))
    }

    /// Whether the previous token touches the cursor with no gap.
    fn adjacent(&self) -> bool {
        self.last_end == self.idx && self.idx > 0
    }

    // `%` after a name or number is the modulus operator, otherwise it opens
    // a comment.
    fn modulus_allowed(&self) -> bool {
        matches!(self.last_kind, Some(TokenKind::Identifier | TokenKind::Number))
    }

    fn transpose_allowed(&self) -> bool {
        self.adjacent()
            && matches!(
                self.last_kind,
                Some(
                    TokenKind::Identifier
                        | TokenKind::NativeFunction
                        | TokenKind::Number
                        | TokenKind::RParent
                        | TokenKind::RBracket
                        | TokenKind::RSquirly
                        | TokenKind::Transpose
                )
            )
    }

    fn at_continuation(&self) -> bool {
        self.current == Some('.') && self.lookahead == Some('.') && self.char_at(self.idx + 2) == Some('.')
    }

    // `...` joins the next line onto this one; everything after it is ignored.
    fn skip_continuation(&mut self) {
        while let Some(c) = self.current {
            self.advance();
            if c == '\n' {
                break;
            }
        }
    }

    fn skip_whitespace(&mut self) {
        loop {
            match self.current {
                Some(' ' | '\t' | '\r') => self.advance(),
                Some('.') if self.at_continuation() => self.skip_continuation(),
                _ => break,
            }
        }
    }

    fn scan_comment(&mut self, start: Position) -> Token {
        let marker = self.current;
        self.advance();
        let kind = if self.current == marker {
            TokenKind::CodeBreak
        } else {
            TokenKind::Comment
        };
        while let Some(c) = self.current {
            if c == '\n' {
                break;
            }
            self.advance();
        }
        self.emit(kind, start)
    }

    fn scan_identifier(&mut self, start: Position) -> Token {
        while matches!(self.current, Some(c) if is_ident_continue(c)) {
            self.advance();
        }
        let word: String = self.chars[start.offset..self.idx].iter().collect();
        let kind = if is_keyword(&word) {
            TokenKind::Keyword
        } else if is_native_function(&word) {
            TokenKind::NativeFunction
        } else {
            TokenKind::Identifier
        };
        self.emit(kind, start)
    }

    fn eat_digits(&mut self) {
        while matches!(self.current, Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn scan_number(&mut self, start: Position) -> Token {
        self.eat_digits();
        // A dot belongs to the number unless it starts an element-wise
        // operator (`2.*x`), a transpose or a continuation.
        if self.current == Some('.')
            && !matches!(self.lookahead, Some('*' | '/' | '\\' | '^' | '\'' | '.'))
        {
            self.advance();
            self.eat_digits();
        }
        if matches!(self.current, Some('e' | 'E')) {
            let exponent_digits = match self.lookahead {
                Some(c) if c.is_ascii_digit() => true,
                Some('+' | '-') => matches!(self.char_at(self.idx + 2), Some(c) if c.is_ascii_digit()),
                _ => false,
            };
            if exponent_digits {
                self.advance();
                if matches!(self.current, Some('+' | '-')) {
                    self.advance();
                }
                self.eat_digits();
            }
        }
        // Imaginary suffix
        if matches!(self.current, Some('i' | 'j' | 'I' | 'J'))
            && !matches!(self.lookahead, Some(c) if is_ident_continue(c))
        {
            self.advance();
        }
        self.emit(TokenKind::Number, start)
    }

    /// Strings keep their quotes. They end at the matching quote, a newline or
    /// the end of input; a doubled quote is an escaped quote.
    fn scan_string(&mut self, start: Position, quote: char) -> Token {
        self.advance();
        while let Some(c) = self.current {
            if c == '\n' {
                break;
            }
            if c == quote {
                if self.lookahead == Some(quote) {
                    self.advance();
                    self.advance();
                    continue;
                }
                self.advance();
                break;
            }
            if c == '\\' && quote == '"' && !matches!(self.lookahead, None | Some('\n')) {
                self.advance();
            }
            self.advance();
        }
        self.emit(TokenKind::String, start)
    }

    fn scan_token(&mut self, c: char, start: Position) -> Token {
        match c {
            '\n' => {
                self.advance();
                self.emit(TokenKind::Nl, start)
            }
            '#' => self.scan_comment(start),
            '%' if !self.modulus_allowed() => self.scan_comment(start),
            '\'' if self.transpose_allowed() => {
                self.advance();
                self.emit(TokenKind::Transpose, start)
            }
            '.' if self.lookahead == Some('\'') && self.transpose_allowed() => {
                self.advance();
                self.advance();
                self.emit(TokenKind::Transpose, start)
            }
            '.' if matches!(self.lookahead, Some(d) if d.is_ascii_digit()) => self.scan_number(start),
            '\'' | '"' => self.scan_string(start, c),
            _ => {
                if let Some(kind) = symbol_kind(c) {
                    self.advance();
                    self.emit(kind, start)
                } else if is_ident_start(c) {
                    self.scan_identifier(start)
                } else if c.is_ascii_digit() {
                    self.scan_number(start)
                } else {
                    self.advance();
                    self.emit(TokenKind::Illegal, start)
                }
            }
        }
    }
}

impl Iterator for Tokenizer {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        self.skip_whitespace();
        let start = self.current_position();
        match self.current {
            Some(c) => Some(self.scan_token(c, start)),
            None => {
                self.finished = true;
                Some(self.emit(TokenKind::Eof, start))
            }
        }
    }
}
