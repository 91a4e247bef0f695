mod error;
pub mod grammar;
mod lexer;
mod token_test;

pub use error::*;
pub use lexer::*;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    Equals,         // =
    Subtraction,    // -
    Addition,       // +
    Multiplication, // *
    Division,       // /
    LeftDivision,   // \
    Modulus,        // %
    Exponentiation, // ^
    Period,         // .
    Semicolon,      // ;
    Comma,          // ,
    Colon,          // :
    At,             // @
    LBracket,       // [
    RBracket,       // ]
    LSquirly,       // {
    RSquirly,       // }
    LParent,        // (
    RParent,        // )
    GreaterThan,    // >
    LessThan,       // <
    Ampersand,      // &
    Pipe,           // |
    Not,            // !
    Tilde,          // ~
    Transpose,      // ' or .'
    Nl,
    Number,
    String,
    Identifier,
    Keyword,
    NativeFunction,
    Comment,
    CodeBreak, // %% or ## cell marker
    Illegal,
    Eof,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub range: Range,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, range: Range) -> Self {
        Self {
            kind,
            text: text.into(),
            range,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == word
    }

    /// Identifiers and native function names both name something.
    pub fn is_name(&self) -> bool {
        matches!(self.kind, TokenKind::Identifier | TokenKind::NativeFunction)
    }

    pub fn is_trivia(&self) -> bool {
        matches!(self.kind, TokenKind::Comment | TokenKind::CodeBreak)
    }

    /// A string literal cut off by a newline or the end of input.
    pub fn is_unterminated_string(&self) -> bool {
        if self.kind != TokenKind::String {
            return false;
        }
        let mut chars = self.text.chars();
        let Some(quote) = chars.next() else {
            return false;
        };
        while let Some(c) = chars.next() {
            if c == quote {
                // A doubled quote is escaped
                if chars.clone().next() == Some(quote) {
                    chars.next();
                    continue;
                }
                return false;
            }
            if c == '\\' && quote == '"' {
                chars.next();
            }
        }
        true
    }
}
