//! Static tables: punctuation, keywords, block terminators and the native
//! function names the tokenizer classifies separately from identifiers.

use super::TokenKind;
use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;

pub const KEYWORDS: &[&str] = &[
    "for",
    "while",
    "if",
    "else",
    "elseif",
    "switch",
    "case",
    "otherwise",
    "break",
    "continue",
    "return",
    "end",
    "function",
    "endfunction",
    "endif",
    "endfor",
    "endwhile",
    "endswitch",
    "do",
    "until",
];

pub const NATIVE_FUNCTIONS: &[&str] = &[
    "quad",
    "inputParser",
    "pol2cart",
    "deg2rad",
    "length",
    "struct",
    "addpath",
    "argv",
    "hold",
    "axis",
    "printf",
    "figure",
    "set",
    "grid",
    "clc",
    "quit",
    "help",
    "stem",
    "plot",
    "abs",
    "acos",
    "acosh",
    "angle",
    "arg",
    "asin",
    "asinh",
    "atan",
    "atanh",
    "ceil",
    "conj",
    "cos",
    "cosh",
    "cot",
    "csc",
    "det",
    "diag",
    "diff",
    "disp",
    "eig",
    "eps",
    "erf",
    "erfc",
];

static KEYWORD_SET: Lazy<FxHashSet<&'static str>> = Lazy::new(|| KEYWORDS.iter().copied().collect());
static NATIVE_SET: Lazy<FxHashSet<&'static str>> = Lazy::new(|| NATIVE_FUNCTIONS.iter().copied().collect());

pub fn is_keyword(word: &str) -> bool {
    KEYWORD_SET.contains(word)
}

pub fn is_native_function(word: &str) -> bool {
    NATIVE_SET.contains(word)
}

/// Keywords that close the innermost open block.
pub fn is_block_terminator(word: &str) -> bool {
    matches!(
        word,
        "end" | "endfunction" | "endif" | "endfor" | "endwhile" | "endswitch"
    )
}

/// Keywords that end the current statement list without closing the block
/// (`else`, `case`, `until`, ...). Block terminators are included.
pub fn is_block_boundary(word: &str) -> bool {
    is_block_terminator(word) || matches!(word, "else" | "elseif" | "case" | "otherwise" | "until")
}

/// Single-character punctuation table.
pub fn symbol_kind(c: char) -> Option<TokenKind> {
    let kind = match c {
        '=' => TokenKind::Equals,
        '-' => TokenKind::Subtraction,
        '+' => TokenKind::Addition,
        '*' => TokenKind::Multiplication,
        '/' => TokenKind::Division,
        '\\' => TokenKind::LeftDivision,
        '%' => TokenKind::Modulus,
        '^' => TokenKind::Exponentiation,
        '.' => TokenKind::Period,
        ';' => TokenKind::Semicolon,
        ',' => TokenKind::Comma,
        ':' => TokenKind::Colon,
        '@' => TokenKind::At,
        '[' => TokenKind::LBracket,
        ']' => TokenKind::RBracket,
        '{' => TokenKind::LSquirly,
        '}' => TokenKind::RSquirly,
        '(' => TokenKind::LParent,
        ')' => TokenKind::RParent,
        '>' => TokenKind::GreaterThan,
        '<' => TokenKind::LessThan,
        '&' => TokenKind::Ampersand,
        '|' => TokenKind::Pipe,
        '!' => TokenKind::Not,
        '~' => TokenKind::Tilde,
        _ => return None,
    };
    Some(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_classify_words() {
        assert!(is_keyword("endfunction"));
        assert!(is_keyword("otherwise"));
        assert!(!is_keyword("disp"));
        assert!(is_native_function("disp"));
        assert!(!is_native_function("myFunc"));
        assert!(is_block_terminator("endwhile"));
        assert!(!is_block_terminator("else"));
        assert!(is_block_boundary("else"));
    }

    #[test]
    fn symbol_table_covers_operators() {
        assert_eq!(symbol_kind('%'), Some(TokenKind::Modulus));
        assert_eq!(symbol_kind('~'), Some(TokenKind::Tilde));
        assert_eq!(symbol_kind('a'), None);
        assert_eq!(symbol_kind('"'), None);
    }
}
