use crate::{
    diagnostic::Diagnostic,
    token::{Range, Token, TokenKind},
};
use once_cell::sync::Lazy;

/// Hard parse failure for the current statement. The statement loop records
/// it and resynchronizes; it never escapes [`Parser::parse`].
pub(crate) type ParseResult<T> = Result<T, Diagnostic>;

/// Deepest expression nesting before the parser gives up on a statement.
pub(crate) const MAX_NESTING: usize = 64;

static FALLBACK_EOF: Lazy<Token> = Lazy::new(|| Token::new(TokenKind::Eof, "", Range::default()));

/// Recursive-descent parser over a token stream.
///
/// Comments are skipped through an index of significant tokens but remain
/// reachable in `tokens` so function documentation can be read from them.
pub struct Parser<'a> {
    pub(crate) tokens: &'a [Token],
    pub(crate) significant: Vec<usize>,
    pub(crate) pos: usize,
    pub(crate) len: usize,
    pub(crate) end_token: &'a Token,
    pub(crate) errors: Vec<Diagnostic>,
    pub(crate) warnings: Vec<Diagnostic>,
    /// Terminator sets of the blocks currently open, innermost last
    pub(crate) open_blocks: Vec<&'static [&'static str]>,
    /// Inside `[...]`/`{...}` where whitespace separates elements
    pub(crate) in_matrix: bool,
    /// Inside an index or call argument list, where `end` and `:` are values
    pub(crate) index_depth: usize,
    pub(crate) nesting: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        let significant: Vec<usize> = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.is_trivia() && t.kind != TokenKind::Eof)
            .map(|(i, _)| i)
            .collect();
        let end_token = tokens
            .iter()
            .rev()
            .find(|t| t.kind == TokenKind::Eof)
            .unwrap_or(&*FALLBACK_EOF);
        Self {
            tokens,
            len: significant.len(),
            significant,
            pos: 0,
            end_token,
            errors: Vec::new(),
            warnings: Vec::new(),
            open_blocks: Vec::new(),
            in_matrix: false,
            index_depth: 0,
            nesting: 0,
        }
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Errors and warnings together, ordered by position.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        let mut all = self.errors;
        all.extend(self.warnings);
        all.sort_by_key(|d| d.range.start);
        all
    }
}

mod control;
mod expr;
mod function;
mod helpers;
mod program;

#[cfg(test)]
mod parser_test;
