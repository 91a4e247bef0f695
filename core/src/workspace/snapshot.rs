use std::time::Instant;

use serde::Serialize;
use tracing::debug;
use url::Url;

use super::{config::IndexConfig, semantic::SemanticCheck};
use crate::{
    ast::Program,
    diagnostic::{Diagnostic, ErrorCode},
    parser::Parser,
    token::{Range, Token, TokenizeError, Tokenizer},
    visitor::{CallSite, Definition, Reference, Visitor},
};

/// Everything known about one document at one version. Snapshots are never
/// mutated after construction; a re-analysis builds a new one.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSnapshot {
    pub uri: Url,
    /// Edit stamp the text was taken at
    pub version: u64,
    /// Order in which the document first entered the index
    pub registration: u64,
    #[serde(skip)]
    pub text: String,
    #[serde(skip)]
    pub tokens: Vec<Token>,
    #[serde(skip)]
    pub program: Program,
    pub references: Vec<Reference>,
    pub definitions: Vec<Definition>,
    #[serde(skip)]
    pub calls: Vec<CallSite>,
    pub diagnostics: Vec<Diagnostic>,
}

impl DocumentSnapshot {
    /// Innermost reference covering the position, if any.
    pub fn reference_at(&self, line: u32, column: u32) -> Option<&Reference> {
        self.references
            .iter()
            .filter(|r| r.range.contains(line, column))
            .min_by_key(|r| r.range.end.offset - r.range.start.offset)
    }

    pub fn definitions_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Definition> + 'a {
        self.definitions.iter().filter(move |d| d.name == name)
    }

    pub fn defines_at_file_level(&self, name: &str) -> bool {
        self.definitions.iter().any(|d| d.file_level && d.name == name)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }
}

/// Tokenize, parse, visit and check `text`. Never fails: a tokenizer that
/// gives up produces an empty program and a single diagnostic.
pub fn analyze(
    uri: Url,
    text: String,
    version: u64,
    registration: u64,
    config: &IndexConfig,
    defined_elsewhere: &dyn Fn(&str) -> bool,
) -> DocumentSnapshot {
    let started = Instant::now();

    let (tokens, program, mut diagnostics) = match Tokenizer::tokenize(&text) {
        Ok(tokens) => {
            let mut parser = Parser::new(&tokens);
            let program = parser.parse();
            let diagnostics = parser.into_diagnostics();
            (tokens, program, diagnostics)
        }
        Err(err @ TokenizeError::TooManyTokens { position, .. }) => {
            let diagnostic = Diagnostic::error(ErrorCode::TokenLimitExceeded, err.to_string(), Range::single(position));
            (Vec::new(), Program::default(), vec![diagnostic])
        }
    };

    let mut visitor = Visitor::new();
    visitor.visit(&program);
    let (references, definitions, calls) = visitor.into_parts();

    let semantic = SemanticCheck {
        program: &program,
        references: &references,
        definitions: &definitions,
        calls: &calls,
    }
    .run(config.report_unresolved_references, defined_elsewhere);
    diagnostics.extend(semantic);
    diagnostics.sort_by_key(|d| d.range.start);
    diagnostics.truncate(config.max_number_of_problems);

    debug!(
        %uri,
        version,
        tokens = tokens.len(),
        diagnostics = diagnostics.len(),
        elapsed_us = started.elapsed().as_micros() as u64,
        "analyzed document"
    );

    DocumentSnapshot {
        uri,
        version,
        registration,
        text,
        tokens,
        program,
        references,
        definitions,
        calls,
        diagnostics,
    }
}
