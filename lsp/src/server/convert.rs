use mlang_core::{diagnostic::Severity, token::Range as CoreRange, Diagnostic as CoreDiagnostic};
use ropey::Rope;
use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, NumberOrString, Range};

use super::text::line_column_to_position;

pub(crate) const SOURCE: &str = "mlang";

pub(crate) fn to_lsp_range(text: &Rope, range: &CoreRange) -> Range {
    Range::new(
        line_column_to_position(text, range.start.line, range.start.column),
        line_column_to_position(text, range.end.line, range.end.column),
    )
}

pub(crate) fn to_lsp_severity(severity: Severity) -> DiagnosticSeverity {
    match severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
        Severity::Information => DiagnosticSeverity::INFORMATION,
    }
}

pub(crate) fn to_lsp_diagnostic(text: &Rope, diagnostic: &CoreDiagnostic) -> Diagnostic {
    Diagnostic::new(
        to_lsp_range(text, &diagnostic.range),
        Some(to_lsp_severity(diagnostic.severity)),
        Some(NumberOrString::Number(i32::from(diagnostic.code.as_u16()))),
        Some(SOURCE.to_string()),
        diagnostic.message.clone(),
        None,
        None,
    )
}

pub(crate) fn to_lsp_diagnostics(text: &str, diagnostics: &[CoreDiagnostic]) -> Vec<Diagnostic> {
    let rope = Rope::from_str(text);
    diagnostics.iter().map(|d| to_lsp_diagnostic(&rope, d)).collect()
}
