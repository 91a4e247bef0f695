use anyhow::Context;
use std::path::{Component, Path};

use mlang_core::{workspace::analyze, IndexConfig};
use url::Url;

const USAGE: &str = "Usage: mlang-lsp --analyze [--errors-only] <relative-file-path>\n  --analyze <file>     : Full analysis with JSON output\n  --errors-only        : Show only errors in simple format";

pub(crate) fn try_cli_analyze() -> anyhow::Result<Option<String>> {
    let args: Vec<String> = std::env::args().collect();
    analyze_from_args(&args)
}

/// `None` when the arguments do not ask for `--analyze`, so the caller starts
/// the language server instead.
pub(crate) fn analyze_from_args(args: &[String]) -> anyhow::Result<Option<String>> {
    if args.len() <= 1 {
        return Ok(None);
    }
    let Some(i) = args.iter().position(|a| a == "--analyze") else {
        return Ok(None);
    };

    let mut path_index = i + 1;
    while path_index < args.len() && args[path_index].starts_with("--") {
        path_index += 1;
    }
    let path = args.get(path_index).cloned().ok_or_else(|| anyhow::anyhow!(USAGE))?;
    let errors_only = args.iter().any(|a| a == "--errors-only");
    let content = read_file_content(&path)?;
    analyze_text(&path, content, errors_only).map(Some)
}

pub(crate) fn analyze_text(path: &str, content: String, errors_only: bool) -> anyhow::Result<String> {
    let uri = std::fs::canonicalize(path)
        .ok()
        .and_then(|abs| Url::from_file_path(abs).ok())
        .map_or_else(|| Url::parse("untitled:analyze"), Ok)
        .context("could not build a document uri")?;
    let snapshot = analyze(uri, content, 1, 0, &IndexConfig::default(), &|_| false);

    if errors_only {
        let errors: Vec<String> = snapshot
            .errors()
            .map(|d| {
                format!(
                    "Line {}:{}: [{}] {}",
                    d.range.start.line + 1,
                    d.range.start.column + 1,
                    d.code,
                    d.message
                )
            })
            .collect();
        if errors.is_empty() {
            return Ok("No errors found".to_string());
        }
        return Ok(errors.join("\n"));
    }

    let output = serde_json::json!({
        "diagnostics": snapshot.diagnostics,
        "definitions": snapshot.definitions,
        "references": snapshot.references,
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

pub(crate) fn is_safe_path(path: &str) -> bool {
    let path = Path::new(path);

    if path.as_os_str().is_empty() {
        return false;
    }
    if path.is_absolute() {
        return false;
    }
    if path.components().any(|c| c == Component::ParentDir) {
        return false;
    }

    let s = path.to_string_lossy();
    let suspicious = ['\0', '\n', '\r', '\t'];
    if s.chars().any(|c| suspicious.contains(&c)) {
        return false;
    }
    if s.len() >= 2 {
        let bytes = s.as_bytes();
        if bytes[1] == b':' {
            return false;
        }
    }
    true
}

pub(crate) fn read_file_content(path: &str) -> anyhow::Result<String> {
    if !is_safe_path(path) {
        return Err(anyhow::anyhow!("Unsafe file path: {}", path));
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file '{}'", path))
}
