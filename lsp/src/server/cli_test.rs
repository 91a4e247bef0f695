#[cfg(test)]
mod tests {
    use crate::server::cli::{analyze_from_args, analyze_text, is_safe_path};

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_analyze_flag_starts_server() {
        assert!(analyze_from_args(&args(&["mlang-lsp"])).unwrap().is_none());
        assert!(analyze_from_args(&args(&["mlang-lsp", "--stdio"])).unwrap().is_none());
    }

    #[test]
    fn test_missing_path_is_usage_error() {
        let err = analyze_from_args(&args(&["mlang-lsp", "--analyze", "--errors-only"])).unwrap_err();
        assert!(err.to_string().starts_with("Usage: mlang-lsp"));
    }

    #[test]
    fn test_errors_only_output() {
        let out = analyze_text("missing.m", "x = (1 + 2;\ny = 3;\n".to_string(), true).unwrap();
        assert!(out.lines().next().is_some_and(|l| l.starts_with("Line 1:")), "{out}");
        assert!(out.contains("[13]"), "{out}");

        let clean = analyze_text("clean.m", "x = 1;\n".to_string(), true).unwrap();
        assert_eq!(clean, "No errors found");
    }

    #[test]
    fn test_json_output() {
        let out = analyze_text("doc.m", "function r = f(a)\n  r = a;\nend\nx = f(1)\n".to_string(), false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let definitions = value["definitions"].as_array().unwrap();
        assert!(definitions.iter().any(|d| d["name"] == "f" && d["kind"] == "FUNCTION"));
        assert!(!value["references"].as_array().unwrap().is_empty());
        // the unsuppressed assignment on the last line
        let diagnostics = value["diagnostics"].as_array().unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0]["code"], 15);
        assert_eq!(diagnostics[0]["severity"], "warning");
    }

    #[test]
    fn test_safe_paths() {
        assert!(is_safe_path("src/main.m"));
        assert!(!is_safe_path("/etc/passwd"));
        assert!(!is_safe_path("../outside.m"));
        assert!(!is_safe_path(""));
        assert!(!is_safe_path("C:evil.m"));
    }
}
