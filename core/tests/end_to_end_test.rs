use mlang_core::{
    ErrorCode, IndexConfig, WorkspaceIndex,
    ast::{ExpressionKind, StatementKind},
    parser::Parser,
    token::{TokenKind, Tokenizer},
    visitor::{DefinitionKind, ReferenceKind, Visitor},
};
use url::Url;

fn analyze(src: &str) -> (Vec<String>, Vec<ErrorCode>) {
    let (index, _rx) = WorkspaceIndex::new(IndexConfig::default());
    let uri = Url::parse("file:///e2e/test.m").unwrap();
    let snapshot = index.register_document(uri, src.to_string());
    let names = snapshot.references.iter().map(|r| r.name.clone()).collect();
    let codes = snapshot.diagnostics.iter().map(|d| d.code).collect();
    (names, codes)
}

#[test]
fn nested_vectors_reference_order() {
    let (names, codes) = analyze("a = func1([a, [b, c]], [a; c]);\n");
    assert_eq!(names, vec!["a", "func1", "a", "b", "c", "a", "c"]);
    assert!(codes.is_empty(), "{:?}", codes);
}

#[test]
fn multi_output_with_vector_argument() {
    let (names, _) = analyze("[a,b,c] = func([a,b,c], \"text\", x);\n");
    assert_eq!(&names[..8], &["a", "b", "c", "func", "a", "b", "c", "x"]);
}

#[test]
fn default_value_argument_content() {
    let tokens = Tokenizer::tokenize("myFunction(a = 'value');").unwrap();
    let mut parser = Parser::new(&tokens);
    let program = parser.parse();
    let StatementKind::FunctionCall(call) = &program.body[0].kind else {
        panic!("expected call: {:?}", program.body[0].kind);
    };
    let ExpressionKind::Identifier { call: Some(args), .. } = &call.kind else {
        panic!("expected identifier call");
    };
    let ExpressionKind::DefaultValueArgument { name, content, .. } = &args.arguments[0].kind else {
        panic!("expected default value argument");
    };
    assert_eq!(name, "a");
    assert_eq!(content, "'value'");
}

#[test]
fn default_value_argument_in_call_is_reported() {
    let (names, codes) = analyze("myFunction(a = 'value');\n");
    assert_eq!(names, vec!["myFunction"]);
    assert_eq!(codes, vec![ErrorCode::UnexpectedDefaultValueArgument]);

    let (_, codes) = analyze("function r = f(a = 1)\n  r = a;\nend\n");
    assert!(!codes.contains(&ErrorCode::UnexpectedDefaultValueArgument), "{:?}", codes);
}

#[test]
fn broken_if_still_yields_program() {
    let tokens = Tokenizer::tokenize("if\n  x = 1;\n").unwrap();
    let mut parser = Parser::new(&tokens);
    let program = parser.parse();
    assert!(matches!(program.body[0].kind, StatementKind::If { .. }));
    assert!(!parser.into_diagnostics().is_empty());
}

#[test]
fn tokenizer_is_idempotent_and_ends_once() {
    let src = "x = [1 2 3]'; % note\n%% cell\ny = x .^ 2;\n";
    let first = Tokenizer::tokenize(src).unwrap();
    let second = Tokenizer::tokenize(src).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.iter().filter(|t| t.kind == TokenKind::Eof).count(), 1);
    assert_eq!(first.last().map(|t| t.kind), Some(TokenKind::Eof));
}

#[test]
fn documented_function_across_files() {
    let (index, _rx) = WorkspaceIndex::new(IndexConfig::default());
    let lib = Url::parse("file:///e2e/area.m").unwrap();
    let main = Url::parse("file:///e2e/main.m").unwrap();
    index.register_document(
        lib,
        "% AREA  Area of a rectangle.\n% Multiplies width by height.\nfunction a = area(w, h)\n  a = w * h;\nend\n"
            .to_string(),
    );
    index.register_document(main.clone(), "r = area(2, 3);\n".to_string());

    let refs = index.find_references(&main, "area");
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].kind, ReferenceKind::Function);

    let defs: Vec<_> = index.find_definitions(&main, "area").into_iter().map(|(_, d)| d).collect();
    assert_eq!(defs.len(), 1);
    assert_eq!(defs[0].kind, DefinitionKind::Function);
    assert_eq!(
        defs[0].documentation.as_deref(),
        Some("AREA  Area of a rectangle.\nMultiplies width by height.")
    );
    let params: Vec<_> = defs[0].arguments.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(params, vec!["w", "h"]);
}

#[test]
fn malformed_inputs_never_panic() {
    let inputs = [
        "",
        "(((",
        "function",
        "function [a, = f(",
        "x = [1, 2; 3",
        "if if if",
        "switch\ncase\notherwise\n",
        "do\n",
        "@(",
        "a.(b) = c{",
        "'unterminated",
        "\"also \\\" unterminated",
        "x = 1 ... continued\n+ 2",
        "end end end",
        "\u{1F600} = 3",
        "for (i = 1:3\nend",
    ];
    for src in inputs {
        let tokens = Tokenizer::tokenize(src).unwrap();
        let mut parser = Parser::new(&tokens);
        let program = parser.parse();
        let mut visitor = Visitor::new();
        visitor.visit(&program);
        for reference in &visitor.references {
            assert!(reference.range.end.offset <= src.chars().count(), "{:?}", src);
        }
    }
}
