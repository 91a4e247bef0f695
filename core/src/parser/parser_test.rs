#[cfg(test)]
mod tests {
    use crate::{
        ast::{BinaryOperator, Expression, ExpressionKind, Program, StatementKind, UnaryOperator},
        diagnostic::{Diagnostic, ErrorCode},
        parser::Parser,
        token::Tokenizer,
    };

    fn parse(src: &str) -> (Program, Vec<Diagnostic>) {
        let tokens = Tokenizer::tokenize(src).expect("tokenize");
        let mut parser = Parser::new(&tokens);
        let program = parser.parse();
        (program, parser.into_diagnostics())
    }

    fn parse_ok(src: &str) -> Program {
        let (program, diagnostics) = parse(src);
        let errors: Vec<_> = diagnostics.iter().filter(|d| d.is_error()).collect();
        assert!(errors.is_empty(), "unexpected errors for {:?}: {:?}", src, errors);
        program
    }

    fn assigned_value(program: &Program, index: usize) -> &Expression {
        match &program.body[index].kind {
            StatementKind::Assignment { value, .. } => value,
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_function_call_statement() {
        let program = parse_ok(r#"myFunction("string value");"#);
        assert_eq!(program.body.len(), 1);
        let stmt = &program.body[0];
        assert!(stmt.suppress_output);
        let StatementKind::FunctionCall(expr) = &stmt.kind else {
            panic!("expected call, got {:?}", stmt.kind);
        };
        let ExpressionKind::Identifier { name, call: Some(args) } = &expr.kind else {
            panic!("expected called identifier");
        };
        assert_eq!(name, "myFunction");
        assert_eq!(args.len(), 1);
        assert_eq!(
            args.arguments[0].kind,
            ExpressionKind::String(r#""string value""#.to_string())
        );
    }

    #[test]
    fn test_multi_assignment() {
        let program = parse_ok(r#"[a,b,c] = func([a,b,c], "text", x);"#);
        let StatementKind::MultiAssignment { targets, value } = &program.body[0].kind else {
            panic!("expected multi assignment");
        };
        let names: Vec<_> = targets.iter().filter_map(|t| t.identifier_name()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        let ExpressionKind::Identifier { name, call: Some(args) } = &value.kind else {
            panic!("expected call on the right");
        };
        assert_eq!(name, "func");
        assert_eq!(args.len(), 3);
        let ExpressionKind::Vector { rows } = &args.arguments[0].kind else {
            panic!("expected vector argument");
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 3);
    }

    #[test]
    fn test_multi_assignment_with_placeholder_and_index() {
        let program = parse_ok("[~, idx(2)] = max(v);");
        let StatementKind::MultiAssignment { targets, .. } = &program.body[0].kind else {
            panic!("expected multi assignment");
        };
        assert!(targets[0].is_placeholder());
        assert_eq!(targets[1].root_name().map(|(n, _)| n), Some("idx"));
    }

    #[test]
    fn test_default_value_argument_in_call() {
        let (program, diagnostics) = parse("myFunction(a = 'value');");
        let codes: Vec<_> = diagnostics.iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![ErrorCode::UnexpectedDefaultValueArgument]);
        assert_eq!(diagnostics[0].range.start.column, 11);
        let StatementKind::FunctionCall(expr) = &program.body[0].kind else {
            panic!("expected call");
        };
        let ExpressionKind::Identifier { call: Some(args), .. } = &expr.kind else {
            panic!("expected arguments");
        };
        let ExpressionKind::DefaultValueArgument { name, content, .. } = &args.arguments[0].kind else {
            panic!("expected default value argument, got {:?}", args.arguments[0].kind);
        };
        assert_eq!(name, "a");
        assert_eq!(content, "'value'");
    }

    #[test]
    fn test_arithmetic_precedence() {
        let program = parse_ok("x = 1 + 2 * 3;\ny = -2^2;");
        let ExpressionKind::BinaryOperation { operator, right, .. } = &assigned_value(&program, 0).kind else {
            panic!("expected binary operation");
        };
        assert_eq!(*operator, BinaryOperator::Add);
        assert!(matches!(
            right.kind,
            ExpressionKind::BinaryOperation {
                operator: BinaryOperator::Multiply,
                ..
            }
        ));

        let ExpressionKind::UnaryOperation { operator, operand } = &assigned_value(&program, 1).kind else {
            panic!("expected unary operation");
        };
        assert_eq!(*operator, UnaryOperator::Negate);
        assert!(matches!(
            operand.kind,
            ExpressionKind::BinaryOperation {
                operator: BinaryOperator::Power,
                ..
            }
        ));
    }

    #[test]
    fn test_composed_operators() {
        let program = parse_ok("t = a ~= b && c <= d;\nu = x .* y;");
        let ExpressionKind::BinaryOperation { operator, left, right } = &assigned_value(&program, 0).kind else {
            panic!("expected binary operation");
        };
        assert_eq!(*operator, BinaryOperator::ShortAnd);
        assert!(matches!(
            left.kind,
            ExpressionKind::BinaryOperation {
                operator: BinaryOperator::NotEqual,
                ..
            }
        ));
        assert!(matches!(
            right.kind,
            ExpressionKind::BinaryOperation {
                operator: BinaryOperator::LessEqual,
                ..
            }
        ));
        assert!(matches!(
            assigned_value(&program, 1).kind,
            ExpressionKind::BinaryOperation {
                operator: BinaryOperator::ElementMultiply,
                ..
            }
        ));
    }

    #[test]
    fn test_matrix_rows_and_whitespace() {
        let program = parse_ok("m = [1 -2; a - b, c'];");
        let ExpressionKind::Vector { rows } = &assigned_value(&program, 0).kind else {
            panic!("expected vector");
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 2);
        assert!(matches!(rows[0][1].kind, ExpressionKind::UnaryOperation { .. }));
        assert_eq!(rows[1].len(), 2);
        assert!(matches!(rows[1][0].kind, ExpressionKind::BinaryOperation { .. }));
        assert!(matches!(rows[1][1].kind, ExpressionKind::Transpose(_)));
    }

    #[test]
    fn test_multiline_matrix_and_struct() {
        let program = parse_ok("m = [1 2\n3 4];\nc = {'a', 1; 'b', 2};");
        let ExpressionKind::Vector { rows } = &assigned_value(&program, 0).kind else {
            panic!("expected vector");
        };
        assert_eq!(rows.len(), 2);
        let ExpressionKind::Struct { rows } = &assigned_value(&program, 1).kind else {
            panic!("expected struct literal");
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].len(), 2);
    }

    #[test]
    fn test_command_syntax() {
        let program = parse_ok("hold on;\npkg load signal\nformat long");
        let commands: Vec<(String, Vec<String>)> = program
            .body
            .iter()
            .filter_map(|s| match &s.kind {
                StatementKind::CommandCall { name, words, .. } => {
                    Some((name.clone(), words.iter().map(|w| w.text.clone()).collect()))
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            commands,
            vec![
                ("hold".to_string(), vec!["on".to_string()]),
                ("pkg".to_string(), vec!["load".to_string(), "signal".to_string()]),
                ("format".to_string(), vec!["long".to_string()]),
            ]
        );
        assert!(program.body[0].suppress_output);
    }

    #[test]
    fn test_function_definition_with_leading_doc() {
        let src = "% Adds two numbers\n% together\nfunction r = add(a, b = 2)\n  r = a + b;\nend\n";
        let program = parse_ok(src);
        let def = program.functions().next().expect("function");
        assert_eq!(def.name, "add");
        assert!(def.terminated);
        assert_eq!(def.outputs.len(), 1);
        assert_eq!(def.outputs[0].identifier_name(), Some("r"));
        assert_eq!(def.parameters.len(), 2);
        let ExpressionKind::DefaultValueArgument { name, content, .. } = &def.parameters[1].kind else {
            panic!("expected default parameter");
        };
        assert_eq!(name, "b");
        assert_eq!(content, "2");
        assert_eq!(def.documentation.as_deref(), Some("Adds two numbers\ntogether"));
        assert_eq!(def.body.len(), 1);
        assert_eq!(def.max_arguments(), Some(2));
    }

    #[test]
    fn test_function_definition_trailing_doc_and_outputs() {
        let src = "x = 1; % not documentation\nfunction [s, p] = stats(v)\n  % Sum and product\n  s = sum(v);\n  p = prod(v);\nendfunction";
        let program = parse_ok(src);
        let def = program.functions().next().expect("function");
        assert_eq!(def.name, "stats");
        let outputs: Vec<_> = def.outputs.iter().filter_map(|o| o.identifier_name()).collect();
        assert_eq!(outputs, vec!["s", "p"]);
        assert_eq!(def.documentation.as_deref(), Some("Sum and product"));
        assert_eq!(def.body.len(), 2);
    }

    #[test]
    fn test_function_without_parameters_and_varargin() {
        let program = parse_ok("function hello\n  disp('hi');\nend\nfunction v(varargin)\nend");
        let defs: Vec<_> = program.functions().collect();
        assert_eq!(defs.len(), 2);
        assert!(defs[0].parameters.is_empty());
        assert_eq!(defs[1].max_arguments(), None);
    }

    #[test]
    fn test_anonymous_function_and_handle() {
        let program = parse_ok("g = @(x, y) x + y;\nh = @sin;");
        let ExpressionKind::AnonymousFunction { parameters, body } = &assigned_value(&program, 0).kind else {
            panic!("expected anonymous function");
        };
        assert_eq!(parameters.len(), 2);
        assert!(matches!(body.kind, ExpressionKind::BinaryOperation { .. }));
        assert_eq!(
            assigned_value(&program, 1).kind,
            ExpressionKind::FunctionHandle { name: "sin".to_string() }
        );
    }

    #[test]
    fn test_indexing_with_end_and_colon() {
        let program = parse_ok("v = a(end, :);\nw = b(2:end-1);");
        let ExpressionKind::Identifier { call: Some(args), .. } = &assigned_value(&program, 0).kind else {
            panic!("expected indexed identifier");
        };
        assert_eq!(args.arguments[0].kind, ExpressionKind::End);
        assert_eq!(args.arguments[1].kind, ExpressionKind::Colon);
        let ExpressionKind::Identifier { call: Some(args), .. } = &assigned_value(&program, 1).kind else {
            panic!("expected indexed identifier");
        };
        assert!(matches!(
            args.arguments[0].kind,
            ExpressionKind::BinaryOperation {
                operator: BinaryOperator::Range,
                ..
            }
        ));
    }

    #[test]
    fn test_field_assignment_target() {
        let program = parse_ok("s.name = 'x';\nc{2} = 3;");
        let StatementKind::Assignment { target, .. } = &program.body[0].kind else {
            panic!("expected assignment");
        };
        assert!(matches!(target.kind, ExpressionKind::FieldAccess { .. }));
        assert_eq!(target.root_name().map(|(n, _)| n), Some("s"));
        let StatementKind::Assignment { target, .. } = &program.body[1].kind else {
            panic!("expected assignment");
        };
        let ExpressionKind::Identifier { call: Some(args), .. } = &target.kind else {
            panic!("expected brace index");
        };
        assert!(args.brace);
    }

    #[test]
    fn test_control_flow_statements() {
        let src = "\
if a > 1
  b = 1;
elseif a < 0
  b = 2;
else
  b = 3;
end
for i = 1:10
  s = s + i;
endfor
while k < 3, k = k + 1; end
do
  k--;
until k == 0
switch mode
  case 'a'
    r = 1;
  case {'b', 'c'}
    r = 2;
  otherwise
    r = 3;
endswitch
";
        let (program, diagnostics) = parse(src);
        let kinds: Vec<&str> = program
            .body
            .iter()
            .map(|s| match &s.kind {
                StatementKind::If { .. } => "if",
                StatementKind::For { .. } => "for",
                StatementKind::While { .. } => "while",
                StatementKind::DoUntil { .. } => "do",
                StatementKind::Switch { .. } => "switch",
                _ => "other",
            })
            .collect();
        assert_eq!(kinds, vec!["if", "for", "while", "do", "switch"]);

        let StatementKind::If { branches, else_body } = &program.body[0].kind else {
            unreachable!()
        };
        assert_eq!(branches.len(), 2);
        assert!(else_body.is_some());

        let StatementKind::Switch { cases, otherwise, .. } = &program.body[4].kind else {
            unreachable!()
        };
        assert_eq!(cases.len(), 2);
        assert!(otherwise.is_some());

        // `k--` is not valid syntax; it must only affect its own statement
        assert!(
            diagnostics
                .iter()
                .filter(|d| d.is_error())
                .all(|d| d.range.start.line == 12)
        );
    }

    #[test]
    fn test_parenthesized_for_header() {
        let program = parse_ok("for (i = 1:3) disp(i); end");
        let StatementKind::For { variable, iterable, body } = &program.body[0].kind else {
            panic!("expected for");
        };
        assert_eq!(variable.as_ref().and_then(|v| v.identifier_name()), Some("i"));
        assert!(iterable.is_some());
        assert_eq!(body.len(), 1);
    }

    #[test]
    fn test_jump_statements() {
        let program = parse_ok("while true\n  break;\n  continue\n  return\nend");
        let StatementKind::While { body, .. } = &program.body[0].kind else {
            panic!("expected while");
        };
        assert!(matches!(body[0].kind, StatementKind::Break));
        assert!(matches!(body[1].kind, StatementKind::Continue));
        assert!(matches!(body[2].kind, StatementKind::Return));
    }

    #[test]
    fn test_output_warning() {
        let (_, diagnostics) = parse("x = 1\ny = 2;\ndisp(x)\nx + 1");
        let warnings: Vec<_> = diagnostics
            .iter()
            .filter(|d| d.code == ErrorCode::OutputNotSuppressed)
            .map(|d| d.range.start.line)
            .collect();
        assert_eq!(warnings, vec![0, 3]);
    }

    #[test]
    fn test_transpose_and_comments_are_skipped() {
        let program = parse_ok("% header\ny = x'; # trailing\n%% cell\nz = [1 2]';");
        assert_eq!(program.body.len(), 2);
        assert!(matches!(assigned_value(&program, 0).kind, ExpressionKind::Transpose(_)));
        assert!(matches!(assigned_value(&program, 1).kind, ExpressionKind::Transpose(_)));
    }

    #[test]
    fn test_continuation_joins_lines() {
        let program = parse_ok("total = a + ...\n  b;");
        assert_eq!(program.body.len(), 1);
        assert!(program.body[0].suppress_output);
    }

    #[test]
    fn test_nested_function_in_body() {
        let program = parse_ok("function outer()\n  function inner()\n  end\nend");
        let def = program.functions().next().expect("outer");
        assert_eq!(def.name, "outer");
        assert!(matches!(def.body[0].kind, StatementKind::FunctionDefinition(_)));
    }
}
