#[cfg(test)]
mod tests {
    use crate::token::{Position, Token, TokenKind, TokenizeError, Tokenizer};

    fn kinds(src: &str) -> Vec<TokenKind> {
        Tokenizer::tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    fn texts(src: &str) -> Vec<String> {
        Tokenizer::tokenize(src).unwrap().into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn basic() {
        use TokenKind::*;
        assert_eq!(
            kinds("a = b + 1.5;\n"),
            vec![Identifier, Equals, Identifier, Addition, Number, Semicolon, Nl, Eof]
        );
    }

    #[test]
    fn single_char_symbols() {
        use TokenKind::*;
        assert_eq!(
            kinds("= - + * / ^ . ; [ ] { } ( ) @ : ,"),
            vec![
                Equals,
                Subtraction,
                Addition,
                Multiplication,
                Division,
                Exponentiation,
                Period,
                Semicolon,
                LBracket,
                RBracket,
                LSquirly,
                RSquirly,
                LParent,
                RParent,
                At,
                Colon,
                Comma,
                Eof
            ]
        );
    }

    #[test]
    fn keywords_and_native_functions() {
        use TokenKind::*;
        assert_eq!(
            kinds("function disp myVar endfunction"),
            vec![Keyword, NativeFunction, Identifier, Keyword, Eof]
        );
    }

    #[test]
    fn number_forms() {
        assert_eq!(texts("100 1.5 1e-3 2.5E+4 .5 3i"), vec!["100", "1.5", "1e-3", "2.5E+4", ".5", "3i", ""]);
    }

    #[test]
    fn elementwise_operator_after_number() {
        use TokenKind::*;
        assert_eq!(kinds("2.*x"), vec![Number, Period, Multiplication, Identifier, Eof]);
    }

    #[test]
    fn strings_keep_quotes() {
        let tokens = Tokenizer::tokenize(r#"x = "string value"; y = 'it''s';"#).unwrap();
        let strings: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::String)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(strings, vec![r#""string value""#, "'it''s'"]);
    }

    #[test]
    fn unterminated_string_stops_at_newline() {
        use TokenKind::*;
        let tokens = Tokenizer::tokenize("'abc\nb").unwrap();
        assert_eq!(tokens[0].kind, String);
        assert_eq!(tokens[0].text, "'abc");
        assert_eq!(tokens[1].kind, Nl);
        assert_eq!(tokens[2].kind, Identifier);
        assert!(tokens[0].is_unterminated_string());
    }

    #[test]
    fn string_termination() {
        let terminated = |src: &str| !Tokenizer::tokenize(src).unwrap()[0].is_unterminated_string();
        assert!(terminated("'abc'"));
        assert!(terminated("'it''s'"));
        assert!(terminated(r#""say \"hi\"""#));
        assert!(!terminated("'abc"));
        assert!(!terminated("'it''"));
        assert!(!terminated(r#""open \""#));
    }

    #[test]
    fn percent_is_comment_unless_after_operand() {
        use TokenKind::*;
        assert_eq!(kinds("a%b"), vec![Identifier, Modulus, Identifier, Eof]);
        assert_eq!(kinds("1 % 2"), vec![Number, Modulus, Number, Eof]);
        assert_eq!(kinds("y = x % 2"), vec![Identifier, Equals, Identifier, Modulus, Number, Eof]);
        assert_eq!(kinds("y = (x) % 2"), vec![Identifier, Equals, LParent, Identifier, RParent, Comment, Eof]);
        assert_eq!(kinds("% note"), vec![Comment, Eof]);
        assert_eq!(kinds("x = 1; % note"), vec![Identifier, Equals, Number, Semicolon, Comment, Eof]);
        assert_eq!(kinds("# note\n"), vec![Comment, Nl, Eof]);
    }

    #[test]
    fn comment_text_runs_to_end_of_line() {
        let tokens = Tokenizer::tokenize("% first line\nx").unwrap();
        assert_eq!(tokens[0].text, "% first line");
        assert_eq!(tokens[1].kind, TokenKind::Nl);
    }

    #[test]
    fn code_break_markers() {
        use TokenKind::*;
        assert_eq!(kinds("%% Section\n## Other"), vec![CodeBreak, Nl, CodeBreak, Eof]);
    }

    #[test]
    fn transpose_versus_string() {
        use TokenKind::*;
        assert_eq!(kinds("a'"), vec![Identifier, Transpose, Eof]);
        assert_eq!(kinds("x(1)'"), vec![Identifier, LParent, Number, RParent, Transpose, Eof]);
        assert_eq!(kinds("a.'"), vec![Identifier, Transpose, Eof]);
        assert_eq!(kinds("disp 'a'"), vec![NativeFunction, String, Eof]);
    }

    #[test]
    fn line_continuation_is_skipped() {
        use TokenKind::*;
        assert_eq!(kinds("a = 1 + ...\n 2"), vec![Identifier, Equals, Number, Addition, Number, Eof]);
    }

    #[test]
    fn illegal_characters_do_not_stop_the_stream() {
        use TokenKind::*;
        assert_eq!(kinds("a $ b ?"), vec![Identifier, Illegal, Identifier, Illegal, Eof]);
    }

    #[test]
    fn ranges_track_lines_and_columns() {
        let tokens = Tokenizer::tokenize("ab = 1\n  cd").unwrap();
        assert_eq!(tokens[0].range.start, Position::new(0, 0, 0));
        assert_eq!(tokens[0].range.end, Position::new(0, 2, 2));
        let cd = tokens.iter().find(|t| t.text == "cd").unwrap();
        assert_eq!(cd.range.start, Position::new(1, 2, 9));
        assert_eq!(cd.range.end, Position::new(1, 4, 11));
    }

    #[test]
    fn exactly_one_eof() {
        for src in ["", "\n\n", "'", "%", "...", "a(((", "@@@", "ü"] {
            let tokens = Tokenizer::tokenize(src).unwrap();
            let eofs = tokens.iter().filter(|t| t.kind == TokenKind::Eof).count();
            assert_eq!(eofs, 1, "input {:?}", src);
            assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
        }
    }

    #[test]
    fn iterator_is_fused_after_eof() {
        let mut t = Tokenizer::new("x");
        assert_eq!(t.next().map(|t| t.kind), Some(TokenKind::Identifier));
        assert_eq!(t.next().map(|t| t.kind), Some(TokenKind::Eof));
        assert!(t.next().is_none());
        assert!(t.next().is_none());
    }

    #[test]
    fn tokenizing_is_idempotent() {
        let src = "function [a, b] = f(x)\n  % doc\n  a = x'; b = a %% 2;\nend\n";
        assert_eq!(Tokenizer::tokenize(src).unwrap(), Tokenizer::tokenize(src).unwrap());
    }

    #[test]
    fn reset_restarts_on_new_text() {
        let mut t = Tokenizer::new("abc def");
        let first: Vec<Token> = t.by_ref().collect();
        assert_eq!(first.len(), 3);
        t.reset("x");
        let second: Vec<String> = t.map(|t| t.text).collect();
        assert_eq!(second, vec!["x", ""]);
    }

    #[test]
    fn token_limit_is_enforced() {
        let err = Tokenizer::tokenize_with_limit("a b c d e", 3).unwrap_err();
        assert!(matches!(err, TokenizeError::TooManyTokens { limit: 3, .. }));
    }
}
