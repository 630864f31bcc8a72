//! Integration tests for the CSS tokenizer and declaration parser.

use vellum_css::parser::{Rule, parse_declaration_list, parse_stylesheet};
use vellum_css::tokenizer::{CssToken, CssTokenizer, HashType, NumericType};

/// Helper to tokenize a string and return the tokens
fn tokenize(input: &str) -> Vec<CssToken> {
    let mut tokenizer = CssTokenizer::new(input);
    tokenizer.run();
    tokenizer.into_tokens()
}

#[test]
fn test_whitespace_collapses() {
    let tokens = tokenize("   \t\n  ");
    assert_eq!(tokens, vec![CssToken::Whitespace, CssToken::EOF]);
}

#[test]
fn test_comments_are_dropped() {
    let tokens = tokenize("/* a */color/* b */");
    assert_eq!(tokens, vec![CssToken::ident("color"), CssToken::EOF]);
}

#[test]
fn test_unterminated_comment() {
    assert_eq!(tokenize("/* never closed"), vec![CssToken::EOF]);
}

#[test]
fn test_hash_types() {
    let tokens = tokenize("#main #123");
    assert!(matches!(
        &tokens[0],
        CssToken::Hash { value, hash_type: HashType::Id } if value == "main"
    ));
    assert!(matches!(
        &tokens[2],
        CssToken::Hash { value, hash_type: HashType::Unrestricted } if value == "123"
    ));
}

#[test]
fn test_numbers_keep_source_text() {
    let tokens = tokenize("0.50em -3 +.5% 1e3");
    assert!(matches!(
        &tokens[0],
        CssToken::Dimension { repr, unit, kind: NumericType::Number, .. }
            if repr == "0.50" && unit == "em"
    ));
    assert!(matches!(
        &tokens[2],
        CssToken::Number { value, kind: NumericType::Integer, .. } if (*value + 3.0).abs() < f64::EPSILON
    ));
    assert_eq!(tokens[4].to_string(), "+.5%");
    assert_eq!(tokens[6].to_string(), "1e3");
}

#[test]
fn test_strings_and_escapes() {
    let tokens = tokenize(r#""a \"b\"" 'c\41 d'"#);
    assert_eq!(tokens[0], CssToken::String("a \"b\"".to_string()));
    assert_eq!(tokens[2], CssToken::String("cAd".to_string()));
}

#[test]
fn test_newline_in_string_is_bad_string() {
    let tokens = tokenize("\"abc\ndef\"");
    assert_eq!(tokens[0], CssToken::BadString);
}

#[test]
fn test_url_forms() {
    let tokens = tokenize("url( img/a.png ) url(\"b.png\")");
    assert_eq!(tokens[0], CssToken::Url("img/a.png".to_string()));
    assert_eq!(tokens[2], CssToken::Function("url".to_string()));
    assert_eq!(tokens[3], CssToken::String("b.png".to_string()));
}

#[test]
fn test_cdo_cdc() {
    let tokens = tokenize("<!-- -->");
    assert_eq!(
        tokens,
        vec![CssToken::CDO, CssToken::Whitespace, CssToken::CDC, CssToken::EOF]
    );
}

#[test]
fn test_declaration_values_round_trip() {
    let decls = parse_declaration_list(
        "border: 1px  solid #CCC; font-family: \"Open Sans\", sans-serif; color: rgb(1, 2, 3)",
    );
    let values: Vec<String> = decls.iter().map(|d| d.value_text()).collect();
    assert_eq!(
        values,
        ["1px solid #CCC", "\"Open Sans\", sans-serif", "rgb(1, 2, 3)"]
    );
}

#[test]
fn test_important_flag() {
    let decls = parse_declaration_list("color: red ! IMPORTANT; margin: 0 important");
    assert!(decls[0].important);
    assert_eq!(decls[0].value_text(), "red");
    assert!(!decls[1].important);
    assert_eq!(decls[1].value_text(), "0 important");
}

#[test]
fn test_invalid_declarations_are_skipped() {
    let decls = parse_declaration_list("color red; ; 12px: x; width: 10px; height:");
    let names: Vec<&str> = decls.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, ["width"]);
}

#[test]
fn test_stylesheet_rules_and_at_rules() {
    let sheet = parse_stylesheet(
        "@import url(x.css); .a, .b > p { color: red } @media print { .a { color: blue } } p{}",
    );
    assert_eq!(sheet.rules.len(), 4);
    assert!(matches!(&sheet.rules[0], Rule::At(at) if at.name == "import"));
    assert!(matches!(&sheet.rules[2], Rule::At(at) if at.name == "media" && at.block.is_some()));

    let selectors: Vec<String> = sheet.qualified_rules().map(|r| r.selector_text()).collect();
    assert_eq!(selectors, [".a, .b > p", "p"]);
}

#[test]
fn test_stray_closing_brace_in_style_attribute() {
    let decls = parse_declaration_list("color: red; } margin: 0");
    assert_eq!(decls.len(), 2);
}
