//! Integration tests for the HTML tokenizer.

use vellum_html::{Attribute, Tokenizer, Token};

/// Helper to tokenize a string and return the tokens
fn tokenize(input: &str) -> Vec<Token> {
    let mut tokenizer = Tokenizer::new(input.to_string());
    tokenizer.run();
    tokenizer.into_tokens()
}

/// Concatenate the character tokens of a stream.
fn text_of(tokens: &[Token]) -> String {
    tokens
        .iter()
        .filter_map(|t| match t {
            Token::Character { data } => Some(*data),
            _ => None,
        })
        .collect()
}

fn attr(name: &str, value: &str) -> Attribute {
    Attribute {
        name: name.to_string(),
        value: value.to_string(),
    }
}

#[test]
fn test_plain_text() {
    let tokens = tokenize("Hello");
    assert_eq!(tokens.len(), 6); // 5 chars + EOF
    assert!(matches!(tokens[0], Token::Character { data: 'H' }));
    assert!(matches!(tokens[5], Token::EndOfFile));
}

#[test]
fn test_doctype() {
    let tokens = tokenize("<!DOCTYPE html>");
    assert_eq!(
        tokens,
        vec![
            Token::Doctype {
                name: Some("html".to_string())
            },
            Token::EndOfFile
        ]
    );
}

#[test]
fn test_comment() {
    let tokens = tokenize("<!-- hi -->");
    assert_eq!(
        tokens[0],
        Token::Comment {
            data: " hi ".to_string()
        }
    );
    assert_eq!(tokens.len(), 2);
}

#[test]
fn test_attributes_in_all_quoting_styles() {
    let tokens = tokenize("<DIV class=\"a b\" id=x data-flag title='t'>");
    match &tokens[0] {
        Token::StartTag {
            name,
            self_closing,
            attributes,
        } => {
            assert_eq!(name, "div");
            assert!(!self_closing);
            assert_eq!(
                attributes,
                &vec![
                    attr("class", "a b"),
                    attr("id", "x"),
                    attr("data-flag", ""),
                    attr("title", "t"),
                ]
            );
        }
        other => panic!("Expected StartTag token, got {other}"),
    }
}

#[test]
fn test_duplicate_attribute_keeps_first() {
    let tokens = tokenize("<p a=\"1\" a=\"2\">");
    match &tokens[0] {
        Token::StartTag { attributes, .. } => assert_eq!(attributes, &vec![attr("a", "1")]),
        other => panic!("Expected StartTag token, got {other}"),
    }
}

#[test]
fn test_self_closing_tag() {
    let tokens = tokenize("<br/>");
    assert!(matches!(
        &tokens[0],
        Token::StartTag { name, self_closing: true, .. } if name == "br"
    ));
}

#[test]
fn test_style_content_is_raw_text() {
    let tokens = tokenize("<style>a<b</div></style>");
    assert!(tokens[0].is_start_tag_named("style"));
    assert_eq!(text_of(&tokens), "a<b</div>");
    assert!(tokens[tokens.len() - 2].is_end_tag_named("style"));
}

#[test]
fn test_title_is_rcdata() {
    let tokens = tokenize("<title>A &amp; <b></title>");
    assert_eq!(text_of(&tokens), "A & <b>");
}

#[test]
fn test_character_references_in_text() {
    let tokens = tokenize("Tom &amp; Jerry &#65;&#x42; &bogus; &copy");
    assert_eq!(text_of(&tokens), "Tom & Jerry AB &bogus; \u{00A9}");
}

#[test]
fn test_legacy_reference_in_attribute_is_not_decoded() {
    let tokens = tokenize("<a href=\"?a=1&copy=2&amp;b\">");
    match &tokens[0] {
        Token::StartTag { attributes, .. } => {
            assert_eq!(attributes, &vec![attr("href", "?a=1&copy=2&b")]);
        }
        other => panic!("Expected StartTag token, got {other}"),
    }
}

#[test]
fn test_crlf_normalized() {
    let tokens = tokenize("a\r\nb\rc");
    assert_eq!(text_of(&tokens), "a\nb\nc");
}

#[test]
fn test_eof_in_tag_emits_single_eof() {
    let mut tokenizer = Tokenizer::new("<div class=".to_string());
    tokenizer.run();
    assert!(tokenizer.parse_error_count() > 0);
    let tokens = tokenizer.into_tokens();
    assert_eq!(tokens, vec![Token::EndOfFile]);
}
