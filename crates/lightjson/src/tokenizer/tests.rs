use alloc::{
    borrow::Cow,
    string::{String, ToString},
    vec::Vec,
};
use core::fmt::Write;

use insta::assert_snapshot;
use rstest::rstest;

use super::*;
use crate::error::Utf8Error;

fn utf16(text: &str) -> Vec<u16> {
    text.encode_utf16().collect()
}

fn kinds(input: &str) -> Vec<TokenKind> {
    Utf8Tokenizer::new(input.as_bytes())
        .map(|token| token.map(|token| token.kind))
        .collect::<Result<_, _>>()
        .unwrap()
}

fn first_error(input: &[u8]) -> ParseError {
    Utf8Tokenizer::new(input)
        .find_map(Result::err)
        .expect("input should fail to tokenize")
}

fn render(input: &str) -> String {
    let mut out = String::new();
    for token in Utf8Tokenizer::new(input.as_bytes()) {
        match token {
            Ok(token) if token.text.is_empty() => {
                writeln!(out, "{}:{} {:?}", token.line, token.column, token.kind).unwrap();
            }
            Ok(token) => {
                let text = String::from_utf8_lossy(&token.text);
                writeln!(out, "{}:{} {:?} {text}", token.line, token.column, token.kind).unwrap();
            }
            Err(err) => writeln!(out, "error: {err}").unwrap(),
        }
    }
    out
}

#[test]
fn token_stream_with_positions() {
    let input = "{\"firstName\": \"John\",\n  \"tags\": [true, null, -1.5]\n}";
    assert_snapshot!(render(input), @r#"
    1:1 BeginObject {
    1:2 String "firstName"
    1:13 NameValueSeparator :
    1:15 String "John"
    1:21 EntrySeparator ,
    2:3 String "tags"
    2:9 NameValueSeparator :
    2:11 BeginArray [
    2:12 True true
    2:16 EntrySeparator ,
    2:18 Null null
    2:22 EntrySeparator ,
    2:24 FloatingPointNumber -1.5
    2:28 EndArray ]
    3:1 EndObject }
    3:2 EndOfDocument
    "#);
}

#[rstest]
#[case("42")]
#[case("-3992")]
#[case("0")]
#[case("-2147483648")]
#[case("2147483647")]
fn single_integer_token(#[case] input: &str) {
    let padded = alloc::format!("  {input}\n");
    let mut tokenizer = Utf8Tokenizer::new(padded.as_bytes());
    let token = tokenizer.next_token().unwrap();
    assert_eq!(token.kind, TokenKind::IntegerNumber);
    assert_eq!(&*token.text, input.as_bytes());
    assert!(token.is_borrowed());
    assert_eq!(
        tokenizer.next_token().unwrap().kind,
        TokenKind::EndOfDocument
    );
}

#[test]
fn truncated_literal_names_expected_and_found() {
    let err = first_error(b"fals");
    assert_eq!(
        err.to_string(),
        "syntax error: expected token \"false\" but found \"fals\" at 1:1"
    );
    assert_eq!(
        first_error(b"[nul]").kind(),
        &ErrorSource::Lex(LexError::ExpectedLiteral {
            expected: "null",
            found: "nul".into(),
        })
    );
}

#[test]
fn comment_produces_no_token() {
    assert_eq!(
        kinds("[ // comment\n 42 ]"),
        [
            TokenKind::BeginArray,
            TokenKind::IntegerNumber,
            TokenKind::EndArray,
            TokenKind::EndOfDocument,
        ]
    );

    let mut tokenizer = Utf8Tokenizer::new(b"[ // comment\n 42 ]");
    tokenizer.next_token().unwrap();
    let number = tokenizer.next_token().unwrap();
    assert_eq!(number.position(), Position { line: 2, column: 2 });
}

#[test]
fn comment_at_end_of_input() {
    assert_eq!(kinds("1 // trailing"), [
        TokenKind::IntegerNumber,
        TokenKind::EndOfDocument
    ]);
}

#[test]
fn slash_without_comment_is_unexpected() {
    let err = first_error(b"[ / ]");
    assert_eq!(
        err.kind(),
        &ErrorSource::Lex(LexError::UnexpectedCharacter { found: "/".into() })
    );
    assert_eq!((err.line, err.column), (1, 3));

    let options = TokenizerOptions {
        allow_comments: false,
        ..TokenizerOptions::default()
    };
    let err = Utf8Tokenizer::with_options(b"// no", options)
        .next_token()
        .unwrap_err();
    assert_eq!((err.line, err.column), (1, 1));
}

#[rstest]
#[case("\r\n\r\n  1", 3, 3)]
#[case("\n\r\n1", 3, 1)]
#[case("\r1", 1, 2)]
#[case("\t \t1", 1, 4)]
fn newline_accounting(#[case] input: &str, #[case] line: usize, #[case] column: usize) {
    let token = Utf8Tokenizer::new(input.as_bytes()).next_token().unwrap();
    assert_eq!(token.position(), Position { line, column });
}

#[test]
fn unicode_whitespace_is_optional() {
    let input = "\u{3000}\u{A0}true";
    let token = Utf8Tokenizer::new(input.as_bytes()).next_token().unwrap();
    assert_eq!(token.kind, TokenKind::True);
    assert_eq!(token.column, 3);

    let strict = TokenizerOptions {
        allow_unicode_whitespace: false,
        ..TokenizerOptions::default()
    };
    let err = Utf8Tokenizer::with_options(input.as_bytes(), strict)
        .next_token()
        .unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorSource::Lex(LexError::UnexpectedCharacter {
            found: "\u{3000}".into()
        })
    );
}

#[test]
fn plain_string_is_borrowed_with_quotes() {
    let mut tokenizer = Utf8Tokenizer::new(" \"héllo\" ".as_bytes());
    let token = tokenizer.next_token().unwrap();
    assert!(token.is_borrowed());
    assert_eq!(&*token.text, "\"héllo\"".as_bytes());
    assert_eq!(token.string_content(), "héllo".as_bytes());
    // Columns count scalars, so the multi-byte é advances by one.
    assert_eq!(tokenizer.position(), Position { line: 1, column: 9 });
}

#[test]
fn escaped_string_is_materialized() {
    let input = r#"["a\"b\n\u00e9\uD83D\uDE00\/", 1]"#;
    let mut tokenizer = Utf8Tokenizer::new(input.as_bytes());
    tokenizer.read_begin_of_array().unwrap();
    let token = tokenizer.next_token().unwrap();
    assert!(!token.is_borrowed());
    assert_eq!(token.to_string::<Utf8>().unwrap(), "a\"b\né😀/");
    assert_eq!(token.text.first(), Some(&b'"'));
    assert_eq!(token.text.last(), Some(&b'"'));

    tokenizer.read_entry_separator().unwrap();
    let next = tokenizer.next_token().unwrap();
    assert_eq!(next.column, input.find('1').unwrap() + 1);
}

#[test]
fn escaped_string_in_utf16() {
    let input = utf16(r#""tab\there \u00e9\uD83D\uDE00""#);
    let token = Utf16Tokenizer::new(&input).next_token().unwrap();
    assert_eq!(token.string_content(), utf16("tab\there é😀").as_slice());
}

#[test]
fn lone_surrogate_escape_depends_on_target() {
    let err = first_error(br#""\uD800x""#);
    assert_eq!(
        err.kind(),
        &ErrorSource::Lex(LexError::InvalidEscapeSequence {
            token: r#""\uD800x""#.into()
        })
    );

    let input = utf16(r#""\uD800x""#);
    let token = Utf16Tokenizer::new(&input).next_token().unwrap();
    assert_eq!(token.string_content(), &[0xD800, u16::from(b'x')]);
    assert!(matches!(
        token.to_string::<Utf16>(),
        Err(ErrorSource::Encoding(_))
    ));
}

#[rstest]
#[case(br#""\x""#)]
#[case(br#""\u12""#)]
#[case(br#""\u12G4""#)]
#[case(br#""ok\""#)]
fn malformed_strings(#[case] input: &[u8]) {
    let err = first_error(input);
    assert!(
        matches!(
            err.kind(),
            ErrorSource::Lex(
                LexError::InvalidEscapeSequence { .. } | LexError::UnterminatedString { .. }
            )
        ),
        "{err}"
    );
    assert_eq!((err.line, err.column), (1, 1));
}

#[rstest]
#[case(b"\"a\nb\"", "\"a\n")]
#[case(b"\"\x01\x00\"", "\"\x01")]
#[case(b"\"tab\there\"", "\"tab\t")]
#[case(b"\"esc\\n then raw\x1F\"", "\"esc\\n then raw\x1F")]
fn raw_control_characters_in_strings(#[case] input: &[u8], #[case] token: &str) {
    let err = first_error(input);
    assert_eq!(
        err.kind(),
        &ErrorSource::Lex(LexError::ControlCharacterInString {
            token: token.into()
        })
    );
    assert_eq!((err.line, err.column), (1, 1));
}

#[test]
fn raw_newline_in_string_does_not_shift_later_positions() {
    let err = first_error(b"[\"a\nb\", x]");
    assert!(
        matches!(
            err.kind(),
            ErrorSource::Lex(LexError::ControlCharacterInString { .. })
        ),
        "{err}"
    );
    assert_eq!((err.line, err.column), (1, 2));

    let wide = utf16("\"\u{1}\"");
    let err = Utf16Tokenizer::new(&wide).next_token().unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorSource::Lex(LexError::ControlCharacterInString { .. })
    ));
}

#[test]
fn unterminated_string_keeps_position() {
    let err = first_error(b"[1,\n  \"abc");
    assert_eq!(
        err.kind(),
        &ErrorSource::Lex(LexError::UnterminatedString {
            token: "\"abc".into()
        })
    );
    assert_eq!((err.line, err.column), (2, 3));
}

#[rstest]
#[case(b"-", DigitContext::MinusSign)]
#[case(b"-a", DigitContext::MinusSign)]
#[case(b"1.", DigitContext::DecimalSymbol)]
#[case(b"12.x", DigitContext::DecimalSymbol)]
fn number_needs_digits(#[case] input: &[u8], #[case] after: DigitContext) {
    assert_eq!(
        first_error(input).kind(),
        &ErrorSource::Lex(LexError::ExpectedDigit { after })
    );
}

#[test]
fn exponent_is_not_part_of_a_number() {
    let mut tokenizer = Utf8Tokenizer::new(b"1e5");
    let token = tokenizer.next_token().unwrap();
    assert_eq!(token.kind, TokenKind::IntegerNumber);
    assert_eq!(&*token.text, b"1");
    let err = tokenizer.next_token().unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorSource::Lex(LexError::UnexpectedCharacter { found: "e".into() })
    );
    assert_eq!(err.column, 2);
}

#[test]
fn invalid_utf8_between_tokens() {
    let err = first_error(b"[\xFF]");
    assert_eq!(err.kind(), &ErrorSource::Utf8(Utf8Error::InvalidLeadByte));
    assert_eq!((err.line, err.column), (1, 2));
}

#[test]
fn error_preview_is_bounded() {
    let input = alloc::format!("f{}", "x".repeat(100));
    let err = first_error(input.as_bytes());
    let ErrorSource::Lex(LexError::ExpectedLiteral { found, .. }) = err.kind() else {
        panic!("unexpected error {err}");
    };
    assert_eq!(found.chars().count(), MAX_PREVIEW_CHARS);
}

#[test]
fn iterator_stops_after_error() {
    let mut tokens = Utf8Tokenizer::new(b"[x, 1]");
    assert!(matches!(tokens.next(), Some(Ok(_))));
    assert!(matches!(tokens.next(), Some(Err(_))));
    assert!(tokens.next().is_none());
}

#[test]
fn end_of_document_repeats_for_direct_calls() {
    let mut tokenizer = Utf8Tokenizer::new(b" ");
    for _ in 0..2 {
        assert_eq!(
            tokenizer.next_token().unwrap().kind,
            TokenKind::EndOfDocument
        );
    }
    assert_eq!(tokenizer.count(), 1);
}

#[test]
fn fast_path_reads() {
    let input = br#"{"id": 42, "name": "x\ty", "ok": true, "none": null, "list": [-7, 18446744073709551615]}"#;
    let mut tokenizer = Utf8Tokenizer::new(input);
    tokenizer.read_begin_of_object().unwrap();
    assert_eq!(tokenizer.read_name_token().unwrap().string_content(), b"id");
    assert_eq!(tokenizer.read_int32().unwrap(), 42);
    tokenizer.read_entry_separator().unwrap();
    tokenizer.read_name_token().unwrap();
    assert_eq!(tokenizer.read_string().unwrap(), "x\ty");
    tokenizer.read_entry_separator().unwrap();
    tokenizer.read_name_token().unwrap();
    assert!(tokenizer.read_boolean().unwrap());
    tokenizer.read_entry_separator().unwrap();
    tokenizer.read_name_token().unwrap();
    tokenizer.read_null().unwrap();
    tokenizer.read_entry_separator().unwrap();
    assert_eq!(tokenizer.peek_kind().unwrap(), TokenKind::String);
    tokenizer.read_name_token().unwrap();
    tokenizer.read_begin_of_array().unwrap();
    assert_eq!(tokenizer.read_int64().unwrap(), -7);
    tokenizer.read_entry_separator().unwrap();
    assert_eq!(tokenizer.read_uint64().unwrap(), u64::MAX);
    tokenizer.read_end_of_array().unwrap();
    tokenizer.read_end_of_object().unwrap();
    assert_eq!(
        tokenizer.next_token().unwrap().kind,
        TokenKind::EndOfDocument
    );
}

#[test]
fn fast_path_reads_utf16() {
    let input = utf16("{ \"k\" : 2.000 }");
    let mut tokenizer = Utf16Tokenizer::new(&input);
    tokenizer.read_begin_of_object().unwrap();
    let name = tokenizer.read_name_token().unwrap();
    assert_eq!(name.string_content(), utf16("k").as_slice());
    assert_eq!(tokenizer.read_uint32().unwrap(), 2);
    tokenizer.read_end_of_object().unwrap();
}

#[test]
fn name_token_requires_separator() {
    let err = Utf8Tokenizer::new(br#""key" 1"#)
        .read_name_token()
        .unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorSource::Lex(LexError::UnexpectedToken {
            expected: TokenKind::NameValueSeparator,
            found: TokenKind::IntegerNumber,
        })
    );
    assert_eq!(err.column, 7);
}

#[rstest]
#[case(b"2147483648", NumberError::Overflow { text: "2147483648".into() }.into())]
#[case(b"-2147483649", NumberError::Overflow { text: "-2147483649".into() }.into())]
#[case(b"1.5", NumberError::NonIntegerFraction { text: "1.5".into() }.into())]
#[case(b"5.", LexError::ExpectedDigit { after: DigitContext::DecimalSymbol }.into())]
#[case(b"-7.,", LexError::ExpectedDigit { after: DigitContext::DecimalSymbol }.into())]
fn read_int32_failures(#[case] input: &[u8], #[case] expected: ErrorSource) {
    let err = Utf8Tokenizer::new(input).read_int32().unwrap_err();
    assert_eq!(err.kind(), &expected);
    assert_eq!((err.line, err.column), (1, 1));
}

#[test]
fn read_int64_agrees_with_next_token_on_bare_decimal_point() {
    let from_read = Utf8Tokenizer::new(b"5.").read_int64().unwrap_err();
    let from_lexer = Utf8Tokenizer::new(b"5.").next_token().unwrap_err();
    assert_eq!(from_read, from_lexer);

    let wide = utf16("[12.]");
    let mut tokenizer = Utf16Tokenizer::new(&wide);
    tokenizer.read_begin_of_array().unwrap();
    let err = tokenizer.read_uint32().unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorSource::Lex(LexError::ExpectedDigit {
            after: DigitContext::DecimalSymbol
        })
    );
    assert_eq!((err.line, err.column), (1, 2));
}

#[test]
fn read_of_wrong_kind_reports_both_kinds() {
    let err = Utf8Tokenizer::new(b" \"x\"").read_int32().unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorSource::Lex(LexError::UnexpectedToken {
            expected: TokenKind::IntegerNumber,
            found: TokenKind::String,
        })
    );
    assert_eq!((err.line, err.column), (1, 2));
    assert_eq!(
        err.to_string(),
        "syntax error: expected integer number but found string at 1:2"
    );

    let err = Utf8Tokenizer::new(b"[").read_begin_of_object().unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorSource::Lex(LexError::UnexpectedToken {
            expected: TokenKind::BeginObject,
            found: TokenKind::BeginArray,
        })
    );
}

#[test]
fn read_str_borrows_when_possible() {
    let mut tokenizer = Utf8Tokenizer::new(br#"["plain", "esc\u0041ped"]"#);
    tokenizer.read_begin_of_array().unwrap();
    assert!(matches!(tokenizer.read_str().unwrap(), Cow::Borrowed("plain")));
    tokenizer.read_entry_separator().unwrap();
    let owned = tokenizer.read_str().unwrap();
    assert!(matches!(owned, Cow::Owned(_)));
    assert_eq!(owned, "escAped");
}

#[test]
fn read_str_rejects_invalid_utf8() {
    let err = Utf8Tokenizer::new(b"\"a\xC3(\"").read_str().unwrap_err();
    assert_eq!(err.kind(), &ErrorSource::Utf8(Utf8Error::MalformedSequence));
    assert_eq!((err.line, err.column), (1, 1));
}

#[test]
fn peek_does_not_consume() {
    let mut tokenizer = Utf8Tokenizer::new(b"  -1.25 ]");
    assert_eq!(
        tokenizer.peek_kind().unwrap(),
        TokenKind::FloatingPointNumber
    );
    assert_eq!(
        tokenizer.next_token().unwrap().kind,
        TokenKind::FloatingPointNumber
    );
    assert_eq!(tokenizer.peek_kind().unwrap(), TokenKind::EndArray);
    assert!(tokenizer.peek_kind().is_ok());
    assert_eq!(tokenizer.remaining(), b"]");
}

#[test]
fn utf16_matches_utf8() {
    let input = "{\"a\": [1, -2.5, \"\\u00e9x\", true, false, null]} // done\n";
    let wide = utf16(input);
    let narrow: Vec<_> = Utf8Tokenizer::new(input.as_bytes())
        .map(Result::unwrap)
        .map(|token| (token.kind, token.position(), token.to_string::<Utf8>().unwrap()))
        .collect();
    let wide: Vec<_> = Utf16Tokenizer::new(&wide)
        .map(Result::unwrap)
        .map(|token| (token.kind, token.position(), token.to_string::<Utf16>().unwrap()))
        .collect();
    assert_eq!(narrow, wide);
    assert_eq!(narrow.len(), 18);
}
