#![no_main]
use arbitrary::Arbitrary;
use lightjson::{
    TokenKind, Tokenizer, TokenizerOptions, Utf8, Utf8Tokenizer, Utf16, Utf16Tokenizer,
};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
    allow_comments: bool,
    allow_unicode_whitespace: bool,
    wide: bool,
    data: Vec<u8>,
}

/// Drains the tokenizer, checking that every token lies inside the input and
/// that the stream ends within one token per unit.
macro_rules! drain {
    ($tokenizer:expr, $encoding:ty, $len:expr) => {{
        let mut tokenizer = $tokenizer;
        let mut steps = 0usize;
        while let Some(result) = tokenizer.next() {
            steps += 1;
            assert!(steps <= $len + 1, "tokenizer did not terminate");
            let Ok(token) = result else { break };
            assert!(tokenizer.offset() <= $len);
            assert!(token.line >= 1 && token.column >= 1);
            if token.kind == TokenKind::String {
                let _ = token.to_string::<$encoding>();
            }
            if token.kind == TokenKind::EndOfDocument {
                assert_eq!(tokenizer.offset(), $len);
            }
        }
        assert!(tokenizer.next().is_none());
    }};
}

fuzz_target!(|input: Input| {
    let options = TokenizerOptions {
        allow_comments: input.allow_comments,
        allow_unicode_whitespace: input.allow_unicode_whitespace,
    };

    let narrow: Utf8Tokenizer = Tokenizer::<Utf8>::with_options(&input.data, options);
    drain!(narrow, Utf8, input.data.len());

    if input.wide {
        let wide: Vec<u16> = input
            .data
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        let tokenizer: Utf16Tokenizer = Tokenizer::<Utf16>::with_options(&wide, options);
        drain!(tokenizer, Utf16, wide.len());
    }
});
