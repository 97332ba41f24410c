#![no_main]
use arbitrary::Arbitrary;
use lightjson::{
    Growth, Utf8JsonWriter, Utf16JsonWriter, Utf16Tokenizer, Utf8Tokenizer, WriteError,
    WriterOptions,
};
use libfuzzer_sys::fuzz_target;
use serde_json::Value;

#[derive(Arbitrary, Debug)]
enum Op {
    Text(String),
    Wide(Vec<u16>),
    Int64(i64),
    Uint64(u64),
    Bool(bool),
    Null,
}

#[derive(Arbitrary, Debug)]
struct Input {
    initial_capacity: u8,
    factor: Option<u8>,
    ops: Vec<Op>,
}

/// Writes every op as an array element and returns the ops that were
/// accepted.
macro_rules! write_array {
    ($writer:expr, $ops:expr) => {{
        let writer = &mut $writer;
        let mut written = 0usize;
        writer.write_begin_of_array().unwrap();
        for op in $ops {
            if written > 0 {
                writer.write_entry_separator().unwrap();
            }
            let before = writer.len();
            let result = match op {
                Op::Text(text) => writer.write_string(text),
                Op::Wide(units) => writer.write_utf16_string(units),
                Op::Int64(value) => writer.write_int64(*value),
                Op::Uint64(value) => writer.write_uint64(*value),
                Op::Bool(value) => writer.write_boolean(*value),
                Op::Null => writer.write_null(),
            };
            match result {
                Ok(()) => written += 1,
                Err(WriteError::Encoding(_)) => {
                    assert_eq!(writer.len(), before);
                    if written > 0 {
                        // Keep the array well formed.
                        writer.write_null().unwrap();
                        written += 1;
                    }
                }
                Err(err) => panic!("unexpected error: {err}"),
            }
        }
        writer.write_end_of_array().unwrap();
    }};
}

fuzz_target!(|input: Input| {
    let options = WriterOptions {
        initial_capacity: usize::from(input.initial_capacity),
        growth: match input.factor {
            Some(f) => Growth::Factor(1.0 + f64::from(f) / 64.0),
            None => Growth::Doubling,
        },
        ..WriterOptions::default()
    };

    let mut narrow = Utf8JsonWriter::with_options(options);
    write_array!(narrow, &input.ops);
    let narrow = narrow.finish();
    let text = narrow.as_str().expect("writer emitted invalid UTF-8");
    let value: Value = serde_json::from_str(text).expect("writer emitted invalid JSON");
    assert!(value.is_array());
    assert!(Utf8Tokenizer::new(&narrow).all(|token| token.is_ok()));

    let mut wide = Utf16JsonWriter::with_options(options);
    write_array!(wide, &input.ops);
    let wide = wide.finish();
    assert!(Utf16Tokenizer::new(&wide).all(|token| token.is_ok()));
});
