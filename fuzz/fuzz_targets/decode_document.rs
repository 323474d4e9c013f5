#![no_main]

use libfuzzer_sys::fuzz_target;
use mongo_types::DiagnosticKind;

// Fuzz target: a bare BSON document.
//
// Catches bugs in:
// - Nested length prefixes and nesting depth
// - String and cstring bounds
// - Code-with-scope length accounting
//
// A document refused for its length or depth reports its declared length
// unread, which may run past the input. Any other result stays in bounds.
fuzz_target!(|data: &[u8]| {
    let config = mongo_decoder::DecoderConfig::default();
    let (_, consumed, diags) = mongo_decoder::decode_document(data, &config);
    let refused = diags.iter().any(|d| {
        matches!(
            d.kind,
            DiagnosticKind::DocumentLengthTooLong | DiagnosticKind::RecursionExceeded
        )
    });
    assert!(consumed <= data.len() || refused);
});
