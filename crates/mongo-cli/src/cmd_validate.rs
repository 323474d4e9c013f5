/// Implementation of `mongo-dissect validate`.
///
/// Decodes every message in the capture and prints one line per message:
/// a check mark for a clean decode, a cross followed by each diagnostic
/// otherwise. Exits with code 1 if any message carries a diagnostic, is
/// truncated, or the capture cannot be split into frames.
///
/// # Output
///
/// ```text
/// ✓ #0 @ 0: Request : Query
/// ✗ #1 @ 58: Request : Extensible Message Format
///     [unknown-section-kind] at 21: Unknown section type: 7
/// ---
/// 2 messages, 1 with problems
/// ```
use std::fs;

use anyhow::{Context, Result, anyhow};
use mongo_decoder::MongoDecoder;

use crate::ValidateArgs;

/// Run the `mongo-dissect validate` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read, framing fails, or any
/// message did not decode cleanly.
pub fn run(args: &ValidateArgs) -> Result<()> {
    let bytes =
        fs::read(&args.file).with_context(|| format!("cannot read {}", args.file.display()))?;
    let decoder = MongoDecoder::default();

    let mut total = 0usize;
    let mut failed = 0usize;
    let mut offset = 0usize;

    for msg in decoder.decode_stream(&bytes) {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                println!("✗ framing error at offset {offset}: {e}");
                return Err(anyhow!("{failed} of {total} messages failed, then framing stopped"));
            }
        };

        if msg.is_clean() {
            println!("✓ #{total} @ {offset}: {}", msg.summary());
        } else {
            failed += 1;
            println!("✗ #{total} @ {offset}: {}", msg.summary());
            for d in &msg.diagnostics {
                println!("    {d}");
            }
        }
        total += 1;
        offset += msg.header.and_then(|h| h.message_len()).unwrap_or(msg.consumed);
    }

    println!("---");
    println!(
        "{total} message{}, {failed} with problems",
        if total == 1 { "" } else { "s" }
    );

    if failed > 0 {
        return Err(anyhow!("validation failed"));
    }
    Ok(())
}
