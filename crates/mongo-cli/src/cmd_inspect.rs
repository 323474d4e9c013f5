/// Implementation of `mongo-dissect inspect`.
///
/// Splits the capture into frames, decodes each one and prints it as a
/// tree (see `render`). With `--message N` only the message at index N
/// is printed; the frames before it are still split but not decoded.
///
/// # Output format
///
/// ```text
/// Message 0 @ 0: Request : Query (Compressed)
///   header: length=71 request_id=3 response_to=0 opcode=2012
///   compressed: original_opcode=2004 uncompressed_size=38 compressor=Zlib payload=46 bytes
///     flags: 0x00000000
///     collection: db.c (db=db, coll=c)
///     ...
/// ---
/// 1 message, 0 with diagnostics
/// ```
///
/// A framing error stops the walk; everything before it has already been
/// printed.
use std::fs;

use anyhow::{Context, Result, anyhow};
use mongo_decoder::{MongoDecoder, frames};

use crate::InspectArgs;
use crate::render::{MessageReport, hex_dump, message_text};

/// Run the `mongo-dissect inspect` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read, a frame length is
/// invalid, `--message` is out of range, or JSON output fails.
pub fn run(args: &InspectArgs) -> Result<()> {
    let bytes =
        fs::read(&args.file).with_context(|| format!("cannot read {}", args.file.display()))?;
    let decoder = MongoDecoder::default();

    let mut reports = Vec::new();
    let mut shown = 0usize;
    let mut with_diagnostics = 0usize;
    let mut offset = 0usize;
    let mut framing_error = None;

    for (index, frame) in frames(&bytes, decoder.config()).enumerate() {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                framing_error = Some(e);
                break;
            }
        };
        let at = offset;
        offset += frame.len();

        if args.message.is_some_and(|wanted| wanted != index) {
            continue;
        }

        let msg = decoder.decode(frame);
        shown += 1;
        if !msg.is_clean() {
            with_diagnostics += 1;
        }

        if args.json {
            reports.push(MessageReport::new(index, at, &msg));
        } else {
            print!("{}", message_text(index, at, &msg));
            if args.show_hex {
                println!("  Hex dump:");
                print!("{}", hex_dump(frame));
            }
        }
    }

    if let Some(wanted) = args.message
        && shown == 0
        && framing_error.is_none()
    {
        return Err(anyhow!("no message at index {wanted}"));
    }

    if args.json {
        let out = serde_json::to_string_pretty(&reports).context("cannot serialize report")?;
        println!("{out}");
    } else {
        println!("---");
        println!(
            "{shown} message{}, {with_diagnostics} with diagnostics",
            if shown == 1 { "" } else { "s" }
        );
    }

    match framing_error {
        Some(e) => Err(e).with_context(|| format!("framing stopped at offset {offset}")),
        None => Ok(()),
    }
}
