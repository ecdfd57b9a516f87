//! Timestamp patching inside structured-data (`ld+json`) blocks.
//!
//! The block is treated as opaque text: only the literal byte sequence
//! `"dateModified":"<value>"` is rewritten, every other byte passes
//! through unchanged. Differently spaced or quoted variants are skipped
//! on purpose; a tolerant parser could not keep the rest of the JSON
//! byte-identical.

const KEY: &str = "\"dateModified\":\"";

/// Replace the value of every `"dateModified":"…"` occurrence with
/// `iso_date`. Returns the input unchanged when nothing matches.
pub fn stamp_date_modified(content: &str, iso_date: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(pos) = rest.find(KEY) {
        let value_start = pos + KEY.len();
        out.push_str(&rest[..value_start]);
        rest = &rest[value_start..];

        match rest.find('"') {
            Some(end) => {
                out.push_str(iso_date);
                rest = &rest[end..];
            }
            // Unterminated value: leave the tail untouched.
            None => break,
        }
    }

    out.push_str(rest);
    out
}
