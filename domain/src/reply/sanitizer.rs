//! Reply cleanup.
//!
//! Markers can surface in decoded text when the engine emits them as ordinary
//! tokens or the tokenizer renders them visibly. Stripping them is a pure
//! string operation that never fails.

use crate::token::special::SpecialMarker;

/// Remove every literal marker from `decoded` and trim surrounding whitespace.
///
/// Removal repeats until no marker is left, so text that only forms a marker
/// after an inner marker is cut out (`"<|bo<|bos|>s|>"`) is cleaned as well
/// and the function stays idempotent.
pub fn sanitize(decoded: &str) -> String {
    let mut text = decoded.to_string();
    loop {
        let before = text.len();
        for marker in SpecialMarker::ALL {
            if text.contains(marker.literal()) {
                text = text.replace(marker.literal(), "");
            }
        }
        if text.len() == before {
            break;
        }
    }
    text.trim().to_string()
}

/// Returns true if `text` contains any literal marker.
pub fn contains_marker(text: &str) -> bool {
    SpecialMarker::ALL
        .iter()
        .any(|m| text.contains(m.literal()))
}
