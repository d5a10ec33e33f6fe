//! Shared utility functions.

/// Single-line preview of user text for log messages.
///
/// Newlines and tabs become spaces, and text longer than `max_chars`
/// characters is cut and suffixed with `...`.
pub fn log_preview(text: &str, max_chars: usize) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();

    match flat.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &flat[..cut]),
        None => flat,
    }
}
