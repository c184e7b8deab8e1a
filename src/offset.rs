//! Character/byte offset conversion helpers.
//!
//! Mention offsets are character offsets (what taggers and humans count);
//! Rust string slicing wants byte offsets. Everything that slices document
//! text goes through these helpers so multi-byte text cannot produce split
//! code points or misaligned highlights.

/// Number of characters in `text`.
#[must_use]
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Convert a byte offset (e.g. from a regex match) to a character offset.
///
/// Returns `None` if `byte` is not a character boundary within `text`.
#[must_use]
pub fn byte_to_char(text: &str, byte: usize) -> Option<usize> {
    if byte == text.len() {
        return Some(text.chars().count());
    }
    if !text.is_char_boundary(byte) {
        return None;
    }
    Some(text[..byte].chars().count())
}

/// Slice `text` by half-open character offsets.
///
/// Returns `None` when the range is inverted or extends past the end.
#[must_use]
pub fn char_slice(text: &str, start: usize, end: usize) -> Option<&str> {
    if start >= end {
        return None;
    }
    let mut byte_start = None;
    let mut byte_end = None;
    for (i, (b, _)) in text.char_indices().enumerate() {
        if i == start {
            byte_start = Some(b);
        }
        if i == end {
            byte_end = Some(b);
            break;
        }
    }
    let bs = byte_start?;
    let be = match byte_end {
        Some(be) => be,
        None if end == char_len(text) => text.len(),
        None => return None,
    };
    Some(&text[bs..be])
}
