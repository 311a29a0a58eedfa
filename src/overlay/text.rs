//! Fixed-capacity overlay text buffer
//!
//! Capacity counts one reserved terminator byte, so at most `capacity - 1`
//! bytes of content are kept. Truncation never splits a UTF-8 sequence.

use super::TEXT_CAPACITY;

/// Bounded UTF-8 text buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedText {
    buf: String,
    capacity: usize,
}

impl Default for BoundedText {
    fn default() -> Self {
        Self::new(TEXT_CAPACITY)
    }
}

impl BoundedText {
    /// Create an empty buffer. `capacity` includes the terminator byte.
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: String::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Capacity in bytes, terminator included
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Longest content this buffer will hold, in bytes
    #[inline]
    pub fn max_len(&self) -> usize {
        self.capacity - 1
    }

    /// Replace the contents, truncating to [`BoundedText::max_len`] bytes.
    ///
    /// Returns `true` if the input was truncated.
    pub fn set(&mut self, text: &str) -> bool {
        let end = floor_char_boundary(text, self.max_len());
        self.buf.clear();
        self.buf.push_str(&text[..end]);
        end < text.len()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

/// Largest index `<= max` that lies on a char boundary of `text`
fn floor_char_boundary(text: &str, max: usize) -> usize {
    if max >= text.len() {
        return text.len();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    end
}
