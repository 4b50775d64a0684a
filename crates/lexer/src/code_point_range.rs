use std::sync::Arc;

/// Sentinel returned by [`CodePointRange::code_point`] once the cursor reached the end of the
/// lexed region.
pub const END_OF_BUFFER: i32 = -1;

/// Encode a string into the UTF-16 buffer representation consumed by the lexers.
pub fn utf16(text: &str) -> Arc<[u16]> {
    text.encode_utf16().collect()
}

const fn is_high_surrogate(unit: u16) -> bool {
    matches!(unit, 0xD800..=0xDBFF)
}

const fn is_low_surrogate(unit: u16) -> bool {
    matches!(unit, 0xDC00..=0xDFFF)
}

/// Cursor over a UTF-16 buffer that exposes Unicode codepoints.
///
/// The cursor tracks the current token as the half-open range `start..end`. Lexers call
/// [`match_char`](Self::match_char) to extend the token by one codepoint and
/// [`flush`](Self::flush) to begin the next token at the current position.
///
/// Invariant: `start <= end <= buffer_end <= buffer.len()`.
#[derive(Debug, Clone)]
pub struct CodePointRange {
    buffer: Arc<[u16]>,
    start: usize,
    end: usize,
    buffer_end: usize,
    saved_end: usize,
}

impl Default for CodePointRange {
    fn default() -> Self {
        Self::new()
    }
}

impl CodePointRange {
    pub fn new() -> Self {
        Self { buffer: Arc::from(Vec::<u16>::new()), start: 0, end: 0, buffer_end: 0, saved_end: 0 }
    }

    /// Reset the cursor to lex `buffer[start..end]`. Offsets past the buffer are clamped.
    pub fn start(&mut self, buffer: Arc<[u16]>, start: usize, end: usize) {
        let buffer_end = end.min(buffer.len());
        let start = start.min(buffer_end);
        self.buffer = buffer;
        self.start = start;
        self.end = start;
        self.buffer_end = buffer_end;
        self.saved_end = start;
    }

    pub fn buffer(&self) -> &Arc<[u16]> {
        &self.buffer
    }

    pub fn start_offset(&self) -> usize {
        self.start
    }

    pub fn end_offset(&self) -> usize {
        self.end
    }

    pub fn buffer_end(&self) -> usize {
        self.buffer_end
    }

    pub fn is_at_end(&self) -> bool {
        self.end >= self.buffer_end
    }

    /// The codepoint at the cursor, combining a surrogate pair when both halves lie inside the
    /// lexed region. Returns [`END_OF_BUFFER`] at the end of input.
    pub fn code_point(&self) -> i32 {
        self.code_point_at(self.end).0
    }

    fn code_point_at(&self, pos: usize) -> (i32, usize) {
        if pos >= self.buffer_end {
            return (END_OF_BUFFER, 0);
        }
        let high = self.buffer[pos];
        if is_high_surrogate(high) && pos + 1 < self.buffer_end {
            let low = self.buffer[pos + 1];
            if is_low_surrogate(low) {
                let cp = 0x10000 + ((i32::from(high) - 0xD800) << 10) + (i32::from(low) - 0xDC00);
                return (cp, 2);
            }
        }
        (i32::from(high), 1)
    }

    /// Advance the cursor by exactly one codepoint (two UTF-16 units for a surrogate pair).
    /// Does nothing at the end of input.
    pub fn match_char(&mut self) {
        let (_, width) = self.code_point_at(self.end);
        self.end += width;
    }

    pub fn match_n(&mut self, count: usize) {
        for _ in 0..count {
            self.match_char();
        }
    }

    /// Mark a token boundary at the current cursor position.
    pub fn flush(&mut self) {
        self.start = self.end;
    }

    pub fn save(&mut self) {
        self.saved_end = self.end;
    }

    pub fn restore(&mut self) {
        self.end = self.saved_end;
    }

    /// Text of the current token, decoded lossily.
    pub fn token_text(&self) -> String {
        String::from_utf16_lossy(&self.buffer[self.start..self.end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(text: &str) -> CodePointRange {
        let buffer = utf16(text);
        let len = buffer.len();
        let mut r = CodePointRange::new();
        r.start(buffer, 0, len);
        r
    }

    #[test]
    fn empty_buffer_reports_end_of_buffer() {
        let r = range("");
        assert_eq!(r.code_point(), END_OF_BUFFER);
        assert!(r.is_at_end());
    }

    #[test]
    fn match_advances_one_unit_for_bmp_characters() {
        let mut r = range("a\u{E9}");
        assert_eq!(r.code_point(), 'a' as i32);
        r.match_char();
        assert_eq!(r.end_offset(), 1);
        assert_eq!(r.code_point(), 0xE9);
        r.match_char();
        assert_eq!(r.end_offset(), 2);
        assert_eq!(r.code_point(), END_OF_BUFFER);
        r.match_char();
        assert_eq!(r.end_offset(), 2);
    }

    #[test]
    fn surrogate_pairs_are_combined() {
        let mut r = range("\u{1F600}x");
        assert_eq!(r.code_point(), 0x1F600);
        r.match_char();
        assert_eq!(r.end_offset(), 2);
        assert_eq!(r.code_point(), 'x' as i32);
    }

    #[test]
    fn unpaired_surrogates_are_returned_as_units() {
        let buffer: Arc<[u16]> = Arc::from(vec![0xD800, 0x0041, 0xDC00]);
        let mut r = CodePointRange::new();
        r.start(buffer, 0, 3);
        assert_eq!(r.code_point(), 0xD800);
        r.match_char();
        assert_eq!(r.end_offset(), 1);
        r.match_char();
        assert_eq!(r.code_point(), 0xDC00);
        r.match_char();
        assert_eq!(r.end_offset(), 3);
    }

    #[test]
    fn surrogate_pair_straddling_the_region_end_is_not_combined() {
        let buffer = utf16("\u{1F600}");
        let mut r = CodePointRange::new();
        r.start(buffer, 0, 1);
        assert_eq!(r.code_point(), 0xD83D);
        r.match_char();
        assert_eq!(r.end_offset(), 1);
        assert!(r.is_at_end());
    }

    #[test]
    fn flush_starts_a_new_token() {
        let mut r = range("ab");
        r.match_char();
        assert_eq!(r.token_text(), "a");
        r.flush();
        assert_eq!(r.start_offset(), 1);
        r.match_char();
        assert_eq!(r.token_text(), "b");
    }

    #[test]
    fn save_and_restore_backtrack_to_the_checkpoint() {
        let mut r = range("abc");
        r.match_char();
        r.save();
        r.match_n(2);
        assert_eq!(r.end_offset(), 3);
        r.restore();
        assert_eq!(r.end_offset(), 1);
        assert_eq!(r.code_point(), 'b' as i32);
    }

    #[test]
    fn offsets_are_clamped_to_the_buffer() {
        let mut r = CodePointRange::new();
        r.start(utf16("abc"), 5, 10);
        assert_eq!(r.buffer_end(), 3);
        assert_eq!(r.start_offset(), 3);
        assert_eq!(r.code_point(), END_OF_BUFFER);
    }
}
