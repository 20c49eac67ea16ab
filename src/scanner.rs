//! Candidate scanner.
//!
//! A single linear pass over the decoded bytes that collects every maximal
//! run of hostname labels joined by single dots. The scanner knows nothing
//! about HTTP, HTML or JavaScript; it overproduces on purpose and leaves
//! the filtering to the suffix validator.

/// A candidate hostname found by the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawToken<'a> {
    /// Byte offset of the token in the scanned input
    pub start: usize,
    /// The token text (ASCII only)
    pub text: &'a str,
}

impl RawToken<'_> {
    /// Number of dot-separated labels in the token
    pub fn label_count(&self) -> usize {
        self.text.split('.').count()
    }
}

/// Characters allowed inside a label
#[inline]
pub fn is_label_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

/// Scan `input` for candidate hostnames, in order of appearance.
///
/// A candidate is a maximal `label(.label)+` run where labels are made of
/// `[A-Za-z0-9_-]`. A dot not followed by a label character ends the run and
/// is not part of the token, so `example.com.` and `a..b.com` yield
/// `example.com` and `b.com`.
pub fn scan(input: &[u8]) -> Vec<RawToken<'_>> {
    Scanner::new(input).collect()
}

/// Iterator form of [`scan`]
pub struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    /// End of the label starting at `start`
    fn label_end(&self, start: usize) -> usize {
        let mut end = start;
        while end < self.input.len() && is_label_byte(self.input[end]) {
            end += 1;
        }
        end
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = RawToken<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let len = self.input.len();

        while self.pos < len {
            if !is_label_byte(self.input[self.pos]) {
                self.pos += 1;
                continue;
            }

            let start = self.pos;
            let mut end = self.label_end(start);
            let mut labels = 1;

            // Extend while a dot is followed by another label
            while end + 1 < len
                && self.input[end] == b'.'
                && is_label_byte(self.input[end + 1])
            {
                end = self.label_end(end + 1);
                labels += 1;
            }

            // Every byte up to `end` is consumed exactly once
            self.pos = end;

            if labels < 2 {
                continue;
            }

            // Label bytes are ASCII, so this never fails
            if let Ok(text) = std::str::from_utf8(&self.input[start..end]) {
                return Some(RawToken { start, text });
            }
        }

        None
    }
}
