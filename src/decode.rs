//! Recovery decoder.
//!
//! Undoes the encodings that hide hostnames in captured traffic: percent
//! encoding, `\xHH` byte escapes, JSON `\uHHHH` escapes and escaped slashes.
//! Doubly escaped forms (`\\xHH`, `%25HH`) surface after a further pass.
//! Anything that cannot be interpreted is passed through verbatim.
//!
//! Decoding works on bytes: a percent or hex escape may produce a byte that
//! is not valid UTF-8 on its own, and the scanner only cares about ASCII.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::bytes::{Captures, Regex};

/// Default upper bound on decode passes
pub const DEFAULT_MAX_PASSES: usize = 3;

/// `\xHH`, optionally with the backslash itself escaped
static HEX_ESCAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\\\?x([0-9a-fA-F]{2})").expect("HEX_ESCAPE: hardcoded regex is invalid")
});

/// `\uHHHH`, optionally followed by a second escape completing a surrogate pair
static UNICODE_ESCAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\\\?u([0-9a-fA-F]{4})(?:\\\\?u([0-9a-fA-F]{4}))?")
        .expect("UNICODE_ESCAPE: hardcoded regex is invalid")
});

/// JSON escaped slash
static ESCAPED_SLASH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\\\?/").expect("ESCAPED_SLASH: hardcoded regex is invalid"));

/// Runs of `%HH`
static PERCENT_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:%[0-9a-fA-F]{2})+").expect("PERCENT_RUN: hardcoded regex is invalid")
});

/// Decode `input` with the default pass bound, converting the result to text.
///
/// Bytes that do not form valid UTF-8 after decoding are replaced with
/// U+FFFD.
pub fn decode(input: impl AsRef<[u8]>) -> String {
    let (decoded, _) = recover(input.as_ref(), DEFAULT_MAX_PASSES);
    String::from_utf8_lossy(&decoded).into_owned()
}

/// Decode `input` with the default pass bound, keeping raw bytes.
pub fn decode_bytes(input: &[u8]) -> Vec<u8> {
    recover(input, DEFAULT_MAX_PASSES).0.into_owned()
}

/// Apply decode passes until one changes nothing or `max_passes` is reached.
///
/// Returns the decoded bytes and the number of passes that changed the text.
pub(crate) fn recover(input: &[u8], max_passes: usize) -> (Cow<'_, [u8]>, usize) {
    let mut current = Cow::Borrowed(input);
    let mut applied = 0;

    for _ in 0..max_passes {
        match decode_pass(&current) {
            Some(next) => {
                current = Cow::Owned(next);
                applied += 1;
            }
            None => break,
        }
    }

    (current, applied)
}

/// One pass over every rule. `None` when nothing matched.
fn decode_pass(input: &[u8]) -> Option<Vec<u8>> {
    let rules: [fn(&[u8]) -> Cow<'_, [u8]>; 4] = [
        decode_hex_escapes,
        decode_unicode_escapes,
        decode_escaped_slashes,
        decode_percent_runs,
    ];

    let mut changed = false;
    let mut text = Cow::Borrowed(input);

    for rule in rules {
        let next = match rule(&text) {
            Cow::Owned(next) => Some(next),
            Cow::Borrowed(_) => None,
        };
        if let Some(next) = next {
            text = Cow::Owned(next);
            changed = true;
        }
    }

    if changed {
        Some(text.into_owned())
    } else {
        None
    }
}

fn decode_hex_escapes(input: &[u8]) -> Cow<'_, [u8]> {
    HEX_ESCAPE.replace_all(input, |caps: &Captures| [hex_byte(&caps[1])])
}

fn decode_unicode_escapes(input: &[u8]) -> Cow<'_, [u8]> {
    UNICODE_ESCAPE.replace_all(input, |caps: &Captures| {
        let first = caps.get(1).map(|m| hex_u16(m.as_bytes())).unwrap_or(0);
        let second = caps.get(2).map(|m| hex_u16(m.as_bytes()));

        let mut out = Vec::with_capacity(8);
        match second {
            Some(low) if is_high_surrogate(first) && is_low_surrogate(low) => {
                let code =
                    0x10000 + ((u32::from(first) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
                push_char(&mut out, code, &caps[0]);
            }
            Some(low) => {
                // Two unrelated escapes matched back to back
                push_unit(&mut out, first, first_escape(caps));
                push_unit(&mut out, low, second_escape(caps));
            }
            None => push_unit(&mut out, first, &caps[0]),
        }
        out
    })
}

fn decode_escaped_slashes(input: &[u8]) -> Cow<'_, [u8]> {
    ESCAPED_SLASH.replace_all(input, &b"/"[..])
}

fn decode_percent_runs(input: &[u8]) -> Cow<'_, [u8]> {
    PERCENT_RUN.replace_all(input, |caps: &Captures| {
        caps[0]
            .chunks_exact(3)
            .map(|chunk| hex_byte(&chunk[1..]))
            .collect::<Vec<u8>>()
    })
}

/// Raw text of the first escape in a `UNICODE_ESCAPE` match
fn first_escape<'a>(caps: &Captures<'a>) -> &'a [u8] {
    let whole = caps.get(0).map(|m| (m.start(), m.as_bytes()));
    let first_end = caps.get(1).map(|m| m.end());
    match (whole, first_end) {
        (Some((start, bytes)), Some(end)) => &bytes[..end - start],
        (Some((_, bytes)), None) => bytes,
        _ => &[],
    }
}

/// Raw text of the second escape in a `UNICODE_ESCAPE` match
fn second_escape<'a>(caps: &Captures<'a>) -> &'a [u8] {
    let whole = caps.get(0).map(|m| (m.start(), m.as_bytes()));
    let first_end = caps.get(1).map(|m| m.end());
    match (whole, first_end) {
        (Some((start, bytes)), Some(end)) => &bytes[end - start..],
        _ => &[],
    }
}

/// Push a single UTF-16 unit; lone surrogates stay as written
fn push_unit(out: &mut Vec<u8>, unit: u16, raw: &[u8]) {
    if is_high_surrogate(unit) || is_low_surrogate(unit) {
        out.extend_from_slice(raw);
    } else {
        push_char(out, u32::from(unit), raw);
    }
}

fn push_char(out: &mut Vec<u8>, code: u32, raw: &[u8]) {
    match char::from_u32(code) {
        Some(ch) => {
            let mut buf = [0u8; 4];
            out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
        }
        None => out.extend_from_slice(raw),
    }
}

fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..0xDC00).contains(&unit)
}

fn is_low_surrogate(unit: u16) -> bool {
    (0xDC00..0xE000).contains(&unit)
}

fn hex_val(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        b'A'..=b'F' => b - b'A' + 10,
        _ => 0,
    }
}

/// Two hex digits to a byte; callers only pass regex-validated digits
fn hex_byte(digits: &[u8]) -> u8 {
    (hex_val(digits[0]) << 4) | hex_val(digits[1])
}

fn hex_u16(digits: &[u8]) -> u16 {
    digits
        .iter()
        .fold(0u16, |acc, &b| (acc << 4) | u16::from(hex_val(b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_encoding() {
        assert_eq!(decode("http%3A%2F%2Fnews.ifeng.com%2F"), "http://news.ifeng.com/");
        assert_eq!(decode("%79%61%6b%6c%61%6e%67.com"), "yaklang.com");
    }

    #[test]
    fn test_invalid_percent_left_untouched() {
        assert_eq!(decode("100% sure"), "100% sure");
        assert_eq!(decode("%zz%4"), "%zz%4");
        assert_eq!(decode("50%"), "50%");
    }

    #[test]
    fn test_double_percent_encoding() {
        assert_eq!(
            decode("url=http%253A%252F%252Fnews.ifeng.com%252F"),
            "url=http://news.ifeng.com/"
        );
    }

    #[test]
    fn test_hex_escapes() {
        assert_eq!(decode(r"\x61\x62\x63.com"), "abc.com");
        assert_eq!(decode(r"\x2F\x2fnews.ifeng.com"), "//news.ifeng.com");
    }

    #[test]
    fn test_hex_escape_run_keeps_trailing_literal() {
        let decoded = decode(r"\x12\x33\x12\x33\x12\x33\x12\x33\x12\x334");
        assert_eq!(decoded, "\u{12}3\u{12}3\u{12}3\u{12}3\u{12}34");
        assert!(decoded.ends_with("34"));
    }

    #[test]
    fn test_double_backslash_hex_escape() {
        assert_eq!(decode(r"\\x61bc.com"), "abc.com");
    }

    #[test]
    fn test_malformed_hex_escape_left_untouched() {
        assert_eq!(decode(r"\xZZ \x4"), r"\xZZ \x4");
    }

    /// Build escape text at runtime so the test source stays plain ASCII
    fn esc(parts: &[&str]) -> String {
        parts.iter().map(|p| format!("{}{}", '\\', p)).collect()
    }

    #[test]
    fn test_unicode_escapes() {
        assert_eq!(decode(esc(&["u0061"]) + "bc.com"), "abc.com");
        assert_eq!(
            decode(format!("https:{}", esc(&["u002f", "u002F"])) + "example.com"),
            "https://example.com"
        );
        assert_eq!(decode(format!("{}{}", '\\', esc(&["u0061"])) + "bc.com"), "abc.com");
        assert_eq!(decode(esc(&["u4e2d", "u6587"])), "\u{4e2d}\u{6587}");
    }

    #[test]
    fn test_unicode_surrogate_pair() {
        assert_eq!(decode(esc(&["ud83d", "ude00"])), "\u{1F600}");
    }

    #[test]
    fn test_lone_surrogate_left_untouched() {
        let high = esc(&["ud83d"]) + ".x";
        assert_eq!(decode(&high), high);
        let low = esc(&["ude00"]) + "A";
        assert_eq!(decode(&low), low);
        let reversed = esc(&["ude00", "ud83d"]);
        assert_eq!(decode(&reversed), reversed);
    }

    #[test]
    fn test_unrelated_unicode_escapes_back_to_back() {
        assert_eq!(decode(esc(&["u0061", "u0062"]) + ".com"), "ab.com");
        let mixed = esc(&["ud83d", "u0062"]);
        assert_eq!(decode(&mixed), esc(&["ud83d"]) + "b");
    }

    #[test]
    fn test_escaped_slashes() {
        assert_eq!(
            decode(r#"{"url":"https:\/\/news.ifeng.com\/a"}"#),
            r#"{"url":"https://news.ifeng.com/a"}"#
        );
    }

    #[test]
    fn test_clean_text_is_stable() {
        let text = "GET / HTTP/1.1\r\nHost: stadig.ifeng.com\r\n\r\n";
        let once = decode(text);
        assert_eq!(once, text);
        assert_eq!(decode(&once), once);
    }

    #[test]
    fn test_pass_bound() {
        // Each pass peels one %25 layer
        let (out, passes) = recover(b"%25252541", 3);
        assert_eq!(passes, 3);
        assert_eq!(&out[..], b"%41");

        let (out, passes) = recover(b"%25252541", 1);
        assert_eq!(passes, 1);
        assert_eq!(&out[..], b"%252541");
    }

    #[test]
    fn test_recover_borrows_clean_input() {
        let (out, passes) = recover(b"plain text", DEFAULT_MAX_PASSES);
        assert_eq!(passes, 0);
        assert!(matches!(out, Cow::Borrowed(_)));
    }

    #[test]
    fn test_invalid_utf8_does_not_panic() {
        let bytes = decode_bytes(b"%FF%FEabc.com");
        assert_eq!(&bytes[..2], &[0xFF, 0xFE]);
        assert!(decode("%FF%FEabc.com").ends_with("abc.com"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(decode(""), "");
        assert!(decode_bytes(b"").is_empty());
    }
}
