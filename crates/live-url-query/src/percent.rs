//! Percent-encoding for query keys and values.
//!
//! Values are escaped like `encodeURIComponent`, then spaces become `+` and
//! commas stay literal. Keys additionally keep their brackets literal so that
//! `prop[foo]` stays readable in the address bar.
//!
//! Keys are held as *structural keys*: literal brackets delimit segments, and
//! a `%`, `[` or `]` that belongs to a root name or member name is written as
//! a percent escape. A member name that reads as a position (`0`, `12`) has
//! its first digit escaped, so `p[%30]` is the member `"0"` while `p[0]` is
//! the first list item.

use percent_encoding::{
    percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS, NON_ALPHANUMERIC,
};

use crate::util::is_valid_index;

/// Everything except the unreserved marks `- _ . ! ~ * ( )`.
///
/// `'` stays escaped: URL serializers escape it in the query of special
/// schemes, and the output must be stable under re-serialization.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'(')
    .remove(b')');

const VALUE: &AsciiSet = &COMPONENT.remove(b',');

const KEY: &AsciiSet = &VALUE.remove(b'[').remove(b']').remove(b'%');

/// Characters written as escapes inside one segment of a structural key.
const SEGMENT: &AsciiSet = &CONTROLS.add(b'%').add(b'[').add(b']');

/// Escape a parameter value.
///
/// # Example
///
/// ```
/// use live_url_query::percent::encode_value;
///
/// assert_eq!(encode_value("a b,c&d"), "a+b,c%26d");
/// ```
pub fn encode_value(text: &str) -> String {
    utf8_percent_encode(text, VALUE)
        .to_string()
        .replace("%20", "+")
}

/// Escape a structural key for query text.
///
/// Brackets stay literal and the escapes already inside segments pass
/// through unchanged.
pub fn encode_key(key: &str) -> String {
    utf8_percent_encode(key, KEY).to_string().replace("%20", "+")
}

/// Escape a root name for use in a structural key.
pub fn escape_segment(text: &str) -> String {
    utf8_percent_encode(text, SEGMENT).to_string()
}

/// Escape a member name for use between brackets.
///
/// ```
/// use live_url_query::percent::escape_member;
///
/// assert_eq!(escape_member("a[b]"), "a%5Bb%5D");
/// assert_eq!(escape_member("10"), "%310");
/// ```
pub fn escape_member(text: &str) -> String {
    if is_valid_index(text) {
        // Digits are ASCII, so the first byte is a whole char.
        format!("%{:02X}{}", text.as_bytes()[0], &text[1..])
    } else {
        escape_segment(text)
    }
}

/// Resolve the escapes of one segment of a structural key.
pub fn unescape_segment(text: &str) -> String {
    percent_decode_str(text).decode_utf8_lossy().into_owned()
}

/// Turn a raw query key into a structural key.
///
/// Literal brackets in `raw` are structure and each run between them is
/// decoded on its own, so `p[a%5Db]` is the member `"a]b"` of `p`. A key with
/// no literal brackets is decoded whole first, which reads the `p%5Bfoo%5D`
/// keys HTML forms submit as `p[foo]`. Returns `None` when a run does not
/// decode to UTF-8.
pub fn decode_key(raw: &str) -> Option<String> {
    if !raw.contains(is_bracket) {
        let decoded = decode_component(raw)?;
        return map_runs(&decoded, |run| Some(escape_segment(run)));
    }
    map_runs(raw, |run| {
        let text = decode_component(run)?;
        if is_valid_index(&text) && !is_valid_index(run) {
            Some(escape_member(&text))
        } else {
            Some(escape_segment(&text))
        }
    })
}

fn is_bracket(c: char) -> bool {
    c == '[' || c == ']'
}

/// Rewrite the text between brackets, keeping the brackets themselves.
fn map_runs(key: &str, mut run: impl FnMut(&str) -> Option<String>) -> Option<String> {
    let mut out = String::with_capacity(key.len());
    let mut rest = key;
    while let Some(at) = rest.find(is_bracket) {
        out.push_str(&run(&rest[..at])?);
        out.push_str(&rest[at..at + 1]);
        rest = &rest[at + 1..];
    }
    out.push_str(&run(rest)?);
    Some(out)
}

/// Decode one key or value: `+` is a space, then percent sequences are
/// resolved. Returns `None` when the decoded bytes are not UTF-8.
pub fn decode_component(text: &str) -> Option<String> {
    let spaced = text.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_value_aesthetics() {
        assert_eq!(encode_value("foo bar"), "foo+bar");
        assert_eq!(encode_value("a,b"), "a,b");
        assert_eq!(encode_value("1+1=2"), "1%2B1%3D2");
        assert_eq!(encode_value("it's"), "it%27s");
        assert_eq!(encode_value("caf\u{e9}"), "caf%C3%A9");
        assert_eq!(encode_value("[x]"), "%5Bx%5D");
    }

    #[test]
    fn test_encode_key_keeps_brackets() {
        assert_eq!(encode_key("prop[foo][0]"), "prop[foo][0]");
        assert_eq!(encode_key("my prop[a&b]"), "my+prop[a%26b]");
        assert_eq!(encode_key("p[a%5Db][%30]"), "p[a%5Db][%30]");
    }

    #[test]
    fn test_escape_member() {
        assert_eq!(escape_member("plain"), "plain");
        assert_eq!(escape_member("50%"), "50%25");
        assert_eq!(escape_member("]"), "%5D");
        assert_eq!(escape_member("0"), "%30");
        assert_eq!(escape_member("007"), "007");
        assert_eq!(unescape_segment(&escape_member("a[0]%")), "a[0]%");
        assert_eq!(unescape_segment(&escape_member("42")), "42");
    }

    #[test]
    fn test_decode_key_splits_before_decoding() {
        assert_eq!(decode_key("p[a%5Db]").as_deref(), Some("p[a%5Db]"));
        assert_eq!(decode_key("p[a%26b][x+y]").as_deref(), Some("p[a&b][x y]"));
        assert_eq!(decode_key("p[%30]").as_deref(), Some("p[%30]"));
        assert_eq!(decode_key("p[0]").as_deref(), Some("p[0]"));
        assert_eq!(decode_key("p[100%25]").as_deref(), Some("p[100%25]"));
        assert_eq!(decode_key("p[%FF]"), None);
    }

    #[test]
    fn test_decode_key_reads_form_escaped_brackets() {
        assert_eq!(decode_key("p%5Bfoo%5D%5B0%5D").as_deref(), Some("p[foo][0]"));
        assert_eq!(decode_key("100%25").as_deref(), Some("100%25"));
        assert_eq!(decode_key("my+prop").as_deref(), Some("my prop"));
    }

    #[test]
    fn test_decode_component() {
        assert_eq!(decode_component("foo+bar"), Some("foo bar".to_string()));
        assert_eq!(decode_component("a%2Cb"), Some("a,b".to_string()));
        assert_eq!(decode_component("1%2B1"), Some("1+1".to_string()));
        assert_eq!(decode_component("%5Bx%5D"), Some("[x]".to_string()));
        assert_eq!(decode_component(""), Some(String::new()));
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        assert_eq!(decode_component("%FF%FE"), None);
    }

    #[test]
    fn test_decode_inverts_encode() {
        for text in ["", "plain", "with space", "a,b;c", "100%", "ü+ß", "a=b&c"] {
            assert_eq!(decode_component(&encode_value(text)).as_deref(), Some(text));
        }
    }
}
