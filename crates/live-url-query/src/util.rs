use crate::percent::{escape_member, escape_segment, unescape_segment};
use crate::types::{Path, PathStep};

/// Check if a string represents a valid non-negative integer list index.
///
/// Leading zeros are rejected, so `"01"` is a mapping key, not a position.
pub fn is_valid_index(index: &str) -> bool {
    if index.is_empty() {
        return false;
    }
    let bytes = index.as_bytes();
    if bytes.len() > 1 && bytes[0] == b'0' {
        return false;
    }
    bytes.iter().all(|&b| b.is_ascii_digit())
}

/// Classify the text between one pair of brackets of a structural key.
///
/// The text is classified as written, then a member name has its escapes
/// resolved: `0` is a position but `%30` is the member `"0"`.
pub fn parse_segment(segment: &str) -> PathStep {
    if segment.is_empty() {
        return PathStep::Append;
    }
    if is_valid_index(segment) {
        if let Ok(idx) = segment.parse::<usize>() {
            return PathStep::Index(idx);
        }
    }
    PathStep::Key(unescape_segment(segment))
}

/// Split a structural key into its root name and the steps below it.
///
/// `prop[foo][0]` becomes `("prop", [Key("foo"), Index(0)])`. Returns `None`
/// for keys that cannot be addressed: an empty root, a stray `]`, an
/// unclosed `[`, nested brackets or trailing text after the last `]`.
///
/// # Example
///
/// ```
/// use live_url_query::{parse_key, PathStep};
///
/// let (root, steps) = parse_key("prop[foo][]").unwrap();
/// assert_eq!(root, "prop");
/// assert_eq!(steps, vec![PathStep::Key("foo".to_string()), PathStep::Append]);
/// assert!(parse_key("prop[foo").is_none());
/// ```
pub fn parse_key(key: &str) -> Option<(String, Path)> {
    let (root, mut rest) = match key.find('[') {
        Some(i) => (&key[..i], &key[i..]),
        None => (key, ""),
    };
    if root.is_empty() || root.contains(']') {
        return None;
    }
    let mut steps = Vec::new();
    while !rest.is_empty() {
        let inner = rest.strip_prefix('[')?;
        let close = inner.find(']')?;
        let segment = &inner[..close];
        if segment.contains('[') {
            return None;
        }
        steps.push(parse_segment(segment));
        rest = &inner[close + 1..];
    }
    Some((unescape_segment(root), steps))
}

/// Build a structural key from a root name and steps.
///
/// An empty member name is written as `[]` and so reads back as an append.
pub fn format_key(root: &str, steps: &[PathStep]) -> String {
    let mut out = escape_segment(root);
    for step in steps {
        push_step(&mut out, step);
    }
    out
}

/// Append one bracketed step to a structural key.
pub fn push_step(key: &mut String, step: &PathStep) {
    key.push('[');
    match step {
        PathStep::Key(member) => key.push_str(&escape_member(member)),
        other => key.push_str(&other.as_segment()),
    }
    key.push(']');
}

/// Normalize a bracketed key into a dot-path: `prop[foo][0]` → `prop.foo.0`.
pub fn to_dot_path(key: &str) -> Option<String> {
    let (root, steps) = parse_key(key)?;
    let mut out = root;
    for step in steps {
        out.push('.');
        out.push_str(&step.as_segment());
    }
    Some(out)
}
