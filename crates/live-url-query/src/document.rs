//! A URL's query component, addressable by logical parameter names.

use std::fmt;

use serde_json::{Map, Value};
use url::Url;

use tracing::trace;

use crate::decode::{decode, parse_query, MAX_DEPTH};
use crate::encode::{encode, to_query_string};
use crate::types::{ListStyle, QueryPair};
use crate::util::parse_key;
use crate::QueryError;

/// The query of one URL, parsed into flat pairs.
///
/// Reads decode the pairs into a tree and look up a root name. Writes
/// replace the pairs of one root and leave the pairs of every other root as
/// they were, in their original list style. Pairs that cannot be addressed
/// are dropped on the first write. The scheme, host, path and fragment of
/// the source URL are carried through unchanged.
///
/// A document is meant to live for one reconciliation pass: build it from
/// the live URL, mutate it, then compare [`QueryDocument::href`] against
/// the URL it came from.
///
/// # Example
///
/// ```
/// use live_url_query::QueryDocument;
/// use serde_json::json;
///
/// let mut doc = QueryDocument::parse("https://example.com/search?q=rust#top").unwrap();
/// doc.set("filters", &json!({"lang": "en", "tags": ["a", "b"]}));
/// assert_eq!(
///     doc.href(),
///     "https://example.com/search?q=rust&filters[lang]=en&filters[tags][0]=a&filters[tags][1]=b#top"
/// );
/// doc.remove("filters");
/// assert!(!doc.is_changed());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDocument {
    url: Option<Url>,
    original: String,
    pairs: Vec<QueryPair>,
    style: ListStyle,
    dirty: bool,
}

impl QueryDocument {
    /// Parse an absolute URL.
    pub fn parse(href: &str) -> Result<Self, QueryError> {
        let url = Url::parse(href).map_err(|source| QueryError::InvalidUrl {
            href: href.to_string(),
            source,
        })?;
        let pairs = url.query().map(parse_query).unwrap_or_default();
        Ok(Self {
            url: Some(url),
            original: href.to_string(),
            pairs,
            style: ListStyle::default(),
            dirty: false,
        })
    }

    /// Build a document from bare query text, with or without the leading `?`.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let original = if query.is_empty() {
            String::new()
        } else {
            format!("?{query}")
        };
        Self {
            url: None,
            original,
            pairs: parse_query(query),
            style: ListStyle::default(),
            dirty: false,
        }
    }

    /// Use `style` for lists written by later calls to [`QueryDocument::set`].
    pub fn with_list_style(mut self, style: ListStyle) -> Self {
        self.style = style;
        self
    }

    pub fn list_style(&self) -> ListStyle {
        self.style
    }

    /// The decoded tree of all parameters.
    pub fn tree(&self) -> Map<String, Value> {
        match decode(&self.pairs) {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.tree().contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.tree().remove(name)
    }

    /// Set the parameter `name` to `value`, replacing everything under it.
    ///
    /// An existing parameter keeps its position; a new one is appended.
    pub fn set(&mut self, name: &str, value: &Value) {
        let fresh = encode(value, name, self.style);
        self.splice(name, Some(fresh));
    }

    /// Remove `name` and every key nested under it.
    ///
    /// Matches whole root names, so `propOther` survives `remove("prop")`.
    pub fn remove(&mut self, name: &str) {
        self.splice(name, None);
    }

    /// Swap the pairs rooted at `name` for `fresh`, at the position of the
    /// first of them.
    fn splice(&mut self, name: &str, fresh: Option<Vec<QueryPair>>) {
        let mut fresh = fresh;
        let mut found = false;
        let mut pairs = Vec::with_capacity(self.pairs.len());
        for (key, value) in &self.pairs {
            match parse_key(key) {
                Some((root, steps)) if steps.len() <= MAX_DEPTH => {
                    if root != name {
                        pairs.push((key.clone(), value.clone()));
                        continue;
                    }
                    found = true;
                    if let Some(fresh) = fresh.take() {
                        pairs.extend(fresh);
                    }
                }
                _ => {
                    trace!(target: "live_url_query::document", key = key.as_str(), "dropping unaddressable key on rewrite");
                }
            }
        }
        if !found {
            match fresh {
                Some(fresh) => pairs.extend(fresh),
                None => return,
            }
        }
        self.pairs = pairs;
        self.dirty = true;
    }

    pub fn pairs(&self) -> &[QueryPair] {
        &self.pairs
    }

    /// Query text without the leading `?`.
    pub fn query(&self) -> String {
        to_query_string(&self.pairs)
    }

    /// Query text with a leading `?`, or empty when there are no parameters.
    pub fn search(&self) -> String {
        let query = self.query();
        if query.is_empty() {
            query
        } else {
            format!("?{query}")
        }
    }

    /// The full URL text.
    ///
    /// Until the first mutation this is exactly the text the document was
    /// built from.
    pub fn href(&self) -> String {
        if !self.dirty {
            return self.original.clone();
        }
        match &self.url {
            Some(url) => {
                let mut url = url.clone();
                let query = self.query();
                url.set_query(if query.is_empty() { None } else { Some(&query) });
                url.to_string()
            }
            None => self.search(),
        }
    }

    /// Whether the serialized URL differs from the one the document was built from.
    pub fn is_changed(&self) -> bool {
        self.href() != self.original
    }
}

impl fmt::Display for QueryDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.href())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_invalid_url() {
        let err = QueryDocument::parse("not a url").unwrap_err();
        assert!(matches!(err, QueryError::InvalidUrl { .. }));
    }

    #[test]
    fn test_untouched_document_keeps_original_text() {
        let href = "https://example.com/p?items[]=a&items[]=b&x=%7E";
        let doc = QueryDocument::parse(href).unwrap();
        assert_eq!(doc.href(), href);
        assert!(!doc.is_changed());
        assert_eq!(doc.get("items"), Some(json!(["a", "b"])));
    }

    #[test]
    fn test_set_and_get() {
        let mut doc = QueryDocument::from_query("");
        doc.set("param", &json!("foo"));
        assert_eq!(doc.search(), "?param=foo");
        assert!(doc.has("param"));
        assert_eq!(doc.get("param"), Some(json!("foo")));
        assert_eq!(doc.get("missing"), None);
    }

    #[test]
    fn test_set_keeps_position() {
        let mut doc = QueryDocument::from_query("a=1&b=2&c=3");
        doc.set("b", &json!(20));
        assert_eq!(doc.query(), "a=1&b=20&c=3");
    }

    #[test]
    fn test_remove_absent_is_a_no_op() {
        let mut doc = QueryDocument::from_query("items[]=a");
        doc.remove("other");
        assert_eq!(doc.href(), "?items[]=a");
        assert!(!doc.is_changed());
    }

    #[test]
    fn test_remove_last_parameter_drops_question_mark() {
        let mut doc = QueryDocument::parse("https://example.com/p?param=foo#frag").unwrap();
        doc.remove("param");
        assert_eq!(doc.href(), "https://example.com/p#frag");
    }

    #[test]
    fn test_repeated_list_style() {
        let mut doc = QueryDocument::from_query("").with_list_style(ListStyle::Repeated);
        doc.set("items", &json!(["foo", "bar"]));
        assert_eq!(doc.query(), "items[]=foo&items[]=bar");
        assert_eq!(doc.get("items"), Some(json!(["foo", "bar"])));
    }

    #[test]
    fn test_set_back_to_original_is_unchanged() {
        let mut doc = QueryDocument::parse("https://example.com/?a=1").unwrap();
        doc.set("a", &json!("2"));
        assert!(doc.is_changed());
        doc.set("a", &json!(1));
        assert!(!doc.is_changed());
    }

    #[test]
    fn test_other_roots_keep_their_list_style() {
        let mut doc = QueryDocument::from_query("f[0][x]=1&f[0][y]=2&t[]=a")
            .with_list_style(ListStyle::Repeated);
        doc.set("q", &json!(["b"]));
        assert_eq!(doc.query(), "f[0][x]=1&f[0][y]=2&t[]=a&q[]=b");
        assert_eq!(doc.get("f"), Some(json!([{"x": "1", "y": "2"}])));

        let mut doc = QueryDocument::from_query("a[]=x&b=1");
        doc.set("b", &json!(2));
        assert_eq!(doc.query(), "a[]=x&b=2");
    }

    #[test]
    fn test_remove_drops_nested_empty_keys() {
        let mut doc = QueryDocument::from_query("prop[foo]=&other=1");
        assert!(!doc.has("prop"));
        doc.remove("prop");
        assert_eq!(doc.query(), "other=1");
    }

    #[test]
    fn test_display_is_href() {
        let mut doc = QueryDocument::parse("https://example.com/").unwrap();
        doc.set("q", &json!("a b"));
        assert_eq!(doc.to_string(), "https://example.com/?q=a+b");
    }
}
