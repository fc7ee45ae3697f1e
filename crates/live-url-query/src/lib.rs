//! Bracket-notation query strings.
//!
//! This crate converts between nested values and the flat `prop[foo][0]=bar`
//! pairs of a URL query, and wraps a URL in a [`QueryDocument`] whose
//! parameters can be read and replaced by their root name.
//!
//! # Example
//!
//! ```
//! use live_url_query::{decode, encode, to_query_string, ListStyle};
//! use serde_json::json;
//!
//! // Flatten a value under a root key
//! let pairs = encode(&json!({"foo": "a b", "bar": [1, 2]}), "prop", ListStyle::Indexed);
//! assert_eq!(
//!     to_query_string(&pairs),
//!     "prop[foo]=a+b&prop[bar][0]=1&prop[bar][1]=2"
//! );
//!
//! // And rebuild the tree from the pairs
//! assert_eq!(
//!     decode(&pairs),
//!     json!({"prop": {"foo": "a b", "bar": ["1", "2"]}})
//! );
//! ```

use thiserror::Error;

pub mod decode;
pub mod document;
pub mod encode;
pub mod path;
pub mod percent;
pub mod types;
pub mod util;

pub use decode::{decode, decode_query, parse_query, MAX_DEPTH, MAX_INDEX_GAP};
pub use document::QueryDocument;
pub use encode::{encode, encode_tree, to_query_string};
pub use types::{ListStyle, Path, PathStep, QueryPair};
pub use util::{format_key, is_valid_index, parse_key, parse_segment, push_step, to_dot_path};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("invalid URL {href:?}: {source}")]
    InvalidUrl {
        href: String,
        #[source]
        source: url::ParseError,
    },
}
