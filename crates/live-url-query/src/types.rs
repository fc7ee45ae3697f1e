//! Type definitions for bracket-notation query strings.

use serde::{Deserialize, Serialize};

/// One flat query parameter: the bracketed key and its (unencoded) text.
pub type QueryPair = (String, String);

/// A step below the root name of a bracketed key.
///
/// `prop[foo][0][]` has the root `prop` and the steps
/// `[Key("foo"), Index(0), Append]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    /// A named member, `[foo]`.
    Key(String),
    /// A positional member, `[0]`.
    Index(usize),
    /// An index-less member, `[]`, appended after the existing ones.
    Append,
}

/// The steps of a bracketed key below its root name.
pub type Path = Vec<PathStep>;

/// How list elements are keyed when a list is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListStyle {
    /// Positional keys, `items[0]=a&items[1]=b`.
    #[default]
    Indexed,
    /// Repeated index-less keys, `items[]=a&items[]=b`.
    Repeated,
}

impl PathStep {
    /// Render the step as it appears inside brackets.
    pub fn as_segment(&self) -> String {
        match self {
            PathStep::Key(key) => key.clone(),
            PathStep::Index(idx) => idx.to_string(),
            PathStep::Append => String::new(),
        }
    }

    /// Whether the step addresses a list position rather than a named member.
    pub fn is_positional(&self) -> bool {
        matches!(self, PathStep::Index(_) | PathStep::Append)
    }
}
