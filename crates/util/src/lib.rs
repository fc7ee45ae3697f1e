//! live-url-util - Value helpers shared by the live-url crates
//!
//! Deep-emptiness classification and canonical scalar text for JSON-like
//! values travelling between a model and a URL query string.

pub mod as_string;
pub mod is_empty;

// Re-exports for convenience
pub use as_string::as_query_text;
pub use is_empty::is_deep_empty;
