//! Two-way synchronization between a component's fields and the URL query.
//!
//! A [`MappingTable`] says which model fields appear in the URL and under
//! which parameter names. A [`SyncController`] then keeps them in step: after
//! each render it writes the fields into the query (pushing a new history
//! entry when a `history` field changed), and on back/forward navigation it
//! reads the query back into the model. [`extract_props`] performs the same
//! read for the initial request, before the component first renders.
//!
//! # Example
//!
//! ```
//! use live_url::{
//!     BrowserHistory, HistoryMode, MappingTable, MemoryBrowser, MemoryStore, SyncController,
//!     ValueStore,
//! };
//! use serde_json::json;
//!
//! let table = MappingTable::from_json(
//!     r#"{"query": "q", "page": {"type": "int", "history": true}}"#,
//! )
//! .unwrap();
//! let mut controller = SyncController::new(table);
//! let mut store = MemoryStore::new(json!({"query": "", "page": 1}));
//! let mut browser = MemoryBrowser::new("https://example.com/list");
//!
//! controller.connect(&store, &mut browser).unwrap();
//!
//! // The first render shows the non-empty page
//! let written = controller.render_finished(&store, &mut browser).unwrap();
//! assert_eq!(written, Some(HistoryMode::Push));
//! assert_eq!(browser.current_url(), "https://example.com/list?page=1");
//!
//! // Changing the query alone amends the current entry
//! store.set("query", json!("shoes"));
//! let written = controller.render_finished(&store, &mut browser).unwrap();
//! assert_eq!(written, Some(HistoryMode::Replace));
//! assert_eq!(browser.current_url(), "https://example.com/list?page=1&q=shoes");
//! ```

pub mod cli;
pub mod coerce;
pub mod config;
pub mod controller;
pub mod extract;
pub mod history;
pub mod mapping;
pub mod store;
pub mod tracker;

pub use coerce::{coerce, CoercionError};
pub use config::{BindingConfig, EmptyPolicy, FieldConfig, SubPathConfig, SyncOptions, ValueType};
pub use controller::{
    LifecycleEvent, NavigationOutcome, Reaction, SyncController, SyncError, SyncState,
};
pub use extract::{extract_props, Extraction};
pub use history::{
    BrowserHistory, HistoryMode, HistoryStrategy, HistoryWrite, MemoryBrowser, NavigationEvents,
};
pub use live_url_query::{ListStyle, QueryDocument};
pub use mapping::{ConfigError, FieldBinding, MappingTable};
pub use store::{Component, MemoryStore, ValueStore};
pub use tracker::Tracker;
