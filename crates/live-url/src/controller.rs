//! The synchronization state machine.
//!
//! A [`SyncController`] is driven by its host at four points:
//!
//! - **connect**: snapshot every bound field, force `keep` parameters into
//!   the URL and subscribe to back/forward navigation;
//! - **render finished**: project every bound field into the URL, then push
//!   or replace the history entry if the URL text changed;
//! - **navigation**: read the URL back into the model and re-render once;
//! - **disconnect**: unsubscribe and stop touching the URL.
//!
//! The live URL is re-read at the start of every pass and the result is
//! compared against it right before writing.

use live_url_query::path::leaf_paths;
use live_url_query::{QueryDocument, QueryError};
use live_url_util::is_deep_empty;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::coerce::{coerce, CoercionError};
use crate::config::{EmptyPolicy, SyncOptions};
use crate::history::{BrowserHistory, HistoryMode, HistoryStrategy, NavigationEvents};
use crate::mapping::{FieldBinding, MappingTable};
use crate::store::{Component, ValueStore};
use crate::tracker::Tracker;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("controller is already connected")]
    AlreadyConnected,
    #[error("controller is not connected")]
    NotConnected,
    #[error("controller has been disconnected")]
    Disconnected,
    #[error(transparent)]
    Url(#[from] QueryError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Uninitialized,
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Connect,
    RenderFinished,
    /// Back/forward navigation delivered to the listener with this id.
    Navigation { listener: u64 },
    Disconnect,
}

/// What a navigation pass did to the model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigationOutcome {
    /// Property writes, in the order they were applied.
    pub writes: Vec<(String, Value)>,
    /// Parameters that could not be coerced; their fields were left as is.
    pub errors: Vec<CoercionError>,
    /// Whether a re-render was requested.
    pub rendered: bool,
}

/// Result of [`SyncController::handle`].
#[derive(Debug, Clone, PartialEq)]
pub enum Reaction {
    /// A URL pass ran; carries the history write, if one was needed.
    History(Option<HistoryMode>),
    Navigation(NavigationOutcome),
    Disconnected,
}

/// Keeps one component's bound fields and the URL query in sync.
///
/// # Example
///
/// ```
/// use live_url::{MappingTable, MemoryBrowser, MemoryStore, SyncController, ValueStore};
/// use live_url::BrowserHistory;
/// use serde_json::json;
///
/// let table = MappingTable::from_json(r#"{"query": "q"}"#).unwrap();
/// let mut controller = SyncController::new(table);
/// let mut store = MemoryStore::new(json!({"query": ""}));
/// let mut browser = MemoryBrowser::new("https://example.com/search");
///
/// controller.connect(&store, &mut browser).unwrap();
/// store.set("query", json!("rust"));
/// controller.render_finished(&store, &mut browser).unwrap();
/// assert_eq!(browser.current_url(), "https://example.com/search?q=rust");
/// ```
#[derive(Debug, Clone)]
pub struct SyncController {
    table: MappingTable,
    options: SyncOptions,
    state: SyncState,
    trackers: Vec<Tracker>,
    listener: Option<u64>,
}

impl SyncController {
    pub fn new(table: MappingTable) -> Self {
        Self::with_options(table, SyncOptions::default())
    }

    pub fn with_options(table: MappingTable, options: SyncOptions) -> Self {
        Self {
            table,
            options,
            state: SyncState::Uninitialized,
            trackers: Vec::new(),
            listener: None,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn table(&self) -> &MappingTable {
        &self.table
    }

    pub fn options(&self) -> SyncOptions {
        self.options
    }

    /// The navigation listener id while connected.
    pub fn listener(&self) -> Option<u64> {
        self.listener
    }

    pub fn tracker(&self, param: &str) -> Option<&Tracker> {
        let idx = self.table.iter().position(|b| b.param_name == param)?;
        self.trackers.get(idx)
    }

    /// Dispatch a lifecycle event.
    pub fn handle<C, B>(
        &mut self,
        event: LifecycleEvent,
        component: &mut C,
        browser: &mut B,
    ) -> Result<Reaction, SyncError>
    where
        C: Component + ?Sized,
        B: BrowserHistory + NavigationEvents + ?Sized,
    {
        match event {
            LifecycleEvent::Connect => self.connect(&*component, browser).map(Reaction::History),
            LifecycleEvent::RenderFinished => self
                .render_finished(&*component, browser)
                .map(Reaction::History),
            LifecycleEvent::Navigation { listener } => self
                .navigated(listener, component, &*browser)
                .map(Reaction::Navigation),
            LifecycleEvent::Disconnect => {
                self.disconnect(browser);
                Ok(Reaction::Disconnected)
            }
        }
    }

    // ── Connect ───────────────────────────────────────────────────────────

    /// Snapshot the bound fields and subscribe to navigation.
    ///
    /// Only `keep` parameters missing from the URL are written, with a
    /// replace; everything else waits for the first render.
    pub fn connect<C, B>(&mut self, component: &C, browser: &mut B) -> Result<Option<HistoryMode>, SyncError>
    where
        C: ValueStore + ?Sized,
        B: BrowserHistory + NavigationEvents + ?Sized,
    {
        match self.state {
            SyncState::Uninitialized => {}
            SyncState::Connected => return Err(SyncError::AlreadyConnected),
            SyncState::Disconnected => return Err(SyncError::Disconnected),
        }
        let mut doc = self.open(&*browser)?;
        self.trackers.clear();
        for binding in &self.table {
            let value = component.get(&binding.property_path);
            let present = doc.has(&binding.param_name);
            if binding.keep && !present {
                doc.set(&binding.param_name, &kept_value(&value));
            }
            self.trackers.push(Tracker::new(&value, present));
        }
        let written = HistoryStrategy::replace(browser, &doc.href());

        let listener = browser.on_navigate();
        self.listener = Some(listener);
        self.state = SyncState::Connected;
        debug!(target: "live_url::sync", listener, bindings = self.table.len(), "connected");
        Ok(written.then_some(HistoryMode::Replace))
    }

    // ── Render ────────────────────────────────────────────────────────────

    /// Project the bound fields into the URL after a render.
    ///
    /// The pass pushes a new history entry if any `history` binding's
    /// parameter changed, and replaces the current one otherwise. Nothing is
    /// written when the resulting URL equals the live one. After disconnect
    /// this is a no-op.
    pub fn render_finished<C, B>(&mut self, component: &C, browser: &mut B) -> Result<Option<HistoryMode>, SyncError>
    where
        C: ValueStore + ?Sized,
        B: BrowserHistory + ?Sized,
    {
        match self.state {
            SyncState::Uninitialized => return Err(SyncError::NotConnected),
            SyncState::Disconnected => return Ok(None),
            SyncState::Connected => {}
        }
        let mut doc = self.open(&*browser)?;
        let mut push = false;
        for (binding, tracker) in self.table.iter().zip(self.trackers.iter_mut()) {
            let value = component.get(&binding.property_path);
            let before = doc.get(&binding.param_name);
            project(&mut doc, binding, tracker, &value, self.options.empty_policy);
            if binding.history && doc.get(&binding.param_name) != before {
                trace!(target: "live_url::sync", param = binding.param_name.as_str(), "history field changed");
                push = true;
            }
            tracker.record(&value);
        }
        let mode = if push { HistoryMode::Push } else { HistoryMode::Replace };
        let written = HistoryStrategy::apply(browser, mode, &doc.href());
        Ok(written.then_some(mode))
    }

    // ── Navigation ────────────────────────────────────────────────────────

    /// Read the URL back into the model after back/forward navigation.
    ///
    /// A present parameter is coerced and written at its property path,
    /// mappings expanded into one write per leaf; model leaves it no longer
    /// covers are reset to `null`. An absent parameter resets every leaf the
    /// model has under its property path. Exactly one re-render follows.
    ///
    /// Events for another listener, or arriving while not connected, are
    /// ignored.
    pub fn navigated<C, B>(&mut self, listener: u64, component: &mut C, browser: &B) -> Result<NavigationOutcome, SyncError>
    where
        C: Component + ?Sized,
        B: BrowserHistory + ?Sized,
    {
        if self.state != SyncState::Connected || self.listener != Some(listener) {
            trace!(target: "live_url::sync", listener, "ignoring navigation");
            return Ok(NavigationOutcome::default());
        }
        let tree = self.open(browser)?.tree();
        let mut outcome = NavigationOutcome::default();
        for (binding, tracker) in self.table.iter().zip(self.trackers.iter_mut()) {
            let incoming = match tree.get(&binding.param_name) {
                Some(raw) => match coerce(binding, raw.clone()) {
                    Ok(value) => Some(value),
                    Err(err) => {
                        warn!(target: "live_url::sync", error = %err, "skipping parameter");
                        outcome.errors.push(err);
                        continue;
                    }
                },
                None => None,
            };
            for (path, value) in navigation_writes(binding, incoming, &*component) {
                component.set(&path, value.clone());
                outcome.writes.push((path, value));
            }
            tracker.record(&component.get(&binding.property_path));
        }
        component.request_render();
        outcome.rendered = true;
        debug!(target: "live_url::sync", writes = outcome.writes.len(), "applied navigation");
        Ok(outcome)
    }

    // ── Disconnect ────────────────────────────────────────────────────────

    /// Unsubscribe from navigation. Further passes leave the URL alone.
    pub fn disconnect<B: NavigationEvents + ?Sized>(&mut self, browser: &mut B) {
        if let Some(listener) = self.listener.take() {
            browser.off_navigate(listener);
            debug!(target: "live_url::sync", listener, "disconnected");
        }
        self.state = SyncState::Disconnected;
    }

    fn open<B: BrowserHistory + ?Sized>(&self, browser: &B) -> Result<QueryDocument, SyncError> {
        let doc = QueryDocument::parse(&browser.current_url())?;
        Ok(doc.with_list_style(self.options.list_style))
    }
}

/// The value a `keep` binding shows: itself, or `""` when deep-empty.
fn kept_value(value: &Value) -> Value {
    if is_deep_empty(value) {
        Value::String(String::new())
    } else {
        value.clone()
    }
}

fn project(
    doc: &mut QueryDocument,
    binding: &FieldBinding,
    tracker: &Tracker,
    value: &Value,
    policy: EmptyPolicy,
) {
    let param = binding.param_name.as_str();
    if binding.keep {
        doc.set(param, &kept_value(value));
        return;
    }
    if !is_deep_empty(value) {
        doc.set(param, value);
        return;
    }
    match policy {
        EmptyPolicy::Sticky if tracker.keeps_empty(value) => {
            doc.set(param, &Value::String(String::new()));
        }
        _ => doc.remove(param),
    }
}

fn navigation_writes<C: ValueStore + ?Sized>(
    binding: &FieldBinding,
    incoming: Option<Value>,
    component: &C,
) -> Vec<(String, Value)> {
    let path = binding.property_path.as_str();
    let current = leaf_paths(path, &component.get(path));
    let fresh = match incoming {
        Some(value) => leaf_paths(path, &value),
        None => Vec::new(),
    };
    let mut writes: Vec<(String, Value)> = current
        .into_iter()
        .filter(|(leaf, _)| component.has(leaf) && !fresh.iter().any(|(f, _)| f == leaf))
        .map(|(leaf, _)| (leaf, Value::Null))
        .collect();
    writes.extend(fresh);
    writes
}
