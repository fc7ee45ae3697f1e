//! Browser history: the two terminal URL writes and back/forward events.

use std::collections::BTreeSet;

use tracing::{debug, trace};

/// Whether a URL write amends the current history entry or adds one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
    Replace,
    Push,
}

/// The browser's location and history stack.
pub trait BrowserHistory {
    /// The live URL, read fresh on every call.
    fn current_url(&self) -> String;
    fn replace(&mut self, url: &str);
    fn push(&mut self, url: &str);
}

/// Subscription to back/forward navigation.
pub trait NavigationEvents {
    /// Register a navigation listener; returns its id.
    fn on_navigate(&mut self) -> u64;
    /// Unregister a listener. Returns false if the id was not registered.
    fn off_navigate(&mut self, listener_id: u64) -> bool;
}

/// Writes a URL into history only when it differs from the live one.
pub struct HistoryStrategy;

impl HistoryStrategy {
    pub fn replace<H: BrowserHistory + ?Sized>(history: &mut H, url: &str) -> bool {
        Self::apply(history, HistoryMode::Replace, url)
    }

    pub fn push<H: BrowserHistory + ?Sized>(history: &mut H, url: &str) -> bool {
        Self::apply(history, HistoryMode::Push, url)
    }

    /// Returns whether anything was written.
    pub fn apply<H: BrowserHistory + ?Sized>(history: &mut H, mode: HistoryMode, url: &str) -> bool {
        if history.current_url() == url {
            trace!(target: "live_url::history", url, "URL unchanged");
            return false;
        }
        debug!(target: "live_url::history", ?mode, url, "writing URL");
        match mode {
            HistoryMode::Replace => history.replace(url),
            HistoryMode::Push => history.push(url),
        }
        true
    }
}

/// One write recorded by [`MemoryBrowser`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryWrite {
    pub mode: HistoryMode,
    pub url: String,
}

/// An in-memory history stack with navigation listeners.
///
/// `back` and `forward` move through the stack and return the ids of the
/// listeners to notify, which the host then feeds to its controllers.
///
/// # Example
///
/// ```
/// use live_url::{BrowserHistory, MemoryBrowser, NavigationEvents};
///
/// let mut browser = MemoryBrowser::new("https://example.com/");
/// let listener = browser.on_navigate();
/// browser.push("https://example.com/?page=2");
/// assert_eq!(browser.back(), vec![listener]);
/// assert_eq!(browser.current_url(), "https://example.com/");
/// assert!(browser.back().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryBrowser {
    entries: Vec<String>,
    cursor: usize,
    writes: Vec<HistoryWrite>,
    next_listener_id: u64,
    listeners: BTreeSet<u64>,
}

impl MemoryBrowser {
    pub fn new(url: &str) -> Self {
        Self {
            entries: vec![url.to_string()],
            cursor: 0,
            writes: Vec::new(),
            next_listener_id: 1,
            listeners: BTreeSet::new(),
        }
    }

    /// Change the URL outside of history writes, like an external script would.
    pub fn set_url(&mut self, url: &str) {
        if let Some(entry) = self.entries.get_mut(self.cursor) {
            *entry = url.to_string();
        } else {
            self.entries.push(url.to_string());
            self.cursor = self.entries.len() - 1;
        }
    }

    /// Move one entry back. Returns the listeners to notify, or nothing if
    /// already at the first entry.
    pub fn back(&mut self) -> Vec<u64> {
        if self.cursor == 0 {
            return Vec::new();
        }
        self.cursor -= 1;
        self.listeners.iter().copied().collect()
    }

    /// Move one entry forward. Returns the listeners to notify, or nothing if
    /// already at the last entry.
    pub fn forward(&mut self) -> Vec<u64> {
        if self.cursor + 1 >= self.entries.len() {
            return Vec::new();
        }
        self.cursor += 1;
        self.listeners.iter().copied().collect()
    }

    /// Every write, oldest first.
    pub fn writes(&self) -> &[HistoryWrite] {
        &self.writes
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl BrowserHistory for MemoryBrowser {
    fn current_url(&self) -> String {
        self.entries.get(self.cursor).cloned().unwrap_or_default()
    }

    fn replace(&mut self, url: &str) {
        self.set_url(url);
        self.writes.push(HistoryWrite {
            mode: HistoryMode::Replace,
            url: url.to_string(),
        });
    }

    fn push(&mut self, url: &str) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(url.to_string());
        self.cursor = self.entries.len() - 1;
        self.writes.push(HistoryWrite {
            mode: HistoryMode::Push,
            url: url.to_string(),
        });
    }
}

impl NavigationEvents for MemoryBrowser {
    fn on_navigate(&mut self) -> u64 {
        let id = self.next_listener_id.max(1);
        self.next_listener_id = id.saturating_add(1);
        self.listeners.insert(id);
        id
    }

    fn off_navigate(&mut self, listener_id: u64) -> bool {
        self.listeners.remove(&listener_id)
    }
}
