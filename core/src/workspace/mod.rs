//! Per-document snapshots kept fresh as text changes, with cross-file symbol
//! lookup.
//!
//! Edits are debounced per document: each change bumps the document's edit
//! stamp and replaces its pending timer task. When a timer fires it analyzes
//! its text only if no newer edit arrived, and a stored snapshot is only ever
//! replaced by one at the same or a newer stamp.

mod config;
mod discovery;
mod semantic;
mod snapshot;

pub use config::IndexConfig;
pub use discovery::DiscoveryReport;
pub use snapshot::{DocumentSnapshot, analyze};

use std::{
    fs,
    path::Path,
    sync::{
        Arc, RwLock,
        atomic::{AtomicU64, Ordering},
    },
};

use dashmap::{DashMap, mapref::entry::Entry};
use tokio::{sync::mpsc, task::JoinHandle, time::sleep};
use tracing::{debug, info};
use url::Url;

use crate::{
    diagnostic::Diagnostic,
    visitor::{Definition, Reference},
};
use discovery::Discovery;

/// Published after every analysis that replaced a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexEvent {
    Diagnostics {
        uri: Url,
        version: u64,
        diagnostics: Vec<Diagnostic>,
    },
}

pub struct WorkspaceIndex {
    config: RwLock<IndexConfig>,
    documents: DashMap<Url, Arc<DocumentSnapshot>>,
    stamps: DashMap<Url, u64>,
    pending: DashMap<Url, JoinHandle<()>>,
    edits: AtomicU64,
    registrations: AtomicU64,
    events: mpsc::UnboundedSender<IndexEvent>,
}

impl WorkspaceIndex {
    pub fn new(config: IndexConfig) -> (Arc<Self>, mpsc::UnboundedReceiver<IndexEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let index = Arc::new(Self {
            config: RwLock::new(config),
            documents: DashMap::new(),
            stamps: DashMap::new(),
            pending: DashMap::new(),
            edits: AtomicU64::new(0),
            registrations: AtomicU64::new(0),
            events,
        });
        (index, receiver)
    }

    pub fn config(&self) -> IndexConfig {
        match self.config.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Takes effect on the next analysis; see [`WorkspaceIndex::revalidate_all`].
    pub fn set_config(&self, config: IndexConfig) {
        match self.config.write() {
            Ok(mut guard) => *guard = config,
            Err(poisoned) => *poisoned.into_inner() = config,
        }
    }

    pub fn snapshot(&self, uri: &Url) -> Option<Arc<DocumentSnapshot>> {
        self.documents.get(uri).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, uri: &Url) -> bool {
        self.documents.contains_key(uri)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// All snapshots in registration order.
    pub fn snapshots(&self) -> Vec<Arc<DocumentSnapshot>> {
        let mut all: Vec<_> = self.documents.iter().map(|e| Arc::clone(e.value())).collect();
        all.sort_by_key(|s| s.registration);
        all
    }

    /// Stamps come from one counter so a document that is closed and
    /// reopened never reuses a stamp a stale timer might still hold.
    fn bump_stamp(&self, uri: &Url) -> u64 {
        let stamp = self.edits.fetch_add(1, Ordering::Relaxed) + 1;
        self.stamps
            .entry(uri.clone())
            .and_modify(|current| *current = (*current).max(stamp))
            .or_insert(stamp);
        stamp
    }

    fn current_stamp(&self, uri: &Url) -> Option<u64> {
        self.stamps.get(uri).map(|s| *s)
    }

    fn defined_elsewhere(&self, uri: &Url) -> impl Fn(&str) -> bool + '_ {
        let uri = uri.clone();
        move |name: &str| {
            self.documents
                .iter()
                .any(|entry| *entry.key() != uri && entry.value().defines_at_file_level(name))
        }
    }

    fn build(&self, uri: &Url, text: String, version: u64, registration: u64) -> DocumentSnapshot {
        let config = self.config();
        let defined_elsewhere = self.defined_elsewhere(uri);
        analyze(uri.clone(), text, version, registration, &config, &defined_elsewhere)
    }

    /// Store unless the document was closed or a snapshot from a newer edit
    /// is already there. With `exact`, the snapshot must also match the
    /// latest edit stamp.
    ///
    /// The stamp guard is held across the insert so a concurrent
    /// [`WorkspaceIndex::close_document`] either waits for it or is seen here.
    fn store(&self, snapshot: DocumentSnapshot, exact: bool) -> Option<Arc<DocumentSnapshot>> {
        let uri = snapshot.uri.clone();
        let stamp = self.stamps.get(&uri);
        match stamp.as_deref() {
            None => {
                debug!(%uri, version = snapshot.version, "document closed, dropping analysis");
                return None;
            }
            Some(current) if exact && *current != snapshot.version => {
                debug!(%uri, version = snapshot.version, "analysis superseded while running");
                return None;
            }
            Some(_) => {}
        }
        let snapshot = Arc::new(snapshot);
        match self.documents.entry(uri) {
            Entry::Occupied(mut entry) => {
                if entry.get().version > snapshot.version {
                    debug!(uri = %snapshot.uri, version = snapshot.version, "dropping stale analysis");
                    return None;
                }
                entry.insert(Arc::clone(&snapshot));
            }
            Entry::Vacant(entry) => {
                entry.insert(Arc::clone(&snapshot));
            }
        }
        drop(stamp);
        Some(snapshot)
    }

    fn publish(&self, snapshot: &DocumentSnapshot) {
        // Nobody listening is fine
        let _ = self.events.send(IndexEvent::Diagnostics {
            uri: snapshot.uri.clone(),
            version: snapshot.version,
            diagnostics: snapshot.diagnostics.clone(),
        });
    }

    /// Analyze and store `text` if the document is unknown; otherwise return
    /// the existing snapshot untouched.
    pub fn register_document(&self, uri: Url, text: String) -> Arc<DocumentSnapshot> {
        if let Some(existing) = self.snapshot(&uri) {
            return existing;
        }
        let version = self.bump_stamp(&uri);
        let registration = self.registrations.fetch_add(1, Ordering::Relaxed);
        let snapshot = self.build(&uri, text, version, registration);
        match self.documents.entry(uri) {
            // Registered concurrently; the first one wins
            Entry::Occupied(entry) => Arc::clone(entry.get()),
            Entry::Vacant(entry) => {
                let snapshot = Arc::new(snapshot);
                entry.insert(Arc::clone(&snapshot));
                self.publish(&snapshot);
                snapshot
            }
        }
    }

    /// Schedule a re-analysis of `text` after the debounce period, replacing
    /// any analysis still waiting for this document. Must be called from
    /// within a tokio runtime.
    pub fn on_text_changed(self: &Arc<Self>, uri: Url, text: String) {
        let stamp = self.bump_stamp(&uri);
        let delay = self.config().debounce();
        let index = Arc::clone(self);
        let task_uri = uri.clone();
        let handle = tokio::spawn(async move {
            sleep(delay).await;
            index.reanalyze(&task_uri, text, stamp);
        });
        if let Some(previous) = self.pending.insert(uri, handle) {
            previous.abort();
        }
    }

    fn reanalyze(&self, uri: &Url, text: String, stamp: u64) {
        if self.current_stamp(uri) != Some(stamp) {
            debug!(%uri, stamp, "analysis superseded before start");
            return;
        }
        self.pending.remove_if(uri, |_, _| self.current_stamp(uri) == Some(stamp));

        let registration = match self.snapshot(uri) {
            Some(previous) => previous.registration,
            None => self.registrations.fetch_add(1, Ordering::Relaxed),
        };
        let snapshot = self.build(uri, text, stamp, registration);
        if let Some(stored) = self.store(snapshot, true) {
            self.publish(&stored);
        }
    }

    /// Cancel pending work for the document and forget it. The stamp goes
    /// first so an analysis already running cannot store it again.
    pub fn close_document(&self, uri: &Url) {
        if let Some((_, handle)) = self.pending.remove(uri) {
            handle.abort();
        }
        self.stamps.remove(uri);
        self.documents.remove(uri);
    }

    /// Definitions named `name` with the document holding each: those in
    /// `uri` first, then file-level ones from every other document in
    /// registration order.
    pub fn find_definitions(&self, uri: &Url, name: &str) -> Vec<(Url, Definition)> {
        let mut found: Vec<(Url, Definition)> = match self.snapshot(uri) {
            Some(local) => local.definitions_named(name).map(|d| (uri.clone(), d.clone())).collect(),
            None => Vec::new(),
        };
        for other in self.snapshots() {
            if other.uri == *uri {
                continue;
            }
            found.extend(
                other
                    .definitions_named(name)
                    .filter(|d| d.file_level)
                    .map(|d| (other.uri.clone(), d.clone())),
            );
        }
        found
    }

    /// Occurrences of `name` within `uri` only.
    pub fn find_references(&self, uri: &Url, name: &str) -> Vec<Reference> {
        self.snapshot(uri)
            .map(|s| s.references.iter().filter(|r| r.name == name).cloned().collect())
            .unwrap_or_default()
    }

    /// Register every matching file below `root`. Unreadable entries are
    /// reported and skipped.
    pub fn discover_workspace(&self, root: &Path) -> DiscoveryReport {
        let config = self.config();
        let matches = |path: &Path| config.matches_extension(path);
        let mut discovery = Discovery::new(&matches);
        discovery.walk(root);

        let mut report = DiscoveryReport {
            registered: Vec::new(),
            failed: discovery.failed,
        };
        for path in discovery.files {
            let text = match fs::read_to_string(&path) {
                Ok(text) => text,
                Err(err) => {
                    report.failed.push((path, err.to_string()));
                    continue;
                }
            };
            match Url::from_file_path(&path) {
                Ok(uri) => {
                    self.register_document(uri.clone(), text);
                    report.registered.push(uri);
                }
                Err(()) => report.failed.push((path, "not an absolute path".to_string())),
            }
        }
        info!(
            root = %root.display(),
            registered = report.registered.len(),
            failed = report.failed.len(),
            "workspace discovery finished"
        );
        report
    }

    /// Re-run analysis on every document with the current configuration.
    /// Pending edits are left alone and will still land afterwards.
    pub fn revalidate_all(&self) {
        for previous in self.snapshots() {
            let snapshot = self.build(
                &previous.uri,
                previous.text.clone(),
                previous.version,
                previous.registration,
            );
            if let Some(stored) = self.store(snapshot, false) {
                self.publish(&stored);
            }
        }
    }

    pub fn shutdown(&self) {
        let uris: Vec<Url> = self.pending.iter().map(|e| e.key().clone()).collect();
        for uri in uris {
            if let Some((_, handle)) = self.pending.remove(&uri) {
                handle.abort();
            }
        }
        info!("workspace index shut down");
    }
}
