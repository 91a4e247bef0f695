use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use mlang_core::{IndexConfig, IndexEvent, WorkspaceIndex};
use ropey::Rope;
use tokio::sync::mpsc::UnboundedReceiver;
use tower_lsp::lsp_types::Url;
use tower_lsp::Client;

/// Editor-side copy of an open document. The index keeps its own snapshot;
/// this rope is what incremental edits are applied to.
#[derive(Debug)]
pub(crate) struct Document {
    pub(crate) content: Rope,
    pub(crate) version: i32,
    pub(crate) content_hash: u64,
}

/// Primary LSP server state shared across handlers.
pub(crate) struct MlangLanguageServer {
    pub(crate) client: Client,
    pub(crate) documents: Arc<DashMap<Url, Document>>,
    pub(crate) index: Arc<WorkspaceIndex>,
    /// Taken once by `initialized` to start forwarding diagnostics
    pub(crate) events: Mutex<Option<UnboundedReceiver<IndexEvent>>>,
    pub(crate) workspace_roots: Mutex<Vec<PathBuf>>,
}

impl MlangLanguageServer {
    pub(crate) fn new(client: Client) -> Self {
        let (index, events) = WorkspaceIndex::new(IndexConfig::default());
        Self {
            client,
            documents: Arc::new(DashMap::new()),
            index,
            events: Mutex::new(Some(events)),
            workspace_roots: Mutex::new(Vec::new()),
        }
    }
}
