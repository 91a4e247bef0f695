use std::path::PathBuf;
use std::sync::Arc;

use mlang_core::{DocumentSnapshot, IndexEvent, WorkspaceIndex};
use ropey::Rope;
use tokio::sync::mpsc::UnboundedReceiver;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};
use tracing::{debug, info, warn};

use super::{
    completion::{completion_items, resolve_item, ResolveData},
    convert::{to_lsp_diagnostics, to_lsp_range},
    state::{Document, MlangLanguageServer},
    text::{apply_incremental_change_rope, position_to_line_column, word_at},
    utils::compute_content_hash,
};

#[tower_lsp::async_trait]
impl LanguageServer for MlangLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        #[allow(deprecated)]
        let root_uri = params.root_uri.clone();
        info!("mlang language server initializing with root {:?}", root_uri);

        let mut roots: Vec<PathBuf> = params
            .workspace_folders
            .unwrap_or_default()
            .iter()
            .filter_map(|folder| folder.uri.to_file_path().ok())
            .collect();
        if roots.is_empty() {
            if let Some(root) = root_uri.and_then(|uri| uri.to_file_path().ok()) {
                roots.push(root);
            }
        }
        if let Ok(mut guard) = self.workspace_roots.lock() {
            *guard = roots;
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::INCREMENTAL)),
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(true),
                    trigger_characters: None,
                    work_done_progress_options: Default::default(),
                    all_commit_characters: None,
                    completion_item: None,
                }),
                definition_provider: Some(OneOf::Left(true)),
                references_provider: Some(OneOf::Left(true)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "mlang language server".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        info!("mlang language server initialized");
        let events = self.events.lock().ok().and_then(|mut guard| guard.take());
        if let Some(events) = events {
            tokio::spawn(forward_diagnostics(self.client.clone(), self.index.clone(), events));
        }

        self.load_config().await;

        let roots = self.workspace_roots.lock().map(|g| g.clone()).unwrap_or_default();
        for root in roots {
            let index = self.index.clone();
            let scan_root = root.clone();
            match tokio::task::spawn_blocking(move || index.discover_workspace(&scan_root)).await {
                Ok(report) => {
                    for (path, reason) in &report.failed {
                        warn!("could not index {}: {}", path.display(), reason);
                    }
                    let _ = self
                        .client
                        .log_message(
                            MessageType::INFO,
                            format!("mlang: indexed {} files in {}", report.registered.len(), root.display()),
                        )
                        .await;
                }
                Err(err) => warn!("workspace discovery task failed: {err}"),
            }
        }
    }

    async fn shutdown(&self) -> Result<()> {
        info!("mlang language server shutting down");
        self.index.shutdown();
        Ok(())
    }

    async fn did_change_configuration(&self, _params: DidChangeConfigurationParams) {
        if self.load_config().await {
            let index = self.index.clone();
            if let Err(err) = tokio::task::spawn_blocking(move || index.revalidate_all()).await {
                warn!("revalidation task failed: {err}");
            }
        }
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let text = params.text_document.text;
        self.documents.insert(
            uri.clone(),
            Document {
                content: Rope::from_str(&text),
                version: params.text_document.version,
                content_hash: compute_content_hash(&text),
            },
        );

        // Already known from discovery with the same text: nothing to redo
        let snapshot = self.index.register_document(uri.clone(), text.clone());
        if snapshot.text != text {
            self.index.on_text_changed(uri, text);
        }
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let text = {
            let Some(mut entry) = self.documents.get_mut(&uri) else {
                warn!("change for unopened document {uri}");
                return;
            };
            entry.version = params.text_document.version;
            for change in &params.content_changes {
                apply_incremental_change_rope(&mut entry.content, change);
            }
            let text = entry.content.to_string();
            let hash = compute_content_hash(&text);
            if hash == entry.content_hash {
                debug!("content unchanged for {uri} at version {}, skipping analysis", entry.version);
                return;
            }
            entry.content_hash = hash;
            text
        };
        self.index.on_text_changed(uri, text);
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents.remove(&uri);
        self.index.close_document(&uri);
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }

    async fn goto_definition(&self, params: GotoDefinitionParams) -> Result<Option<GotoDefinitionResponse>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        let Some((snapshot, name)) = self.symbol_at(uri, position) else {
            return Ok(None);
        };

        let mut locations = Vec::new();
        for (target_uri, definition) in self.index.find_definitions(uri, &name) {
            let target = if target_uri == snapshot.uri {
                Some(snapshot.clone())
            } else {
                self.index.snapshot(&target_uri)
            };
            if let Some(target) = target {
                let rope = Rope::from_str(&target.text);
                locations.push(Location::new(target_uri, to_lsp_range(&rope, &definition.range)));
            }
        }
        Ok(match locations.len() {
            0 => None,
            1 => locations.pop().map(GotoDefinitionResponse::Scalar),
            _ => Some(GotoDefinitionResponse::Array(locations)),
        })
    }

    async fn references(&self, params: ReferenceParams) -> Result<Option<Vec<Location>>> {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        let Some((snapshot, name)) = self.symbol_at(uri, position) else {
            return Ok(None);
        };

        let rope = Rope::from_str(&snapshot.text);
        let locations: Vec<Location> = self
            .index
            .find_references(uri, &name)
            .iter()
            .map(|r| Location::new(uri.clone(), to_lsp_range(&rope, &r.range)))
            .collect();
        Ok((!locations.is_empty()).then_some(locations))
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = &params.text_document_position.text_document.uri;
        let definitions = self
            .index
            .snapshot(uri)
            .map(|s| s.definitions.clone())
            .unwrap_or_default();
        Ok(Some(CompletionResponse::Array(completion_items(uri, &definitions))))
    }

    async fn completion_resolve(&self, item: CompletionItem) -> Result<CompletionItem> {
        let Some(data) = item
            .data
            .clone()
            .and_then(|value| serde_json::from_value::<ResolveData>(value).ok())
        else {
            return Ok(item);
        };
        let definitions = self.index.find_definitions(&data.uri, &data.name);
        let best = definitions
            .iter()
            .map(|(_, d)| d)
            .find(|d| d.documentation.is_some())
            .or_else(|| definitions.first().map(|(_, d)| d));
        Ok(resolve_item(item, best))
    }
}

impl MlangLanguageServer {
    /// Snapshot of `uri` and the name under the cursor, preferring the
    /// analyzed reference and falling back to the raw text.
    fn symbol_at(&self, uri: &Url, position: Position) -> Option<(Arc<DocumentSnapshot>, String)> {
        let snapshot = self.index.snapshot(uri)?;
        let rope = match self.documents.get(uri) {
            Some(doc) => doc.content.clone(),
            None => Rope::from_str(&snapshot.text),
        };
        let (line, column) = position_to_line_column(&rope, position);
        let name = match snapshot.reference_at(line, column) {
            Some(reference) => reference.name.clone(),
            None => word_at(&rope, position)?,
        };
        Some((snapshot, name))
    }
}

/// Publish every analysis result to the client for the life of the server.
/// Ranges are converted against the snapshot the diagnostics came from; an
/// event whose snapshot was already replaced is dropped since a newer event
/// follows.
async fn forward_diagnostics(client: Client, index: Arc<WorkspaceIndex>, mut events: UnboundedReceiver<IndexEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            IndexEvent::Diagnostics { uri, version, diagnostics } => {
                let Some(snapshot) = index.snapshot(&uri).filter(|s| s.version == version) else {
                    debug!(%uri, version, "skipping diagnostics for replaced snapshot");
                    continue;
                };
                debug!(%uri, version, count = diagnostics.len(), "publishing diagnostics");
                let lsp_diagnostics = to_lsp_diagnostics(&snapshot.text, &diagnostics);
                client.publish_diagnostics(uri, lsp_diagnostics, None).await;
            }
        }
    }
}
