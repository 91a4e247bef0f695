use tower_lsp::{LspService, Server};
use tracing_subscriber::EnvFilter;

use super::{cli::try_cli_analyze, state::MlangLanguageServer};

pub async fn run() {
    if let Some(output) = try_cli_analyze().unwrap_or_else(|e| {
        eprintln!("mlang-lsp analyze error: {e}");
        std::process::exit(2);
    }) {
        println!("{}", output);
        return;
    }

    // stdout carries JSON-RPC
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(MlangLanguageServer::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}
