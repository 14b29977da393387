use eqnum_lsp::handlers::view;
use eqnum_lsp::server::Backend;
use tower_lsp_server::{LspService, Server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::build(Backend::new)
        .custom_method(
            view::DID_CHANGE_VISIBLE_RANGES,
            Backend::did_change_visible_ranges,
        )
        .custom_method(view::DID_CHANGE_SELECTION, Backend::did_change_selection)
        .custom_method(view::DID_CHANGE_FOCUS, Backend::did_change_focus)
        .finish();

    Server::new(stdin, stdout, socket).serve(service).await;
}
