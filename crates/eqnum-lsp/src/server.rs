use crate::config::EqnumConfig;
use crate::document::{
    ServerState, SyncContext, handle_document_change, handle_document_close, handle_document_open,
};
use crate::handlers::view::{self, FocusParams, SelectionParams, ViewUpdate, VisibleRangesParams};
use crate::handlers::{decorations, inlay_hints};
use eqnum_core::settings::Settings;
use eqnum_core::{ChangeScheduler, EquationSession, JsonFileSettingsStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower_lsp_server::ls_types::{
    DidChangeConfigurationParams, DidChangeTextDocumentParams, DidCloseTextDocumentParams,
    DidOpenTextDocumentParams, InitializeParams, InitializeResult, InitializedParams, InlayHint,
    InlayHintParams, MessageType, OneOf, ServerCapabilities, ServerInfo,
    TextDocumentSyncCapability, TextDocumentSyncKind, Uri,
};
use tower_lsp_server::{Client, LanguageServer, jsonrpc::Result};

pub struct Backend {
    pub(crate) client: Client,
    state: Arc<ServerState>,
    config: Arc<RwLock<EqnumConfig>>,
    session: Arc<RwLock<EquationSession>>,
    scheduler: ChangeScheduler<Uri>,
}

impl Backend {
    pub fn new(client: Client) -> Self {
        let config = EqnumConfig::default();
        let window = Duration::from_millis(config.sync.debounce_ms);
        let session = EquationSession::new(Settings {
            prefix: config.prefix.clone(),
        });

        let ctx = SyncContext {
            state: Arc::new(ServerState::new()),
            client: client.clone(),
            config: Arc::new(RwLock::new(config)),
            session: Arc::new(RwLock::new(session)),
        };
        let scheduler = ctx.scheduler(window);

        Self {
            client,
            state: ctx.state,
            config: ctx.config,
            session: ctx.session,
            scheduler,
        }
    }

    /// Get a reference to the LSP client (primarily for testing/benchmarking).
    #[doc(hidden)]
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Get the shared server state (primarily for testing/benchmarking).
    #[doc(hidden)]
    pub fn state(&self) -> &Arc<ServerState> {
        &self.state
    }

    async fn prefix(&self) -> String {
        self.session.read().await.prefix().to_string()
    }

    fn settings_store(config: &EqnumConfig) -> Option<JsonFileSettingsStore> {
        config.settings_file.as_ref().map(JsonFileSettingsStore::new)
    }

    /// Installs a new configuration and resynchronizes every open document.
    async fn apply_config(&self, config: EqnumConfig) {
        self.scheduler
            .set_window(Duration::from_millis(config.sync.debounce_ms));
        self.session.write().await.set_prefix(config.prefix.clone());
        *self.config.write().await = config;

        for uri in self.state.uris() {
            self.scheduler.trigger(uri);
        }
    }

    /// Folds a view update into the document and pushes what changed.
    async fn refresh_view(&self, uri: &Uri, update: ViewUpdate) {
        let prefix = self.prefix().await;
        let params = match view::apply_update(&self.state, uri, &update, &prefix) {
            Ok(Some(params)) => params,
            Ok(None) => return,
            Err(e) => {
                tracing::debug!("view update skipped: {}", e);
                return;
            }
        };

        let (decorations_enabled, hints_enabled) = {
            let config = self.config.read().await;
            (config.decorations.enabled, config.inlay_hints.enabled)
        };

        if decorations_enabled {
            decorations::publish(&self.client, params).await;
        }
        if hints_enabled && let Err(e) = self.client.inlay_hint_refresh().await {
            tracing::debug!("inlay_hint_refresh not supported: {:?}", e);
        }
    }

    pub async fn did_change_visible_ranges(&self, params: VisibleRangesParams) {
        tracing::trace!("visible ranges changed: {:?}", params.text_document.uri);
        self.refresh_view(
            &params.text_document.uri,
            ViewUpdate::VisibleRanges(params.ranges),
        )
        .await;
    }

    pub async fn did_change_selection(&self, params: SelectionParams) {
        tracing::trace!("selection changed: {:?}", params.text_document.uri);
        self.refresh_view(
            &params.text_document.uri,
            ViewUpdate::Selections(params.selections),
        )
        .await;
    }

    pub async fn did_change_focus(&self, params: FocusParams) {
        tracing::trace!(
            "focus changed: {:?} focused={}",
            params.text_document.uri,
            params.focused
        );
        self.refresh_view(&params.text_document.uri, ViewUpdate::Focus(params.focused))
            .await;
    }

    fn server_capabilities() -> ServerCapabilities {
        ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
            inlay_hint_provider: Some(OneOf::Left(true)),
            ..Default::default()
        }
    }
}

impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        tracing::info!("initializing eqnum-lsp server");

        let config = match params.initialization_options {
            Some(init_options) => match serde_json::from_value::<EqnumConfig>(init_options) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("invalid initialization options, using defaults: {}", e);
                    EqnumConfig::default()
                }
            },
            None => EqnumConfig::default(),
        };
        tracing::debug!("loaded configuration: {:?}", config);

        let fallback = Settings {
            prefix: config.prefix.clone(),
        };
        let session = match Self::settings_store(&config) {
            Some(store) => EquationSession::activate_or(&store, fallback).await,
            None => EquationSession::new(fallback),
        };

        self.scheduler
            .set_window(Duration::from_millis(config.sync.debounce_ms));
        *self.session.write().await = session;
        *self.config.write().await = config;

        Ok(InitializeResult {
            capabilities: Self::server_capabilities(),
            server_info: Some(ServerInfo {
                name: "eqnum-lsp".into(),
                version: Some(env!("CARGO_PKG_VERSION").into()),
            }),
            offset_encoding: None,
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        tracing::info!("eqnum-lsp server initialized");
        self.client
            .log_message(MessageType::INFO, "eqnum-lsp ready")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        tracing::info!("shutting down eqnum-lsp server");

        for uri in self.state.uris() {
            self.scheduler.cancel(&uri);
            if let Some(doc) = self.state.get_document(&uri) {
                doc.session.discard();
            }
        }

        let store = { Self::settings_store(&*self.config.read().await) };
        if let Some(store) = store {
            let session = self.session.read().await.clone();
            if let Err(e) = session.deactivate(&store).await {
                tracing::warn!("failed to save settings: {}", e);
            }
        }
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let document = params.text_document;
        handle_document_open(&self.state, document.uri.clone(), document.text, document.version);
        self.scheduler.trigger(document.uri);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;

        // Full sync: the last change carries the whole text.
        if let Some(change) = params.content_changes.into_iter().last()
            && handle_document_change(&self.state, &uri, change.text, version)
        {
            self.scheduler.trigger(uri.clone());
            self.refresh_view(&uri, ViewUpdate::DocumentChanged).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        tracing::info!("document closed: {:?}", uri);

        handle_document_close(&self.state, &self.scheduler, &uri);
        self.client.publish_diagnostics(uri, vec![], None).await;
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        let settings = match params.settings.get("eqnum") {
            Some(section) => section.clone(),
            None => params.settings,
        };

        match serde_json::from_value::<EqnumConfig>(settings) {
            Ok(config) => {
                tracing::info!("configuration changed");
                self.apply_config(config).await;
            }
            Err(e) => tracing::warn!("ignoring invalid configuration: {}", e),
        }
    }

    async fn inlay_hint(&self, params: InlayHintParams) -> Result<Option<Vec<InlayHint>>> {
        // Clone config before building hints to release the lock early
        let inlay_config = { self.config.read().await.inlay_hints.clone() };
        let prefix = self.prefix().await;

        Ok(Some(inlay_hints::handle_inlay_hints(
            Arc::clone(&self.state),
            &params,
            &inlay_config,
            &prefix,
        )))
    }
}
