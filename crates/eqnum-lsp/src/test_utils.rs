//! Test utilities for creating mock LSP clients and contexts.

#[cfg(test)]
pub(crate) mod test_helpers {
    use crate::config::EqnumConfig;
    use crate::document::{ServerState, SyncContext};
    use crate::server::Backend;
    use eqnum_core::EquationSession;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// Creates a synchronization context around a client with no peer.
    ///
    /// Requests sent through it never get an answer, so tests only use it on
    /// paths that return before talking to the client.
    pub fn create_test_context() -> SyncContext {
        let (service, _socket) = tower_lsp_server::LspService::build(Backend::new).finish();
        SyncContext {
            state: Arc::new(ServerState::new()),
            client: service.inner().client().clone(),
            config: Arc::new(RwLock::new(EqnumConfig::default())),
            session: Arc::new(RwLock::new(EquationSession::default())),
        }
    }
}
