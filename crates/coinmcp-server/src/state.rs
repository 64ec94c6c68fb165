use coinmcp::{auth::ApiKeyAuth, extract::Extractor, router::ToolRouter, store::NoteStore};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<ApiKeyAuth>,
    pub router: Arc<ToolRouter>,
    pub extractor: Arc<Extractor>,
    pub store: Arc<dyn NoteStore>,
}

impl AppState {
    pub fn new(
        auth: ApiKeyAuth,
        router: ToolRouter,
        extractor: Extractor,
        store: Arc<dyn NoteStore>,
    ) -> Self {
        Self {
            auth: Arc::new(auth),
            router: Arc::new(router),
            extractor: Arc::new(extractor),
            store,
        }
    }
}
