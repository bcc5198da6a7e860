use std::sync::Arc;

use grabbit_core::{Config, DecisionStore, SanitizedConfig, Scheduler, Searcher};

/// Shared application state
pub struct AppState {
    config: Config,
    store: Arc<dyn DecisionStore>,
    searcher: Option<Arc<dyn Searcher>>,
    scheduler: Arc<Scheduler>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn DecisionStore>,
        searcher: Option<Arc<dyn Searcher>>,
        scheduler: Arc<Scheduler>,
    ) -> Self {
        Self {
            config,
            store,
            searcher,
            scheduler,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn store(&self) -> &Arc<dyn DecisionStore> {
        &self.store
    }

    pub fn searcher(&self) -> Option<&Arc<dyn Searcher>> {
        self.searcher.as_ref()
    }

    pub fn scheduler(&self) -> &Arc<Scheduler> {
        &self.scheduler
    }
}
