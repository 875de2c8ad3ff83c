use std::sync::Arc;

use destress_core::catalog::DomainCatalog;
use destress_core::plan::PlanSynthesizer;

use crate::sessions::SessionStore;

#[derive(Clone)]
pub struct AppState {
    /// Read-only, shared across all sessions without synchronization
    pub catalog: Arc<DomainCatalog>,
    pub sessions: SessionStore,
    pub synthesizer: Arc<PlanSynthesizer>,
}
