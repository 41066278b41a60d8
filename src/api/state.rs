use std::sync::Arc;

use crate::service::StatsService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<StatsService>,
    /// Allowed CORS origin; `*` allows any.
    pub cors_origin: String,
}
