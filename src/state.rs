use std::sync::Arc;

use crate::database::Store;
use crate::services::ViewInvalidator;

/// Shared handles every request gets through axum `State`
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub views: ViewInvalidator,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            views: ViewInvalidator::default(),
        }
    }
}
