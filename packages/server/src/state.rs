use std::sync::Arc;

use crate::config::AppConfig;
use crate::manager::CatalogueManager;

#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<CatalogueManager>,
    pub config: AppConfig,
}
