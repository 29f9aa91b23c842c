use std::sync::Arc;

use crate::config::Config;
use crate::observability::RetentionMetrics;

use super::models::SchedulerStatus;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub metrics: Arc<RetentionMetrics>,
    pub scheduler: SchedulerStatus,
}

impl AppState {
    pub fn new(config: Config, metrics: Arc<RetentionMetrics>, scheduler: SchedulerStatus) -> Self {
        Self {
            config: Arc::new(config),
            metrics,
            scheduler,
        }
    }
}
