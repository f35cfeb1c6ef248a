use std::sync::Arc;

use crate::database::store::TransactionalStore;
use crate::services::{MapService, ZoneService};

/// Shared handler state: the services plus the store they run on
#[derive(Clone)]
pub struct AppState {
    pub maps: MapService,
    pub zones: ZoneService,
    pub store: Arc<dyn TransactionalStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn TransactionalStore>) -> Self {
        Self {
            maps: MapService::new(store.clone()),
            zones: ZoneService::new(store.clone()),
            store,
        }
    }
}
