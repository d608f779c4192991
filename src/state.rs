use std::sync::Arc;

use crate::{
    clock::SystemClock,
    config::AppConfig,
    notify::{DisabledNotifier, Notifier, TracingNotifier},
    services::cart_service::CartManager,
    storage::{FileStore, PersistentStore},
};

/// One storefront session: the cart manager wired to on-disk storage.
pub struct AppState {
    pub cart: CartManager,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Self {
        let store = PersistentStore::new(Arc::new(FileStore::new(&config.store_dir)));
        let notifier: Arc<dyn Notifier> = if config.notifications {
            Arc::new(TracingNotifier)
        } else {
            Arc::new(DisabledNotifier)
        };
        let cart = CartManager::load(config.cart.clone(), store, notifier, Arc::new(SystemClock));
        Self { cart }
    }
}
