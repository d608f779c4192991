#![allow(dead_code)]

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use arturo_cart::{
    clock::Clock,
    config::CartConfig,
    error::AppResult,
    models::{Product, ProductId},
    notify::{Notification, Notifier, Permission},
    services::cart_service::CartManager,
    storage::{MemoryStore, PersistentStore},
};
use chrono::{DateTime, TimeDelta, Utc};

pub const DAY: Duration = Duration::from_secs(24 * 60 * 60);

pub struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    pub fn at(now: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self(Mutex::new(now)))
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap();
        *now += TimeDelta::from_std(by).unwrap();
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

pub struct RecordingNotifier {
    permission: Permission,
    shown: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new(permission: Permission) -> Arc<Self> {
        Arc::new(Self {
            permission,
            shown: Mutex::new(Vec::new()),
        })
    }

    pub fn shown(&self) -> Vec<Notification> {
        self.shown.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn request_permission(&self) -> Permission {
        self.permission
    }

    fn permission(&self) -> Permission {
        self.permission
    }

    fn show(&self, notification: &Notification) -> AppResult<()> {
        self.shown.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

pub struct Harness {
    pub medium: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub notifier: Arc<RecordingNotifier>,
    pub config: CartConfig,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_medium(Arc::new(MemoryStore::new()))
    }

    pub fn with_medium(medium: Arc<MemoryStore>) -> Self {
        Self {
            medium,
            clock: ManualClock::at(t0()),
            notifier: RecordingNotifier::new(Permission::Granted),
            config: CartConfig::default(),
        }
    }

    pub fn manager(&self) -> CartManager {
        CartManager::load(
            self.config.clone(),
            PersistentStore::new(self.medium.clone()),
            self.notifier.clone(),
            self.clock.clone(),
        )
    }

    /// Move the wall clock and the paused tokio clock forward together.
    pub async fn advance(&self, by: Duration) {
        self.clock.advance(by);
        tokio::time::advance(by).await;
        settle().await;
    }
}

pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

pub fn t0() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(1_700_000_000_000).unwrap()
}

pub fn product(id: ProductId, price: f64) -> Product {
    Product {
        id,
        name: format!("Producto {id}"),
        price,
        category: "Camisas".into(),
        image: format!("/images/{id}.webp"),
        description: format!("Descripción {id}"),
    }
}
