use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    clock::Clock,
    config::CartConfig,
    error::{AppError, AppResult},
    models::{CartLine, Product, ProductId, Receipt, from_cents},
    notify::Notifier,
    services::reminder_service::{ReminderScheduler, ReminderState},
    storage::PersistentStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn Fn(&[CartLine]) + Send + Sync>;

pub struct CartManager {
    lines: Vec<CartLine>,
    last_modified: Option<DateTime<Utc>>,
    config: CartConfig,
    store: PersistentStore,
    scheduler: ReminderScheduler,
    clock: Arc<dyn Clock>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl CartManager {
    /// Restore the persisted cart, or start empty.
    pub fn load(
        config: CartConfig,
        store: PersistentStore,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let permission = notifier.request_permission();
        tracing::debug!(?permission, "notification permission requested");

        let scheduler = ReminderScheduler::new(config.reminder_interval, notifier)
            .recording_to(store.clone(), config.reminded_key.clone());
        let mut lines: Vec<CartLine> = store.read_json(&config.cart_key).unwrap_or_default();
        normalize(&mut lines);

        let mut manager = Self {
            lines,
            last_modified: None,
            config,
            store,
            scheduler,
            clock,
            listeners: Vec::new(),
            next_listener: 0,
        };

        if manager.lines.is_empty() {
            manager.remove_entries();
            return manager;
        }

        let now = manager.clock.now();
        match read_timestamp(&manager.store, &manager.config.timestamp_key) {
            Some(last_modified) => {
                manager.last_modified = Some(last_modified);
                manager
                    .scheduler
                    .resume(last_modified, now, manager.config.missed_reminder);
            }
            None => {
                tracing::warn!("stored cart has no usable timestamp, treating it as modified now");
                manager.persist(now);
            }
        }
        tracing::info!(lines = manager.lines.len(), "cart restored");
        manager
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id == product_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    pub fn total_cents(&self) -> i64 {
        self.lines.iter().map(CartLine::subtotal_cents).sum()
    }

    pub fn total(&self) -> f64 {
        from_cents(self.total_cents())
    }

    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }

    pub fn reminder_deadline(&self) -> Option<DateTime<Utc>> {
        self.last_modified
            .map(|last_modified| self.scheduler.deadline_for(last_modified))
    }

    pub fn reminder_state(&self) -> ReminderState {
        self.scheduler.state()
    }

    /// A line whose quantity reaches zero or below is removed.
    pub fn add_line(&mut self, product: &Product, delta: i64) {
        let changed = match self.lines.iter().position(|line| line.id == product.id) {
            Some(index) => {
                let quantity = i64::from(self.lines[index].quantity).saturating_add(delta);
                if quantity <= 0 {
                    self.lines.remove(index);
                    tracing::debug!(product_id = product.id, "cart line removed");
                    true
                } else if let Ok(quantity) = u32::try_from(quantity) {
                    self.lines[index].quantity = quantity;
                    tracing::debug!(product_id = product.id, quantity, "cart line updated");
                    delta != 0
                } else {
                    tracing::warn!(
                        product_id = product.id,
                        delta,
                        "quantity overflow, cart line left unchanged"
                    );
                    false
                }
            }
            None if delta > 0 => match u32::try_from(delta) {
                Ok(quantity) => {
                    self.lines.push(CartLine::from_product(product, quantity));
                    tracing::debug!(product_id = product.id, quantity, "cart line added");
                    true
                }
                Err(_) => {
                    tracing::warn!(
                        product_id = product.id,
                        delta,
                        "quantity overflow, cart line not added"
                    );
                    false
                }
            },
            None => {
                tracing::debug!(product_id = product.id, delta, "ignoring non-positive delta for absent line");
                false
            }
        };
        self.sync(changed);
    }

    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) -> AppResult<()> {
        if quantity == 0 {
            return Err(AppError::BadRequest(
                "quantity must be greater than 0".to_string(),
            ));
        }
        let line = self.line(product_id).ok_or(AppError::NotFound)?;
        let delta = i64::from(quantity) - i64::from(line.quantity);
        let product = Product {
            id: line.id,
            name: line.name.clone(),
            price: line.price,
            category: line.category.clone(),
            image: line.image.clone(),
            description: line.description.clone(),
        };
        self.add_line(&product, delta);
        Ok(())
    }

    pub fn remove_line(&mut self, product_id: ProductId) {
        let before = self.lines.len();
        self.lines.retain(|line| line.id != product_id);
        let changed = self.lines.len() != before;
        if changed {
            tracing::debug!(product_id, "cart line removed");
        }
        self.sync(changed);
    }

    pub fn clear(&mut self) {
        let changed = !self.lines.is_empty();
        self.lines.clear();
        tracing::debug!("cart cleared");
        self.sync(changed);
    }

    /// Simulated payment: snapshot the cart into a receipt and empty it.
    pub fn checkout(&mut self) -> AppResult<Receipt> {
        if self.lines.is_empty() {
            return Err(AppError::BadRequest("Cart is empty".into()));
        }
        let placed_at = self.clock.now();
        let receipt = Receipt {
            reference: build_order_reference(placed_at),
            lines: self.lines.clone(),
            total_cents: self.total_cents(),
            total: self.total(),
            placed_at,
        };
        tracing::info!(reference = %receipt.reference, total = receipt.total, "checkout completed");
        self.clear();
        Ok(receipt)
    }

    pub fn on_change<F>(&mut self, listener: F) -> ListenerId
    where
        F: Fn(&[CartLine]) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    fn sync(&mut self, changed: bool) {
        if self.lines.is_empty() {
            self.remove_entries();
            self.last_modified = None;
            self.scheduler.cancel();
        } else if changed {
            let now = self.clock.now();
            self.persist(now);
        }
        if !changed {
            return;
        }
        for (_, listener) in &self.listeners {
            listener(&self.lines);
        }
    }

    fn persist(&mut self, now: DateTime<Utc>) {
        self.store.write_json(&self.config.cart_key, &self.lines);
        self.store.write(
            &self.config.timestamp_key,
            now.timestamp_millis().to_string().as_bytes(),
        );
        self.store.remove(&self.config.reminded_key);
        self.last_modified = Some(now);
        self.scheduler.arm(now, now);
    }

    fn remove_entries(&self) {
        self.store.remove(&self.config.cart_key);
        self.store.remove(&self.config.timestamp_key);
        self.store.remove(&self.config.reminded_key);
    }
}

impl Drop for CartManager {
    fn drop(&mut self) {
        self.scheduler.cancel();
    }
}

// Zero quantities and repeated ids are dropped; the first occurrence wins.
fn normalize(lines: &mut Vec<CartLine>) {
    let before = lines.len();
    let mut seen = std::collections::HashSet::new();
    lines.retain(|line| line.quantity > 0 && seen.insert(line.id));
    if lines.len() != before {
        tracing::warn!(dropped = before - lines.len(), "discarded invalid stored cart lines");
    }
}

fn read_timestamp(store: &PersistentStore, key: &str) -> Option<DateTime<Utc>> {
    let raw = store.read(key)?;
    let millis = std::str::from_utf8(&raw).ok()?.trim().parse::<i64>().ok()?;
    DateTime::from_timestamp_millis(millis)
}

fn build_order_reference(placed_at: DateTime<Utc>) -> String {
    format!("ART-{}", placed_at.format("%Y%m%d%H%M%S%3f"))
}
