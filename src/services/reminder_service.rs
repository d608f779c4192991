use std::{
    str::FromStr,
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};

use chrono::{DateTime, TimeDelta, Utc};
use tokio::{runtime::Handle, task::JoinHandle};

use crate::{
    error::AppError,
    notify::{Notification, Notifier, Permission},
    storage::PersistentStore,
};

pub const DEFAULT_REMINDER_TITLE: &str = "¡No olvides tu carrito!";
pub const DEFAULT_REMINDER_BODY: &str = "Tienes productos esperando en tu carrito de Arturo.";

/// What to do when a reminder came due while the process was not running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissedReminderPolicy {
    Fire,
    Skip,
}

impl FromStr for MissedReminderPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fire" => Ok(Self::Fire),
            "skip" => Ok(Self::Skip),
            other => Err(AppError::BadRequest(format!(
                "unknown missed reminder policy `{other}`, expected `fire` or `skip`"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderState {
    Idle,
    Armed { deadline: DateTime<Utc> },
}

struct Inner {
    state: ReminderState,
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

#[derive(Clone)]
struct Delivery {
    notifier: Arc<dyn Notifier>,
    notification: Notification,
    record: Option<(PersistentStore, String)>,
}

impl Delivery {
    fn delivered(&self, deadline: DateTime<Utc>) -> bool {
        let Some((store, key)) = &self.record else {
            return false;
        };
        store
            .read(key)
            .and_then(|raw| String::from_utf8(raw).ok())
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .is_some_and(|millis| millis >= deadline.timestamp_millis())
    }

    // The deadline is recorded even when permission is missing; a denied
    // reminder counts as delivered.
    fn deliver(&self, deadline: DateTime<Utc>) {
        if let Some((store, key)) = &self.record {
            store.write(key, deadline.timestamp_millis().to_string().as_bytes());
        }
        match self.notifier.permission() {
            Permission::Granted => {
                if let Err(err) = self.notifier.show(&self.notification) {
                    tracing::warn!(error = %err, "cart reminder could not be shown");
                }
            }
            permission => {
                tracing::debug!(?permission, "cart reminder dropped, notifications not permitted");
            }
        }
    }
}

#[derive(Clone)]
pub struct ReminderScheduler {
    interval: Duration,
    delivery: Delivery,
    inner: Arc<Mutex<Inner>>,
}

impl ReminderScheduler {
    pub fn new(interval: Duration, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            interval,
            delivery: Delivery {
                notifier,
                notification: Notification::new(DEFAULT_REMINDER_TITLE, DEFAULT_REMINDER_BODY),
                record: None,
            },
            inner: Arc::new(Mutex::new(Inner {
                state: ReminderState::Idle,
                generation: 0,
                timer: None,
            })),
        }
    }

    /// Remember delivered deadlines under `key` so a restart does not repeat them.
    pub fn recording_to(mut self, store: PersistentStore, key: impl Into<String>) -> Self {
        self.delivery.record = Some((store, key.into()));
        self
    }

    pub fn state(&self) -> ReminderState {
        self.lock().state
    }

    pub fn deadline_for(&self, last_modified: DateTime<Utc>) -> DateTime<Utc> {
        let interval = TimeDelta::from_std(self.interval).unwrap_or(TimeDelta::MAX);
        last_modified
            .checked_add_signed(interval)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Replace any pending timer with one due at `last_modified + interval`.
    pub fn arm(&self, last_modified: DateTime<Utc>, now: DateTime<Utc>) {
        let deadline = self.deadline_for(last_modified);
        let delay = (deadline - now).to_std().unwrap_or(Duration::ZERO);
        self.schedule(deadline, delay);
    }

    /// Re-establish the timer after a restart from a persisted timestamp.
    pub fn resume(
        &self,
        last_modified: DateTime<Utc>,
        now: DateTime<Utc>,
        policy: MissedReminderPolicy,
    ) {
        let deadline = self.deadline_for(last_modified);
        if self.delivery.delivered(deadline) {
            tracing::debug!(%deadline, "cart reminder already delivered");
            self.cancel();
            return;
        }
        if deadline > now {
            self.arm(last_modified, now);
            return;
        }
        self.cancel();
        match policy {
            MissedReminderPolicy::Fire => {
                tracing::info!(%deadline, "cart reminder came due while closed, delivering now");
                self.delivery.deliver(deadline);
            }
            MissedReminderPolicy::Skip => {
                tracing::debug!(%deadline, "skipping cart reminder missed while closed");
            }
        }
    }

    pub fn cancel(&self) {
        let mut inner = self.lock();
        if let Some(timer) = inner.timer.take() {
            timer.abort();
        }
        if matches!(inner.state, ReminderState::Armed { .. }) {
            tracing::debug!("cart reminder cancelled");
        }
        inner.generation += 1;
        inner.state = ReminderState::Idle;
    }

    fn schedule(&self, deadline: DateTime<Utc>, delay: Duration) {
        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!("no async runtime available, cart reminder not scheduled");
            self.cancel();
            return;
        };

        let mut inner = self.lock();
        if let Some(timer) = inner.timer.take() {
            timer.abort();
        }
        inner.generation += 1;
        inner.state = ReminderState::Armed { deadline };

        let generation = inner.generation;
        let wake_at = tokio::time::Instant::now() + delay;
        let weak = Arc::downgrade(&self.inner);
        let delivery = self.delivery.clone();
        inner.timer = Some(runtime.spawn(async move {
            tokio::time::sleep_until(wake_at).await;
            fire(&weak, generation, &delivery, deadline);
        }));
        tracing::debug!(%deadline, delay_secs = delay.as_secs(), "cart reminder armed");
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn fire(inner: &Weak<Mutex<Inner>>, generation: u64, delivery: &Delivery, deadline: DateTime<Utc>) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    {
        let mut guard = inner.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.generation != generation || guard.state == ReminderState::Idle {
            return;
        }
        guard.state = ReminderState::Idle;
        guard.timer = None;
    }
    delivery.deliver(deadline);
}
