//! New-booking notification poller.
//!
//! - Polls the booking list on a fixed interval (and once right away)
//! - Remembers every booking id it has seen, across restarts
//! - Raises one notification per detection batch for confirmed/paid bookings
//! - Sounds the alert tone until the notification is dismissed or times out
//!
//! The poller owns the seen set, the active notification, the auto-dismiss
//! timer and the alert tone. UI surfaces read the notification through
//! [`BookingNotifier::subscribe`] and report operator actions through
//! [`BookingNotifier::dismiss`].

use std::{
    collections::HashSet,
    sync::{Arc, Weak},
    time::Duration,
};

use tokio::{
    sync::{watch, Mutex},
    time::{sleep, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    alert::AlertTone,
    config::Config,
    domain::{Booking, BookingId},
    ports::BookingApi,
    seen::SeenBookings,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NotifierConfig {
    pub poll_interval: Duration,
    /// How long a notification stays up when nobody dismisses it.
    pub notification_dwell: Duration,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            notification_dwell: Duration::from_secs(60),
        }
    }
}

impl From<&Config> for NotifierConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            poll_interval: cfg.poll_interval,
            notification_dwell: cfg.notification_dwell,
        }
    }
}

/// The single active new-booking notification.
#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    /// Representative booking: the last alertable one in fetch order.
    pub booking: Booking,
    /// Alertable bookings detected in the same cycle.
    pub batch_size: usize,
    pub raised_at: Instant,
    pub dismiss_at: Instant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DismissReason {
    Timeout,
    Closed,
    ViewDetails,
    ContactGuest,
}

impl DismissReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Closed => "closed",
            Self::ViewDetails => "view_details",
            Self::ContactGuest => "contact_guest",
        }
    }
}

/// What a single poll cycle did.
#[derive(Clone, Debug, PartialEq)]
pub enum PollOutcome {
    /// A previous cycle was still in flight.
    Skipped,
    /// Fetch failed; nothing changed. The next scheduled cycle retries.
    FetchFailed,
    /// The API returned no bookings.
    Empty,
    /// Cold start: the seen set was empty and got seeded without alerting.
    Seeded { count: usize },
    /// Nothing new.
    Unchanged,
    /// New bookings recorded, none of them alertable.
    Recorded { new_count: usize },
    /// New alertable booking(s); a notification is up.
    Alerted { booking: Booking, new_count: usize },
}

#[derive(Clone)]
pub struct BookingNotifier {
    inner: Arc<NotifierInner>,
}

struct NotifierInner {
    api: Arc<dyn BookingApi>,
    alert: Arc<AlertTone>,
    cfg: NotifierConfig,
    state: Mutex<NotifierState>,
    // Held for the duration of a cycle; a busy lock means "skip this tick".
    cycle: Mutex<()>,
    notification: watch::Sender<Option<Notification>>,
    shutdown: CancellationToken,
}

struct NotifierState {
    seen: SeenBookings,
    // Bumped whenever the active notification changes, so a stale dismiss
    // timer can tell it no longer owns the notification.
    generation: u64,
    dismiss_timer: Option<CancellationToken>,
}

impl BookingNotifier {
    pub fn new(
        api: Arc<dyn BookingApi>,
        seen: SeenBookings,
        alert: Arc<AlertTone>,
        cfg: NotifierConfig,
    ) -> Self {
        let (notification, _) = watch::channel(None);
        Self {
            inner: Arc::new(NotifierInner {
                api,
                alert,
                cfg,
                state: Mutex::new(NotifierState {
                    seen,
                    generation: 0,
                    dismiss_timer: None,
                }),
                cycle: Mutex::new(()),
                notification,
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Notification updates for the UI surface (`None` = nothing showing).
    pub fn subscribe(&self) -> watch::Receiver<Option<Notification>> {
        self.inner.notification.subscribe()
    }

    pub fn current(&self) -> Option<Notification> {
        self.inner.notification.borrow().clone()
    }

    pub fn alert(&self) -> Arc<AlertTone> {
        self.inner.alert.clone()
    }

    pub async fn seen_count(&self) -> usize {
        self.inner.state.lock().await.seen.len()
    }

    pub async fn has_seen(&self, id: &BookingId) -> bool {
        self.inner.state.lock().await.seen.contains(id)
    }

    /// Polls every `poll_interval` (first cycle immediately) until `cancel`
    /// fires or [`shutdown`](Self::shutdown) is called, then tears down.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut tick = tokio::time::interval(self.inner.cfg.poll_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            interval_ms = self.inner.cfg.poll_interval.as_millis() as u64,
            "booking notifier started"
        );

        loop {
            tokio::select! {
              _ = cancel.cancelled() => break,
              _ = self.inner.shutdown.cancelled() => break,
              _ = tick.tick() => {
                tokio::select! {
                  _ = cancel.cancelled() => break,
                  _ = self.inner.shutdown.cancelled() => break,
                  outcome = self.poll_cycle() => {
                    debug!(?outcome, "poll cycle finished");
                  }
                }
              }
            }
        }

        self.shutdown().await;
    }

    /// One poll: fetch, diff against the seen set, maybe notify.
    pub async fn poll_cycle(&self) -> PollOutcome {
        let Ok(_cycle) = self.inner.cycle.try_lock() else {
            debug!("previous poll still in flight, skipping");
            return PollOutcome::Skipped;
        };

        let bookings = match self.inner.api.list_bookings().await {
            Ok(b) => b,
            Err(e) => {
                warn!(error = %e, "booking poll failed");
                return PollOutcome::FetchFailed;
            }
        };

        if bookings.is_empty() {
            return PollOutcome::Empty;
        }

        let mut state = self.inner.state.lock().await;

        if state.seen.is_empty() {
            let ids = bookings.iter().map(|b| b.id.clone());
            if let Err(e) = state.seen.insert_all_and_persist(ids).await {
                warn!(error = %e, "failed to persist seen bookings");
            }
            let count = state.seen.len();
            info!(count, "seeded seen bookings on cold start");
            return PollOutcome::Seeded { count };
        }

        // A fetch may list the same id twice; count it once.
        let mut fresh_ids: HashSet<&BookingId> = HashSet::new();
        let fresh: Vec<&Booking> = bookings
            .iter()
            .filter(|b| !state.seen.contains(&b.id) && fresh_ids.insert(&b.id))
            .collect();
        if fresh.is_empty() {
            return PollOutcome::Unchanged;
        }

        let new_count = fresh.len();
        let alertable: Vec<&Booking> = fresh
            .iter()
            .copied()
            .filter(|b| b.status.is_alertable())
            .collect();
        let representative = alertable.last().map(|b| (*b).clone());
        let batch_size = alertable.len();

        let ids: Vec<BookingId> = fresh.iter().map(|b| b.id.clone()).collect();
        if let Err(e) = state.seen.insert_all_and_persist(ids).await {
            warn!(error = %e, "failed to persist seen bookings");
        }

        let Some(booking) = representative else {
            debug!(new_count, "new bookings recorded, none alertable");
            return PollOutcome::Recorded { new_count };
        };

        info!(
            booking_id = %booking.id,
            guest = %booking.guest_name,
            batch_size,
            "new booking detected"
        );
        self.raise(&mut state, booking.clone(), batch_size);

        PollOutcome::Alerted { booking, new_count }
    }

    /// Clears the active notification, stops the tone and cancels the
    /// auto-dismiss timer. Returns what was showing, if anything.
    pub async fn dismiss(&self, reason: DismissReason) -> Option<Notification> {
        let mut state = self.inner.state.lock().await;
        self.dismiss_locked(&mut state, reason)
    }

    /// Teardown: stops the schedule, the dismiss timer and the tone.
    pub async fn shutdown(&self) {
        self.inner.shutdown.cancel();
        let mut state = self.inner.state.lock().await;
        if let Some(timer) = state.dismiss_timer.take() {
            timer.cancel();
        }
        state.generation = state.generation.wrapping_add(1);
        self.inner.notification.send_replace(None);
        self.inner.alert.stop();
        debug!("booking notifier shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }

    fn raise(&self, state: &mut NotifierState, booking: Booking, batch_size: usize) {
        state.generation = state.generation.wrapping_add(1);
        let generation = state.generation;

        if let Some(timer) = state.dismiss_timer.take() {
            timer.cancel();
        }

        let dwell = self.inner.cfg.notification_dwell;
        let raised_at = Instant::now();
        let timer = CancellationToken::new();
        let timer_task = timer.clone();
        let weak: Weak<NotifierInner> = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            tokio::select! {
              _ = timer_task.cancelled() => {}
              _ = sleep(dwell) => {
                if let Some(inner) = weak.upgrade() {
                    BookingNotifier { inner }.expire(generation).await;
                }
              }
            }
        });
        state.dismiss_timer = Some(timer);

        self.inner.notification.send_replace(Some(Notification {
            booking,
            batch_size,
            raised_at,
            dismiss_at: raised_at + dwell,
        }));
        self.inner.alert.start();
    }

    async fn expire(&self, generation: u64) {
        let mut state = self.inner.state.lock().await;
        if state.generation != generation {
            return;
        }
        self.dismiss_locked(&mut state, DismissReason::Timeout);
    }

    fn dismiss_locked(
        &self,
        state: &mut NotifierState,
        reason: DismissReason,
    ) -> Option<Notification> {
        if let Some(timer) = state.dismiss_timer.take() {
            timer.cancel();
        }
        state.generation = state.generation.wrapping_add(1);
        self.inner.alert.stop();

        let previous = self.inner.notification.send_replace(None);
        if let Some(n) = &previous {
            info!(booking_id = %n.booking.id, reason = reason.as_str(), "notification dismissed");
        }
        previous
    }
}
