//! Audio alert driver for new-booking notifications.
//!
//! The tone is a repeating on/off pulse that keeps going until [`AlertTone::stop`]
//! is called. Output stays muted until the operator has interacted with the
//! console once ([`AlertTone::unlock`]); before that the cycle runs silently so
//! the visual notification is unaffected.

use std::{
    io::Write,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use tokio::{task::JoinHandle, time::sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::ports::ToneSink;

pub struct AlertTone {
    sink: Arc<dyn ToneSink>,
    pulse: Duration,
    unlocked: Arc<AtomicBool>,
    active: Mutex<Option<ActiveTone>>,
}

struct ActiveTone {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl AlertTone {
    pub fn new(sink: Arc<dyn ToneSink>, pulse: Duration) -> Self {
        Self {
            sink,
            pulse,
            unlocked: Arc::new(AtomicBool::new(false)),
            active: Mutex::new(None),
        }
    }

    /// Starts the tone cycle. Returns `false` if it was already sounding.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> bool {
        let Ok(mut active) = self.active.lock() else {
            return false;
        };
        if active.is_some() {
            return false;
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(pulse_loop(
            self.sink.clone(),
            self.pulse,
            self.unlocked.clone(),
            cancel.clone(),
        ));
        *active = Some(ActiveTone { cancel, handle });
        info!(audible = self.is_unlocked(), "alert tone started");
        true
    }

    /// Stops the tone cycle and releases its task. Safe to call when idle;
    /// returns whether anything was sounding.
    pub fn stop(&self) -> bool {
        let tone = match self.active.lock() {
            Ok(mut active) => active.take(),
            Err(_) => None,
        };
        let Some(tone) = tone else {
            return false;
        };

        tone.cancel.cancel();
        tone.handle.abort();
        if self.is_unlocked() {
            self.sink.pulse_off();
        }
        info!("alert tone stopped");
        true
    }

    pub fn is_sounding(&self) -> bool {
        self.active
            .lock()
            .map(|a| a.as_ref().is_some_and(|t| !t.handle.is_finished()))
            .unwrap_or(false)
    }

    /// Allows the tone to reach the sink. Returns `true` on the first call only.
    pub fn unlock(&self) -> bool {
        let first = !self.unlocked.swap(true, Ordering::SeqCst);
        if first {
            debug!("alert audio unlocked");
        }
        first
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked.load(Ordering::SeqCst)
    }
}

impl Drop for AlertTone {
    fn drop(&mut self) {
        if let Ok(mut active) = self.active.lock() {
            if let Some(tone) = active.take() {
                tone.cancel.cancel();
                tone.handle.abort();
            }
        }
    }
}

async fn pulse_loop(
    sink: Arc<dyn ToneSink>,
    pulse: Duration,
    unlocked: Arc<AtomicBool>,
    cancel: CancellationToken,
) {
    loop {
        let audible = unlocked.load(Ordering::SeqCst);
        if audible {
            sink.pulse_on();
        }
        tokio::select! {
          _ = cancel.cancelled() => break,
          _ = sleep(pulse) => {}
        }
        if audible {
            sink.pulse_off();
        }
        tokio::select! {
          _ = cancel.cancelled() => break,
          _ = sleep(pulse) => {}
        }
    }
}

/// One-shot listener that unlocks the alert on the first operator
/// interaction and then detaches itself.
pub struct InteractionUnlock {
    target: Option<Arc<AlertTone>>,
}

impl InteractionUnlock {
    pub fn new(target: Arc<AlertTone>) -> Self {
        Self {
            target: Some(target),
        }
    }

    /// Feed every key press / line read here. Only the first one does anything.
    pub fn on_interaction(&mut self) {
        if let Some(alert) = self.target.take() {
            alert.unlock();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.target.is_some()
    }
}

/// Rings the terminal bell on every on-pulse.
#[derive(Clone, Copy, Debug, Default)]
pub struct TerminalBell;

impl ToneSink for TerminalBell {
    fn pulse_on(&self) {
        let mut err = std::io::stderr();
        let _ = err.write_all(b"\x07");
        let _ = err.flush();
    }

    fn pulse_off(&self) {}
}

/// Sink for sessions with sound disabled.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentSink;

impl ToneSink for SilentSink {
    fn pulse_on(&self) {}
    fn pulse_off(&self) {}
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    pub(crate) struct CountingSink {
        pub ons: AtomicUsize,
        pub offs: AtomicUsize,
    }

    impl ToneSink for CountingSink {
        fn pulse_on(&self) {
            self.ons.fetch_add(1, Ordering::SeqCst);
        }
        fn pulse_off(&self) {
            self.offs.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn tone(sink: Arc<CountingSink>) -> AlertTone {
        AlertTone::new(sink, Duration::from_millis(100))
    }

    #[tokio::test(start_paused = true)]
    async fn double_start_runs_a_single_cycle() {
        let sink = Arc::new(CountingSink::default());
        let alert = tone(sink.clone());
        alert.unlock();

        assert!(alert.start());
        assert!(!alert.start());
        assert!(alert.is_sounding());

        // Two full on/off periods.
        sleep(Duration::from_millis(350)).await;
        assert_eq!(sink.ons.load(Ordering::SeqCst), 2);

        assert!(alert.stop());
        assert!(!alert.is_sounding());
    }

    #[tokio::test]
    async fn stop_when_idle_is_a_no_op() {
        let sink = Arc::new(CountingSink::default());
        let alert = tone(sink.clone());
        assert!(!alert.stop());
        assert!(!alert.stop());
        assert_eq!(sink.offs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn locked_alert_is_silent_until_unlocked() {
        let sink = Arc::new(CountingSink::default());
        let alert = Arc::new(tone(sink.clone()));

        alert.start();
        sleep(Duration::from_millis(450)).await;
        assert_eq!(sink.ons.load(Ordering::SeqCst), 0);
        assert!(alert.is_sounding());

        let mut unlock = InteractionUnlock::new(alert.clone());
        assert!(unlock.is_armed());
        unlock.on_interaction();
        assert!(!unlock.is_armed());
        unlock.on_interaction();
        assert!(alert.is_unlocked());

        sleep(Duration::from_millis(400)).await;
        assert!(sink.ons.load(Ordering::SeqCst) >= 1);

        alert.stop();
        let after_stop = sink.ons.load(Ordering::SeqCst);
        sleep(Duration::from_secs(2)).await;
        assert_eq!(sink.ons.load(Ordering::SeqCst), after_stop);
    }

    #[tokio::test]
    async fn restart_after_stop_works() {
        let alert = tone(Arc::new(CountingSink::default()));
        assert!(alert.start());
        assert!(alert.stop());
        assert!(alert.start());
        assert!(alert.is_sounding());
        alert.stop();
    }
}
