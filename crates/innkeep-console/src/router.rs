use std::{io::BufRead, sync::Arc};

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use innkeep_core::{
    alert::InteractionUnlock,
    config::Config,
    notifier::{BookingNotifier, DismissReason, Notification},
    ports::AdminApi,
};

use crate::{
    handlers::{self, parse_command},
    render, Screen,
};

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub api: Arc<dyn AdminApi>,
    pub screen: Arc<dyn Screen>,
}

/// What the watch loop should do after a command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Cancelled on SIGINT (Ctrl+C) or SIGTERM.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => info!("received SIGINT (Ctrl+C), stopping"),
                        _ = sigterm.recv() => info!("received SIGTERM, stopping"),
                    }
                }
                Err(e) => {
                    warn!(error = %e, "failed to install SIGTERM handler");
                    let _ = ctrl_c.await;
                    info!("received SIGINT (Ctrl+C), stopping");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, stopping");
        }

        token_clone.cancel();
    });

    token
}

/// Reads stdin lines on a dedicated thread.
///
/// Blocking terminal reads stay off the runtime; the thread ends with stdin
/// or when the receiver is dropped.
pub fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Interactive `watch` session on the real terminal.
pub async fn run_watch(
    state: &AppState,
    notifier: BookingNotifier,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    state.screen.show(&render::watch_help());
    run_session(state, notifier, spawn_stdin_reader(), cancel).await
}

/// Drives the notifier and feeds operator commands to it until `quit`,
/// end of input, or `cancel`. Always tears the notifier down on the way out.
pub async fn run_session(
    state: &AppState,
    notifier: BookingNotifier,
    mut input: mpsc::Receiver<String>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let poller = {
        let notifier = notifier.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { notifier.run(cancel).await })
    };
    let painter = tokio::spawn(paint_notifications(
        state.screen.clone(),
        notifier.subscribe(),
    ));

    let mut unlock = InteractionUnlock::new(notifier.alert());

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            line = input.recv() => {
                let Some(line) = line else {
                    debug!("input closed");
                    break;
                };
                unlock.on_interaction();
                if handle_line(state, &notifier, &line).await == Flow::Quit {
                    break;
                }
            }
        }
    }

    cancel.cancel();
    painter.abort();
    if let Err(e) = poller.await {
        warn!(error = %e, "notifier task failed");
    }
    notifier.shutdown().await;
    info!("watch session ended");
    Ok(())
}

/// Runs one operator command. Errors are shown, never fatal.
pub async fn handle_line(state: &AppState, notifier: &BookingNotifier, line: &str) -> Flow {
    let (cmd, rest) = parse_command(line);
    let arg = Some(rest.as_str()).filter(|s| !s.is_empty());

    let result = match cmd.as_str() {
        "" => Ok(()),
        "close" | "x" => {
            notifier.dismiss(DismissReason::Closed).await;
            Ok(())
        }
        "view" | "v" => {
            notifier.dismiss(DismissReason::ViewDetails).await;
            handlers::bookings::list(state, None).await
        }
        "contact" | "c" => contact_current(state, notifier).await,
        "checkin" | "check-in" => handlers::bookings::check_in(state, &rest).await,
        "checkout" | "check-out" => handlers::bookings::check_out(state, &rest).await,
        "bookings" | "b" => handlers::bookings::list(state, arg).await,
        "status" => {
            state.screen.show(&render::status_line(
                notifier.seen_count().await,
                notifier.current().as_ref(),
                notifier.alert().is_unlocked(),
            ));
            Ok(())
        }
        "help" | "?" => {
            state.screen.show(&render::watch_help());
            Ok(())
        }
        "quit" | "q" | "exit" => return Flow::Quit,
        other => {
            state
                .screen
                .show(&format!("Unknown command: {other} (try `help`)"));
            Ok(())
        }
    };

    if let Err(e) = result {
        warn!(command = %cmd, error = %e, "command failed");
        state.screen.show(&format!("Error: {e:#}"));
    }
    Flow::Continue
}

/// Hands the showing guest off to WhatsApp, then dismisses. Without a usable
/// phone number the notification stays up.
async fn contact_current(state: &AppState, notifier: &BookingNotifier) -> anyhow::Result<()> {
    let Some(showing) = notifier.current() else {
        state.screen.show("No booking notification is showing.");
        return Ok(());
    };
    let link =
        innkeep_core::contact::whatsapp_link(&showing.booking, &state.cfg.resthouse_name)?;
    notifier.dismiss(DismissReason::ContactGuest).await;
    handlers::bookings::hand_off(state, &link).await;
    Ok(())
}

async fn paint_notifications(
    screen: Arc<dyn Screen>,
    mut rx: watch::Receiver<Option<Notification>>,
) {
    let mut showing = false;
    while rx.changed().await.is_ok() {
        let current = rx.borrow_and_update().clone();
        match current {
            Some(n) => {
                screen.show(&render::notification_box(&n));
                showing = true;
            }
            None if showing => {
                screen.show("Notification dismissed.");
                showing = false;
            }
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use innkeep_core::{
        alert::{AlertTone, SilentSink},
        notifier::NotifierConfig,
        ports::KeyValueStore,
        seen::SeenBookings,
        store::MemoryStore,
    };

    use crate::testing::{booking, state, FakeAdmin};

    async fn notifier(api: Arc<FakeAdmin>) -> BookingNotifier {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let seen = SeenBookings::load(store).await;
        let alert = Arc::new(AlertTone::new(
            Arc::new(SilentSink),
            Duration::from_millis(100),
        ));
        BookingNotifier::new(api, seen, alert, NotifierConfig::default())
    }

    fn spawn_session(
        state: &AppState,
        notifier: &BookingNotifier,
        cancel: &CancellationToken,
    ) -> (
        mpsc::Sender<String>,
        tokio::task::JoinHandle<anyhow::Result<()>>,
    ) {
        let (tx, rx) = mpsc::channel(8);
        let state = state.clone();
        let notifier = notifier.clone();
        let cancel = cancel.clone();
        let handle = tokio::spawn(async move { run_session(&state, notifier, rx, cancel).await });
        (tx, handle)
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn session_shows_new_booking_and_closes_it() {
        let api = Arc::new(FakeAdmin::default());
        api.bookings
            .lock()
            .unwrap()
            .push(booking("1", "Asha Rao", "CONFIRMED", None));
        let (state, screen) = state(api.clone());
        let notifier = notifier(api.clone()).await;
        let cancel = CancellationToken::new();
        let (tx, session) = spawn_session(&state, &notifier, &cancel);

        settle().await;
        assert_eq!(notifier.seen_count().await, 1);
        assert!(notifier.current().is_none());

        api.bookings
            .lock()
            .unwrap()
            .push(booking("2", "Vikram Shah", "PAID", Some("9876543210")));
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert!(notifier.current().is_some());
        assert!(screen.text().contains("Vikram Shah"));
        assert!(screen.text().contains("CONFIRMED BOOKING"));

        tx.send("close".to_string()).await.unwrap();
        settle().await;
        assert!(notifier.current().is_none());
        assert!(screen.text().contains("Notification dismissed."));

        tx.send("quit".to_string()).await.unwrap();
        session.await.unwrap().unwrap();
        assert!(notifier.is_shut_down());
    }

    #[tokio::test(start_paused = true)]
    async fn first_line_unlocks_the_alert() {
        let api = Arc::new(FakeAdmin::default());
        let (state, _) = state(api.clone());
        let notifier = notifier(api).await;
        let cancel = CancellationToken::new();
        let (tx, session) = spawn_session(&state, &notifier, &cancel);

        settle().await;
        assert!(!notifier.alert().is_unlocked());

        tx.send(String::new()).await.unwrap();
        settle().await;
        assert!(notifier.alert().is_unlocked());

        cancel.cancel();
        session.await.unwrap().unwrap();
        assert!(notifier.is_shut_down());
    }

    #[tokio::test(start_paused = true)]
    async fn closing_input_ends_the_session() {
        let api = Arc::new(FakeAdmin::default());
        let (state, _) = state(api.clone());
        let notifier = notifier(api).await;
        let cancel = CancellationToken::new();
        let (tx, session) = spawn_session(&state, &notifier, &cancel);

        drop(tx);
        session.await.unwrap().unwrap();
        assert!(cancel.is_cancelled());
        assert!(notifier.is_shut_down());
    }

    async fn raised(api: &Arc<FakeAdmin>, notifier: &BookingNotifier, phone: Option<&str>) {
        api.bookings
            .lock()
            .unwrap()
            .push(booking("1", "Asha Rao", "CONFIRMED", None));
        notifier.poll_cycle().await;
        api.bookings
            .lock()
            .unwrap()
            .push(booking("2", "Vikram Shah", "CONFIRMED", phone));
        notifier.poll_cycle().await;
        assert!(notifier.current().is_some());
    }

    #[tokio::test]
    async fn contact_dismisses_and_prints_the_link() {
        let api = Arc::new(FakeAdmin::default());
        let (state, screen) = state(api.clone());
        let notifier = notifier(api.clone()).await;
        raised(&api, &notifier, Some("98765 43210")).await;

        assert_eq!(handle_line(&state, &notifier, "contact").await, Flow::Continue);

        assert!(notifier.current().is_none());
        assert!(screen.text().contains("https://wa.me/9876543210?text="));
        notifier.shutdown().await;
    }

    #[tokio::test]
    async fn contact_without_phone_keeps_the_notification() {
        let api = Arc::new(FakeAdmin::default());
        let (state, screen) = state(api.clone());
        let notifier = notifier(api.clone()).await;
        raised(&api, &notifier, None).await;

        handle_line(&state, &notifier, "c").await;

        assert!(notifier.current().is_some());
        assert!(screen.text().contains("no valid phone number found for booking 2"));
        notifier.shutdown().await;
    }

    #[tokio::test]
    async fn view_dismisses_and_lists_bookings() {
        let api = Arc::new(FakeAdmin::default());
        let (state, screen) = state(api.clone());
        let notifier = notifier(api.clone()).await;
        raised(&api, &notifier, None).await;

        handle_line(&state, &notifier, "view").await;

        assert!(notifier.current().is_none());
        assert!(screen.text().contains("2 booking(s)"));
        notifier.shutdown().await;
    }

    #[tokio::test]
    async fn commands_route_to_handlers() {
        let api = Arc::new(FakeAdmin::default());
        let (state, screen) = state(api.clone());
        let notifier = notifier(api.clone()).await;

        handle_line(&state, &notifier, "checkin 5").await;
        handle_line(&state, &notifier, "CHECKOUT 5").await;
        handle_line(&state, &notifier, "frobnicate").await;
        handle_line(&state, &notifier, "status").await;
        handle_line(&state, &notifier, "contact").await;

        assert_eq!(api.calls(), vec!["check-in 5", "check-out 5"]);
        let text = screen.text();
        assert!(text.contains("Unknown command: frobnicate"));
        assert!(text.contains("0 booking(s) seen, no notification, sound locked"));
        assert!(text.contains("No booking notification is showing."));
        assert_eq!(handle_line(&state, &notifier, "q").await, Flow::Quit);
    }

    #[tokio::test]
    async fn failing_commands_are_reported_not_fatal() {
        let api = Arc::new(FakeAdmin::default());
        *api.fail_with.lock().unwrap() = Some(502);
        let (state, screen) = state(api.clone());
        let notifier = notifier(api).await;

        let flow = handle_line(&state, &notifier, "checkin 8").await;

        assert_eq!(flow, Flow::Continue);
        assert!(screen.text().contains("Error: check-in failed for booking 8"));
    }
}
