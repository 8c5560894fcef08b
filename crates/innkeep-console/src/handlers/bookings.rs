use anyhow::{anyhow, bail, Context};
use tokio::process::Command;
use tracing::{info, warn};

use innkeep_core::{
    contact::whatsapp_link,
    domain::{Booking, BookingId},
};

use crate::{render, router::AppState};

pub async fn list(state: &AppState, search: Option<&str>) -> anyhow::Result<()> {
    let bookings = state
        .api
        .list_bookings()
        .await
        .context("failed to fetch bookings")?;
    state.screen.show(&render::bookings_table(&bookings, search));
    Ok(())
}

pub async fn check_in(state: &AppState, id: &str) -> anyhow::Result<()> {
    let id = parse_id(id)?;
    state
        .api
        .check_in(&id)
        .await
        .with_context(|| format!("check-in failed for booking {id}"))?;
    info!(booking_id = %id, "guest checked in");
    state.screen.show(&format!("Booking {id} checked in."));
    Ok(())
}

pub async fn check_out(state: &AppState, id: &str) -> anyhow::Result<()> {
    let id = parse_id(id)?;
    state
        .api
        .check_out(&id)
        .await
        .with_context(|| format!("check-out failed for booking {id}"))?;
    info!(booking_id = %id, "guest checked out");
    state.screen.show(&format!("Booking {id} checked out."));
    Ok(())
}

/// Looks the booking up and hands its WhatsApp link off.
pub async fn contact(state: &AppState, id: &str) -> anyhow::Result<()> {
    let id = parse_id(id)?;
    let bookings = state
        .api
        .list_bookings()
        .await
        .context("failed to fetch bookings")?;
    let booking = bookings
        .iter()
        .find(|b| b.id == id)
        .ok_or_else(|| anyhow!("booking {id} not found"))?;
    contact_guest(state, booking).await
}

pub async fn contact_guest(state: &AppState, booking: &Booking) -> anyhow::Result<()> {
    let link = whatsapp_link(booking, &state.cfg.resthouse_name)?;
    hand_off(state, &link).await;
    Ok(())
}

/// Prints the link and, if configured, passes it to the opener command
/// (e.g. `xdg-open`). The opener is fire-and-forget.
pub async fn hand_off(state: &AppState, link: &str) {
    state.screen.show(&format!("WhatsApp: {link}"));

    let Some(opener) = state.cfg.open_command.as_deref() else {
        return;
    };
    match Command::new(opener)
        .arg(link)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
    {
        Ok(mut child) => {
            tokio::spawn(async move {
                let _ = child.wait().await;
            });
        }
        Err(e) => warn!(opener, error = %e, "failed to launch link opener"),
    }
}

fn parse_id(raw: &str) -> anyhow::Result<BookingId> {
    let raw = raw.trim();
    if raw.is_empty() {
        bail!("a booking id is required");
    }
    Ok(BookingId::from(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::testing::{booking, state, FakeAdmin};

    #[tokio::test]
    async fn list_renders_matching_bookings() {
        let api = Arc::new(FakeAdmin::default());
        api.bookings.lock().unwrap().extend([
            booking("1", "Asha Rao", "CONFIRMED", None),
            booking("2", "Vikram Shah", "PENDING", None),
        ]);
        let (state, screen) = state(api);

        list(&state, Some("asha")).await.unwrap();

        let text = screen.text();
        assert!(text.contains("Asha Rao"));
        assert!(!text.contains("Vikram Shah"));
    }

    #[tokio::test]
    async fn check_in_and_out_call_the_api() {
        let api = Arc::new(FakeAdmin::default());
        let (state, screen) = state(api.clone());

        check_in(&state, " 42 ").await.unwrap();
        check_out(&state, "42").await.unwrap();

        assert_eq!(api.calls(), vec!["check-in 42", "check-out 42"]);
        assert!(screen.text().contains("Booking 42 checked out."));
    }

    #[tokio::test]
    async fn check_in_needs_an_id() {
        let api = Arc::new(FakeAdmin::default());
        let (state, _) = state(api.clone());

        assert!(check_in(&state, "  ").await.is_err());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn api_failures_carry_context() {
        let api = Arc::new(FakeAdmin::default());
        *api.fail_with.lock().unwrap() = Some(500);
        let (state, _) = state(api);

        let err = check_in(&state, "7").await.unwrap_err();
        assert!(format!("{err:#}").contains("check-in failed for booking 7"));
    }

    #[tokio::test]
    async fn contact_prints_the_whatsapp_link() {
        let api = Arc::new(FakeAdmin::default());
        api.bookings
            .lock()
            .unwrap()
            .push(booking("9", "Asha Rao", "CONFIRMED", Some("+91 98765-43210")));
        let (state, screen) = state(api);

        contact(&state, "9").await.unwrap();

        assert!(screen.text().contains("https://wa.me/919876543210?text="));
    }

    #[tokio::test]
    async fn contact_without_phone_fails() {
        let api = Arc::new(FakeAdmin::default());
        api.bookings
            .lock()
            .unwrap()
            .push(booking("9", "Asha Rao", "CONFIRMED", None));
        let (state, screen) = state(api);

        assert!(contact(&state, "9").await.is_err());
        assert!(contact(&state, "404").await.is_err());
        assert!(!screen.text().contains("wa.me"));
    }
}
