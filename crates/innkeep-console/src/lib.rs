//! Terminal adapter for the innkeep admin console.
//!
//! Renders API data as plain-text tables and drives the interactive `watch`
//! session around the `innkeep-core` booking notifier.

use std::io::Write;

pub mod handlers;
pub mod render;
pub mod router;

/// Where console output goes. Handlers only ever talk to this.
pub trait Screen: Send + Sync {
    fn show(&self, text: &str);
}

/// Writes to stdout; logs stay on stderr.
#[derive(Clone, Copy, Debug, Default)]
pub struct Stdout;

impl Screen for Stdout {
    fn show(&self, text: &str) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{text}");
        let _ = out.flush();
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::{
        path::Path,
        sync::{Arc, Mutex},
    };

    use async_trait::async_trait;

    use innkeep_core::{
        config::Config,
        domain::{
            BannerSlot, BannerUpload, Booking, BookingId, BookingStatus, DashboardStats, Room,
            RoomForm, RoomId, RoomStatus,
        },
        errors::Error,
        ports::{AdminApi, BookingApi},
        Result,
    };

    use crate::{router::AppState, Screen};

    /// Collects everything shown so tests can assert on it.
    #[derive(Default)]
    pub(crate) struct Transcript {
        lines: Mutex<Vec<String>>,
    }

    impl Transcript {
        pub(crate) fn text(&self) -> String {
            self.lines.lock().unwrap().join("\n")
        }
    }

    impl Screen for Transcript {
        fn show(&self, text: &str) {
            self.lines.lock().unwrap().push(text.to_string());
        }
    }

    /// Records every mutating call against an in-memory catalogue.
    #[derive(Default)]
    pub(crate) struct FakeAdmin {
        pub bookings: Mutex<Vec<Booking>>,
        pub rooms: Mutex<Vec<Room>>,
        pub calls: Mutex<Vec<String>>,
        pub fail_with: Mutex<Option<u16>>,
    }

    impl FakeAdmin {
        fn record(&self, call: String) -> Result<()> {
            if let Some(status) = *self.fail_with.lock().unwrap() {
                return Err(Error::Http {
                    status,
                    body: "boom".to_string(),
                });
            }
            self.calls.lock().unwrap().push(call);
            Ok(())
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BookingApi for FakeAdmin {
        async fn list_bookings(&self) -> Result<Vec<Booking>> {
            Ok(self.bookings.lock().unwrap().clone())
        }
    }

    #[async_trait]
    impl AdminApi for FakeAdmin {
        async fn check_in(&self, id: &BookingId) -> Result<()> {
            self.record(format!("check-in {id}"))
        }

        async fn check_out(&self, id: &BookingId) -> Result<()> {
            self.record(format!("check-out {id}"))
        }

        async fn dashboard(&self) -> Result<DashboardStats> {
            Ok(DashboardStats::default())
        }

        async fn list_rooms(&self) -> Result<Vec<Room>> {
            Ok(self.rooms.lock().unwrap().clone())
        }

        async fn create_room(&self, form: &RoomForm) -> Result<()> {
            self.record(format!("create {}", form.room_number))
        }

        async fn update_room(&self, id: &RoomId, form: &RoomForm) -> Result<()> {
            self.record(format!(
                "update {id} {} {} {}",
                form.room_number,
                form.price_per_night,
                form.status.as_wire()
            ))
        }

        async fn set_room_status(&self, id: &RoomId, status: RoomStatus) -> Result<()> {
            self.record(format!("status {id} {}", status.as_wire()))
        }

        async fn delete_room(&self, id: &RoomId) -> Result<()> {
            self.record(format!("delete {id}"))
        }

        async fn upload_banner(&self, slot: BannerSlot, file: &Path) -> Result<BannerUpload> {
            self.record(format!("banner {} {}", slot.as_wire(), file.display()))?;
            Ok(BannerUpload {
                url: Some("https://cdn.example/banner.jpg".to_string()),
            })
        }
    }

    pub(crate) fn booking(id: &str, guest: &str, status: &str, phone: Option<&str>) -> Booking {
        Booking {
            id: BookingId(id.to_string()),
            guest_name: guest.to_string(),
            room_number: "104".to_string(),
            room_type: "Double".to_string(),
            check_in: "2026-10-17".to_string(),
            check_out: "2026-10-19".to_string(),
            amount: "3600".to_string(),
            phone: phone.map(str::to_string),
            status: BookingStatus::parse(status),
        }
    }

    pub(crate) fn state(api: Arc<FakeAdmin>) -> (AppState, Arc<Transcript>) {
        let screen = Arc::new(Transcript::default());
        let state = AppState {
            cfg: Arc::new(Config::default()),
            api,
            screen: screen.clone(),
        };
        (state, screen)
    }
}
