use std::path::Path;

use async_trait::async_trait;

use crate::{
    domain::{
        BannerSlot, BannerUpload, Booking, BookingId, DashboardStats, Room, RoomForm, RoomId,
        RoomStatus,
    },
    Result,
};

/// Hexagonal port for the booking side of the management API.
///
/// This is all the notification poller needs; it is split from [`AdminApi`]
/// so tests can fake it with a handful of lines.
#[async_trait]
pub trait BookingApi: Send + Sync {
    /// Full booking list, in the order the API returns it.
    async fn list_bookings(&self) -> Result<Vec<Booking>>;
}

/// Hexagonal port for the rest of the admin surface (rooms, banners, dashboard).
#[async_trait]
pub trait AdminApi: BookingApi {
    async fn check_in(&self, id: &BookingId) -> Result<()>;
    async fn check_out(&self, id: &BookingId) -> Result<()>;

    async fn dashboard(&self) -> Result<DashboardStats>;

    async fn list_rooms(&self) -> Result<Vec<Room>>;
    async fn create_room(&self, form: &RoomForm) -> Result<()>;
    async fn update_room(&self, id: &RoomId, form: &RoomForm) -> Result<()>;
    async fn set_room_status(&self, id: &RoomId, status: RoomStatus) -> Result<()>;
    async fn delete_room(&self, id: &RoomId) -> Result<()>;

    async fn upload_banner(&self, slot: BannerSlot, file: &Path) -> Result<BannerUpload>;
}

/// Local string key-value store (seen bookings, session flag).
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Output device for the alert tone.
///
/// The alert driver owns timing; a sink only has to switch the tone on and off.
pub trait ToneSink: Send + Sync {
    fn pulse_on(&self);
    fn pulse_off(&self);
}
