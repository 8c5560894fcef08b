//! Records exchanged with the booking/room management API.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Booking id (string-comparable; the API may send numbers or strings).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BookingId(pub String);

impl BookingId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BookingId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl<'de> Deserialize<'de> for BookingId {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let v = serde_json::Value::deserialize(d)?;
        match lossy_string(&v) {
            Some(s) => Ok(Self(s)),
            None => Err(serde::de::Error::custom(format!(
                "booking id must be a string or number, got {v}"
            ))),
        }
    }
}

/// Room id, same coercion rules as [`BookingId`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl<'de> Deserialize<'de> for RoomId {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let v = serde_json::Value::deserialize(d)?;
        lossy_string(&v)
            .map(Self)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid room id: {v}")))
    }
}

/// Booking lifecycle status as reported by the API.
///
/// The API speaks an open-ended upper-case string enumeration; anything we do
/// not recognise is kept verbatim in `Unknown`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BookingStatus {
    Confirmed,
    Success,
    Paid,
    Booked,
    Pending,
    CheckedIn,
    CheckedOut,
    Cancelled,
    Unknown(String),
}

impl BookingStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "CONFIRMED" => Self::Confirmed,
            "SUCCESS" => Self::Success,
            "PAID" => Self::Paid,
            "BOOKED" => Self::Booked,
            "PENDING" => Self::Pending,
            "CHECKED_IN" => Self::CheckedIn,
            "CHECKED_OUT" => Self::CheckedOut,
            "CANCELLED" => Self::Cancelled,
            _ => Self::Unknown(raw.to_string()),
        }
    }

    /// Statuses that mean the reservation went through and the operator
    /// should be told about it.
    pub fn is_alertable(&self) -> bool {
        matches!(
            self,
            Self::Confirmed | Self::Success | Self::Paid | Self::Booked
        )
    }

    /// Wire form (`CHECKED_IN`, ...).
    pub fn as_wire(&self) -> &str {
        match self {
            Self::Confirmed => "CONFIRMED",
            Self::Success => "SUCCESS",
            Self::Paid => "PAID",
            Self::Booked => "BOOKED",
            Self::Pending => "PENDING",
            Self::CheckedIn => "CHECKED_IN",
            Self::CheckedOut => "CHECKED_OUT",
            Self::Cancelled => "CANCELLED",
            Self::Unknown(raw) => raw,
        }
    }

    /// Operator-facing label, e.g. `Checked In`, `Confirmed`.
    pub fn label(&self) -> String {
        match self {
            Self::CheckedIn => "Checked In".to_string(),
            Self::CheckedOut => "Checked Out".to_string(),
            Self::Unknown(raw) if raw.trim().is_empty() => "Unknown".to_string(),
            other => crate::formatting::capitalize(other.as_wire()),
        }
    }

    /// Only confirmed and pending bookings offer a check-in action.
    pub fn can_check_in(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Pending)
    }

    pub fn can_check_out(&self) -> bool {
        matches!(self, Self::CheckedIn)
    }
}

impl Default for BookingStatus {
    fn default() -> Self {
        Self::Unknown(String::new())
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl Serialize for BookingStatus {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for BookingStatus {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        Ok(raw.as_deref().map(Self::parse).unwrap_or_default())
    }
}

/// Booking record as returned by `GET /api/admin/bookings`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    #[serde(default, deserialize_with = "de_lossy_string")]
    pub guest_name: String,
    #[serde(default, deserialize_with = "de_lossy_string")]
    pub room_number: String,
    #[serde(default, deserialize_with = "de_lossy_string")]
    pub room_type: String,
    #[serde(default, deserialize_with = "de_lossy_string")]
    pub check_in: String,
    #[serde(default, deserialize_with = "de_lossy_string")]
    pub check_out: String,
    #[serde(default, deserialize_with = "de_lossy_string")]
    pub amount: String,
    #[serde(default, deserialize_with = "de_opt_lossy_string")]
    pub phone: Option<String>,
    #[serde(default)]
    pub status: BookingStatus,
}

impl Booking {
    /// Case-insensitive match on guest name or id, used by the bookings search.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.guest_name.to_lowercase().contains(&term)
            || self.id.as_str().to_lowercase().contains(&term)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RoomType {
    Single,
    Double,
    Dormitory,
    Other(String),
}

impl RoomType {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "" | "SINGLE" => Self::Single,
            "DOUBLE" => Self::Double,
            "DORMITORY" => Self::Dormitory,
            _ => Self::Other(raw.trim().to_string()),
        }
    }

    pub fn as_wire(&self) -> String {
        match self {
            Self::Single => "SINGLE".to_string(),
            Self::Double => "DOUBLE".to_string(),
            Self::Dormitory => "DORMITORY".to_string(),
            Self::Other(raw) => raw.to_uppercase(),
        }
    }

    pub fn label(&self) -> String {
        crate::formatting::capitalize(&self.as_wire())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AcType {
    Ac,
    NonAc,
}

impl AcType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().replace('-', "_").as_str() {
            "" | "AC" => Some(Self::Ac),
            "NON_AC" | "NONAC" => Some(Self::NonAc),
            _ => None,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Ac => "AC",
            Self::NonAc => "NON_AC",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Ac => "AC",
            Self::NonAc => "NON-AC",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoomStatus {
    Active,
    Inactive,
    Maintenance,
}

impl RoomStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "" | "ACTIVE" => Some(Self::Active),
            "INACTIVE" => Some(Self::Inactive),
            "MAINTENANCE" => Some(Self::Maintenance),
            _ => None,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::Maintenance => "MAINTENANCE",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::Maintenance => "Maintenance",
        }
    }

    /// Quick toggle from the rooms list: Active <-> Inactive, anything else
    /// goes back to Active.
    pub fn toggled(&self) -> Self {
        match self {
            Self::Active => Self::Inactive,
            Self::Inactive | Self::Maintenance => Self::Active,
        }
    }
}

/// Room record as returned by `GET /api/rooms/getallrooms`.
#[derive(Clone, Debug, PartialEq)]
pub struct Room {
    pub id: RoomId,
    pub room_number: String,
    pub room_type: RoomType,
    pub ac_type: AcType,
    pub price_per_night: f64,
    pub status: RoomStatus,
    pub image_url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoomWire {
    id: RoomId,
    #[serde(default, deserialize_with = "de_lossy_string")]
    room_number: String,
    #[serde(default, deserialize_with = "de_lossy_string")]
    room_type: String,
    #[serde(default, deserialize_with = "de_lossy_string")]
    ac_type: String,
    #[serde(default)]
    price_per_night: Option<f64>,
    #[serde(default, deserialize_with = "de_lossy_string")]
    status: String,
    #[serde(default)]
    image_url: Option<String>,
}

impl<'de> Deserialize<'de> for Room {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let w = RoomWire::deserialize(d)?;
        Ok(Self {
            id: w.id,
            room_number: if w.room_number.trim().is_empty() {
                "N/A".to_string()
            } else {
                w.room_number
            },
            room_type: RoomType::parse(&w.room_type),
            ac_type: AcType::parse(&w.ac_type).unwrap_or(AcType::Ac),
            price_per_night: w.price_per_night.unwrap_or(0.0),
            status: RoomStatus::parse(&w.status).unwrap_or(RoomStatus::Active),
            image_url: w.image_url.filter(|u| !u.trim().is_empty()),
        })
    }
}

/// Fields submitted when creating or editing a room.
#[derive(Clone, Debug, PartialEq)]
pub struct RoomForm {
    pub room_number: String,
    pub room_type: RoomType,
    pub ac_type: AcType,
    pub price_per_night: f64,
    pub status: RoomStatus,
    pub image: Option<std::path::PathBuf>,
}

impl RoomForm {
    pub fn validate(&self) -> crate::Result<()> {
        if self.room_number.trim().is_empty() {
            return Err(crate::Error::InvalidInput(
                "room number is required".to_string(),
            ));
        }
        if !self.price_per_night.is_finite() || self.price_per_night < 0.0 {
            return Err(crate::Error::InvalidInput(format!(
                "price per night must be a non-negative number, got {}",
                self.price_per_night
            )));
        }
        Ok(())
    }

    /// Pre-fills an edit form from an existing room (image is only sent when replaced).
    pub fn from_room(room: &Room) -> Self {
        Self {
            room_number: room.room_number.clone(),
            room_type: room.room_type.clone(),
            ac_type: room.ac_type,
            price_per_night: room.price_per_night,
            status: room.status,
            image: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Revenue {
    pub daily: f64,
    pub weekly: f64,
    pub monthly: f64,
    pub yearly: f64,
}

/// Payload of `GET /api/admin/dashboard`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DashboardStats {
    pub active_rooms: u32,
    pub inactive_rooms: u32,
    pub maintenance_rooms: u32,
    pub total_rooms: u32,
    /// Bookings made today.
    pub new_bookings: u32,
    pub occupancy: f64,
    pub revenue: Revenue,
}

/// Banner positions on the public site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BannerSlot {
    Main,
    Second,
    Third,
}

impl BannerSlot {
    pub const ALL: [BannerSlot; 3] = [Self::Main, Self::Second, Self::Third];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "MAIN" => Some(Self::Main),
            "SECOND" => Some(Self::Second),
            "THIRD" => Some(Self::Third),
            _ => None,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Main => "MAIN",
            Self::Second => "SECOND",
            Self::Third => "THIRD",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Main => "Main Hero Banner",
            Self::Second => "Secondary Promo",
            Self::Third => "Third Highlight",
        }
    }

    pub fn accepts(&self, media: MediaType) -> bool {
        match self {
            Self::Main => true,
            Self::Second | Self::Third => media == MediaType::Image,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    /// Detects the media type from a MIME string (`video/*` is video, the rest image).
    pub fn from_mime(mime: &str) -> Self {
        if mime.trim().to_lowercase().starts_with("video/") {
            Self::Video
        } else {
            Self::Image
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Image => "IMAGE",
            Self::Video => "VIDEO",
        }
    }
}

/// Response of a successful banner upload.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct BannerUpload {
    #[serde(default)]
    pub url: Option<String>,
}

fn lossy_string(v: &serde_json::Value) -> Option<String> {
    match v {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn de_lossy_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let v = serde_json::Value::deserialize(d)?;
    Ok(lossy_string(&v).unwrap_or_default())
}

fn de_opt_lossy_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let v = serde_json::Value::deserialize(d)?;
    Ok(lossy_string(&v).filter(|s| !s.trim().is_empty()))
}
