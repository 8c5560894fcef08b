//! Guest contact hand-off (WhatsApp deep links).

use std::sync::OnceLock;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;

use crate::{domain::Booking, errors::Error, formatting::capitalize, Result};

/// Everything `encodeURIComponent` escapes: all but `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn non_digits() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\D").expect("static regex"))
}

/// Strips everything but ASCII digits; `None` when nothing is left.
pub fn sanitize_phone(raw: &str) -> Option<String> {
    let digits = non_digits().replace_all(raw, "").to_string();
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}

/// Greeting sent to the guest about their upcoming stay.
pub fn guest_message(booking: &Booking, resthouse_name: &str) -> String {
    format!(
        "Hello *{guest}*, this is from *{resthouse_name}*. We are looking forward to your stay in *Room {room}* ({kind}). Check-in: *{check_in}*, Check-out: *{check_out}*. Thank you!",
        guest = booking.guest_name,
        room = booking.room_number,
        kind = capitalize(&booking.room_type),
        check_in = booking.check_in,
        check_out = booking.check_out,
    )
}

/// Builds `https://wa.me/{digits}?text={message}` for the booking's guest.
pub fn whatsapp_link(booking: &Booking, resthouse_name: &str) -> Result<String> {
    let phone = booking
        .phone
        .as_deref()
        .and_then(sanitize_phone)
        .ok_or_else(|| {
            Error::InvalidInput(format!(
                "no valid phone number found for booking {}",
                booking.id
            ))
        })?;

    let message = guest_message(booking, resthouse_name);
    let text = utf8_percent_encode(&message, URI_COMPONENT);
    Ok(format!("https://wa.me/{phone}?text={text}"))
}
