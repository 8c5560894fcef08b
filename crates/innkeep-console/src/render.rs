//! Plain-text renderers. Everything here is pure so it can be unit tested.

use chrono::NaiveDateTime;

use innkeep_core::{
    domain::{BannerSlot, Booking, DashboardStats, MediaType, Room, RoomStatus},
    formatting::{cell, format_amount, greeting},
    notifier::Notification,
};

const RULE_WIDTH: usize = 46;

pub fn bookings_table(bookings: &[Booking], search: Option<&str>) -> String {
    let rows: Vec<&Booking> = bookings
        .iter()
        .filter(|b| search.map_or(true, |term| b.matches_search(term)))
        .collect();

    if rows.is_empty() {
        return match search {
            Some(term) if !term.trim().is_empty() => {
                format!("No bookings match \"{}\".", term.trim())
            }
            _ => "No bookings yet.".to_string(),
        };
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{} {} {} {} {} {} {} {}\n",
        cell("ID", 8),
        cell("GUEST", 20),
        cell("ROOM", 12),
        cell("STAY", 23),
        cell("AMOUNT PAID", 11),
        cell("STATUS", 12),
        cell("PHONE", 14),
        "ACTION"
    ));
    for b in &rows {
        let action = if b.status.can_check_in() {
            "check-in"
        } else if b.status.can_check_out() {
            "check-out"
        } else {
            "-"
        };
        out.push_str(&format!(
            "{} {} {} {} {} {} {} {}\n",
            cell(b.id.as_str(), 8),
            cell(&b.guest_name, 20),
            cell(&format!("{} {}", b.room_number, b.room_type), 12),
            cell(&format!("{} -> {}", b.check_in, b.check_out), 23),
            cell(&b.amount, 11),
            cell(&b.status.label(), 12),
            cell(b.phone.as_deref().unwrap_or("-"), 14),
            action
        ));
    }
    out.push_str(&format!("{} booking(s)", rows.len()));
    out
}

pub fn rooms_table(rooms: &[Room], filter: Option<RoomStatus>) -> String {
    let rows: Vec<&Room> = rooms
        .iter()
        .filter(|r| filter.map_or(true, |s| r.status == s))
        .collect();

    if rows.is_empty() {
        return match filter {
            Some(s) => format!("No {} rooms.", s.label().to_lowercase()),
            None => "No rooms yet.".to_string(),
        };
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{} {} {} {} {} {}\n",
        cell("ID", 8),
        cell("ROOM", 8),
        cell("TYPE", 10),
        cell("AC", 7),
        cell("PRICE", 10),
        "STATUS"
    ));
    for r in &rows {
        out.push_str(&format!(
            "{} {} {} {} {} {}\n",
            cell(&r.id.to_string(), 8),
            cell(&r.room_number, 8),
            cell(&r.room_type.label(), 10),
            cell(r.ac_type.label(), 7),
            cell(&format!("₹{}", format_amount(r.price_per_night)), 10),
            r.status.label()
        ));
    }
    out.push_str(&format!("{} room(s)", rows.len()));
    out
}

pub fn dashboard(stats: &DashboardStats, now: NaiveDateTime, resthouse: &str) -> String {
    use chrono::Timelike;

    let r = &stats.revenue;
    let lines = [
        now.format("%A, %B %-d").to_string().to_uppercase(),
        format!("{}, Admin", greeting(now.hour())),
        format!("Here's what's happening at {resthouse} today."),
        String::new(),
        "Revenue".to_string(),
        format!("  daily    ₹{}", format_amount(r.daily)),
        format!("  weekly   ₹{}", format_amount(r.weekly)),
        format!("  monthly  ₹{}", format_amount(r.monthly)),
        format!("  yearly   ₹{}", format_amount(r.yearly)),
        String::new(),
        format!("Active bookings   {}", stats.new_bookings),
        format!(
            "Occupancy         {}% ({} rooms active)",
            format_amount(stats.occupancy),
            stats.active_rooms
        ),
        String::new(),
        "Room status".to_string(),
        format!("  total        {}", stats.total_rooms),
        format!("  active       {}", stats.active_rooms),
        format!("  inactive     {}", stats.inactive_rooms),
        format!("  maintenance  {}", stats.maintenance_rooms),
    ];
    lines.join("\n")
}

/// The in-app notification card for a freshly detected booking.
pub fn notification_box(n: &Notification) -> String {
    let b = &n.booking;
    let secs = n.dismiss_at.saturating_duration_since(n.raised_at).as_secs();
    let rule = "─".repeat(RULE_WIDTH);

    let mut lines = vec![
        format!("┌{rule}"),
        "│ 🔔 CONFIRMED BOOKING".to_string(),
        format!("│ {}", b.guest_name),
        format!("│ Room {} • {} Paid", b.room_number, b.amount),
    ];
    if n.batch_size > 1 {
        lines.push(format!("│ (+{} more new bookings)", n.batch_size - 1));
    }
    lines.push(format!("│ [view] details  [contact] WhatsApp  [close]  ({secs}s)"));
    lines.push(format!("└{rule}"));
    lines.join("\n")
}

pub fn banner_slots() -> String {
    BannerSlot::ALL
        .iter()
        .map(|s| {
            let media = if s.accepts(MediaType::Video) {
                "image or video"
            } else {
                "image only"
            };
            format!("{} {} ({media})", cell(s.as_wire(), 7), s.title())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn watch_help() -> String {
    [
        "Watching for new bookings. Commands:",
        "  close              dismiss the notification",
        "  view               dismiss and list bookings",
        "  contact            dismiss and message the guest on WhatsApp",
        "  checkin <id>       check a guest in",
        "  checkout <id>      check a guest out",
        "  bookings [term]    list bookings",
        "  status             poller state",
        "  quit               stop watching",
        "Press Enter once to enable the alert sound.",
    ]
    .join("\n")
}

pub fn status_line(seen: usize, showing: Option<&Notification>, sound: bool) -> String {
    let showing = match showing {
        Some(n) => format!("showing {}", n.booking.guest_name),
        None => "no notification".to_string(),
    };
    let sound = if sound { "sound on" } else { "sound locked" };
    format!("{seen} booking(s) seen, {showing}, {sound}")
}
