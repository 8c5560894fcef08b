//! Console command handlers.
//!
//! Each handler is a small adapter that:
//! - calls the management API through the `AdminApi` port
//! - renders the result with `crate::render`
//! - reports back on the `Screen`
//!
//! Handlers return `anyhow::Result`; the caller decides whether an error ends
//! the process (one-shot commands) or is just shown (watch session).

pub mod banners;
pub mod bookings;
pub mod dashboard;
pub mod rooms;

/// Splits `checkin 42` into (`checkin`, `42`). The command is lower-cased.
pub fn parse_command(text: &str) -> (String, String) {
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or("").trim().to_lowercase();
    let rest = parts.next().unwrap_or("").trim().to_string();
    (cmd, rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_command_splits_once_and_lowercases() {
        assert_eq!(
            parse_command("  CheckIn   42 "),
            ("checkin".to_string(), "42".to_string())
        );
        assert_eq!(
            parse_command("bookings asha rao"),
            ("bookings".to_string(), "asha rao".to_string())
        );
        assert_eq!(parse_command(""), (String::new(), String::new()));
    }
}
