//! Display helpers shared by the console renderers.

/// `CHECKED_IN` -> `Checked_in`, `double` -> `Double`.
pub fn capitalize(s: &str) -> String {
    let s = s.trim();
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let mut out: String = first.to_uppercase().collect();
    out.push_str(&chars.as_str().to_lowercase());
    out
}

/// Formats an amount with en-US grouping: `1234567.5` -> `1,234,567.5`.
///
/// Zero (or a non-finite value) renders as `0`, the same way the dashboard
/// shows empty revenue windows.
pub fn format_amount(amount: f64) -> String {
    if !amount.is_finite() || amount == 0.0 {
        return "0".to_string();
    }

    let negative = amount < 0.0;
    let rounded = (amount.abs() * 1000.0).round() / 1000.0;
    let text = format!("{rounded}");
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (text, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(f) = frac_part {
        out.push('.');
        out.push_str(&f);
    }
    out
}

/// Greeting shown on the dashboard header for a local hour (0-23).
pub fn greeting(hour: u32) -> &'static str {
    if hour < 12 {
        "Good Morning"
    } else if hour < 17 {
        "Good Afternoon"
    } else {
        "Good Evening"
    }
}

/// Truncates to at most `max` chars, appending `…` when something was cut.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let keep = max.saturating_sub(1);
    let mut out: String = s.chars().take(keep).collect();
    out.push('…');
    out
}

/// Left-aligned fixed-width cell (char based, pads or truncates).
pub fn cell(s: &str, width: usize) -> String {
    let t = truncate(s, width);
    let pad = width.saturating_sub(t.chars().count());
    format!("{t}{}", " ".repeat(pad))
}
