//! Terminal rendering helpers for the explorer.

use console::Style;
use county_compass_county_models::{Metric, Party};
use county_compass_scoring::classify;

/// Formats a metric value for display: thousands grouping for counts and
/// dollar amounts, one decimal for ages and temperatures, plus the
/// metric's unit suffix.
#[must_use]
pub fn format_value(value: f64, metric: Metric) -> String {
    let formatted = match metric {
        Metric::Population | Metric::HomeValue | Metric::MedianRent => {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let whole = value.round().max(0.0) as u64;
            group_thousands(whole)
        }
        Metric::MedianAge | Metric::Temperature => format!("{value:.1}"),
    };
    format!("{formatted}{}", metric.unit())
}

/// Groups a count into comma-separated thousands.
#[must_use]
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Two-block color swatch for a combined score, drawn in the terminal's
/// 256-color palette.
#[must_use]
pub fn swatch(score: Option<f64>) -> String {
    let color = classify::score_color(score);
    Style::new()
        .color256(ansi256(color))
        .apply_to("\u{2588}\u{2588}")
        .to_string()
}

/// Nearest 6x6x6 cube entry of the 256-color terminal palette for a
/// `#rrggbb` color. Malformed colors fall back to a neutral grey.
#[must_use]
pub fn ansi256(hex: &str) -> u8 {
    let Some((r, g, b)) = parse_hex(hex) else {
        return 250;
    };
    16 + 36 * cube_step(r) + 6 * cube_step(g) + cube_step(b)
}

/// Display name for a winning party.
#[must_use]
pub const fn party_label(party: Party) -> &'static str {
    match party {
        Party::Democrat => "Democrat",
        Party::Republican => "Republican",
    }
}

fn cube_step(channel: u8) -> u8 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let step = (f64::from(channel) / 255.0 * 5.0).round() as u8;
    step
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_format_with_units_and_grouping() {
        assert_eq!(format_value(59_285.0, Metric::Population), "59,285");
        assert_eq!(format_value(38.6, Metric::MedianAge), "38.6 yrs");
        assert_eq!(format_value(64.42, Metric::Temperature), "64.4 \u{b0}F");
        assert_eq!(format_value(203_300.0, Metric::HomeValue), "203,300 USD");
        assert_eq!(format_value(1_171.0, Metric::MedianRent), "1,171 USD");
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn hex_colors_map_onto_the_terminal_cube() {
        assert_eq!(ansi256("#000000"), 16);
        assert_eq!(ansi256("#ffffff"), 231);
        assert_eq!(ansi256("#ff0000"), 196);
        // Deep navy from the combined-score palette.
        assert_eq!(ansi256("#173B53"), 24);
    }

    #[test]
    fn malformed_colors_fall_back_to_grey() {
        assert_eq!(ansi256("173B53"), 250);
        assert_eq!(ansi256("#17"), 250);
        assert_eq!(ansi256("#gggggg"), 250);
    }
}
