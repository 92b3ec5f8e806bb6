use chrono::{DateTime, Utc};

use crate::record::PricePoint;

/// Placeholder shown for prices the server does not know yet.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Round to the nearest cent, halves rounding up.
pub fn round_cents(value: f64) -> f64 {
    let rounded = (value * 100.0 + 0.5).floor() / 100.0;
    // Avoid printing "-0" for tiny negatives.
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// `$` followed by the shortest decimal form of the rounded value
/// (`19.999 -> "$20"`, `12.345 -> "$12.35"`).
pub fn format_price(value: f64) -> String {
    format!("${}", round_cents(value))
}

/// Currency cell text; `None` and non-finite values become [`UNKNOWN_LABEL`].
pub fn format_currency(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format_price(v),
        _ => UNKNOWN_LABEL.to_string(),
    }
}

pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%d %H:%M").to_string()
}

/// Axis tick label for a millisecond timestamp.
pub fn format_tick_date(ts_ms: f64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ts_ms.round() as i64)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Hover label for a chart marker: price then date.
pub fn point_label(point: &PricePoint) -> String {
    format!("{} {}", format_price(point.price), format_date(&point.date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn currency_rounds_to_nearest_cent() {
        assert_eq!(format_currency(Some(12.345)), "$12.35");
        assert_eq!(format_currency(Some(19.995)), "$20");
        assert_eq!(format_currency(Some(19.999)), "$20");
        assert_eq!(format_currency(Some(0.0)), "$0");
        assert_eq!(format_currency(Some(15.5)), "$15.5");
    }

    #[test]
    fn currency_unknown_for_missing_values() {
        assert_eq!(format_currency(None), UNKNOWN_LABEL);
        assert_eq!(format_currency(Some(f64::NAN)), UNKNOWN_LABEL);
    }

    #[test]
    fn negative_zero_is_printed_as_zero() {
        assert_eq!(format_price(-0.001), "$0");
    }

    #[test]
    fn label_combines_price_and_date() {
        let point = PricePoint {
            date: Utc.with_ymd_and_hms(2020, 6, 1, 12, 30, 0).unwrap(),
            price: 20.0,
            url: None,
        };
        assert_eq!(point_label(&point), "$20 2020-06-01 12:30");
    }

    #[test]
    fn tick_dates_use_calendar_day() {
        let ts = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap().timestamp_millis();
        assert_eq!(format_tick_date(ts as f64), "2020-01-01");
    }
}
