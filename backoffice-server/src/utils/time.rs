//! Time helpers: business-timezone conversion
//!
//! All date→timestamp conversion happens at the API handler layer; the
//! repository and billing layers only ever see `i64` Unix millis. The
//! platform operates in one business timezone (America/Santo_Domingo by
//! default).

use chrono::NaiveDate;
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// Parse a date string (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// Validate an inclusive date range (desde <= hasta)
pub fn validate_range(desde: NaiveDate, hasta: NaiveDate) -> AppResult<()> {
    if desde > hasta {
        return Err(AppError::with_message(
            shared::error::ErrorCode::InvalidDateRange,
            format!("periodoDesde {} is after periodoHasta {}", desde, hasta),
        ));
    }
    Ok(())
}

/// Date + H:M:S → Unix millis in the business timezone
///
/// DST gap fallback: if the local time does not exist, fall back to UTC.
pub fn date_hms_to_millis(date: NaiveDate, hour: u32, min: u32, sec: u32, tz: Tz) -> i64 {
    let naive = date.and_hms_opt(hour, min, sec).unwrap_or_default();
    naive
        .and_local_timezone(tz)
        .latest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// Start of day (00:00:00) → Unix millis in the business timezone
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    date_hms_to_millis(date, 0, 0, 0, tz)
}

/// End of day → next day 00:00:00 Unix millis; callers use `< end` semantics
pub fn day_end_millis(date: NaiveDate, tz: Tz) -> i64 {
    let next_day = date.succ_opt().unwrap_or(date);
    date_hms_to_millis(next_day, 0, 0, 0, tz)
}

/// Today's date in the business timezone
pub fn today(tz: Tz) -> NaiveDate {
    chrono::Utc::now().with_timezone(&tz).date_naive()
}

/// Whole days elapsed from `vencimiento_millis` to now, clamped at 0.
///
/// Used for dias_vencido: a document due today or in the future is Vigente.
pub fn dias_vencido(vencimiento_millis: i64, tz: Tz) -> i64 {
    let venc = chrono::DateTime::from_timestamp_millis(vencimiento_millis)
        .map(|dt| dt.with_timezone(&tz).date_naive())
        .unwrap_or_else(|| today(tz));
    (today(tz) - venc).num_days().max(0)
}

/// Unix millis → calendar date in the business timezone
pub fn millis_to_date(millis: i64, tz: Tz) -> NaiveDate {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.with_timezone(&tz).date_naive())
        .unwrap_or_else(|| today(tz))
}

/// Format Unix millis as YYYY-MM-DD in the business timezone
pub fn format_date(millis: i64, tz: Tz) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.with_timezone(&tz).format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::Santo_Domingo;

    #[test]
    fn test_parse_date() {
        assert!(parse_date("2025-03-31").is_ok());
        assert!(parse_date("31/03/2025").is_err());
        assert!(parse_date("2025-13-01").is_err());
    }

    #[test]
    fn test_validate_range() {
        let a = parse_date("2025-01-01").unwrap();
        let b = parse_date("2025-01-31").unwrap();
        assert!(validate_range(a, b).is_ok());
        assert!(validate_range(b, a).is_err());
        assert!(validate_range(a, a).is_ok());
    }

    #[test]
    fn test_day_bounds_ordering() {
        let d = parse_date("2025-06-15").unwrap();
        let start = day_start_millis(d, Santo_Domingo);
        let end = day_end_millis(d, Santo_Domingo);
        assert_eq!(end - start, 24 * 3600 * 1000);
    }

    #[test]
    fn test_dias_vencido_future_is_zero() {
        let future = shared::util::now_millis() + 10 * 24 * 3600 * 1000;
        assert_eq!(dias_vencido(future, Santo_Domingo), 0);
    }

    #[test]
    fn test_dias_vencido_past() {
        let past = shared::util::now_millis() - 31 * 24 * 3600 * 1000;
        let dias = dias_vencido(past, Santo_Domingo);
        assert!((30..=31).contains(&dias));
    }
}
