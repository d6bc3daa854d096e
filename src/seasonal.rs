use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use crate::models::{Factor, Record, SeasonalFactors};
use crate::stats;

pub const TREND_WINDOW: usize = 30;
pub const MIN_TREND_VALUES: usize = 6;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d"];

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.date_naive());
    }
    if let Ok(stamp) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(stamp.date());
    }
    if let Ok(stamp) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(stamp.date());
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

pub fn quarter_of(date: NaiveDate) -> usize {
    (date.month0() / 3) as usize
}

/// Per-quarter multiplier: mean of `(rainfall + humidity) / 2` over the quarter's
/// records, divided by 50. Quarters without records stay at 1.0.
pub fn seasonal_factors(records: &[Record]) -> SeasonalFactors {
    let mut sums = [0.0f64; 4];
    let mut counts = [0usize; 4];

    for record in records {
        let Some(date) = record.date.as_deref().and_then(parse_date) else {
            continue;
        };
        let quarter = quarter_of(date);
        let rainfall = record.value(Factor::Rainfall).unwrap_or(0.0);
        let humidity = record.value(Factor::Humidity).unwrap_or(0.0);
        sums[quarter] += (rainfall + humidity) / 2.0;
        counts[quarter] += 1;
    }

    let mut factors = SeasonalFactors::default();
    for quarter in 0..4 {
        if counts[quarter] > 0 {
            factors.0[quarter] = sums[quarter] / counts[quarter] as f64 / 50.0;
        }
    }
    factors
}

pub fn trends(records: &[Record]) -> BTreeMap<Factor, f64> {
    Factor::ALL
        .iter()
        .map(|factor| {
            let values: Vec<f64> = records.iter().filter_map(|r| r.value(*factor)).collect();
            let recent = &values[values.len().saturating_sub(TREND_WINDOW)..];
            let slope = if recent.len() >= MIN_TREND_VALUES {
                stats::linear_slope(recent)
            } else {
                0.0
            };
            (*factor, slope)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldValue;

    fn dated(date: &str, rainfall: f64, humidity: f64) -> Record {
        Record {
            date: Some(date.to_string()),
            rainfall: Some(FieldValue::Number(rainfall)),
            humidity: Some(FieldValue::Number(humidity)),
            ..Record::default()
        }
    }

    #[test]
    fn parses_common_date_shapes() {
        let expected = NaiveDate::from_ymd_opt(2024, 7, 15).unwrap();
        assert_eq!(parse_date("2024-07-15"), Some(expected));
        assert_eq!(parse_date("2024-07-15T08:30:00Z"), Some(expected));
        assert_eq!(parse_date("2024-07-15T08:30:00"), Some(expected));
        assert_eq!(parse_date("15/07/2024"), Some(expected));
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn quarters_follow_calendar_months() {
        let q = |m| quarter_of(NaiveDate::from_ymd_opt(2024, m, 1).unwrap());
        assert_eq!(q(1), 0);
        assert_eq!(q(3), 0);
        assert_eq!(q(4), 1);
        assert_eq!(q(9), 2);
        assert_eq!(q(12), 3);
    }

    #[test]
    fn empty_quarters_default_to_one() {
        let records = vec![dated("2024-07-01", 100.0, 100.0), dated("2024-08-01", 0.0, 50.0)];
        let factors = seasonal_factors(&records);
        // (100 + 25) / 2 / 50
        assert!((factors.0[2] - 1.25).abs() < 1e-9);
        assert_eq!(factors.0[0], 1.0);
        assert_eq!(factors.0[1], 1.0);
        assert_eq!(factors.0[3], 1.0);
    }

    #[test]
    fn undated_records_are_ignored() {
        let mut undated = dated("", 300.0, 100.0);
        undated.date = None;
        let records = vec![undated, dated("not a date", 300.0, 100.0)];
        assert_eq!(seasonal_factors(&records), SeasonalFactors::default());
    }

    #[test]
    fn trend_uses_recent_window() {
        let mut records: Vec<Record> = (0..10).map(|_| dated("2024-01-01", 500.0, 50.0)).collect();
        records.extend((0..30).map(|i| dated("2024-01-02", i as f64 * 2.0, 50.0)));
        let trends = trends(&records);
        assert!((trends[&Factor::Rainfall] - 2.0).abs() < 1e-9);
        assert_eq!(trends[&Factor::Humidity], 0.0);
    }

    #[test]
    fn short_series_have_flat_trend() {
        let records: Vec<Record> = (0..5).map(|i| dated("2024-01-01", i as f64, 50.0)).collect();
        assert_eq!(trends(&records)[&Factor::Rainfall], 0.0);
    }
}
