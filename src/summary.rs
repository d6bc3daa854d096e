use std::collections::BTreeSet;

use crate::models::{DateSpan, Factor, Record, Summary};

/// Aggregate statistics over a set of records.
///
/// Dates are compared as plain strings, so the span is only calendar-correct for
/// zero-padded ISO-8601 values.
pub fn summarize(records: &[Record]) -> Summary {
    let mut dates: Vec<&str> = records
        .iter()
        .filter_map(|r| r.date.as_deref())
        .filter(|d| !d.is_empty())
        .collect();
    dates.sort_unstable();

    let date_range = match (dates.first(), dates.last()) {
        (Some(start), Some(end)) => Some(DateSpan {
            start: start.to_string(),
            end: end.to_string(),
        }),
        _ => None,
    };

    let locations: BTreeSet<String> = records
        .iter()
        .filter_map(|r| r.location.as_deref())
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();

    Summary {
        total_records: records.len(),
        date_range,
        locations: locations.into_iter().collect(),
        avg_temperature: mean_of(records, Factor::Temperature).round(),
        avg_humidity: mean_of(records, Factor::Humidity).round(),
        avg_rainfall: (mean_of(records, Factor::Rainfall) * 10.0).round() / 10.0,
    }
}

/// Mean over records holding a numeric value for `factor`; 0 when there are none.
pub fn mean_of(records: &[Record], factor: Factor) -> f64 {
    let values: Vec<f64> = records.iter().filter_map(|r| r.value(factor)).collect();
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldValue;

    fn record(date: &str, location: &str, temperature: f64, rainfall: Option<f64>) -> Record {
        Record {
            date: Some(date.to_string()),
            location: Some(location.to_string()),
            temperature: Some(FieldValue::Number(temperature)),
            humidity: Some(FieldValue::Number(71.0)),
            rainfall: rainfall.map(FieldValue::Number),
            ..Record::default()
        }
    }

    #[test]
    fn summary_of_empty_collection() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_records, 0);
        assert_eq!(summary.date_range, None);
        assert!(summary.locations.is_empty());
        assert_eq!(summary.avg_temperature, 0.0);
    }

    #[test]
    fn missing_rainfall_averages_to_zero() {
        let records = vec![
            record("2024-01-01", "Pune", 20.0, None),
            record("2024-01-02", "Pune", 22.0, None),
        ];
        let summary = summarize(&records);
        assert_eq!(summary.avg_rainfall, 0.0);
        assert_eq!(summary.avg_temperature, 21.0);
    }

    #[test]
    fn locations_are_unique_sorted_and_non_empty() {
        let mut blank = record("2024-01-03", "  ", 20.0, None);
        blank.location = Some(" ".to_string());
        let records = vec![
            record("2024-01-01", "Pune", 20.0, None),
            record("2024-01-02", "Chennai", 20.0, None),
            record("2024-01-02", "Pune", 20.0, None),
            blank,
        ];
        let summary = summarize(&records);
        assert_eq!(summary.locations, vec!["Chennai", "Pune"]);
    }

    #[test]
    fn date_span_uses_string_order() {
        let records = vec![
            record("9/1/2024", "Pune", 20.0, None),
            record("10/1/2024", "Pune", 20.0, None),
        ];
        let summary = summarize(&records);
        let span = summary.date_range.unwrap();
        assert_eq!(span.start, "10/1/2024");
        assert_eq!(span.end, "9/1/2024");
    }

    #[test]
    fn averages_round_and_skip_text_values() {
        let mut text = record("2024-01-04", "Pune", 0.0, Some(0.0));
        text.temperature = Some(FieldValue::Text("warm".to_string()));
        text.rainfall = Some(FieldValue::Text("n/a".to_string()));
        let records = vec![
            record("2024-01-01", "Pune", 20.4, Some(10.0)),
            record("2024-01-02", "Pune", 21.0, Some(12.6)),
            text,
        ];
        let summary = summarize(&records);
        assert_eq!(summary.avg_temperature, 21.0);
        assert_eq!(summary.avg_humidity, 71.0);
        assert!((summary.avg_rainfall - 11.3).abs() < 1e-9);
    }
}
