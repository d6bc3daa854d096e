use std::collections::BTreeMap;

use tracing::debug;

use crate::models::{DisasterType, Factor, Record};
use crate::stats;

pub const MIN_FACTOR_VALUES: usize = 6;

pub fn derived_risk(record: &Record, disaster: DisasterType) -> f64 {
    let v = |factor: Factor| record.value(factor).unwrap_or(0.0);

    let raw = match disaster {
        DisasterType::Flood => {
            v(Factor::Rainfall) * 0.4 + v(Factor::Humidity) * 0.3 + (1000.0 - v(Factor::Pressure)) * 0.3
        }
        DisasterType::Cyclone => {
            v(Factor::WindSpeed) * 0.5
                + (1013.0 - v(Factor::Pressure)) * 0.3
                + v(Factor::Temperature) * 0.2
        }
        DisasterType::Landslide => v(Factor::Rainfall) * 0.6 + v(Factor::Humidity) * 0.4,
        DisasterType::Earthquake | DisasterType::Heat => {
            v(Factor::Temperature) + v(Factor::Rainfall) + v(Factor::Humidity)
        }
    };

    if raw.is_finite() {
        raw.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

pub fn derived_risk_series(records: &[Record], disaster: DisasterType) -> Vec<f64> {
    records.iter().map(|r| derived_risk(r, disaster)).collect()
}

pub fn correlations(records: &[Record], disaster: DisasterType) -> BTreeMap<Factor, f64> {
    let risk = derived_risk_series(records, disaster);

    Factor::ALL
        .iter()
        .map(|factor| {
            // present values only, paired with the risk series by position
            let values: Vec<f64> = records.iter().filter_map(|r| r.value(*factor)).collect();
            let r = if values.len() >= MIN_FACTOR_VALUES {
                stats::pearson(&values, &risk)
            } else {
                0.0
            };
            debug!(factor = %factor, samples = values.len(), r, "factor correlation");
            (*factor, r)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldValue;

    fn flood_record(rainfall: f64, humidity: f64, pressure: f64) -> Record {
        Record {
            rainfall: Some(FieldValue::Number(rainfall)),
            humidity: Some(FieldValue::Number(humidity)),
            pressure: Some(FieldValue::Number(pressure)),
            ..Record::default()
        }
    }

    #[test]
    fn flood_derived_risk_uses_weights() {
        let record = flood_record(100.0, 50.0, 990.0);
        // 40 + 15 + 3
        assert!((derived_risk(&record, DisasterType::Flood) - 58.0).abs() < 1e-9);
    }

    #[test]
    fn derived_risk_is_clamped() {
        let record = flood_record(500.0, 100.0, 900.0);
        assert_eq!(derived_risk(&record, DisasterType::Flood), 100.0);
        let calm = flood_record(0.0, 0.0, 1040.0);
        assert_eq!(derived_risk(&calm, DisasterType::Flood), 0.0);
    }

    #[test]
    fn missing_fields_default_to_zero() {
        let record = Record {
            wind_speed: Some(FieldValue::Number(100.0)),
            ..Record::default()
        };
        // 50 + 1013 * 0.3, clamped
        assert_eq!(derived_risk(&record, DisasterType::Cyclone), 100.0);
        assert_eq!(derived_risk(&record, DisasterType::Landslide), 0.0);
    }

    #[test]
    fn other_disasters_sum_raw_fields() {
        let record = Record {
            temperature: Some(FieldValue::Number(20.0)),
            rainfall: Some(FieldValue::Number(10.0)),
            humidity: Some(FieldValue::Number(30.0)),
            ..Record::default()
        };
        assert_eq!(derived_risk(&record, DisasterType::Earthquake), 60.0);
        assert_eq!(derived_risk(&record, DisasterType::Heat), 60.0);
    }

    #[test]
    fn six_values_are_enough_to_correlate() {
        let records: Vec<Record> = (0..6)
            .map(|i| flood_record(20.0 * i as f64, 50.0, 1000.0))
            .collect();
        let result = correlations(&records, DisasterType::Flood);
        assert!(result[&Factor::Rainfall] > 0.99);
        // constant humidity has no spread
        assert_eq!(result[&Factor::Humidity], 0.0);
    }

    #[test]
    fn sparse_factors_have_zero_correlation() {
        let records: Vec<Record> = (0..5)
            .map(|i| flood_record(20.0 * i as f64, 50.0, 1000.0))
            .collect();
        let result = correlations(&records, DisasterType::Flood);
        assert_eq!(result[&Factor::Rainfall], 0.0);
        assert_eq!(result[&Factor::Temperature], 0.0);
        assert_eq!(result.len(), 5);
    }

    #[test]
    fn rainfall_tracks_flood_risk() {
        let records: Vec<Record> = (0..12)
            .map(|i| flood_record(10.0 * i as f64, 60.0, 1000.0))
            .collect();
        let result = correlations(&records, DisasterType::Flood);
        assert!((result[&Factor::Rainfall] - 1.0).abs() < 1e-9);
        // humidity and pressure are constant
        assert_eq!(result[&Factor::Humidity], 0.0);
        assert_eq!(result[&Factor::Pressure], 0.0);
    }

    #[test]
    fn correlations_are_deterministic() {
        let records: Vec<Record> = (0..20)
            .map(|i| flood_record((i * 7 % 13) as f64 * 9.0, 40.0 + i as f64, 990.0 + (i % 5) as f64))
            .collect();
        assert_eq!(
            correlations(&records, DisasterType::Flood),
            correlations(&records, DisasterType::Flood)
        );
    }
}
