use tracing::debug;

use crate::correlation;
use crate::models::{Analysis, DisasterType, Record};
use crate::patterns;
use crate::seasonal;

const FULL_VOLUME_RECORDS: usize = 100;

pub fn analyze(records: &[Record], disaster: DisasterType) -> Analysis {
    let correlations = correlation::correlations(records, disaster);
    let risk_patterns = patterns::detect_patterns(records, disaster);
    let seasonal_factors = seasonal::seasonal_factors(records);
    let trends = seasonal::trends(records);

    let mean_abs_r = if correlations.is_empty() {
        0.0
    } else {
        correlations.values().map(|r| r.abs()).sum::<f64>() / correlations.len() as f64
    };
    let confidence = analysis_confidence(records.len(), mean_abs_r);

    debug!(
        disaster = %disaster,
        records = records.len(),
        patterns = risk_patterns.len(),
        confidence,
        "analysis complete"
    );

    Analysis {
        disaster,
        record_count: records.len(),
        correlations,
        trends,
        risk_patterns,
        seasonal_factors,
        confidence,
    }
}

pub fn analysis_confidence(record_count: usize, mean_abs_correlation: f64) -> f64 {
    let volume = record_count.min(FULL_VOLUME_RECORDS) as f64 / FULL_VOLUME_RECORDS as f64;
    let strength = if mean_abs_correlation.is_finite() {
        mean_abs_correlation.clamp(0.0, 1.0)
    } else {
        0.0
    };
    (volume * 60.0 + strength * 40.0).round().clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Factor, FieldValue};

    fn records() -> Vec<Record> {
        (0..40)
            .map(|i| Record {
                date: Some(format!("2024-{:02}-10", i % 12 + 1)),
                location: Some("Mumbai".to_string()),
                rainfall: Some(FieldValue::Number((i * 37 % 200) as f64)),
                humidity: Some(FieldValue::Number(50.0 + (i % 9) as f64 * 5.0)),
                pressure: Some(FieldValue::Number(975.0 + (i % 7) as f64 * 6.0)),
                temperature: Some(FieldValue::Number(24.0 + (i % 5) as f64)),
                wind_speed: Some(FieldValue::Number((i % 11) as f64 * 8.0)),
            })
            .collect()
    }

    #[test]
    fn analysis_is_idempotent() {
        let data = records();
        let first = analyze(&data, DisasterType::Flood);
        let second = analyze(&data, DisasterType::Flood);
        assert_eq!(first.correlations, second.correlations);
        assert_eq!(first.risk_patterns, second.risk_patterns);
        assert_eq!(first.seasonal_factors, second.seasonal_factors);
        assert_eq!(first, second);
    }

    #[test]
    fn analysis_covers_every_factor() {
        let analysis = analyze(&records(), DisasterType::Cyclone);
        assert_eq!(analysis.record_count, 40);
        for factor in Factor::ALL {
            assert!(analysis.correlations.contains_key(&factor));
            assert!(analysis.trends.contains_key(&factor));
            assert!((-1.0..=1.0).contains(&analysis.correlation(factor)));
        }
        assert!((0.0..=100.0).contains(&analysis.confidence));
    }

    #[test]
    fn confidence_scales_with_volume_and_strength() {
        assert_eq!(analysis_confidence(0, 0.0), 0.0);
        assert_eq!(analysis_confidence(50, 0.5), 50.0);
        assert_eq!(analysis_confidence(500, 1.0), 100.0);
        assert_eq!(analysis_confidence(100, f64::NAN), 60.0);
    }
}
