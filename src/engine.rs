use chrono::{NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

use crate::analysis;
use crate::config::EngineSettings;
use crate::error::{EngineError, Result};
use crate::models::{
    Dataset, PredictionInput, PredictionResult, PredictionSource, Record, Timeline,
};
use crate::risk;

pub const FALLBACK_RISK_SCORE: u8 = 30;
pub const FALLBACK_CONFIDENCE: u8 = 40;

pub fn records_for_location<'a>(records: &'a [Record], location: &str) -> Vec<&'a Record> {
    let wanted = location.trim();
    if wanted.is_empty() || wanted.eq_ignore_ascii_case("all") {
        return records.iter().collect();
    }
    records
        .iter()
        .filter(|r| {
            r.location
                .as_deref()
                .is_some_and(|l| l.trim().eq_ignore_ascii_case(wanted))
        })
        .collect()
}

pub fn predict(
    dataset: &Dataset,
    input: &PredictionInput,
    settings: &EngineSettings,
    today: NaiveDate,
) -> Result<PredictionResult> {
    let history: Vec<Record> = records_for_location(&dataset.records, &input.location)
        .into_iter()
        .cloned()
        .collect();

    if history.len() < settings.min_history_records {
        return Err(EngineError::InsufficientData {
            location: input.location.clone(),
            found: history.len(),
            required: settings.min_history_records,
        });
    }

    let analysis = analysis::analyze(&history, input.disaster);
    Ok(risk::synthesize(
        &input.conditions,
        &analysis,
        input.disaster,
        &input.location,
        today,
    ))
}

pub fn fallback(input: &PredictionInput, found: usize, required: usize) -> PredictionResult {
    PredictionResult {
        id: Uuid::new_v4(),
        disaster: input.disaster,
        location: input.location.clone(),
        source: PredictionSource::Fallback,
        risk_score: FALLBACK_RISK_SCORE,
        confidence: FALLBACK_CONFIDENCE,
        timeline: Timeline::Days5To10,
        affected_population: 0,
        recommendations: vec![
            "Upload more historical data for this location to improve accuracy".to_string(),
            "Monitor official weather advisories".to_string(),
            "Keep emergency supplies and contact lists ready".to_string(),
        ],
        reasoning: vec![format!(
            "Only {found} historical records found for {} ({required} required); using baseline estimate",
            input.location
        )],
        analysis: None,
        generated_at: Utc::now(),
    }
}

pub fn predict_or_fallback(
    dataset: &Dataset,
    input: &PredictionInput,
    settings: &EngineSettings,
    today: NaiveDate,
) -> Result<PredictionResult> {
    match predict(dataset, input, settings, today) {
        Err(EngineError::InsufficientData {
            location,
            found,
            required,
        }) => {
            info!(%location, found, required, "insufficient history, using fallback");
            Ok(fallback(input, found, required))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{build_dataset, NormalizedTable};
    use crate::models::{CurrentConditions, DatasetSource, DisasterType, Factor, FieldValue};

    fn record(location: &str, rainfall: f64) -> Record {
        Record {
            date: Some("2024-07-01".to_string()),
            location: Some(location.to_string()),
            rainfall: Some(FieldValue::Number(rainfall)),
            humidity: Some(FieldValue::Number(90.0)),
            pressure: Some(FieldValue::Number(980.0)),
            ..Record::default()
        }
    }

    fn dataset(records: Vec<Record>) -> Dataset {
        build_dataset(
            "test",
            DatasetSource::Csv,
            NormalizedTable {
                columns: vec!["location".to_string(), "rainfall".to_string()],
                records,
            },
        )
    }

    fn input(location: &str) -> PredictionInput {
        PredictionInput {
            disaster: DisasterType::Flood,
            location: location.to_string(),
            conditions: CurrentConditions {
                rainfall: 150.0,
                temperature: 29.0,
                humidity: 90.0,
                wind_speed: 20.0,
                pressure: 980.0,
                population_density: 2000.0,
            },
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, 1).unwrap()
    }

    #[test]
    fn location_filter_is_case_insensitive() {
        let records = vec![record("Mumbai", 10.0), record("mumbai ", 20.0), record("Pune", 30.0)];
        assert_eq!(records_for_location(&records, "MUMBAI").len(), 2);
        assert_eq!(records_for_location(&records, "").len(), 3);
        assert_eq!(records_for_location(&records, "all").len(), 3);
    }

    #[test]
    fn fallback_iff_fewer_than_ten_records() {
        let settings = EngineSettings::default();
        for count in [0usize, 1, 9, 10, 11, 25] {
            let records: Vec<Record> = (0..count).map(|i| record("Mumbai", 100.0 + i as f64)).collect();
            let result = predict_or_fallback(&dataset(records), &input("Mumbai"), &settings, today()).unwrap();
            if count < 10 {
                assert_eq!(result.source, PredictionSource::Fallback);
                assert_eq!(result.risk_score, 30);
                assert_eq!(result.confidence, 40);
                assert!(result.analysis.is_none());
            } else {
                assert_eq!(result.source, PredictionSource::Dataset);
            }
        }
    }

    #[test]
    fn other_locations_do_not_count_toward_history() {
        let mut records: Vec<Record> = (0..20).map(|_| record("Pune", 120.0)).collect();
        records.extend((0..5).map(|_| record("Mumbai", 120.0)));
        let err = predict(&dataset(records), &input("Mumbai"), &EngineSettings::default(), today())
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientData { found: 5, required: 10, .. }
        ));
    }

    #[test]
    fn heavy_rain_history_produces_pattern() {
        let records: Vec<Record> = (0..15).map(|_| record("Mumbai", 150.0)).collect();
        let result = predict(&dataset(records), &input("Mumbai"), &EngineSettings::default(), today())
            .unwrap();
        let analysis = result.analysis.unwrap();
        assert_eq!(analysis.risk_patterns.len(), 1);
        assert_eq!(analysis.risk_patterns[0].occurrences, 15);
        let range = analysis.risk_patterns[0].conditions[&Factor::Rainfall];
        assert_eq!((range.min, range.max), (150.0, 150.0));
        assert!(result.risk_score <= 100);
    }
}
