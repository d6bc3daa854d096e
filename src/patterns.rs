use std::collections::BTreeMap;

use crate::correlation::derived_risk;
use crate::models::{CurrentConditions, DisasterType, Factor, FactorRange, Record, RiskPattern};

pub const HIGH_RISK_THRESHOLD: f64 = 70.0;
pub const PATTERN_RISK_SCORE: f64 = 85.0;
pub const PATTERN_SEVERITY: &str = "high";

pub fn detect_patterns(records: &[Record], disaster: DisasterType) -> Vec<RiskPattern> {
    let high_risk: Vec<&Record> = records
        .iter()
        .filter(|r| derived_risk(r, disaster) > HIGH_RISK_THRESHOLD)
        .collect();

    if high_risk.is_empty() {
        return Vec::new();
    }

    let mut conditions = BTreeMap::new();
    for factor in Factor::ALL {
        let range = high_risk
            .iter()
            .filter_map(|r| r.value(factor))
            .fold(None, |range: Option<FactorRange>, value| {
                Some(match range {
                    Some(range) => FactorRange {
                        min: range.min.min(value),
                        max: range.max.max(value),
                    },
                    None => FactorRange { min: value, max: value },
                })
            });
        if let Some(range) = range {
            conditions.insert(factor, range);
        }
    }

    vec![RiskPattern {
        conditions,
        risk_score: PATTERN_RISK_SCORE,
        occurrences: high_risk.len(),
        severity: PATTERN_SEVERITY.to_string(),
    }]
}

pub fn match_fraction(pattern: &RiskPattern, conditions: &CurrentConditions) -> f64 {
    if pattern.conditions.is_empty() {
        return 0.0;
    }
    let matched = pattern
        .conditions
        .iter()
        .filter(|(factor, range)| range.contains(conditions.factor(**factor)))
        .count();
    matched as f64 / pattern.conditions.len() as f64
}

pub fn best_match(patterns: &[RiskPattern], conditions: &CurrentConditions) -> f64 {
    patterns
        .iter()
        .map(|p| match_fraction(p, conditions))
        .fold(0.0, f64::max)
}
