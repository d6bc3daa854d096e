use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::models::{
    Analysis, CurrentConditions, DisasterType, Factor, PredictionResult, PredictionSource,
    RiskLevel, Timeline,
};
use crate::patterns;
use crate::seasonal;

pub const MIN_CORRELATION_WEIGHT: f64 = 0.1;
pub const PATTERN_BONUS: f64 = 20.0;
pub const BASE_POPULATION: f64 = 5000.0;
pub const STRONG_CORRELATION: f64 = 0.6;

pub fn factor_risk(factor: Factor, value: f64, disaster: DisasterType) -> f64 {
    let risk = match factor {
        Factor::Rainfall => (value / 200.0 * 100.0).min(100.0),
        Factor::Humidity => ((value - 50.0) * 2.0).max(0.0),
        Factor::Pressure => ((1013.0 - value) * 2.0).max(0.0),
        Factor::WindSpeed => (value / 150.0 * 100.0).min(100.0),
        Factor::Temperature => match disaster {
            DisasterType::Heat => ((value - 30.0) * 6.0).max(0.0),
            _ => ((value - 25.0).abs() * 3.0).min(100.0),
        },
    };
    if risk.is_finite() {
        risk.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

pub fn weighted_factor_score(
    conditions: &CurrentConditions,
    analysis: &Analysis,
    disaster: DisasterType,
) -> f64 {
    let mut total = 0.0;
    let mut weight = 0.0;
    for factor in Factor::ALL {
        let w = analysis.correlation(factor).abs();
        if w <= MIN_CORRELATION_WEIGHT {
            continue;
        }
        total += factor_risk(factor, conditions.factor(factor), disaster) * w;
        weight += w;
    }
    if weight > 0.0 {
        total / weight
    } else {
        0.0
    }
}

pub fn clamp_score(score: f64) -> u8 {
    if score.is_finite() {
        score.clamp(0.0, 100.0).round() as u8
    } else {
        0
    }
}

pub fn timeline(conditions: &CurrentConditions, risk_score: u8) -> Timeline {
    if conditions.rainfall > 100.0 || conditions.wind_speed > 80.0 {
        Timeline::Hours2To6
    } else if conditions.pressure < 980.0 || risk_score > 80 {
        Timeline::Hours6To24
    } else if risk_score > 60 {
        Timeline::Days1To2
    } else if risk_score > 40 {
        Timeline::Days2To5
    } else {
        Timeline::Days5To10
    }
}

pub fn affected_population(conditions: &CurrentConditions, analysis: &Analysis, risk_score: u8) -> u64 {
    let mut impact = 1.0;
    if analysis.correlation(Factor::Rainfall) > 0.5 && conditions.rainfall > 80.0 {
        impact *= 1.5;
    }
    if analysis.correlation(Factor::WindSpeed) > 0.5 && conditions.wind_speed > 60.0 {
        impact *= 1.3;
    }
    let estimate = BASE_POPULATION * (risk_score as f64 / 100.0) * impact;
    estimate.max(0.0).round() as u64
}

pub fn tier_recommendations(level: RiskLevel, disaster: DisasterType) -> Vec<String> {
    match level {
        RiskLevel::High => vec![
            format!("Activate the {disaster} emergency response plan immediately"),
            "Issue public warnings and prepare evacuation of vulnerable areas".to_string(),
            "Pre-position rescue teams, medical supplies and relief material".to_string(),
            "Open emergency shelters and confirm communication channels".to_string(),
        ],
        RiskLevel::Medium => vec![
            format!("Place {disaster} response teams on standby"),
            "Review evacuation routes and shelter capacity".to_string(),
            "Increase monitoring frequency of weather conditions".to_string(),
        ],
        RiskLevel::Low => vec![
            "Continue routine monitoring of conditions".to_string(),
            "Keep community preparedness plans up to date".to_string(),
        ],
    }
}

pub fn tier_reasoning(level: RiskLevel, disaster: DisasterType) -> String {
    match level {
        RiskLevel::High => format!(
            "High {disaster} risk: current conditions resemble the worst periods in the history"
        ),
        RiskLevel::Medium => format!(
            "Moderate {disaster} risk: some drivers are elevated relative to the history"
        ),
        RiskLevel::Low => format!(
            "Low {disaster} risk: current conditions sit within the usual historical range"
        ),
    }
}

fn correlated_recommendations(analysis: &Analysis, disaster: DisasterType) -> Vec<String> {
    let strong = |factor: Factor| analysis.correlation(factor) > STRONG_CORRELATION;
    let mut extra = Vec::new();
    match disaster {
        DisasterType::Flood => {
            if strong(Factor::Rainfall) {
                extra.push("Clear drainage channels and watch river gauges closely".to_string());
            }
            if strong(Factor::Humidity) {
                extra.push("Prepare for prolonged saturation of low-lying ground".to_string());
            }
        }
        DisasterType::Cyclone => {
            if strong(Factor::WindSpeed) {
                extra.push("Secure loose structures and restrict coastal movement".to_string());
            }
            if analysis.correlation(Factor::Pressure) < -STRONG_CORRELATION {
                extra.push("Track pressure drops hourly for storm intensification".to_string());
            }
        }
        DisasterType::Landslide => {
            if strong(Factor::Rainfall) {
                extra.push("Inspect slopes and close roads below unstable hillsides".to_string());
            }
        }
        DisasterType::Heat => {
            if strong(Factor::Temperature) {
                extra.push("Open cooling centres and issue hydration advisories".to_string());
            }
        }
        DisasterType::Earthquake => {}
    }
    extra
}

fn quarter_label(quarter: usize) -> &'static str {
    match quarter {
        0 => "Q1 (Jan-Mar)",
        1 => "Q2 (Apr-Jun)",
        2 => "Q3 (Jul-Sep)",
        _ => "Q4 (Oct-Dec)",
    }
}

pub fn synthesize(
    conditions: &CurrentConditions,
    analysis: &Analysis,
    disaster: DisasterType,
    location: &str,
    today: NaiveDate,
) -> PredictionResult {
    let conditions = conditions.sanitized();

    let base = weighted_factor_score(&conditions, analysis, disaster);
    let matched = patterns::best_match(&analysis.risk_patterns, &conditions);
    let quarter = seasonal::quarter_of(today);
    let seasonal = analysis.seasonal_factors.for_quarter(quarter);
    let risk_score = clamp_score((base + matched * PATTERN_BONUS) * seasonal);

    let level = RiskLevel::from_score(risk_score);
    let mut recommendations = tier_recommendations(level, disaster);
    recommendations.extend(correlated_recommendations(analysis, disaster));

    let scope = if location.trim().is_empty() { "all locations" } else { location };
    let mut reasoning = vec![
        tier_reasoning(level, disaster),
        format!("Analyzed {} historical records for {}", analysis.record_count, scope),
    ];
    for factor in Factor::ALL {
        let r = analysis.correlation(factor);
        if r.abs() > MIN_CORRELATION_WEIGHT {
            reasoning.push(format!(
                "{} correlation with historical {} risk: {:.2}",
                factor.label(),
                disaster,
                r
            ));
        }
    }
    if matched > 0.0 {
        if let Some(pattern) = analysis.risk_patterns.first() {
            reasoning.push(format!(
                "Current conditions match {:.0}% of a high-risk pattern observed {} times",
                matched * 100.0,
                pattern.occurrences
            ));
        }
    }
    reasoning.push(format!(
        "Seasonal multiplier for {}: {:.2}",
        quarter_label(quarter),
        seasonal
    ));

    PredictionResult {
        id: Uuid::new_v4(),
        disaster,
        location: location.to_string(),
        source: PredictionSource::Dataset,
        risk_score,
        confidence: clamp_score(analysis.confidence),
        timeline: timeline(&conditions, risk_score),
        affected_population: affected_population(&conditions, analysis, risk_score),
        recommendations,
        reasoning,
        analysis: Some(analysis.clone()),
        generated_at: Utc::now(),
    }
}
