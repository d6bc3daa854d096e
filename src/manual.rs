use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use crate::error::{EngineError, Result};
use crate::locations::{self, LocationProfile};
use crate::models::{
    CurrentConditions, DisasterType, PredictionInput, PredictionResult, PredictionSource,
    RiskLevel,
};
use crate::risk;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Rainfall,
    Temperature,
    Humidity,
    WindSpeed,
    Pressure,
    PopulationDensity,
    SeismicZone,
    CoastalRisk,
}

impl Input {
    fn read(&self, conditions: &CurrentConditions, profile: &LocationProfile) -> f64 {
        match self {
            Input::Rainfall => conditions.rainfall,
            Input::Temperature => conditions.temperature,
            Input::Humidity => conditions.humidity,
            Input::WindSpeed => conditions.wind_speed,
            Input::Pressure => conditions.pressure,
            Input::PopulationDensity => conditions.population_density,
            Input::SeismicZone => profile.seismic_zone as f64,
            Input::CoastalRisk => profile.coastal_risk,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Input::Rainfall => "Rainfall",
            Input::Temperature => "Temperature",
            Input::Humidity => "Humidity",
            Input::WindSpeed => "Wind speed",
            Input::Pressure => "Pressure",
            Input::PopulationDensity => "Population density",
            Input::SeismicZone => "Seismic zone",
            Input::CoastalRisk => "Coastal risk",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    AtLeast,
    AtMost,
}

/// One input with `(threshold, points)` tiers, most severe first. Only the first matching tier scores.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub input: Input,
    pub direction: Direction,
    pub tiers: &'static [(f64, f64)],
}

impl Rule {
    pub fn points(&self, value: f64) -> f64 {
        self.tiers
            .iter()
            .find(|(threshold, _)| match self.direction {
                Direction::AtLeast => value >= *threshold,
                Direction::AtMost => value <= *threshold,
            })
            .map(|(_, points)| *points)
            .unwrap_or(0.0)
    }
}

const FLOOD_RULES: &[Rule] = &[
    Rule { input: Input::Rainfall, direction: Direction::AtLeast, tiers: &[(200.0, 40.0), (100.0, 30.0), (50.0, 15.0), (20.0, 5.0)] },
    Rule { input: Input::Humidity, direction: Direction::AtLeast, tiers: &[(90.0, 15.0), (80.0, 10.0), (70.0, 5.0)] },
    Rule { input: Input::Pressure, direction: Direction::AtMost, tiers: &[(980.0, 15.0), (1000.0, 8.0)] },
    Rule { input: Input::CoastalRisk, direction: Direction::AtLeast, tiers: &[(0.7, 15.0), (0.4, 8.0)] },
    Rule { input: Input::PopulationDensity, direction: Direction::AtLeast, tiers: &[(10_000.0, 10.0), (5_000.0, 5.0)] },
];

const EARTHQUAKE_RULES: &[Rule] = &[
    Rule { input: Input::SeismicZone, direction: Direction::AtLeast, tiers: &[(5.0, 45.0), (4.0, 35.0), (3.0, 20.0), (2.0, 10.0)] },
    Rule { input: Input::PopulationDensity, direction: Direction::AtLeast, tiers: &[(15_000.0, 30.0), (10_000.0, 22.0), (5_000.0, 15.0), (1_000.0, 8.0)] },
    Rule { input: Input::Rainfall, direction: Direction::AtLeast, tiers: &[(150.0, 10.0), (80.0, 5.0)] },
    Rule { input: Input::CoastalRisk, direction: Direction::AtLeast, tiers: &[(0.7, 10.0)] },
];

const CYCLONE_RULES: &[Rule] = &[
    Rule { input: Input::WindSpeed, direction: Direction::AtLeast, tiers: &[(120.0, 35.0), (90.0, 28.0), (60.0, 15.0), (40.0, 5.0)] },
    Rule { input: Input::Pressure, direction: Direction::AtMost, tiers: &[(960.0, 25.0), (980.0, 18.0), (1000.0, 8.0)] },
    Rule { input: Input::CoastalRisk, direction: Direction::AtLeast, tiers: &[(0.7, 20.0), (0.4, 10.0), (0.1, 3.0)] },
    Rule { input: Input::Rainfall, direction: Direction::AtLeast, tiers: &[(150.0, 10.0), (80.0, 5.0)] },
    Rule { input: Input::Humidity, direction: Direction::AtLeast, tiers: &[(85.0, 5.0)] },
    Rule { input: Input::Temperature, direction: Direction::AtLeast, tiers: &[(28.0, 5.0)] },
];

const LANDSLIDE_RULES: &[Rule] = &[
    Rule { input: Input::Rainfall, direction: Direction::AtLeast, tiers: &[(200.0, 40.0), (120.0, 28.0), (60.0, 12.0)] },
    Rule { input: Input::Humidity, direction: Direction::AtLeast, tiers: &[(90.0, 12.0), (80.0, 6.0)] },
    Rule { input: Input::SeismicZone, direction: Direction::AtLeast, tiers: &[(4.0, 20.0), (3.0, 12.0), (2.0, 5.0)] },
    Rule { input: Input::PopulationDensity, direction: Direction::AtLeast, tiers: &[(5_000.0, 10.0), (1_000.0, 5.0)] },
    Rule { input: Input::WindSpeed, direction: Direction::AtLeast, tiers: &[(80.0, 5.0)] },
];

pub fn rule_table(disaster: DisasterType) -> Result<&'static [Rule]> {
    match disaster {
        DisasterType::Flood => Ok(FLOOD_RULES),
        DisasterType::Earthquake => Ok(EARTHQUAKE_RULES),
        DisasterType::Cyclone => Ok(CYCLONE_RULES),
        DisasterType::Landslide => Ok(LANDSLIDE_RULES),
        DisasterType::Heat => Err(EngineError::UnsupportedDisaster(disaster)),
    }
}

#[derive(Debug, Clone, Copy)]
struct ImpactProfile {
    impact_rate: f64,
    evacuation_rate: f64,
    confidence: u8,
}

fn impact_profile(disaster: DisasterType) -> ImpactProfile {
    match disaster {
        DisasterType::Flood => ImpactProfile { impact_rate: 0.35, evacuation_rate: 0.6, confidence: 78 },
        DisasterType::Earthquake => ImpactProfile { impact_rate: 0.6, evacuation_rate: 0.3, confidence: 55 },
        DisasterType::Cyclone => ImpactProfile { impact_rate: 0.45, evacuation_rate: 0.8, confidence: 82 },
        DisasterType::Landslide | DisasterType::Heat => {
            ImpactProfile { impact_rate: 0.25, evacuation_rate: 0.5, confidence: 65 }
        }
    }
}

fn affected_area_km2(disaster: DisasterType, conditions: &CurrentConditions, profile: &LocationProfile) -> f64 {
    match disaster {
        DisasterType::Flood => 25.0 + conditions.rainfall * 0.5,
        DisasterType::Earthquake => 50.0 + profile.seismic_zone as f64 * 40.0,
        DisasterType::Cyclone => 100.0 + conditions.wind_speed * 1.5,
        DisasterType::Landslide | DisasterType::Heat => 5.0 + conditions.rainfall * 0.1,
    }
}

pub fn rule_score(
    disaster: DisasterType,
    conditions: &CurrentConditions,
    profile: &LocationProfile,
) -> Result<(u8, Vec<String>)> {
    let mut total = 0.0;
    let mut reasoning = Vec::new();
    for rule in rule_table(disaster)? {
        let value = rule.input.read(conditions, profile);
        let points = rule.points(value);
        if points > 0.0 {
            reasoning.push(format!("{} at {:.1} adds {:.0} points", rule.input.label(), value, points));
        }
        total += points;
    }
    Ok((risk::clamp_score(total), reasoning))
}

pub fn predict_manual<R: Rng>(input: &PredictionInput, rng: &mut R) -> Result<PredictionResult> {
    let mut conditions = input.conditions.sanitized();
    let profile = locations::profile_for(&input.location);
    if conditions.population_density <= 0.0 {
        conditions.population_density = profile.population_density;
    }

    let (risk_score, mut reasoning) = rule_score(input.disaster, &conditions, &profile)?;
    let impact = impact_profile(input.disaster);
    let area = affected_area_km2(input.disaster, &conditions, &profile);
    let variance: f64 = rng.gen_range(0.8..=1.2);
    let affected = (conditions.population_density
        * area
        * (risk_score as f64 / 100.0)
        * impact.impact_rate
        * variance)
        .max(0.0)
        .round() as u64;
    let evacuations = (affected as f64 * impact.evacuation_rate).round() as u64;

    reasoning.insert(
        0,
        format!(
            "Location profile {}: seismic zone {}, coastal risk {:.2}",
            profile.name, profile.seismic_zone, profile.coastal_risk
        ),
    );
    reasoning.push(format!("Estimated affected area: {area:.0} km²"));
    reasoning.push(format!("Estimated evacuations needed: {evacuations}"));

    Ok(PredictionResult {
        id: Uuid::new_v4(),
        disaster: input.disaster,
        location: input.location.clone(),
        source: PredictionSource::Manual,
        risk_score,
        confidence: impact.confidence,
        timeline: risk::timeline(&conditions, risk_score),
        affected_population: affected,
        recommendations: risk::tier_recommendations(RiskLevel::from_score(risk_score), input.disaster),
        reasoning,
        analysis: None,
        generated_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn input(disaster: DisasterType, location: &str, conditions: CurrentConditions) -> PredictionInput {
        PredictionInput {
            disaster,
            location: location.to_string(),
            conditions,
        }
    }

    fn storm() -> CurrentConditions {
        CurrentConditions {
            rainfall: 220.0,
            temperature: 30.0,
            humidity: 95.0,
            wind_speed: 130.0,
            pressure: 955.0,
            population_density: 12_000.0,
        }
    }

    #[test]
    fn first_matching_tier_scores() {
        let rule = FLOOD_RULES[0];
        assert_eq!(rule.points(250.0), 40.0);
        assert_eq!(rule.points(100.0), 30.0);
        assert_eq!(rule.points(19.9), 0.0);
        let pressure = FLOOD_RULES[2];
        assert_eq!(pressure.points(975.0), 15.0);
        assert_eq!(pressure.points(1005.0), 0.0);
    }

    #[test]
    fn flood_rules_sum_contributions() {
        let profile = locations::profile_for("Mumbai");
        let (score, reasoning) = rule_score(DisasterType::Flood, &storm(), &profile).unwrap();
        // 40 + 15 + 15 + 15 + 10
        assert_eq!(score, 95);
        assert_eq!(reasoning.len(), 5);
    }

    #[test]
    fn earthquake_uses_location_seismic_zone() {
        let calm = CurrentConditions::default();
        let (guwahati, _) = rule_score(DisasterType::Earthquake, &calm, &locations::profile_for("Guwahati")).unwrap();
        let (bangalore, _) = rule_score(DisasterType::Earthquake, &calm, &locations::profile_for("Bangalore")).unwrap();
        assert_eq!(guwahati, 45);
        assert_eq!(bangalore, 10);
    }

    #[test]
    fn heat_has_no_rule_table() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = predict_manual(&input(DisasterType::Heat, "Delhi", storm()), &mut rng);
        assert!(matches!(result, Err(EngineError::UnsupportedDisaster(DisasterType::Heat))));
    }

    #[test]
    fn manual_population_stays_within_variance_band() {
        let conditions = storm();
        let profile = locations::profile_for("Mumbai");
        let (score, _) = rule_score(DisasterType::Cyclone, &conditions, &profile).unwrap();
        let nominal = conditions.population_density
            * (100.0 + conditions.wind_speed * 1.5)
            * (score as f64 / 100.0)
            * 0.45;

        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..50 {
            let result = predict_manual(&input(DisasterType::Cyclone, "Mumbai", conditions), &mut rng).unwrap();
            assert_eq!(result.risk_score, score);
            assert_eq!(result.source, PredictionSource::Manual);
            let affected = result.affected_population as f64;
            assert!(affected >= (nominal * 0.8).floor());
            assert!(affected <= (nominal * 1.2).ceil());
        }
    }

    #[test]
    fn missing_density_uses_location_profile() {
        let mut conditions = storm();
        conditions.population_density = 0.0;
        let mut rng = StdRng::seed_from_u64(5);
        let result = predict_manual(&input(DisasterType::Flood, "Kolkata", conditions), &mut rng).unwrap();
        assert!(result.affected_population > 0);
    }

    #[test]
    fn fuzzed_manual_scores_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(31);
        let disasters = [
            DisasterType::Flood,
            DisasterType::Earthquake,
            DisasterType::Cyclone,
            DisasterType::Landslide,
        ];
        let places = ["Mumbai", "Shimla", "Nowhere", ""];
        for _ in 0..500 {
            let conditions = CurrentConditions {
                rainfall: rng.gen_range(-50.0..600.0),
                temperature: rng.gen_range(-30.0..55.0),
                humidity: if rng.gen_bool(0.05) { f64::NAN } else { rng.gen_range(0.0..110.0) },
                wind_speed: rng.gen_range(0.0..300.0),
                pressure: rng.gen_range(900.0..1050.0),
                population_density: rng.gen_range(-100.0..40_000.0),
            };
            let disaster = disasters[rng.gen_range(0..disasters.len())];
            let place = places[rng.gen_range(0..places.len())];
            let result = predict_manual(&input(disaster, place, conditions), &mut rng).unwrap();
            assert!(result.risk_score <= 100);
        }
    }
}
