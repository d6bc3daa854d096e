use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Factor {
    Temperature,
    Humidity,
    Pressure,
    WindSpeed,
    Rainfall,
}

impl Factor {
    pub const ALL: [Factor; 5] = [
        Factor::Temperature,
        Factor::Humidity,
        Factor::Pressure,
        Factor::WindSpeed,
        Factor::Rainfall,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Factor::Temperature => "temperature",
            Factor::Humidity => "humidity",
            Factor::Pressure => "pressure",
            Factor::WindSpeed => "windSpeed",
            Factor::Rainfall => "rainfall",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Factor::Temperature => "Temperature",
            Factor::Humidity => "Humidity",
            Factor::Pressure => "Pressure",
            Factor::WindSpeed => "Wind speed",
            Factor::Rainfall => "Rainfall",
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cell value in a numeric slot. Cells that fail numeric parsing keep their raw text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => FieldValue::Number(value),
            _ => FieldValue::Text(raw.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(value) if value.is_finite() => Some(*value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rainfall: Option<FieldValue>,
}

impl Record {
    pub fn field(&self, factor: Factor) -> Option<&FieldValue> {
        match factor {
            Factor::Temperature => self.temperature.as_ref(),
            Factor::Humidity => self.humidity.as_ref(),
            Factor::Pressure => self.pressure.as_ref(),
            Factor::WindSpeed => self.wind_speed.as_ref(),
            Factor::Rainfall => self.rainfall.as_ref(),
        }
    }

    pub fn field_mut(&mut self, factor: Factor) -> &mut Option<FieldValue> {
        match factor {
            Factor::Temperature => &mut self.temperature,
            Factor::Humidity => &mut self.humidity,
            Factor::Pressure => &mut self.pressure,
            Factor::WindSpeed => &mut self.wind_speed,
            Factor::Rainfall => &mut self.rainfall,
        }
    }

    pub fn value(&self, factor: Factor) -> Option<f64> {
        self.field(factor).and_then(FieldValue::as_number)
    }

    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.location.is_none()
            && Factor::ALL.iter().all(|factor| self.field(*factor).is_none())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisasterType {
    Flood,
    Earthquake,
    Cyclone,
    Landslide,
    Heat,
}

impl DisasterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisasterType::Flood => "flood",
            DisasterType::Earthquake => "earthquake",
            DisasterType::Cyclone => "cyclone",
            DisasterType::Landslide => "landslide",
            DisasterType::Heat => "heat",
        }
    }
}

impl fmt::Display for DisasterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisasterType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "flood" => Ok(DisasterType::Flood),
            "earthquake" => Ok(DisasterType::Earthquake),
            "cyclone" => Ok(DisasterType::Cyclone),
            "landslide" => Ok(DisasterType::Landslide),
            "heat" | "heatwave" => Ok(DisasterType::Heat),
            other => Err(format!(
                "unknown disaster type '{other}' (expected flood, earthquake, cyclone, landslide or heat)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetSource {
    Csv,
    Document,
}

impl DatasetSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetSource::Csv => "csv",
            DatasetSource::Document => "document",
        }
    }
}

impl FromStr for DatasetSource {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "csv" => Ok(DatasetSource::Csv),
            "document" => Ok(DatasetSource::Document),
            other => Err(format!("unknown dataset source '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSpan {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_records: usize,
    pub date_range: Option<DateSpan>,
    pub locations: Vec<String>,
    pub avg_temperature: f64,
    pub avg_humidity: f64,
    pub avg_rainfall: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub id: Uuid,
    pub name: String,
    pub source: DatasetSource,
    pub uploaded_at: DateTime<Utc>,
    pub columns: Vec<String>,
    pub records: Vec<Record>,
    pub summary: Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorRange {
    pub min: f64,
    pub max: f64,
}

impl FactorRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskPattern {
    pub conditions: BTreeMap<Factor, FactorRange>,
    pub risk_score: f64,
    pub occurrences: usize,
    pub severity: String,
}

/// Quarter-of-year multipliers, index 0 is January to March.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonalFactors(pub [f64; 4]);

impl Default for SeasonalFactors {
    fn default() -> Self {
        SeasonalFactors([1.0; 4])
    }
}

impl SeasonalFactors {
    pub fn for_quarter(&self, quarter: usize) -> f64 {
        self.0.get(quarter).copied().unwrap_or(1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub disaster: DisasterType,
    pub record_count: usize,
    pub correlations: BTreeMap<Factor, f64>,
    pub trends: BTreeMap<Factor, f64>,
    pub risk_patterns: Vec<RiskPattern>,
    pub seasonal_factors: SeasonalFactors,
    pub confidence: f64,
}

impl Analysis {
    pub fn correlation(&self, factor: Factor) -> f64 {
        self.correlations.get(&factor).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    pub rainfall: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub pressure: f64,
    pub population_density: f64,
}

pub const STANDARD_PRESSURE_HPA: f64 = 1013.0;

impl Default for CurrentConditions {
    fn default() -> Self {
        CurrentConditions {
            rainfall: 0.0,
            temperature: 0.0,
            humidity: 0.0,
            wind_speed: 0.0,
            pressure: STANDARD_PRESSURE_HPA,
            population_density: 0.0,
        }
    }
}

impl CurrentConditions {
    pub fn sanitized(&self) -> Self {
        fn finite_or(value: f64, default: f64) -> f64 {
            if value.is_finite() {
                value
            } else {
                default
            }
        }

        CurrentConditions {
            rainfall: finite_or(self.rainfall, 0.0).max(0.0),
            temperature: finite_or(self.temperature, 0.0),
            humidity: finite_or(self.humidity, 0.0).clamp(0.0, 100.0),
            wind_speed: finite_or(self.wind_speed, 0.0).max(0.0),
            pressure: finite_or(self.pressure, STANDARD_PRESSURE_HPA),
            population_density: finite_or(self.population_density, 0.0).max(0.0),
        }
    }

    pub fn factor(&self, factor: Factor) -> f64 {
        match factor {
            Factor::Temperature => self.temperature,
            Factor::Humidity => self.humidity,
            Factor::Pressure => self.pressure,
            Factor::WindSpeed => self.wind_speed,
            Factor::Rainfall => self.rainfall,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionInput {
    pub disaster: DisasterType,
    pub location: String,
    pub conditions: CurrentConditions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeline {
    #[serde(rename = "2-6 hours")]
    Hours2To6,
    #[serde(rename = "6-24 hours")]
    Hours6To24,
    #[serde(rename = "1-2 days")]
    Days1To2,
    #[serde(rename = "2-5 days")]
    Days2To5,
    #[serde(rename = "5-10 days")]
    Days5To10,
}

impl Timeline {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeline::Hours2To6 => "2-6 hours",
            Timeline::Hours6To24 => "6-24 hours",
            Timeline::Days1To2 => "1-2 days",
            Timeline::Days2To5 => "2-5 days",
            Timeline::Days5To10 => "5-10 days",
        }
    }
}

impl fmt::Display for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            71..=u8::MAX => RiskLevel::High,
            41..=70 => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionSource {
    Dataset,
    Manual,
    Fallback,
}

impl PredictionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionSource::Dataset => "dataset",
            PredictionSource::Manual => "manual",
            PredictionSource::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub id: Uuid,
    pub disaster: DisasterType,
    pub location: String,
    pub source: PredictionSource,
    pub risk_score: u8,
    pub confidence: u8,
    pub timeline: Timeline,
    pub affected_population: u64,
    pub recommendations: Vec<String>,
    pub reasoning: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Analysis>,
    pub generated_at: DateTime<Utc>,
}

impl PredictionResult {
    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_score(self.risk_score)
    }
}
