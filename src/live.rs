use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::locations;
use crate::models::CurrentConditions;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveReading {
    pub location: String,
    pub conditions: CurrentConditions,
    pub observed_at: DateTime<Utc>,
    pub provider: String,
}

pub struct LiveWeatherFeed<R> {
    api_key: Option<String>,
    rng: R,
}

impl<R: Rng> LiveWeatherFeed<R> {
    pub fn new(api_key: Option<String>, rng: R) -> Self {
        Self { api_key, rng }
    }

    fn provider(&self) -> String {
        match &self.api_key {
            Some(_) => "simulated (keyed)".to_string(),
            None => "simulated".to_string(),
        }
    }

    pub fn fetch(&mut self, location: &str) -> LiveReading {
        let profile = locations::profile_for(location);
        // Coastal places run wetter and windier.
        let exposure = profile.coastal_risk;

        let conditions = CurrentConditions {
            rainfall: self.rng.gen_range(0.0..=120.0) * (1.0 + exposure),
            temperature: self.rng.gen_range(18.0..=42.0),
            humidity: self.rng.gen_range(35.0..=75.0) + exposure * 25.0,
            wind_speed: self.rng.gen_range(0.0..=70.0) * (1.0 + exposure),
            pressure: self.rng.gen_range(965.0..=1025.0),
            population_density: profile.population_density,
        };

        LiveReading {
            location: location.to_string(),
            conditions: conditions.sanitized(),
            observed_at: Utc::now(),
            provider: self.provider(),
        }
    }
}
