use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::{error::WeatherError, model::WeatherReading};

use super::WeatherSource;

/// Slider bounds for simulated temperature, in °C.
pub const TEMPERATURE_RANGE: RangeInclusive<i32> = -10..=45;
pub const DEFAULT_TEMPERATURE_C: i32 = 22;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SimCondition {
    #[default]
    Clear,
    Rain,
    Snow,
}

impl SimCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimCondition::Clear => "Clear",
            SimCondition::Rain => "Rain",
            SimCondition::Snow => "Snow",
        }
    }

    pub const fn all() -> &'static [SimCondition] {
        &[SimCondition::Clear, SimCondition::Rain, SimCondition::Snow]
    }
}

impl std::fmt::Display for SimCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-chosen weather for simulation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scenario {
    pub temperature_c: i32,
    pub condition: SimCondition,
}

impl Default for Scenario {
    fn default() -> Self {
        Self { temperature_c: DEFAULT_TEMPERATURE_C, condition: SimCondition::Clear }
    }
}

#[derive(Debug, Clone)]
pub struct SimulatedWeather {
    scenario: Scenario,
}

impl SimulatedWeather {
    pub fn new(scenario: Scenario) -> Result<Self, WeatherError> {
        if !TEMPERATURE_RANGE.contains(&scenario.temperature_c) {
            return Err(WeatherError::InvalidScenario(format!(
                "temperature {}°C is outside {}..={}",
                scenario.temperature_c,
                TEMPERATURE_RANGE.start(),
                TEMPERATURE_RANGE.end(),
            )));
        }

        Ok(Self { scenario })
    }

    pub fn reading(&self, location: &str) -> WeatherReading {
        WeatherReading {
            location: format!("{location} (Sim)"),
            temperature_c: f64::from(self.scenario.temperature_c),
            condition: self.scenario.condition.as_str().to_string(),
            description: None,
        }
    }
}

#[async_trait]
impl WeatherSource for SimulatedWeather {
    async fn current(&self, location: &str) -> Result<WeatherReading, WeatherError> {
        Ok(self.reading(location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wraps_scenario_with_simulated_location() {
        let source =
            SimulatedWeather::new(Scenario { temperature_c: -10, condition: SimCondition::Snow })
                .unwrap();

        let reading = source.current("Vadodara").await.unwrap();

        assert_eq!(reading.location, "Vadodara (Sim)");
        assert_eq!(reading.temperature_c, -10.0);
        assert_eq!(reading.condition, "Snow");
        assert!(reading.description.is_none());
    }

    #[test]
    fn bounds_are_inclusive() {
        for temperature_c in [-10, 45] {
            let scenario = Scenario { temperature_c, condition: SimCondition::Clear };
            assert!(SimulatedWeather::new(scenario).is_ok());
        }
        for temperature_c in [-11, 46] {
            let scenario = Scenario { temperature_c, condition: SimCondition::Clear };
            let err = SimulatedWeather::new(scenario).unwrap_err();
            assert!(matches!(err, WeatherError::InvalidScenario(_)));
        }
    }
}
