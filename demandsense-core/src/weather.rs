use crate::{
    Config, WeatherReading,
    error::WeatherError,
    weather::{openweather::OpenWeatherSource, simulation::SimulatedWeather},
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug};

pub mod openweather;
pub mod simulation;

pub use simulation::{Scenario, SimCondition};

/// Where the dashboard takes its weather from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SourceMode {
    #[default]
    Simulation,
    Live,
}

impl SourceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceMode::Simulation => "simulation",
            SourceMode::Live => "live",
        }
    }

    /// Label shown in the sidebar selector.
    pub fn label(&self) -> &'static str {
        match self {
            SourceMode::Simulation => "Simulation",
            SourceMode::Live => "Live API",
        }
    }

    pub const fn all() -> &'static [SourceMode] {
        &[SourceMode::Simulation, SourceMode::Live]
    }
}

impl std::fmt::Display for SourceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<&str> for SourceMode {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.trim().to_lowercase();

        match lower.as_str() {
            "simulation" | "sim" => Ok(SourceMode::Simulation),
            "live" | "live api" => Ok(SourceMode::Live),
            _ => Err(anyhow::anyhow!(
                "Unknown source mode '{value}'. Supported modes: simulation, live."
            )),
        }
    }
}

#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    /// Resolve the current weather for `location`.
    async fn current(&self, location: &str) -> Result<WeatherReading, WeatherError>;
}

/// Construct a weather source for the selected mode.
///
/// `scenario` is only consulted in simulation mode.
pub fn weather_source(
    mode: SourceMode,
    config: &Config,
    scenario: Scenario,
) -> anyhow::Result<Box<dyn WeatherSource>> {
    let boxed: Box<dyn WeatherSource> = match mode {
        SourceMode::Simulation => Box::new(SimulatedWeather::new(scenario)?),
        SourceMode::Live => {
            let api_key = config.weather_api_key()?;
            Box::new(OpenWeatherSource::new(
                config.weather.base_url.clone(),
                api_key.to_owned(),
            ))
        }
    };

    Ok(boxed)
}

/// Case-sensitive substring test used by the rain rule.
pub fn is_raining(condition: &str) -> bool {
    condition.contains("Rain") || condition.contains("Drizzle")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_mode_as_str_roundtrip() {
        for mode in SourceMode::all() {
            let parsed = SourceMode::try_from(mode.as_str()).expect("roundtrip should succeed");
            assert_eq!(*mode, parsed);

            let parsed = SourceMode::try_from(mode.label()).expect("label should parse too");
            assert_eq!(*mode, parsed);
        }
    }

    #[test]
    fn unknown_mode_error() {
        let err = SourceMode::try_from("satellite").unwrap_err();
        assert!(err.to_string().contains("Unknown source mode"));
    }

    #[test]
    fn live_source_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = weather_source(SourceMode::Live, &cfg, Scenario::default()).unwrap_err();
        assert!(err.to_string().contains("No weather API key configured"));
    }

    #[test]
    fn live_source_builds_when_configured() {
        let mut cfg = Config::default();
        cfg.secrets.weather_api_key = Some("KEY".into());

        assert!(weather_source(SourceMode::Live, &cfg, Scenario::default()).is_ok());
    }

    #[test]
    fn simulation_source_needs_no_secrets() {
        let cfg = Config::default();
        assert!(weather_source(SourceMode::Simulation, &cfg, Scenario::default()).is_ok());
    }

    #[test]
    fn simulation_rejects_out_of_range_temperature() {
        let cfg = Config::default();
        let scenario = Scenario { temperature_c: 46, condition: SimCondition::Clear };
        assert!(weather_source(SourceMode::Simulation, &cfg, scenario).is_err());
    }

    #[test]
    fn rain_matching_is_substring_and_case_sensitive() {
        assert!(is_raining("Rain"));
        assert!(is_raining("Drizzle"));
        assert!(is_raining("Freezing Rain"));
        assert!(!is_raining("rain"));
        assert!(!is_raining("Thunderstorm"));
        assert!(!is_raining("Snow"));
    }
}
