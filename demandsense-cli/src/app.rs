use demandsense_core::{
    Config, DashboardView, DemandEngine, InventoryStore, Scenario, SessionCache, SessionId,
    SourceMode, WeatherError, WeatherReading,
    inventory::{InventorySource, inventory_source},
    weather::{WeatherSource, weather_source},
};
use serde::Serialize;

/// What the sidebar asked for on this render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherInput {
    Simulated(Scenario),
    /// "Connect Satellite" was pressed: fetch now.
    LiveFetch,
    /// Live mode without a new fetch: reuse the session's last reading.
    LiveCached,
}

/// Result of one render.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Frame {
    Idle { message: String },
    ConnectionError { error: String },
    NoData { message: String },
    Dashboard(Box<DashboardView>),
}

pub const IDLE_MESSAGE: &str = "Select 'Simulation' or 'Live API' to start.";

/// Everything that outlives a single render.
pub struct App {
    config: Config,
    engine: DemandEngine,
    inventory: InventoryStore<Box<dyn InventorySource>>,
    sessions: SessionCache,
    session: SessionId,
}

impl App {
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let source = inventory_source(&config)?;
        let inventory = InventoryStore::new(source, config.cache_ttl());

        Ok(Self {
            config,
            engine: DemandEngine::default(),
            inventory,
            sessions: SessionCache::new(),
            session: SessionId::new(uuid::Uuid::new_v4().to_string()),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    async fn resolve_weather(
        &mut self,
        region: &str,
        input: WeatherInput,
    ) -> anyhow::Result<Option<Result<WeatherReading, WeatherError>>> {
        match input {
            WeatherInput::Simulated(scenario) => {
                // An out-of-range scenario is shown like any weather failure.
                let source = match weather_source(SourceMode::Simulation, &self.config, scenario) {
                    Ok(source) => source,
                    Err(e) => return e.downcast::<WeatherError>().map(|e| Some(Err(e))),
                };
                Ok(Some(source.current(region).await))
            }
            WeatherInput::LiveFetch => {
                let source = weather_source(SourceMode::Live, &self.config, Scenario::default())?;
                let result = source.current(region).await;
                if let Err(e) = &result {
                    tracing::warn!(region, error = %e, "live weather fetch failed");
                }
                self.sessions.record(&self.session, &result);
                Ok(Some(result))
            }
            WeatherInput::LiveCached => Ok(self.sessions.last(&self.session).cloned().map(Ok)),
        }
    }

    /// Evaluate one render of the dashboard.
    ///
    /// Errors only for setup problems (e.g. no API key); runtime failures
    /// become [`Frame::ConnectionError`] or [`Frame::NoData`].
    pub async fn frame(&mut self, region: &str, input: WeatherInput) -> anyhow::Result<Frame> {
        let weather = match self.resolve_weather(region, input).await? {
            None => return Ok(Frame::Idle { message: IDLE_MESSAGE.to_string() }),
            Some(Err(e)) => return Ok(Frame::ConnectionError { error: e.to_string() }),
            Some(Ok(reading)) => reading,
        };

        let inventory = self.inventory.load().await;
        let report = self.engine.calculate(&inventory, &weather);

        if report.is_empty() {
            return Ok(Frame::NoData { message: report.message });
        }

        Ok(Frame::Dashboard(Box::new(DashboardView::project(&report, &weather))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use demandsense_core::{MarketSignal, SimCondition};

    const INVENTORY_CSV: &str = "\
product_id,category,base_demand,current_stock
UMB-01,Monsoon,120,300
FAN-02,Summer,100,150
HTR-03,Winter,90,100
";

    fn app_with_csv(contents: Option<&str>) -> (tempfile::TempDir, App) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.csv");
        if let Some(contents) = contents {
            std::fs::write(&path, contents).unwrap();
        }

        let mut config = Config::default();
        config.inventory.csv_path = Some(path);

        let app = App::from_config(config).unwrap();
        (dir, app)
    }

    #[tokio::test]
    async fn simulated_heat_renders_dashboard() {
        let (_dir, mut app) = app_with_csv(Some(INVENTORY_CSV));
        let scenario = Scenario { temperature_c: 35, condition: SimCondition::Clear };

        let frame = app.frame("Vadodara", WeatherInput::Simulated(scenario)).await.unwrap();

        let Frame::Dashboard(view) = frame else { panic!("expected dashboard") };
        assert_eq!(view.signal, MarketSignal::HighHeat);
        assert_eq!(view.caption, "Real-Time Optimization • Vadodara (Sim)");
        assert_eq!(view.chart[0].product_id, "FAN-02");
        assert_eq!(view.chart[0].predicted_demand, 200);
    }

    #[tokio::test]
    async fn missing_inventory_is_no_data() {
        let (_dir, mut app) = app_with_csv(None);

        let frame =
            app.frame("Vadodara", WeatherInput::Simulated(Scenario::default())).await.unwrap();

        let Frame::NoData { message } = frame else { panic!("expected no data") };
        assert_eq!(message, "DB Connection Failed");
    }

    #[tokio::test]
    async fn live_without_previous_fetch_is_idle() {
        let (_dir, mut app) = app_with_csv(Some(INVENTORY_CSV));

        let frame = app.frame("Vadodara", WeatherInput::LiveCached).await.unwrap();

        assert!(matches!(frame, Frame::Idle { .. }));
    }

    #[tokio::test]
    async fn live_fetch_without_key_is_setup_error() {
        let (_dir, mut app) = app_with_csv(Some(INVENTORY_CSV));

        let err = app.frame("Vadodara", WeatherInput::LiveFetch).await.unwrap_err();

        assert!(err.to_string().contains("No weather API key configured"));
    }

    #[tokio::test]
    async fn invalid_scenario_is_connection_error() {
        let (_dir, mut app) = app_with_csv(Some(INVENTORY_CSV));
        let scenario = Scenario { temperature_c: 80, condition: SimCondition::Rain };

        let frame = app.frame("Vadodara", WeatherInput::Simulated(scenario)).await.unwrap();

        let Frame::ConnectionError { error } = frame else { panic!("expected error banner") };
        assert!(error.starts_with("Invalid scenario"), "{error}");
    }

    #[tokio::test]
    async fn failed_fetch_keeps_last_live_reading() {
        use httpmock::prelude::*;
        use serde_json::json;

        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/weather").query_param("q", "Vadodara");
                then.status(200).json_body(json!({
                    "name": "Vadodara",
                    "main": { "temp": 26.0 },
                    "weather": [{ "main": "Drizzle", "description": "light drizzle" }]
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/weather").query_param("q", "Atlantis");
                then.status(404);
            })
            .await;

        let (_dir, mut app) = app_with_csv(Some(INVENTORY_CSV));
        app.config.secrets.weather_api_key = Some("KEY".into());
        app.config.weather.base_url = server.url("/weather");

        let fresh = app.frame("Vadodara", WeatherInput::LiveFetch).await.unwrap();
        let Frame::Dashboard(view) = fresh else { panic!("expected dashboard") };
        assert_eq!(view.signal, MarketSignal::RainAlert);

        let failed = app.frame("Atlantis", WeatherInput::LiveFetch).await.unwrap();
        let Frame::ConnectionError { error } = failed else { panic!("expected error banner") };
        assert_eq!(error, "City not found.");

        let cached = app.frame("Atlantis", WeatherInput::LiveCached).await.unwrap();
        let Frame::Dashboard(view) = cached else { panic!("expected cached dashboard") };
        assert_eq!(view.caption, "Real-Time Optimization • Vadodara");
    }

    #[test]
    fn frame_serializes_with_kind_tag() {
        let json = serde_json::to_value(Frame::ConnectionError { error: "City not found.".into() })
            .unwrap();
        assert_eq!(json["kind"], "connection_error");
        assert_eq!(json["error"], "City not found.");
    }
}
