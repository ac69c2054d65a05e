//! Prompts: the `configure` wizard and the interactive dashboard loop.

use demandsense_core::{
    Config, Scenario, SimCondition, SourceMode,
    config::mask_secret,
    weather::simulation::TEMPERATURE_RANGE,
};
use inquire::{
    Confirm, CustomType, CustomUserError, InquireError, Password, PasswordDisplayMode, Select, Text,
    validator::Validation,
};

use crate::{
    app::{App, WeatherInput},
    render,
};

/// `Ok(None)` when the user pressed Esc or Ctrl-C.
fn answered<T>(result: Result<T, InquireError>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn prompt_secret(label: &str, current: Option<&str>) -> anyhow::Result<Option<String>> {
    let help = match current {
        Some(value) => format!("Current: {}. Leave empty to keep it.", mask_secret(value)),
        None => "Leave empty to skip.".to_string(),
    };

    let value = Password::new(label)
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_help_message(&help)
        .prompt_skippable()?;

    Ok(value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()))
}

pub fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    if let Some(uri) = prompt_secret("Inventory database URI:", config.secrets.db_uri.as_deref())? {
        config.secrets.db_uri = Some(uri);
    }

    if let Some(key) =
        prompt_secret("Weather API key:", config.secrets.weather_api_key.as_deref())?
    {
        config.secrets.weather_api_key = Some(key);
    }

    if let Some(region) = Text::new("Default region:")
        .with_default(&config.default_region)
        .prompt_skippable()?
    {
        let region = region.trim();
        if !region.is_empty() {
            config.default_region = region.to_string();
        }
    }

    config.save()?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());

    Ok(())
}

/// Sidebar state carried between renders.
struct Sidebar {
    mode: SourceMode,
    region: String,
    scenario: Scenario,
}

impl Sidebar {
    fn prompt(&mut self) -> anyhow::Result<Option<WeatherInput>> {
        let modes = SourceMode::all().to_vec();
        let cursor = modes.iter().position(|m| *m == self.mode).unwrap_or(0);
        let Some(mode) =
            answered(Select::new("Source", modes).with_starting_cursor(cursor).prompt())?
        else {
            return Ok(None);
        };
        self.mode = mode;

        let Some(region) = answered(Text::new("Region").with_default(&self.region).prompt())? else {
            return Ok(None);
        };
        self.region = region.trim().to_string();

        let input = match self.mode {
            SourceMode::Simulation => {
                let conditions = SimCondition::all().to_vec();
                let cursor =
                    conditions.iter().position(|c| *c == self.scenario.condition).unwrap_or(0);
                let Some(condition) = answered(
                    Select::new("Condition", conditions).with_starting_cursor(cursor).prompt(),
                )?
                else {
                    return Ok(None);
                };

                let Some(temperature_c) = answered(
                    CustomType::<i32>::new("Temp (°C)")
                        .with_default(self.scenario.temperature_c)
                        .with_help_message(&format!(
                            "{}..={}",
                            TEMPERATURE_RANGE.start(),
                            TEMPERATURE_RANGE.end()
                        ))
                        .with_validator(|t: &i32| {
                            Ok::<_, CustomUserError>(if TEMPERATURE_RANGE.contains(t) {
                                Validation::Valid
                            } else {
                                Validation::Invalid(
                                    format!(
                                        "Temperature must be between {} and {}",
                                        TEMPERATURE_RANGE.start(),
                                        TEMPERATURE_RANGE.end()
                                    )
                                    .into(),
                                )
                            })
                        })
                        .prompt(),
                )?
                else {
                    return Ok(None);
                };

                self.scenario = Scenario { temperature_c, condition };
                WeatherInput::Simulated(self.scenario)
            }
            SourceMode::Live => {
                let Some(fetch) =
                    answered(Confirm::new("Connect Satellite?").with_default(true).prompt())?
                else {
                    return Ok(None);
                };
                if fetch { WeatherInput::LiveFetch } else { WeatherInput::LiveCached }
            }
        };

        Ok(Some(input))
    }
}

pub async fn dashboard(mut app: App) -> anyhow::Result<()> {
    tracing::debug!(session = %app.session(), "dashboard session started");

    let mut sidebar = Sidebar {
        mode: SourceMode::Simulation,
        region: app.config().default_region.clone(),
        scenario: Scenario::default(),
    };

    loop {
        let Some(input) = sidebar.prompt()? else {
            break;
        };

        if input == WeatherInput::LiveFetch {
            println!("Fetching data...");
        }

        match app.frame(&sidebar.region, input).await {
            Ok(frame) => print!("\n{}\n", render::text(&frame, render::terminal_width())),
            Err(e) => eprintln!("{e:#}"),
        }

        let again = answered(Confirm::new("Update the dashboard?").with_default(true).prompt())?;
        if again != Some(true) {
            break;
        }
    }

    Ok(())
}
