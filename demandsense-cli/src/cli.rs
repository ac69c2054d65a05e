use clap::{Args, Parser, Subcommand, ValueEnum};
use demandsense_core::{Config, Scenario, SimCondition, SourceMode};

use crate::{
    app::{App, WeatherInput},
    interactive, render,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "demandsense", version, about = "Weather-driven demand dashboard")]
pub struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the database URI, weather API key and default region.
    Configure,

    /// Render the dashboard once.
    Show(ShowArgs),

    /// Interactive dashboard: pick a scenario or fetch live weather, repeatedly.
    Dashboard,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Region / city name. Defaults to the configured region.
    #[arg(long)]
    pub region: Option<String>,

    /// Weather source.
    #[arg(long, default_value = "simulation", value_parser = parse_mode)]
    pub mode: SourceMode,

    /// Simulated condition (simulation mode only).
    #[arg(long, value_enum, default_value_t = ConditionArg::Clear)]
    pub condition: ConditionArg,

    /// Simulated temperature in °C (simulation mode only).
    #[arg(
        long,
        default_value_t = 22,
        allow_negative_numbers = true,
        value_parser = clap::value_parser!(i32).range(-10..=45)
    )]
    pub temp: i32,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConditionArg {
    Clear,
    Rain,
    Snow,
}

impl From<ConditionArg> for SimCondition {
    fn from(value: ConditionArg) -> Self {
        match value {
            ConditionArg::Clear => SimCondition::Clear,
            ConditionArg::Rain => SimCondition::Rain,
            ConditionArg::Snow => SimCondition::Snow,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

fn parse_mode(value: &str) -> anyhow::Result<SourceMode> {
    SourceMode::try_from(value)
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => interactive::configure(),
            Command::Show(args) => show(args).await,
            Command::Dashboard => {
                let config = Config::resolve()?;
                let app = App::from_config(config)?;
                interactive::dashboard(app).await
            }
        }
    }
}

async fn show(args: ShowArgs) -> anyhow::Result<()> {
    let config = Config::resolve()?;
    let region = args.region.unwrap_or_else(|| config.default_region.clone());

    let input = match args.mode {
        SourceMode::Simulation => WeatherInput::Simulated(Scenario {
            temperature_c: args.temp,
            condition: args.condition.into(),
        }),
        SourceMode::Live => WeatherInput::LiveFetch,
    };

    let mut app = App::from_config(config)?;
    let frame = app.frame(&region, input).await?;

    match args.format {
        Format::Text => print!("{}", render::text(&frame, render::terminal_width())),
        Format::Json => println!("{}", render::json(&frame)?),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_defaults_to_simulation() {
        let cli = Cli::try_parse_from(["demandsense", "show"]).unwrap();
        let Command::Show(args) = cli.command else { panic!("expected show") };

        assert_eq!(args.mode, SourceMode::Simulation);
        assert_eq!(args.temp, 22);
        assert_eq!(args.condition, ConditionArg::Clear);
        assert_eq!(args.format, Format::Text);
    }

    #[test]
    fn show_accepts_negative_temperature_and_live_mode() {
        let cli = Cli::try_parse_from([
            "demandsense", "show", "--mode", "live", "--temp", "-10", "--format", "json",
        ])
        .unwrap();
        let Command::Show(args) = cli.command else { panic!("expected show") };

        assert_eq!(args.mode, SourceMode::Live);
        assert_eq!(args.temp, -10);
        assert_eq!(args.format, Format::Json);
    }

    #[test]
    fn show_rejects_out_of_range_temperature() {
        assert!(Cli::try_parse_from(["demandsense", "show", "--temp", "46"]).is_err());
        assert!(Cli::try_parse_from(["demandsense", "show", "--mode", "satellite"]).is_err());
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::try_parse_from(["demandsense", "dashboard", "-v"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
