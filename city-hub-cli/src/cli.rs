use anyhow::Context;
use city_hub_core::{CityInfoService, Config, NormalizedRecord, ProviderId, Settings, UseCase};
use clap::{Parser, Subcommand};
use inquire::{Confirm, InquireError, Password, PasswordDisplayMode, Select, Text};

use crate::mcp;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "city-hub", version, about = "City Information Hub: weather and news for a city")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the Tavily API key and mock-mode default in the config file.
    Configure,

    /// Print the location of the config file.
    ConfigPath,

    /// Show current weather details for a city.
    Weather {
        city: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show the latest news articles for a city.
    News {
        city: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Interactive mode with Weather and News tabs.
    Hub {
        /// Return canned results when no API key is configured.
        #[arg(long)]
        mock: bool,
    },

    /// Serve `get_city_weather_info` and `get_city_news` as MCP tools over stdio.
    Mcp {
        /// Return canned results when no API key is configured.
        #[arg(long)]
        mock: bool,
    },
}

#[derive(Debug, clap::Args)]
pub struct OutputArgs {
    /// Return canned results when no API key is configured.
    #[arg(long)]
    mock: bool,

    /// Print the record on a single line.
    #[arg(long)]
    compact: bool,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
                Ok(())
            }
            Command::Weather { city, output } => {
                let service = service(output.mock)?;
                render(&service.get_city_weather_info(&city).await, output.compact)
            }
            Command::News { city, output } => {
                let service = service(output.mock)?;
                render(&service.get_city_news(&city).await, output.compact)
            }
            Command::Hub { mock } => hub(&service(mock)?).await,
            Command::Mcp { mock } => mcp::serve_stdio(service(mock)?).await,
        }
    }
}

fn service(mock: bool) -> anyhow::Result<CityInfoService> {
    let config = Config::load()?;
    let settings = Settings::from_env(&config).with_mock(mock);
    Ok(CityInfoService::from_settings(&settings))
}

fn render(record: &NormalizedRecord, compact: bool) -> anyhow::Result<()> {
    let json = if compact {
        serde_json::to_string(record)
    } else {
        serde_json::to_string_pretty(record)
    }
    .context("Failed to serialize record")?;

    println!("{json}");
    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;
    let id = ProviderId::Tavily;

    let api_key = Password::new(&format!("{id} API key (leave empty to keep current):"))
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    if !api_key.trim().is_empty() {
        config.upsert_provider_api_key(id, api_key.trim().to_string());
    }

    config.mock = Confirm::new("Return mock results when no API key is available?")
        .with_default(config.mock)
        .prompt()
        .context("Failed to read mock-mode choice")?;

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}

const QUIT: &str = "Quit";

async fn hub(service: &CityInfoService) -> anyhow::Result<()> {
    let mut tabs: Vec<&str> = UseCase::all().iter().map(UseCase::label).collect();
    tabs.push(QUIT);

    loop {
        let selection = Select::new("City Information Hub", tabs.clone()).prompt();
        let Some(tab) = prompt_or_quit(selection, "tab selection")? else {
            return Ok(());
        };

        let Some(use_case) = UseCase::all().iter().copied().find(|u| u.label() == tab) else {
            return Ok(());
        };

        let placeholder = match use_case {
            UseCase::Weather => "e.g., New York",
            UseCase::News => "e.g., London",
        };

        let input = Text::new("Enter City Name").with_placeholder(placeholder).prompt();
        let Some(input) = prompt_or_quit(input, "city name")? else {
            return Ok(());
        };
        let Some(city) = city_for_lookup(&input) else {
            return Ok(());
        };

        render(&service.lookup(use_case, city).await, false)?;
    }
}

/// Esc and Ctrl-C leave the hub like choosing Quit.
fn prompt_or_quit<T>(answer: Result<T, InquireError>, what: &str) -> anyhow::Result<Option<T>> {
    match answer {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err).with_context(|| format!("Failed to read {what}")),
    }
}

/// Blank input ends the session; anything else is looked up exactly as typed.
fn city_for_lookup(input: &str) -> Option<&str> {
    (!input.trim().is_empty()).then_some(input)
}
