use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand};
use inquire::{Select, Text};
use sunny_core::{Config, Place, Repository, repository::WeatherSubscription};
use tracing::debug;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "sunny", version, about = "Place search and weather forecasts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the API token and endpoint.
    Configure,

    /// Search places by name.
    Search {
        /// Free-text place name, e.g. "beijing".
        query: String,

        /// Pick one of the results, remember it and show its weather.
        #[arg(long)]
        pick: bool,
    },

    /// Show weather for coordinates, or for the remembered place.
    Weather {
        /// Longitude; requires --lat.
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<String>,

        /// Latitude; requires --lng.
        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Search { query, pick } => {
                let repo = repository()?;
                search(&repo, &query, pick).await
            }
            Command::Weather { lng, lat } => {
                let repo = repository()?;
                let (name, lng, lat) = match (lng, lat) {
                    (Some(lng), Some(lat)) => (format!("{lng},{lat}"), lng, lat),
                    _ => {
                        let place = saved_place(&repo)?;
                        (place.name, place.location.lng, place.location.lat)
                    }
                };
                show_weather(&repo, &name, &lng, &lat).await
            }
        }
    }
}

fn repository() -> anyhow::Result<Repository> {
    let config = Config::load()?;
    Repository::from_config(&config)
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let token = Text::new("API token:")
        .with_default(config.api.token.as_deref().unwrap_or_default())
        .prompt()
        .context("Failed to read API token")?;
    let base_url = Text::new("API base URL:")
        .with_default(&config.api.base_url)
        .prompt()
        .context("Failed to read API base URL")?;
    let lang = Text::new("Result language:")
        .with_default(&config.api.lang)
        .prompt()
        .context("Failed to read result language")?;

    config.set_token(token.trim().to_string());
    config.api.base_url = base_url.trim().to_string();
    config.api.lang = lang.trim().to_string();
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn search(repo: &Repository, query: &str, pick: bool) -> anyhow::Result<()> {
    let envelope = repo
        .search_places(query)
        .recv()
        .await
        .ok_or_else(|| anyhow!("Place search for {query:?} was abandoned"))?;
    let places = envelope.context("Unable to find any places")?;

    if places.is_empty() {
        println!("No places found for {query:?}.");
        return Ok(());
    }

    if !pick {
        for place in &places {
            println!("{place}");
        }
        return Ok(());
    }

    let place = Select::new("Pick a place:", places).prompt().context("No place selected")?;
    repo.save_place(&place).context("Failed to remember selected place")?;
    debug!(place = %place.name, "remembered selected place");

    show_weather(repo, &place.name, &place.location.lng, &place.location.lat).await
}

fn saved_place(repo: &Repository) -> anyhow::Result<Place> {
    if !repo.is_place_saved() {
        bail!(
            "No place selected yet.\n\
             Hint: run `sunny search <name> --pick` or pass --lng and --lat."
        );
    }

    Ok(repo.get_saved_place()?)
}

async fn show_weather(repo: &Repository, name: &str, lng: &str, lat: &str) -> anyhow::Result<()> {
    let mut subscription: WeatherSubscription = repo.refresh_weather(lng, lat);

    let envelope = subscription
        .recv()
        .await
        .ok_or_else(|| anyhow!("Weather refresh for {name} was abandoned"))?;
    let weather = envelope.context("Unable to fetch weather")?;

    print!("{}", render::WeatherReport { name, weather: &weather });
    Ok(())
}
