mod collect;
mod config;
mod load;
mod model;
mod spotify;

use clap::{Parser, Subcommand};
use config::Config;
use dotenv::dotenv;
use std::error::Error;

#[derive(Parser)]
#[command(
    name = "spotify-trends",
    about = "Collect Spotify trending-artist data and load it into Postgres"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch trending artists, their top tracks and audio features into a CSV file
    Collect {
        /// How many new-release entries to pull artists from
        #[arg(long, default_value_t = 15)]
        limit: u32,
        /// Market passed to the top-tracks endpoint
        #[arg(long, default_value = "US")]
        market: String,
        /// Output CSV path
        #[arg(long, default_value = "spotify_trending_artists.csv")]
        output: String,
    },
    /// Copy a collected CSV file into the destination table
    Load {
        /// Input CSV path
        #[arg(long, default_value = "spotify_trending_artists.csv")]
        input: String,
        /// Destination table name
        #[arg(long, default_value = "music_trends")]
        table: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Command::Collect {
            limit,
            market,
            output,
        } => collect::run(&config, limit, &market, &output).await?,
        Command::Load { input, table } => load::load(&config, &input, &table).await?,
    }

    Ok(())
}
