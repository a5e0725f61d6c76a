use crate::config::Config;
use crate::model::TrackRow;
use crate::spotify;
use reqwest::Client;
use serde_json::Value;
use std::error::Error;

/// Full collection pass: authenticate, list trending artists, expand each
/// into one row per top track, write everything to `output_path`.
///
/// Artists with no search match are skipped; any other HTTP or decode
/// failure aborts the run with nothing written.
pub async fn run(
    config: &Config,
    limit: u32,
    market: &str,
    output_path: &str,
) -> Result<(), Box<dyn Error>> {
    let client = Client::new();
    let token = spotify::request_token(&client, config).await?;
    let artist_names = spotify::trending_artists(&client, &token, limit).await?;

    let mut rows = Vec::new();
    for name in &artist_names {
        let Some(artist) = spotify::search_artist(&client, name, &token).await? else {
            println!("No search match for artist: {}", name);
            continue;
        };
        let artist_id = artist["id"]
            .as_str()
            .ok_or("artist search hit missing 'id'")?;

        let tracks = spotify::top_tracks(&client, artist_id, &token, market).await?;
        for track in &tracks {
            let track_id = track["id"].as_str().ok_or("track missing 'id'")?;
            let features = spotify::audio_features(&client, track_id, &token).await?;
            rows.push(track_row(name, &artist, track, &features)?);
        }
    }

    write_csv(&rows, output_path)?;
    println!("Data saved to {}", output_path);
    Ok(())
}

/// Flattens one track of one artist into a row. Artist-level fields repeat
/// across all of that artist's tracks; audio features default to absent.
pub fn track_row(
    artist_name: &str,
    artist: &Value,
    track: &Value,
    features: &Value,
) -> Result<TrackRow, Box<dyn Error>> {
    let genres: Vec<&str> = artist["genres"]
        .as_array()
        .map(|genres| genres.iter().filter_map(|g| g.as_str()).collect())
        .unwrap_or_default();

    Ok(TrackRow {
        artist: artist_name.to_string(),
        artist_id: artist["id"]
            .as_str()
            .ok_or("artist missing 'id'")?
            .to_string(),
        artist_popularity: artist["popularity"].as_i64().unwrap_or(0),
        artist_followers: artist["followers"]["total"].as_i64().unwrap_or(0),
        genres: genres.join(", "),
        track_name: track["name"].as_str().unwrap_or("").to_string(),
        track_id: track["id"]
            .as_str()
            .ok_or("track missing 'id'")?
            .to_string(),
        track_popularity: track["popularity"].as_i64().unwrap_or(0),
        release_date: track["album"]["release_date"]
            .as_str()
            .unwrap_or("")
            .to_string(),
        danceability: features["danceability"].as_f64(),
        energy: features["energy"].as_f64(),
        tempo: features["tempo"].as_f64(),
    })
}

fn write_csv(rows: &[TrackRow], path: &str) -> Result<(), Box<dyn Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
