use crate::config::Config;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::error::Error;

const ACCOUNTS_URL: &str = "https://accounts.spotify.com/api/token";
const API_URL: &str = "https://api.spotify.com/v1";

#[derive(Deserialize, Debug)]
struct TokenResponse {
    access_token: String,
}

/// Exchanges client credentials for a short-lived bearer token. A response
/// without an `access_token` field fails deserialization and aborts the run.
pub async fn request_token(client: &Client, config: &Config) -> Result<String, Box<dyn Error>> {
    let params = [("grant_type", "client_credentials")];
    let res = client
        .post(ACCOUNTS_URL)
        .basic_auth(&config.api_client_id, Some(&config.api_client_secret))
        .form(&params)
        .send()
        .await?;

    let token_response: TokenResponse = serde_json::from_str(&res.text().await?)?;
    Ok(token_response.access_token)
}

/// Every artist credited on the most recent `limit` new-release albums,
/// deduplicated by name.
pub async fn trending_artists(
    client: &Client,
    token: &str,
    limit: u32,
) -> Result<HashSet<String>, Box<dyn Error>> {
    let res = client
        .get(format!("{}/browse/new-releases?limit={}", API_URL, limit))
        .bearer_auth(token)
        .send()
        .await?
        .text()
        .await?;

    let json: Value = serde_json::from_str(&res)?;
    Ok(artist_names(&json))
}

pub fn artist_names(releases: &Value) -> HashSet<String> {
    let mut names = HashSet::new();
    if let Some(albums) = releases["albums"]["items"].as_array() {
        for album in albums {
            if let Some(artists) = album["artists"].as_array() {
                for artist in artists {
                    if let Some(name) = artist["name"].as_str() {
                        names.insert(name.to_string());
                    }
                }
            }
        }
    }
    names
}

/// Searches by name and returns the first hit, or `None` when the search
/// comes back empty. Callers skip unresolved artists rather than abort.
pub async fn search_artist(
    client: &Client,
    name: &str,
    token: &str,
) -> Result<Option<Value>, Box<dyn Error>> {
    let res = client
        .get(format!(
            "{}/search?q={}&type=artist&limit=1",
            API_URL,
            urlencoding::encode(name)
        ))
        .bearer_auth(token)
        .send()
        .await?
        .text()
        .await?;

    let json: Value = serde_json::from_str(&res)?;
    Ok(first_artist(&json))
}

pub fn first_artist(search_result: &Value) -> Option<Value> {
    search_result["artists"]["items"]
        .as_array()
        .and_then(|items| items.first())
        .cloned()
}

pub async fn top_tracks(
    client: &Client,
    artist_id: &str,
    token: &str,
    market: &str,
) -> Result<Vec<Value>, Box<dyn Error>> {
    let res = client
        .get(format!(
            "{}/artists/{}/top-tracks?market={}",
            API_URL, artist_id, market
        ))
        .bearer_auth(token)
        .send()
        .await?
        .text()
        .await?;

    let json: Value = serde_json::from_str(&res)?;
    let tracks = json["tracks"]
        .as_array()
        .ok_or("top-tracks response missing 'tracks'")?;
    Ok(tracks.to_vec())
}

/// Per-track audio features. Individual fields may be absent from the
/// response; callers read them with a missing-field default.
pub async fn audio_features(
    client: &Client,
    track_id: &str,
    token: &str,
) -> Result<Value, Box<dyn Error>> {
    let res = client
        .get(format!("{}/audio-features/{}", API_URL, track_id))
        .bearer_auth(token)
        .send()
        .await?
        .text()
        .await?;

    let json: Value = serde_json::from_str(&res)?;
    Ok(json)
}
