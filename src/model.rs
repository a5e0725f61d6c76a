use serde::{Deserialize, Serialize};

/// One row per (artist, track) pair. Field order defines the CSV header and
/// must match the column list used by the COPY statement in `load`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRow {
    pub artist: String,
    pub artist_id: String,
    pub artist_popularity: i64,
    pub artist_followers: i64,
    pub genres: String,
    pub track_name: String,
    pub track_id: String,
    pub track_popularity: i64,
    pub release_date: String,
    pub danceability: Option<f64>,
    pub energy: Option<f64>,
    pub tempo: Option<f64>,
}
