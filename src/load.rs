use crate::config::Config;
use crate::model::TrackRow;
use sqlx::{Connection, PgConnection};
use std::error::Error;
use std::fs::File;
use std::io::Read;

/// Session search path set before the COPY, matching where the destination
/// table lives.
const SEARCH_PATH: &str = "spotify_trends";

/// Destination columns, in `TrackRow` field order.
const COPY_COLUMNS: [&str; 12] = [
    "artist",
    "artist_id",
    "artist_popularity",
    "artist_followers",
    "genres",
    "track_name",
    "track_id",
    "track_popularity",
    "release_date",
    "danceability",
    "energy",
    "tempo",
];

/// Pads Spotify's variable-precision release date out to a full YYYY-MM-DD.
///
/// "2020" becomes "2020-01-01", "2020-05" becomes "2020-05-01", and anything
/// with three or more components is returned unchanged, malformed or not.
/// Empty input yields `None`. Idempotent on full dates.
pub fn normalize_release_date(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    match raw.split('-').count() {
        1 => Some(format!("{}-01-01", raw)),
        2 => Some(format!("{}-01", raw)),
        _ => Some(raw.to_string()),
    }
}

/// Reads a collected CSV and re-serializes it with release dates normalized,
/// producing the exact payload streamed to the database.
pub fn rewrite_release_dates<R: Read>(input: R) -> Result<Vec<u8>, Box<dyn Error>> {
    let mut reader = csv::Reader::from_reader(input);
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in reader.deserialize() {
        let mut row: TrackRow = record?;
        row.release_date = normalize_release_date(&row.release_date).unwrap_or_default();
        writer.serialize(&row)?;
    }
    writer.flush()?;
    Ok(writer.into_inner().map_err(|e| e.into_error())?)
}

/// Copies the whole file into `table_name` through a single streamed COPY.
///
/// One connection, one implicit commit when the COPY completes: a database
/// error aborts the load with no rows kept. There is no idempotence guard,
/// so loading the same file twice duplicates every row.
pub async fn load(
    config: &Config,
    csv_path: &str,
    table_name: &str,
) -> Result<(), Box<dyn Error>> {
    let payload = rewrite_release_dates(File::open(csv_path)?)?;

    let mut conn = PgConnection::connect(&config.database_url()).await?;
    sqlx::query(&format!("SET search_path TO {}", SEARCH_PATH))
        .execute(&mut conn)
        .await?;

    let copy_sql = format!(
        "COPY {} ({}) FROM STDIN WITH (FORMAT csv, HEADER true)",
        table_name,
        COPY_COLUMNS.join(", ")
    );
    let mut copy = conn.copy_in_raw(&copy_sql).await?;
    copy.send(payload.as_slice()).await?;
    let copied = copy.finish().await?;
    conn.close().await?;

    println!(
        "Copied {} rows from '{}' into '{}' with corrected release dates",
        copied, csv_path, table_name
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_date_stays_absent() {
        assert_eq!(normalize_release_date(""), None);
    }

    #[test]
    fn year_only_gets_january_first() {
        assert_eq!(normalize_release_date("2020").as_deref(), Some("2020-01-01"));
    }

    #[test]
    fn year_month_gets_first_of_month() {
        assert_eq!(
            normalize_release_date("2020-05").as_deref(),
            Some("2020-05-01")
        );
    }

    #[test]
    fn full_date_is_unchanged() {
        assert_eq!(
            normalize_release_date("2020-05-25").as_deref(),
            Some("2020-05-25")
        );
    }

    #[test]
    fn malformed_extra_components_pass_through() {
        assert_eq!(
            normalize_release_date("2020-05-25-extra").as_deref(),
            Some("2020-05-25-extra")
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in ["1999", "2005-03", "2010-07-14"] {
            let once = normalize_release_date(raw).unwrap();
            let twice = normalize_release_date(&once).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn rewrite_fixes_only_release_dates() {
        let input = "\
artist,artist_id,artist_popularity,artist_followers,genres,track_name,track_id,track_popularity,release_date,danceability,energy,tempo
A,a1,50,1000,pop,Song One,t1,40,1999,0.5,0.6,100.0
B,b2,60,2000,rock,Song Two,t2,41,2005-03,0.7,0.8,128.0
C,c3,70,3000,,Song Three,t3,42,2010-07-14,,,
";
        let payload = rewrite_release_dates(input.as_bytes()).unwrap();
        let mut reader = csv::Reader::from_reader(payload.as_slice());
        let rows: Vec<TrackRow> = reader.deserialize().map(|r| r.unwrap()).collect();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].release_date, "1999-01-01");
        assert_eq!(rows[1].release_date, "2005-03-01");
        assert_eq!(rows[2].release_date, "2010-07-14");

        assert_eq!(rows[0].artist, "A");
        assert_eq!(rows[0].artist_followers, 1000);
        assert_eq!(rows[1].tempo, Some(128.0));
        assert_eq!(rows[2].genres, "");
        assert_eq!(rows[2].danceability, None);
    }

    #[test]
    fn rewrite_keeps_the_header_row() {
        let input = "\
artist,artist_id,artist_popularity,artist_followers,genres,track_name,track_id,track_popularity,release_date,danceability,energy,tempo
A,a1,50,1000,pop,Song One,t1,40,1999,0.5,0.6,100.0
";
        let payload = rewrite_release_dates(input.as_bytes()).unwrap();
        let text = String::from_utf8(payload).unwrap();
        assert!(text.starts_with("artist,artist_id,"));
    }
}
