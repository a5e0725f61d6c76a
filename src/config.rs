use std::env;

/// Everything the collector and loader read from the environment, gathered
/// once at startup and passed into each operation.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_client_id: String,
    pub api_client_secret: String,
    pub db_host: String,
    pub db_port: String,
    pub db_name: String,
    pub db_user: String,
    pub db_password: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            api_client_id: env::var("SPOTIFY_CLIENT_ID").expect("SPOTIFY_CLIENT_ID must be set"),
            api_client_secret: env::var("SPOTIFY_CLIENT_SECRET")
                .expect("SPOTIFY_CLIENT_SECRET must be set"),
            db_host: env::var("DB_HOST").expect("DB_HOST must be set"),
            db_port: env::var("DB_PORT").expect("DB_PORT must be set"),
            db_name: env::var("DB_NAME").expect("DB_NAME must be set"),
            db_user: env::var("DB_USER").expect("DB_USER must be set"),
            db_password: env::var("DB_PASS").expect("DB_PASS must be set"),
        }
    }

    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.db_user, self.db_password, self.db_host, self.db_port, self.db_name
        )
    }
}
