use std::path::PathBuf;

const DEV_SECRET: &str = "dev-secret";

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub secret_key: String,
    pub database_url: String,
    pub upload_dir: PathBuf,
    pub frontend_dir: PathBuf,
    pub bind_addr: String,
}

impl Config {
    /// Reads the environment (and `.env`, if the caller loaded it).
    pub fn from_env() -> Self {
        let secret_key = dotenv::var("SECRET_KEY").unwrap_or_else(|_| {
            tracing::warn!("SECRET_KEY not set, signing invites with the insecure development secret");
            DEV_SECRET.to_owned()
        });

        Self {
            secret_key,
            database_url: dotenv::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://app.db".to_owned()),
            upload_dir: dotenv::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_owned()).into(),
            frontend_dir: dotenv::var("FRONTEND_DIR").unwrap_or_else(|_| "frontend/dist".to_owned()).into(),
            bind_addr: dotenv::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_owned()),
        }
    }
}
