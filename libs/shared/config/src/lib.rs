use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_api_url: String,
    pub data_api_key: String,
    pub data_source: String,
    pub database_name: String,
    pub jwt_secret: String,
    pub frontend_url: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            data_api_url: env::var("DATA_API_URL")
                .unwrap_or_else(|_| {
                    warn!("DATA_API_URL not set, using empty value");
                    String::new()
                }),
            data_api_key: env::var("DATA_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("DATA_API_KEY not set, using empty value");
                    String::new()
                }),
            data_source: env::var("DATA_SOURCE")
                .unwrap_or_else(|_| {
                    warn!("DATA_SOURCE not set, using default");
                    "Cluster0".to_string()
                }),
            database_name: env::var("DATABASE_NAME")
                .unwrap_or_else(|_| {
                    warn!("DATABASE_NAME not set, using default");
                    "amrutam-doctor-portal".to_string()
                }),
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("JWT_SECRET not set, using empty value");
                    String::new()
                }),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| {
                    warn!("FRONTEND_URL not set, using default");
                    "http://localhost:5173".to_string()
                }),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.data_api_url.is_empty()
            && !self.data_api_key.is_empty()
            && !self.jwt_secret.is_empty()
    }
}
