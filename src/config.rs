use std::env;

/// Runtime configuration, read once at startup.
///
/// Collaborators that need a secret (the token signer, the mailer) receive it
/// explicitly at construction; nothing else in the crate reads the process
/// environment.
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// API key for the transactional mail sink. When absent, notifications are
    /// silently skipped (useful for local development and tests).
    pub sendgrid_api_key: Option<String>,
    pub server_port: u16,
    pub server_host: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            sendgrid_api_key: env::var("SENDGRID_API_KEY").ok(),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
        }
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}
