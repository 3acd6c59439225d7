use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

/// Server settings: built-in defaults, then an optional `trivia.toml`,
/// then environment variables (`HOST`, `PORT`, `DB_PATH`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// SQLite file, or `:memory:`
    pub db_path: String,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::build(
            Config::builder()
                .add_source(File::with_name("trivia").required(false))
                .add_source(Environment::default().try_parsing(true)),
        )
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8080)?
            .set_default("db_path", "trivia.db")?
            .build()?
            .try_deserialize()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
