use anyhow::Result;
use serde::Deserialize;

/// Prefix for environment overrides, e.g. `LIVE_AGENT__DIALOGUE__NATS_URL`
pub const ENV_PREFIX: &str = "LIVE_AGENT";

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub dialogue: DialogueConfig,
    pub audio: AudioConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct DialogueConfig {
    pub nats_url: String,
    pub model: String,
    pub voice_name: String,
    #[serde(default)]
    pub system_instruction: String,
}

#[derive(Debug, Deserialize)]
pub struct AudioConfig {
    /// Directory for synthesized turn audio
    pub output_dir: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
