use std::{path::PathBuf, time::Duration};

use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;
use url::Url;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub browser: BrowserSettings,
    pub scrape: ScrapeSettings,
    pub output: OutputSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct BrowserSettings {
    pub webdriver_url: String,
    pub headless: bool,
    pub user_agent: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub page_load_timeout_secs: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub script_timeout_secs: u64,
}

impl BrowserSettings {
    pub fn webdriver_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.webdriver_url)
    }

    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }

    pub fn script_timeout(&self) -> Duration {
        Duration::from_secs(self.script_timeout_secs)
    }
}

/// Knobs of the scroll loop. Durations are kept as plain millis so they can be
/// overridden from the environment.
#[derive(Deserialize, Clone, Debug)]
pub struct ScrapeSettings {
    pub target_url: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub scroll_step: i64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_scroll_distance: i64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub settle_millis: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub initial_settle_millis: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_timeout_retries: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub backoff_base_millis: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub backoff_max_millis: u64,
}

impl ScrapeSettings {
    pub fn target_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.target_url)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_millis)
    }

    pub fn initial_settle(&self) -> Duration {
        Duration::from_millis(self.initial_settle_millis)
    }

    /// Delay before the `attempt`-th retry (1-based), doubling from the base
    /// and capped at the max. Jitter is added by the caller.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let millis = self
            .backoff_base_millis
            .saturating_mul(1_u64 << exponent)
            .min(self.backoff_max_millis);
        Duration::from_millis(millis)
    }
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        ScrapeSettings {
            target_url: "https://defillama.com/raises/investors".to_string(),
            scroll_step: 300,
            max_scroll_distance: 30_000,
            settle_millis: 1_500,
            initial_settle_millis: 5_000,
            max_timeout_retries: 5,
            backoff_base_millis: 500,
            backoff_max_millis: 8_000,
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct OutputSettings {
    pub directory: PathBuf,
    pub file_prefix: String,
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().map_err(|e| {
        config::ConfigError::Message(format!("Failed to determine the current directory: {}", e))
    })?;
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{Environment, ScrapeSettings};

    #[test]
    fn backoff_doubles_until_capped() {
        let settings = ScrapeSettings::default();

        assert_eq!(settings.backoff(1), Duration::from_millis(500));
        assert_eq!(settings.backoff(2), Duration::from_millis(1_000));
        assert_eq!(settings.backoff(4), Duration::from_millis(4_000));
        assert_eq!(settings.backoff(5), Duration::from_millis(8_000));
        assert_eq!(settings.backoff(40), Duration::from_millis(8_000));
    }

    #[test]
    fn default_target_url_parses() {
        let url = ScrapeSettings::default().target_url().unwrap();

        assert_eq!(url.host_str(), Some("defillama.com"));
    }

    #[test]
    fn unknown_environment_is_rejected() {
        let env: Result<Environment, String> = "staging".to_string().try_into();

        assert!(env.is_err());
    }
}
