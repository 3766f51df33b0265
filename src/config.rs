use serde::Deserialize;
use std::path::PathBuf;

use crate::notify::MessageTemplate;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub gym: GymConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub reminders: RemindersConfig,
    #[serde(default)]
    pub export: ExportConfig,
    pub telegram: Option<TelegramConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GymConfig {
    pub name: String,
    #[serde(default = "default_currency")]
    pub currency_symbol: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RemindersConfig {
    /// Template used when `reminders --template` is not given
    pub default_template: MessageTemplate,
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            default_template: MessageTemplate::Renewal,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExportConfig {
    pub directory: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: "exports".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_ids: Vec<i64>,
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
}

fn default_currency() -> String {
    "₹".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from `path` (extension optional), then `MUSCLEDESK_*` env vars.
    ///
    /// Nested keys use a double underscore, e.g. `MUSCLEDESK_DATABASE__PATH`.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(
                config::Environment::with_prefix("MUSCLEDESK")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.database.path.trim().is_empty() {
            anyhow::bail!("database.path must not be empty");
        }

        if let Some(telegram) = &self.telegram {
            if telegram.notifications_enabled && telegram.bot_token.trim().is_empty() {
                anyhow::bail!("telegram.bot_token is required when notifications are enabled");
            }
        }

        Ok(())
    }

    pub fn export_dir(&self) -> PathBuf {
        PathBuf::from(&self.export.directory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_minimal_config_uses_defaults() {
        let file = write_config(
            r#"
            [gym]
            name = "Iron Temple"

            [database]
            path = "gym.db"
            "#,
        );

        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.gym.name, "Iron Temple");
        assert_eq!(config.gym.currency_symbol, "₹");
        assert_eq!(config.reminders.default_template, MessageTemplate::Renewal);
        assert_eq!(config.export_dir(), PathBuf::from("exports"));
        assert!(config.telegram.is_none());
    }

    #[test]
    fn test_enabled_telegram_requires_token() {
        let file = write_config(
            r#"
            [gym]
            name = "Iron Temple"

            [database]
            path = "gym.db"

            [telegram]
            bot_token = ""
            chat_ids = [42]
            "#,
        );

        assert!(Config::load(file.path().to_str().unwrap()).is_err());
    }
}
