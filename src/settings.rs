use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    pub debug: bool,
    pub auth_token: String,
    pub enable_swagger: bool,
    pub port: u16,
    /// IANA name of the studio's timezone; "today" is evaluated there.
    pub timezone: String,
    /// JSON snapshot loaded into the store at startup.
    pub data_file: Option<String>,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let config = Config::builder()
            .add_source(File::with_name("gym-admin").required(false))
            // APP_AUTH_TOKEN, APP_DATA_FILE, ...
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("debug", false)?
            .set_default("auth_token", "default-token-change-me")?
            .set_default("enable_swagger", true)?
            .set_default("port", 8080)?
            .set_default("timezone", "America/New_York")?
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.tz()?;
        Ok(settings)
    }

    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::Message(format!("unknown timezone '{}'", self.timezone)))
    }

    /// Current date at the studio.
    pub fn today(&self) -> NaiveDate {
        let now = Utc::now();
        match self.tz() {
            Ok(tz) => now.with_timezone(&tz).date_naive(),
            Err(_) => now.date_naive(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            auth_token: "default-token-change-me".to_string(),
            enable_swagger: true,
            port: 8080,
            timezone: "America/New_York".to_string(),
            data_file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    fn clear_env() {
        for key in ["APP_PORT", "APP_AUTH_TOKEN", "APP_TIMEZONE", "APP_DEBUG", "APP_DATA_FILE"] {
            unsafe { std::env::remove_var(key) };
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.timezone, "America/New_York");
        assert!(settings.data_file.is_none());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        unsafe {
            std::env::set_var("APP_PORT", "9090");
            std::env::set_var("APP_AUTH_TOKEN", "s3cret");
            std::env::set_var("APP_DEBUG", "true");
        }
        let settings = Settings::from_env().unwrap();
        clear_env();
        assert_eq!(settings.port, 9090);
        assert_eq!(settings.auth_token, "s3cret");
        assert!(settings.debug);
    }

    #[test]
    #[serial]
    fn test_invalid_timezone() {
        clear_env();
        unsafe { std::env::set_var("APP_TIMEZONE", "Mars/Olympus") };
        let result = Settings::from_env();
        clear_env();
        assert!(result.is_err());
    }

    #[test]
    fn test_today_uses_timezone() {
        let settings = Settings {
            timezone: "Pacific/Kiritimati".to_string(),
            ..Default::default()
        };
        let expected = Utc::now()
            .with_timezone(&chrono_tz::Pacific::Kiritimati)
            .date_naive();
        assert_eq!(settings.today(), expected);
    }
}
