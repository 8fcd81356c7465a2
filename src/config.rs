use std::path::PathBuf;

use reqwest::header::HeaderValue;
use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

/// Upper bound for `REVIEW_COUNT`; the storefront only renders this many reviews on the first page.
pub const MAX_REVIEW_COUNT: usize = 40;

pub const DEFAULT_BASE_URL: &str = "https://play.google.com";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app_id: String,
    #[serde(default = "default_review_count")]
    pub review_count: usize,
    #[serde(default = "default_bot_name")]
    pub bot_name: String,
    #[serde(default = "default_icon_emoji")]
    pub icon_emoji: String,
    #[serde(default)]
    pub message_text: String,
    pub webhook_url: Url,
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,
    #[serde(default = "default_base_url")]
    pub base_url: Url,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
}

fn default_review_count() -> usize {
    10
}

fn default_bot_name() -> String {
    "Play Store Reviews".into()
}

fn default_icon_emoji() -> String {
    ":iphone:".into()
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("reviews.sled")
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base url is valid")
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/143.0.0.0 Safari/537.36".into()
}

// Dates and rating labels are only parsed in their Japanese form.
fn default_accept_language() -> String {
    "ja".into()
}

impl Config {
    /// Reads `.env` if present, then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config: Self = envy::from_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: Self = envy::from_iter(vars)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_id.trim().is_empty() {
            return Err(ConfigError::MissingAppId);
        }
        if !(1..=MAX_REVIEW_COUNT).contains(&self.review_count) {
            return Err(ConfigError::ReviewCountOutOfRange {
                value: self.review_count,
                max: MAX_REVIEW_COUNT,
            });
        }
        // without the header the storefront may answer in a language whose dates never parse
        if self.accept_language.trim().is_empty()
            || HeaderValue::from_str(&self.accept_language).is_err()
        {
            return Err(ConfigError::InvalidAcceptLanguage(
                self.accept_language.clone(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(extra: &[(&str, &str)]) -> Vec<(String, String)> {
        let mut vars = vec![
            ("APP_ID".to_string(), "com.example.app".to_string()),
            (
                "WEBHOOK_URL".to_string(),
                "https://hooks.slack.com/services/T000/B000/XXXX".to_string(),
            ),
        ];
        for (k, v) in extra {
            vars.retain(|(key, _)| key != k);
            vars.push((k.to_string(), v.to_string()));
        }
        vars
    }

    #[test]
    fn fills_defaults() {
        let config = Config::from_vars(vars(&[])).unwrap();
        assert_eq!(config.app_id, "com.example.app");
        assert_eq!(config.review_count, 10);
        assert_eq!(config.base_url.as_str(), "https://play.google.com/");
        assert_eq!(config.storage_path, PathBuf::from("reviews.sled"));
        assert_eq!(config.accept_language, "ja");
        assert!(config.message_text.is_empty());
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_vars(vars(&[
            ("REVIEW_COUNT", "40"),
            ("BOT_NAME", "reviewbot"),
            ("MESSAGE_TEXT", "New reviews arrived"),
        ]))
        .unwrap();
        assert_eq!(config.review_count, 40);
        assert_eq!(config.bot_name, "reviewbot");
        assert_eq!(config.message_text, "New reviews arrived");
    }

    #[test]
    fn rejects_review_count_out_of_range() {
        for count in ["0", "41"] {
            let err = Config::from_vars(vars(&[("REVIEW_COUNT", count)])).unwrap_err();
            assert!(matches!(err, ConfigError::ReviewCountOutOfRange { .. }));
        }
    }

    #[test]
    fn rejects_blank_app_id() {
        let err = Config::from_vars(vars(&[("APP_ID", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingAppId));
    }

    #[test]
    fn rejects_unusable_accept_language() {
        for value in ["", "ja\nX-Injected: 1"] {
            let err = Config::from_vars(vars(&[("ACCEPT_LANGUAGE", value)])).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidAcceptLanguage(ref v) if v == value),
                "{value:?}"
            );
        }
    }

    #[test]
    fn requires_webhook_url() {
        let vars = vec![("APP_ID".to_string(), "com.example.app".to_string())];
        let err = Config::from_vars(vars).unwrap_err();
        assert!(matches!(err, ConfigError::Env(_)));
    }
}
