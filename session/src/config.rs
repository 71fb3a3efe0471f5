use crate::error::Error;
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_ANSWER_URL: &str = "http://127.0.0.1:5000";
pub const ANSWER_URL_VAR: &str = "NOMOS_ANSWER_URL";

/// Application configuration, read from `Nomos.toml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub answer: AnswerConfig,

    /// Absent means no sign in: everyone chats as a guest.
    #[serde(default)]
    pub firebase: Option<FirebaseConfig>,

    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerConfig {
    pub base_url: Url,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_ANSWER_URL).expect("default answer url"),
        }
    }
}

/// Passed as is to the Firebase JS SDK, hence the camelCase output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct FirebaseConfig {
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub brand: String,
    pub typing_interval_ms: u32,
    pub typing_phrases: Vec<String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            brand: "Nomos".to_owned(),
            typing_interval_ms: 2200,
            typing_phrases: vec![
                "Bot is typing".to_owned(),
                "Reviewing the statutes".to_owned(),
                "Checking precedents".to_owned(),
                "Drafting a plain English answer".to_owned(),
            ],
        }
    }
}

impl Config {
    /// Parses `source` and applies overrides from `env`.
    pub fn load(source: &str, env: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let mut config: Config = toml::from_str(source)?;
        if let Some(url) = env(ANSWER_URL_VAR).filter(|url| !url.trim().is_empty()) {
            config.answer.base_url = Url::parse(url.trim())?;
        }
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), Error> {
        let scheme = self.answer.base_url.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(Error::Config(format!(
                "answer.base_url must be http or https, got {scheme}"
            )));
        }
        if let Some(firebase) = &self.firebase {
            if firebase.project_id.trim().is_empty() {
                return Err(Error::Config("firebase.project_id is empty".to_owned()));
            }
        }
        if self.ui.typing_phrases.is_empty() {
            return Err(Error::Config("ui.typing_phrases is empty".to_owned()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn empty_source_gives_defaults() {
        let config = Config::load("", no_env).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.answer.base_url.as_str(), "http://127.0.0.1:5000/");
        assert!(config.firebase.is_none());
    }

    #[test]
    fn reads_all_sections() {
        let config = Config::load(
            r#"
            [answer]
            base_url = "https://nomos.example/api"

            [firebase]
            api_key = "key"
            auth_domain = "nomos.firebaseapp.com"
            project_id = "nomos"

            [ui]
            typing_interval_ms = 1000
            "#,
            no_env,
        )
        .unwrap();
        assert_eq!(config.answer.base_url.as_str(), "https://nomos.example/api");
        assert_eq!(config.firebase.as_ref().unwrap().project_id, "nomos");
        assert_eq!(config.ui.typing_interval_ms, 1000);
        assert_eq!(config.ui.brand, "Nomos");

        let js = serde_json::to_value(config.firebase.unwrap()).unwrap();
        assert_eq!(js["authDomain"], "nomos.firebaseapp.com");
        assert!(js.get("appId").is_none());
    }

    #[test]
    fn env_overrides_answer_url() {
        let config = Config::load("", |key| {
            (key == ANSWER_URL_VAR).then(|| "http://10.0.0.2:8000".to_owned())
        })
        .unwrap();
        assert_eq!(config.answer.base_url.as_str(), "http://10.0.0.2:8000/");
    }

    #[test]
    fn rejects_non_http_answer_url() {
        let err = Config::load("[answer]\nbase_url = \"ftp://files.example\"", no_env).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(Config::load("[answer]\nbase_url = \"not a url\"", no_env).is_err());
    }
}
