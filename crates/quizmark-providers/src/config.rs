//! Configuration and provider factory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizmark_core::traits::GradingProvider;

use crate::gemini::GeminiProvider;
use crate::mock::MockGrader;

/// Configuration for the grading backend.
///
/// Note: Custom Debug impl masks the API key to prevent accidental exposure
/// in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Gemini {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        model: Option<String>,
    },
    Mock {
        #[serde(default)]
        reply: Option<String>,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Gemini {
                api_key: _,
                base_url,
                model,
            } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("model", model)
                .finish(),
            ProviderConfig::Mock { reply } => {
                f.debug_struct("Mock").field("reply", reply).finish()
            }
        }
    }
}

/// Top-level quizmark configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizmarkConfig {
    /// Grading backend.
    #[serde(default = "default_provider")]
    pub provider: ProviderConfig,
    /// Address the HTTP server binds to.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Path of the submission container file.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
}

fn default_provider() -> ProviderConfig {
    ProviderConfig::Gemini {
        api_key: String::new(),
        base_url: None,
        model: None,
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_data_file() -> PathBuf {
    PathBuf::from("./submissions.json")
}

impl Default for QuizmarkConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            bind: default_bind(),
            data_file: default_data_file(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Resolve env vars in the provider config.
fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::Gemini {
            api_key,
            base_url,
            model,
        } => ProviderConfig::Gemini {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
            model: model.clone(),
        },
        ProviderConfig::Mock { reply } => ProviderConfig::Mock {
            reply: reply.clone(),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizmark.toml` in the current directory
/// 2. `~/.config/quizmark/config.toml`
///
/// Environment variable override: `QUIZMARK_GEMINI_KEY`.
pub fn load_config() -> Result<QuizmarkConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizmarkConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizmark.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QuizmarkConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizmarkConfig::default(),
    };

    // Apply env var override
    if let Ok(key) = std::env::var("QUIZMARK_GEMINI_KEY") {
        if let ProviderConfig::Gemini { api_key, .. } = &mut config.provider {
            *api_key = key;
        }
    }

    config.provider = resolve_provider_config(&config.provider);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizmark"))
}

/// Create a provider instance from its configuration.
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn GradingProvider>> {
    match config {
        ProviderConfig::Gemini {
            api_key,
            base_url,
            model,
        } => {
            if api_key.is_empty() {
                anyhow::bail!(
                    "no Gemini API key configured; set provider.api_key or QUIZMARK_GEMINI_KEY"
                );
            }
            Ok(Box::new(GeminiProvider::new(
                api_key,
                base_url.clone(),
                model.clone(),
            )))
        }
        ProviderConfig::Mock { reply } => Ok(match reply {
            Some(reply) => Box::new(MockGrader::with_fixed_reply(reply)),
            None => Box::new(MockGrader::default()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_QUIZMARK_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_QUIZMARK_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_QUIZMARK_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        std::env::remove_var("_QUIZMARK_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = QuizmarkConfig::default();
        assert_eq!(config.bind, "127.0.0.1:3000");
        assert_eq!(config.data_file, PathBuf::from("./submissions.json"));
        assert!(matches!(config.provider, ProviderConfig::Gemini { .. }));
    }

    #[test]
    fn parse_gemini_config() {
        let toml_str = r#"
bind = "0.0.0.0:8080"
data_file = "/var/lib/quizmark/submissions.json"

[provider]
type = "gemini"
api_key = "test-key"
model = "gemini-2.0-flash"
"#;
        let config: QuizmarkConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.bind, "0.0.0.0:8080");
        assert!(matches!(
            config.provider,
            ProviderConfig::Gemini { ref model, .. } if model.as_deref() == Some("gemini-2.0-flash")
        ));
    }

    #[test]
    fn parse_mock_config() {
        let toml_str = r#"
[provider]
type = "mock"
reply = "{\"scores\":[1,2,3]}"
"#;
        let config: QuizmarkConfig = toml::from_str(toml_str).unwrap();
        assert!(matches!(config.provider, ProviderConfig::Mock { .. }));
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let err = load_config_from(Some(Path::new("/nonexistent/quizmark.toml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn create_provider_rejects_empty_key() {
        let err = create_provider(&default_provider()).unwrap_err();
        assert!(err.to_string().contains("API key"));
    }

    #[test]
    fn debug_masks_api_key() {
        let config = ProviderConfig::Gemini {
            api_key: "secret".into(),
            base_url: None,
            model: None,
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("***"));
    }
}
