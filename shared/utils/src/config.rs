use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{PackslipError, PackslipResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
    pub extraction: ExtractionConfig,
    pub logging: LoggingConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_request_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_seconds: u64,
    pub single_page_max_tokens: u32,
    pub batch_max_tokens: u32,
    pub max_calls_per_minute: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Pages per orchestrator batch
    pub batch_size: usize,
    /// Pages per AI call before a batch is split
    pub batch_ceiling: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|origin| origin == "*")
    }
}

/// Plain environment variables honoured on top of every other source.
const ENV_OVERRIDES: [(&str, &str); 4] = [
    ("GEMINI_API_KEY", "gemini.api_key"),
    ("GEMINI_MODEL", "gemini.model"),
    ("GEMINI_TEMPERATURE", "gemini.temperature"),
    ("PORT", "server.port"),
];

impl AppConfig {
    pub fn load() -> PackslipResult<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let overrides = ENV_OVERRIDES
            .iter()
            .filter_map(|(var, key)| env::var(var).ok().map(|value| (*key, value)));

        let config = Self::build(overrides)?;
        config.validate()?;
        Ok(config)
    }

    fn build<'a>(
        overrides: impl IntoIterator<Item = (&'a str, String)>,
    ) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let mut builder = Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", defaults.server.port as i64)?
            .set_default("server.max_request_size", defaults.server.max_request_size as i64)?
            .set_default("gemini.api_url", defaults.gemini.api_url)?
            .set_default("gemini.api_key", defaults.gemini.api_key)?
            .set_default("gemini.model", defaults.gemini.model)?
            .set_default("gemini.temperature", defaults.gemini.temperature as f64)?
            .set_default("gemini.timeout_seconds", defaults.gemini.timeout_seconds as i64)?
            .set_default(
                "gemini.single_page_max_tokens",
                defaults.gemini.single_page_max_tokens as i64,
            )?
            .set_default("gemini.batch_max_tokens", defaults.gemini.batch_max_tokens as i64)?
            .set_default(
                "gemini.max_calls_per_minute",
                defaults.gemini.max_calls_per_minute as i64,
            )?
            .set_default("extraction.batch_size", defaults.extraction.batch_size as i64)?
            .set_default("extraction.batch_ceiling", defaults.extraction.batch_ceiling as i64)?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.format", defaults.logging.format)?
            .set_default("cors.allowed_origins", defaults.cors.allowed_origins)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(
                File::with_name(&format!(
                    "config/{}",
                    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("PACKSLIP").separator("__"));

        for (key, value) in overrides {
            builder = builder.set_override(key, value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Reject settings the service cannot start with.
    pub fn validate(&self) -> PackslipResult<()> {
        if self.gemini.api_key.trim().is_empty() {
            return Err(PackslipError::configuration(
                "GEMINI_API_KEY not found in environment variables",
            ));
        }
        if self.gemini.max_calls_per_minute == 0 {
            return Err(PackslipError::configuration(
                "gemini.max_calls_per_minute must be at least 1",
            ));
        }
        if self.extraction.batch_size == 0 || self.extraction.batch_ceiling == 0 {
            return Err(PackslipError::configuration(
                "extraction batch size and ceiling must be at least 1",
            ));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
                max_request_size: 32 * 1024 * 1024, // 32MB
            },
            gemini: GeminiConfig {
                api_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                api_key: String::new(),
                model: "gemini-2.5-flash-lite".to_string(),
                temperature: 0.1,
                timeout_seconds: 120,
                single_page_max_tokens: 1000,
                batch_max_tokens: 4000,
                max_calls_per_minute: 15,
            },
            extraction: ExtractionConfig {
                batch_size: 10,
                batch_ceiling: 20,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "text".to_string(),
                file_path: None,
            },
            cors: CorsConfig {
                allowed_origins: vec!["*".to_string()],
            },
        }
    }
}
