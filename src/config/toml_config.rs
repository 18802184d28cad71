use crate::adapters::HttpMemoryStore;
use crate::core::functions::{COLLECTION_PARAM, LIMIT_PARAM, RELEVANCE_PARAM};
use crate::domain::model::ContextVariables;
use crate::utils::error::{MemoryPluginError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub memory: MemoryConfig,
    pub recall: Option<RecallConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
}

/// Values placed into the context before a recall, in place of the built-in defaults.
///
/// `collection` also selects where `save` writes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecallConfig {
    pub collection: Option<String>,
    pub relevance: Option<ScalarValue>,
    pub limit: Option<ScalarValue>,
}

/// A TOML value written either bare (`limit = 3`) or quoted (`limit = "3"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl ScalarValue {
    /// The value as it is stored in context variables.
    pub fn as_variable(&self) -> String {
        match self {
            Self::Integer(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
            Self::Text(value) => value.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub format: Option<String>,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            memory: MemoryConfig {
                endpoint: DEFAULT_ENDPOINT.to_string(),
                api_key: None,
                timeout_seconds: None,
            },
            recall: None,
            logging: None,
        }
    }
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| MemoryPluginError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left untouched.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| MemoryPluginError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn endpoint(&self) -> &str {
        &self.memory.endpoint
    }

    /// The API key, unless it is empty or still an unresolved `${VAR}` placeholder.
    pub fn api_key(&self) -> Option<&str> {
        self.memory
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty() && !k.starts_with("${"))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.memory.timeout_seconds.map(Duration::from_secs)
    }

    pub fn json_logs(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.format.as_deref())
            .map(|f| f.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
    }

    pub fn collection(&self) -> Option<&str> {
        self.recall.as_ref().and_then(|r| r.collection.as_deref())
    }

    pub fn recall_overrides(&self) -> ContextVariables {
        let mut variables = self.save_overrides();
        if let Some(recall) = &self.recall {
            if let Some(relevance) = &recall.relevance {
                variables.set(RELEVANCE_PARAM, relevance.as_variable());
            }
            if let Some(limit) = &recall.limit {
                variables.set(LIMIT_PARAM, limit.as_variable());
            }
        }
        variables
    }

    pub fn save_overrides(&self) -> ContextVariables {
        let mut variables = ContextVariables::default();
        if let Some(collection) = self.collection() {
            variables.set(COLLECTION_PARAM, collection);
        }
        variables
    }

    /// Builds the HTTP store; explicit endpoint and key arguments win over the file.
    pub fn memory_store(
        &self,
        endpoint: Option<&str>,
        api_key: Option<&str>,
    ) -> Result<HttpMemoryStore> {
        let api_key = api_key.or_else(|| self.api_key()).map(str::to_string);
        let mut builder =
            HttpMemoryStore::builder(endpoint.unwrap_or(self.endpoint())).api_key(api_key);
        if let Some(timeout) = self.timeout() {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("memory.endpoint", &self.memory.endpoint)?;

        if let Some(timeout) = self.memory.timeout_seconds {
            validation::validate_positive_number("memory.timeout_seconds", timeout, 1)?;
        }

        if let Some(recall) = &self.recall {
            if let Some(collection) = &recall.collection {
                validation::validate_non_empty_string("recall.collection", collection)?;
            }
            if let Some(relevance) = &recall.relevance {
                validation::validate_parsed_range(
                    "recall.relevance",
                    &relevance.as_variable(),
                    0.0_f64,
                    1.0_f64,
                )?;
            }
            if let Some(limit) = &recall.limit {
                validation::validate_parsed_range(
                    "recall.limit",
                    &limit.as_variable(),
                    1_usize,
                    usize::MAX,
                )?;
            }
        }

        if let Some(format) = self.logging.as_ref().and_then(|l| l.format.as_deref()) {
            let valid_formats = ["compact", "json"];
            if !valid_formats.contains(&format) {
                return Err(MemoryPluginError::InvalidConfigValueError {
                    field: "logging.format".to_string(),
                    value: format.to_string(),
                    reason: format!(
                        "Unsupported format. Valid formats: {}",
                        valid_formats.join(", ")
                    ),
                });
            }
        }

        Ok(())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
