use crate::adapters::HttpMemoryStore;
use crate::config::toml_config::TomlConfig;
use crate::core::functions::{
    COLLECTION_PARAM, KEY_PARAM, LIMIT_PARAM, RECALL_FUNCTION, RELEVANCE_PARAM, SAVE_FUNCTION,
};
use crate::domain::model::ContextVariables;
use crate::utils::error::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "memory-plugin")]
#[command(about = "Recall and save facts through a semantic memory service")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Memory service base URL (overrides the configuration file)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Bearer token for the memory service
    #[arg(long)]
    pub api_key: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Recall facts relevant to a question
    Recall {
        ask: String,
        #[arg(long)]
        collection: Option<String>,
        #[arg(long)]
        relevance: Option<String>,
        #[arg(long)]
        limit: Option<String>,
    },
    /// Save a fact under a key
    Save {
        text: String,
        #[arg(long)]
        key: Option<String>,
        #[arg(long)]
        collection: Option<String>,
    },
    /// Print the plugin's function metadata as JSON
    Functions,
}

impl CliConfig {
    pub fn function_name(&self) -> Option<&'static str> {
        match self.command {
            Command::Recall { .. } => Some(RECALL_FUNCTION),
            Command::Save { .. } => Some(SAVE_FUNCTION),
            Command::Functions => None,
        }
    }

    /// Store client for the effective endpoint: command line, then file, then
    /// the local default.
    pub fn memory_store(&self, file: Option<&TomlConfig>) -> Result<HttpMemoryStore> {
        let defaults = TomlConfig::default();
        file.unwrap_or(&defaults)
            .memory_store(self.endpoint.as_deref(), self.api_key.as_deref())
    }

    /// Builds the invocation variables. Flags win over file overrides, which
    /// win over the plugin's built-in defaults.
    pub fn context_variables(&self, file: Option<&TomlConfig>) -> ContextVariables {
        match &self.command {
            Command::Recall {
                ask,
                collection,
                relevance,
                limit,
            } => {
                let mut variables = ContextVariables::new(ask.clone());
                if let Some(file) = file {
                    variables.merge(&file.recall_overrides());
                }
                set_if_present(&mut variables, COLLECTION_PARAM, collection);
                set_if_present(&mut variables, RELEVANCE_PARAM, relevance);
                set_if_present(&mut variables, LIMIT_PARAM, limit);
                variables
            }
            Command::Save {
                text,
                key,
                collection,
            } => {
                let mut variables = ContextVariables::new(text.clone());
                if let Some(file) = file {
                    variables.merge(&file.save_overrides());
                }
                set_if_present(&mut variables, KEY_PARAM, key);
                set_if_present(&mut variables, COLLECTION_PARAM, collection);
                variables
            }
            Command::Functions => ContextVariables::default(),
        }
    }
}

fn set_if_present(variables: &mut ContextVariables, name: &str, value: &Option<String>) {
    if let Some(value) = value {
        variables.set(name, value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recall_flags_override_file_values() {
        let file = TomlConfig::from_toml_str(
            r#"
[memory]
endpoint = "http://file-endpoint:8080"

[recall]
collection = "from-file"
limit = 4
"#,
        )
        .unwrap();
        let cli = CliConfig::try_parse_from([
            "memory-plugin",
            "recall",
            "capital of France",
            "--limit",
            "2",
        ])
        .unwrap();

        let variables = cli.context_variables(Some(&file));

        assert_eq!(cli.function_name(), Some("recall"));
        assert_eq!(variables.input(), "capital of France");
        assert_eq!(variables.get("collection"), Some("from-file"));
        assert_eq!(variables.get("limit"), Some("2"));
        assert_eq!(variables.get("relevance"), None);
        assert_eq!(
            cli.memory_store(Some(&file)).unwrap().base_url().as_str(),
            "http://file-endpoint:8080/"
        );
    }

    #[test]
    fn test_save_without_key_leaves_it_unset() {
        let cli = CliConfig::try_parse_from([
            "memory-plugin",
            "--endpoint",
            "http://cli:1234",
            "save",
            "the capital of France is Paris",
        ])
        .unwrap();

        let variables = cli.context_variables(None);

        assert_eq!(cli.function_name(), Some("save"));
        assert!(!variables.contains_key("key"));
        assert_eq!(
            cli.memory_store(None).unwrap().base_url().as_str(),
            "http://cli:1234/"
        );
    }

    #[test]
    fn test_functions_command_has_no_function_name() {
        let cli = CliConfig::try_parse_from(["memory-plugin", "functions"]).unwrap();
        assert_eq!(cli.function_name(), None);
        assert_eq!(
            cli.memory_store(None).unwrap().base_url().as_str(),
            "http://localhost:8080/"
        );
    }

    #[test]
    fn test_save_uses_file_collection_unless_flag_given() {
        let file = TomlConfig::from_toml_str(
            r#"
[memory]
endpoint = "http://localhost:8080"

[recall]
collection = "geography"
limit = 3
"#,
        )
        .unwrap();

        let cli = CliConfig::try_parse_from([
            "memory-plugin",
            "save",
            "Paris is the largest city",
            "--key",
            "city1",
        ])
        .unwrap();
        let variables = cli.context_variables(Some(&file));
        assert_eq!(variables.get("collection"), Some("geography"));
        assert_eq!(variables.get("key"), Some("city1"));
        assert!(!variables.contains_key("limit"));

        let cli = CliConfig::try_parse_from([
            "memory-plugin",
            "save",
            "text",
            "--collection",
            "notes",
        ])
        .unwrap();
        assert_eq!(
            cli.context_variables(Some(&file)).get("collection"),
            Some("notes")
        );
    }
}
