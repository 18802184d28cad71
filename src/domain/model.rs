use crate::domain::ports::SemanticTextMemory;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub const MAIN_KEY: &str = "input";

/// A single hit returned by a memory store search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryQueryResult {
    #[serde(default)]
    pub is_reference: bool,
    #[serde(default)]
    pub external_source_name: Option<String>,
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub additional_metadata: Option<String>,
    #[serde(default)]
    pub relevance: f64,
}

impl MemoryQueryResult {
    pub fn new(id: impl Into<String>, text: impl Into<String>, relevance: f64) -> Self {
        Self {
            is_reference: false,
            external_source_name: None,
            id: id.into(),
            description: None,
            text: Some(text.into()),
            additional_metadata: None,
            relevance,
        }
    }
}

/// Describes one parameter a function reads from its context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterMetadata {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl ParameterMetadata {
    pub fn required(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            default_value: None,
        }
    }

    pub fn with_default(name: &str, description: &str, default_value: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            default_value: Some(default_value.to_string()),
        }
    }
}

/// What a calling layer needs to register and document a plugin function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionMetadata {
    pub name: String,
    pub plugin_name: String,
    pub description: String,
    pub input_description: String,
    pub is_asynchronous: bool,
    pub parameters: Vec<ParameterMetadata>,
}

impl FunctionMetadata {
    pub fn parameter(&self, name: &str) -> Option<&ParameterMetadata> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// String variables shared between functions of one invocation.
///
/// Keys are case-insensitive; they are stored lower-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextVariables {
    variables: HashMap<String, String>,
}

impl ContextVariables {
    pub fn new(input: impl Into<String>) -> Self {
        let mut variables = HashMap::new();
        variables.insert(MAIN_KEY.to_string(), input.into());
        Self { variables }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables
            .get(&key.to_lowercase())
            .map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.variables.insert(key.to_lowercase(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.variables.remove(&key.to_lowercase())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.variables.contains_key(&key.to_lowercase())
    }

    pub fn input(&self) -> &str {
        self.get_or(MAIN_KEY, "")
    }

    pub fn update(&mut self, input: impl Into<String>) {
        self.set(MAIN_KEY, input);
    }

    /// Copies every variable of `other` over this one, overwriting duplicates.
    pub fn merge(&mut self, other: &ContextVariables) {
        for (key, value) in &other.variables {
            self.variables.insert(key.clone(), value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ContextVariables
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut variables = ContextVariables::default();
        for (key, value) in iter {
            variables.set(key.as_ref(), value);
        }
        variables
    }
}

/// Execution context handed to plugin functions by the orchestration layer.
#[derive(Clone, Default)]
pub struct KernelContext {
    pub variables: Option<ContextVariables>,
    pub memory: Option<Arc<dyn SemanticTextMemory>>,
}

impl KernelContext {
    pub fn new(variables: ContextVariables, memory: Arc<dyn SemanticTextMemory>) -> Self {
        Self {
            variables: Some(variables),
            memory: Some(memory),
        }
    }

    pub fn with_variables(mut self, variables: ContextVariables) -> Self {
        self.variables = Some(variables);
        self
    }

    pub fn with_memory(mut self, memory: Arc<dyn SemanticTextMemory>) -> Self {
        self.memory = Some(memory);
        self
    }
}

impl fmt::Debug for KernelContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KernelContext")
            .field("variables", &self.variables)
            .field("memory", &self.memory.as_ref().map(|_| "<memory>"))
            .finish()
    }
}
