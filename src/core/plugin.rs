use crate::core::functions::{
    recall_function, save_function, COLLECTION_PARAM, DEFAULT_COLLECTION, DEFAULT_LIMIT,
    DEFAULT_RELEVANCE, KEY_PARAM, LIMIT_PARAM, PLUGIN_NAME, RECALL_FUNCTION, RELEVANCE_PARAM,
    SAVE_FUNCTION,
};
use crate::core::output::render_recall;
use crate::domain::model::{ContextVariables, FunctionMetadata, KernelContext};
use crate::domain::ports::{KernelFunctionProvider, SemanticTextMemory};
use crate::utils::error::{MemoryPluginError, Result};
use crate::utils::validation::validate_parsed_range;

const MISSING_VARIABLES: &str =
    "The context doesn't have the variables required to know how to recall memory";
const MISSING_MEMORY: &str = "The context doesn't have a memory instance to search";
const MISSING_COLLECTION: &str = "Memory collection not defined for TextMemoryPlugin";
const MISSING_RELEVANCE: &str = "Relevance value not defined for TextMemoryPlugin";
const MISSING_LIMIT: &str = "Limit value not defined for TextMemoryPlugin";
const MISSING_KEY: &str = "Memory key not defined for TextMemoryPlugin";

/// Recall and save text through the memory store attached to a [`KernelContext`].
///
/// The plugin holds no state. Parameters are read from the context variables on
/// every call and every check runs before the store is touched.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextMemoryPlugin;

#[derive(Debug, Clone, PartialEq)]
pub struct RecallParameters<'a> {
    pub collection: &'a str,
    pub relevance: f64,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveParameters<'a> {
    pub collection: &'a str,
    pub key: &'a str,
}

impl TextMemoryPlugin {
    pub fn new() -> Self {
        Self
    }

    /// Searches the memory for `ask`.
    ///
    /// Returns an empty string when nothing clears the relevance threshold.
    pub async fn recall(&self, ask: &str, context: &KernelContext) -> Result<String> {
        let (variables, memory) = split_context(context)?;
        let params = resolve_recall_parameters(variables)?;

        tracing::debug!(
            "Recalling from collection '{}' (relevance >= {}, limit {})",
            params.collection,
            params.relevance,
            params.limit
        );

        let results = memory
            .search(params.collection, ask, params.limit, params.relevance)
            .await?;

        if results.is_empty() {
            tracing::warn!("Memory not found in collection: {}", params.collection);
            return Ok(String::new());
        }

        tracing::debug!("Recalled {} memories", results.len());
        render_recall(&results, params.limit)
    }

    /// Stores `text` under the `key` variable.
    pub async fn save(&self, text: &str, context: &KernelContext) -> Result<()> {
        let (variables, memory) = split_context(context)?;
        let params = resolve_save_parameters(variables)?;

        tracing::debug!(
            "Saving memory '{}' to collection '{}'",
            params.key,
            params.collection
        );

        memory
            .save_information(params.collection, text, params.key, None, None)
            .await
    }

    /// Runs a function by name with the context's `input` variable as its argument.
    ///
    /// `save` produces an empty string.
    pub async fn invoke(&self, function_name: &str, context: &KernelContext) -> Result<String> {
        let input = context
            .variables
            .as_ref()
            .map(|v| v.input().to_string())
            .unwrap_or_default();

        if function_name.eq_ignore_ascii_case(RECALL_FUNCTION) {
            self.recall(&input, context).await
        } else if function_name.eq_ignore_ascii_case(SAVE_FUNCTION) {
            self.save(&input, context).await?;
            Ok(String::new())
        } else {
            Err(MemoryPluginError::FunctionNotFound {
                name: function_name.to_string(),
            })
        }
    }
}

impl KernelFunctionProvider for TextMemoryPlugin {
    fn plugin_name(&self) -> &str {
        PLUGIN_NAME
    }

    fn functions(&self) -> Vec<FunctionMetadata> {
        vec![recall_function(), save_function()]
    }
}

fn split_context(context: &KernelContext) -> Result<(&ContextVariables, &dyn SemanticTextMemory)> {
    let variables = context
        .variables
        .as_ref()
        .ok_or_else(|| MemoryPluginError::invalid_argument(MISSING_VARIABLES))?;
    let memory = context
        .memory
        .as_deref()
        .ok_or_else(|| MemoryPluginError::invalid_argument(MISSING_MEMORY))?;
    Ok((variables, memory))
}

fn resolve_collection(variables: &ContextVariables) -> Result<&str> {
    let collection = variables.get_or(COLLECTION_PARAM, DEFAULT_COLLECTION);
    if collection.is_empty() {
        return Err(MemoryPluginError::invalid_argument(MISSING_COLLECTION));
    }
    Ok(collection)
}

pub fn resolve_recall_parameters(variables: &ContextVariables) -> Result<RecallParameters<'_>> {
    let collection = resolve_collection(variables)?;

    let relevance = variables.get_or(RELEVANCE_PARAM, DEFAULT_RELEVANCE);
    if relevance.is_empty() {
        return Err(MemoryPluginError::invalid_argument(MISSING_RELEVANCE));
    }

    let limit = variables.get_or(LIMIT_PARAM, DEFAULT_LIMIT);
    if limit.trim().is_empty() {
        return Err(MemoryPluginError::invalid_argument(MISSING_LIMIT));
    }

    let relevance = validate_parsed_range(RELEVANCE_PARAM, relevance, 0.0_f64, 1.0_f64)
        .map_err(as_invalid_argument)?;
    let limit = validate_parsed_range(LIMIT_PARAM, limit, 1_usize, usize::MAX)
        .map_err(as_invalid_argument)?;

    Ok(RecallParameters {
        collection,
        relevance,
        limit,
    })
}

pub fn resolve_save_parameters(variables: &ContextVariables) -> Result<SaveParameters<'_>> {
    let collection = resolve_collection(variables)?;

    let key = variables.get(KEY_PARAM).unwrap_or_default();
    if key.is_empty() {
        return Err(MemoryPluginError::invalid_argument(MISSING_KEY));
    }

    Ok(SaveParameters { collection, key })
}

fn as_invalid_argument(err: MemoryPluginError) -> MemoryPluginError {
    match err {
        MemoryPluginError::InvalidConfigValueError {
            field,
            value,
            reason,
        } => MemoryPluginError::invalid_argument(format!(
            "Invalid {} value '{}' for TextMemoryPlugin: {}",
            field, value, reason
        )),
        other => other,
    }
}
