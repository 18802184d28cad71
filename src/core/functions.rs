use crate::domain::model::{FunctionMetadata, ParameterMetadata};

pub const PLUGIN_NAME: &str = "memory";

pub const RECALL_FUNCTION: &str = "recall";
pub const SAVE_FUNCTION: &str = "save";

pub const COLLECTION_PARAM: &str = "collection";
pub const RELEVANCE_PARAM: &str = "relevance";
pub const KEY_PARAM: &str = "key";
pub const LIMIT_PARAM: &str = "limit";

pub const DEFAULT_COLLECTION: &str = "generic";
pub const DEFAULT_RELEVANCE: &str = "0.75";
pub const DEFAULT_LIMIT: &str = "1";

pub fn recall_function() -> FunctionMetadata {
    FunctionMetadata {
        name: RECALL_FUNCTION.to_string(),
        plugin_name: PLUGIN_NAME.to_string(),
        description: "Recall a fact from the long term memory".to_string(),
        input_description: "The information to retrieve".to_string(),
        is_asynchronous: true,
        parameters: vec![
            ParameterMetadata::with_default(
                COLLECTION_PARAM,
                "The collection to search for information",
                DEFAULT_COLLECTION,
            ),
            ParameterMetadata::with_default(
                RELEVANCE_PARAM,
                "The relevance score, from 0.0 to 1.0; 1.0 means perfect match",
                DEFAULT_RELEVANCE,
            ),
            ParameterMetadata::with_default(
                LIMIT_PARAM,
                "The maximum number of relevant memories to recall.",
                DEFAULT_LIMIT,
            ),
        ],
    }
}

pub fn save_function() -> FunctionMetadata {
    FunctionMetadata {
        name: SAVE_FUNCTION.to_string(),
        plugin_name: PLUGIN_NAME.to_string(),
        description: "Save information to semantic memory".to_string(),
        input_description: "The information to save".to_string(),
        is_asynchronous: true,
        parameters: vec![
            ParameterMetadata::with_default(
                COLLECTION_PARAM,
                "The collection to save the information",
                DEFAULT_COLLECTION,
            ),
            ParameterMetadata::required(
                KEY_PARAM,
                "The unique key to associate with the information",
            ),
        ],
    }
}
