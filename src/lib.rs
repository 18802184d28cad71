pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::HttpMemoryStore;
pub use config::TomlConfig;
pub use core::plugin::TextMemoryPlugin;
pub use domain::model::{ContextVariables, KernelContext, MemoryQueryResult};
pub use domain::ports::{KernelFunctionProvider, SemanticTextMemory};
pub use utils::error::{MemoryPluginError, Result};
