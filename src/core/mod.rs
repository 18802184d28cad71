pub mod functions;
pub mod output;
pub mod plugin;

pub use crate::domain::model::{ContextVariables, KernelContext, MemoryQueryResult};
pub use crate::domain::ports::{KernelFunctionProvider, SemanticTextMemory};
pub use crate::utils::error::Result;
