// Adapters layer: concrete implementations of the domain ports for external systems.

pub mod http;

pub use http::{HttpMemoryStore, HttpMemoryStoreBuilder};
