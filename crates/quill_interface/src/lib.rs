//! Trait definitions for text-generation backends and the memory store.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;
mod types;

pub use traits::{MemoryStore, Provider};
pub use types::{DependencyHealth, SceneRecord};
