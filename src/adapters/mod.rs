// Adapters layer: concrete implementations for external systems (filesystem, hugo binary).

pub mod hugo;
pub mod storage;

pub use storage::{DryRunStorage, LocalStorage};
