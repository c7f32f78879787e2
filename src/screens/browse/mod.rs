// Re-export all types and the main struct
pub use types::*;

// Module declarations
mod input;
mod navigation;
mod render;
pub mod types;
