//! Terminal helpers shared by the CLI and the pipeline

pub mod progress;
pub mod styling;

pub use progress::*;
pub use styling::*;
