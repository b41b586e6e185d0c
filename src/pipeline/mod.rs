//! Pipeline module - validation, binning, significance testing and encoding

pub mod binning;
pub mod chi_square;
pub mod config;
pub mod contingency;
pub mod encoding;
pub mod error;
pub mod loader;
pub mod orchestrator;
pub mod outcome;
pub mod record;
pub mod schema;
pub mod significance;

pub use binning::*;
pub use chi_square::*;
pub use config::*;
pub use contingency::*;
pub use encoding::*;
pub use error::*;
pub use loader::*;
pub use orchestrator::*;
pub use outcome::*;
pub use record::*;
pub use schema::*;
pub use significance::*;
