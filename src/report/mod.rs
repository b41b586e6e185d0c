//! Report module - summaries and exports of qualification results

pub mod dataset_export;
pub mod significance_export;
pub mod summary;

pub use dataset_export::*;
pub use significance_export::*;
pub use summary::*;
