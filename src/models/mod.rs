//! Data models for the exam portal.
//!
//! Field names follow the camelCase JSON used by the content store and the bundled data files.

mod category;
mod record;

pub use category::*;
pub use record::*;
