//! salaryprep: Salary Survey Preprocessing Library
//!
//! Schema-gated cleaning and encoding of salary survey answers into a
//! numeric table for regression models, with a train mode that learns the
//! category vocabulary and an inference mode that reuses it.

pub mod cli;
pub mod error;
pub mod io;
pub mod mappings;
pub mod pipeline;
pub mod report;
pub mod schema;
pub mod utils;

pub use error::{PreprocessError, Result};
