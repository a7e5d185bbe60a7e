pub mod config;
pub mod consolidate;
pub mod discover;
pub mod error;
pub mod io;
pub mod join;
pub mod keys;
pub mod model;
pub mod pipeline;
pub mod prompt;
pub mod report;
pub mod validate;

pub use error::{MergeError, Result};
