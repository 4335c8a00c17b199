//! Command Line Interface module
//!
//! - `catalog`: song operations (add, list, update, delete, text)
//! - `management`: database and configuration housekeeping (init, config)
//! - `input`: well-formedness checks for user-supplied values

pub mod catalog;
pub mod input;
pub mod management;

// Re-export all commands for convenience
pub use catalog::*;
pub use management::*;
