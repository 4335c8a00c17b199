//! Catalog commands
//!
//! Thin wrappers around `SongService`: parse arguments, call one operation,
//! print the result.

pub mod add;
pub mod delete;
pub mod list;
pub mod text;
pub mod update;
