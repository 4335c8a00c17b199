//! Service layer
//!
//! This module provides the boundary callers use to reach the catalog:
//! - `SongService`: pass-through facade over a `SongStore`
//! - `SimpleServices`: lightweight container that builds the store from config

pub mod simple_container;
pub mod songs;

pub use simple_container::SimpleServices;
pub use songs::SongService;
