//! Management and configuration commands

pub mod config;
pub mod init;
