//! Core infrastructure shared by every launcher stage

pub mod config;
pub mod error;
pub mod fallback;
pub mod output;
