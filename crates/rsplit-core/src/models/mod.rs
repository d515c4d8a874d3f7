//! Data models for receipts, page geometry and configuration.

pub mod config;
pub mod geometry;
pub mod receipt;
