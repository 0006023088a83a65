// src/models/mod.rs

//! Domain models for the stock monitor.

mod config;
mod status;

// Re-export all public types
pub use config::{
    BrowserConfig, Config, MailConfig, MonitorConfig, ProbeConfig, ProductConfig, SelectorConfig,
};
pub use status::{NotificationKind, ProbeResult, StatusRecord, StockStatus};
