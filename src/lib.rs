// src/lib.rs

//! Stock Monitor Library

pub mod config;
pub mod driver;
pub mod error;
#[cfg(all(feature = "lambda", feature = "webdriver"))]
pub mod lambda;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
