//! Cauciones - caución rate monitor for the Buenos Aires market
//!
//! This library scrapes the caución rate table, picks the terms paying more
//! than a configured TNA and alerts over WhatsApp during market hours.

pub mod cli;
pub mod config;
pub mod error;
pub mod market;
pub mod models;
pub mod notify;
pub mod opportunities;
pub mod pipeline;
pub mod scheduler;
pub mod scraping;
pub mod server;
