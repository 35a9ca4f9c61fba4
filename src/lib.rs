//! linktally - URL shortener with click analytics
//!
//! # Architecture
//! - `services`: code generation, link creation, redirect resolution, statistics
//! - `analytics`: background click recording and aggregation
//! - `storage`: durable link store (sea-orm or in-memory)
//! - `cache`: advisory code → URL cache (moka, Redis or none)
//! - `api`: actix-web handlers
//! - `interfaces`: command-line commands
//! - `config`: static configuration
//! - `runtime`: startup, server mode and shutdown
//! - `system`: logging

pub mod analytics;
pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
