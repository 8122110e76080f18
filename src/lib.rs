//! # mausam
//!
//! A RAG-backed weather and air quality assistant for Indian cities.
//!
//! ## Overview
//!
//! `mausam` answers natural-language questions about weather and air quality
//! by combining live OpenWeather observations with text generated by a local
//! causal language model, optionally enriched with web-search snippets:
//!
//! - City detection against a fixed registry of 12 Indian cities
//! - Live AQI (India breakpoint scale), current weather, and 5-day forecasts
//! - Context assembly with bracketed live-data and web-search facts
//! - Bounded autoregressive sampling with a Candle-loaded Qwen2 model
//! - A tabular forecast report path that bypasses generation entirely
//!
//! ## Architecture
//!
//! - `cities` - Static city registry and mention detection
//! - `live` - OpenWeather client and AQI derivation
//! - `search` - SerpAPI web-search client
//! - `model` - Model asset resolution, tokenizer, and device selection
//! - `rag` - Context builder, generation engine, and pipeline orchestration
//! - `server` - Axum REST front-end
//! - `cli` - Interactive chat and one-shot query front-ends
//! - `config` - Environment-derived runtime configuration

pub mod cities;
pub mod cli;
pub mod config;
pub mod live;
pub mod model;
pub mod rag;
pub mod search;
pub mod server;

// Re-export commonly used types
pub use anyhow::{Error, Result};
