pub mod analysis;
pub mod config;
pub mod correlation;
pub mod db;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod live;
pub mod locations;
pub mod manual;
pub mod models;
pub mod patterns;
pub mod report;
pub mod risk;
pub mod seasonal;
pub mod seed;
pub mod stats;
pub mod store;
pub mod summary;

pub use error::{EngineError, Result};
