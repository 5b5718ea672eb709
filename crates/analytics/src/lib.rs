//! # Lodestar Analytics Engine
//!
//! This crate sequences the pure calculators of `technicals` and `valuation` for a
//! single ticker and gathers their outputs into one report.
//!
//! ## Architectural Principles
//!
//! - **Layer 2 Orchestration:** It owns no calculation logic of its own. It depends on
//!   `core-types`, `configuration`, `technicals` and `valuation`, and has no knowledge
//!   of where the price history or fundamentals came from.
//! - **Stateless Calculation:** The `AnalysisEngine` takes a configuration once and
//!   turns each (series, snapshot) pair into a fresh `AnalysisReport`.
//!
//! ## Public API
//!
//! - `AnalysisEngine`: The struct that runs a full analysis.
//! - `AnalysisReport`: The serializable result of a run.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use engine::AnalysisEngine;
pub use error::AnalyticsError;
pub use report::{AnalysisReport, ValuationSection};
