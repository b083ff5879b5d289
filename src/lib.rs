//! # Lotto Latest
//!
//! Publishes the latest lottery draws as JSON by reading result pages with a
//! schema-constrained LLM call instead of a hand-written HTML parser.
//!
//! ## Architecture
//!
//! The application follows a linear pipeline per lottery source:
//! 1. **Gating**: The aggregate run only proceeds inside permitted
//!    time-of-day windows ([`schedule`])
//! 2. **Fetching**: Download the result page, falling back to mirrors ([`scrapers`])
//! 3. **Normalizing**: Strip markup to bounded plain text ([`normalize`])
//! 4. **Extracting**: Ask the model for a closed JSON record ([`api`], [`schema`])
//! 5. **Assembling**: Force known-good identifiers and timestamps ([`assemble`])
//! 6. **Output**: Write the JSON document ([`outputs`])
//!
//! Sources are processed one at a time, in configured order.

pub mod api;
pub mod assemble;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod normalize;
pub mod outputs;
pub mod pipeline;
pub mod schedule;
pub mod schema;
pub mod scrapers;
pub mod utils;

pub use error::{Error, ErrorKind, Result};
