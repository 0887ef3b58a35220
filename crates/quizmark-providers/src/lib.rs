//! quizmark-providers — grading service integrations.
//!
//! Implements the `GradingProvider` trait for the Gemini API, plus a mock
//! backend for tests and local development, the grading prompt, and
//! configuration loading.

pub mod config;
pub mod error;
pub mod gemini;
pub mod mock;
pub mod prompt;

pub use config::{create_provider, load_config, load_config_from, ProviderConfig, QuizmarkConfig};
pub use error::ProviderError;
