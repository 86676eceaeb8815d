//! # ai-commit
//!
//! Generates git commit messages from the staged diff with a language
//! model (OpenAI, Ollama or OpenRouter).
//!
//! The binary resolves a [`config::Config`], reads the staged diff with
//! [`git::GitRepository`], asks an [`ai::AiClient`] for one or more
//! candidates and commits the one the user picks. Diffs too large for a
//! single prompt are summarized file by file first.
//!
//! ## Quick Start
//!
//! ```no_run
//! use ai_commit::Cli;
//! use clap::Parser;
//!
//! # async fn run() -> anyhow::Result<()> {
//! Cli::parse().execute().await
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod ai;
pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod message;
pub mod utils;

pub use crate::cli::Cli;
pub use crate::config::{Config, ProviderKind};
pub use crate::error::WorkflowError;
