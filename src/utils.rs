//! Utility functions and helpers.

pub mod preflight;
pub mod settings;

pub use preflight::{check_ai_credentials, AiCredentialInfo};
pub use settings::Settings;
