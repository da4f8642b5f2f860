//! Configuration module for StreamSeek
//!
//! Handles loading settings from YAML files and environment variables.
//! Settings are plain owned values constructed once and passed by
//! reference to the components that need them; there is no ambient
//! global instance.

mod settings;

pub use settings::*;
