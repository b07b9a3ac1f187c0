//! Command handlers.
//!
//! Handlers follow one pattern: take the [`CliContext`](crate::CliContext)
//! (or just the values they need), call into `ggforge-runtime`, and format the
//! result for the terminal. Errors are returned as [`CliError`](crate::CliError)
//! wrapped in `anyhow` so `main` can choose an exit code.

pub mod create_config;
pub mod detect;
pub mod install;
pub mod list_configs;
pub mod probe;
