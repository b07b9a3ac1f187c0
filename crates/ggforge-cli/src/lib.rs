//! Command-line front end for ggforge.
//!
//! `main.rs` parses arguments, installs tracing and dispatches to
//! [`handlers`]. [`bootstrap`] is the only place runtime adapters are built.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used only by the binary
use dotenvy as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod parser;
pub mod presentation;

pub use bootstrap::{CliContext, bootstrap, load_config};
pub use commands::Commands;
pub use error::CliError;
pub use parser::Cli;
