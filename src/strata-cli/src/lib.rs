//! Strata CLI - command layer.
//!
//! The CLI is structured as follows:
//! - `cli` - command-line argument structures
//! - `commands` - individual command implementations
//! - `defaults` - built-in endpoints and URL alias resolution
//! - `factory` - connection construction from the persisted config

pub mod cli;
pub mod commands;
pub mod defaults;
pub mod factory;
