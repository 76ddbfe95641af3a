//! pawtrail — command-line client for a lost-and-found pet service.
//!
//! The remote Pet Store API owns all data; this client keeps a local
//! SQLite mirror of the user's pet list, materializes pet photos into an
//! on-disk cache, and exposes every flow of the app as a subcommand.

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod models;
pub mod services;
