//! Shared primitives: the document model, file I/O, configuration, errors,
//! timestamps, logging and terminal output.

pub mod config;
pub mod document;
pub mod error;
pub mod logging;
pub mod output;
pub mod store;
pub mod time;
