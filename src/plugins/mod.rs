//! Document operations, one module per command.

pub mod checkpoint;
pub mod dedupe;
pub mod export;
pub mod integrity;
pub mod sections;
pub mod validate;
