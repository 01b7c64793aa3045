//! Domain layer for the ScrollStop caption service.
//!
//! Everything in this crate is pure: request validation, prompt assembly,
//! normalization of model output, and the shape of persisted history. I/O
//! lives in `scrollstop-openrouter`, `scrollstop-db` and `scrollstop-api`.

pub mod caption;
pub mod error;
pub mod history;
pub mod normalizer;
pub mod prompt;
pub mod types;
