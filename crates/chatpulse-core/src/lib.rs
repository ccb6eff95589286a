//! # chatpulse-core
//!
//! Core crate for chatpulse. Contains the presence store trait,
//! configuration schemas, typed identifiers, presence and typing records,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other chatpulse crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
