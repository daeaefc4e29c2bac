//! # meshpipe-core
//!
//! Core crate for meshpipe. Contains the host service traits that task
//! plugins consume, the layered workspace configuration, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other meshpipe crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
